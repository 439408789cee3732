use futures::future::{Abortable, FutureExt};
use tokio::{runtime::Handle, time::MissedTickBehavior};

use super::{Duration, Instant, Scheduler, TaskHandle};
use crate::{error::Result, subscription::Cancellable};

/// Runs scheduled tasks on a tokio runtime.
#[derive(Clone, Debug)]
pub struct TokioScheduler {
  handle: Handle,
}

impl TokioScheduler {
  pub fn new(handle: Handle) -> Self { TokioScheduler { handle } }

  /// The runtime the caller is running in.
  pub fn current() -> Result<Self> { Ok(TokioScheduler { handle: Handle::try_current()? }) }
}

impl Scheduler for TokioScheduler {
  #[inline]
  fn now(&self) -> Instant { Instant::now() }

  fn run_after<F>(&self, delay: Duration, task: F) -> TaskHandle
  where
    F: FnOnce() + Send + 'static,
  {
    let (handle, registration) = TaskHandle::abortable();
    let c_handle = handle.clone();
    let fut = async move {
      tokio::time::sleep(delay).await;
      if !c_handle.is_closed() {
        c_handle.mark_done();
        task();
      }
    };
    self.handle.spawn(Abortable::new(fut, registration).map(|_| ()));
    handle
  }

  fn run_every<F>(&self, period: Duration, mut task: F) -> TaskHandle
  where
    F: FnMut() + Send + 'static,
  {
    let (handle, registration) = TaskHandle::abortable();
    let c_handle = handle.clone();
    let period = period.max(Duration::from_nanos(1));
    let fut = async move {
      let mut ticks = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
      ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
      loop {
        ticks.tick().await;
        if c_handle.is_closed() {
          break;
        }
        task();
      }
    };
    self.handle.spawn(Abortable::new(fut, registration).map(|_| ()));
    handle
  }
}

#[cfg(test)]
mod tests {
  use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
  };

  use super::*;

  #[tokio::test(flavor = "multi_thread")]
  async fn run_after_fires() {
    let scheduler = TokioScheduler::current().unwrap();
    let (tx, rx) = futures::channel::oneshot::channel();
    scheduler.run_after(Duration::from_millis(5), move || {
      let _ = tx.send(42);
    });
    assert_eq!(rx.await.unwrap(), 42);
  }

  #[tokio::test(flavor = "multi_thread")]
  async fn run_every_stops_on_cancel() {
    let scheduler = TokioScheduler::current().unwrap();
    let ticks = Arc::new(AtomicUsize::new(0));
    let c_ticks = ticks.clone();
    let handle = scheduler.run_every(Duration::from_millis(2), move || {
      c_ticks.fetch_add(1, Ordering::SeqCst);
    });
    tokio::time::sleep(Duration::from_millis(30)).await;
    handle.cancel();
    tokio::time::sleep(Duration::from_millis(10)).await;
    let seen = ticks.load(Ordering::SeqCst);
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(ticks.load(Ordering::SeqCst), seen);
    assert!(seen > 0);
  }

  #[test]
  fn current_outside_runtime_fails() { assert!(TokioScheduler::current().is_err()); }
}
