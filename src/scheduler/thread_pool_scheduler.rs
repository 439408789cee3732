use std::{
  future::Future,
  pin::Pin,
  task::{Context, Poll},
};

use futures::{
  executor::ThreadPool,
  future::{Abortable, FutureExt},
  task::SpawnExt,
  Stream,
};
use once_cell::sync::Lazy;
use pin_project_lite::pin_project;

use super::{Duration, Instant, Scheduler, TaskHandle};
use crate::{error::Result, subscription::Cancellable};

static DEFAULT_RUNTIME: Lazy<ThreadPool> =
  Lazy::new(|| ThreadPool::new().expect("failed to build the default thread pool"));

/// Runs scheduled tasks on a `futures` thread pool.
///
/// `ThreadPoolScheduler::default()` shares one lazily built, process-wide
/// pool.
#[derive(Clone)]
pub struct ThreadPoolScheduler {
  pool: ThreadPool,
}

impl Default for ThreadPoolScheduler {
  fn default() -> Self { ThreadPoolScheduler { pool: DEFAULT_RUNTIME.clone() } }
}

impl ThreadPoolScheduler {
  /// A scheduler backed by its own pool of `pool_size` threads (at least
  /// one).
  pub fn new(pool_size: usize) -> Result<Self> {
    let pool = ThreadPool::builder()
      .pool_size(pool_size.max(1))
      .name_prefix("rxdemand-")
      .create()?;
    Ok(ThreadPoolScheduler { pool })
  }

  pub fn from_pool(pool: ThreadPool) -> Self { ThreadPoolScheduler { pool } }

  fn spawn(&self, task: impl Future<Output = ()> + Send + 'static, handle: &TaskHandle) {
    if let Err(err) = self.pool.spawn(task).map_err(crate::error::Error::from) {
      tracing::warn!("{err}");
      handle.cancel();
    }
  }
}

pin_project! {
  /// Calls `task` on every tick of `ticks` until `handle` closes.
  struct Repeat<St, F> {
    #[pin]
    ticks: St,
    task: F,
    handle: TaskHandle,
  }
}

impl<St, F> Future for Repeat<St, F>
where
  St: Stream,
  F: FnMut(),
{
  type Output = ();

  /// Runs at most one tick per poll and yields back to the pool after it,
  /// so a timer that fell behind does not hold on to a worker thread.
  fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
    let this = self.project();
    if this.handle.is_closed() {
      return Poll::Ready(());
    }
    match this.ticks.poll_next(cx) {
      Poll::Ready(Some(_)) => {
        (this.task)();
        cx.waker().wake_by_ref();
        Poll::Pending
      }
      Poll::Ready(None) => Poll::Ready(()),
      Poll::Pending => Poll::Pending,
    }
  }
}

impl Scheduler for ThreadPoolScheduler {
  #[inline]
  fn now(&self) -> Instant { Instant::now() }

  fn run_after<F>(&self, delay: Duration, task: F) -> TaskHandle
  where
    F: FnOnce() + Send + 'static,
  {
    let (handle, registration) = TaskHandle::abortable();
    let c_handle = handle.clone();
    let fut = async move {
      futures_time::task::sleep(delay.into()).await;
      if !c_handle.is_closed() {
        c_handle.mark_done();
        task();
      }
    };
    self.spawn(Abortable::new(fut, registration).map(|_| ()), &handle);
    handle
  }

  /// A zero `period` is treated as one nanosecond.
  fn run_every<F>(&self, period: Duration, task: F) -> TaskHandle
  where
    F: FnMut() + Send + 'static,
  {
    let period = period.max(Duration::from_nanos(1));
    let (handle, registration) = TaskHandle::abortable();
    let repeat = Repeat {
      ticks: futures_time::stream::interval(period.into()),
      task,
      handle: handle.clone(),
    };
    self.spawn(Abortable::new(repeat, registration).map(|_| ()), &handle);
    handle
  }
}

#[cfg(test)]
mod tests {
  use std::sync::{
    atomic::{AtomicUsize, Ordering},
    mpsc, Arc,
  };

  use super::*;

  #[test]
  fn run_after_fires_on_the_pool() {
    let scheduler = ThreadPoolScheduler::default();
    let (tx, rx) = mpsc::channel();
    let stamp = Instant::now();
    let handle = scheduler.run_after(Duration::from_millis(5), move || tx.send(()).unwrap());
    rx.recv_timeout(Duration::from_secs(5)).unwrap();
    assert!(stamp.elapsed() >= Duration::from_millis(5));
    assert!(handle.is_closed());
  }

  #[test]
  fn cancelled_run_after_never_fires() {
    let scheduler = ThreadPoolScheduler::new(1).unwrap();
    let (tx, rx) = mpsc::channel::<()>();
    let handle = scheduler.run_after(Duration::from_millis(20), move || tx.send(()).unwrap());
    handle.cancel();
    assert!(rx.recv_timeout(Duration::from_millis(100)).is_err());
  }

  #[test]
  fn run_every_repeats_until_cancelled() {
    let scheduler = ThreadPoolScheduler::default();
    let ticks = Arc::new(AtomicUsize::new(0));
    let c_ticks = ticks.clone();
    let (tx, rx) = mpsc::channel();
    let handle = scheduler.run_every(Duration::from_millis(2), move || {
      if c_ticks.fetch_add(1, Ordering::SeqCst) == 2 {
        let _ = tx.send(());
      }
    });
    rx.recv_timeout(Duration::from_secs(5)).unwrap();
    handle.cancel();
    std::thread::sleep(Duration::from_millis(20));
    let seen = ticks.load(Ordering::SeqCst);
    std::thread::sleep(Duration::from_millis(20));
    assert_eq!(ticks.load(Ordering::SeqCst), seen);
    assert!(seen >= 3);
  }

  #[test]
  fn zero_period_shares_the_pool() {
    let scheduler = ThreadPoolScheduler::new(1).unwrap();
    let ticks = Arc::new(AtomicUsize::new(0));
    let c_ticks = ticks.clone();
    let handle = scheduler.run_every(Duration::ZERO, move || {
      c_ticks.fetch_add(1, Ordering::SeqCst);
    });
    let (tx, rx) = mpsc::channel();
    scheduler.run_after(Duration::from_millis(5), move || tx.send(()).unwrap());
    rx.recv_timeout(Duration::from_secs(5)).unwrap();
    handle.cancel();
    assert!(ticks.load(Ordering::SeqCst) >= 1);
  }
}
