//! Scheduling capability consumed by the asynchronous publishers.
//!
//! [`AsyncOnce`] schedules a one-shot task with [`Scheduler::run_after`];
//! [`Interval`] a repeating one with [`Scheduler::run_every`] and reads its
//! timestamps from [`Scheduler::now`]. Every scheduled task is represented
//! by a [`TaskHandle`] owned by the subscription it feeds.
//!
//! Implementations:
//!
//! - [`TestScheduler`]: virtual time, advanced by hand.
//! - [`ThreadPoolScheduler`] (feature `futures-scheduler`): a `futures`
//!   thread pool with `futures-time` timers.
//! - [`TokioScheduler`] (feature `tokio-scheduler`): the ambient tokio
//!   runtime.
//!
//! Callbacks may run on any thread the implementation chooses.
//!
//! [`AsyncOnce`]: crate::publisher::AsyncOnce
//! [`Interval`]: crate::publisher::Interval

use std::sync::{
  atomic::{AtomicBool, Ordering},
  Arc,
};

use futures::future::{AbortHandle, AbortRegistration};
pub use std::time::{Duration, Instant};

use crate::subscription::Cancellable;

pub mod test_scheduler;
pub use test_scheduler::TestScheduler;

#[cfg(feature = "futures-scheduler")]
mod thread_pool_scheduler;
#[cfg(feature = "futures-scheduler")]
pub use thread_pool_scheduler::ThreadPoolScheduler;

#[cfg(feature = "tokio-scheduler")]
mod tokio_scheduler;
#[cfg(feature = "tokio-scheduler")]
pub use tokio_scheduler::TokioScheduler;

/// A Scheduler orders tasks in time and runs them.
pub trait Scheduler: Clone + Send + Sync + 'static {
  /// Current time on this scheduler's clock.
  fn now(&self) -> Instant;

  /// Runs `task` once, `delay` from now, unless the handle is cancelled
  /// first.
  fn run_after<F>(&self, delay: Duration, task: F) -> TaskHandle
  where
    F: FnOnce() + Send + 'static;

  /// Runs `task` every `period`, first one `period` from now, until the
  /// handle is cancelled.
  fn run_every<F>(&self, period: Duration, task: F) -> TaskHandle
  where
    F: FnMut() + Send + 'static;
}

/// Cancellable handle of a scheduled task.
///
/// Closed once the task was cancelled or, for one-shot tasks, has run.
/// After [`Cancellable::cancel`] returns, the task's callback is not started
/// again.
#[derive(Clone, Debug, Default)]
pub struct TaskHandle {
  closed: Arc<AtomicBool>,
  abort: Option<AbortHandle>,
}

impl TaskHandle {
  /// A handle for a task that has not run yet.
  pub fn new() -> Self { Self::default() }

  /// A handle that is already closed.
  pub fn finished() -> Self {
    TaskHandle { closed: Arc::new(AtomicBool::new(true)), abort: None }
  }

  /// A handle that also aborts an executor-driven future when cancelled.
  pub(crate) fn abortable() -> (Self, AbortRegistration) {
    let (abort, registration) = AbortHandle::new_pair();
    (TaskHandle { closed: Arc::default(), abort: Some(abort) }, registration)
  }

  /// Marks the task as run to completion.
  pub(crate) fn mark_done(&self) { self.closed.store(true, Ordering::Release); }
}

impl Cancellable for TaskHandle {
  fn cancel(&self) {
    self.closed.store(true, Ordering::Release);
    if let Some(abort) = &self.abort {
      abort.abort();
    }
  }

  #[inline]
  fn is_closed(&self) -> bool { self.closed.load(Ordering::Acquire) }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn cancel_closes_every_clone() {
    let handle = TaskHandle::new();
    let c_handle = handle.clone();
    assert!(!handle.is_closed());
    c_handle.cancel();
    c_handle.cancel();
    assert!(handle.is_closed());
  }

  #[test]
  fn finished_is_closed() { assert!(TaskHandle::finished().is_closed()); }

  #[test]
  fn abortable_handle_aborts_its_future() {
    use futures::future::Abortable;

    let (handle, registration) = TaskHandle::abortable();
    let fut = Abortable::new(futures::future::pending::<()>(), registration);
    handle.cancel();
    assert!(futures::executor::block_on(fut).is_err());
  }
}
