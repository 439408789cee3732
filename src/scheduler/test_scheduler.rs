//! Test Scheduler for deterministic testing of time-based publishers.
//!
//! Provides virtual time that only advances when explicitly instructed,
//! so `AsyncOnce` delays and `Interval` ticks can be observed step by step.
//!
//! # Usage
//!
//! ```rust
//! use rxdemand::prelude::*;
//!
//! let scheduler = TestScheduler::new();
//! let ticks = std::sync::Arc::new(std::sync::atomic::AtomicUsize::new(0));
//! let c_ticks = ticks.clone();
//! let subscription = Interval::new(Duration::from_secs(1), scheduler.clone())
//!   .sink_value(move |_| {
//!     c_ticks.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
//!   });
//!
//! scheduler.advance_by(Duration::from_secs(3));
//! assert_eq!(ticks.load(std::sync::atomic::Ordering::SeqCst), 3);
//! subscription.cancel();
//! ```
//!
//! Tasks run synchronously on the thread that advances the clock, in due
//! order, FIFO among tasks due at the same instant. Clones share the same
//! clock and queue.

use std::{cmp::Ordering, collections::BinaryHeap};

use super::{Duration, Instant, Scheduler, TaskHandle};
use crate::{
  rc::MutArc,
  subscription::Cancellable,
};

// ==================== Internal State ====================

struct TestSchedulerState {
  origin: Instant,
  virtual_time: Duration,
  task_queue: BinaryHeap<ScheduledTask>,
  next_task_id: usize,
}

enum TaskKind {
  Once(Box<dyn FnOnce() + Send>),
  Repeat { period: Duration, task: Box<dyn FnMut() + Send> },
}

struct ScheduledTask {
  scheduled_time: Duration,
  task_id: usize,
  kind: TaskKind,
  handle: TaskHandle,
}

impl PartialEq for ScheduledTask {
  fn eq(&self, other: &Self) -> bool {
    self.scheduled_time == other.scheduled_time && self.task_id == other.task_id
  }
}

impl Eq for ScheduledTask {}

impl PartialOrd for ScheduledTask {
  fn partial_cmp(&self, other: &Self) -> Option<Ordering> { Some(self.cmp(other)) }
}

impl Ord for ScheduledTask {
  fn cmp(&self, other: &Self) -> Ordering {
    // Min-heap: earlier times first, then FIFO by task_id
    other
      .scheduled_time
      .cmp(&self.scheduled_time)
      .then_with(|| other.task_id.cmp(&self.task_id))
  }
}

impl TestSchedulerState {
  fn push(&mut self, scheduled_time: Duration, kind: TaskKind, handle: TaskHandle) {
    let task_id = self.next_task_id;
    self.next_task_id += 1;
    self.task_queue.push(ScheduledTask { scheduled_time, task_id, kind, handle });
  }

  fn prune(&mut self) { self.task_queue.retain(|t| !t.handle.is_closed()); }

  /// Pops the next live task due at or before `until`, moving the clock to
  /// its due time.
  fn pop_due(&mut self, until: Duration) -> Option<ScheduledTask> {
    while let Some(next) = self.task_queue.peek() {
      if next.scheduled_time > until {
        return None;
      }
      let task = self.task_queue.pop()?;
      if task.handle.is_closed() {
        continue;
      }
      self.virtual_time = self.virtual_time.max(task.scheduled_time);
      return Some(task);
    }
    None
  }
}

// ==================== TestScheduler ====================

/// A virtual time scheduler for deterministic testing.
#[derive(Clone)]
pub struct TestScheduler(MutArc<TestSchedulerState>);

impl Default for TestScheduler {
  fn default() -> Self { Self::new() }
}

impl TestScheduler {
  /// A scheduler whose virtual clock starts at zero, anchored at the real
  /// `Instant::now()`.
  pub fn new() -> Self { Self::starting_at(Instant::now()) }

  pub fn starting_at(origin: Instant) -> Self {
    TestScheduler(MutArc::own(TestSchedulerState {
      origin,
      virtual_time: Duration::ZERO,
      task_queue: BinaryHeap::new(),
      next_task_id: 0,
    }))
  }

  /// Virtual time elapsed since creation.
  pub fn elapsed(&self) -> Duration { self.0.lock().virtual_time }

  /// Number of tasks that are scheduled and not cancelled.
  pub fn pending_count(&self) -> usize {
    let mut state = self.0.lock();
    state.prune();
    state.task_queue.len()
  }

  /// Advances the clock by `duration`, running every task that comes due on
  /// the way, in order.
  pub fn advance_by(&self, duration: Duration) {
    let until = self.elapsed() + duration;
    self.run_until(until);
  }

  /// Advances the clock to `elapsed` since creation. Moving backwards is a
  /// no-op.
  pub fn advance_to(&self, elapsed: Duration) {
    if elapsed > self.elapsed() {
      self.run_until(elapsed);
    }
  }

  /// Runs every task due at the current instant without moving the clock.
  pub fn run_ready(&self) { self.run_until(self.elapsed()); }

  /// Advances until no one-shot task is pending. Repeating tasks fire as
  /// they come due along the way but do not keep the clock moving.
  pub fn flush(&self) {
    loop {
      let last_once = {
        let mut state = self.0.lock();
        state.prune();
        state
          .task_queue
          .iter()
          .filter(|t| matches!(t.kind, TaskKind::Once(_)))
          .map(|t| t.scheduled_time)
          .max()
      };
      match last_once {
        Some(at) => self.advance_to(at.max(self.elapsed())),
        None => return,
      }
      // A task at the current instant would not move the clock; run it here.
      self.run_ready();
    }
  }

  fn run_until(&self, until: Duration) {
    loop {
      let task = self.0.lock().pop_due(until);
      let Some(task) = task else { break };
      let ScheduledTask { scheduled_time, kind, handle, .. } = task;
      match kind {
        TaskKind::Once(f) => {
          handle.mark_done();
          f();
        }
        TaskKind::Repeat { period, mut task } => {
          task();
          if !handle.is_closed() {
            self.0.lock().push(
              scheduled_time + period,
              TaskKind::Repeat { period, task },
              handle,
            );
          }
        }
      }
    }
    let mut state = self.0.lock();
    state.virtual_time = state.virtual_time.max(until);
    state.prune();
  }
}

impl Scheduler for TestScheduler {
  fn now(&self) -> Instant {
    let state = self.0.lock();
    state.origin + state.virtual_time
  }

  fn run_after<F>(&self, delay: Duration, task: F) -> TaskHandle
  where
    F: FnOnce() + Send + 'static,
  {
    let handle = TaskHandle::new();
    let mut state = self.0.lock();
    let at = state.virtual_time + delay;
    state.push(at, TaskKind::Once(Box::new(task)), handle.clone());
    handle
  }

  /// A zero `period` is treated as one nanosecond.
  fn run_every<F>(&self, period: Duration, task: F) -> TaskHandle
  where
    F: FnMut() + Send + 'static,
  {
    let period = period.max(Duration::from_nanos(1));
    let handle = TaskHandle::new();
    let mut state = self.0.lock();
    let at = state.virtual_time + period;
    state.push(at, TaskKind::Repeat { period, task: Box::new(task) }, handle.clone());
    handle
  }
}

#[cfg(test)]
mod tests {
  use std::sync::{Arc, Mutex};

  use super::*;

  fn log() -> (Arc<Mutex<Vec<&'static str>>>, Arc<Mutex<Vec<&'static str>>>) {
    let log = Arc::new(Mutex::new(vec![]));
    (log.clone(), log)
  }

  #[test]
  fn time_only_moves_when_advanced() {
    let scheduler = TestScheduler::new();
    let start = scheduler.now();
    assert_eq!(scheduler.elapsed(), Duration::ZERO);
    scheduler.advance_by(Duration::from_millis(250));
    assert_eq!(scheduler.now() - start, Duration::from_millis(250));
  }

  #[test]
  fn one_shot_runs_when_due() {
    let scheduler = TestScheduler::new();
    let (log, c_log) = log();
    scheduler.run_after(Duration::from_millis(100), move || c_log.lock().unwrap().push("fired"));

    scheduler.advance_by(Duration::from_millis(99));
    assert!(log.lock().unwrap().is_empty());
    assert_eq!(scheduler.pending_count(), 1);

    scheduler.advance_by(Duration::from_millis(1));
    assert_eq!(*log.lock().unwrap(), vec!["fired"]);
    assert_eq!(scheduler.pending_count(), 0);
  }

  #[test]
  fn same_instant_runs_fifo() {
    let scheduler = TestScheduler::new();
    let (log, c_log) = log();
    let c_log2 = c_log.clone();
    scheduler.run_after(Duration::from_millis(10), move || c_log.lock().unwrap().push("a"));
    scheduler.run_after(Duration::from_millis(10), move || c_log2.lock().unwrap().push("b"));
    scheduler.flush();
    assert_eq!(*log.lock().unwrap(), vec!["a", "b"]);
  }

  #[test]
  fn cancelled_task_never_runs() {
    let scheduler = TestScheduler::new();
    let (log, c_log) = log();
    let handle =
      scheduler.run_after(Duration::from_millis(10), move || c_log.lock().unwrap().push("x"));
    handle.cancel();
    assert_eq!(scheduler.pending_count(), 0);
    scheduler.advance_by(Duration::from_secs(1));
    assert!(log.lock().unwrap().is_empty());
  }

  #[test]
  fn repeating_task_fires_each_period_until_cancelled() {
    let scheduler = TestScheduler::new();
    let count = Arc::new(Mutex::new(0));
    let c_count = count.clone();
    let handle = scheduler.run_every(Duration::from_millis(10), move || *c_count.lock().unwrap() += 1);

    scheduler.advance_by(Duration::from_millis(35));
    assert_eq!(*count.lock().unwrap(), 3);

    handle.cancel();
    scheduler.advance_by(Duration::from_millis(100));
    assert_eq!(*count.lock().unwrap(), 3);
    assert_eq!(scheduler.pending_count(), 0);
  }

  #[test]
  fn task_can_schedule_more_work() {
    let scheduler = TestScheduler::new();
    let (log, c_log) = log();
    let c_scheduler = scheduler.clone();
    scheduler.run_after(Duration::from_millis(5), move || {
      c_log.lock().unwrap().push("outer");
      let c_log = c_log.clone();
      c_scheduler.run_after(Duration::from_millis(5), move || c_log.lock().unwrap().push("inner"));
    });
    scheduler.flush();
    assert_eq!(*log.lock().unwrap(), vec!["outer", "inner"]);
    assert_eq!(scheduler.elapsed(), Duration::from_millis(10));
  }

  #[test]
  fn flush_ignores_idle_repeating_tasks() {
    let scheduler = TestScheduler::new();
    let _handle = scheduler.run_every(Duration::from_millis(10), || {});
    scheduler.flush();
    assert_eq!(scheduler.elapsed(), Duration::ZERO);
    assert_eq!(scheduler.pending_count(), 1);
  }
}
