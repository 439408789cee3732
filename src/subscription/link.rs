//! The state machine shared by every publisher variant.
//!
//! A [`Link`] owns the subscriber, the outstanding demand, the values still
//! waiting to be emitted, the terminal event to send once they run out, and
//! the scheduled tasks that feed it. All of it sits behind one mutex.
//!
//! Subscriber callbacks never run under the lock. While a callback is in
//! flight the subscriber is moved out of the state and `emitting` records the
//! delivering thread, which serializes deliveries:
//!
//! - a `request` made from inside a callback only bumps the demand; the
//!   running emission loop picks it up when the callback returns;
//! - a `cancel` made from inside a callback takes effect when it returns;
//! - a `cancel` made from another thread waits for the in-flight callback,
//!   so nothing is observed once `cancel` has returned.
//!
//! A callback that panics cancels the link on its way out, so no `cancel`
//! is left waiting for a delivery that never returns.

use std::{
  iter::Peekable,
  mem,
  sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError},
  thread::{self, ThreadId},
};

use smallvec::SmallVec;

use super::{Cancellable, Control, Subscription, SubscriptionState};
use crate::{
  demand::Demand,
  rc::lock,
  scheduler::TaskHandle,
  subscriber::{Completion, Subscriber},
};

pub(crate) type Values<T> = Box<dyn Iterator<Item = T> + Send>;

pub(crate) struct Link<Sub, T, E> {
  state: Mutex<LinkState<Sub, T, E>>,
  idle: Condvar,
}

struct LinkState<Sub, T, E> {
  status: SubscriptionState,
  demand: Demand,
  subscriber: Option<Sub>,
  emitting: Option<ThreadId>,
  backlog: Option<Peekable<Values<T>>>,
  completion: Option<Completion<E>>,
  tasks: SmallVec<[TaskHandle; 1]>,
}

enum Step<Sub, T, E> {
  Idle,
  Value(Sub, T),
  Complete(Sub, Completion<E>, SmallVec<[TaskHandle; 1]>),
}

impl<Sub, T, E> LinkState<Sub, T, E>
where
  Sub: Subscriber<T, E>,
{
  fn has_backlog(&mut self) -> bool { self.backlog.as_mut().is_some_and(|b| b.peek().is_some()) }

  /// Decides, under the lock, what the emission loop delivers next.
  fn next_step(&mut self) -> Step<Sub, T, E> {
    if self.status.is_terminal() || self.emitting.is_some() {
      return Step::Idle;
    }
    if self.has_backlog() {
      if self.demand.is_none() {
        return Step::Idle;
      }
      let Some(subscriber) = self.subscriber.take() else {
        return Step::Idle;
      };
      let Some(value) = self.backlog.as_mut().and_then(Iterator::next) else {
        self.subscriber = Some(subscriber);
        return Step::Idle;
      };
      self.demand.consume_one();
      self.emitting = Some(thread::current().id());
      return Step::Value(subscriber, value);
    }
    match (self.completion.take(), self.subscriber.take()) {
      (Some(completion), Some(subscriber)) => {
        self.status = if completion.is_failed() {
          SubscriptionState::Failed
        } else {
          SubscriptionState::Finished
        };
        self.backlog = None;
        self.emitting = Some(thread::current().id());
        Step::Complete(subscriber, completion, mem::take(&mut self.tasks))
      }
      (completion, subscriber) => {
        self.completion = completion;
        self.subscriber = subscriber;
        Step::Idle
      }
    }
  }
}

impl<Sub, T, E> Link<Sub, T, E>
where
  Sub: Subscriber<T, E> + Send + 'static,
  T: Send + 'static,
  E: Send + 'static,
{
  /// A link that emits `backlog` under demand, then `completion`.
  ///
  /// Without a completion the link stays open once the backlog is drained,
  /// waiting for [`Link::resolve`], [`Link::offer`] or cancellation.
  pub(crate) fn new(
    subscriber: Sub,
    backlog: Option<Values<T>>,
    completion: Option<Completion<E>>,
  ) -> Arc<Self> {
    Arc::new(Link {
      state: Mutex::new(LinkState {
        status: SubscriptionState::Pending,
        demand: Demand::NONE,
        subscriber: Some(subscriber),
        emitting: None,
        backlog: backlog.map(Iterator::peekable),
        completion,
        tasks: SmallVec::new(),
      }),
      idle: Condvar::new(),
    })
  }

  fn lock(&self) -> MutexGuard<'_, LinkState<Sub, T, E>> { lock(&self.state) }

  /// Hands the subscriber its back-reference, then emits whatever the
  /// initial demand allows.
  pub(crate) fn start(self: &Arc<Self>) -> Subscription {
    let subscription = Subscription::new(self.clone());
    let subscriber = {
      let mut state = self.lock();
      state.emitting = Some(thread::current().id());
      state.subscriber.take()
    };
    if let Some(mut subscriber) = subscriber {
      let delivery = Delivery::new(self);
      subscriber.receive_subscription(subscription.downgrade());
      delivery.finish();
      self.settle(subscriber, Demand::NONE);
    }
    self.drain();
    subscription
  }

  /// Ties a scheduled task to this link. The task is cancelled with the
  /// link, or right away if the link is already terminal.
  pub(crate) fn attach(&self, task: TaskHandle) {
    let rejected = {
      let mut state = self.lock();
      if state.status.is_terminal() {
        Some(task)
      } else {
        state.tasks.push(task);
        None
      }
    };
    if let Some(task) = rejected {
      task.cancel();
    }
  }

  /// Settles a pending single result. Ignored once the link is terminal or
  /// already resolved.
  pub(crate) fn resolve(&self, result: Result<T, E>) {
    {
      let mut state = self.lock();
      if state.status.is_terminal() || state.completion.is_some() {
        tracing::trace!("late resolution ignored");
        return;
      }
      match result {
        Ok(value) => {
          state.backlog = Some((Box::new(std::iter::once(value)) as Values<T>).peekable());
          state.completion = Some(Completion::Finished);
        }
        Err(err) => {
          state.backlog = None;
          state.completion = Some(Completion::Failed(err));
        }
      }
    }
    self.drain();
  }

  /// Delivers `value` if demand allows it, otherwise drops it.
  pub(crate) fn offer(&self, value: T) {
    let subscriber = {
      let mut state = self.lock();
      if state.status.is_terminal() {
        return;
      }
      if state.emitting.is_some() {
        tracing::trace!("value dropped, delivery in progress");
        return;
      }
      if !state.demand.consume_one() {
        tracing::trace!("value dropped, no outstanding demand");
        return;
      }
      let Some(subscriber) = state.subscriber.take() else {
        return;
      };
      state.emitting = Some(thread::current().id());
      subscriber
    };
    let mut subscriber = subscriber;
    let delivery = Delivery::new(self);
    let more = subscriber.receive(value);
    delivery.finish();
    self.settle(subscriber, more);
    self.drain();
  }

  /// Emission loop. Only one thread runs it at a time; the others leave
  /// their demand behind and return.
  fn drain(&self) {
    loop {
      let step = self.lock().next_step();
      match step {
        Step::Idle => return,
        Step::Value(mut subscriber, value) => {
          let delivery = Delivery::new(self);
          let more = subscriber.receive(value);
          delivery.finish();
          self.settle(subscriber, more);
        }
        Step::Complete(subscriber, completion, tasks) => {
          for task in tasks {
            task.cancel();
          }
          let delivery = Delivery::new(self);
          subscriber.receive_completion(completion);
          delivery.finish();
          let mut state = self.lock();
          state.emitting = None;
          self.idle.notify_all();
          return;
        }
      }
    }
  }

  /// Puts the subscriber back after a callback, adding the demand it
  /// returned. A subscriber whose link was cancelled meanwhile is dropped.
  fn settle(&self, subscriber: Sub, more: Demand) {
    let released = {
      let mut state = self.lock();
      state.emitting = None;
      self.idle.notify_all();
      if state.status.is_terminal() {
        Some(subscriber)
      } else {
        state.demand += more;
        state.subscriber = Some(subscriber);
        None
      }
    };
    drop(released);
  }
}

impl<Sub, T, E> Link<Sub, T, E> {
  /// Tears the link down after a subscriber callback unwound: the link is
  /// cancelled, its tasks with it, and threads waiting in `cancel` resume.
  fn abandon(&self) {
    let (tasks, backlog, completion) = {
      let mut state = lock(&self.state);
      state.emitting = None;
      if !state.status.is_terminal() {
        state.status = SubscriptionState::Cancelled;
      }
      self.idle.notify_all();
      (mem::take(&mut state.tasks), state.backlog.take(), state.completion.take())
    };
    tracing::warn!(tasks = tasks.len(), "subscriber panicked, subscription cancelled");
    for task in tasks {
      task.cancel();
    }
    drop((backlog, completion));
  }
}

/// Marks a subscriber callback in flight. Dropped without
/// [`Delivery::finish`], that is while the callback unwinds, it abandons
/// the link.
struct Delivery<'a, Sub, T, E> {
  link: &'a Link<Sub, T, E>,
  finished: bool,
}

impl<'a, Sub, T, E> Delivery<'a, Sub, T, E> {
  fn new(link: &'a Link<Sub, T, E>) -> Self { Delivery { link, finished: false } }

  fn finish(mut self) { self.finished = true; }
}

impl<Sub, T, E> Drop for Delivery<'_, Sub, T, E> {
  fn drop(&mut self) {
    if !self.finished {
      self.link.abandon();
    }
  }
}

impl<Sub, T, E> Cancellable for Link<Sub, T, E>
where
  Sub: Subscriber<T, E> + Send + 'static,
  T: Send + 'static,
  E: Send + 'static,
{
  fn cancel(&self) {
    let (subscriber, tasks) = {
      let mut state = self.lock();
      if state.status.is_terminal() {
        return;
      }
      state.status = SubscriptionState::Cancelled;
      state.backlog = None;
      state.completion = None;
      let released = (state.subscriber.take(), mem::take(&mut state.tasks));
      let me = thread::current().id();
      if state.emitting.is_some_and(|id| id != me) {
        let _state = self
          .idle
          .wait_while(state, |s| s.emitting.is_some())
          .unwrap_or_else(PoisonError::into_inner);
      }
      released
    };
    tracing::trace!(tasks = tasks.len(), "subscription cancelled");
    for task in tasks {
      task.cancel();
    }
    drop(subscriber);
  }

  fn is_closed(&self) -> bool { self.lock().status.is_terminal() }
}

impl<Sub, T, E> Control for Link<Sub, T, E>
where
  Sub: Subscriber<T, E> + Send + 'static,
  T: Send + 'static,
  E: Send + 'static,
{
  fn request(&self, demand: Demand) {
    if demand.is_none() {
      return;
    }
    {
      let mut state = self.lock();
      if state.status.is_terminal() {
        return;
      }
      state.demand += demand;
      if state.status == SubscriptionState::Pending {
        state.status = SubscriptionState::Active;
      }
    }
    self.drain();
  }

  fn state(&self) -> SubscriptionState { self.lock().status }
}

/// Type-erased entry point for settling a link from a [`Promise`].
///
/// [`Promise`]: crate::publisher::Promise
pub(crate) trait Resolve<T, E>: Send + Sync {
  fn resolve(&self, result: Result<T, E>);
}

impl<Sub, T, E> Resolve<T, E> for Link<Sub, T, E>
where
  Sub: Subscriber<T, E> + Send + 'static,
  T: Send + 'static,
  E: Send + 'static,
{
  fn resolve(&self, result: Result<T, E>) { Link::resolve(self, result) }
}
