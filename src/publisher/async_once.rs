use std::{
  fmt::{Debug, Formatter},
  sync::Arc,
};

use super::Publisher;
use crate::{
  scheduler::{Duration, Scheduler},
  subscriber::Subscriber,
  subscription::{
    link::{Link, Resolve},
    Cancellable, Subscription,
  },
};

type Resolver<T, E> = Arc<dyn Fn(Promise<T, E>) + Send + Sync>;

/// Resolves a single result asynchronously, then emits it.
///
/// At each subscription the resolver is scheduled with
/// [`Scheduler::run_after`]. `Ok(value)` emits the value, once demand
/// allows, then finishes; `Err(failure)` fails without a value.
///
/// Cancelling before the resolver has produced its result cancels the
/// scheduled task, and a result that arrives anyway is discarded.
///
/// ```
/// use rxdemand::prelude::*;
///
/// let scheduler = TestScheduler::new();
/// let future = AsyncOnce::new(scheduler.clone(), || Ok::<_, ()>(25)).delay(Duration::from_secs(4));
/// future.sink(|c| println!("{c:?}"), |v| println!("value: {v}"));
/// scheduler.advance_by(Duration::from_secs(4));
/// ```
pub struct AsyncOnce<T, E, S> {
  resolver: Resolver<T, E>,
  scheduler: S,
  delay: Duration,
}

impl<T, E, S> AsyncOnce<T, E, S>
where
  T: Send + 'static,
  E: Send + 'static,
{
  /// Resolves by calling `resolver` on the scheduler.
  pub fn new<F>(scheduler: S, resolver: F) -> Self
  where
    F: Fn() -> Result<T, E> + Send + Sync + 'static,
  {
    Self::with_promise(scheduler, move |promise| promise.fulfill(resolver()))
  }

  /// Resolves through a [`Promise`] that `resolver` may fulfill later, from
  /// any thread.
  pub fn with_promise<F>(scheduler: S, resolver: F) -> Self
  where
    F: Fn(Promise<T, E>) + Send + Sync + 'static,
  {
    AsyncOnce { resolver: Arc::new(resolver), scheduler, delay: Duration::ZERO }
  }

  /// Runs the resolver `delay` after subscription instead of as soon as
  /// possible.
  pub fn delay(mut self, delay: Duration) -> Self {
    self.delay = delay;
    self
  }
}

impl<T, E, S: Clone> Clone for AsyncOnce<T, E, S> {
  fn clone(&self) -> Self {
    AsyncOnce {
      resolver: self.resolver.clone(),
      scheduler: self.scheduler.clone(),
      delay: self.delay,
    }
  }
}

impl<T, E, S> Publisher for AsyncOnce<T, E, S>
where
  T: Send + 'static,
  E: Send + 'static,
  S: Scheduler,
{
  type Output = T;
  type Failure = E;

  fn subscribe<Sub>(&self, subscriber: Sub) -> Subscription
  where
    Sub: Subscriber<T, E> + Send + 'static,
  {
    let link = Link::new(subscriber, None, None);
    let subscription = link.start();
    if !subscription.is_closed() {
      let promise = Promise { link: link.clone() };
      let resolver = self.resolver.clone();
      let task = self.scheduler.run_after(self.delay, move || resolver(promise));
      link.attach(task);
    }
    subscription
  }
}

/// The write end of an [`AsyncOnce`] subscription.
///
/// Fulfilling consumes the promise, so a subscription receives at most one
/// result. Fulfilling a cancelled subscription does nothing.
pub struct Promise<T, E> {
  link: Arc<dyn Resolve<T, E>>,
}

impl<T, E> Promise<T, E> {
  pub fn fulfill(self, result: Result<T, E>) { self.link.resolve(result) }

  #[inline]
  pub fn succeed(self, value: T) { self.fulfill(Ok(value)) }

  #[inline]
  pub fn fail(self, err: E) { self.fulfill(Err(err)) }
}

impl<T, E> Debug for Promise<T, E> {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result { f.debug_struct("Promise").finish() }
}

#[cfg(test)]
mod tests {
  use std::sync::Mutex;

  use super::*;
  use crate::{publisher::PublisherExt, scheduler::TestScheduler, subscriber::Completion};

  #[test]
  fn resolves_on_the_scheduler() {
    let scheduler = TestScheduler::new();
    let values = Arc::new(Mutex::new(vec![]));
    let c_values = values.clone();
    let done = Arc::new(Mutex::new(None));
    let c_done = done.clone();

    AsyncOnce::new(scheduler.clone(), || Ok::<_, &str>(25))
      .delay(Duration::from_secs(4))
      .sink(
        move |c| *c_done.lock().unwrap() = Some(c),
        move |v| c_values.lock().unwrap().push(v),
      );

    scheduler.advance_by(Duration::from_secs(3));
    assert!(values.lock().unwrap().is_empty());
    assert_eq!(*done.lock().unwrap(), None);

    scheduler.advance_by(Duration::from_secs(1));
    assert_eq!(*values.lock().unwrap(), vec![25]);
    assert_eq!(*done.lock().unwrap(), Some(Completion::Finished));
  }

  #[test]
  fn resolver_runs_per_subscription() {
    let scheduler = TestScheduler::new();
    let calls = Arc::new(Mutex::new(0));
    let c_calls = calls.clone();
    let future = AsyncOnce::new(scheduler.clone(), move || {
      *c_calls.lock().unwrap() += 1;
      Ok::<_, ()>(())
    });
    future.sink(|_| {}, |_| {});
    future.sink(|_| {}, |_| {});
    assert_eq!(*calls.lock().unwrap(), 0);
    scheduler.flush();
    assert_eq!(*calls.lock().unwrap(), 2);
  }

  #[test]
  fn promise_from_another_thread() {
    let scheduler = TestScheduler::new();
    let (tx, rx) = std::sync::mpsc::channel();
    AsyncOnce::with_promise(scheduler.clone(), |promise: Promise<i32, ()>| {
      std::thread::spawn(move || promise.succeed(7));
    })
    .sink(|_| {}, move |v| tx.send(v).unwrap());
    scheduler.flush();
    assert_eq!(rx.recv_timeout(Duration::from_secs(5)).unwrap(), 7);
  }
}
