//! Publishers: value sources that emit under demand.
//!
//! Every variant is a stateless description; all state lives in the
//! subscription created by [`Publisher::subscribe`]. The same publisher can
//! be subscribed any number of times and its subscriptions share nothing.
//!
//! | Variant | Emits |
//! |---------|-------|
//! | [`Just`] | one value, then finishes |
//! | [`AsyncOnce`] | one value resolved later on a scheduler, or a failure |
//! | [`Empty`] | nothing; finishes immediately or never |
//! | [`Fail`] | a failure only |
//! | [`Deferred`] | whatever a freshly built publisher emits |
//! | [`Sequence`] | the items of a collection, then finishes |
//! | [`Record`] | recorded values, then the recorded completion |
//! | [`Interval`] | a timestamp per tick, until cancelled |

use std::{convert::Infallible, sync::Arc};

use crate::{
  subscriber::{BoxedSubscriber, Completion, Sink, Subscriber},
  subscription::Subscription,
};

mod async_once;
mod boxed;
mod deferred;
mod empty;
mod fail;
mod interval;
mod just;
mod record;
mod sequence;

pub use async_once::{AsyncOnce, Promise};
pub use boxed::{BoxedPublisher, DynPublisher};
pub use deferred::Deferred;
pub use empty::Empty;
pub use fail::Fail;
pub use interval::Interval;
pub use just::Just;
pub use record::{Record, Recording};
pub use sequence::Sequence;

/// A source of values of type `Output`, terminated by a
/// [`Completion<Failure>`].
pub trait Publisher {
  type Output: Send + 'static;
  type Failure: Send + 'static;

  /// Attaches `subscriber`: hands it a subscription, then emits under the
  /// demand it requests.
  fn subscribe<Sub>(&self, subscriber: Sub) -> Subscription
  where
    Sub: Subscriber<Self::Output, Self::Failure> + Send + 'static;
}

impl<P: Publisher + ?Sized> Publisher for Arc<P> {
  type Output = P::Output;
  type Failure = P::Failure;

  #[inline]
  fn subscribe<Sub>(&self, subscriber: Sub) -> Subscription
  where
    Sub: Subscriber<Self::Output, Self::Failure> + Send + 'static,
  {
    (**self).subscribe(subscriber)
  }
}

/// Convenience methods available on every [`Publisher`].
pub trait PublisherExt: Publisher {
  /// Subscribes with closures, requesting unlimited demand.
  fn sink<OnCompletion, OnValue>(&self, on_completion: OnCompletion, on_value: OnValue) -> Subscription
  where
    OnCompletion: FnOnce(Completion<Self::Failure>) + Send + 'static,
    OnValue: FnMut(Self::Output) + Send + 'static,
  {
    self.subscribe(Sink::new(on_completion, on_value))
  }

  /// Subscribes with a value closure. Only for publishers that cannot
  /// fail.
  fn sink_value<OnValue>(&self, on_value: OnValue) -> Subscription
  where
    Self: Publisher<Failure = Infallible>,
    OnValue: FnMut(Self::Output) + Send + 'static,
  {
    self.subscribe(Sink::new(|_: Completion<Infallible>| {}, on_value))
  }

  /// Erases the concrete publisher type.
  fn boxed(self) -> BoxedPublisher<Self::Output, Self::Failure>
  where
    Self: Sized + Send + Sync + 'static,
  {
    BoxedPublisher::new(self)
  }
}

impl<P: Publisher + ?Sized> PublisherExt for P {}

// ==================== Factories ====================

/// A publisher emitting `value`, then finishing.
pub fn just<T>(value: T) -> Just<T>
where
  T: Clone + Send + Sync + 'static,
{
  Just::new(value)
}

/// A publisher that finishes immediately without emitting.
pub fn empty<T, E>() -> Empty<T, E> { Empty::new(true) }

/// A publisher that neither emits nor completes.
pub fn never<T, E>() -> Empty<T, E> { Empty::new(false) }

/// A publisher that fails immediately with `err`.
pub fn fail<T, E>(err: E) -> Fail<T, E>
where
  E: Clone + Send + Sync + 'static,
{
  Fail::new(err)
}

/// A publisher emitting every item of `items`, then finishing.
pub fn sequence<I>(items: I) -> Sequence<I>
where
  I: IntoIterator + Clone + Send + Sync + 'static,
  I::IntoIter: Send + 'static,
  I::Item: Send + 'static,
{
  Sequence::new(items)
}

/// A publisher built by `factory` anew for every subscription.
pub fn deferred<F, P>(factory: F) -> Deferred<F>
where
  F: Fn() -> P + Send + Sync,
  P: Publisher,
{
  Deferred::new(factory)
}

#[cfg(test)]
mod tests {
  use std::sync::Mutex;

  use super::*;

  #[test]
  fn arc_publisher_delegates() {
    let shared = Arc::new(sequence(vec![1, 2]));
    let seen = Arc::new(Mutex::new(vec![]));
    let c_seen = seen.clone();
    shared.sink_value(move |v| c_seen.lock().unwrap().push(v));
    assert_eq!(*seen.lock().unwrap(), vec![1, 2]);
  }

  #[test]
  fn sink_receives_completion() {
    let done = Arc::new(Mutex::new(None));
    let c_done = done.clone();
    fail::<i32, _>("boom").sink(move |c| *c_done.lock().unwrap() = Some(c), |_| {});
    assert_eq!(*done.lock().unwrap(), Some(Completion::Failed("boom")));
  }
}
