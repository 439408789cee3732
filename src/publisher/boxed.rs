//! Type-erased publishers.
//!
//! [`Publisher::subscribe`] is generic over the subscriber, so a publisher is
//! not object safe on its own. [`DynPublisher`] takes a boxed subscriber
//! instead, which lets heterogeneous publishers with the same `Output` and
//! `Failure` be stored side by side.

use std::sync::Arc;

use super::Publisher;
use crate::{
  subscriber::{BoxedSubscriber, Subscriber},
  subscription::Subscription,
};

// ============================================================================
// DynPublisher
// ============================================================================

/// Object-safe counterpart of [`Publisher`].
pub trait DynPublisher<T, E>: Send + Sync {
  fn dyn_subscribe(&self, subscriber: BoxedSubscriber<'static, T, E>) -> Subscription;
}

impl<P> DynPublisher<P::Output, P::Failure> for P
where
  P: Publisher + Send + Sync,
{
  fn dyn_subscribe(&self, subscriber: BoxedSubscriber<'static, P::Output, P::Failure>) -> Subscription {
    self.subscribe(subscriber)
  }
}

// ============================================================================
// BoxedPublisher
// ============================================================================

/// A publisher with its concrete type erased. Cloning shares the underlying
/// publisher.
///
/// ```
/// use rxdemand::prelude::*;
///
/// let sources: Vec<BoxedPublisher<i32, std::convert::Infallible>> =
///   vec![just(1).boxed(), sequence(vec![2, 3]).boxed(), empty().boxed()];
/// for source in &sources {
///   source.sink_value(|v| println!("{v}"));
/// }
/// ```
pub struct BoxedPublisher<T, E>(Arc<dyn DynPublisher<T, E>>);

impl<T, E> BoxedPublisher<T, E> {
  pub fn new<P>(publisher: P) -> Self
  where
    P: Publisher<Output = T, Failure = E> + Send + Sync + 'static,
  {
    BoxedPublisher(Arc::new(publisher))
  }
}

impl<T, E> Clone for BoxedPublisher<T, E> {
  fn clone(&self) -> Self { BoxedPublisher(self.0.clone()) }
}

impl<T, E> Publisher for BoxedPublisher<T, E>
where
  T: Send + 'static,
  E: Send + 'static,
{
  type Output = T;
  type Failure = E;

  fn subscribe<Sub>(&self, subscriber: Sub) -> Subscription
  where
    Sub: Subscriber<T, E> + Send + 'static,
  {
    self.0.dyn_subscribe(Box::new(subscriber))
  }
}
