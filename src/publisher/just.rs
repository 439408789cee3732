use std::{convert::Infallible, marker::PhantomData};

use super::Publisher;
use crate::{
  subscriber::{Completion, Subscriber},
  subscription::{link::Link, Subscription},
};

/// Emits a single value, then finishes.
///
/// The value waits for demand like any other; a subscriber that requests
/// demand from `receive_subscription` gets it synchronously, during
/// `subscribe`. `Failure` defaults to [`Infallible`].
///
/// ```
/// use rxdemand::prelude::*;
///
/// Just::new(25).sink_value(|v| println!("value: {v}"));
/// ```
pub struct Just<T, E = Infallible> {
  value: T,
  _failure: PhantomData<fn() -> E>,
}

impl<T, E> Just<T, E> {
  pub fn new(value: T) -> Self { Just { value, _failure: PhantomData } }

  pub fn value(&self) -> &T { &self.value }

  /// The same publisher, typed with another failure.
  pub fn set_failure_type<E2>(self) -> Just<T, E2> { Just::new(self.value) }
}

impl<T: Clone, E> Clone for Just<T, E> {
  fn clone(&self) -> Self { Just::new(self.value.clone()) }
}

impl<T, E> Publisher for Just<T, E>
where
  T: Clone + Send + 'static,
  E: Send + 'static,
{
  type Output = T;
  type Failure = E;

  fn subscribe<Sub>(&self, subscriber: Sub) -> Subscription
  where
    Sub: Subscriber<T, E> + Send + 'static,
  {
    Link::new(
      subscriber,
      Some(Box::new(std::iter::once(self.value.clone()))),
      Some(Completion::Finished),
    )
    .start()
  }
}
