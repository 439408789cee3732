use std::marker::PhantomData;

use super::Publisher;
use crate::{
  subscriber::{Completion, Subscriber},
  subscription::{link::Link, Subscription},
};

/// A publisher that never emits a value.
///
/// With `complete_immediately` it finishes synchronously during
/// `subscribe`; without it the subscription stays open, silent, until it is
/// cancelled.
pub struct Empty<T, E> {
  complete_immediately: bool,
  _p: PhantomData<fn() -> (T, E)>,
}

impl<T, E> Empty<T, E> {
  pub fn new(complete_immediately: bool) -> Self { Empty { complete_immediately, _p: PhantomData } }

  pub fn completes_immediately(&self) -> bool { self.complete_immediately }
}

impl<T, E> Clone for Empty<T, E> {
  fn clone(&self) -> Self { Empty::new(self.complete_immediately) }
}

impl<T, E> Default for Empty<T, E> {
  fn default() -> Self { Empty::new(true) }
}

impl<T, E> Publisher for Empty<T, E>
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
    let completion = self.complete_immediately.then_some(Completion::Finished);
    Link::new(subscriber, None, completion).start()
  }
}
