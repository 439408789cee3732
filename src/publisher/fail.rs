use std::marker::PhantomData;

use super::Publisher;
use crate::{
  subscriber::{Completion, Subscriber},
  subscription::{link::Link, Subscription},
};

/// Fails immediately with a fixed failure, emitting no value.
///
/// The failure needs no demand: it is delivered synchronously during
/// `subscribe`.
pub struct Fail<T, E> {
  err: E,
  _output: PhantomData<fn() -> T>,
}

impl<T, E> Fail<T, E> {
  pub fn new(err: E) -> Self { Fail { err, _output: PhantomData } }

  pub fn error(&self) -> &E { &self.err }
}

impl<T, E: Clone> Clone for Fail<T, E> {
  fn clone(&self) -> Self { Fail::new(self.err.clone()) }
}

impl<T, E> Publisher for Fail<T, E>
where
  T: Send + 'static,
  E: Clone + Send + 'static,
{
  type Output = T;
  type Failure = E;

  fn subscribe<Sub>(&self, subscriber: Sub) -> Subscription
  where
    Sub: Subscriber<T, E> + Send + 'static,
  {
    Link::new(subscriber, None, Some(Completion::Failed(self.err.clone()))).start()
  }
}
