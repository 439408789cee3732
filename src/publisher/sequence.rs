use std::{convert::Infallible, marker::PhantomData};

use super::Publisher;
use crate::{
  subscriber::{Completion, Subscriber},
  subscription::{link::Link, Subscription},
};

/// Emits the items of a collection one by one, each gated by demand, then
/// finishes.
///
/// Any cloneable [`IntoIterator`] works: vectors, arrays, ranges. Every
/// subscription iterates its own clone.
///
/// ```
/// use rxdemand::prelude::*;
///
/// Sequence::<_>::new(1..=10).sink(
///   |completion| println!("completion: {completion:?}"),
///   |value| println!("value: {value}"),
/// );
/// ```
pub struct Sequence<I, E = Infallible> {
  items: I,
  _failure: PhantomData<fn() -> E>,
}

impl<I, E> Sequence<I, E> {
  pub fn new(items: I) -> Self { Sequence { items, _failure: PhantomData } }

  pub fn items(&self) -> &I { &self.items }

  /// The same publisher, typed with another failure.
  pub fn set_failure_type<E2>(self) -> Sequence<I, E2> { Sequence::new(self.items) }
}

impl<I: Clone, E> Clone for Sequence<I, E> {
  fn clone(&self) -> Self { Sequence::new(self.items.clone()) }
}

impl<I, E> Publisher for Sequence<I, E>
where
  I: IntoIterator + Clone,
  I::IntoIter: Send + 'static,
  I::Item: Send + 'static,
  E: Send + 'static,
{
  type Output = I::Item;
  type Failure = E;

  fn subscribe<Sub>(&self, subscriber: Sub) -> Subscription
  where
    Sub: Subscriber<I::Item, E> + Send + 'static,
  {
    Link::new(
      subscriber,
      Some(Box::new(self.items.clone().into_iter())),
      Some(Completion::Finished),
    )
    .start()
  }
}
