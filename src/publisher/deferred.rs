use super::Publisher;
use crate::{subscriber::Subscriber, subscription::Subscription};

/// Defers to a publisher built by a factory, which runs once at each
/// subscription and never at construction.
///
/// Every subscriber therefore gets its own inner publisher, with no state
/// shared between subscriptions.
///
/// ```
/// use rxdemand::prelude::*;
///
/// Deferred::new(|| {
///   println!("Hi!");
///   Just::new(50)
/// })
/// .sink_value(|v| println!("{v}"));
/// // Prints: Hi!\n50\n
/// ```
#[derive(Clone)]
pub struct Deferred<F> {
  factory: F,
}

impl<F> Deferred<F> {
  pub fn new(factory: F) -> Self { Deferred { factory } }
}

impl<F, P> Publisher for Deferred<F>
where
  F: Fn() -> P,
  P: Publisher,
{
  type Output = P::Output;
  type Failure = P::Failure;

  fn subscribe<Sub>(&self, subscriber: Sub) -> Subscription
  where
    Sub: Subscriber<Self::Output, Self::Failure> + Send + 'static,
  {
    (self.factory)().subscribe(subscriber)
  }
}
