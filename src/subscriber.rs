//! Subscriber trait and implementations
//!
//! A [`Subscriber`] is the consuming end of a publisher. It receives a
//! [`WeakSubscription`] once, requests [`Demand`] through it, is handed
//! values one at a time (answering each with additional demand), and finally
//! receives exactly one [`Completion`].

use crate::{demand::Demand, subscription::WeakSubscription};

mod sink;
pub use sink::Sink;

// ============================================================================
// Completion
// ============================================================================

/// The terminal event of a subscription.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Completion<Failure> {
  /// The publisher emitted everything it had.
  Finished,
  /// The publisher stopped because of `Failure`.
  Failed(Failure),
}

impl<Failure> Completion<Failure> {
  #[inline]
  pub fn is_finished(&self) -> bool { matches!(self, Completion::Finished) }

  #[inline]
  pub fn is_failed(&self) -> bool { matches!(self, Completion::Failed(_)) }

  /// The failure payload, if any.
  pub fn failure(&self) -> Option<&Failure> {
    match self {
      Completion::Finished => None,
      Completion::Failed(err) => Some(err),
    }
  }

  pub fn map_failure<F2>(self, f: impl FnOnce(Failure) -> F2) -> Completion<F2> {
    match self {
      Completion::Finished => Completion::Finished,
      Completion::Failed(err) => Completion::Failed(f(err)),
    }
  }
}

impl<Failure> From<Result<(), Failure>> for Completion<Failure> {
  fn from(r: Result<(), Failure>) -> Self {
    match r {
      Ok(()) => Completion::Finished,
      Err(err) => Completion::Failed(err),
    }
  }
}

// ============================================================================
// Subscriber Trait
// ============================================================================

/// The consumer side of a publisher.
///
/// A subscriber that never requests demand never receives a value. Terminal
/// events need no demand, so a failing or empty publisher still completes
/// it.
///
/// Callbacks of asynchronous publishers run on whatever thread the
/// scheduler picked; implementations must not assume a specific one.
pub trait Subscriber<Input, Failure> {
  /// Called once, before anything else. The subscriber usually requests its
  /// initial demand here.
  ///
  /// The handle is a back-reference: holding it does not keep the
  /// subscription alive.
  fn receive_subscription(&mut self, subscription: WeakSubscription);

  /// Receive the next value, returning how much *additional* demand to add
  /// to the outstanding total.
  fn receive(&mut self, input: Input) -> Demand;

  /// Receive the terminal event.
  ///
  /// This consumes the subscriber, as nothing can be delivered after it.
  fn receive_completion(self, completion: Completion<Failure>);
}

// ============================================================================
// DynSubscriber Trait - Object-safe Subscriber
// ============================================================================

/// Object-safe mirror of [`Subscriber`], so subscribers can be boxed.
pub trait DynSubscriber<Input, Failure> {
  fn box_receive_subscription(&mut self, subscription: WeakSubscription);
  fn box_receive(&mut self, input: Input) -> Demand;
  fn box_receive_completion(self: Box<Self>, completion: Completion<Failure>);
}

impl<T, Input, Failure> DynSubscriber<Input, Failure> for T
where
  T: Subscriber<Input, Failure>,
{
  fn box_receive_subscription(&mut self, subscription: WeakSubscription) {
    self.receive_subscription(subscription)
  }
  fn box_receive(&mut self, input: Input) -> Demand { self.receive(input) }
  fn box_receive_completion(self: Box<Self>, completion: Completion<Failure>) {
    (*self).receive_completion(completion)
  }
}

/// Boxed subscriber that can cross threads.
pub type BoxedSubscriber<'a, Input, Failure> = Box<dyn DynSubscriber<Input, Failure> + Send + 'a>;

impl<'a, Input, Failure> Subscriber<Input, Failure> for BoxedSubscriber<'a, Input, Failure> {
  #[inline]
  fn receive_subscription(&mut self, subscription: WeakSubscription) {
    (**self).box_receive_subscription(subscription)
  }

  #[inline]
  fn receive(&mut self, input: Input) -> Demand { (**self).box_receive(input) }

  #[inline]
  fn receive_completion(self, completion: Completion<Failure>) {
    self.box_receive_completion(completion)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  struct Counter {
    seen: Vec<i32>,
  }

  impl Subscriber<i32, ()> for Counter {
    fn receive_subscription(&mut self, subscription: WeakSubscription) {
      subscription.request(Demand::Unlimited);
    }

    fn receive(&mut self, input: i32) -> Demand {
      self.seen.push(input);
      Demand::NONE
    }

    fn receive_completion(self, _: Completion<()>) {}
  }

  #[test]
  fn completion_accessors() {
    let done: Completion<&str> = Completion::Finished;
    assert!(done.is_finished());
    assert_eq!(done.failure(), None);

    let failed = Completion::Failed("not found");
    assert!(failed.is_failed());
    assert_eq!(failed.failure(), Some(&"not found"));
    assert_eq!(failed.map_failure(str::len), Completion::Failed(9));
  }

  #[test]
  fn completion_from_result() {
    assert_eq!(Completion::from(Ok::<(), i32>(())), Completion::Finished);
    assert_eq!(Completion::from(Err::<(), i32>(7)), Completion::Failed(7));
  }

  #[test]
  fn boxed_subscriber_forwards() {
    let mut boxed: BoxedSubscriber<i32, ()> = Box::new(Counter { seen: vec![] });
    assert_eq!(boxed.receive(1), Demand::NONE);
    assert_eq!(boxed.receive(2), Demand::NONE);
    boxed.receive_completion(Completion::Finished);
  }
}
