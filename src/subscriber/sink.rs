use super::{Completion, Subscriber};
use crate::{demand::Demand, subscription::WeakSubscription};

/// Closure-based subscriber that requests unlimited demand.
///
/// Usually created through [`PublisherExt::sink`] or
/// [`PublisherExt::sink_value`].
///
/// [`PublisherExt::sink`]: crate::publisher::PublisherExt::sink
/// [`PublisherExt::sink_value`]: crate::publisher::PublisherExt::sink_value
pub struct Sink<OnValue, OnCompletion> {
  on_value: OnValue,
  on_completion: OnCompletion,
}

impl<OnValue, OnCompletion> Sink<OnValue, OnCompletion> {
  pub fn new(on_completion: OnCompletion, on_value: OnValue) -> Self {
    Sink { on_value, on_completion }
  }
}

impl<Input, Failure, OnValue, OnCompletion> Subscriber<Input, Failure> for Sink<OnValue, OnCompletion>
where
  OnValue: FnMut(Input),
  OnCompletion: FnOnce(Completion<Failure>),
{
  fn receive_subscription(&mut self, subscription: WeakSubscription) {
    subscription.request(Demand::Unlimited);
  }

  #[inline]
  fn receive(&mut self, input: Input) -> Demand {
    (self.on_value)(input);
    Demand::NONE
  }

  #[inline]
  fn receive_completion(self, completion: Completion<Failure>) { (self.on_completion)(completion) }
}
