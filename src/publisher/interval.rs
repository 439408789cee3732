use std::convert::Infallible;

use super::Publisher;
use crate::{
  scheduler::{Duration, Instant, Scheduler},
  subscriber::Subscriber,
  subscription::{link::Link, Cancellable, Subscription},
};

/// Emits the scheduler's current time every `period`, first one `period`
/// after subscription. Never completes; cancel the subscription to stop it.
///
/// A tick that finds no outstanding demand is dropped, not buffered.
#[derive(Clone)]
pub struct Interval<S> {
  period: Duration,
  scheduler: S,
}

impl<S> Interval<S> {
  pub fn new(period: Duration, scheduler: S) -> Self { Interval { period, scheduler } }

  pub fn period(&self) -> Duration { self.period }
}

impl<S: Scheduler> Publisher for Interval<S> {
  type Output = Instant;
  type Failure = Infallible;

  fn subscribe<Sub>(&self, subscriber: Sub) -> Subscription
  where
    Sub: Subscriber<Instant, Infallible> + Send + 'static,
  {
    let link = Link::new(subscriber, None, None);
    let subscription = link.start();
    if !subscription.is_closed() {
      let clock = self.scheduler.clone();
      let ticks = link.clone();
      let task = self.scheduler.run_every(self.period, move || ticks.offer(clock.now()));
      link.attach(task);
    }
    subscription
  }
}

#[cfg(test)]
mod tests {
  use std::sync::{Arc, Mutex};

  use super::*;
  use crate::{
    demand::Demand,
    publisher::PublisherExt,
    scheduler::TestScheduler,
    subscription::{SubscriptionState, WeakSubscription},
  };

  #[test]
  fn ticks_until_cancelled() {
    let scheduler = TestScheduler::new();
    let start = scheduler.now();
    let ticks = Arc::new(Mutex::new(vec![]));
    let c_ticks = ticks.clone();
    let subscription = Interval::new(Duration::from_secs(1), scheduler.clone())
      .sink_value(move |at| c_ticks.lock().unwrap().push(at - start));

    scheduler.advance_by(Duration::from_secs(3));
    assert_eq!(
      *ticks.lock().unwrap(),
      vec![Duration::from_secs(1), Duration::from_secs(2), Duration::from_secs(3)]
    );

    subscription.cancel();
    subscription.cancel();
    assert_eq!(subscription.state(), SubscriptionState::Cancelled);
    scheduler.advance_by(Duration::from_secs(5));
    assert_eq!(ticks.lock().unwrap().len(), 3);
    assert_eq!(scheduler.pending_count(), 0);
  }

  struct Lazy {
    seen: Arc<Mutex<usize>>,
  }

  impl Subscriber<Instant, Infallible> for Lazy {
    fn receive_subscription(&mut self, _: WeakSubscription) {}

    fn receive(&mut self, _: Instant) -> Demand {
      *self.seen.lock().unwrap() += 1;
      Demand::NONE
    }

    fn receive_completion(self, _: crate::subscriber::Completion<Infallible>) {}
  }

  #[test]
  fn ticks_without_demand_are_dropped() {
    let scheduler = TestScheduler::new();
    let seen = Arc::new(Mutex::new(0));
    let subscription =
      Interval::new(Duration::from_secs(1), scheduler.clone()).subscribe(Lazy { seen: seen.clone() });

    scheduler.advance_by(Duration::from_secs(2));
    assert_eq!(*seen.lock().unwrap(), 0);

    subscription.request(Demand::max(1));
    scheduler.advance_by(Duration::from_secs(2));
    assert_eq!(*seen.lock().unwrap(), 1);

    // Dropped ticks are never replayed.
    subscription.request(Demand::max(1));
    assert_eq!(*seen.lock().unwrap(), 1);
    scheduler.advance_by(Duration::from_secs(1));
    assert_eq!(*seen.lock().unwrap(), 2);
    subscription.cancel();
  }
}
