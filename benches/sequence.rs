use std::{convert::Infallible, sync::Arc};

use bencher::{benchmark_group, benchmark_main, Bencher};
use rxdemand::prelude::*;

/// Pulls one value at a time, the slowest path through the emission loop.
struct OneByOne(usize);

impl Subscriber<usize, Infallible> for OneByOne {
  fn receive_subscription(&mut self, subscription: WeakSubscription) {
    subscription.request(Demand::max(1));
  }

  fn receive(&mut self, input: usize) -> Demand {
    self.0 += input;
    Demand::max(1)
  }

  fn receive_completion(self, _: Completion<Infallible>) { bencher::black_box(self.0); }
}

fn sequence_unlimited(b: &mut Bencher) {
  let publisher = sequence(0..1000);
  b.iter(|| {
    publisher.sink_value(|v| drop(bencher::black_box(v)));
  });
}

fn sequence_one_by_one(b: &mut Bencher) {
  let publisher = sequence(0..1000usize);
  b.iter(|| publisher.subscribe(OneByOne(0)));
}

fn just_subscribe(b: &mut Bencher) {
  let publisher = Arc::new(just(1));
  b.iter(|| publisher.sink_value(|v| drop(bencher::black_box(v))));
}

benchmark_group!(benches, sequence_unlimited, sequence_one_by_one, just_subscribe);
benchmark_main!(benches);
