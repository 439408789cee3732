use std::fmt::{Debug, Formatter};

use smallvec::SmallVec;

use super::Cancellable;
use crate::rc::MutArc;

type Teardown = Box<dyn Cancellable + Send>;

/// A bag of cancellables that are cancelled together.
///
/// Adding to a bag that is already closed cancels the new member right
/// away. Members that closed on their own are pruned on the next add.
#[derive(Clone, Default)]
pub struct CompositeSubscription(MutArc<Inner>);

#[derive(Default)]
struct Inner {
  closed: bool,
  teardown: SmallVec<[Teardown; 1]>,
}

impl CompositeSubscription {
  pub fn new() -> Self { Self::default() }

  pub fn add<C: Cancellable + Send + 'static>(&self, cancellable: C) {
    let rejected = {
      let mut inner = self.0.lock();
      if inner.closed {
        Some(cancellable)
      } else {
        inner.teardown.retain(|c| !c.is_closed());
        inner.teardown.push(Box::new(cancellable));
        None
      }
    };
    if let Some(c) = rejected {
      c.cancel();
    }
  }

  /// Number of live members.
  pub fn teardown_size(&self) -> usize { self.0.lock().teardown.len() }
}

impl Cancellable for CompositeSubscription {
  fn cancel(&self) {
    let teardown = {
      let mut inner = self.0.lock();
      if inner.closed {
        return;
      }
      inner.closed = true;
      std::mem::take(&mut inner.teardown)
    };
    tracing::trace!(members = teardown.len(), "composite subscription cancelled");
    for c in teardown {
      c.cancel();
    }
  }

  #[inline]
  fn is_closed(&self) -> bool { self.0.lock().closed }
}

impl Debug for CompositeSubscription {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    let inner = self.0.lock();
    f.debug_struct("CompositeSubscription")
      .field("closed", &inner.closed)
      .field("teardown_count", &inner.teardown.len())
      .finish()
  }
}
