//! Subscription handles and cancellation.
//!
//! Every `subscribe` call creates one link between a publisher and a
//! subscriber. The consumer gets a strong [`Subscription`]; the subscriber
//! gets a [`WeakSubscription`] back-reference. Both can request demand and
//! cancel.

use std::{
  fmt::{Debug, Formatter},
  sync::{Arc, Weak},
};

use crate::demand::Demand;

mod composite;
pub(crate) mod link;
pub use composite::CompositeSubscription;

/// Anything that can be cancelled: subscriptions, scheduled tasks, bags of
/// both.
pub trait Cancellable {
  /// Stops the underlying work. Calling it again is a no-op.
  fn cancel(&self);

  /// Returns `true` once cancelled or otherwise finished.
  fn is_closed(&self) -> bool;
}

impl<T: ?Sized + Cancellable> Cancellable for Box<T> {
  #[inline]
  fn cancel(&self) { (**self).cancel() }

  #[inline]
  fn is_closed(&self) -> bool { (**self).is_closed() }
}

impl<T: ?Sized + Cancellable> Cancellable for Arc<T> {
  #[inline]
  fn cancel(&self) { (**self).cancel() }

  #[inline]
  fn is_closed(&self) -> bool { (**self).is_closed() }
}

/// Lifecycle of one subscription.
///
/// `Pending → Active → {Finished, Failed, Cancelled}`; the last three are
/// terminal and mutually exclusive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SubscriptionState {
  /// Created, no demand requested yet.
  Pending,
  /// Demand has been requested at least once.
  Active,
  Finished,
  Failed,
  Cancelled,
}

impl SubscriptionState {
  #[inline]
  pub fn is_terminal(self) -> bool {
    matches!(
      self,
      SubscriptionState::Finished | SubscriptionState::Failed | SubscriptionState::Cancelled
    )
  }
}

/// Producer-side operations behind a subscription handle.
pub(crate) trait Control: Cancellable + Send + Sync {
  fn request(&self, demand: Demand);
  fn state(&self) -> SubscriptionState;
}

// ============================================================================
// Subscription
// ============================================================================

/// Consumer-owned handle to one publisher/subscriber link.
///
/// Dropping a `Subscription` does not cancel it; use
/// [`Subscription::cancel_when_dropped`] for scoped cancellation.
#[derive(Clone)]
pub struct Subscription(Arc<dyn Control>);

impl Subscription {
  pub(crate) fn new(control: Arc<dyn Control>) -> Self { Subscription(control) }

  /// Adds `demand` to the outstanding demand. Requesting
  /// [`Demand::NONE`] does nothing.
  #[inline]
  pub fn request(&self, demand: Demand) { self.0.request(demand) }

  #[inline]
  pub fn state(&self) -> SubscriptionState { self.0.state() }

  /// A back-reference that does not keep the link alive.
  pub fn downgrade(&self) -> WeakSubscription { WeakSubscription(Arc::downgrade(&self.0)) }

  /// Activates "RAII" behavior for this subscription: it is cancelled as
  /// soon as the returned guard goes out of scope.
  ///
  /// **Attention:** if the guard is not bound to a variable, the
  /// subscription is cancelled immediately.
  pub fn cancel_when_dropped(self) -> SubscriptionGuard<Subscription> { SubscriptionGuard(self) }

  /// Hands the subscription to `bag`, to be cancelled together with it.
  pub fn store_in(self, bag: &CompositeSubscription) { bag.add(self) }
}

impl Cancellable for Subscription {
  #[inline]
  fn cancel(&self) { self.0.cancel() }

  #[inline]
  fn is_closed(&self) -> bool { self.0.is_closed() }
}

impl Debug for Subscription {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Subscription")
      .field("state", &self.state())
      .finish()
  }
}

// ============================================================================
// WeakSubscription
// ============================================================================

/// Subscriber-held back-reference to its subscription.
///
/// Once the link has been released every operation is a no-op and the
/// handle reports itself closed.
#[derive(Clone)]
pub struct WeakSubscription(Weak<dyn Control>);

impl WeakSubscription {
  pub fn request(&self, demand: Demand) {
    if let Some(control) = self.0.upgrade() {
      control.request(demand);
    }
  }

  pub fn upgrade(&self) -> Option<Subscription> { self.0.upgrade().map(Subscription) }
}

impl Cancellable for WeakSubscription {
  fn cancel(&self) {
    if let Some(control) = self.0.upgrade() {
      control.cancel();
    }
  }

  fn is_closed(&self) -> bool { self.0.upgrade().is_none_or(|c| c.is_closed()) }
}

impl Debug for WeakSubscription {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("WeakSubscription")
      .field("is_closed", &self.is_closed())
      .finish()
  }
}

// ============================================================================
// SubscriptionGuard
// ============================================================================

/// An RAII implementation of a "scoped subscribed" of a subscription.
/// When this structure is dropped (falls out of scope), the subscription will
/// be cancelled.
///
/// If you want to drop it immediately, wrap it in its own scope.
#[derive(Debug)]
#[must_use]
pub struct SubscriptionGuard<T: Cancellable>(pub(crate) T);

impl<T: Cancellable> SubscriptionGuard<T> {
  /// Wraps an existing handle with a guard to enable RAII behavior for it.
  pub fn new(subscription: T) -> SubscriptionGuard<T> { SubscriptionGuard(subscription) }

  pub fn get_ref(&self) -> &T { &self.0 }
}

impl<T: Cancellable> Drop for SubscriptionGuard<T> {
  #[inline]
  fn drop(&mut self) { self.0.cancel() }
}
