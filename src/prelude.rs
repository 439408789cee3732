//! Prelude module for convenient imports
//!
//! This module re-exports commonly used types and traits for easy access.

// Demand
pub use crate::demand::Demand;
// Errors
pub use crate::error::Error;
// Publishers and factories
pub use crate::publisher::{
  deferred, empty, fail, just, never, sequence, AsyncOnce, BoxedPublisher, Deferred, DynPublisher,
  Empty, Fail, Interval, Just, Promise, Publisher, PublisherExt, Record, Recording, Sequence,
};
// Scheduler Core types
pub use crate::scheduler::{Duration, Instant, Scheduler, TaskHandle, TestScheduler};
// Default Schedulers
#[cfg(feature = "futures-scheduler")]
pub use crate::scheduler::ThreadPoolScheduler;
#[cfg(feature = "tokio-scheduler")]
pub use crate::scheduler::TokioScheduler;
// Subscriber
pub use crate::subscriber::{BoxedSubscriber, Completion, DynSubscriber, Sink, Subscriber};
// Subscription
pub use crate::subscription::{
  Cancellable, CompositeSubscription, Subscription, SubscriptionGuard, SubscriptionState,
  WeakSubscription,
};
