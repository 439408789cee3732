//! # rxdemand: push-based streams with demand
//!
//! A small reactive core: publishers push values to subscribers, but only as
//! many as the subscriber has asked for.
//!
//! ## Quick Start
//!
//! ```rust
//! use rxdemand::prelude::*;
//!
//! Sequence::<_>::new(vec![1, 2, 3, 4]).sink(
//!   |completion| println!("completion: {completion:?}"),
//!   |value| println!("value: {value}"),
//! );
//! ```
//!
//! ## Key Concepts
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Publisher`] | A stateless source; every `subscribe` starts a fresh emission |
//! | [`Subscriber`] | Receives a subscription, values, then one completion |
//! | [`Subscription`] | Requests demand and cancels |
//! | [`Demand`] | How many more values a subscriber accepts |
//! | [`Scheduler`] | Runs delayed and periodic work for the async publishers |
//! | [`CompositeSubscription`] | A bag that cancels everything it holds at once |
//!
//! ## Feature Flags
//!
//! - **`futures-scheduler`** (default): [`ThreadPoolScheduler`] on a
//!   `futures` thread pool, with `futures-time` timers
//! - **`tokio-scheduler`**: [`TokioScheduler`] on the ambient tokio runtime
//!
//! Events are logged through `tracing` at `trace` level; install a
//! subscriber such as `tracing-subscriber` to see them.
//!
//! [`Publisher`]: publisher::Publisher
//! [`Subscriber`]: subscriber::Subscriber
//! [`Subscription`]: subscription::Subscription
//! [`Demand`]: demand::Demand
//! [`Scheduler`]: scheduler::Scheduler
//! [`CompositeSubscription`]: subscription::CompositeSubscription
//! [`ThreadPoolScheduler`]: scheduler::ThreadPoolScheduler
//! [`TokioScheduler`]: scheduler::TokioScheduler

pub mod demand;
pub mod error;
pub mod prelude;
pub mod publisher;
pub mod rc;
pub mod scheduler;
pub mod subscriber;
pub mod subscription;

// Re-export the prelude module
pub use prelude::*;

// Run the README examples as doctests.
#[cfg(doctest)]
mod __markdown_doctests {
  mod readme {
    #![doc = include_str!("../README.md")]
  }
}
