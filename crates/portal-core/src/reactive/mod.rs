//! # Reactive Primitives
//!
//! [`Dynamic<T>`] is a shared value with a monotonically increasing version.
//! Writers replace the whole value in one step; readers either read the
//! current value or hold a [`Subscription`] and poll for newer versions.
//!
//! Subscriptions are poll-based and runtime-agnostic. Push delivery, where
//! needed, is layered on top by the owning component (see the sync status
//! broadcaster in `portal-app`).

mod dynamic;

pub use dynamic::{Dynamic, Subscription};
