//! Infrastructure event bus implementations.
//!
//! The bus abstraction lives in `storefront-events`; this module adds the
//! Redis-backed one.

#[cfg(feature = "redis")]
pub mod redis_pubsub;

#[cfg(feature = "redis")]
pub use redis_pubsub::{RedisBusError, RedisPubSubEventBus};
