use serde::Serialize;

/// An integration event published to other services.
///
/// Events are facts: immutable and serialisable. The JSON body is the wire
/// payload.
pub trait Event: Serialize + Clone + core::fmt::Debug + Send + Sync + 'static {
    /// Stable event name (e.g. `"order.placed"`).
    fn event_type(&self) -> &'static str;
}
