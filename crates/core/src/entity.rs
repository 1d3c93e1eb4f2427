//! Entities: records with a stable identity.

/// A record identified by its id rather than its field values.
///
/// `KIND` is a short lowercase noun used in log fields and error messages
/// (e.g. `"order"`, `"product"`).
pub trait Entity {
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug + core::fmt::Display;

    const KIND: &'static str;

    fn id(&self) -> &Self::Id;

    /// `"<kind> <id>"`, for log lines and not-found messages.
    fn describe(&self) -> String {
        format!("{} {}", Self::KIND, self.id())
    }
}
