//! Infrastructure layer: storage, the inventory client, the notification
//! channel, and the order placement workflow that composes them.

pub mod event_bus;
pub mod inventory;
pub mod order_placement;
pub mod repository;

pub use order_placement::{OrderPlacementService, PlacementError};
