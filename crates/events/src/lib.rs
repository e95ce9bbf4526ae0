//! Domain events and change notification.
//!
//! The store publishes every applied event so the presentation layer can
//! re-render from a fresh snapshot without polling.

pub mod bus;
pub mod event;
pub mod in_memory_bus;

pub use bus::{EventBus, Subscription};
pub use event::Event;
pub use in_memory_bus::{InMemoryBusError, InMemoryEventBus};
