//! Sail storage inventory.
//!
//! Tracks which sails sit in the loft's intake area, on the floor, or in one
//! of the aisle/level bins, and moves them between those locations.
//!
//! Pure domain logic lives in [`inventory`]; [`store`] is the facade the
//! presentation layer drives, and [`blob`] is the only module touching disk.

pub mod blob;
pub mod document;
pub mod inventory;
pub mod location;
pub mod sail;
pub mod stats;
pub mod store;

pub use document::{DocumentError, ImportReport, ImportedInventory, InventoryDocument};
pub use inventory::{
    CreateSail, Inventory, InventoryCommand, InventoryEvent, InventoryReplaced, MoveSail,
    RemoveSail, ReplaceInventory, SailCreated, SailMoved, SailRemoved, SailUpdated, UpdateSail,
};
pub use location::{Aisle, Level, Location};
pub use sail::{Sail, SailDraft, SailPatch, SailType};
pub use stats::InventoryStats;
pub use store::{DropTarget, InventoryStore, NoOp, Outcome};
pub use voilerie_core::SailId;
