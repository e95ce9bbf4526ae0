//! The inventory aggregate: every sail, keyed by the location holding it.
//!
//! All 16 containers live in one flat map. A relocation is one event applied
//! by one `apply` call, so no reader ever sees a sail in two containers or in
//! none.

use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use voilerie_core::{Aggregate, AggregateRoot, DomainError, SailId, position_of};
use voilerie_events::Event;

use crate::location::Location;
use crate::sail::{Sail, SailDraft, SailPatch};

/// Aggregate root: Inventory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inventory {
    containers: BTreeMap<Location, Vec<Sail>>,
    version: u64,
}

impl Default for Inventory {
    fn default() -> Self {
        Self::new()
    }
}

impl Inventory {
    /// Empty inventory with all 16 containers present.
    pub fn new() -> Self {
        Self {
            containers: Location::all().map(|location| (location, Vec::new())).collect(),
            version: 0,
        }
    }

    /// Sails held at `location`, in display order.
    pub fn sails(&self, location: Location) -> &[Sail] {
        self.containers.get(&location).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Containers in traversal order (floor, intake, bins aisle-major).
    pub fn containers(&self) -> impl Iterator<Item = (Location, &[Sail])> {
        self.containers.iter().map(|(location, sails)| (*location, sails.as_slice()))
    }

    /// Every sail in traversal order.
    pub fn iter(&self) -> impl Iterator<Item = &Sail> {
        self.containers.values().flatten()
    }

    /// Location currently holding the sail. O(total sails).
    pub fn locate(&self, sail_id: SailId) -> Option<Location> {
        self.containers
            .iter()
            .find(|(_, sails)| position_of(sails, &sail_id).is_some())
            .map(|(location, _)| *location)
    }

    pub fn get(&self, sail_id: SailId) -> Option<&Sail> {
        self.iter().find(|sail| sail.id == sail_id)
    }

    pub fn len(&self) -> usize {
        self.containers.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.containers.values().all(Vec::is_empty)
    }

    fn container_mut(&mut self, location: Location) -> &mut Vec<Sail> {
        self.containers.entry(location).or_default()
    }

    fn take(&mut self, location: Location, sail_id: SailId) -> Option<Sail> {
        let sails = self.containers.get_mut(&location)?;
        let index = position_of(sails, &sail_id)?;
        Some(sails.remove(index))
    }
}

impl AggregateRoot for Inventory {
    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: CreateSail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateSail {
    pub sail_id: SailId,
    pub draft: SailDraft,
    pub occurred_at: DateTime<Utc>,
}

/// Command: UpdateSail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateSail {
    pub sail_id: SailId,
    pub patch: SailPatch,
    pub occurred_at: DateTime<Utc>,
}

/// Command: MoveSail (drag and drop).
///
/// `from` is where the caller last saw the sail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveSail {
    pub sail_id: SailId,
    pub from: Location,
    pub to: Location,
    pub occurred_at: DateTime<Utc>,
}

/// Command: RemoveSail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoveSail {
    pub sail_id: SailId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: ReplaceInventory (import).
///
/// `sails` are in traversal order; each one is placed at its `position`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplaceInventory {
    pub sails: Vec<Sail>,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum InventoryCommand {
    CreateSail(CreateSail),
    UpdateSail(UpdateSail),
    MoveSail(MoveSail),
    RemoveSail(RemoveSail),
    ReplaceInventory(ReplaceInventory),
}

/// Event: SailCreated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SailCreated {
    pub sail: Sail,
    pub occurred_at: DateTime<Utc>,
}

/// Event: SailUpdated. `sail` is the full record after the edit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SailUpdated {
    pub sail: Sail,
    pub from: Location,
    pub occurred_at: DateTime<Utc>,
}

/// Event: SailMoved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SailMoved {
    pub sail_id: SailId,
    pub from: Location,
    pub to: Location,
    pub occurred_at: DateTime<Utc>,
}

/// Event: SailRemoved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SailRemoved {
    pub sail_id: SailId,
    pub from: Location,
    pub occurred_at: DateTime<Utc>,
}

/// Event: InventoryReplaced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryReplaced {
    pub sails: Vec<Sail>,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum InventoryEvent {
    SailCreated(SailCreated),
    SailUpdated(SailUpdated),
    SailMoved(SailMoved),
    SailRemoved(SailRemoved),
    InventoryReplaced(InventoryReplaced),
}

impl Event for InventoryEvent {
    fn event_type(&self) -> &'static str {
        match self {
            InventoryEvent::SailCreated(_) => "storage.sail.created",
            InventoryEvent::SailUpdated(_) => "storage.sail.updated",
            InventoryEvent::SailMoved(_) => "storage.sail.moved",
            InventoryEvent::SailRemoved(_) => "storage.sail.removed",
            InventoryEvent::InventoryReplaced(_) => "storage.inventory.replaced",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            InventoryEvent::SailCreated(e) => e.occurred_at,
            InventoryEvent::SailUpdated(e) => e.occurred_at,
            InventoryEvent::SailMoved(e) => e.occurred_at,
            InventoryEvent::SailRemoved(e) => e.occurred_at,
            InventoryEvent::InventoryReplaced(e) => e.occurred_at,
        }
    }
}

impl Aggregate for Inventory {
    type Command = InventoryCommand;
    type Event = InventoryEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            InventoryEvent::SailCreated(e) => {
                self.container_mut(e.sail.position).push(e.sail.clone());
            }
            InventoryEvent::SailUpdated(e) => {
                let sails = self.container_mut(e.from);
                match position_of(sails, &e.sail.id) {
                    Some(index) if e.from == e.sail.position => sails[index] = e.sail.clone(),
                    Some(index) => {
                        sails.remove(index);
                        self.container_mut(e.sail.position).push(e.sail.clone());
                    }
                    None => {}
                }
            }
            InventoryEvent::SailMoved(e) => {
                if let Some(mut sail) = self.take(e.from, e.sail_id) {
                    sail.position = e.to;
                    sail.touch(e.occurred_at);
                    self.container_mut(e.to).push(sail);
                }
            }
            InventoryEvent::SailRemoved(e) => {
                self.take(e.from, e.sail_id);
            }
            InventoryEvent::InventoryReplaced(e) => {
                self.containers.values_mut().for_each(Vec::clear);
                for sail in &e.sails {
                    self.container_mut(sail.position).push(sail.clone());
                }
            }
        }

        // Deterministic version tracking: +1 per applied event.
        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            InventoryCommand::CreateSail(cmd) => self.handle_create(cmd),
            InventoryCommand::UpdateSail(cmd) => self.handle_update(cmd),
            InventoryCommand::MoveSail(cmd) => self.handle_move(cmd),
            InventoryCommand::RemoveSail(cmd) => self.handle_remove(cmd),
            InventoryCommand::ReplaceInventory(cmd) => self.handle_replace(cmd),
        }
    }
}

impl Inventory {
    fn handle_create(&self, cmd: &CreateSail) -> Result<Vec<InventoryEvent>, DomainError> {
        if self.locate(cmd.sail_id).is_some() {
            return Err(DomainError::conflict("sail already exists"));
        }
        let draft = &cmd.draft;
        let sail = Sail {
            id: cmd.sail_id,
            name: draft.name.clone(),
            sail_type: draft.sail_type,
            client_name: draft.client_name.clone(),
            boat_name: draft.boat_name.clone(),
            date_added: cmd.occurred_at,
            last_modified: cmd.occurred_at,
            position: draft.location.unwrap_or_default(),
        };
        Ok(vec![InventoryEvent::SailCreated(SailCreated {
            sail,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_update(&self, cmd: &UpdateSail) -> Result<Vec<InventoryEvent>, DomainError> {
        let from = self.locate(cmd.sail_id).ok_or_else(DomainError::not_found)?;
        let mut sail = self
            .get(cmd.sail_id)
            .cloned()
            .ok_or_else(DomainError::not_found)?;

        cmd.patch.apply_fields(&mut sail);
        sail.position = cmd.patch.position.unwrap_or(from);
        sail.touch(cmd.occurred_at);

        Ok(vec![InventoryEvent::SailUpdated(SailUpdated {
            sail,
            from,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_move(&self, cmd: &MoveSail) -> Result<Vec<InventoryEvent>, DomainError> {
        if cmd.from == cmd.to {
            return Ok(Vec::new());
        }
        if position_of(self.sails(cmd.from), &cmd.sail_id).is_none() {
            return match self.locate(cmd.sail_id) {
                Some(actual) => Err(DomainError::conflict(format!(
                    "sail {} is at {actual}, not {}",
                    cmd.sail_id, cmd.from
                ))),
                None => Err(DomainError::not_found()),
            };
        }
        Ok(vec![InventoryEvent::SailMoved(SailMoved {
            sail_id: cmd.sail_id,
            from: cmd.from,
            to: cmd.to,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_remove(&self, cmd: &RemoveSail) -> Result<Vec<InventoryEvent>, DomainError> {
        let from = self.locate(cmd.sail_id).ok_or_else(DomainError::not_found)?;
        Ok(vec![InventoryEvent::SailRemoved(SailRemoved {
            sail_id: cmd.sail_id,
            from,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_replace(&self, cmd: &ReplaceInventory) -> Result<Vec<InventoryEvent>, DomainError> {
        let mut seen = HashSet::with_capacity(cmd.sails.len());
        if let Some(dup) = cmd.sails.iter().find(|sail| !seen.insert(sail.id)) {
            return Err(DomainError::invariant(format!(
                "sail {} listed more than once",
                dup.id
            )));
        }
        Ok(vec![InventoryEvent::InventoryReplaced(InventoryReplaced {
            sails: cmd.sails.clone(),
            occurred_at: cmd.occurred_at,
        })])
    }
}
