//! `InventoryStore`: the single writer the presentation layer talks to.
//!
//! Every intent becomes one command on the [`Inventory`] aggregate. Applied
//! events are published so views can re-render; no-ops are reported back as
//! an [`Outcome`] so a cancelled drag and a stale id are never confused.

use chrono::{DateTime, Utc};

use voilerie_core::{Aggregate, AggregateRoot, DomainError, DomainResult, SailId};
use voilerie_events::{EventBus, InMemoryEventBus, Subscription};

use crate::document::{self, DocumentError, ImportReport, InventoryDocument};
use crate::inventory::{
    CreateSail, Inventory, InventoryCommand, InventoryEvent, MoveSail, RemoveSail,
    ReplaceInventory, UpdateSail,
};
use crate::location::Location;
use crate::sail::{SailDraft, SailPatch};
use crate::stats::InventoryStats;

/// Why a command left the state untouched.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum NoOp {
    /// Dropped back onto the container it came from.
    SameLocation,
    /// The gesture ended outside any known container or sail.
    UnresolvedTarget,
    /// No sail with this id exists.
    UnknownSail(SailId),
    /// The sail exists but not where the caller last saw it.
    StaleSource {
        sail_id: SailId,
        expected: Location,
        actual: Location,
    },
}

impl NoOp {
    /// Cancelled gestures are expected; the other kinds point at stale UI state.
    pub fn is_cancelled_gesture(&self) -> bool {
        matches!(self, NoOp::SameLocation | NoOp::UnresolvedTarget)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Outcome {
    Applied,
    Unchanged(NoOp),
}

impl Outcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Outcome::Applied)
    }
}

/// What a drag gesture ended over.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DropTarget {
    Container(Location),
    /// Another sail; the drop resolves to the container holding it.
    Sail(SailId),
}

impl DropTarget {
    /// Interpret a raw droppable id: a location key, else a sail id.
    pub fn parse(raw: &str) -> Option<Self> {
        raw.parse::<Location>()
            .map(DropTarget::Container)
            .or_else(|_| raw.parse::<SailId>().map(DropTarget::Sail))
            .ok()
    }
}

#[derive(Debug, Default)]
pub struct InventoryStore {
    inventory: Inventory,
    bus: InMemoryEventBus<InventoryEvent>,
}

impl InventoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state. Borrowed, so it can never be observed mid-command.
    pub fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    /// Owned copy of the current state.
    pub fn snapshot(&self) -> Inventory {
        self.inventory.clone()
    }

    /// Receive every event applied from now on.
    pub fn subscribe(&self) -> Subscription<InventoryEvent> {
        self.bus.subscribe()
    }

    pub fn stats(&self) -> InventoryStats {
        self.inventory.stats()
    }

    pub fn create(&mut self, draft: SailDraft) -> DomainResult<SailId> {
        self.create_at(draft, Utc::now())
    }

    pub fn create_at(&mut self, draft: SailDraft, at: DateTime<Utc>) -> DomainResult<SailId> {
        let sail_id = SailId::new();
        self.execute(InventoryCommand::CreateSail(CreateSail {
            sail_id,
            draft,
            occurred_at: at,
        }))?;
        tracing::debug!(%sail_id, "sail created");
        Ok(sail_id)
    }

    pub fn update(&mut self, sail_id: SailId, patch: SailPatch) -> Outcome {
        self.update_at(sail_id, patch, Utc::now())
    }

    pub fn update_at(&mut self, sail_id: SailId, patch: SailPatch, at: DateTime<Utc>) -> Outcome {
        let result = self.execute(InventoryCommand::UpdateSail(UpdateSail {
            sail_id,
            patch,
            occurred_at: at,
        }));
        self.settle("update", sail_id, result)
    }

    /// Drag-and-drop relocation from `from` (where the sail was last seen) to `to`.
    pub fn move_sail(&mut self, sail_id: SailId, from: Location, to: Location) -> Outcome {
        self.move_sail_at(sail_id, from, to, Utc::now())
    }

    pub fn move_sail_at(
        &mut self,
        sail_id: SailId,
        from: Location,
        to: Location,
        at: DateTime<Utc>,
    ) -> Outcome {
        let result = self.execute(InventoryCommand::MoveSail(MoveSail {
            sail_id,
            from,
            to,
            occurred_at: at,
        }));
        match result {
            Err(DomainError::Conflict(_)) => match self.inventory.locate(sail_id) {
                Some(actual) => self.report(NoOp::StaleSource {
                    sail_id,
                    expected: from,
                    actual,
                }),
                None => self.report(NoOp::UnknownSail(sail_id)),
            },
            other => self.settle("move", sail_id, other),
        }
    }

    /// Resolve a finished drag gesture and move accordingly.
    ///
    /// `over` is `None` when the gesture ended outside every drop target.
    pub fn drop_on(&mut self, active: SailId, over: Option<DropTarget>) -> Outcome {
        self.drop_on_at(active, over, Utc::now())
    }

    pub fn drop_on_at(&mut self, active: SailId, over: Option<DropTarget>, at: DateTime<Utc>) -> Outcome {
        let Some(target) = over else {
            return self.report(NoOp::UnresolvedTarget);
        };
        if target == DropTarget::Sail(active) {
            return self.report(NoOp::SameLocation);
        }
        let Some(from) = self.inventory.locate(active) else {
            return self.report(NoOp::UnknownSail(active));
        };
        let to = match target {
            DropTarget::Container(location) => location,
            DropTarget::Sail(other) => match self.inventory.locate(other) {
                Some(location) => location,
                None => return self.report(NoOp::UnresolvedTarget),
            },
        };
        self.move_sail_at(active, from, to, at)
    }

    /// Irreversible delete.
    pub fn remove(&mut self, sail_id: SailId) -> Outcome {
        self.remove_at(sail_id, Utc::now())
    }

    pub fn remove_at(&mut self, sail_id: SailId, at: DateTime<Utc>) -> Outcome {
        let result = self.execute(InventoryCommand::RemoveSail(RemoveSail {
            sail_id,
            occurred_at: at,
        }));
        self.settle("remove", sail_id, result)
    }

    pub fn export_document(&self) -> InventoryDocument {
        self.export_document_at(Utc::now())
    }

    pub fn export_document_at(&self, at: DateTime<Utc>) -> InventoryDocument {
        InventoryDocument::from_inventory(&self.inventory, at)
    }

    /// Replace the whole state from document text.
    ///
    /// On error the current state is left as it was.
    pub fn import_json(&mut self, text: &str) -> Result<ImportReport, DocumentError> {
        self.import_json_at(text, Utc::now())
    }

    pub fn import_json_at(&mut self, text: &str, at: DateTime<Utc>) -> Result<ImportReport, DocumentError> {
        let imported = document::parse(text).inspect_err(|err| {
            tracing::error!(error = %err, "import failed; inventory unchanged");
        })?;

        self.execute(InventoryCommand::ReplaceInventory(ReplaceInventory {
            sails: imported.sails,
            occurred_at: at,
        }))?;

        let report = imported.report;
        if report.is_clean() {
            tracing::info!(sails = report.sails, "inventory imported");
        } else {
            tracing::warn!(
                sails = report.sails,
                degraded = ?report.degraded_containers,
                unknown_keys = ?report.unknown_keys,
                dropped_records = report.dropped_records,
                duplicate_ids = report.duplicate_ids,
                "inventory imported with repairs"
            );
        }
        Ok(report)
    }

    fn execute(&mut self, command: InventoryCommand) -> DomainResult<usize> {
        let events = self.inventory.handle(&command)?;
        for event in &events {
            self.inventory.apply(event);
            if let Err(err) = self.bus.publish(event.clone()) {
                tracing::error!(?err, version = self.inventory.version(), "failed to publish inventory event");
            }
        }
        Ok(events.len())
    }

    fn settle(&self, op: &'static str, sail_id: SailId, result: DomainResult<usize>) -> Outcome {
        match result {
            Ok(0) => self.report(NoOp::SameLocation),
            Ok(_) => Outcome::Applied,
            Err(DomainError::NotFound) => self.report(NoOp::UnknownSail(sail_id)),
            Err(err) => {
                // Only `NotFound`/`Conflict` are produced for single-sail commands.
                tracing::error!(op, %sail_id, error = %err, "unexpected rejection");
                self.report(NoOp::UnknownSail(sail_id))
            }
        }
    }

    fn report(&self, noop: NoOp) -> Outcome {
        match noop {
            NoOp::SameLocation | NoOp::UnresolvedTarget => {
                tracing::debug!(?noop, "drop cancelled");
            }
            NoOp::UnknownSail(sail_id) => {
                tracing::warn!(%sail_id, "command for unknown sail ignored");
            }
            NoOp::StaleSource {
                sail_id,
                expected,
                actual,
            } => {
                tracing::warn!(%sail_id, %expected, %actual, "move from stale source ignored");
            }
        }
        Outcome::Unchanged(noop)
    }
}
