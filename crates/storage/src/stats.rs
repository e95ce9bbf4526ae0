//! Derived statistics (read-only view).

use std::collections::BTreeMap;

use serde::Serialize;

use crate::inventory::Inventory;
use crate::location::Location;
use crate::sail::Sail;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryStats {
    pub total: usize,
    /// Sails on the floor.
    pub floor: usize,
    /// Everything not on the floor, intake included.
    pub stored: usize,
    /// Earliest `dateAdded`; ties keep the first sail in traversal order.
    pub oldest_sail: Option<Sail>,
    pub sails_by_client: BTreeMap<String, usize>,
}

impl InventoryStats {
    pub fn derive(inventory: &Inventory) -> Self {
        let mut total = 0;
        let mut oldest: Option<&Sail> = None;
        let mut sails_by_client = BTreeMap::new();

        for sail in inventory.iter() {
            total += 1;
            *sails_by_client.entry(sail.client_name.clone()).or_insert(0) += 1;
            if oldest.is_none_or(|o| sail.date_added < o.date_added) {
                oldest = Some(sail);
            }
        }

        let floor = inventory.sails(Location::Plancher).len();
        Self {
            total,
            floor,
            stored: total - floor,
            oldest_sail: oldest.cloned(),
            sails_by_client,
        }
    }
}

impl Inventory {
    pub fn stats(&self) -> InventoryStats {
        InventoryStats::derive(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory::{CreateSail, InventoryCommand};
    use crate::location::{Aisle, Level};
    use crate::sail::{SailDraft, SailType};
    use chrono::{DateTime, TimeZone, Utc};
    use voilerie_core::{Aggregate, SailId};

    fn add(inventory: &mut Inventory, client: &str, location: Location, at: DateTime<Utc>) -> SailId {
        let sail_id = SailId::new();
        let cmd = InventoryCommand::CreateSail(CreateSail {
            sail_id,
            draft: SailDraft::new("S", SailType::Gennaker, client, "B").at(location),
            occurred_at: at,
        });
        for event in inventory.handle(&cmd).unwrap() {
            inventory.apply(&event);
        }
        sail_id
    }

    fn day(d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2023, 1, d, 0, 0, 0).unwrap()
    }

    #[test]
    fn empty_inventory_has_zeroed_stats() {
        let stats = Inventory::new().stats();
        assert_eq!(stats.total, 0);
        assert_eq!(stats.floor, 0);
        assert_eq!(stats.stored, 0);
        assert!(stats.oldest_sail.is_none());
        assert!(stats.sails_by_client.is_empty());
    }

    #[test]
    fn counts_floor_and_stored_separately() {
        let mut inventory = Inventory::new();
        add(&mut inventory, "Dupont", Location::Plancher, day(1));
        add(&mut inventory, "Dupont", Location::Entree, day(2));
        add(&mut inventory, "Leroy", Location::Bin(Aisle::E, Level::Haut), day(3));

        let stats = inventory.stats();
        assert_eq!(stats.total, 3);
        assert_eq!(stats.floor, 1);
        assert_eq!(stats.stored, 2);
        assert_eq!(stats.sails_by_client.get("Dupont"), Some(&2));
        assert_eq!(stats.sails_by_client.get("Leroy"), Some(&1));
    }

    #[test]
    fn oldest_tie_goes_to_the_floor_first() {
        let mut inventory = Inventory::new();
        add(&mut inventory, "bin", Location::Bin(Aisle::A, Level::Haut), day(1));
        add(&mut inventory, "intake", Location::Entree, day(1));
        let floor = add(&mut inventory, "floor", Location::Plancher, day(1));
        add(&mut inventory, "newer", Location::Plancher, day(5));

        assert_eq!(inventory.stats().oldest_sail.unwrap().id, floor);
    }

    #[test]
    fn oldest_is_the_earliest_date_added() {
        let mut inventory = Inventory::new();
        add(&mut inventory, "a", Location::Plancher, day(9));
        let oldest = add(&mut inventory, "b", Location::Bin(Aisle::G, Level::Bas), day(2));
        add(&mut inventory, "c", Location::Entree, day(4));

        assert_eq!(inventory.stats().oldest_sail.unwrap().id, oldest);
    }

    #[test]
    fn serializes_with_camel_case_keys() {
        let value = serde_json::to_value(Inventory::new().stats()).unwrap();
        assert!(value.get("sailsByClient").is_some());
        assert!(value.get("oldestSail").is_some());
    }
}
