use chrono::{DateTime, Duration, TimeZone, Utc};
use proptest::prelude::*;

use voilerie_storage::{
    Aisle, InventoryStore, Level, Location, Outcome, SailDraft, SailPatch, SailType,
};

fn at(minute: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 4, 20, 10, 0, 0).unwrap() + Duration::minutes(minute)
}

#[test]
fn intake_to_floor_to_bin_to_removal() {
    voilerie_observability::init_with_default("debug");
    let mut store = InventoryStore::new();

    let id = store
        .create_at(SailDraft::new("GV1", SailType::GrandVoile, "Dupont", "Aella"), at(0))
        .unwrap();
    assert_eq!(store.inventory().sails(Location::Entree)[0].id, id);
    assert_eq!(store.stats().total, 1);

    assert_eq!(store.move_sail_at(id, Location::Entree, Location::Plancher, at(1)), Outcome::Applied);
    assert!(store.inventory().sails(Location::Entree).is_empty());
    let floor = store.inventory().sails(Location::Plancher);
    assert_eq!(floor.len(), 1);
    assert_eq!(floor[0].id, id);
    assert_eq!(floor[0].position, Location::Plancher);

    let bin = Location::Bin(Aisle::A, Level::Haut);
    assert_eq!(store.move_sail_at(id, Location::Plancher, bin, at(2)), Outcome::Applied);
    let doc = store.export_document_at(at(3));
    assert_eq!(doc.storage[&Aisle::A][&Level::Haut].len(), 1);
    assert_eq!(doc.storage[&Aisle::A][&Level::Haut][0].id, id);

    assert_eq!(store.remove_at(id, at(4)), Outcome::Applied);
    assert!(store.inventory().is_empty());
    assert_eq!(store.stats().total, 0);
}

#[test]
fn export_then_import_reproduces_the_state() {
    let mut store = InventoryStore::new();
    let a = store
        .create_at(SailDraft::new("Génois 1", SailType::Genois, "Leroy", "Mistral"), at(0))
        .unwrap();
    store
        .create_at(
            SailDraft::new("Code zéro", SailType::Code0, "Leroy", "Mistral").at(Location::Bin(Aisle::G, Level::Bas)),
            at(1),
        )
        .unwrap();
    store.update_at(
        a,
        SailPatch {
            boat_name: Some("Mistral II".to_string()),
            position: Some(Location::Plancher),
            ..SailPatch::default()
        },
        at(2),
    );

    let json = store.export_document_at(at(3)).to_json_pretty().unwrap();
    let mut restored = InventoryStore::new();
    let report = restored.import_json_at(&json, at(4)).unwrap();

    assert!(report.is_clean());
    assert_eq!(report.sails, 2);
    assert_eq!(report.last_export, Some(at(3)));
    for location in Location::all() {
        assert_eq!(restored.inventory().sails(location), store.inventory().sails(location));
    }
}

#[derive(Debug, Clone)]
enum Step {
    Create { client: usize, location: usize, minute: i64 },
    Move { sail: usize, to: usize },
    Remove { sail: usize },
}

fn step() -> impl Strategy<Value = Step> {
    prop_oneof![
        3 => (0usize..4, 0usize..16, 0i64..1000)
            .prop_map(|(client, location, minute)| Step::Create { client, location, minute }),
        2 => (0usize..32, 0usize..16).prop_map(|(sail, to)| Step::Move { sail, to }),
        1 => (0usize..32).prop_map(|sail| Step::Remove { sail }),
    ]
}

fn build(steps: &[Step]) -> InventoryStore {
    const CLIENTS: [&str; 4] = ["Dupont", "Leroy", "Bernard", "Martin"];
    let locations: Vec<Location> = Location::all().collect();
    let mut store = InventoryStore::new();

    for step in steps {
        let ids: Vec<_> = store.inventory().iter().map(|s| s.id).collect();
        match step {
            Step::Create { client, location, minute } => {
                let draft = SailDraft::new("S", SailType::Foc, CLIENTS[*client], "B").at(locations[*location]);
                store.create_at(draft, at(*minute)).unwrap();
            }
            Step::Move { sail, to } if !ids.is_empty() => {
                let id = ids[sail % ids.len()];
                let from = store.inventory().locate(id).unwrap();
                store.move_sail_at(id, from, locations[*to], at(2000));
            }
            Step::Remove { sail } if !ids.is_empty() => {
                store.remove_at(ids[sail % ids.len()], at(2000));
            }
            _ => {}
        }
    }
    store
}

proptest! {
    /// Property: importing an export reproduces every container exactly.
    #[test]
    fn round_trip_preserves_contents(steps in proptest::collection::vec(step(), 0..50)) {
        let store = build(&steps);
        let json = store.export_document_at(at(3000)).to_json_pretty().unwrap();

        let mut restored = InventoryStore::new();
        restored.import_json_at(&json, at(3001)).unwrap();

        for location in Location::all() {
            prop_assert_eq!(restored.inventory().sails(location), store.inventory().sails(location));
        }
    }

    /// Property: totals add up however the sails are spread.
    #[test]
    fn stats_are_consistent(steps in proptest::collection::vec(step(), 0..50)) {
        let stats = build(&steps).stats();

        prop_assert_eq!(stats.total, stats.stored + stats.floor);
        prop_assert_eq!(stats.sails_by_client.values().sum::<usize>(), stats.total);
        prop_assert!(stats.sails_by_client.values().all(|count| *count >= 1));
        prop_assert_eq!(stats.oldest_sail.is_some(), stats.total > 0);
    }
}
