use realm_catalog::Catalog;
use realm_core::{
    ChitCategory, ChitLocation, Command, Dwelling, Edge, SiteKind, TileName, WarningKind,
};
use realm_world::{apply, query, BoardSnapshot, SnapshotError, World};

fn edge(index: u8) -> Edge {
    Edge::new(index).expect("edge in range")
}

fn populated_world() -> World {
    let mut world = World::new(Catalog::canonical());
    let mut events = Vec::new();
    let commands = [
        Command::PlaceAnchor,
        Command::AttachTile {
            tile: TileName::Borderland,
            at_edge: edge(3),
            neighbor: TileName::Cavern,
            neighbor_edge: edge(0),
        },
        Command::FlipTile {
            tile: TileName::Ledges,
        },
        Command::PlaceDwelling {
            tile: TileName::Cavern,
            number: 4,
            dwelling: Dwelling::GuardHouse,
        },
        Command::CreateChit {
            category: ChitCategory::Site(SiteKind::Vault),
        },
        Command::CreateChit {
            category: ChitCategory::Warning {
                kind: WarningKind::Dank,
                biome: realm_core::Biome::Cave,
            },
        },
        Command::PlaceChit {
            chit: realm_core::ChitId::new(0),
            location: ChitLocation::Clearing {
                tile: TileName::Cavern,
                number: 3,
            },
        },
        Command::ConnectRoads,
        Command::ResetSummonedFlags,
    ];
    for command in commands {
        apply(&mut world, command, &mut events);
    }
    world
}

#[test]
fn snapshot_survives_json_round_trip() {
    let world = populated_world();
    let snapshot = world.snapshot();

    let json = serde_json::to_string(&snapshot).expect("serialize snapshot");
    let decoded: BoardSnapshot = serde_json::from_str(&json).expect("deserialize snapshot");
    let restored = World::restore(Catalog::canonical(), &decoded).expect("restore snapshot");

    assert_eq!(restored.snapshot(), snapshot);
    assert_eq!(query::day(&restored), 1);
    assert_eq!(
        query::dwelling(&restored, TileName::Cavern, 4),
        Some(Dwelling::GuardHouse)
    );
    assert_eq!(
        query::side(&restored, TileName::Ledges),
        Some(realm_core::Side::Enchanted)
    );
    let hub = query::clearing_for_edge(&restored, TileName::Borderland, edge(3))
        .expect("edge road");
    assert_eq!(
        query::roads_at(&restored, hub),
        query::roads_at(&world, hub)
    );
}

#[test]
fn restore_rejects_foreign_catalog_versions() {
    let mut snapshot = populated_world().snapshot();
    snapshot.catalog_version += 1;
    assert!(matches!(
        World::restore(Catalog::canonical(), &snapshot),
        Err(SnapshotError::CatalogVersion { .. })
    ));
}

#[test]
fn restore_rejects_one_sided_links() {
    let mut snapshot = populated_world().snapshot();
    let cavern = snapshot
        .tiles
        .iter_mut()
        .find(|record| record.name == TileName::Cavern)
        .expect("cavern recorded");
    cavern.neighbors = [None; 6];

    assert_eq!(
        World::restore(Catalog::canonical(), &snapshot).err(),
        Some(SnapshotError::InconsistentLink {
            tile: TileName::Borderland,
            edge: edge(3),
        })
    );
}

#[test]
fn restore_rejects_overlapping_tiles() {
    let mut snapshot = populated_world().snapshot();
    let anchor_position = snapshot.tiles[0].position;
    let cavern = snapshot
        .tiles
        .iter_mut()
        .find(|record| record.name == TileName::Cavern)
        .expect("cavern recorded");
    cavern.position = anchor_position;

    assert!(matches!(
        World::restore(Catalog::canonical(), &snapshot),
        Err(SnapshotError::Overlap(_))
    ));
}

#[test]
fn restore_rejects_a_rotated_anchor() {
    let mut snapshot = populated_world().snapshot();
    let anchor = snapshot
        .tiles
        .iter_mut()
        .find(|record| record.name == TileName::Borderland)
        .expect("anchor recorded");
    anchor.facing = realm_core::Facing::new(4).expect("facing in range");

    assert_eq!(
        World::restore(Catalog::canonical(), &snapshot).err(),
        Some(SnapshotError::AnchorMisplaced(TileName::Borderland))
    );
}

#[test]
fn restore_rejects_adjacent_tiles_without_a_link() {
    let mut snapshot = populated_world().snapshot();
    for record in &mut snapshot.tiles {
        record.neighbors = [None; 6];
    }

    assert_eq!(
        World::restore(Catalog::canonical(), &snapshot).err(),
        Some(SnapshotError::MissingLink {
            tile: TileName::Borderland,
            edge: edge(3),
        })
    );
}

#[test]
fn restore_rejects_chits_in_missing_clearings() {
    let mut snapshot = populated_world().snapshot();
    // Valleys only have clearings 1, 2, 4 and 5.
    snapshot.chits[0].location = ChitLocation::Clearing {
        tile: TileName::AwfulValley,
        number: 6,
    };

    assert_eq!(
        World::restore(Catalog::canonical(), &snapshot).err(),
        Some(SnapshotError::InvalidChitLocation(snapshot.chits[0].id))
    );
}

#[test]
fn restore_rejects_chits_stored_in_ordinary_chits() {
    let mut snapshot = populated_world().snapshot();
    snapshot.chits[1].location = ChitLocation::Container(snapshot.chits[0].id);

    assert_eq!(
        World::restore(Catalog::canonical(), &snapshot).err(),
        Some(SnapshotError::InvalidChitLocation(snapshot.chits[1].id))
    );
}
