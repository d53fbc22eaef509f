use realm_catalog::{Catalog, SideTemplate, TileTemplate};
use realm_core::{Biome, Command, Edge, TileName};
use realm_system_bootstrap::{Bootstrap, Config, SetupError};
use realm_world::{self as world, query, BoardSnapshot, SnapshotError, World};

#[test]
fn same_seed_yields_same_board_and_chits() {
    let bootstrap = Bootstrap::new(Config::new(31));
    let first = bootstrap.generate(Catalog::canonical()).expect("first run");
    let second = bootstrap.generate(Catalog::canonical()).expect("second run");

    assert_eq!(first.attempts, second.attempts);
    assert_eq!(first.world.snapshot(), second.world.snapshot());
    assert_eq!(first.distribution, second.distribution);
}

#[test]
fn saved_session_restores_without_assembly() {
    let bootstrap = Bootstrap::new(Config::new(404));
    let session = bootstrap.generate(Catalog::canonical()).expect("board assembles");
    let saved = session.world.snapshot();

    let json = serde_json::to_string(&saved).expect("snapshot serializes");
    let loaded: BoardSnapshot = serde_json::from_str(&json).expect("snapshot parses");
    let restored = bootstrap
        .restore(Catalog::canonical(), &loaded)
        .expect("snapshot restores");

    assert_eq!(restored.snapshot(), saved);
    assert_eq!(query::tiles(&restored), query::tiles(&session.world));
    assert_eq!(query::chits(&restored), query::chits(&session.world));
}

#[test]
fn tampered_snapshot_is_rejected() {
    let bootstrap = Bootstrap::new(Config::new(9));
    let session = bootstrap.generate(Catalog::canonical()).expect("board assembles");
    let mut saved = session.world.snapshot();
    saved.catalog_version += 1;

    let error = bootstrap
        .restore(Catalog::canonical(), &saved)
        .expect_err("version mismatch");
    assert!(matches!(
        error,
        SetupError::Restore(SnapshotError::CatalogVersion { .. })
    ));
}

fn edge(index: u8) -> Edge {
    Edge::new(index).expect("edge in range")
}

#[test]
fn saved_board_with_an_isolated_tile_is_rejected() {
    // The anchor only has a road north; the spoke's single road points away.
    let anchor = SideTemplate::new().with_clearings(&[1]).exit(1, edge(0));
    let spoke = SideTemplate::new()
        .with_clearings(&[1, 2])
        .road(1, 2)
        .exit(2, edge(0));
    let catalog = || {
        Catalog::new(
            1,
            vec![
                TileTemplate::new(TileName::Borderland, Biome::Cave, anchor.clone(), anchor.clone())
                    .as_anchor(),
                TileTemplate::new(TileName::Crag, Biome::Mountain, spoke.clone(), spoke.clone()),
            ],
        )
        .expect("catalog validates")
    };

    let mut world = World::new(catalog());
    let mut events = Vec::new();
    world::apply(&mut world, Command::PlaceAnchor, &mut events);
    world::apply(
        &mut world,
        Command::AttachTile {
            tile: TileName::Borderland,
            at_edge: edge(3),
            neighbor: TileName::Crag,
            neighbor_edge: edge(3),
        },
        &mut events,
    );
    assert!(query::is_placed(&world, TileName::Crag));
    let saved = world.snapshot();

    assert!(World::restore(catalog(), &saved).is_ok());
    assert_eq!(
        Bootstrap::default().restore(catalog(), &saved).err(),
        Some(SetupError::Disconnected {
            tile: TileName::Crag
        })
    );
}
