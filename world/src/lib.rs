#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative board state for the Realm engine.
//!
//! The world owns the tile graph, the chit registry and the session flags.
//! Every mutation arrives as a [`Command`] through [`apply`], which reports
//! what changed as [`Event`] values; read access goes through [`query`].

mod chits;
mod graph;
mod snapshot;

use realm_catalog::Catalog;
use realm_core::{
    ChitCategory, ChitFace, ChitId, ChitLocation, Command, Event, TileName,
};

use chits::ChitRegistry;

pub use graph::{AttachOutcome, Detachment, Placement, Road, RoadTarget, TileGraph};
pub use snapshot::{BoardSnapshot, ChitRecord, DwellingRecord, SnapshotError, TileRecord};

/// Flags that persist for a whole session rather than a single day.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SessionFlags {
    /// Whether the vault has been opened.
    pub vault_opened: bool,
}

/// Represents the authoritative board state.
#[derive(Debug)]
pub struct World {
    graph: TileGraph,
    chits: ChitRegistry,
    flags: SessionFlags,
    day: u32,
}

impl World {
    /// Creates an empty board for the provided catalog.
    #[must_use]
    pub fn new(catalog: Catalog) -> Self {
        Self {
            graph: TileGraph::new(catalog),
            chits: ChitRegistry::new(),
            flags: SessionFlags::default(),
            day: 0,
        }
    }

    fn reveal_tile(&mut self, tile: TileName, out_events: &mut Vec<Event>) {
        for chit in self.chits.on_tile(tile) {
            let Some(state) = self.chits.get_mut(chit) else {
                continue;
            };
            if state.face == ChitFace::Hidden {
                state.face = ChitFace::FaceUp;
                out_events.push(Event::ChitRevealed { chit });
            }
            if matches!(state.category, ChitCategory::SuperSite(_)) {
                self.expand_super_site(chit, tile, out_events);
            }
        }
    }

    /// Moves the contents of a revealed container onto its host tile and
    /// discards the container. Contents stay hidden.
    fn expand_super_site(&mut self, container: ChitId, tile: TileName, out_events: &mut Vec<Event>) {
        for chit in self.chits.contents(container) {
            let Some(state) = self.chits.get_mut(chit) else {
                continue;
            };
            let location = match state.category.clearing() {
                Some(number) => ChitLocation::Clearing { tile, number },
                None => ChitLocation::Tile(tile),
            };
            state.location = location;
            out_events.push(Event::ChitPlaced { chit, location });
        }

        if let Some(state) = self.chits.get_mut(container) {
            state.location = ChitLocation::Discarded;
            out_events.push(Event::SuperSiteExpanded {
                chit: container,
                tile,
            });
        }
    }

    /// Checks a location against the board: clearings must exist on the
    /// tile's active side, and containers must be other super-site chits.
    fn accepts_location(&self, chit: ChitId, location: ChitLocation) -> bool {
        match location {
            ChitLocation::Unplaced | ChitLocation::Discarded => true,
            ChitLocation::Tile(tile) => self.graph.template(tile).is_some(),
            ChitLocation::Clearing { tile, number } => {
                match (self.graph.template(tile), self.graph.side(tile)) {
                    (Some(template), Some(side)) => template.side(side).clearing(number).is_some(),
                    _ => false,
                }
            }
            ChitLocation::Container(container) => {
                container != chit
                    && self.chits.get(container).map_or(false, |state| {
                        matches!(state.category, ChitCategory::SuperSite(_))
                    })
            }
        }
    }

    fn place_chit(&mut self, chit: ChitId, location: ChitLocation) -> bool {
        if !self.accepts_location(chit, location) {
            return false;
        }
        match self.chits.get_mut(chit) {
            Some(state) => {
                state.location = location;
                true
            }
            None => false,
        }
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::PlaceAnchor => {
            if world.graph.place_anchor() {
                let tile = world.graph.catalog().anchor();
                out_events.push(Event::AnchorPlaced { tile });
                if let Some(placement) = world.graph.placement(tile) {
                    out_events.push(Event::TilePlaced {
                        tile,
                        position: placement.position,
                        facing: placement.facing,
                    });
                }
            }
        }
        Command::AttachTile {
            tile,
            at_edge,
            neighbor,
            neighbor_edge,
        } => match world.graph.try_attach(tile, at_edge, neighbor, neighbor_edge) {
            Ok(outcome) => {
                out_events.push(Event::TilePlaced {
                    tile: neighbor,
                    position: outcome.placement.position,
                    facing: outcome.placement.facing,
                });
                for (edge, other) in outcome.links {
                    out_events.push(Event::TilesLinked {
                        tile: neighbor,
                        edge,
                        neighbor: other,
                    });
                }
            }
            Err(reason) => out_events.push(Event::AttachRejected {
                tile,
                neighbor,
                reason,
            }),
        },
        Command::DetachTile { tile, edge } => {
            if let Some(detached) = world.graph.detach(tile, edge) {
                out_events.push(Event::TilesUnlinked {
                    tile,
                    edge,
                    neighbor: detached.neighbor,
                });
                for lifted in detached.lifted {
                    out_events.push(Event::TileLifted { tile: lifted });
                }
            }
        }
        Command::LiftTile { tile } => {
            if let Some(removed) = world.graph.lift(tile) {
                for (edge, neighbor) in removed {
                    out_events.push(Event::TilesUnlinked {
                        tile,
                        edge,
                        neighbor,
                    });
                }
                out_events.push(Event::TileLifted { tile });
            }
        }
        Command::ConnectRoads => {
            let (connected, dangling) = world.graph.connect_roads();
            out_events.push(Event::RoadsConnected {
                connected,
                dangling,
            });
        }
        Command::ResetBoard => {
            world.graph.reset();
            world.chits.clear();
            world.flags = SessionFlags::default();
            world.day = 0;
            out_events.push(Event::BoardReset);
        }
        Command::FlipTile { tile } => {
            if let Some(side) = world.graph.flip(tile) {
                out_events.push(Event::TileFlipped { tile, side });
            }
        }
        Command::CreateChit { category } => {
            let chit = world.chits.create(category);
            out_events.push(Event::ChitCreated { chit, category });
        }
        Command::PlaceChit { chit, location } => {
            if world.place_chit(chit, location) {
                out_events.push(Event::ChitPlaced { chit, location });
            } else {
                out_events.push(Event::ChitRejected { chit });
            }
        }
        Command::PlaceDwelling {
            tile,
            number,
            dwelling,
        } => {
            if world.graph.place_dwelling(tile, number, dwelling) {
                out_events.push(Event::DwellingPlaced {
                    tile,
                    number,
                    dwelling,
                });
            }
        }
        Command::RevealTile { tile } => world.reveal_tile(tile, out_events),
        Command::SummonChit { chit } => match world.chits.get_mut(chit) {
            Some(state) => {
                state.summoned = true;
                out_events.push(Event::ChitSummoned { chit });
            }
            None => out_events.push(Event::ChitRejected { chit }),
        },
        Command::ResetSummonedFlags => {
            let cleared = world.chits.reset_summoned();
            world.day = world.day.saturating_add(1);
            out_events.push(Event::SummonedFlagsReset {
                cleared,
                day: world.day,
            });
        }
        Command::OpenVault => {
            world.flags.vault_opened = true;
            out_events.push(Event::VaultOpened);
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use realm_catalog::{Catalog, TileTemplate};
    use realm_core::{
        Biome, ChitId, ChitSnapshot, ClearingId, Dwelling, Edge, Side, TileName, TileSnapshot,
        EDGE_COUNT,
    };

    use super::{Road, SessionFlags, TileGraph, World};

    /// Provides read-only access to the tile graph, which also serves as the road graph.
    #[must_use]
    pub fn graph(world: &World) -> &TileGraph {
        &world.graph
    }

    /// Catalog the board draws from.
    #[must_use]
    pub fn catalog(world: &World) -> &Catalog {
        world.graph.catalog()
    }

    /// Template of a catalog tile.
    #[must_use]
    pub fn template(world: &World, tile: TileName) -> Option<&TileTemplate> {
        world.graph.template(tile)
    }

    /// Name of the anchor tile.
    #[must_use]
    pub fn anchor(world: &World) -> TileName {
        world.graph.catalog().anchor()
    }

    /// Clearing 1 of the anchor's active side, the root of connectivity checks.
    #[must_use]
    pub fn anchor_clearing(world: &World) -> Option<ClearingId> {
        let anchor = anchor(world);
        if !world.graph.is_placed(anchor) {
            return None;
        }
        let side = world.graph.side(anchor)?;
        ClearingId::new(anchor, side, 1)
    }

    /// Terrain family of a catalog tile.
    #[must_use]
    pub fn biome(world: &World, tile: TileName) -> Option<Biome> {
        world.graph.template(tile).map(TileTemplate::biome)
    }

    /// Reports whether the tile is on the board.
    #[must_use]
    pub fn is_placed(world: &World, tile: TileName) -> bool {
        world.graph.is_placed(tile)
    }

    /// Side of a catalog tile currently face up.
    #[must_use]
    pub fn side(world: &World, tile: TileName) -> Option<Side> {
        world.graph.side(tile)
    }

    /// Placed tiles in catalog order.
    #[must_use]
    pub fn placed_tiles(world: &World) -> Vec<TileName> {
        world.graph.placed_tiles()
    }

    /// Catalog tiles still in the pool, in catalog order.
    #[must_use]
    pub fn unplaced_tiles(world: &World) -> Vec<TileName> {
        world
            .graph
            .catalog()
            .tiles()
            .iter()
            .map(TileTemplate::name)
            .filter(|name| !world.graph.is_placed(*name))
            .collect()
    }

    /// Snapshot of a placed tile.
    #[must_use]
    pub fn tile(world: &World, tile: TileName) -> Option<TileSnapshot> {
        world.graph.tile_snapshot(tile)
    }

    /// Snapshots of every placed tile in catalog order.
    #[must_use]
    pub fn tiles(world: &World) -> Vec<TileSnapshot> {
        world
            .graph
            .placed_tiles()
            .into_iter()
            .filter_map(|name| world.graph.tile_snapshot(name))
            .collect()
    }

    /// Tile linked across a board edge.
    #[must_use]
    pub fn neighbor(world: &World, tile: TileName, edge: Edge) -> Option<TileName> {
        world.graph.neighbor(tile, edge)
    }

    /// Board edges of a placed tile that carry a road.
    #[must_use]
    pub fn road_edges(world: &World, tile: TileName) -> Option<[bool; EDGE_COUNT]> {
        world.graph.road_edges(tile)
    }

    /// Clearing terminating the road at a board edge of a placed tile.
    #[must_use]
    pub fn clearing_for_edge(world: &World, tile: TileName, edge: Edge) -> Option<ClearingId> {
        world.graph.clearing_for_edge(tile, edge)
    }

    /// Clearings on the active side of a placed tile.
    #[must_use]
    pub fn clearings(world: &World, tile: TileName) -> Vec<ClearingId> {
        world.graph.clearings(tile)
    }

    /// Materialized roads touching a clearing. Empty until roads are connected.
    #[must_use]
    pub fn roads_at(world: &World, clearing: ClearingId) -> Vec<Road> {
        world.graph.roads_at(clearing).copied().collect()
    }

    /// Dwelling standing in a clearing.
    #[must_use]
    pub fn dwelling(world: &World, tile: TileName, number: u8) -> Option<Dwelling> {
        world.graph.dwelling(tile, number)
    }

    /// Snapshot of one chit.
    #[must_use]
    pub fn chit(world: &World, chit: ChitId) -> Option<ChitSnapshot> {
        world.chits.snapshot(chit)
    }

    /// Snapshots of every chit in identifier order.
    #[must_use]
    pub fn chits(world: &World) -> Vec<ChitSnapshot> {
        world.chits.snapshots()
    }

    /// Chits held by a tile or one of its clearings.
    #[must_use]
    pub fn chits_on_tile(world: &World, tile: TileName) -> Vec<ChitSnapshot> {
        world
            .chits
            .on_tile(tile)
            .into_iter()
            .filter_map(|chit| world.chits.snapshot(chit))
            .collect()
    }

    /// Chits stored inside a container.
    #[must_use]
    pub fn container_contents(world: &World, container: ChitId) -> Vec<ChitSnapshot> {
        world
            .chits
            .contents(container)
            .into_iter()
            .filter_map(|chit| world.chits.snapshot(chit))
            .collect()
    }

    /// Session-wide flags.
    #[must_use]
    pub fn session_flags(world: &World) -> SessionFlags {
        world.flags
    }

    /// Number of day boundaries crossed since the board was set up.
    #[must_use]
    pub fn day(world: &World) -> u32 {
        world.day
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use realm_core::{Edge, SiteKind, SoundKind, SuperSiteKind};

    fn edge(index: u8) -> Edge {
        Edge::new(index).expect("edge in range")
    }

    fn world() -> World {
        let mut world = World::new(Catalog::canonical());
        let mut events = Vec::new();
        apply(&mut world, Command::PlaceAnchor, &mut events);
        world
    }

    #[test]
    fn place_anchor_reports_origin_placement() {
        let mut world = World::new(Catalog::canonical());
        let mut events = Vec::new();
        apply(&mut world, Command::PlaceAnchor, &mut events);

        assert_eq!(
            events.first(),
            Some(&Event::AnchorPlaced {
                tile: TileName::Borderland
            })
        );
        assert_eq!(query::placed_tiles(&world), vec![TileName::Borderland]);
        assert!(query::anchor_clearing(&world).is_some());

        events.clear();
        apply(&mut world, Command::PlaceAnchor, &mut events);
        assert!(events.is_empty());
    }

    #[test]
    fn rejected_attach_leaves_world_untouched() {
        let mut world = world();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::AttachTile {
                tile: TileName::Cavern,
                at_edge: edge(0),
                neighbor: TileName::Crag,
                neighbor_edge: edge(0),
            },
            &mut events,
        );

        assert_eq!(
            events,
            vec![Event::AttachRejected {
                tile: TileName::Cavern,
                neighbor: TileName::Crag,
                reason: realm_core::AttachError::TargetNotPlaced,
            }]
        );
        assert_eq!(query::placed_tiles(&world).len(), 1);
    }

    #[test]
    fn lift_reports_every_removed_link() {
        let mut world = world();
        let mut events = Vec::new();
        // Borderland's edge 3 road leaves clearing 5; Cavern's local edge 0 carries a road.
        apply(
            &mut world,
            Command::AttachTile {
                tile: TileName::Borderland,
                at_edge: edge(3),
                neighbor: TileName::Cavern,
                neighbor_edge: edge(0),
            },
            &mut events,
        );
        assert!(matches!(events.first(), Some(Event::TilePlaced { .. })));

        events.clear();
        apply(
            &mut world,
            Command::LiftTile {
                tile: TileName::Cavern,
            },
            &mut events,
        );
        assert_eq!(
            events.last(),
            Some(&Event::TileLifted {
                tile: TileName::Cavern
            })
        );
        assert!(!query::is_placed(&world, TileName::Cavern));
        assert_eq!(query::neighbor(&world, TileName::Borderland, edge(3)), None);
    }

    #[test]
    fn detached_tile_returns_to_the_pool() {
        let mut world = world();
        let attach = Command::AttachTile {
            tile: TileName::Borderland,
            at_edge: edge(3),
            neighbor: TileName::Cavern,
            neighbor_edge: edge(0),
        };
        let mut events = Vec::new();
        apply(&mut world, attach.clone(), &mut events);

        events.clear();
        apply(
            &mut world,
            Command::DetachTile {
                tile: TileName::Borderland,
                edge: edge(3),
            },
            &mut events,
        );
        assert_eq!(
            events,
            vec![
                Event::TilesUnlinked {
                    tile: TileName::Borderland,
                    edge: edge(3),
                    neighbor: TileName::Cavern,
                },
                Event::TileLifted {
                    tile: TileName::Cavern
                },
            ]
        );
        assert!(!query::is_placed(&world, TileName::Cavern));

        events.clear();
        apply(&mut world, attach, &mut events);
        assert!(matches!(
            events.first(),
            Some(Event::TilePlaced {
                tile: TileName::Cavern,
                ..
            })
        ));
    }

    #[test]
    fn revealing_a_super_site_expands_its_contents() {
        let mut world = world();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::CreateChit {
                category: ChitCategory::SuperSite(SuperSiteKind::LostCity),
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::CreateChit {
                category: ChitCategory::Site(SiteKind::Altar),
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::CreateChit {
                category: ChitCategory::Sound {
                    kind: SoundKind::Howl,
                    clearing: 4,
                },
            },
            &mut events,
        );
        let city = ChitId::new(0);
        for inner in [ChitId::new(1), ChitId::new(2)] {
            apply(
                &mut world,
                Command::PlaceChit {
                    chit: inner,
                    location: ChitLocation::Container(city),
                },
                &mut events,
            );
        }
        apply(
            &mut world,
            Command::PlaceChit {
                chit: city,
                location: ChitLocation::Tile(TileName::Caves),
            },
            &mut events,
        );

        events.clear();
        apply(
            &mut world,
            Command::RevealTile {
                tile: TileName::Caves,
            },
            &mut events,
        );

        assert!(events.contains(&Event::ChitRevealed { chit: city }));
        assert!(events.contains(&Event::SuperSiteExpanded {
            chit: city,
            tile: TileName::Caves
        }));
        let container = query::chit(&world, city).expect("container exists");
        assert_eq!(container.location, ChitLocation::Discarded);
        assert!(query::container_contents(&world, city).is_empty());

        let altar = query::chit(&world, ChitId::new(1)).expect("altar exists");
        assert_eq!(
            altar.location,
            ChitLocation::Clearing {
                tile: TileName::Caves,
                number: 1
            }
        );
        assert_eq!(altar.face, ChitFace::Hidden);
        let howl = query::chit(&world, ChitId::new(2)).expect("sound exists");
        assert_eq!(
            howl.location,
            ChitLocation::Clearing {
                tile: TileName::Caves,
                number: 4
            }
        );
    }

    #[test]
    fn chits_cannot_be_stored_in_ordinary_chits() {
        let mut world = world();
        let mut events = Vec::new();
        for site in [SiteKind::Altar, SiteKind::Pool] {
            apply(
                &mut world,
                Command::CreateChit {
                    category: ChitCategory::Site(site),
                },
                &mut events,
            );
        }
        events.clear();
        apply(
            &mut world,
            Command::PlaceChit {
                chit: ChitId::new(1),
                location: ChitLocation::Container(ChitId::new(0)),
            },
            &mut events,
        );
        assert_eq!(
            events,
            vec![Event::ChitRejected {
                chit: ChitId::new(1)
            }]
        );
    }

    #[test]
    fn day_boundary_clears_summoned_flags() {
        let mut world = world();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::CreateChit {
                category: ChitCategory::Site(SiteKind::Shrine),
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::SummonChit {
                chit: ChitId::new(0),
            },
            &mut events,
        );
        apply(&mut world, Command::OpenVault, &mut events);
        assert!(query::chits(&world)[0].summoned);

        events.clear();
        apply(&mut world, Command::ResetSummonedFlags, &mut events);
        assert_eq!(
            events,
            vec![Event::SummonedFlagsReset { cleared: 1, day: 1 }]
        );
        assert!(!query::chits(&world)[0].summoned);
        assert!(query::session_flags(&world).vault_opened);

        apply(&mut world, Command::ResetBoard, &mut events);
        assert!(query::chits(&world).is_empty());
        assert_eq!(query::day(&world), 0);
        assert!(!query::session_flags(&world).vault_opened);
        assert!(query::placed_tiles(&world).is_empty());
    }
}
