//! Serializable board state and validated restoration.

use realm_catalog::Catalog;
use realm_core::{
    BoardCoord, ChitCategory, ChitFace, ChitId, ChitLocation, Dwelling, Edge, Facing, Side,
    TileName, EDGE_COUNT,
};
use serde::{Deserialize, Serialize};

use crate::{
    chits::ChitState,
    graph::Placement,
    SessionFlags, World,
};

/// Placed tile as stored in a [`BoardSnapshot`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileRecord {
    /// Tile identity.
    pub name: TileName,
    /// Axial board coordinate.
    pub position: BoardCoord,
    /// Rotation on the board.
    pub facing: Facing,
    /// Side face up.
    pub side: Side,
    /// Linked neighbor across every board edge.
    pub neighbors: [Option<TileName>; EDGE_COUNT],
}

/// Dwelling as stored in a [`BoardSnapshot`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DwellingRecord {
    /// Host tile.
    pub tile: TileName,
    /// Clearing number.
    pub number: u8,
    /// Dwelling standing there.
    pub dwelling: Dwelling,
}

/// Chit as stored in a [`BoardSnapshot`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChitRecord {
    /// Identifier allocated by the world.
    pub id: ChitId,
    /// Category.
    pub category: ChitCategory,
    /// Location.
    pub location: ChitLocation,
    /// Visibility.
    pub face: ChitFace,
    /// Summoned today.
    pub summoned: bool,
}

/// Complete, serializable description of a board.
///
/// Tiles that are not listed are unplaced and lie on their normal side.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardSnapshot {
    /// Version of the catalog the board was built from.
    pub catalog_version: u32,
    /// Placed tiles in catalog order.
    pub tiles: Vec<TileRecord>,
    /// Unplaced tiles that were turned to their enchanted side.
    #[serde(default)]
    pub enchanted_unplaced: Vec<TileName>,
    /// Dwellings on the board.
    #[serde(default)]
    pub dwellings: Vec<DwellingRecord>,
    /// Every chit in identifier order.
    #[serde(default)]
    pub chits: Vec<ChitRecord>,
    /// Whether roads were materialized when the snapshot was taken.
    #[serde(default)]
    pub roads_connected: bool,
    /// Whether the vault was opened.
    #[serde(default)]
    pub vault_opened: bool,
    /// Current day.
    #[serde(default)]
    pub day: u32,
}

/// Reasons a snapshot cannot be restored onto a catalog.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SnapshotError {
    /// The snapshot was taken against a different catalog.
    #[error("snapshot targets catalog version {found}, expected {expected}")]
    CatalogVersion {
        /// Version of the catalog supplied for restoration.
        expected: u32,
        /// Version recorded in the snapshot.
        found: u32,
    },
    /// A tile is not part of the catalog.
    #[error("tile {0} is not part of the catalog")]
    UnknownTile(TileName),
    /// A tile is listed twice or two tiles share a position.
    #[error("tile {0} overlaps another placement")]
    Overlap(TileName),
    /// The anchor is missing, away from the origin or rotated.
    #[error("anchor tile {0} is not placed unrotated at the origin")]
    AnchorMisplaced(TileName),
    /// A recorded link is not reciprocated or does not match geometry.
    #[error("link of {tile} across edge {edge:?} is inconsistent")]
    InconsistentLink {
        /// Tile owning the link.
        tile: TileName,
        /// Board edge of the link.
        edge: Edge,
    },
    /// Two adjacent placed tiles are not linked.
    #[error("{tile} has an unlinked neighbor across edge {edge:?}")]
    MissingLink {
        /// Tile missing the link.
        tile: TileName,
        /// Board edge facing the adjacent tile.
        edge: Edge,
    },
    /// Road presence differs across a recorded link.
    #[error("roads of {tile} across edge {edge:?} do not match its neighbor")]
    RoadMismatch {
        /// Tile owning the link.
        tile: TileName,
        /// Board edge of the link.
        edge: Edge,
    },
    /// A dwelling references a clearing that does not exist.
    #[error("dwelling on {tile} references missing clearing {number}")]
    MissingClearing {
        /// Host tile.
        tile: TileName,
        /// Clearing number.
        number: u8,
    },
    /// A chit identifier appears twice.
    #[error("chit {0:?} is listed more than once")]
    DuplicateChit(ChitId),
    /// A chit sits in a missing clearing or inside something other than a super-site.
    #[error("chit {0:?} has an impossible location")]
    InvalidChitLocation(ChitId),
}

impl World {
    /// Captures the full board state.
    #[must_use]
    pub fn snapshot(&self) -> BoardSnapshot {
        let graph = &self.graph;
        let tiles = graph
            .placed_tiles()
            .into_iter()
            .filter_map(|name| graph.tile_snapshot(name))
            .map(|tile| TileRecord {
                name: tile.name,
                position: tile.position,
                facing: tile.facing,
                side: tile.side,
                neighbors: tile.neighbors,
            })
            .collect();
        let enchanted_unplaced = graph
            .catalog()
            .tiles()
            .iter()
            .map(|template| template.name())
            .filter(|name| !graph.is_placed(*name) && graph.side(*name) == Some(Side::Enchanted))
            .collect();
        let dwellings = graph
            .dwellings()
            .map(|(tile, number, dwelling)| DwellingRecord {
                tile,
                number,
                dwelling,
            })
            .collect();
        let chits = self
            .chits
            .snapshots()
            .into_iter()
            .map(|chit| ChitRecord {
                id: chit.id,
                category: chit.category,
                location: chit.location,
                face: chit.face,
                summoned: chit.summoned,
            })
            .collect();

        BoardSnapshot {
            catalog_version: graph.catalog().version(),
            tiles,
            enchanted_unplaced,
            dwellings,
            chits,
            roads_connected: graph.roads_connected(),
            vault_opened: self.flags.vault_opened,
            day: self.day,
        }
    }

    /// Rebuilds a world from a snapshot, validating it against the catalog.
    ///
    /// Links must be symmetric, point at the geometrically adjacent tile and
    /// agree on road presence, and every adjacent pair must be linked. The
    /// anchor must sit unrotated at the origin, and chits must occupy
    /// locations the world would accept through `PlaceChit`.
    pub fn restore(catalog: Catalog, snapshot: &BoardSnapshot) -> Result<Self, SnapshotError> {
        if catalog.version() != snapshot.catalog_version {
            return Err(SnapshotError::CatalogVersion {
                expected: catalog.version(),
                found: snapshot.catalog_version,
            });
        }

        let anchor = catalog.anchor();
        let mut world = World::new(catalog);

        for record in &snapshot.tiles {
            if world.graph.template(record.name).is_none() {
                return Err(SnapshotError::UnknownTile(record.name));
            }
            let placement = Placement {
                position: record.position,
                facing: record.facing,
            };
            if !world
                .graph
                .restore_placement(record.name, placement, record.side)
            {
                return Err(SnapshotError::Overlap(record.name));
            }
        }

        let fixed = Placement {
            position: BoardCoord::ORIGIN,
            facing: Facing::ZERO,
        };
        if world.graph.placement(anchor) != Some(fixed) && !snapshot.tiles.is_empty() {
            return Err(SnapshotError::AnchorMisplaced(anchor));
        }

        for record in &snapshot.tiles {
            for edge in Edge::ALL {
                let Some(other) = record.neighbors[edge.index()] else {
                    continue;
                };
                let reciprocal = snapshot
                    .tiles
                    .iter()
                    .find(|candidate| candidate.name == other)
                    .and_then(|candidate| candidate.neighbors[edge.opposite().index()]);
                let adjacent = world.graph.tile_at(record.position.neighbor(edge));
                if reciprocal != Some(record.name) || adjacent != Some(other) {
                    return Err(SnapshotError::InconsistentLink {
                        tile: record.name,
                        edge,
                    });
                }
                let mine = world.graph.road_edges(record.name);
                let theirs = world.graph.road_edges(other);
                let matches = match (mine, theirs) {
                    (Some(mine), Some(theirs)) => {
                        mine[edge.index()] == theirs[edge.opposite().index()]
                    }
                    _ => false,
                };
                if !matches {
                    return Err(SnapshotError::RoadMismatch {
                        tile: record.name,
                        edge,
                    });
                }
                world.graph.restore_link(record.name, edge, other);
            }
        }

        for record in &snapshot.tiles {
            for edge in Edge::ALL {
                let adjacent = world.graph.tile_at(record.position.neighbor(edge));
                if adjacent.is_some() && record.neighbors[edge.index()].is_none() {
                    return Err(SnapshotError::MissingLink {
                        tile: record.name,
                        edge,
                    });
                }
            }
        }

        for &name in &snapshot.enchanted_unplaced {
            if world.graph.template(name).is_none() {
                return Err(SnapshotError::UnknownTile(name));
            }
            if world.graph.side(name) == Some(Side::Normal) && !world.graph.is_placed(name) {
                let _ = world.graph.flip(name);
            }
        }

        for record in &snapshot.dwellings {
            if !world
                .graph
                .place_dwelling(record.tile, record.number, record.dwelling)
            {
                return Err(SnapshotError::MissingClearing {
                    tile: record.tile,
                    number: record.number,
                });
            }
        }

        for record in &snapshot.chits {
            let state = ChitState {
                category: record.category,
                location: record.location,
                face: record.face,
                summoned: record.summoned,
            };
            if !world.chits.restore(record.id, state) {
                return Err(SnapshotError::DuplicateChit(record.id));
            }
        }
        for record in &snapshot.chits {
            if !world.accepts_location(record.id, record.location) {
                return Err(SnapshotError::InvalidChitLocation(record.id));
            }
        }

        if snapshot.roads_connected {
            let _ = world.graph.connect_roads();
        }
        world.flags = SessionFlags {
            vault_opened: snapshot.vault_opened,
        };
        world.day = snapshot.day;

        Ok(world)
    }
}
