#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Immutable tile template catalog consumed by the Realm board engine.
//!
//! A [`Catalog`] describes every tile type once: its biome, its two printed
//! sides, the clearings on each side and the roads linking clearings to each
//! other and to tile edges. Catalogs are validated on construction, so every
//! catalog that exists is structurally sound and the rest of the engine never
//! re-checks template data.

use std::collections::BTreeSet;

use realm_core::{Biome, Edge, RoadKind, Side, TileName, EDGE_COUNT, MAX_CLEARINGS};
use serde::{Deserialize, Serialize};

mod canonical;

/// Version stamped on the built-in catalog.
pub const CANONICAL_VERSION: u32 = 1;

/// Default local offset of each clearing number, indexed by `number - 1`.
const DEFAULT_LAYOUT: [(i32, i32); MAX_CLEARINGS as usize] = [
    (-35, -50),
    (35, -50),
    (60, 0),
    (30, 50),
    (-30, 50),
    (-60, 0),
];

/// Errors that make a catalog unusable. All of them are fatal at startup.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// The catalog text could not be parsed.
    #[error("could not parse catalog: {0}")]
    Parse(#[from] toml::de::Error),
    /// The catalog defines no tiles at all.
    #[error("catalog defines no tiles")]
    NoTiles,
    /// A tile name appears more than once.
    #[error("tile {0} is defined more than once")]
    DuplicateTile(TileName),
    /// The catalog must designate exactly one anchor tile.
    #[error("catalog designates {0} anchor tiles, expected exactly one")]
    AnchorCount(usize),
    /// The anchor tile lacks the clearing connectivity is measured from.
    #[error("anchor tile {0} has no clearing 1 on its {1:?} side")]
    AnchorWithoutClearingOne(TileName, Side),
    /// A side defines no clearings.
    #[error("{tile} {side:?} side defines no clearings")]
    EmptySide {
        /// Offending tile.
        tile: TileName,
        /// Offending side.
        side: Side,
    },
    /// A clearing number lies outside `1..=6`.
    #[error("{tile} {side:?} side defines clearing {number}, outside 1..=6")]
    ClearingOutOfRange {
        /// Offending tile.
        tile: TileName,
        /// Offending side.
        side: Side,
        /// Offending number.
        number: u8,
    },
    /// A clearing number is defined twice on one side.
    #[error("{tile} {side:?} side defines clearing {number} twice")]
    DuplicateClearing {
        /// Offending tile.
        tile: TileName,
        /// Offending side.
        side: Side,
        /// Offending number.
        number: u8,
    },
    /// A road references a clearing the side does not define.
    #[error("{tile} {side:?} side has a road touching missing clearing {number}")]
    MissingClearing {
        /// Offending tile.
        tile: TileName,
        /// Offending side.
        side: Side,
        /// Missing number.
        number: u8,
    },
    /// A road starts and ends in the same clearing.
    #[error("{tile} {side:?} side has a road looping on clearing {number}")]
    SelfRoad {
        /// Offending tile.
        tile: TileName,
        /// Offending side.
        side: Side,
        /// Looping clearing.
        number: u8,
    },
    /// Two roads leave through the same edge.
    #[error("{tile} {side:?} side routes more than one road through edge {edge:?}")]
    EdgeReused {
        /// Offending tile.
        tile: TileName,
        /// Offending side.
        side: Side,
        /// Shared edge.
        edge: Edge,
    },
    /// The two sides of a tile disagree on which edges carry roads.
    #[error("{0} has different road edges on its normal and enchanted sides")]
    SideEdgeMismatch(TileName),
    /// An all-clearings tile is missing one of its six clearings.
    #[error("all-clearings tile {tile} lacks clearing {number} on its {side:?} side")]
    IncompleteAllClearings {
        /// Offending tile.
        tile: TileName,
        /// Offending side.
        side: Side,
        /// Missing number.
        number: u8,
    },
}

/// Endpoint of a template road opposite its starting clearing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoadEnd {
    /// Another clearing on the same side.
    Clearing(u8),
    /// A tile edge, continuing into whatever neighbor is placed there.
    Edge(Edge),
}

/// Template clearing: a number and its offset from the tile centre.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClearingTemplate {
    number: u8,
    x: i32,
    y: i32,
}

impl ClearingTemplate {
    /// One-based clearing number.
    #[must_use]
    pub const fn number(&self) -> u8 {
        self.number
    }

    /// Offset from the tile centre in the unrotated tile frame.
    #[must_use]
    pub const fn offset(&self) -> (i32, i32) {
        (self.x, self.y)
    }
}

/// Template road leaving a clearing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoadTemplate {
    from: u8,
    to: RoadEnd,
    #[serde(default)]
    kind: RoadKind,
}

impl RoadTemplate {
    /// Clearing the road starts in.
    #[must_use]
    pub const fn from(&self) -> u8 {
        self.from
    }

    /// Far end of the road.
    #[must_use]
    pub const fn to(&self) -> RoadEnd {
        self.to
    }

    /// Visibility class of the road.
    #[must_use]
    pub const fn kind(&self) -> RoadKind {
        self.kind
    }
}

/// Clearings and roads printed on one side of a tile.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SideTemplate {
    clearings: Vec<ClearingTemplate>,
    #[serde(default)]
    roads: Vec<RoadTemplate>,
}

impl SideTemplate {
    /// Creates an empty side to be filled through the builder methods.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds clearings at their default layout positions.
    #[must_use]
    pub fn with_clearings(mut self, numbers: &[u8]) -> Self {
        for &number in numbers {
            let (x, y) = usize::from(number)
                .checked_sub(1)
                .and_then(|slot| DEFAULT_LAYOUT.get(slot))
                .copied()
                .unwrap_or((0, 0));
            self.clearings.push(ClearingTemplate { number, x, y });
        }
        self
    }

    /// Adds a clearing at an explicit offset.
    #[must_use]
    pub fn with_clearing_at(mut self, number: u8, x: i32, y: i32) -> Self {
        self.clearings.push(ClearingTemplate { number, x, y });
        self
    }

    /// Adds a plain road between two clearings.
    #[must_use]
    pub fn road(self, from: u8, to: u8) -> Self {
        self.road_of(RoadKind::Plain, from, to)
    }

    /// Adds a road of the given kind between two clearings.
    #[must_use]
    pub fn road_of(mut self, kind: RoadKind, from: u8, to: u8) -> Self {
        self.roads.push(RoadTemplate {
            from,
            to: RoadEnd::Clearing(to),
            kind,
        });
        self
    }

    /// Adds a plain road from a clearing out through a local edge.
    #[must_use]
    pub fn exit(self, from: u8, edge: Edge) -> Self {
        self.exit_of(RoadKind::Plain, from, edge)
    }

    /// Adds a road of the given kind from a clearing out through a local edge.
    #[must_use]
    pub fn exit_of(mut self, kind: RoadKind, from: u8, edge: Edge) -> Self {
        self.roads.push(RoadTemplate {
            from,
            to: RoadEnd::Edge(edge),
            kind,
        });
        self
    }

    /// Clearings defined on this side.
    #[must_use]
    pub fn clearings(&self) -> &[ClearingTemplate] {
        &self.clearings
    }

    /// Roads defined on this side.
    #[must_use]
    pub fn roads(&self) -> &[RoadTemplate] {
        &self.roads
    }

    /// Looks up a clearing by number.
    #[must_use]
    pub fn clearing(&self, number: u8) -> Option<&ClearingTemplate> {
        self.clearings.iter().find(|clearing| clearing.number == number)
    }

    /// Local edges that carry a road.
    #[must_use]
    pub fn road_edges(&self) -> [bool; EDGE_COUNT] {
        let mut edges = [false; EDGE_COUNT];
        for road in &self.roads {
            if let RoadEnd::Edge(edge) = road.to {
                edges[edge.index()] = true;
            }
        }
        edges
    }

    /// Clearing and road kind terminating the road at a local edge.
    #[must_use]
    pub fn clearing_for_edge(&self, edge: Edge) -> Option<(u8, RoadKind)> {
        self.roads.iter().find_map(|road| match road.to {
            RoadEnd::Edge(candidate) if candidate == edge => Some((road.from, road.kind)),
            _ => None,
        })
    }

    /// Clearings linked to `number` by an internal road, with the road kind.
    pub fn internal_roads_from(&self, number: u8) -> impl Iterator<Item = (u8, RoadKind)> + '_ {
        self.roads.iter().filter_map(move |road| match road.to {
            RoadEnd::Clearing(to) if road.from == number => Some((to, road.kind)),
            RoadEnd::Clearing(to) if to == number => Some((road.from, road.kind)),
            _ => None,
        })
    }

    /// Local edges whose road terminates in clearing `number`, with the road kind.
    pub fn edges_from(&self, number: u8) -> impl Iterator<Item = (Edge, RoadKind)> + '_ {
        self.roads.iter().filter_map(move |road| match road.to {
            RoadEnd::Edge(edge) if road.from == number => Some((edge, road.kind)),
            _ => None,
        })
    }

    fn validate(&self, tile: TileName, side: Side) -> Result<(), CatalogError> {
        if self.clearings.is_empty() {
            return Err(CatalogError::EmptySide { tile, side });
        }

        let mut numbers = BTreeSet::new();
        for clearing in &self.clearings {
            let number = clearing.number;
            if number == 0 || number > MAX_CLEARINGS {
                return Err(CatalogError::ClearingOutOfRange { tile, side, number });
            }
            if !numbers.insert(number) {
                return Err(CatalogError::DuplicateClearing { tile, side, number });
            }
        }

        let mut used_edges = [false; EDGE_COUNT];
        for road in &self.roads {
            if !numbers.contains(&road.from) {
                return Err(CatalogError::MissingClearing {
                    tile,
                    side,
                    number: road.from,
                });
            }
            match road.to {
                RoadEnd::Clearing(to) if to == road.from => {
                    return Err(CatalogError::SelfRoad {
                        tile,
                        side,
                        number: to,
                    });
                }
                RoadEnd::Clearing(to) if !numbers.contains(&to) => {
                    return Err(CatalogError::MissingClearing {
                        tile,
                        side,
                        number: to,
                    });
                }
                RoadEnd::Clearing(_) => {}
                RoadEnd::Edge(edge) => {
                    if used_edges[edge.index()] {
                        return Err(CatalogError::EdgeReused { tile, side, edge });
                    }
                    used_edges[edge.index()] = true;
                }
            }
        }

        Ok(())
    }
}

/// Static description of one tile type.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileTemplate {
    name: TileName,
    biome: Biome,
    #[serde(default)]
    anchor: bool,
    #[serde(default)]
    all_clearings: bool,
    normal: SideTemplate,
    enchanted: SideTemplate,
}

impl TileTemplate {
    /// Creates an ordinary tile template.
    #[must_use]
    pub fn new(name: TileName, biome: Biome, normal: SideTemplate, enchanted: SideTemplate) -> Self {
        Self {
            name,
            biome,
            anchor: false,
            all_clearings: false,
            normal,
            enchanted,
        }
    }

    /// Marks the template as the anchor tile.
    #[must_use]
    pub fn as_anchor(mut self) -> Self {
        self.anchor = true;
        self
    }

    /// Marks the template as requiring every clearing to reach the anchor.
    #[must_use]
    pub fn requiring_all_clearings(mut self) -> Self {
        self.all_clearings = true;
        self
    }

    /// Tile identity.
    #[must_use]
    pub const fn name(&self) -> TileName {
        self.name
    }

    /// Terrain family.
    #[must_use]
    pub const fn biome(&self) -> Biome {
        self.biome
    }

    /// Whether the tile is the fixed anchor.
    #[must_use]
    pub const fn is_anchor(&self) -> bool {
        self.anchor
    }

    /// Whether all six clearings must reach the anchor.
    #[must_use]
    pub const fn requires_all_clearings(&self) -> bool {
        self.all_clearings
    }

    /// Template for the given side.
    #[must_use]
    pub const fn side(&self, side: Side) -> &SideTemplate {
        match side {
            Side::Normal => &self.normal,
            Side::Enchanted => &self.enchanted,
        }
    }

    fn validate(&self) -> Result<(), CatalogError> {
        for side in Side::ALL {
            let template = self.side(side);
            template.validate(self.name, side)?;

            if self.anchor && template.clearing(1).is_none() {
                return Err(CatalogError::AnchorWithoutClearingOne(self.name, side));
            }

            if self.all_clearings {
                if let Some(number) = (1..=MAX_CLEARINGS).find(|n| template.clearing(*n).is_none()) {
                    return Err(CatalogError::IncompleteAllClearings {
                        tile: self.name,
                        side,
                        number,
                    });
                }
            }
        }

        if self.normal.road_edges() != self.enchanted.road_edges() {
            return Err(CatalogError::SideEdgeMismatch(self.name));
        }

        Ok(())
    }
}

#[derive(Deserialize)]
struct RawCatalog {
    version: u32,
    tiles: Vec<TileTemplate>,
}

/// Validated, immutable set of tile templates.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Catalog {
    version: u32,
    anchor: TileName,
    tiles: Vec<TileTemplate>,
}

impl Catalog {
    /// Validates the provided templates and assembles them into a catalog.
    pub fn new(version: u32, tiles: Vec<TileTemplate>) -> Result<Self, CatalogError> {
        if tiles.is_empty() {
            return Err(CatalogError::NoTiles);
        }

        let mut seen = BTreeSet::new();
        for template in &tiles {
            if !seen.insert(template.name) {
                return Err(CatalogError::DuplicateTile(template.name));
            }
            template.validate()?;
        }

        let anchors: Vec<TileName> = tiles
            .iter()
            .filter(|template| template.anchor)
            .map(TileTemplate::name)
            .collect();
        let [anchor] = anchors.as_slice() else {
            return Err(CatalogError::AnchorCount(anchors.len()));
        };

        Ok(Self {
            version,
            anchor: *anchor,
            tiles,
        })
    }

    /// The built-in twenty tile catalog.
    #[must_use]
    pub fn canonical() -> Self {
        let tiles = canonical::templates();
        let anchor = tiles
            .iter()
            .find(|template| template.anchor)
            .map_or(TileName::Borderland, TileTemplate::name);
        Self {
            version: CANONICAL_VERSION,
            anchor,
            tiles,
        }
    }

    /// Parses and validates a catalog written in TOML.
    pub fn from_toml_str(text: &str) -> Result<Self, CatalogError> {
        let raw: RawCatalog = toml::from_str(text)?;
        Self::new(raw.version, raw.tiles)
    }

    /// Version stamp of the catalog data.
    #[must_use]
    pub const fn version(&self) -> u32 {
        self.version
    }

    /// Name of the anchor tile.
    #[must_use]
    pub const fn anchor(&self) -> TileName {
        self.anchor
    }

    /// Every template in catalog order.
    #[must_use]
    pub fn tiles(&self) -> &[TileTemplate] {
        &self.tiles
    }

    /// Looks up the template of a tile.
    #[must_use]
    pub fn template(&self, name: TileName) -> Option<&TileTemplate> {
        self.tiles.iter().find(|template| template.name == name)
    }
}
