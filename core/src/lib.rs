#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Realm board engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Systems submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values describing what
//! actually changed. Read access goes through immutable queries and the
//! [`RoadGraph`] trait, which the path finder consumes without knowing how the
//! board is stored.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Number of edges bordering every hexagonal tile.
pub const EDGE_COUNT: usize = 6;

/// Highest clearing number a tile side can define.
pub const MAX_CLEARINGS: u8 = 6;

/// Side length of a tile hexagon measured in world units.
pub const TILE_SIZE: f64 = 100.0;

/// Identity of a tile drawn from the fixed catalog of tile names.
///
/// The discriminant doubles as the tile's stable arena index.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum TileName {
    /// Awful Valley.
    AwfulValley,
    /// Bad Valley.
    BadValley,
    /// Curst Valley.
    CurstValley,
    /// Dark Valley.
    DarkValley,
    /// Evil Valley.
    EvilValley,
    /// Linden Woods.
    LindenWoods,
    /// Maple Woods.
    MapleWoods,
    /// Nut Woods.
    NutWoods,
    /// Oak Woods.
    OakWoods,
    /// Pine Woods.
    PineWoods,
    /// Borderland, the canonical anchor tile.
    Borderland,
    /// Cavern.
    Cavern,
    /// Caves.
    Caves,
    /// High Pass.
    HighPass,
    /// Ruins.
    Ruins,
    /// Cliff.
    Cliff,
    /// Crag.
    Crag,
    /// Deep Woods.
    DeepWoods,
    /// Ledges.
    Ledges,
    /// Mountain.
    Mountain,
}

impl TileName {
    /// Every tile name in arena order.
    pub const ALL: [TileName; 20] = [
        Self::AwfulValley,
        Self::BadValley,
        Self::CurstValley,
        Self::DarkValley,
        Self::EvilValley,
        Self::LindenWoods,
        Self::MapleWoods,
        Self::NutWoods,
        Self::OakWoods,
        Self::PineWoods,
        Self::Borderland,
        Self::Cavern,
        Self::Caves,
        Self::HighPass,
        Self::Ruins,
        Self::Cliff,
        Self::Crag,
        Self::DeepWoods,
        Self::Ledges,
        Self::Mountain,
    ];

    /// Stable arena index of the tile.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Resolves the tile name stored at the provided arena index.
    #[must_use]
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Abbreviation used to derive clearing identifiers.
    #[must_use]
    pub const fn short_name(self) -> &'static str {
        match self {
            Self::AwfulValley => "AV",
            Self::BadValley => "BV",
            Self::CurstValley => "CV",
            Self::DarkValley => "DV",
            Self::EvilValley => "EV",
            Self::LindenWoods => "LW",
            Self::MapleWoods => "MW",
            Self::NutWoods => "NW",
            Self::OakWoods => "OW",
            Self::PineWoods => "PW",
            Self::Borderland => "BL",
            Self::Cavern => "CN",
            Self::Caves => "CS",
            Self::HighPass => "HP",
            Self::Ruins => "R",
            Self::Cliff => "CL",
            Self::Crag => "CG",
            Self::DeepWoods => "DW",
            Self::Ledges => "L",
            Self::Mountain => "M",
        }
    }

    /// Resolves a tile name from its abbreviation, ignoring ASCII case.
    #[must_use]
    pub fn from_short_name(short: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|name| name.short_name().eq_ignore_ascii_case(short))
    }
}

impl fmt::Display for TileName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

/// Terrain family a tile belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Biome {
    /// Open valley tiles that host dwellings.
    Valley,
    /// Forested tiles.
    Woods,
    /// Underground tiles.
    Cave,
    /// Mountainous tiles.
    Mountain,
}

impl Biome {
    /// Every biome in canonical order.
    pub const ALL: [Biome; 4] = [Self::Valley, Self::Woods, Self::Cave, Self::Mountain];

    /// Clearing type produced by tiles of this biome.
    #[must_use]
    pub const fn clearing_kind(self) -> ClearingKind {
        match self {
            Self::Valley | Self::Woods => ClearingKind::Woods,
            Self::Cave => ClearingKind::Cave,
            Self::Mountain => ClearingKind::Mountain,
        }
    }
}

/// Terrain type attached to every clearing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClearingKind {
    /// Ordinary woodland clearing.
    Woods,
    /// Cave clearing.
    Cave,
    /// Mountain clearing.
    Mountain,
}

/// Which of its two printed faces a tile currently shows.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Side {
    /// Regular face.
    #[default]
    Normal,
    /// Enchanted face.
    Enchanted,
}

impl Side {
    /// Both sides in storage order.
    pub const ALL: [Side; 2] = [Self::Normal, Self::Enchanted];

    /// Returns the opposite face.
    #[must_use]
    pub const fn flipped(self) -> Self {
        match self {
            Self::Normal => Self::Enchanted,
            Self::Enchanted => Self::Normal,
        }
    }

    const fn index(self) -> u16 {
        match self {
            Self::Normal => 0,
            Self::Enchanted => 1,
        }
    }
}

/// One of the six boundary directions of a hex tile, numbered clockwise from north.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Edge(u8);

impl Edge {
    /// All edges in clockwise order.
    pub const ALL: [Edge; EDGE_COUNT] = [Edge(0), Edge(1), Edge(2), Edge(3), Edge(4), Edge(5)];

    /// Creates an edge from its index, rejecting values outside `0..6`.
    #[must_use]
    pub const fn new(index: u8) -> Option<Self> {
        if (index as usize) < EDGE_COUNT {
            Some(Self(index))
        } else {
            None
        }
    }

    /// Zero-based index of the edge.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Edge facing the opposite way.
    #[must_use]
    pub const fn opposite(self) -> Self {
        Self((self.0 + 3) % 6)
    }

    /// Edge reached by stepping `steps` positions clockwise.
    #[must_use]
    pub const fn clockwise(self, steps: u8) -> Self {
        Self((self.0 + steps % 6) % 6)
    }

    /// Edge reached by stepping `steps` positions counter-clockwise.
    #[must_use]
    pub const fn counter_clockwise(self, steps: u8) -> Self {
        Self((self.0 + 6 - steps % 6) % 6)
    }

    /// Maps a tile-local edge into the board frame for the given facing.
    #[must_use]
    pub const fn to_board(self, facing: Facing) -> Self {
        self.clockwise(facing.0)
    }

    /// Maps a board edge back into the local frame of a tile with the given facing.
    #[must_use]
    pub const fn to_local(self, facing: Facing) -> Self {
        self.counter_clockwise(facing.0)
    }
}

impl TryFrom<u8> for Edge {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value).ok_or_else(|| format!("edge index {value} is outside 0..6"))
    }
}

impl From<Edge> for u8 {
    fn from(edge: Edge) -> Self {
        edge.0
    }
}

/// Discrete rotation of a tile, in sixths of a full turn clockwise.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Facing(u8);

impl Facing {
    /// Unrotated facing.
    pub const ZERO: Facing = Facing(0);

    /// Creates a facing, rejecting values outside `0..6`.
    #[must_use]
    pub const fn new(steps: u8) -> Option<Self> {
        if (steps as usize) < EDGE_COUNT {
            Some(Self(steps))
        } else {
            None
        }
    }

    /// Number of clockwise sixth turns.
    #[must_use]
    pub const fn steps(self) -> u8 {
        self.0
    }

    /// Facing that maps `local` onto `board`.
    #[must_use]
    pub const fn aligning(local: Edge, board: Edge) -> Self {
        Self((board.0 + 6 - local.0) % 6)
    }

    /// Rotation angle in radians, clockwise in screen space.
    #[must_use]
    pub fn radians(self) -> f64 {
        f64::from(self.0) * std::f64::consts::FRAC_PI_3
    }
}

impl TryFrom<u8> for Facing {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value).ok_or_else(|| format!("facing {value} is outside 0..6"))
    }
}

impl From<Facing> for u8 {
    fn from(facing: Facing) -> Self {
        facing.0
    }
}

/// Axial hex coordinate of a tile on the board.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BoardCoord {
    q: i32,
    r: i32,
}

impl BoardCoord {
    /// Board origin where the anchor tile sits.
    pub const ORIGIN: BoardCoord = BoardCoord { q: 0, r: 0 };

    /// Creates a new axial coordinate.
    #[must_use]
    pub const fn new(q: i32, r: i32) -> Self {
        Self { q, r }
    }

    /// Axial column.
    #[must_use]
    pub const fn q(&self) -> i32 {
        self.q
    }

    /// Axial row.
    #[must_use]
    pub const fn r(&self) -> i32 {
        self.r
    }

    /// Coordinate of the tile across the provided board edge.
    #[must_use]
    pub const fn neighbor(self, edge: Edge) -> Self {
        let (dq, dr) = match edge.0 {
            0 => (0, -1),
            1 => (1, -1),
            2 => (1, 0),
            3 => (0, 1),
            4 => (-1, 1),
            _ => (-1, 0),
        };
        Self::new(self.q + dq, self.r + dr)
    }

    /// Centre of the tile in floating point world space (flat-top layout).
    #[must_use]
    pub fn center(self) -> (f64, f64) {
        let q = f64::from(self.q);
        let r = f64::from(self.r);
        let x = TILE_SIZE * 1.5 * q;
        let y = TILE_SIZE * 3f64.sqrt() * (r + q / 2.0);
        (x, y)
    }
}

/// Integer point in world space used as the routing distance metric.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorldPoint {
    x: i32,
    y: i32,
}

impl WorldPoint {
    /// Creates a new world point.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Horizontal component.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Vertical component, growing downwards.
    #[must_use]
    pub const fn y(&self) -> i32 {
        self.y
    }

    /// Computes the Manhattan distance between two points.
    #[must_use]
    pub fn manhattan_distance(self, other: WorldPoint) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }
}

/// Globally unique identifier of a clearing.
///
/// The value is derived from the tile name, the side and the clearing number,
/// so identical boards always produce identical identifiers. Deserialization
/// rejects values outside [`ClearingId::SLOT_COUNT`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub struct ClearingId(u16);

impl ClearingId {
    /// Total number of clearing slots across every tile and side.
    pub const SLOT_COUNT: usize = TileName::ALL.len() * 2 * MAX_CLEARINGS as usize;

    /// Derives the identifier for a clearing, rejecting numbers outside `1..=6`.
    #[must_use]
    pub fn new(tile: TileName, side: Side, number: u8) -> Option<Self> {
        if number == 0 || number > MAX_CLEARINGS {
            return None;
        }
        let tile_index = u16::try_from(tile.index()).ok()?;
        let slots = u16::from(MAX_CLEARINGS);
        Some(Self(
            tile_index * 2 * slots + side.index() * slots + u16::from(number - 1),
        ))
    }

    /// Tile that owns the clearing.
    #[must_use]
    pub fn tile(self) -> TileName {
        let per_tile = 2 * usize::from(MAX_CLEARINGS);
        TileName::ALL[self.slot() / per_tile]
    }

    /// Tile side that owns the clearing.
    #[must_use]
    pub fn side(self) -> Side {
        let slots = u16::from(MAX_CLEARINGS);
        if (self.0 / slots) % 2 == 0 {
            Side::Normal
        } else {
            Side::Enchanted
        }
    }

    /// One-based clearing number within its tile side.
    #[must_use]
    pub fn number(self) -> u8 {
        let slots = u16::from(MAX_CLEARINGS);
        (self.0 % slots) as u8 + 1
    }

    /// Dense slot index suitable for flat lookup tables.
    #[must_use]
    pub const fn slot(self) -> usize {
        self.0 as usize
    }
}

impl TryFrom<u16> for ClearingId {
    type Error = String;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        if usize::from(value) < Self::SLOT_COUNT {
            Ok(Self(value))
        } else {
            Err(format!(
                "clearing id {value} is outside 0..{}",
                Self::SLOT_COUNT
            ))
        }
    }
}

impl From<ClearingId> for u16 {
    fn from(clearing: ClearingId) -> Self {
        clearing.0
    }
}

impl fmt::Display for ClearingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let marker = match self.side() {
            Side::Normal => "",
            Side::Enchanted => "e",
        };
        write!(f, "{}{}{marker}", self.tile().short_name(), self.number())
    }
}

impl std::str::FromStr for ClearingId {
    type Err = String;

    /// Parses labels such as `BL1` or `CL4e`.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        let (body, side) = match trimmed.strip_suffix(['e', 'E']) {
            Some(body) => (body, Side::Enchanted),
            None => (trimmed, Side::Normal),
        };
        let split = body
            .find(|c: char| c.is_ascii_digit())
            .ok_or_else(|| format!("clearing '{trimmed}' has no number"))?;
        let (short, number) = body.split_at(split);
        let tile = TileName::from_short_name(short)
            .ok_or_else(|| format!("unknown tile abbreviation '{short}'"))?;
        let number: u8 = number
            .parse()
            .map_err(|_| format!("invalid clearing number in '{trimmed}'"))?;
        Self::new(tile, side, number).ok_or_else(|| format!("clearing '{trimmed}' is out of range"))
    }
}

/// Visibility class of a road. Pathfinding treats every kind alike.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoadKind {
    /// Ordinary open road.
    #[default]
    Plain,
    /// Underground tunnel.
    Tunnel,
    /// Road visible only once discovered.
    HiddenPath,
    /// Passage visible only once discovered.
    SecretPassage,
}

/// Permanent building-like feature that can stand in a clearing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Dwelling {
    /// Chapel.
    Chapel,
    /// Guard house.
    GuardHouse,
    /// House.
    House,
    /// Inn.
    Inn,
    /// Camp haunted by ghosts.
    GhostCamp,
}

/// Unique identifier assigned to a chit by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChitId(u32);

impl ChitId {
    /// Creates a new chit identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Treasure location marked by a site chit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SiteKind {
    /// Altar.
    Altar,
    /// Cairns.
    Cairns,
    /// Hoard.
    Hoard,
    /// Lair.
    Lair,
    /// Pool.
    Pool,
    /// Shrine.
    Shrine,
    /// Statue.
    Statue,
    /// Vault.
    Vault,
}

impl SiteKind {
    /// Full site inventory.
    pub const ALL: [SiteKind; 8] = [
        Self::Altar,
        Self::Cairns,
        Self::Hoard,
        Self::Lair,
        Self::Pool,
        Self::Shrine,
        Self::Statue,
        Self::Vault,
    ];

    /// Clearing the site occupies on its host tile.
    #[must_use]
    pub const fn clearing(self) -> u8 {
        match self {
            Self::Altar => 1,
            Self::Cairns => 5,
            Self::Hoard | Self::Pool => 6,
            Self::Lair | Self::Vault => 3,
            Self::Shrine => 4,
            Self::Statue => 2,
        }
    }
}

/// Family of noises announced by a sound chit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SoundKind {
    /// Fluttering wings.
    Flutter,
    /// Howling.
    Howl,
    /// Patter of feet.
    Patter,
    /// Roaring.
    Roar,
    /// Slithering.
    Slither,
}

/// Warning category printed on warning chits.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum WarningKind {
    /// Bones.
    Bones,
    /// Dank.
    Dank,
    /// Ruins.
    Ruins,
    /// Smoke.
    Smoke,
    /// Stink.
    Stink,
}

impl WarningKind {
    /// Every warning category.
    pub const ALL: [WarningKind; 5] = [
        Self::Bones,
        Self::Dank,
        Self::Ruins,
        Self::Smoke,
        Self::Stink,
    ];
}

/// Container chit that bundles several other chits.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SuperSiteKind {
    /// Placed among the mountain tiles.
    LostCastle,
    /// Placed among the cave tiles.
    LostCity,
}

impl SuperSiteKind {
    /// Biome whose tiles host the container.
    #[must_use]
    pub const fn host_biome(self) -> Biome {
        match self {
            Self::LostCastle => Biome::Mountain,
            Self::LostCity => Biome::Cave,
        }
    }
}

/// Closed set of chit categories with their category-specific data.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ChitCategory {
    /// Treasure location.
    Site(SiteKind),
    /// Sound announcing monsters in a numbered clearing.
    Sound {
        /// Noise family.
        kind: SoundKind,
        /// Clearing the sound belongs to.
        clearing: u8,
    },
    /// Biome-specific warning.
    Warning {
        /// Printed warning category.
        kind: WarningKind,
        /// Biome the warning belongs to.
        biome: Biome,
    },
    /// Container bundling several other chits.
    SuperSite(SuperSiteKind),
}

impl ChitCategory {
    /// Clearing number the chit is placed into on its host tile, if it has one.
    #[must_use]
    pub const fn clearing(self) -> Option<u8> {
        match self {
            Self::Site(site) => Some(site.clearing()),
            Self::Sound { clearing, .. } => Some(clearing),
            Self::Warning { .. } | Self::SuperSite(_) => None,
        }
    }
}

/// Where a chit currently sits.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChitLocation {
    /// Created but not yet distributed.
    #[default]
    Unplaced,
    /// Held in a tile-level capacity slot.
    Tile(TileName),
    /// Held in a numbered clearing of a tile, whichever side is face up.
    Clearing {
        /// Host tile.
        tile: TileName,
        /// Clearing number on the host tile.
        number: u8,
    },
    /// Stored inside a super-site container.
    Container(ChitId),
    /// Removed from play.
    Discarded,
}

impl ChitLocation {
    /// Tile hosting the chit, if it sits on the board.
    #[must_use]
    pub const fn tile(self) -> Option<TileName> {
        match self {
            Self::Tile(tile) | Self::Clearing { tile, .. } => Some(tile),
            Self::Unplaced | Self::Container(_) | Self::Discarded => None,
        }
    }
}

/// Whether a chit has been revealed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChitFace {
    /// Still hidden.
    #[default]
    Hidden,
    /// Revealed. Chits never return to hidden.
    FaceUp,
}

/// Reasons an attach request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttachError {
    /// One of the tiles is missing from the catalog.
    UnknownTile,
    /// The tile being attached to is not on the board.
    TargetNotPlaced,
    /// The incoming tile is already on the board.
    NeighborAlreadyPlaced,
    /// The requested edge already links another tile.
    EdgeOccupied,
    /// Another tile already occupies the computed position.
    PositionOccupied,
    /// Road presence disagrees across the given board edge of the incoming tile.
    RoadMismatch {
        /// Board edge of the incoming tile where the mismatch occurs.
        edge: Edge,
    },
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Fixes the catalog's anchor tile at the origin with facing zero.
    PlaceAnchor,
    /// Places `neighbor` across board edge `at_edge` of the placed `tile`, rotating
    /// it so that its local `neighbor_edge` faces back.
    AttachTile {
        /// Tile already on the board.
        tile: TileName,
        /// Board edge of `tile` to attach at.
        at_edge: Edge,
        /// Unplaced tile joining the board.
        neighbor: TileName,
        /// Local edge of `neighbor` that will face `tile`.
        neighbor_edge: Edge,
    },
    /// Removes a single link and its reciprocal.
    DetachTile {
        /// Tile owning the link.
        tile: TileName,
        /// Board edge of the link.
        edge: Edge,
    },
    /// Removes every link of a tile and takes it off the board.
    LiftTile {
        /// Tile to lift.
        tile: TileName,
    },
    /// Resolves dangling edge roads against the current neighbors.
    ConnectRoads,
    /// Tears down every placement, dwelling, chit and session flag.
    ResetBoard,
    /// Turns a tile over to its other side.
    FlipTile {
        /// Tile to flip.
        tile: TileName,
    },
    /// Creates a new unplaced chit.
    CreateChit {
        /// Category of the chit.
        category: ChitCategory,
    },
    /// Moves a chit to a new location.
    PlaceChit {
        /// Chit to move.
        chit: ChitId,
        /// Destination.
        location: ChitLocation,
    },
    /// Puts a permanent dwelling into a clearing.
    PlaceDwelling {
        /// Host tile.
        tile: TileName,
        /// Clearing number on the host tile.
        number: u8,
        /// Dwelling to place.
        dwelling: Dwelling,
    },
    /// Turns every chit on a tile face up, expanding super-site containers.
    RevealTile {
        /// Tile being explored.
        tile: TileName,
    },
    /// Marks a chit as having summoned monsters today.
    SummonChit {
        /// Chit that summoned.
        chit: ChitId,
    },
    /// Clears every summoned flag at a day boundary.
    ResetSummonedFlags,
    /// Records that the vault has been opened this session.
    OpenVault,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Confirms the anchor tile was fixed at the origin.
    AnchorPlaced {
        /// Anchored tile.
        tile: TileName,
    },
    /// Confirms a tile joined the board.
    TilePlaced {
        /// Tile that was placed.
        tile: TileName,
        /// Board coordinate assigned to the tile.
        position: BoardCoord,
        /// Facing assigned to the tile.
        facing: Facing,
    },
    /// Confirms a symmetric link between two tiles.
    TilesLinked {
        /// First tile of the pair.
        tile: TileName,
        /// Board edge of `tile` holding the link.
        edge: Edge,
        /// Second tile of the pair.
        neighbor: TileName,
    },
    /// Reports that an attach request was rejected without mutating the board.
    AttachRejected {
        /// Tile that was attached to.
        tile: TileName,
        /// Tile that failed to join.
        neighbor: TileName,
        /// Specific reason the attach failed.
        reason: AttachError,
    },
    /// Confirms removal of a link and its reciprocal.
    TilesUnlinked {
        /// First tile of the pair.
        tile: TileName,
        /// Board edge of `tile` that held the link.
        edge: Edge,
        /// Second tile of the pair.
        neighbor: TileName,
    },
    /// Confirms a tile left the board.
    TileLifted {
        /// Lifted tile.
        tile: TileName,
    },
    /// Reports how many roads exist after resolving edge roads.
    RoadsConnected {
        /// Number of roads between two clearings.
        connected: usize,
        /// Number of roads still ending at an open board edge.
        dangling: usize,
    },
    /// Confirms the board returned to its initial state.
    BoardReset,
    /// Confirms a tile was turned over.
    TileFlipped {
        /// Flipped tile.
        tile: TileName,
        /// Side now face up.
        side: Side,
    },
    /// Confirms a chit was created.
    ChitCreated {
        /// Identifier allocated for the chit.
        chit: ChitId,
        /// Category of the chit.
        category: ChitCategory,
    },
    /// Confirms a chit moved.
    ChitPlaced {
        /// Moved chit.
        chit: ChitId,
        /// New location.
        location: ChitLocation,
    },
    /// Reports that a chit command referenced an unknown chit.
    ChitRejected {
        /// Unknown identifier.
        chit: ChitId,
    },
    /// Confirms a dwelling now stands in a clearing.
    DwellingPlaced {
        /// Host tile.
        tile: TileName,
        /// Clearing number on the host tile.
        number: u8,
        /// Placed dwelling.
        dwelling: Dwelling,
    },
    /// Confirms a chit turned face up.
    ChitRevealed {
        /// Revealed chit.
        chit: ChitId,
    },
    /// Confirms a super-site container released its contents onto its host tile.
    SuperSiteExpanded {
        /// Container that was emptied.
        chit: ChitId,
        /// Tile now holding the contents.
        tile: TileName,
    },
    /// Confirms a chit summoned.
    ChitSummoned {
        /// Summoning chit.
        chit: ChitId,
    },
    /// Confirms the day boundary reset.
    SummonedFlagsReset {
        /// Number of chits whose flag was cleared.
        cleared: usize,
        /// Day that just began.
        day: u32,
    },
    /// Confirms the vault was opened.
    VaultOpened,
}

/// Read-only neighbor produced by a [`RoadGraph`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RoadStep {
    /// Clearing at the far end of the road.
    pub clearing: ClearingId,
    /// Kind of road travelled.
    pub kind: RoadKind,
}

/// Clearing-and-road graph queried by routing.
pub trait RoadGraph {
    /// World position of a clearing that is currently on the board.
    fn position(&self, clearing: ClearingId) -> Option<WorldPoint>;

    /// Clearings reachable from `clearing` by travelling a single road.
    fn roads_from(&self, clearing: ClearingId) -> Vec<RoadStep>;
}

/// Immutable representation of a placed tile used by presentation and persistence.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TileSnapshot {
    /// Tile identity.
    pub name: TileName,
    /// Terrain family.
    pub biome: Biome,
    /// Board coordinate.
    pub position: BoardCoord,
    /// Rotation on the board.
    pub facing: Facing,
    /// Side currently face up.
    pub side: Side,
    /// Neighbor across every board edge.
    pub neighbors: [Option<TileName>; EDGE_COUNT],
}

/// Immutable representation of a chit used for queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChitSnapshot {
    /// Identifier allocated by the world.
    pub id: ChitId,
    /// Category of the chit.
    pub category: ChitCategory,
    /// Current location.
    pub location: ChitLocation,
    /// Visibility.
    pub face: ChitFace,
    /// Whether the chit summoned today.
    pub summoned: bool,
}

#[cfg(test)]
mod tests {
    use super::{
        BoardCoord, ChitCategory, ChitLocation, ClearingId, Edge, Facing, Side, TileName,
        WorldPoint,
    };
    use serde::{de::DeserializeOwned, Serialize};

    #[test]
    fn manhattan_distance_matches_expectation() {
        let origin = WorldPoint::new(-10, 4);
        let destination = WorldPoint::new(20, -6);
        assert_eq!(origin.manhattan_distance(destination), 40);
        assert_eq!(destination.manhattan_distance(origin), 40);
    }

    #[test]
    fn opposite_edges_pair_up() {
        for edge in Edge::ALL {
            assert_eq!(edge.opposite().opposite(), edge);
            assert_ne!(edge.opposite(), edge);
        }
    }

    #[test]
    fn neighbor_across_opposite_edge_returns_home() {
        let home = BoardCoord::new(2, -3);
        for edge in Edge::ALL {
            assert_eq!(home.neighbor(edge).neighbor(edge.opposite()), home);
        }
    }

    #[test]
    fn facing_aligns_local_edge_with_board_edge() {
        for local in Edge::ALL {
            for board in Edge::ALL {
                let facing = Facing::aligning(local, board);
                assert_eq!(local.to_board(facing), board);
                assert_eq!(board.to_local(facing), local);
            }
        }
    }

    #[test]
    fn clearing_ids_decompose_into_their_parts() {
        for tile in TileName::ALL {
            for side in Side::ALL {
                for number in 1..=6 {
                    let id = ClearingId::new(tile, side, number).expect("valid clearing");
                    assert_eq!(id.tile(), tile);
                    assert_eq!(id.side(), side);
                    assert_eq!(id.number(), number);
                    assert!(id.slot() < ClearingId::SLOT_COUNT);
                }
            }
        }
        assert!(ClearingId::new(TileName::Cliff, Side::Normal, 0).is_none());
        assert!(ClearingId::new(TileName::Cliff, Side::Normal, 7).is_none());
    }

    #[test]
    fn clearing_labels_parse_back() {
        let id = ClearingId::new(TileName::Ledges, Side::Enchanted, 4).expect("valid");
        assert_eq!(id.to_string(), "L4e");
        assert_eq!("L4e".parse::<ClearingId>(), Ok(id));
        assert_eq!(
            "bl1".parse::<ClearingId>(),
            Ok(ClearingId::new(TileName::Borderland, Side::Normal, 1).expect("valid"))
        );
        assert!("XX1".parse::<ClearingId>().is_err());
        assert!("CL".parse::<ClearingId>().is_err());
    }

    #[test]
    fn clearing_ids_outside_the_slot_range_do_not_deserialize() {
        let last = ClearingId::new(TileName::ALL[19], Side::Enchanted, 6).expect("valid");
        assert_eq!(last.slot(), ClearingId::SLOT_COUNT - 1);
        assert_round_trip(&last);

        for raw in [ClearingId::SLOT_COUNT as u16, 999, u16::MAX] {
            let bytes = bincode::serialize(&raw).expect("serialize");
            assert!(bincode::deserialize::<ClearingId>(&bytes).is_err(), "{raw}");
            assert!(ClearingId::try_from(raw).is_err());
        }
        assert_eq!(TileName::from_index(last.slot() / 12), Some(last.tile()));
    }

    fn assert_round_trip<T>(value: &T)
    where
        T: Serialize + DeserializeOwned + PartialEq + std::fmt::Debug,
    {
        let bytes = bincode::serialize(value).expect("serialize");
        let restored: T = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(&restored, value);
    }

    #[test]
    fn chit_location_round_trips_through_bincode() {
        assert_round_trip(&ChitLocation::Clearing {
            tile: TileName::HighPass,
            number: 3,
        });
    }

    #[test]
    fn chit_category_round_trips_through_bincode() {
        assert_round_trip(&ChitCategory::Sound {
            kind: super::SoundKind::Roar,
            clearing: 6,
        });
    }
}
