//! Tile arena, symmetric edge links and the clearing road network.

use std::collections::BTreeMap;

use realm_catalog::{Catalog, RoadEnd, SideTemplate, TileTemplate};
use realm_core::{
    AttachError, BoardCoord, ClearingId, Dwelling, Edge, Facing, RoadGraph, RoadKind, RoadStep,
    Side, TileName, TileSnapshot, WorldPoint, EDGE_COUNT,
};

/// Board placement of a tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Placement {
    /// Axial board coordinate.
    pub position: BoardCoord,
    /// Rotation applied to the template.
    pub facing: Facing,
}

/// Result of a successful attach.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AttachOutcome {
    /// Placement assigned to the incoming tile.
    pub placement: Placement,
    /// Every link created, as board edge of the incoming tile and the tile across it.
    pub links: Vec<(Edge, TileName)>,
}

/// Result of removing a single link.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Detachment {
    /// Tile that was linked across the edge.
    pub neighbor: TileName,
    /// Tiles taken off the board because the link was their last.
    pub lifted: Vec<TileName>,
}

/// Far end of a materialized road.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RoadTarget {
    /// Road reaches another clearing.
    Clearing(ClearingId),
    /// Road ends at an open board edge of its tile.
    Edge {
        /// Tile owning the edge.
        tile: TileName,
        /// Board edge the road leaves through.
        edge: Edge,
    },
}

/// Road materialized by [`TileGraph::connect_roads`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Road {
    /// Visibility class of the road.
    pub kind: RoadKind,
    /// Clearing the road starts in.
    pub from: ClearingId,
    /// Far end of the road.
    pub to: RoadTarget,
}

impl Road {
    /// Clearing across the road when travelling from `clearing`, if the road leads anywhere.
    #[must_use]
    pub fn other_end(&self, clearing: ClearingId) -> Option<ClearingId> {
        match self.to {
            RoadTarget::Clearing(to) if self.from == clearing => Some(to),
            RoadTarget::Clearing(to) if to == clearing => Some(self.from),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, Default)]
struct TileState {
    placement: Option<Placement>,
    side: Side,
    neighbors: [Option<TileName>; EDGE_COUNT],
}

/// Graph of placed tiles keyed by name, with edge links stored in the board frame.
///
/// Links are always symmetric: if `a` lists `b` across edge `e` then `b` lists
/// `a` across `e.opposite()`. Every mutation either completes fully or leaves
/// the graph untouched.
#[derive(Debug)]
pub struct TileGraph {
    catalog: Catalog,
    tiles: Vec<Option<TileState>>,
    positions: BTreeMap<BoardCoord, TileName>,
    dwellings: BTreeMap<(TileName, u8), Dwelling>,
    roads: Vec<Road>,
    clearing_roads: Vec<Vec<usize>>,
    roads_connected: bool,
}

impl TileGraph {
    /// Creates an empty board for the provided catalog.
    #[must_use]
    pub fn new(catalog: Catalog) -> Self {
        let mut tiles = vec![None; TileName::ALL.len()];
        for template in catalog.tiles() {
            tiles[template.name().index()] = Some(TileState::default());
        }
        Self {
            catalog,
            tiles,
            positions: BTreeMap::new(),
            dwellings: BTreeMap::new(),
            roads: Vec::new(),
            clearing_roads: vec![Vec::new(); ClearingId::SLOT_COUNT],
            roads_connected: false,
        }
    }

    /// Catalog the board draws its tiles from.
    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Template of a catalog tile.
    #[must_use]
    pub fn template(&self, tile: TileName) -> Option<&TileTemplate> {
        self.catalog.template(tile)
    }

    fn state(&self, tile: TileName) -> Option<&TileState> {
        self.tiles.get(tile.index()).and_then(Option::as_ref)
    }

    fn state_mut(&mut self, tile: TileName) -> Option<&mut TileState> {
        self.tiles.get_mut(tile.index()).and_then(Option::as_mut)
    }

    /// Placement of a tile currently on the board.
    #[must_use]
    pub fn placement(&self, tile: TileName) -> Option<Placement> {
        self.state(tile).and_then(|state| state.placement)
    }

    /// Reports whether the tile is on the board.
    #[must_use]
    pub fn is_placed(&self, tile: TileName) -> bool {
        self.placement(tile).is_some()
    }

    /// Side of a catalog tile that is currently face up.
    #[must_use]
    pub fn side(&self, tile: TileName) -> Option<Side> {
        self.state(tile).map(|state| state.side)
    }

    /// Tile linked across a board edge of `tile`.
    #[must_use]
    pub fn neighbor(&self, tile: TileName, edge: Edge) -> Option<TileName> {
        self.state(tile)
            .and_then(|state| state.neighbors[edge.index()])
    }

    /// Tile occupying a board coordinate.
    #[must_use]
    pub fn tile_at(&self, position: BoardCoord) -> Option<TileName> {
        self.positions.get(&position).copied()
    }

    /// Placed tiles in catalog order.
    #[must_use]
    pub fn placed_tiles(&self) -> Vec<TileName> {
        self.catalog
            .tiles()
            .iter()
            .map(TileTemplate::name)
            .filter(|name| self.is_placed(*name))
            .collect()
    }

    /// Captures a read-only snapshot of a placed tile.
    #[must_use]
    pub fn tile_snapshot(&self, tile: TileName) -> Option<TileSnapshot> {
        let state = self.state(tile)?;
        let placement = state.placement?;
        let template = self.template(tile)?;
        Some(TileSnapshot {
            name: tile,
            biome: template.biome(),
            position: placement.position,
            facing: placement.facing,
            side: state.side,
            neighbors: state.neighbors,
        })
    }

    fn active_side(&self, tile: TileName) -> Option<(&SideTemplate, Side, Placement)> {
        let state = self.state(tile)?;
        let placement = state.placement?;
        let template = self.template(tile)?;
        Some((template.side(state.side), state.side, placement))
    }

    /// Board edges of a placed tile that carry a road on its active side.
    #[must_use]
    pub fn road_edges(&self, tile: TileName) -> Option<[bool; EDGE_COUNT]> {
        let (side, _, placement) = self.active_side(tile)?;
        let local = side.road_edges();
        let mut board = [false; EDGE_COUNT];
        for edge in Edge::ALL {
            board[edge.to_board(placement.facing).index()] = local[edge.index()];
        }
        Some(board)
    }

    /// Clearing where the road leaving through a board edge of `tile` terminates.
    #[must_use]
    pub fn clearing_for_edge(&self, tile: TileName, edge: Edge) -> Option<ClearingId> {
        let (template, side, placement) = self.active_side(tile)?;
        let (number, _) = template.clearing_for_edge(edge.to_local(placement.facing))?;
        ClearingId::new(tile, side, number)
    }

    /// Clearings on the active side of a placed tile, in template order.
    #[must_use]
    pub fn clearings(&self, tile: TileName) -> Vec<ClearingId> {
        let Some((template, side, _)) = self.active_side(tile) else {
            return Vec::new();
        };
        template
            .clearings()
            .iter()
            .filter_map(|clearing| ClearingId::new(tile, side, clearing.number()))
            .collect()
    }

    /// Places the catalog anchor at the origin. Returns `false` if it is already placed.
    pub fn place_anchor(&mut self) -> bool {
        let anchor = self.catalog.anchor();
        if self.is_placed(anchor) || self.positions.contains_key(&BoardCoord::ORIGIN) {
            return false;
        }
        let placement = Placement {
            position: BoardCoord::ORIGIN,
            facing: Facing::ZERO,
        };
        let Some(state) = self.state_mut(anchor) else {
            return false;
        };
        state.placement = Some(placement);
        let _ = self.positions.insert(BoardCoord::ORIGIN, anchor);
        self.roads_connected = false;
        true
    }

    /// Attaches `neighbor` across board edge `at_edge` of `tile` so that its local
    /// `neighbor_edge` faces back. Returns `false` without mutating on failure.
    pub fn attach(
        &mut self,
        tile: TileName,
        at_edge: Edge,
        neighbor: TileName,
        neighbor_edge: Edge,
    ) -> bool {
        self.try_attach(tile, at_edge, neighbor, neighbor_edge)
            .is_ok()
    }

    /// Attaches like [`TileGraph::attach`], reporting why a rejection happened.
    ///
    /// The incoming tile is linked to every placed tile geometrically adjacent to
    /// its new position, and road presence must agree across each of those edges.
    pub fn try_attach(
        &mut self,
        tile: TileName,
        at_edge: Edge,
        neighbor: TileName,
        neighbor_edge: Edge,
    ) -> Result<AttachOutcome, AttachError> {
        let (Some(_), Some(incoming)) = (self.template(tile), self.template(neighbor)) else {
            return Err(AttachError::UnknownTile);
        };
        let Some(host) = self.placement(tile) else {
            return Err(AttachError::TargetNotPlaced);
        };
        if self.is_placed(neighbor) {
            return Err(AttachError::NeighborAlreadyPlaced);
        }
        if self.neighbor(tile, at_edge).is_some() {
            return Err(AttachError::EdgeOccupied);
        }
        let position = host.position.neighbor(at_edge);
        if self.positions.contains_key(&position) {
            return Err(AttachError::PositionOccupied);
        }

        let facing = Facing::aligning(neighbor_edge, at_edge.opposite());
        let side = self.side(neighbor).unwrap_or_default();
        let local_roads = incoming.side(side).road_edges();

        let mut links = Vec::new();
        for edge in Edge::ALL {
            let Some(other) = self.tile_at(position.neighbor(edge)) else {
                continue;
            };
            let mine = local_roads[edge.to_local(facing).index()];
            let theirs = self
                .road_edges(other)
                .map_or(false, |edges| edges[edge.opposite().index()]);
            if mine != theirs {
                return Err(AttachError::RoadMismatch { edge });
            }
            links.push((edge, other));
        }

        let placement = Placement { position, facing };
        let Some(state) = self.state_mut(neighbor) else {
            return Err(AttachError::UnknownTile);
        };
        state.placement = Some(placement);
        let _ = self.positions.insert(position, neighbor);
        for &(edge, other) in &links {
            self.link(neighbor, edge, other);
        }
        self.roads_connected = false;

        Ok(AttachOutcome { placement, links })
    }

    fn link(&mut self, tile: TileName, edge: Edge, other: TileName) {
        if let Some(state) = self.state_mut(tile) {
            state.neighbors[edge.index()] = Some(other);
        }
        if let Some(state) = self.state_mut(other) {
            state.neighbors[edge.opposite().index()] = Some(tile);
        }
    }

    /// Removes the link across a board edge of `tile` and its reciprocal.
    ///
    /// A non-anchor tile left without any link is taken off the board, so no
    /// placed tile ever sits unlinked next to the rest of the map.
    pub fn detach(&mut self, tile: TileName, edge: Edge) -> Option<Detachment> {
        let neighbor = self.unlink(tile, edge)?;
        let mut lifted = Vec::new();
        for end in [tile, neighbor] {
            if end != self.catalog.anchor() && self.link_count(end) == 0 && self.take_off(end) {
                lifted.push(end);
            }
        }
        Some(Detachment { neighbor, lifted })
    }

    fn unlink(&mut self, tile: TileName, edge: Edge) -> Option<TileName> {
        let other = self.neighbor(tile, edge)?;
        if let Some(state) = self.state_mut(tile) {
            state.neighbors[edge.index()] = None;
        }
        if let Some(state) = self.state_mut(other) {
            if state.neighbors[edge.opposite().index()] == Some(tile) {
                state.neighbors[edge.opposite().index()] = None;
            }
        }
        self.roads_connected = false;
        Some(other)
    }

    fn link_count(&self, tile: TileName) -> usize {
        self.state(tile)
            .map_or(0, |state| state.neighbors.iter().flatten().count())
    }

    fn take_off(&mut self, tile: TileName) -> bool {
        let Some(placement) = self.placement(tile) else {
            return false;
        };
        let _ = self.positions.remove(&placement.position);
        if let Some(state) = self.state_mut(tile) {
            state.placement = None;
        }
        self.roads_connected = false;
        true
    }

    /// Unlinks a tile from all neighbors and takes it off the board.
    ///
    /// The anchor never moves, so lifting it (or an unplaced tile) returns `None`.
    /// Otherwise the removed links are returned.
    pub fn lift(&mut self, tile: TileName) -> Option<Vec<(Edge, TileName)>> {
        if tile == self.catalog.anchor() || !self.is_placed(tile) {
            return None;
        }
        let mut removed = Vec::new();
        for edge in Edge::ALL {
            if let Some(other) = self.unlink(tile, edge) {
                removed.push((edge, other));
            }
        }
        let _ = self.take_off(tile);
        Some(removed)
    }

    /// Turns a catalog tile over, returning the side now face up.
    pub fn flip(&mut self, tile: TileName) -> Option<Side> {
        let state = self.state_mut(tile)?;
        state.side = state.side.flipped();
        let side = state.side;
        self.roads_connected = false;
        Some(side)
    }

    /// Returns every tile to the pool, face down on its normal side.
    pub fn reset(&mut self) {
        for state in self.tiles.iter_mut().flatten() {
            *state = TileState::default();
        }
        self.positions.clear();
        self.dwellings.clear();
        self.clear_roads();
    }

    fn clear_roads(&mut self) {
        self.roads.clear();
        for slot in &mut self.clearing_roads {
            slot.clear();
        }
        self.roads_connected = false;
    }

    /// Materializes every road on the board, joining edge roads to the clearing
    /// across the neighboring tile.
    ///
    /// Returns the number of clearing-to-clearing roads and of roads still
    /// ending at an open edge.
    pub fn connect_roads(&mut self) -> (usize, usize) {
        self.clear_roads();

        let mut roads = Vec::new();
        for template in self.catalog.tiles() {
            let name = template.name();
            let Some((side_template, side, placement)) = self.active_side(name) else {
                continue;
            };
            for road in side_template.roads() {
                let Some(from) = ClearingId::new(name, side, road.from()) else {
                    continue;
                };
                let to = match road.to() {
                    RoadEnd::Clearing(number) => match ClearingId::new(name, side, number) {
                        Some(to) => RoadTarget::Clearing(to),
                        None => continue,
                    },
                    RoadEnd::Edge(local) => {
                        let edge = local.to_board(placement.facing);
                        let across = self.neighbor(name, edge).and_then(|other| {
                            self.clearing_for_edge(other, edge.opposite())
                                .map(|clearing| (other, clearing))
                        });
                        match across {
                            // The neighbor emits the same road; keep one copy.
                            Some((other, _)) if other < name => continue,
                            Some((_, clearing)) => RoadTarget::Clearing(clearing),
                            None => RoadTarget::Edge { tile: name, edge },
                        }
                    }
                };
                roads.push(Road {
                    kind: road.kind(),
                    from,
                    to,
                });
            }
        }

        let mut connected = 0;
        let mut dangling = 0;
        for (index, road) in roads.iter().enumerate() {
            self.clearing_roads[road.from.slot()].push(index);
            match road.to {
                RoadTarget::Clearing(to) => {
                    connected += 1;
                    self.clearing_roads[to.slot()].push(index);
                }
                RoadTarget::Edge { .. } => dangling += 1,
            }
        }
        self.roads = roads;
        self.roads_connected = true;

        (connected, dangling)
    }

    /// Reports whether the materialized roads reflect the current board.
    #[must_use]
    pub fn roads_connected(&self) -> bool {
        self.roads_connected
    }

    /// Every materialized road.
    #[must_use]
    pub fn roads(&self) -> &[Road] {
        &self.roads
    }

    /// Materialized roads touching a clearing.
    pub fn roads_at(&self, clearing: ClearingId) -> impl Iterator<Item = &Road> + '_ {
        self.clearing_roads
            .get(clearing.slot())
            .into_iter()
            .flatten()
            .filter_map(|index| self.roads.get(*index))
    }

    /// Puts a dwelling into a clearing of a catalog tile, replacing any previous one.
    ///
    /// Returns `false` if the tile is unknown or has no such clearing on its active side.
    pub fn place_dwelling(&mut self, tile: TileName, number: u8, dwelling: Dwelling) -> bool {
        let exists = match (self.template(tile), self.side(tile)) {
            (Some(template), Some(side)) => template.side(side).clearing(number).is_some(),
            _ => false,
        };
        if !exists {
            return false;
        }
        let _ = self.dwellings.insert((tile, number), dwelling);
        true
    }

    /// Dwelling standing in a clearing.
    #[must_use]
    pub fn dwelling(&self, tile: TileName, number: u8) -> Option<Dwelling> {
        self.dwellings.get(&(tile, number)).copied()
    }

    /// Every dwelling on the board.
    pub fn dwellings(&self) -> impl Iterator<Item = (TileName, u8, Dwelling)> + '_ {
        self.dwellings
            .iter()
            .map(|(&(tile, number), &dwelling)| (tile, number, dwelling))
    }

    /// Places a tile exactly as recorded, without links. Used when restoring.
    pub(crate) fn restore_placement(
        &mut self,
        tile: TileName,
        placement: Placement,
        side: Side,
    ) -> bool {
        if self.positions.contains_key(&placement.position) || self.is_placed(tile) {
            return false;
        }
        let Some(state) = self.state_mut(tile) else {
            return false;
        };
        state.placement = Some(placement);
        state.side = side;
        let _ = self.positions.insert(placement.position, tile);
        true
    }

    /// Records one half of a link. Used when restoring.
    pub(crate) fn restore_link(&mut self, tile: TileName, edge: Edge, other: TileName) {
        if let Some(state) = self.state_mut(tile) {
            state.neighbors[edge.index()] = Some(other);
        }
    }
}

impl RoadGraph for TileGraph {
    fn position(&self, clearing: ClearingId) -> Option<WorldPoint> {
        let (template, side, placement) = self.active_side(clearing.tile())?;
        if side != clearing.side() {
            return None;
        }
        let (dx, dy) = template.clearing(clearing.number())?.offset();
        let (cx, cy) = placement.position.center();
        let angle = placement.facing.radians();
        let (sin, cos) = angle.sin_cos();
        let dx = f64::from(dx);
        let dy = f64::from(dy);
        let x = cx + dx * cos - dy * sin;
        let y = cy + dx * sin + dy * cos;
        Some(WorldPoint::new(x.round() as i32, y.round() as i32))
    }

    fn roads_from(&self, clearing: ClearingId) -> Vec<RoadStep> {
        let tile = clearing.tile();
        let Some((template, side, placement)) = self.active_side(tile) else {
            return Vec::new();
        };
        if side != clearing.side() || template.clearing(clearing.number()).is_none() {
            return Vec::new();
        }

        let mut steps: Vec<RoadStep> = template
            .internal_roads_from(clearing.number())
            .filter_map(|(number, kind)| {
                ClearingId::new(tile, side, number).map(|clearing| RoadStep { clearing, kind })
            })
            .collect();

        for (local, kind) in template.edges_from(clearing.number()) {
            let edge = local.to_board(placement.facing);
            let across = self
                .neighbor(tile, edge)
                .and_then(|other| self.clearing_for_edge(other, edge.opposite()));
            if let Some(clearing) = across {
                steps.push(RoadStep { clearing, kind });
            }
        }

        steps
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use realm_catalog::CatalogError;
    use realm_core::Biome;

    fn edge(index: u8) -> Edge {
        Edge::new(index).expect("edge in range")
    }

    fn clearing(tile: TileName, number: u8) -> ClearingId {
        ClearingId::new(tile, Side::Normal, number).expect("clearing in range")
    }

    fn hub() -> SideTemplate {
        let mut side = SideTemplate::new().with_clearings(&[1]);
        for edge in Edge::ALL {
            side = side.exit(1, edge);
        }
        side
    }

    fn spoke(exits: &[u8]) -> SideTemplate {
        let mut side = SideTemplate::new().with_clearings(&[1, 2]).road(1, 2);
        for &index in exits {
            side = side.exit(2, edge(index));
        }
        side
    }

    fn catalog() -> Result<Catalog, CatalogError> {
        Catalog::new(
            1,
            vec![
                TileTemplate::new(TileName::Borderland, Biome::Cave, hub(), hub()).as_anchor(),
                TileTemplate::new(TileName::Cavern, Biome::Cave, spoke(&[0]), spoke(&[0])),
                TileTemplate::new(TileName::Crag, Biome::Mountain, spoke(&[0, 1]), spoke(&[0, 1])),
                TileTemplate::new(TileName::Ruins, Biome::Cave, spoke(&[3]), spoke(&[3])),
                TileTemplate::new(TileName::Cliff, Biome::Mountain, spoke(&[0, 1]), spoke(&[0, 1])),
            ],
        )
    }

    fn anchored() -> TileGraph {
        let mut graph = TileGraph::new(catalog().expect("catalog validates"));
        assert!(graph.place_anchor());
        graph
    }

    #[test]
    fn attach_links_both_tiles_symmetrically() {
        let mut graph = anchored();
        assert!(graph.attach(TileName::Borderland, edge(2), TileName::Cavern, edge(0)));

        assert_eq!(
            graph.neighbor(TileName::Borderland, edge(2)),
            Some(TileName::Cavern)
        );
        assert_eq!(
            graph.neighbor(TileName::Cavern, edge(5)),
            Some(TileName::Borderland)
        );
        let placement = graph.placement(TileName::Cavern).expect("placed");
        assert_eq!(placement.position, BoardCoord::new(1, 0));
        assert_eq!(edge(0).to_board(placement.facing), edge(5));
    }

    #[test]
    fn attach_rejects_occupied_edges_and_placed_tiles() {
        let mut graph = anchored();
        assert!(graph.attach(TileName::Borderland, edge(2), TileName::Cavern, edge(0)));
        assert_eq!(
            graph.try_attach(TileName::Borderland, edge(2), TileName::Ruins, edge(3)),
            Err(AttachError::EdgeOccupied)
        );
        assert_eq!(
            graph.try_attach(TileName::Borderland, edge(3), TileName::Cavern, edge(0)),
            Err(AttachError::NeighborAlreadyPlaced)
        );
        assert_eq!(
            graph.try_attach(TileName::Ruins, edge(0), TileName::Crag, edge(0)),
            Err(AttachError::TargetNotPlaced)
        );
        assert_eq!(
            graph.try_attach(TileName::Borderland, edge(0), TileName::Mountain, edge(0)),
            Err(AttachError::UnknownTile)
        );
    }

    #[test]
    fn attach_requires_matching_roads_on_every_adjacent_edge() {
        let mut graph = anchored();
        assert!(graph.attach(TileName::Borderland, edge(0), TileName::Cavern, edge(0)));

        // Crag at (1,-1) would touch both the anchor and the roadless side of Cavern.
        let before = graph.tile_snapshot(TileName::Cavern);
        let result = graph.try_attach(TileName::Borderland, edge(1), TileName::Crag, edge(0));
        assert!(matches!(result, Err(AttachError::RoadMismatch { .. })));
        assert!(!graph.is_placed(TileName::Crag));
        assert_eq!(graph.tile_snapshot(TileName::Cavern), before);
        assert_eq!(graph.neighbor(TileName::Borderland, edge(1)), None);
    }

    #[test]
    fn detaching_the_last_link_takes_the_tile_off_the_board() {
        let mut graph = anchored();
        assert!(graph.attach(TileName::Borderland, edge(3), TileName::Cavern, edge(0)));

        let detached = graph.detach(TileName::Borderland, edge(3)).expect("linked");
        assert_eq!(detached.neighbor, TileName::Cavern);
        assert_eq!(detached.lifted, vec![TileName::Cavern]);
        assert_eq!(graph.neighbor(TileName::Borderland, edge(3)), None);
        assert!(!graph.is_placed(TileName::Cavern));
        assert_eq!(graph.tile_at(BoardCoord::new(0, 1)), None);
        assert!(graph.is_placed(TileName::Borderland));
        assert_eq!(graph.detach(TileName::Borderland, edge(3)), None);

        assert!(graph.attach(TileName::Borderland, edge(3), TileName::Cavern, edge(0)));
    }

    #[test]
    fn detaching_keeps_tiles_that_remain_linked() {
        let mut graph = anchored();
        assert!(graph.attach(TileName::Borderland, edge(3), TileName::Crag, edge(0)));
        // Cliff at (1, 0) touches both the anchor and Crag.
        assert!(graph.attach(TileName::Borderland, edge(2), TileName::Cliff, edge(1)));
        assert_eq!(graph.neighbor(TileName::Crag, edge(1)), Some(TileName::Cliff));

        let detached = graph.detach(TileName::Borderland, edge(3)).expect("linked");
        assert!(detached.lifted.is_empty());
        assert!(graph.is_placed(TileName::Crag));

        let detached = graph.detach(TileName::Crag, edge(1)).expect("linked");
        assert_eq!(detached.neighbor, TileName::Cliff);
        assert_eq!(detached.lifted, vec![TileName::Crag]);
        assert!(graph.is_placed(TileName::Cliff));
        assert_eq!(graph.tile_at(BoardCoord::new(0, 1)), None);
    }

    #[test]
    fn lift_unlinks_every_edge() {
        let mut graph = anchored();
        assert!(graph.attach(TileName::Borderland, edge(3), TileName::Cavern, edge(0)));

        let removed = graph.lift(TileName::Cavern).expect("lifted");
        assert_eq!(removed, vec![(edge(0), TileName::Borderland)]);
        assert!(!graph.is_placed(TileName::Cavern));
        assert_eq!(graph.neighbor(TileName::Borderland, edge(3)), None);
        assert_eq!(graph.lift(TileName::Cavern), None);
        assert_eq!(graph.lift(TileName::Borderland), None);
    }

    #[test]
    fn connect_roads_joins_edges_once_and_counts_dangling() {
        let mut graph = anchored();
        assert!(graph.attach(TileName::Borderland, edge(2), TileName::Cavern, edge(0)));

        let (connected, dangling) = graph.connect_roads();
        // Cavern's internal road plus the shared edge road.
        assert_eq!(connected, 2);
        assert_eq!(dangling, 5);

        let hub = clearing(TileName::Borderland, 1);
        let across = clearing(TileName::Cavern, 2);
        let joined: Vec<ClearingId> = graph
            .roads_at(hub)
            .filter_map(|road| road.other_end(hub))
            .collect();
        assert_eq!(joined, vec![across]);
        assert!(graph.roads_connected());
    }

    #[test]
    fn live_roads_cross_into_neighbors() {
        let mut graph = anchored();
        assert!(graph.attach(TileName::Borderland, edge(2), TileName::Cavern, edge(0)));

        let hub = clearing(TileName::Borderland, 1);
        let steps = graph.roads_from(hub);
        assert_eq!(steps.len(), 1);
        assert_eq!(steps[0].clearing, clearing(TileName::Cavern, 2));

        let back = graph.roads_from(clearing(TileName::Cavern, 2));
        assert!(back.iter().any(|step| step.clearing == hub));
        assert!(back
            .iter()
            .any(|step| step.clearing == clearing(TileName::Cavern, 1)));
    }

    #[test]
    fn flipped_tiles_expose_only_their_active_side() {
        let mut graph = anchored();
        assert_eq!(graph.flip(TileName::Borderland), Some(Side::Enchanted));
        assert!(graph.roads_from(clearing(TileName::Borderland, 1)).is_empty());
        assert!(graph.position(clearing(TileName::Borderland, 1)).is_none());
        let enchanted =
            ClearingId::new(TileName::Borderland, Side::Enchanted, 1).expect("clearing");
        assert!(graph.position(enchanted).is_some());
    }

    #[test]
    fn clearing_positions_follow_facing() {
        let mut graph = anchored();
        let hub = clearing(TileName::Borderland, 1);
        assert_eq!(graph.position(hub), Some(WorldPoint::new(-35, -50)));

        assert!(graph.attach(TileName::Borderland, edge(3), TileName::Ruins, edge(3)));
        let placement = graph.placement(TileName::Ruins).expect("placed");
        assert_eq!(placement.facing.steps(), 3);
        // Half a turn mirrors the offset around the tile centre at (0, 173.2).
        assert_eq!(
            graph.position(clearing(TileName::Ruins, 1)),
            Some(WorldPoint::new(35, 223))
        );
    }

    #[test]
    fn dwellings_require_an_existing_clearing() {
        let mut graph = anchored();
        assert!(graph.place_dwelling(TileName::Cavern, 2, Dwelling::Inn));
        assert!(!graph.place_dwelling(TileName::Cavern, 5, Dwelling::Inn));
        assert_eq!(graph.dwelling(TileName::Cavern, 2), Some(Dwelling::Inn));

        graph.reset();
        assert_eq!(graph.dwelling(TileName::Cavern, 2), None);
        assert!(graph.placed_tiles().is_empty());
    }
}
