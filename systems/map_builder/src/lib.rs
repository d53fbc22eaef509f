#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Randomized, connectivity-checked board assembly.
//!
//! The builder drives the world exclusively through commands: it anchors the
//! fixed tile, seeds the board with one neighbor, then grows the map one tile
//! at a time. Every tentative placement is validated against the anchor with
//! the path finder and lifted again if the tile is not connected well enough.

use realm_core::{ClearingId, Command, Edge, Event, TileName, MAX_CLEARINGS};
use realm_system_pathfinding::PathFinder;
use realm_world::{self as world, query, World};
use rand::{seq::SliceRandom, Rng};

/// Counters describing the most recent build attempt.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BuildReport {
    /// Tiles placed, excluding the anchor.
    pub placed: usize,
    /// Attach requests the world rejected.
    pub rejected_attaches: usize,
    /// Tentative placements lifted again for lack of connectivity.
    pub rejected_connectivity: usize,
    /// Passes over the deferred list after the first pass.
    pub deferred_passes: usize,
}

/// Builds a complete board out of the unplaced tile pool.
#[derive(Debug, Default)]
pub struct MapBuilder {
    finder: PathFinder,
    report: BuildReport,
}

impl MapBuilder {
    /// Creates a builder that validates placements with the provided path finder.
    #[must_use]
    pub const fn new(finder: PathFinder) -> Self {
        Self {
            finder,
            report: BuildReport {
                placed: 0,
                rejected_attaches: 0,
                rejected_connectivity: 0,
                deferred_passes: 0,
            },
        }
    }

    /// Counters of the most recent [`MapBuilder::build`] call.
    #[must_use]
    pub const fn report(&self) -> BuildReport {
        self.report
    }

    /// Places every pool tile onto an empty board.
    ///
    /// Returns `false` when a full pass over the deferred tiles makes no
    /// progress. In that case every tile placed by this call has been lifted
    /// again, so only the anchor remains on the board and the caller should
    /// reset and retry.
    pub fn build<R>(&mut self, world: &mut World, rng: &mut R) -> bool
    where
        R: Rng + ?Sized,
    {
        self.report = BuildReport::default();

        let anchor = query::anchor(world);
        let mut events = Vec::new();
        world::apply(world, Command::PlaceAnchor, &mut events);
        if !query::is_placed(world, anchor) {
            log::warn!("anchor {anchor} could not be placed at the origin");
            return false;
        }

        let (mut special, mut pool): (Vec<TileName>, Vec<TileName>) =
            query::unplaced_tiles(world)
                .into_iter()
                .partition(|tile| requires_all_clearings(world, *tile));

        pool.shuffle(rng);
        let mut placed = Vec::new();
        if let Some(first) = pool.pop() {
            if self.seed_anchor_neighbor(world, anchor, first, rng) {
                placed.push(first);
            } else {
                pool.push(first);
            }
        }

        pool.append(&mut special);
        pool.shuffle(rng);

        loop {
            let pass_size = pool.len();
            let mut deferred = Vec::new();
            while let Some(tile) = pool.pop() {
                if self.place(world, tile, rng) {
                    placed.push(tile);
                } else {
                    log::debug!("deferring {tile}");
                    deferred.push(tile);
                }
            }

            if deferred.is_empty() {
                self.report.placed = placed.len();
                log::debug!("board complete with {} tiles", placed.len() + 1);
                return true;
            }
            if deferred.len() == pass_size {
                log::debug!("no progress with {} deferred tiles", deferred.len());
                self.unwind(world, &placed);
                return false;
            }

            self.report.deferred_passes += 1;
            deferred.shuffle(rng);
            pool = deferred;
        }
    }

    /// Attaches the first tile to a random road edge of the anchor.
    fn seed_anchor_neighbor<R>(
        &mut self,
        world: &mut World,
        anchor: TileName,
        tile: TileName,
        rng: &mut R,
    ) -> bool
    where
        R: Rng + ?Sized,
    {
        let anchor_edges = board_road_edges(world, anchor);
        let tile_edges = local_road_edges(world, tile);
        let (Some(&at_edge), Some(&neighbor_edge)) =
            (anchor_edges.choose(rng), tile_edges.choose(rng))
        else {
            return false;
        };
        self.attach(world, anchor, at_edge, tile, neighbor_edge)
    }

    /// Tries every candidate site for `tile`, keeping the first that validates.
    fn place<R>(&mut self, world: &mut World, tile: TileName, rng: &mut R) -> bool
    where
        R: Rng + ?Sized,
    {
        let mut candidates = candidate_sites(world);
        candidates.shuffle(rng);

        for (target, at_edge) in candidates {
            let mut tile_edges = local_road_edges(world, tile);
            tile_edges.shuffle(rng);
            for neighbor_edge in tile_edges {
                if !self.attach(world, target, at_edge, tile, neighbor_edge) {
                    continue;
                }
                if self.is_connected(world, tile) {
                    log::debug!("placed {tile} across edge {} of {target}", at_edge.index());
                    return true;
                }
                self.report.rejected_connectivity += 1;
                lift(world, tile);
            }
        }

        false
    }

    fn attach(
        &mut self,
        world: &mut World,
        tile: TileName,
        at_edge: Edge,
        neighbor: TileName,
        neighbor_edge: Edge,
    ) -> bool {
        let mut events = Vec::new();
        world::apply(
            world,
            Command::AttachTile {
                tile,
                at_edge,
                neighbor,
                neighbor_edge,
            },
            &mut events,
        );
        let placed = events
            .iter()
            .any(|event| matches!(event, Event::TilePlaced { tile, .. } if *tile == neighbor));
        if !placed {
            self.report.rejected_attaches += 1;
        }
        placed
    }

    /// Checks a placed tile against the anchor's clearing 1.
    ///
    /// Ordinary tiles need one reachable clearing; all-clearings tiles need
    /// all six.
    #[must_use]
    pub fn is_connected(&self, world: &World, tile: TileName) -> bool {
        let Some(root) = query::anchor_clearing(world) else {
            return false;
        };
        let reached = self.finder.reachable(query::graph(world), root);
        let clearings = query::clearings(world, tile);
        let reaches = |clearing: &ClearingId| reached.contains(clearing);

        if requires_all_clearings(world, tile) {
            clearings.len() == usize::from(MAX_CLEARINGS) && clearings.iter().all(reaches)
        } else {
            clearings.iter().any(reaches)
        }
    }

    fn unwind(&mut self, world: &mut World, placed: &[TileName]) {
        for tile in placed.iter().rev() {
            lift(world, *tile);
        }
        self.report.placed = 0;
    }
}

fn lift(world: &mut World, tile: TileName) {
    let mut events = Vec::new();
    world::apply(world, Command::LiftTile { tile }, &mut events);
}

fn requires_all_clearings(world: &World, tile: TileName) -> bool {
    query::template(world, tile).map_or(false, |template| template.requires_all_clearings())
}

/// Board edges of a placed tile that carry a road.
fn board_road_edges(world: &World, tile: TileName) -> Vec<Edge> {
    query::road_edges(world, tile)
        .map(|edges| {
            Edge::ALL
                .into_iter()
                .filter(|edge| edges[edge.index()])
                .collect()
        })
        .unwrap_or_default()
}

/// Local edges of an unplaced tile's current side that carry a road.
fn local_road_edges(world: &World, tile: TileName) -> Vec<Edge> {
    let (Some(template), Some(side)) = (query::template(world, tile), query::side(world, tile))
    else {
        return Vec::new();
    };
    let edges = template.side(side).road_edges();
    Edge::ALL
        .into_iter()
        .filter(|edge| edges[edge.index()])
        .collect()
}

/// Open road edges of placed tiles that sit next to an occupied edge.
fn candidate_sites(world: &World) -> Vec<(TileName, Edge)> {
    let mut sites = Vec::new();
    for tile in query::placed_tiles(world) {
        for edge in board_road_edges(world, tile) {
            if query::neighbor(world, tile, edge).is_some() {
                continue;
            }
            let flanked = query::neighbor(world, tile, edge.clockwise(1)).is_some()
                || query::neighbor(world, tile, edge.counter_clockwise(1)).is_some();
            if flanked {
                sites.push((tile, edge));
            }
        }
    }
    sites
}
