#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Best-first route search over the clearing and road graph.
//!
//! Road cost and search heuristic share the Manhattan metric on clearing world
//! positions. The same search serves as the connectivity oracle during map
//! assembly and as the routing service for gameplay.

use std::{
    cmp::Ordering,
    collections::{BTreeSet, BinaryHeap, HashMap, HashSet, VecDeque},
};

use realm_core::{ClearingId, RoadGraph, WorldPoint};

/// Route between two clearings in traversal order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Path {
    clearings: Vec<ClearingId>,
    cost: u32,
}

impl Path {
    /// Clearings visited, starting with the origin and ending with the destination.
    #[must_use]
    pub fn clearings(&self) -> &[ClearingId] {
        &self.clearings
    }

    /// Sum of the Manhattan lengths of every road travelled.
    #[must_use]
    pub const fn cost(&self) -> u32 {
        self.cost
    }

    /// Number of roads travelled.
    #[must_use]
    pub fn road_count(&self) -> usize {
        self.clearings.len().saturating_sub(1)
    }

    /// Consumes the path, returning its clearings.
    #[must_use]
    pub fn into_clearings(self) -> Vec<ClearingId> {
        self.clearings
    }
}

/// Stateless path finder. Every call owns its open and closed sets.
#[derive(Clone, Copy, Debug, Default)]
pub struct PathFinder;

impl PathFinder {
    /// Creates a new path finder.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Finds a route from `from` to `to`.
    ///
    /// Returns `None` when either clearing is off the board or no road chain
    /// links them. `from == to` yields a single-clearing path of cost zero.
    #[must_use]
    pub fn find_path<G>(&self, graph: &G, from: ClearingId, to: ClearingId) -> Option<Path>
    where
        G: RoadGraph + ?Sized,
    {
        let start = graph.position(from)?;
        let goal = graph.position(to)?;
        if from == to {
            return Some(Path {
                clearings: vec![from],
                cost: 0,
            });
        }

        let mut open = BinaryHeap::new();
        let mut closed: HashSet<ClearingId> = HashSet::new();
        let mut g_scores: HashMap<ClearingId, u32> = HashMap::new();
        let mut parents: HashMap<ClearingId, ClearingId> = HashMap::new();
        let mut sequence = 0_u64;

        let _ = g_scores.insert(from, 0);
        open.push(OpenNode {
            estimate: start.manhattan_distance(goal),
            sequence,
            clearing: from,
            position: start,
            cost: 0,
        });

        while let Some(current) = open.pop() {
            if !closed.insert(current.clearing) {
                continue;
            }
            if current.clearing == to {
                return Some(Path {
                    clearings: reconstruct(&parents, from, to),
                    cost: current.cost,
                });
            }

            for step in graph.roads_from(current.clearing) {
                if closed.contains(&step.clearing) {
                    continue;
                }
                let Some(position) = graph.position(step.clearing) else {
                    continue;
                };
                let tentative = current
                    .cost
                    .saturating_add(current.position.manhattan_distance(position));
                let known = g_scores.get(&step.clearing).copied().unwrap_or(u32::MAX);
                if tentative >= known {
                    continue;
                }

                let _ = g_scores.insert(step.clearing, tentative);
                let _ = parents.insert(step.clearing, current.clearing);
                sequence += 1;
                open.push(OpenNode {
                    estimate: tentative.saturating_add(position.manhattan_distance(goal)),
                    sequence,
                    clearing: step.clearing,
                    position,
                    cost: tentative,
                });
            }
        }

        None
    }

    /// Reports whether any route links the two clearings.
    #[must_use]
    pub fn connected<G>(&self, graph: &G, from: ClearingId, to: ClearingId) -> bool
    where
        G: RoadGraph + ?Sized,
    {
        self.find_path(graph, from, to).is_some()
    }

    /// Every clearing reachable from `from`, including `from` itself.
    ///
    /// Returns an empty set when `from` is off the board.
    #[must_use]
    pub fn reachable<G>(&self, graph: &G, from: ClearingId) -> BTreeSet<ClearingId>
    where
        G: RoadGraph + ?Sized,
    {
        let mut visited = BTreeSet::new();
        if graph.position(from).is_none() {
            return visited;
        }

        let mut queue = VecDeque::from([from]);
        let _ = visited.insert(from);
        while let Some(clearing) = queue.pop_front() {
            for step in graph.roads_from(clearing) {
                if graph.position(step.clearing).is_some() && visited.insert(step.clearing) {
                    queue.push_back(step.clearing);
                }
            }
        }

        visited
    }
}

fn reconstruct(
    parents: &HashMap<ClearingId, ClearingId>,
    from: ClearingId,
    to: ClearingId,
) -> Vec<ClearingId> {
    let mut clearings = vec![to];
    let mut current = to;
    while current != from {
        let Some(&parent) = parents.get(&current) else {
            break;
        };
        clearings.push(parent);
        current = parent;
    }
    clearings.reverse();
    clearings
}

/// Open-set entry ordered so the heap pops the lowest estimate first and,
/// among equal estimates, the earliest insertion.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct OpenNode {
    estimate: u32,
    sequence: u64,
    clearing: ClearingId,
    position: WorldPoint,
    cost: u32,
}

impl Ord for OpenNode {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .estimate
            .cmp(&self.estimate)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

impl PartialOrd for OpenNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
