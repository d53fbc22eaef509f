#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Post-assembly distribution of site, sound, warning and super-site chits.
//!
//! Distribution runs once the board is complete. Site and sound chits are
//! shuffled together; each super-site container swallows five of them and the
//! rest are dealt to the mountain and cave tiles. Warnings are dealt one per
//! tile per biome, and warnings with a permanent substitute are replaced by a
//! dwelling in a connected clearing.

use std::collections::BTreeMap;

use realm_core::{
    Biome, ChitCategory, ChitId, ChitLocation, ClearingId, Command, Dwelling, Event, SiteKind,
    SoundKind, SuperSiteKind, TileName, WarningKind,
};
use realm_system_pathfinding::PathFinder;
use realm_world::{self as world, query, World};
use rand::{seq::SliceRandom, Rng};

/// Number of chits each super-site container swallows.
pub const CONTAINER_CAPACITY: usize = 5;

/// Fixed site and sound chit inventory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChitInventory {
    sites: Vec<SiteKind>,
    sounds: Vec<(SoundKind, u8)>,
}

impl ChitInventory {
    /// Creates an inventory from explicit site and sound lists.
    #[must_use]
    pub fn new(sites: Vec<SiteKind>, sounds: Vec<(SoundKind, u8)>) -> Self {
        Self { sites, sounds }
    }

    /// Eight sites and ten sounds, two clearings per sound family.
    #[must_use]
    pub fn canonical() -> Self {
        Self::new(
            SiteKind::ALL.to_vec(),
            vec![
                (SoundKind::Flutter, 1),
                (SoundKind::Flutter, 2),
                (SoundKind::Howl, 4),
                (SoundKind::Howl, 5),
                (SoundKind::Patter, 2),
                (SoundKind::Patter, 5),
                (SoundKind::Roar, 4),
                (SoundKind::Roar, 6),
                (SoundKind::Slither, 3),
                (SoundKind::Slither, 6),
            ],
        )
    }

    /// Every chit category in the inventory, sites first.
    #[must_use]
    pub fn categories(&self) -> Vec<ChitCategory> {
        self.sites
            .iter()
            .map(|site| ChitCategory::Site(*site))
            .chain(
                self.sounds
                    .iter()
                    .map(|&(kind, clearing)| ChitCategory::Sound { kind, clearing }),
            )
            .collect()
    }

    /// Total number of chits in the inventory.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sites.len() + self.sounds.len()
    }

    /// Reports whether the inventory holds no chits.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Dwelling that replaces a warning chit, with the clearings to try in order.
///
/// Every clearing but the last is used only if it reaches the anchor; the last
/// is the unconditional fallback.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Substitution {
    /// Dwelling placed instead of the warning.
    pub dwelling: Dwelling,
    /// Candidate clearing numbers in preference order.
    pub clearings: Vec<u8>,
}

/// Maps warning categories of a biome to their permanent substitutes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SubstitutionTable {
    entries: BTreeMap<(WarningKind, Biome), Substitution>,
}

impl SubstitutionTable {
    /// Valley warnings become dwellings; woods smoke and bones do as well,
    /// falling back straight to clearing 2.
    #[must_use]
    pub fn canonical() -> Self {
        let valley = [
            (WarningKind::Bones, Dwelling::GhostCamp),
            (WarningKind::Dank, Dwelling::Chapel),
            (WarningKind::Ruins, Dwelling::GuardHouse),
            (WarningKind::Smoke, Dwelling::House),
            (WarningKind::Stink, Dwelling::Inn),
        ];
        let woods = [
            (WarningKind::Bones, Dwelling::GhostCamp),
            (WarningKind::Smoke, Dwelling::House),
        ];

        let mut table = Self::default();
        for (kind, dwelling) in valley {
            table.insert(kind, Biome::Valley, dwelling, vec![5, 4, 2]);
        }
        for (kind, dwelling) in woods {
            table.insert(kind, Biome::Woods, dwelling, vec![5, 2]);
        }
        table
    }

    /// Registers or replaces a substitution.
    pub fn insert(&mut self, kind: WarningKind, biome: Biome, dwelling: Dwelling, clearings: Vec<u8>) {
        let _ = self
            .entries
            .insert((kind, biome), Substitution { dwelling, clearings });
    }

    /// Substitution for a warning of the given biome, if any.
    #[must_use]
    pub fn get(&self, kind: WarningKind, biome: Biome) -> Option<&Substitution> {
        self.entries.get(&(kind, biome))
    }
}

/// Data-integrity problem found while dealing chits.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Imbalance {
    /// A tile found its biome pool empty.
    Shortfall {
        /// Tile left without a chit.
        tile: TileName,
        /// Biome of the pool.
        biome: Biome,
    },
    /// Chits remained after every tile of the biome was served.
    Leftover {
        /// Biome of the pool.
        biome: Biome,
        /// Number of chits left unplaced.
        count: usize,
    },
}

/// Outcome of a distribution run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DistributionReport {
    /// Super-site containers and the chits stored inside them.
    pub containers: Vec<(SuperSiteKind, ChitId, Vec<ChitId>)>,
    /// Site, sound and super-site chits dealt onto tiles.
    pub dealt: Vec<(TileName, ChitId)>,
    /// Warning chits left on their tiles.
    pub warnings: Vec<(TileName, ChitId)>,
    /// Dwellings placed instead of warnings.
    pub dwellings: Vec<(TileName, u8, Dwelling)>,
    /// Warning chits discarded in favor of a dwelling.
    pub discarded: Vec<ChitId>,
    /// Integrity problems, empty for the canonical board.
    pub imbalances: Vec<Imbalance>,
}

impl DistributionReport {
    /// Reports whether every pool was consumed exactly.
    #[must_use]
    pub fn is_balanced(&self) -> bool {
        self.imbalances.is_empty()
    }
}

/// Deals chits onto a fully assembled board.
#[derive(Debug)]
pub struct ChitDistributor {
    inventory: ChitInventory,
    substitutions: SubstitutionTable,
    finder: PathFinder,
}

impl Default for ChitDistributor {
    fn default() -> Self {
        Self::new(ChitInventory::canonical(), SubstitutionTable::canonical())
    }
}

impl ChitDistributor {
    /// Creates a distributor with explicit inventory and substitution rules.
    #[must_use]
    pub fn new(inventory: ChitInventory, substitutions: SubstitutionTable) -> Self {
        Self {
            inventory,
            substitutions,
            finder: PathFinder::new(),
        }
    }

    /// Inventory dealt by this distributor.
    #[must_use]
    pub fn inventory(&self) -> &ChitInventory {
        &self.inventory
    }

    /// Creates and places every chit. Imbalances are logged and reported, and
    /// placement continues as far as the pools allow.
    pub fn distribute<R>(&self, world: &mut World, rng: &mut R) -> DistributionReport
    where
        R: Rng + ?Sized,
    {
        let mut report = DistributionReport::default();

        let mut pool: Vec<ChitId> = self
            .inventory
            .categories()
            .into_iter()
            .filter_map(|category| create(world, category))
            .collect();
        pool.shuffle(rng);

        let mut castle_pool = Vec::new();
        let mut city_pool = Vec::new();
        for kind in [SuperSiteKind::LostCastle, SuperSiteKind::LostCity] {
            let Some(container) = create(world, ChitCategory::SuperSite(kind)) else {
                continue;
            };
            let take = CONTAINER_CAPACITY.min(pool.len());
            let contents: Vec<ChitId> = pool.drain(..take).collect();
            for chit in &contents {
                place(world, *chit, ChitLocation::Container(container));
            }
            match kind {
                SuperSiteKind::LostCastle => castle_pool.push(container),
                SuperSiteKind::LostCity => city_pool.push(container),
            }
            report.containers.push((kind, container, contents));
        }

        for (index, chit) in pool.into_iter().enumerate() {
            if index % 2 == 0 {
                castle_pool.push(chit);
            } else {
                city_pool.push(chit);
            }
        }

        castle_pool.shuffle(rng);
        city_pool.shuffle(rng);
        self.deal(world, Biome::Mountain, castle_pool, &mut report);
        self.deal(world, Biome::Cave, city_pool, &mut report);

        for biome in Biome::ALL {
            self.deal_warnings(world, biome, rng, &mut report);
        }

        report
    }

    fn deal(
        &self,
        world: &mut World,
        biome: Biome,
        mut chits: Vec<ChitId>,
        report: &mut DistributionReport,
    ) {
        for tile in tiles_of(world, biome) {
            let Some(chit) = chits.pop() else {
                log::error!("no {biome:?} chit left for {tile}");
                report.imbalances.push(Imbalance::Shortfall { tile, biome });
                continue;
            };
            let location = match query::chit(world, chit).and_then(|chit| chit.category.clearing()) {
                Some(number) => ChitLocation::Clearing { tile, number },
                None => ChitLocation::Tile(tile),
            };
            place(world, chit, location);
            report.dealt.push((tile, chit));
        }

        if !chits.is_empty() {
            log::error!("{} {biome:?} chits left undistributed", chits.len());
            report.imbalances.push(Imbalance::Leftover {
                biome,
                count: chits.len(),
            });
        }
    }

    fn deal_warnings<R>(
        &self,
        world: &mut World,
        biome: Biome,
        rng: &mut R,
        report: &mut DistributionReport,
    ) where
        R: Rng + ?Sized,
    {
        let mut warnings: Vec<(WarningKind, ChitId)> = WarningKind::ALL
            .into_iter()
            .filter_map(|kind| {
                create(world, ChitCategory::Warning { kind, biome }).map(|chit| (kind, chit))
            })
            .collect();
        warnings.shuffle(rng);

        for tile in tiles_of(world, biome) {
            let Some((kind, chit)) = warnings.pop() else {
                log::error!("no {biome:?} warning left for {tile}");
                report.imbalances.push(Imbalance::Shortfall { tile, biome });
                continue;
            };

            match self.substitutions.get(kind, biome) {
                Some(substitution) => {
                    let number = self.substitute_clearing(world, tile, &substitution.clearings);
                    let dwelling = substitution.dwelling;
                    let mut events = Vec::new();
                    world::apply(
                        world,
                        Command::PlaceDwelling {
                            tile,
                            number,
                            dwelling,
                        },
                        &mut events,
                    );
                    if events.is_empty() {
                        log::error!("{tile} has no clearing {number} for {dwelling:?}");
                    } else {
                        log::debug!("{kind:?} on {tile} becomes {dwelling:?} in clearing {number}");
                        report.dwellings.push((tile, number, dwelling));
                    }
                    place(world, chit, ChitLocation::Discarded);
                    report.discarded.push(chit);
                }
                None => {
                    place(world, chit, ChitLocation::Tile(tile));
                    report.warnings.push((tile, chit));
                }
            }
        }

        if !warnings.is_empty() {
            log::error!("{} {biome:?} warnings left undistributed", warnings.len());
            report.imbalances.push(Imbalance::Leftover {
                biome,
                count: warnings.len(),
            });
        }
    }

    /// First candidate clearing that reaches the anchor, else the last candidate.
    fn substitute_clearing(&self, world: &World, tile: TileName, candidates: &[u8]) -> u8 {
        let Some((&fallback, preferred)) = candidates.split_last() else {
            return 1;
        };
        let root = query::anchor_clearing(world);
        let side = query::side(world, tile);
        let graph = query::graph(world);

        preferred
            .iter()
            .copied()
            .find(|&number| {
                let target = side.and_then(|side| ClearingId::new(tile, side, number));
                match (root, target) {
                    (Some(root), Some(target)) => self.finder.connected(graph, root, target),
                    _ => false,
                }
            })
            .unwrap_or(fallback)
    }
}

fn create(world: &mut World, category: ChitCategory) -> Option<ChitId> {
    let mut events = Vec::new();
    world::apply(world, Command::CreateChit { category }, &mut events);
    events.iter().find_map(|event| match event {
        Event::ChitCreated { chit, .. } => Some(*chit),
        _ => None,
    })
}

fn place(world: &mut World, chit: ChitId, location: ChitLocation) {
    let mut events = Vec::new();
    world::apply(world, Command::PlaceChit { chit, location }, &mut events);
}

/// Placed tiles of a biome in catalog order.
fn tiles_of(world: &World, biome: Biome) -> Vec<TileName> {
    query::placed_tiles(world)
        .into_iter()
        .filter(|tile| query::biome(world, *tile) == Some(biome))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_inventory_balances_the_two_biomes() {
        let inventory = ChitInventory::canonical();
        assert_eq!(inventory.len(), 18);
        // Two containers each take five; the eight left split four and four,
        // and each pool gains its container.
        let remaining = inventory.len() - 2 * CONTAINER_CAPACITY;
        assert_eq!(remaining / 2 + 1, 5);
    }

    #[test]
    fn sound_chits_carry_their_clearing() {
        let categories = ChitInventory::canonical().categories();
        assert!(categories.contains(&ChitCategory::Sound {
            kind: SoundKind::Slither,
            clearing: 6,
        }));
        assert!(categories
            .iter()
            .all(|category| category.clearing().is_some()));
    }

    #[test]
    fn valley_warnings_all_have_substitutes() {
        let table = SubstitutionTable::canonical();
        for kind in WarningKind::ALL {
            let substitution = table.get(kind, Biome::Valley).expect("valley substitute");
            assert_eq!(substitution.clearings, vec![5, 4, 2]);
        }
        assert!(table.get(WarningKind::Dank, Biome::Cave).is_none());
        assert_eq!(
            table
                .get(WarningKind::Smoke, Biome::Woods)
                .map(|substitution| substitution.clearings.clone()),
            Some(vec![5, 2])
        );
    }
}
