#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Session setup for the realm board.
//!
//! Bootstrapping retries map assembly until a connected board comes out or the
//! configured attempt budget runs dry, then connects roads and deals chits.
//! Saved sessions skip assembly entirely and are rebuilt from a snapshot.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use realm_catalog::Catalog;
use realm_core::{Command, Event, TileName};
use realm_system_chit_distribution::{ChitDistributor, DistributionReport};
use realm_system_map_builder::{BuildReport, MapBuilder};
use realm_world::{self as world, query, BoardSnapshot, SnapshotError, World};
use thiserror::Error;

/// Default number of assembly attempts before setup gives up.
pub const DEFAULT_MAX_ATTEMPTS: usize = 1000;

/// Tunables for a setup run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    /// Seed for the deterministic random source.
    pub seed: u64,
    /// Assembly attempts allowed before [`SetupError::BuildExhausted`].
    pub max_attempts: usize,
}

impl Config {
    /// Creates a configuration with the default attempt budget.
    #[must_use]
    pub const fn new(seed: u64) -> Self {
        Self {
            seed,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    /// Replaces the attempt budget.
    #[must_use]
    pub const fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts;
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(0)
    }
}

/// Failures that abort session setup.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SetupError {
    /// Every assembly attempt dead-ended.
    #[error("board did not assemble within {attempts} attempts")]
    BuildExhausted {
        /// Attempts made.
        attempts: usize,
    },
    /// A restored tile has no road route to the anchor.
    #[error("tile {tile} is not connected to the anchor")]
    Disconnected {
        /// First tile failing the check, in catalog order.
        tile: TileName,
    },
    /// The saved board could not be rebuilt.
    #[error(transparent)]
    Restore(#[from] SnapshotError),
}

/// A freshly prepared session.
#[derive(Debug)]
pub struct Session {
    /// Assembled and populated world.
    pub world: World,
    /// Assembly attempt that succeeded, counting from one.
    pub attempts: usize,
    /// Counters of the successful assembly.
    pub build: BuildReport,
    /// Roads joining two clearings after connection.
    pub connected_roads: usize,
    /// Roads ending at an open board edge.
    pub dangling_roads: usize,
    /// Outcome of chit distribution.
    pub distribution: DistributionReport,
}

/// Prepares worlds from a catalog, either freshly or from a snapshot.
#[derive(Debug, Default)]
pub struct Bootstrap {
    config: Config,
    distributor: ChitDistributor,
}

impl Bootstrap {
    /// Creates a bootstrapper using the canonical chit rules.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            config,
            distributor: ChitDistributor::default(),
        }
    }

    /// Configuration in use.
    #[must_use]
    pub const fn config(&self) -> Config {
        self.config
    }

    /// Assembles a board, connects its roads and distributes chits.
    pub fn generate(&self, catalog: Catalog) -> Result<Session, SetupError> {
        let mut rng = ChaCha8Rng::seed_from_u64(self.config.seed);
        let mut world = World::new(catalog);
        let mut builder = MapBuilder::default();

        let mut succeeded = None;
        for attempt in 1..=self.config.max_attempts {
            let mut events = Vec::new();
            world::apply(&mut world, Command::ResetBoard, &mut events);
            if builder.build(&mut world, &mut rng) {
                succeeded = Some(attempt);
                break;
            }
            log::debug!("assembly attempt {attempt} dead-ended: {:?}", builder.report());
        }
        let Some(attempts) = succeeded else {
            log::warn!(
                "giving up after {} assembly attempts with seed {}",
                self.config.max_attempts,
                self.config.seed
            );
            return Err(SetupError::BuildExhausted {
                attempts: self.config.max_attempts,
            });
        };
        log::info!("board assembled on attempt {attempts}");

        let mut events = Vec::new();
        world::apply(&mut world, Command::ConnectRoads, &mut events);
        let (connected_roads, dangling_roads) = events
            .iter()
            .find_map(|event| match event {
                Event::RoadsConnected { connected, dangling } => Some((*connected, *dangling)),
                _ => None,
            })
            .unwrap_or_default();
        log::debug!("{connected_roads} roads connected, {dangling_roads} dangling");

        let distribution = self.distributor.distribute(&mut world, &mut rng);
        if !distribution.is_balanced() {
            log::warn!("chit distribution finished with {:?}", distribution.imbalances);
        }

        Ok(Session {
            world,
            attempts,
            build: builder.report(),
            connected_roads,
            dangling_roads,
            distribution,
        })
    }

    /// Rebuilds a saved board without running assembly.
    ///
    /// On top of the structural checks of [`World::restore`], every tile must
    /// pass the same connectivity rule assembly enforces.
    pub fn restore(&self, catalog: Catalog, snapshot: &BoardSnapshot) -> Result<World, SetupError> {
        let world = World::restore(catalog, snapshot)?;
        let builder = MapBuilder::default();
        if let Some(tile) = query::placed_tiles(&world)
            .into_iter()
            .find(|tile| !builder.is_connected(&world, *tile))
        {
            log::warn!("rejecting saved board: {tile} is cut off from the anchor");
            return Err(SetupError::Disconnected { tile });
        }
        log::info!("restored board with {} tiles", snapshot.tiles.len());
        Ok(world)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_attempt_budget_exhausts_immediately() {
        let bootstrap = Bootstrap::new(Config::new(1).with_max_attempts(0));
        let error = bootstrap
            .generate(Catalog::canonical())
            .expect_err("no attempts allowed");
        assert_eq!(error, SetupError::BuildExhausted { attempts: 0 });
    }

    #[test]
    fn generated_session_is_complete() {
        let session = Bootstrap::new(Config::new(2024))
            .generate(Catalog::canonical())
            .expect("board assembles");

        assert!(session.attempts >= 1);
        assert!(query::unplaced_tiles(&session.world).is_empty());
        assert!(query::graph(&session.world).roads_connected());
        assert!(session.connected_roads > 0);
        assert!(session.distribution.is_balanced());
    }

    #[test]
    fn default_config_allows_a_thousand_attempts() {
        assert_eq!(Config::default().max_attempts, 1000);
        assert_eq!(Config::default().seed, 0);
    }
}
