#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that generates, inspects and routes across realm boards.

mod transfer;

use std::{fs, path::PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use realm_catalog::Catalog;
use realm_core::{Biome, ChitLocation, ClearingId};
use realm_system_bootstrap::{Bootstrap, Config, DEFAULT_MAX_ATTEMPTS};
use realm_system_pathfinding::PathFinder;
use realm_world::{query, World};

#[derive(Debug, Parser)]
#[command(name = "realm", about = "Assemble and inspect randomized hex-tile boards")]
struct Cli {
    /// TOML catalog to use instead of the built-in tile set.
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,
    #[command(subcommand)]
    command: Action,
}

#[derive(Debug, Subcommand)]
enum Action {
    /// Assemble a new board and print its transfer string.
    Generate {
        /// Seed for the random source.
        #[arg(short, long, default_value_t = 0)]
        seed: u64,
        /// Assembly attempts allowed before giving up.
        #[arg(long, default_value_t = DEFAULT_MAX_ATTEMPTS)]
        max_attempts: usize,
    },
    /// Restore a board from its transfer string and summarize it.
    Import {
        /// Board string produced by `generate`.
        board: String,
    },
    /// Find the cheapest road route between two clearings of a board.
    Route {
        /// Board string produced by `generate`.
        board: String,
        /// Start clearing, e.g. `BL1` or `CV4e`.
        from: ClearingId,
        /// Destination clearing.
        to: ClearingId,
    },
}

/// Entry point for the realm command-line interface.
fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let catalog = load_catalog(cli.catalog.as_deref())?;

    match cli.command {
        Action::Generate { seed, max_attempts } => {
            let bootstrap = Bootstrap::new(Config::new(seed).with_max_attempts(max_attempts));
            let session = bootstrap
                .generate(catalog)
                .with_context(|| format!("could not set up a board with seed {seed}"))?;
            log::info!(
                "{} roads connected, {} dangling, {} tiles rejected for connectivity",
                session.connected_roads,
                session.dangling_roads,
                session.build.rejected_connectivity
            );
            summarize(&session.world);
            println!("{}", transfer::encode(&session.world.snapshot())?);
        }
        Action::Import { board } => {
            let world = import(catalog, &board)?;
            summarize(&world);
        }
        Action::Route { board, from, to } => {
            let world = import(catalog, &board)?;
            let graph = query::graph(&world);
            let Some(path) = PathFinder::new().find_path(graph, from, to) else {
                bail!("no road route from {from} to {to}");
            };
            let hops: Vec<String> = path.clearings().iter().map(ToString::to_string).collect();
            println!("{} (cost {})", hops.join(" -> "), path.cost());
        }
    }

    Ok(())
}

fn load_catalog(path: Option<&std::path::Path>) -> Result<Catalog> {
    let Some(path) = path else {
        return Ok(Catalog::canonical());
    };
    let text = fs::read_to_string(path)
        .with_context(|| format!("could not read catalog {}", path.display()))?;
    Catalog::from_toml_str(&text).with_context(|| format!("invalid catalog {}", path.display()))
}

fn import(catalog: Catalog, board: &str) -> Result<World> {
    let snapshot = transfer::decode(board).context("could not decode board string")?;
    Bootstrap::default()
        .restore(catalog, &snapshot)
        .context("board string does not fit the catalog")
}

fn summarize(world: &World) {
    for biome in Biome::ALL {
        let tiles: Vec<String> = query::tiles(world)
            .iter()
            .filter(|tile| tile.biome == biome)
            .map(|tile| {
                format!(
                    "{}@({},{})/{:?}",
                    tile.name,
                    tile.position.q(),
                    tile.position.r(),
                    tile.side
                )
            })
            .collect();
        println!("{biome:?}: {}", tiles.join(" "));
    }

    let on_board = query::chits(world)
        .iter()
        .filter(|chit| !matches!(chit.location, ChitLocation::Unplaced | ChitLocation::Discarded))
        .count();
    println!("{on_board} chits on the board, day {}", query::day(world));
}
