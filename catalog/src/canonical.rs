//! Built-in tile data for the standard twenty tile board.
//!
//! Both sides of a tile share their edge exits; the enchanted side only
//! rewires the roads between clearings.

use realm_core::{Biome, Edge, RoadKind, TileName};

use super::{SideTemplate, TileTemplate};

use RoadKind::{HiddenPath as H, Plain as P, SecretPassage as S, Tunnel as T};

const VALLEY_CLEARINGS: [u8; 4] = [1, 2, 4, 5];
const FULL_CLEARINGS: [u8; 6] = [1, 2, 3, 4, 5, 6];

/// Edge exits of a tile as `(clearing, local edge, kind)`.
type Exits = &'static [(u8, u8, RoadKind)];
/// Internal roads of a tile side as `(clearing, clearing, kind)`.
type Paths = &'static [(u8, u8, RoadKind)];

pub(super) fn templates() -> Vec<TileTemplate> {
    vec![
        tile(
            TileName::AwfulValley,
            Biome::Valley,
            &VALLEY_CLEARINGS,
            &[(1, 0, P), (2, 2, P), (4, 3, P), (5, 5, P)],
            &[(1, 4, P), (2, 5, P)],
            &[(1, 4, P), (2, 5, P), (4, 5, P)],
        ),
        tile(
            TileName::BadValley,
            Biome::Valley,
            &VALLEY_CLEARINGS,
            &[(1, 0, P), (2, 1, P), (4, 3, P), (5, 4, P)],
            &[(1, 5, P), (2, 4, P)],
            &[(1, 5, P), (2, 4, P), (1, 2, P)],
        ),
        tile(
            TileName::CurstValley,
            Biome::Valley,
            &VALLEY_CLEARINGS,
            &[(2, 0, P), (1, 2, P), (5, 4, P), (4, 5, P)],
            &[(1, 5, P), (2, 4, P)],
            &[(1, 5, P), (2, 4, P), (4, 5, P)],
        ),
        tile(
            TileName::DarkValley,
            Biome::Valley,
            &VALLEY_CLEARINGS,
            &[(1, 1, P), (4, 2, P), (2, 4, P), (5, 5, P)],
            &[(1, 5, P), (2, 4, P)],
            &[(1, 5, P), (2, 4, P), (1, 2, P)],
        ),
        tile(
            TileName::EvilValley,
            Biome::Valley,
            &VALLEY_CLEARINGS,
            &[(5, 0, P), (1, 1, P), (2, 3, P), (4, 4, P)],
            &[(1, 4, P), (2, 5, P)],
            &[(1, 4, P), (2, 5, P), (2, 4, P)],
        ),
        tile(
            TileName::LindenWoods,
            Biome::Woods,
            &VALLEY_CLEARINGS,
            &[(4, 0, P), (1, 2, P), (5, 3, P), (2, 5, P)],
            &[(1, 2, P), (4, 5, P), (2, 4, P)],
            &[(1, 2, P), (4, 5, P)],
        ),
        tile(
            TileName::MapleWoods,
            Biome::Woods,
            &VALLEY_CLEARINGS,
            &[(5, 1, P), (2, 2, P), (1, 4, P), (4, 5, P)],
            &[(1, 4, P), (2, 5, P), (4, 5, P)],
            &[(1, 4, P), (2, 5, P)],
        ),
        tile(
            TileName::NutWoods,
            Biome::Woods,
            &VALLEY_CLEARINGS,
            &[(1, 0, P), (5, 3, P), (2, 4, P)],
            &[(1, 2, P), (2, 4, P), (4, 5, P)],
            &[(1, 2, P), (4, 5, P), (1, 5, H)],
        ),
        tile(
            TileName::OakWoods,
            Biome::Woods,
            &VALLEY_CLEARINGS,
            &[(2, 0, P), (4, 1, P), (1, 3, P), (5, 5, P)],
            &[(1, 5, P), (2, 4, P), (1, 2, P)],
            &[(1, 5, P), (2, 4, P)],
        ),
        tile(
            TileName::PineWoods,
            Biome::Woods,
            &VALLEY_CLEARINGS,
            &[(1, 1, P), (4, 3, P), (2, 5, P)],
            &[(1, 5, P), (2, 4, P), (4, 5, P)],
            &[(1, 5, P), (2, 4, P), (1, 2, H)],
        ),
        anchor(tile(
            TileName::Borderland,
            Biome::Cave,
            &FULL_CLEARINGS,
            &[
                (1, 0, P),
                (2, 1, P),
                (4, 2, P),
                (5, 3, P),
                (6, 4, P),
                (3, 5, P),
            ],
            &[(1, 2, P), (1, 6, P), (2, 3, P), (3, 5, T), (4, 5, P), (5, 6, S), (4, 6, P)],
            &[(1, 2, P), (1, 6, P), (2, 3, P), (3, 5, T), (4, 5, P), (4, 6, S)],
        )),
        tile(
            TileName::Cavern,
            Biome::Cave,
            &FULL_CLEARINGS,
            &[(3, 0, P), (1, 2, P), (4, 3, P), (6, 5, P)],
            &[(1, 5, T), (2, 3, T), (3, 6, T), (4, 5, T), (2, 4, S), (5, 6, T)],
            &[(1, 5, T), (2, 3, T), (3, 6, S), (4, 5, T), (5, 6, T)],
        ),
        tile(
            TileName::Caves,
            Biome::Cave,
            &FULL_CLEARINGS,
            &[(1, 1, P), (2, 2, P), (5, 4, P), (6, 5, P)],
            &[(1, 6, T), (2, 3, T), (3, 5, T), (4, 6, T), (3, 4, T), (1, 4, S)],
            &[(1, 6, T), (2, 3, T), (3, 5, T), (4, 6, T), (2, 4, S)],
        ),
        tile(
            TileName::HighPass,
            Biome::Cave,
            &FULL_CLEARINGS,
            &[(1, 0, P), (3, 2, P), (6, 3, P), (4, 4, P)],
            &[(1, 4, P), (2, 3, T), (2, 5, T), (5, 6, T), (3, 6, P)],
            &[(1, 4, P), (2, 3, T), (5, 6, T), (3, 6, P), (1, 5, S)],
        ),
        tile(
            TileName::Ruins,
            Biome::Cave,
            &FULL_CLEARINGS,
            &[(1, 0, P), (2, 1, P), (4, 3, P), (5, 5, P)],
            &[(1, 5, P), (2, 3, P), (3, 6, H), (4, 6, P), (2, 4, P)],
            &[(1, 5, P), (2, 3, P), (3, 6, P), (4, 6, H)],
        ),
        tile(
            TileName::Cliff,
            Biome::Mountain,
            &FULL_CLEARINGS,
            &[(1, 0, P), (3, 3, P), (6, 4, P)],
            &[(1, 2, P), (2, 4, P), (3, 5, H), (4, 5, P), (5, 6, P)],
            &[(1, 2, P), (2, 3, S), (3, 5, P), (4, 5, H), (5, 6, P)],
        )
        .requiring_all_clearings(),
        tile(
            TileName::Crag,
            Biome::Mountain,
            &FULL_CLEARINGS,
            &[(1, 1, P), (4, 3, P), (6, 5, P)],
            &[(1, 2, P), (2, 3, H), (3, 5, P), (4, 5, P), (4, 6, P)],
            &[(1, 2, P), (2, 3, P), (3, 5, H), (4, 6, P), (1, 6, S)],
        ),
        tile(
            TileName::DeepWoods,
            Biome::Mountain,
            &FULL_CLEARINGS,
            &[(1, 0, P), (2, 1, P), (3, 2, P), (5, 4, P), (6, 5, P)],
            &[(1, 4, P), (2, 6, P), (3, 5, P), (4, 6, H), (1, 2, P)],
            &[(1, 4, P), (2, 6, H), (3, 5, P), (4, 6, P), (2, 3, P)],
        ),
        tile(
            TileName::Ledges,
            Biome::Mountain,
            &FULL_CLEARINGS,
            &[(2, 0, P), (5, 2, P), (4, 3, P)],
            &[(1, 2, P), (1, 3, H), (3, 6, P), (4, 6, P), (5, 6, H), (1, 4, P)],
            &[(1, 2, P), (1, 3, P), (3, 6, H), (4, 6, P), (5, 6, P), (2, 5, S)],
        )
        .requiring_all_clearings(),
        tile(
            TileName::Mountain,
            Biome::Mountain,
            &FULL_CLEARINGS,
            &[(1, 0, P), (2, 2, P), (5, 4, P), (6, 5, P)],
            &[(1, 3, P), (2, 4, P), (3, 5, P), (4, 6, P), (5, 6, P)],
            &[(1, 3, P), (2, 4, H), (3, 5, P), (4, 6, P), (5, 6, S)],
        ),
    ]
}

fn tile(
    name: TileName,
    biome: Biome,
    clearings: &[u8],
    exits: Exits,
    normal: Paths,
    enchanted: Paths,
) -> TileTemplate {
    TileTemplate::new(
        name,
        biome,
        side(clearings, exits, normal),
        side(clearings, exits, enchanted),
    )
}

fn anchor(template: TileTemplate) -> TileTemplate {
    template.as_anchor()
}

fn side(clearings: &[u8], exits: Exits, paths: Paths) -> SideTemplate {
    let mut template = SideTemplate::new().with_clearings(clearings);
    for &(from, to, kind) in paths {
        template = template.road_of(kind, from, to);
    }
    for &(from, edge, kind) in exits {
        if let Some(edge) = Edge::new(edge) {
            template = template.exit_of(kind, from, edge);
        }
    }
    template
}
