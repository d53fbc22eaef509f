use realm_catalog::{Catalog, CatalogError, RoadEnd};
use realm_core::{Edge, RoadKind, Side, TileName};

const TWO_TILE_CATALOG: &str = r#"
version = 7

[[tiles]]
name = "Borderland"
biome = "Cave"
anchor = true

[tiles.normal]
clearings = [
    { number = 1, x = 0, y = -40 },
    { number = 2, x = 0, y = 40 },
]
roads = [
    { from = 1, to = { clearing = 2 } },
    { from = 2, to = { edge = 3 }, kind = "Tunnel" },
]

[tiles.enchanted]
clearings = [
    { number = 1, x = 0, y = -40 },
    { number = 2, x = 0, y = 40 },
]
roads = [
    { from = 1, to = { edge = 3 } },
]

[[tiles]]
name = "Crag"
biome = "Mountain"

[tiles.normal]
clearings = [{ number = 4, x = 10, y = 10 }]
roads = [{ from = 4, to = { edge = 0 } }]

[tiles.enchanted]
clearings = [{ number = 4, x = 10, y = 10 }]
roads = [{ from = 4, to = { edge = 0 } }]
"#;

#[test]
fn parses_and_validates_toml_catalog() {
    let catalog = Catalog::from_toml_str(TWO_TILE_CATALOG).expect("catalog parses");

    assert_eq!(catalog.version(), 7);
    assert_eq!(catalog.anchor(), TileName::Borderland);
    assert_eq!(catalog.tiles().len(), 2);

    let borderland = catalog
        .template(TileName::Borderland)
        .expect("borderland present");
    let normal = borderland.side(Side::Normal);
    assert_eq!(normal.roads().len(), 2);
    assert_eq!(normal.roads()[0].to(), RoadEnd::Clearing(2));
    assert_eq!(
        normal.clearing_for_edge(Edge::new(3).expect("edge")),
        Some((2, RoadKind::Tunnel))
    );
    assert_eq!(
        borderland
            .side(Side::Enchanted)
            .clearing_for_edge(Edge::new(3).expect("edge")),
        Some((1, RoadKind::Plain))
    );
}

#[test]
fn reports_out_of_range_edges_as_parse_errors() {
    let broken = TWO_TILE_CATALOG.replace("to = { edge = 0 }", "to = { edge = 9 }");
    assert!(matches!(
        Catalog::from_toml_str(&broken),
        Err(CatalogError::Parse(_))
    ));
}

#[test]
fn reports_structural_errors_after_parsing() {
    let broken = TWO_TILE_CATALOG.replace("anchor = true", "anchor = false");
    assert!(matches!(
        Catalog::from_toml_str(&broken),
        Err(CatalogError::AnchorCount(0))
    ));
}
