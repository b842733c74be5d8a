use super::*;
use crate::{
    config::PathfindConfigs,
    utils::{Size, coords::CellRange},
    world::{BuildingSite, GridWorld, StructureKind},
};

fn cells(list: &[(i32, i32)]) -> Vec<Cell> {
    list.iter().map(|&(x, y)| Cell::new(x, y)).collect()
}

fn labor_office() -> BuildingSite {
    BuildingSite::new("labor office", StructureKind::Commercial, Size::new(2, 2))
        .sells(Tradeable::Labor, 3)
}

fn factory() -> BuildingSite {
    BuildingSite::new("factory", StructureKind::Industrial, Size::new(2, 2))
        .buys(Tradeable::Labor, 2)
        .sells(Tradeable::Goods, 10)
}

// Road along row 3 with a labor office below it and
// a factory above it reached through a one cell driveway.
fn town() -> GridWorld {
    let mut world = GridWorld::new(Size::new(16, 16));
    world.place_road(CellRange::new(Cell::new(0, 3), Cell::new(15, 3)));
    world.set_structure(Cell::new(10, 2), Some(StructureKind::Road));
    world.place_building(Cell::new(5, 4), labor_office()).unwrap();
    world.place_building(Cell::new(10, 0), factory()).unwrap();
    world
}

fn sells_labor(building: &BuildingSite, quantity: u32) -> bool {
    building.available_to_sell(Tradeable::Labor) >= quantity
}

#[test]
fn test_footprint_expansion() {
    let mut world = GridWorld::new(Size::new(32, 32));
    world.place_building(Cell::new(5, 5), labor_office()).unwrap();

    let found = find_nearest_trade(&world, &cells(&[(0, 0)]), 1, MAX_TRADE_DISTANCE, sells_labor);
    assert_eq!(found, cells(&[(5, 5), (6, 5), (5, 6), (6, 6)]));
}

#[test]
fn test_predicate_filters_buildings() {
    let mut world = GridWorld::new(Size::new(32, 32));
    world.place_building(Cell::new(5, 5), labor_office()).unwrap();
    world.place_building(Cell::new(2, 2), factory()).unwrap();

    // The factory is nearer but does not sell labor.
    let found = find_nearest_trade(&world, &cells(&[(0, 0)]), 1, MAX_TRADE_DISTANCE, sells_labor);
    assert_eq!(found, cells(&[(5, 5), (6, 5), (5, 6), (6, 6)]));

    // Not enough labor on offer.
    let found = find_nearest_trade(&world, &cells(&[(0, 0)]), 4, MAX_TRADE_DISTANCE, sells_labor);
    assert!(found.is_empty());

    let found = find_nearest_trade(&world, &cells(&[(0, 0)]), 1, MAX_TRADE_DISTANCE, |building: &BuildingSite, quantity| {
        building.available_to_sell(Tradeable::Goods) >= quantity
    });
    assert_eq!(found, cells(&[(2, 2), (3, 2), (2, 3), (3, 3)]));
}

#[test]
fn test_nearest_buildings_first_and_deduplicated() {
    let mut world = GridWorld::new(Size::new(32, 32));
    world.place_building(Cell::new(20, 0), labor_office()).unwrap();
    world.place_building(Cell::new(5, 5), labor_office()).unwrap();

    // Both starts see both buildings, each is listed once.
    let found = find_nearest_trade(&world, &cells(&[(0, 0), (1, 0)]), 1, MAX_TRADE_DISTANCE, sells_labor);
    assert_eq!(found, cells(&[
        (5, 5), (6, 5), (5, 6), (6, 6),
        (20, 0), (21, 0), (20, 1), (21, 1),
    ]));
}

#[test]
fn test_search_radius() {
    let mut world = GridWorld::new(Size::new(64, 64));
    world.place_building(Cell::new(40, 40), labor_office()).unwrap();

    let found = find_nearest_trade(&world, &cells(&[(0, 0)]), 1, MAX_TRADE_DISTANCE, sells_labor);
    assert!(found.is_empty());

    let found = find_nearest_trade(&world, &cells(&[(0, 0)]), 1, 60.0, sells_labor);
    assert_eq!(found.len(), 4);
}

#[test]
fn test_path_to_nearest_labor() {
    let world = town();
    let pathfinder = Pathfinder::new();

    let path = match pathfinder.path_to_nearest_labor(&world, &cells(&[(0, 3)]), DEFAULT_TRADE_QUANTITY) {
        Some(path) => path,
        None => panic!("Expected a path!"),
    };

    assert_eq!(path.origin().unwrap().cell, Cell::new(0, 3));
    assert_eq!(path.destination().unwrap().cell, Cell::new(5, 4));
    assert_eq!(path.len(), 7);

    // Nobody offers that many workers.
    assert!(pathfinder.path_to_nearest_labor(&world, &cells(&[(0, 3)]), 10).is_none());
}

#[test]
fn test_path_to_nearest_job() {
    let world = town();
    let pathfinder = Pathfinder::new();

    let path = match pathfinder.path_to_nearest_job(&world, &cells(&[(0, 3)]), 2) {
        Some(path) => path,
        None => panic!("Expected a path!"),
    };

    let travel: Vec<Cell> = path.cells().rev().collect();
    let mut expected: Vec<Cell> = (0..=10).map(|x| Cell::new(x, 3)).collect();
    expected.extend(cells(&[(10, 2), (10, 1)]));
    assert_eq!(travel, expected);

    assert!(pathfinder.path_to_nearest_job(&world, &cells(&[(0, 3)]), 3).is_none());
}

#[test]
fn test_path_to_nearest_trade_uses_configured_radius() {
    let world = town();

    let configs = PathfindConfigs { max_trade_distance: 5.0, ..Default::default() };
    let pathfinder = Pathfinder::with_configs(configs);

    // The labor office anchor is sqrt(26) cells away.
    assert!(pathfinder.path_to_nearest_labor(&world, &cells(&[(0, 3)]), 1).is_none());
    assert!(pathfinder.path_to_nearest_labor(&world, &cells(&[(1, 3)]), 1).is_some());
}

#[test]
fn test_path_to_nearest_trade_custom_predicate() {
    let world = town();
    let pathfinder = Pathfinder::new();

    let path = pathfinder.path_to_nearest_trade(&world, &cells(&[(15, 3)]), 5, |building, quantity| {
        building.available_to_sell(Tradeable::Goods) >= quantity
    });

    let destination = path.as_ref().and_then(|path| path.destination()).map(|node| node.cell);
    assert_eq!(destination, Some(Cell::new(10, 1)));
}

#[test]
fn test_crowded_neighborhood_lists_each_building_once() {
    let mut world = GridWorld::new(Size::new(32, 32));
    for cell in &CellRange::new(Cell::new(0, 0), Cell::new(15, 15)) {
        let anchor = Cell::new(cell.x * 2, cell.y * 2);
        let site = BuildingSite::new("house", StructureKind::Residential, Size::new(1, 1))
            .sells(Tradeable::Labor, 1);
        world.place_building(anchor, site).unwrap();
    }

    let starts = cells(&[(0, 0), (31, 31), (0, 0)]);
    let found = find_nearest_trade(&world, &starts, 1, MAX_TRADE_DISTANCE, sells_labor);

    assert_eq!(found.len(), 16 * 16);
    assert_eq!(found[0], Cell::new(0, 0));
    assert!(found.iter().all(|cell| cell.x % 2 == 0 && cell.y % 2 == 0));

    let unique: std::collections::HashSet<Cell> = found.iter().copied().collect();
    assert_eq!(unique.len(), found.len());
}
