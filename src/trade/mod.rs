use std::collections::HashSet;

use crate::{
    log,
    pathfind::{Path, Pathfinder, heuristic::Heuristic},
    utils::coords::Cell,
    world::{Building, Tradeable, World},
};

#[cfg(test)]
mod tests;

// Default search radius around each start cell, in grid units.
pub const MAX_TRADE_DISTANCE: f64 = 50.0;

pub const DEFAULT_TRADE_QUANTITY: u32 = 1;

// ----------------------------------------------
// find_nearest_trade()
// ----------------------------------------------

// Every cell covered by a building within `max_distance` of any start that
// satisfies `predicate(building, quantity)`. Each matching building contributes
// its whole footprint once, in row-major order, buildings nearest first per start.
pub fn find_nearest_trade<W, F>(world: &W,
                                starts: &[Cell],
                                quantity: u32,
                                max_distance: f64,
                                predicate: F) -> Vec<Cell>
    where W: World,
          F: Fn(&W::Building, u32) -> bool
{
    // Buildings never overlap, so the anchor cell identifies one.
    let mut visited_anchors = HashSet::new();
    let mut seen_cells = HashSet::new();
    let mut cells = Vec::new();

    for &start in starts {
        for nearby in world.nearest_buildings(start, max_distance) {
            if !visited_anchors.insert(nearby.cell) {
                continue;
            }

            if !predicate(nearby.building, quantity) {
                continue;
            }

            for cell in &nearby.footprint() {
                if seen_cells.insert(cell) {
                    cells.push(cell);
                }
            }
        }
    }

    log::verbose!(log::channel!("trade"),
                  "Found {} trade cell(s) around {} start(s), {} building(s) checked.",
                  cells.len(), starts.len(), visited_anchors.len());
    cells
}

// ----------------------------------------------
// Pathfinder trade entry points
// ----------------------------------------------

impl<H> Pathfinder<H>
    where H: Heuristic
{
    // Route to the nearest building matching `predicate`, searching
    // within the configured `max_trade_distance` of each start.
    #[must_use]
    pub fn path_to_nearest_trade<W, F>(&self,
                                       world: &W,
                                       starts: &[Cell],
                                       quantity: u32,
                                       predicate: F) -> Option<Path>
        where W: World,
              F: Fn(&W::Building, u32) -> bool
    {
        let destinations = find_nearest_trade(world, starts, quantity, self.configs().max_trade_distance, predicate);

        if destinations.is_empty() {
            log::verbose!(log::channel!("trade"), "No trade partner within {} cells of {} start(s).",
                          self.configs().max_trade_distance, starts.len());
        }

        self.trip_to(world, starts, &destinations)
    }

    // Nearest building with at least `quantity` workers to offer.
    #[must_use]
    pub fn path_to_nearest_labor<W: World>(&self, world: &W, starts: &[Cell], quantity: u32) -> Option<Path> {
        self.path_to_nearest_trade(world, starts, quantity, |building, quantity| {
            building.available_to_sell(Tradeable::Labor) >= quantity
        })
    }

    // Nearest building with at least `quantity` job openings.
    #[must_use]
    pub fn path_to_nearest_job<W: World>(&self, world: &W, starts: &[Cell], quantity: u32) -> Option<Path> {
        self.path_to_nearest_trade(world, starts, quantity, |building, quantity| {
            building.available_to_buy(Tradeable::Labor) >= quantity
        })
    }
}
