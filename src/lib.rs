// Road trip planning and nearest-trade search over a grid city.
//
// Entry points live on `pathfind::Pathfinder`:
//  - trip_to()                 -> route from any start cell to any destination cell.
//  - path_to_nearest_trade()   -> route to the closest building matching a predicate.
//  - path_to_nearest_labor()   -> route to the closest building selling labor.
//  - path_to_nearest_job()     -> route to the closest building buying labor.
//
// The host simulation provides its map through the `world::World` trait.
// `world::GridWorld` is a self-contained implementation of it.

pub mod log;
pub mod utils;
pub mod config;
pub mod world;
pub mod pathfind;
pub mod trade;

pub use config::{Configs, PathfindConfigs};
pub use utils::{Size, coords::{Cell, CellRange}};
pub use world::{Building, BuildingSite, GridWorld, NearbyBuilding, StructureKind, Tradeable, World};
pub use pathfind::{
    ByCell,
    DestinationSet,
    Direction,
    NavigationNode,
    NodeHandle,
    Path,
    Pathfinder,
    TransitType,
    cache::HeuristicCache,
    heuristic::{Heuristic, HeuristicEngine},
};
pub use trade::{DEFAULT_TRADE_QUANTITY, MAX_TRADE_DISTANCE, find_nearest_trade};
