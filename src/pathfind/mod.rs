use std::{
    cmp::{Ordering, Reverse},
    collections::HashSet,
    hash::{Hash, Hasher},
    sync::Arc,
};

use priority_queue::PriorityQueue;
use serde::{Deserialize, Serialize};
use slab::Slab;
use strum_macros::Display;

use crate::{
    log,
    config::PathfindConfigs,
    utils::{coords::Cell, hash::{FNV1aHash, FNV1aHasher}},
    world::World,
};

use heuristic::{Heuristic, HeuristicEngine};

pub mod cache;
pub mod heuristic;


// Search outline:
//  - Seeds are the start cells, padded with nearby cells for starts that sit off the road network.
//  - The open set is ordered by heuristic score alone (greedy best-first, NOT A*).
//    There is no cost-so-far term, so routes are not guaranteed to be the shortest
//    and can wander around obstacles that sit between a start and its destination.
//  - Every cell enters open or closed at most once, and is never re-scored or re-parented.
//  - Non-drivable neighbors go straight to the closed set unless they are destinations.

// ----------------------------------------------
// Direction / TransitType
// ----------------------------------------------

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
pub enum Direction {
    North,
    South,
    East,
    West,
    Stationary,
}

impl Direction {
    // Same order as Cell::neighbors().
    pub const CARDINALS: [Direction; 4] = [
        Direction::North,
        Direction::South,
        Direction::East,
        Direction::West,
    ];

    #[inline]
    pub const fn step(self, cell: Cell) -> Cell {
        match self {
            Self::North      => cell.offset(0, -1),
            Self::South      => cell.offset(0,  1),
            Self::East       => cell.offset(1,  0),
            Self::West       => cell.offset(-1, 0),
            Self::Stationary => cell,
        }
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
pub enum TransitType {
    #[default]
    Road,
}

// ----------------------------------------------
// NavigationNode
// ----------------------------------------------

// Index of a node in the arena that owns it.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct NodeHandle(usize);

impl NodeHandle {
    #[inline]
    pub const fn index(self) -> usize {
        self.0
    }
}

// NOTE: No PartialEq here. Search identity is the cell alone,
// use `key()` or wrap in `ByCell` to compare nodes.
#[derive(Clone, Debug)]
pub struct NavigationNode {
    pub cell: Cell,
    pub parent: Option<NodeHandle>,
    pub score: f64, // Heuristic distance to the nearest destination, not accumulated cost.
    pub direction: Direction,
    pub transit: TransitType,
}

impl NavigationNode {
    #[inline]
    pub fn seed(cell: Cell, score: f64) -> Self {
        Self {
            cell,
            parent: None,
            score,
            direction: Direction::Stationary,
            transit: TransitType::Road,
        }
    }

    #[inline]
    pub fn reached_from(parent: NodeHandle, cell: Cell, direction: Direction, score: f64) -> Self {
        Self {
            cell,
            parent: Some(parent),
            score,
            direction,
            transit: TransitType::Road,
        }
    }

    // Identity key used by the open/closed sets.
    #[inline]
    pub fn key(&self) -> Cell {
        self.cell
    }

    #[inline]
    pub fn is_seed(&self) -> bool {
        self.parent.is_none()
    }
}

// Compares and hashes a node by its cell only,
// ignoring parent, score and direction.
#[derive(Copy, Clone, Debug)]
pub struct ByCell<'a>(pub &'a NavigationNode);

impl PartialEq for ByCell<'_> {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.0.key() == other.0.key()
    }
}

impl Eq for ByCell<'_> {}

impl Hash for ByCell<'_> {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.key().hash(state);
    }
}

// ----------------------------------------------
// Path
// ----------------------------------------------

// Nodes ordered destination-first, seed-last. Each node's `parent`
// handle indexes into this path's own node list.
#[derive(Clone, Debug, Default)]
pub struct Path {
    nodes: Vec<NavigationNode>,
}

impl Path {
    #[inline]
    pub fn nodes(&self) -> &[NavigationNode] {
        &self.nodes
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    // Node count, the route's distance proxy.
    #[inline]
    pub fn distance(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn destination(&self) -> Option<&NavigationNode> {
        self.nodes.first()
    }

    #[inline]
    pub fn origin(&self) -> Option<&NavigationNode> {
        self.nodes.last()
    }

    #[inline]
    pub fn parent_of(&self, node: &NavigationNode) -> Option<&NavigationNode> {
        node.parent.and_then(|handle| self.nodes.get(handle.index()))
    }

    // Destination-first.
    #[inline]
    pub fn cells(&self) -> impl DoubleEndedIterator<Item = Cell> + '_ {
        self.nodes.iter().map(|node| node.cell)
    }

    // Seed-first, i.e. travel order.
    #[inline]
    pub fn iter_from_origin(&self) -> impl Iterator<Item = &NavigationNode> + '_ {
        self.nodes.iter().rev()
    }

    // Moves taken in travel order, excluding the stationary seed.
    #[inline]
    pub fn directions(&self) -> impl Iterator<Item = Direction> + '_ {
        self.iter_from_origin()
            .map(|node| node.direction)
            .filter(|direction| *direction != Direction::Stationary)
    }
}

// ----------------------------------------------
// DestinationSet
// ----------------------------------------------

struct DestinationCells {
    cells: Vec<Cell>, // Unique, first-seen order.
    lookup: HashSet<Cell>,
    hash: FNV1aHash,
}

// Immutable set of destination cells. Cheap to clone and usable as part of a
// cache key: equality compares the cell list, hashing uses a precomputed FNV-1a.
#[derive(Clone)]
pub struct DestinationSet {
    inner: Arc<DestinationCells>,
}

impl DestinationSet {
    pub fn new<I>(cells: I) -> Self
        where I: IntoIterator<Item = Cell>
    {
        let mut unique = Vec::new();
        let mut lookup = HashSet::new();
        let mut hasher = FNV1aHasher::new();

        for cell in cells {
            if lookup.insert(cell) {
                hasher.write_i32(cell.x);
                hasher.write_i32(cell.y);
                unique.push(cell);
            }
        }

        Self {
            inner: Arc::new(DestinationCells {
                cells: unique,
                lookup,
                hash: hasher.finish(),
            })
        }
    }

    #[inline]
    pub fn cells(&self) -> &[Cell] {
        &self.inner.cells
    }

    #[inline]
    pub fn contains(&self, cell: Cell) -> bool {
        self.inner.lookup.contains(&cell)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.inner.cells.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.cells.is_empty()
    }

    #[inline]
    pub fn hash_value(&self) -> FNV1aHash {
        self.inner.hash
    }
}

impl PartialEq for DestinationSet {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner) ||
        (self.inner.hash == other.inner.hash && self.inner.cells == other.inner.cells)
    }
}

impl Eq for DestinationSet {}

impl Hash for DestinationSet {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.inner.hash);
    }
}

impl std::fmt::Debug for DestinationSet {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_set().entries(self.cells()).finish()
    }
}

// ----------------------------------------------
// Search (internal)
// ----------------------------------------------

// Total order over scores so they can be used as queue priorities.
#[derive(Copy, Clone, Debug)]
struct Score(f64);

impl PartialEq for Score {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Score {}

impl PartialOrd for Score {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Score {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

// Lowest score first, ties go to whichever node was opened first.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
struct OpenKey {
    score: Score,
    sequence: u64,
    handle: usize,
}

struct Search<'a, H> {
    heuristic: &'a H,
    destinations: &'a DestinationSet,

    arena: Slab<NavigationNode>,

    // PriorityQueue pops the highest priority first,
    // but we want the smallest score first, so reverse the order.
    open: PriorityQueue<Cell, Reverse<OpenKey>>,
    closed: HashSet<Cell>,

    next_sequence: u64,
}

impl<'a, H> Search<'a, H>
    where H: Heuristic
{
    fn new(heuristic: &'a H, destinations: &'a DestinationSet) -> Self {
        Self {
            heuristic,
            destinations,
            arena: Slab::new(),
            open: PriorityQueue::new(),
            closed: HashSet::new(),
            next_sequence: 0,
        }
    }

    #[inline]
    fn is_known(&self, cell: Cell) -> bool {
        self.open.get(&cell).is_some() || self.closed.contains(&cell)
    }

    #[inline]
    fn score(&self, cell: Cell) -> f64 {
        self.heuristic.estimate(cell, self.destinations)
    }

    fn add_seed(&mut self, cell: Cell) {
        if self.is_known(cell) {
            return;
        }
        let node = NavigationNode::seed(cell, self.score(cell));
        self.push_open(node);
    }

    fn push_open(&mut self, node: NavigationNode) {
        let cell = node.key();
        let score = Score(node.score);
        let handle = self.arena.insert(node);

        let key = OpenKey { score, sequence: self.next_sequence, handle };
        self.next_sequence += 1;

        self.open.push(cell, Reverse(key));
    }

    fn push_closed(&mut self, node: NavigationNode) {
        self.closed.insert(node.key());
        self.arena.insert(node);
    }

    fn run<W: World>(&mut self, world: &W) -> Option<NodeHandle> {
        while let Some((cell, Reverse(key))) = self.open.pop() {
            self.closed.insert(cell);

            if self.destinations.contains(cell) {
                // Reached a destination! We're done.
                return Some(NodeHandle(key.handle));
            }

            let current = NodeHandle(key.handle);

            for (direction, neighbor) in Direction::CARDINALS.into_iter().zip(cell.neighbors()) {
                if self.is_known(neighbor) {
                    // Already opened or rejected; first come, first served.
                    continue;
                }

                let node = NavigationNode::reached_from(current, neighbor, direction, self.score(neighbor));

                if world.is_drivable(neighbor) || self.destinations.contains(neighbor) {
                    self.push_open(node);
                } else {
                    self.push_closed(node);
                }
            }
        }

        None
    }

    fn reconstruct_path(&self, terminal: NodeHandle) -> Path {
        let mut handles = Vec::new();
        let mut current = Some(terminal);

        while let Some(handle) = current {
            handles.push(handle);
            current = self.arena[handle.index()].parent;
        }

        let last = handles.len() - 1;
        let nodes = handles.iter().enumerate().map(|(index, handle)| {
            let mut node = self.arena[handle.index()].clone();
            // Re-link parents to indices within the path.
            node.parent = (index < last).then_some(NodeHandle(index + 1));
            node
        }).collect();

        Path { nodes }
    }
}

// ----------------------------------------------
// Pathfinder
// ----------------------------------------------

// Public search entry point. Holds no per-search state, so one instance
// can serve many concurrent callers.
pub struct Pathfinder<H = HeuristicEngine> {
    heuristic: H,
    configs: PathfindConfigs,
}

impl Pathfinder<HeuristicEngine> {
    pub fn new() -> Self {
        Self::with_configs(PathfindConfigs::default())
    }

    pub fn with_configs(configs: PathfindConfigs) -> Self {
        Self {
            heuristic: HeuristicEngine::with_configs(&configs),
            configs,
        }
    }
}

impl Default for Pathfinder<HeuristicEngine> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H> Pathfinder<H>
    where H: Heuristic
{
    pub fn with_heuristic(heuristic: H, configs: PathfindConfigs) -> Self {
        Self { heuristic, configs }
    }

    #[inline]
    pub fn heuristic(&self) -> &H {
        &self.heuristic
    }

    #[inline]
    pub fn configs(&self) -> &PathfindConfigs {
        &self.configs
    }

    // Route from any of `starts` to any of `destinations` over drivable cells.
    #[must_use]
    pub fn trip_to<W: World>(&self, world: &W, starts: &[Cell], destinations: &[Cell]) -> Option<Path> {
        let destinations = DestinationSet::new(destinations.iter().copied());
        self.trip_to_set(world, starts, &destinations)
    }

    #[must_use]
    pub fn trip_to_set<W: World>(&self, world: &W, starts: &[Cell], destinations: &DestinationSet) -> Option<Path> {
        if destinations.is_empty() {
            log::warn!(log::channel!("pathfind"),
                       "Trip from {} start cell(s) has no destinations; searching until the frontier is exhausted.",
                       starts.len());
        }

        log::verbose!(log::channel!("pathfind"),
                      "Trip from {} start cell(s) to {} destination(s).", starts.len(), destinations.len());

        let mut search = Search::new(&self.heuristic, destinations);

        for &start in starts {
            search.add_seed(start);
        }

        // Starts that can't enter the road network directly get padded with
        // their surroundings so the search can find an on-road entry point.
        for &start in starts {
            if world.is_drivable(start) || destinations.contains(start) {
                continue;
            }
            for cell in &start.cells_within(self.configs.start_padding_hops) {
                search.add_seed(cell);
            }
        }

        match search.run(world) {
            Some(terminal) => {
                let path = search.reconstruct_path(terminal);
                log::verbose!(log::channel!("pathfind"),
                              "Path found: {} nodes, {} visited.", path.len(), search.arena.len());
                Some(path)
            }
            None => {
                log::verbose!(log::channel!("pathfind"),
                              "No path found to {} destination(s), {} visited.",
                              destinations.len(), search.arena.len());
                None
            }
        }
    }
}
