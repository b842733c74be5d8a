use std::sync::Arc;
use rayon::prelude::*;

use crate::{
    config::PathfindConfigs,
    utils::coords::Cell,
};

use super::{DestinationSet, cache::HeuristicCache};

// ----------------------------------------------
// Heuristic
// ----------------------------------------------

pub trait Heuristic {
    // Estimated distance from `origin` to the nearest of `destinations`.
    // Only used to order the search frontier.
    fn estimate(&self, origin: Cell, destinations: &DestinationSet) -> f64;
}

#[inline]
pub fn manhattan_distance(origin: Cell, destination: Cell) -> f64 {
    origin.manhattan_distance(destination) as f64
}

// ----------------------------------------------
// HeuristicEngine
// ----------------------------------------------

// Minimum Manhattan distance to any destination (0 if there are none).
// Large destination sets are reduced on the rayon pool; results are
// memoized in a bounded cache that can be shared between engines.
pub struct HeuristicEngine {
    cache: Arc<HeuristicCache>,
    parallel_min_destinations: usize,
}

impl HeuristicEngine {
    pub fn new(cache: Arc<HeuristicCache>, parallel_min_destinations: usize) -> Self {
        Self {
            cache,
            parallel_min_destinations: parallel_min_destinations.max(1),
        }
    }

    pub fn with_configs(configs: &PathfindConfigs) -> Self {
        Self::new(Arc::new(HeuristicCache::new(configs.heuristic_cache_capacity)),
                  configs.parallel_min_destinations)
    }

    pub fn uncached() -> Self {
        Self::new(Arc::new(HeuristicCache::disabled()), PathfindConfigs::default().parallel_min_destinations)
    }

    #[inline]
    pub fn cache(&self) -> &Arc<HeuristicCache> {
        &self.cache
    }

    // Uncached evaluation.
    pub fn compute(&self, origin: Cell, destinations: &DestinationSet) -> f64 {
        let cells = destinations.cells();

        if cells.len() >= self.parallel_min_destinations {
            // One task per destination (rayon splits into chunks as needed),
            // joined before returning.
            cells.par_iter()
                .map(|destination| manhattan_distance(origin, *destination))
                .min_by(f64::total_cmp)
                .unwrap_or(0.0)
        } else {
            cells.iter()
                .map(|destination| manhattan_distance(origin, *destination))
                .min_by(f64::total_cmp)
                .unwrap_or(0.0)
        }
    }
}

impl Default for HeuristicEngine {
    fn default() -> Self {
        Self::with_configs(&PathfindConfigs::default())
    }
}

impl Heuristic for HeuristicEngine {
    #[inline]
    fn estimate(&self, origin: Cell, destinations: &DestinationSet) -> f64 {
        self.cache.get_or_insert_with(origin, destinations, || self.compute(origin, destinations))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng};
    use rand_pcg::Pcg64;

    fn destinations(cells: &[(i32, i32)]) -> DestinationSet {
        DestinationSet::new(cells.iter().map(|&(x, y)| Cell::new(x, y)))
    }

    #[test]
    fn test_estimate_is_min_manhattan_distance() {
        let engine = HeuristicEngine::default();
        let dest = destinations(&[(10, 10), (3, 0), (-2, -2)]);

        assert_eq!(engine.estimate(Cell::zero(), &dest), 3.0);
        assert_eq!(engine.estimate(Cell::new(9, 9), &dest), 2.0);
        assert_eq!(engine.estimate(Cell::new(3, 0), &dest), 0.0);
    }

    #[test]
    fn test_estimate_to_self_is_zero() {
        let engine = HeuristicEngine::default();
        let origin = Cell::new(7, -3);
        assert_eq!(engine.estimate(origin, &DestinationSet::new([origin])), 0.0);
    }

    #[test]
    fn test_empty_destinations_estimate_zero() {
        let engine = HeuristicEngine::default();
        assert_eq!(engine.estimate(Cell::new(4, 4), &DestinationSet::new([])), 0.0);
    }

    #[test]
    fn test_parallel_and_inline_agree() {
        let mut rng = Pcg64::seed_from_u64(0xCAFE1CAFE2CAFE3A);

        let cells: Vec<Cell> = (0..500)
            .map(|_| Cell::new(rng.random_range(-200..200), rng.random_range(-200..200)))
            .collect();
        let dest = DestinationSet::new(cells.iter().copied());

        let parallel = HeuristicEngine::new(Arc::new(HeuristicCache::disabled()), 2);
        let inline = HeuristicEngine::new(Arc::new(HeuristicCache::disabled()), usize::MAX);

        for _ in 0..32 {
            let origin = Cell::new(rng.random_range(-250..250), rng.random_range(-250..250));
            let expected = cells.iter().map(|cell| manhattan_distance(origin, *cell)).fold(f64::INFINITY, f64::min);

            assert_eq!(parallel.compute(origin, &dest), expected);
            assert_eq!(inline.compute(origin, &dest), expected);
        }
    }

    #[test]
    fn test_repeated_estimate_hits_cache() {
        let engine = HeuristicEngine::default();
        let dest = destinations(&[(4, 4), (8, 0)]);

        let first = engine.estimate(Cell::new(1, 1), &dest);
        let second = engine.estimate(Cell::new(1, 1), &dest);

        assert_eq!(first, second);
        assert_eq!(engine.cache().misses(), 1);
        assert_eq!(engine.cache().hits(), 1);
    }

    #[test]
    fn test_shared_cache_between_engines() {
        let cache = Arc::new(HeuristicCache::new(16));
        let a = HeuristicEngine::new(cache.clone(), 2);
        let b = HeuristicEngine::new(cache.clone(), 2);
        let dest = destinations(&[(2, 2)]);

        a.estimate(Cell::zero(), &dest);
        b.estimate(Cell::zero(), &dest);

        assert_eq!(cache.hits(), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_uncached_engine_never_stores() {
        let engine = HeuristicEngine::uncached();
        let dest = destinations(&[(2, 2)]);

        engine.estimate(Cell::zero(), &dest);
        engine.estimate(Cell::zero(), &dest);

        assert!(engine.cache().is_empty());
        assert_eq!(engine.cache().hits(), 0);
    }
}
