//! The context object a search owns: the line cache, the work queue and the
//! dependency map. Previously process-wide globals in the source this
//! engine is derived from; bundled here so that solving two puzzles
//! concurrently just means owning two `Engine`s (the Zobrist table stays
//! process-wide since it's read-only after first use and keyed by clue
//! content, not by puzzle identity).

use crate::cache::LineCache;
use crate::solver::dependency::DependencyMap;
use crate::workqueue::WorkQueue;

#[derive(Debug)]
pub struct Engine {
    pub cache: LineCache,
    pub queue: WorkQueue,
    pub deps: DependencyMap,
}

impl Engine {
    pub fn new(n: usize) -> Self {
        debug!("initializing engine for a {}x{} board", n, n);
        Engine {
            cache: LineCache::new(),
            queue: WorkQueue::new(n),
            deps: DependencyMap::new(n),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_engine_has_empty_queue() {
        let e = Engine::new(5);
        assert!(e.queue.is_empty());
    }
}
