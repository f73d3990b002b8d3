//! A process-wide table of 64-bit constants keyed by `(run position, run
//! length)`, used to fingerprint clues for the line cache.
//!
//! Seeded deterministically (not from entropy) so that two runs over the
//! same input produce identical cache behavior and identical node counts —
//! required by the determinism property every engine build is tested
//! against.

use once_cell::sync::OnceCell;
use rand::{RngCore, SeedableRng};
use rand::rngs::StdRng;

use crate::board::MAX_N;

/// Fixed seed: the table must be reproducible across runs and machines.
const ZOBRIST_SEED: u64 = 0x4E4F_4E4F_4752_414D;

/// Longest run length (plus the empty case) the table has constants for.
const MAX_RUN_LEN: usize = MAX_N + 1;

#[derive(Debug)]
pub struct ZobristTable {
    keys: Vec<Vec<u64>>,
}

impl ZobristTable {
    fn generate() -> Self {
        let mut rng = StdRng::seed_from_u64(ZOBRIST_SEED);
        let keys = (0..MAX_N)
            .map(|_| {
                (0..MAX_RUN_LEN)
                    .map(|_| non_zero(&mut rng))
                    .collect()
            })
            .collect();
        ZobristTable { keys }
    }

    /// The constant for a run of length `len` at position `pos` (0-indexed
    /// among the clue's runs).
    #[inline]
    pub fn key(&self, pos: usize, len: usize) -> u64 {
        let pos = pos.min(MAX_N - 1);
        let len = len.min(MAX_RUN_LEN - 1);
        self.keys[pos][len]
    }
}

fn non_zero(rng: &mut StdRng) -> u64 {
    loop {
        let v = rng.next_u64();
        if v != 0 {
            return v;
        }
    }
}

static TABLE: OnceCell<ZobristTable> = OnceCell::new();

/// Returns the process-wide Zobrist table, initializing it on first use.
pub fn table() -> &'static ZobristTable {
    TABLE.get_or_init(ZobristTable::generate)
}

/// Fingerprints a clue's run lengths by XOR-ing the table entry for each
/// `(position, length)` pair.
pub fn hash_runs(numbers: &[usize]) -> u64 {
    let t = table();
    numbers
        .iter()
        .enumerate()
        .fold(0u64, |acc, (pos, &len)| acc ^ t.key(pos, len))
}
