//! The line-settlement cache: `(clue fingerprint, current line word) ->
//! settled line word`.
//!
//! Open-addressed, fixed size, replace-on-collision — no chaining. Each slot
//! stores the *full* `(hash_key, word)` pair rather than just the derived
//! probe index, so a hit only fires when both components match. That's
//! stronger than comparing the index alone and removes the false-positive
//! risk a narrower key would carry.

use crate::bitops::LineWord;

const DEFAULT_SLOTS: usize = 1 << 16;
const PROBE_LEN: usize = 4;

#[derive(Debug, Clone, Copy)]
struct Entry {
    hash_key: u64,
    word: LineWord,
    settled: LineWord,
}

#[derive(Debug)]
pub struct LineCache {
    slots: Vec<Option<Entry>>,
    mask: usize,
    hits: u64,
    misses: u64,
}

impl LineCache {
    pub fn new() -> Self {
        Self::with_slots(DEFAULT_SLOTS)
    }

    /// `slots` is rounded up to the next power of two.
    pub fn with_slots(slots: usize) -> Self {
        let size = slots.next_power_of_two().max(PROBE_LEN);
        LineCache {
            slots: vec![None; size],
            mask: size - 1,
            hits: 0,
            misses: 0,
        }
    }

    #[inline]
    fn probe_key(hash_key: u64, word: LineWord) -> u64 {
        hash_key ^ word
    }

    /// Looks up the settled word for `(hash_key, word)`. A miss may be a
    /// genuine first encounter or an eviction by a colliding key.
    pub fn get(&mut self, hash_key: u64, word: LineWord) -> Option<LineWord> {
        let base = (Self::probe_key(hash_key, word) as usize) & self.mask;
        for offset in 0..PROBE_LEN {
            let idx = (base + offset) & self.mask;
            if let Some(entry) = &self.slots[idx] {
                if entry.hash_key == hash_key && entry.word == word {
                    self.hits += 1;
                    return Some(entry.settled);
                }
            }
        }
        self.misses += 1;
        None
    }

    /// Inserts the settled word, overwriting the first probed slot (which
    /// may hold a different, now-evicted, entry).
    pub fn insert(&mut self, hash_key: u64, word: LineWord, settled: LineWord) {
        let base = (Self::probe_key(hash_key, word) as usize) & self.mask;
        self.slots[base] = Some(Entry {
            hash_key,
            word,
            settled,
        });
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }
}

impl Default for LineCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_then_get_hits() {
        let mut c = LineCache::with_slots(64);
        c.insert(42, 0b1010, 0b1111);
        assert_eq!(c.get(42, 0b1010), Some(0b1111));
        assert_eq!(c.hits(), 1);
    }

    #[test]
    fn distinct_word_with_same_hash_key_misses() {
        let mut c = LineCache::with_slots(64);
        c.insert(42, 0b1010, 0b1111);
        assert_eq!(c.get(42, 0b0101), None);
    }

    #[test]
    fn probe_collision_does_not_return_wrong_entry() {
        let mut c = LineCache::with_slots(64);
        // Two different (hash_key, word) pairs that may probe into the
        // same bucket must never be confused for each other.
        c.insert(1, 100, 0b01);
        c.insert(1, 200, 0b10);
        assert_eq!(c.get(1, 100), Some(0b01));
        assert_eq!(c.get(1, 200), Some(0b10));
    }

    #[test]
    fn miss_on_empty_cache() {
        let mut c = LineCache::with_slots(64);
        assert_eq!(c.get(7, 7), None);
        assert_eq!(c.misses(), 1);
    }
}
