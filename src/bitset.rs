//! Growable bit vector for action group tags.
//!
//! Groups are small non-negative integers chosen by the host (for example
//! `0 = movement`, `1 = ui`). A [`Bitset`] stores one bit per group in 64-bit
//! words and grows on demand when a higher bit is set.
//!
//! The scheduler only needs a handful of operations:
//! - membership ([`Bitset::get`])
//! - union ([`Bitset::union_with`]) to accumulate the groups blocked this frame
//! - intersection test ([`Bitset::intersects`]) to decide if an action is blocked
//!
//! # Example
//!
//! ```
//! use cadence::bitset::Bitset;
//!
//! let mut blocked = Bitset::from_bits(&[1]);
//! let ui = Bitset::from_bits(&[1, 4]);
//! assert!(blocked.intersects(&ui));
//! blocked.clear_all();
//! assert!(!blocked.intersects(&ui));
//! ```

use smallvec::SmallVec;
use std::fmt;

const WORD_BITS: usize = 64;

/// Flat bit vector. Bits beyond the allocated words read as `false`.
#[derive(Clone, Default)]
pub struct Bitset {
    words: SmallVec<[u64; 2]>,
}

impl Bitset {
    /// Create an empty bitset.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty bitset able to hold `bits` bits without growing.
    pub fn with_capacity(bits: usize) -> Self {
        let mut words = SmallVec::new();
        words.resize(bits.div_ceil(WORD_BITS), 0);
        Self { words }
    }

    /// Create a bitset with every listed bit set.
    pub fn from_bits(bits: &[usize]) -> Self {
        bits.iter().copied().collect()
    }

    #[inline]
    fn locate(bit: usize) -> (usize, u64) {
        (bit / WORD_BITS, 1u64 << (bit % WORD_BITS))
    }

    fn grow_to(&mut self, word: usize) {
        if word >= self.words.len() {
            self.words.resize(word + 1, 0);
        }
    }

    /// Number of bits that can be addressed without growing.
    pub fn capacity(&self) -> usize {
        self.words.len() * WORD_BITS
    }

    /// Returns `true` if `bit` is set.
    pub fn get(&self, bit: usize) -> bool {
        let (word, mask) = Self::locate(bit);
        self.words.get(word).is_some_and(|w| w & mask != 0)
    }

    pub fn set(&mut self, bit: usize) {
        let (word, mask) = Self::locate(bit);
        self.grow_to(word);
        self.words[word] |= mask;
    }

    pub fn clear(&mut self, bit: usize) {
        let (word, mask) = Self::locate(bit);
        if let Some(w) = self.words.get_mut(word) {
            *w &= !mask;
        }
    }

    pub fn flip(&mut self, bit: usize) {
        let (word, mask) = Self::locate(bit);
        self.grow_to(word);
        self.words[word] ^= mask;
    }

    /// Unset every bit while keeping the allocated words.
    pub fn clear_all(&mut self) {
        self.words.iter_mut().for_each(|w| *w = 0);
    }

    pub fn is_empty(&self) -> bool {
        self.words.iter().all(|w| *w == 0)
    }

    /// Number of set bits.
    pub fn count(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Set every bit that is set in `other`.
    pub fn union_with(&mut self, other: &Bitset) {
        if other.words.len() > self.words.len() {
            self.words.resize(other.words.len(), 0);
        }
        for (dst, src) in self.words.iter_mut().zip(other.words.iter()) {
            *dst |= *src;
        }
    }

    /// Keep only the bits that are also set in `other`.
    pub fn intersect_with(&mut self, other: &Bitset) {
        for (i, dst) in self.words.iter_mut().enumerate() {
            *dst &= other.words.get(i).copied().unwrap_or(0);
        }
    }

    /// Returns `true` if at least one bit is set in both sets.
    pub fn intersects(&self, other: &Bitset) -> bool {
        self.words
            .iter()
            .zip(other.words.iter())
            .any(|(a, b)| a & b != 0)
    }

    /// Iterate over the indices of set bits in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.words.iter().enumerate().flat_map(|(i, &word)| {
            (0..WORD_BITS)
                .filter(move |b| word & (1u64 << b) != 0)
                .map(move |b| i * WORD_BITS + b)
        })
    }
}

impl FromIterator<usize> for Bitset {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        let mut set = Bitset::new();
        for bit in iter {
            set.set(bit);
        }
        set
    }
}

// Trailing zero words do not affect equality.
impl PartialEq for Bitset {
    fn eq(&self, other: &Self) -> bool {
        let len = self.words.len().max(other.words.len());
        (0..len).all(|i| {
            self.words.get(i).copied().unwrap_or(0) == other.words.get(i).copied().unwrap_or(0)
        })
    }
}

impl Eq for Bitset {}

impl fmt::Debug for Bitset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}
