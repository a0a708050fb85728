//! Rank/select directory over a borrowed, LSB-first bit image.
//!
//! The image is read as little-endian 32-bit words. A cumulative one-count
//! is kept for every 512-bit block; rank scans at most 16 words and select
//! binary-searches the block directory before scanning.

const BLOCK_BITS: usize = 512;
const WORD_BITS: usize = 32;
const WORDS_PER_BLOCK: usize = BLOCK_BITS / WORD_BITS;

#[derive(Clone)]
pub struct BitVectorIndex<'a> {
    image: &'a [u8],
    num_bits: usize,
    num_words: usize,
    /// Ones before each block; one trailing entry holds the total.
    block_ranks: Vec<u32>,
}

impl std::fmt::Debug for BitVectorIndex<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BitVectorIndex")
            .field("len", &self.num_bits)
            .field("ones", &self.num_ones())
            .finish()
    }
}

impl<'a> BitVectorIndex<'a> {
    pub fn new(image: &'a [u8]) -> Self {
        let num_words = image.len().div_ceil(4);
        let num_blocks = num_words.div_ceil(WORDS_PER_BLOCK);
        let mut block_ranks = Vec::with_capacity(num_blocks + 1);
        let mut total = 0u32;
        for block in 0..num_blocks {
            block_ranks.push(total);
            let start = block * WORDS_PER_BLOCK;
            let end = (start + WORDS_PER_BLOCK).min(num_words);
            for w in start..end {
                total += word_at(image, w).count_ones();
            }
        }
        block_ranks.push(total);

        Self {
            image,
            num_bits: image.len() * 8,
            num_words,
            block_ranks,
        }
    }

    /// Number of addressable bits (`image.len() * 8`).
    pub fn len(&self) -> usize {
        self.num_bits
    }

    pub fn is_empty(&self) -> bool {
        self.num_bits == 0
    }

    pub fn num_ones(&self) -> usize {
        self.block_ranks.last().copied().unwrap_or(0) as usize
    }

    pub fn num_zeros(&self) -> usize {
        self.num_bits - self.num_ones()
    }

    /// Bit at `index`; out-of-range positions read as 0.
    pub fn get(&self, index: usize) -> bool {
        index < self.num_bits && (self.image[index / 8] >> (index % 8)) & 1 == 1
    }

    /// Number of ones in `[0, index)`. `index` is clamped to `len()`.
    pub fn rank1(&self, index: usize) -> usize {
        let index = index.min(self.num_bits);
        let block = index / BLOCK_BITS;
        let mut count = self.block_ranks[block] as usize;
        let last_word = index / WORD_BITS;
        for w in block * WORDS_PER_BLOCK..last_word {
            count += self.word(w).count_ones() as usize;
        }
        let rem = index % WORD_BITS;
        if rem > 0 {
            let mask = (1u32 << rem) - 1;
            count += (self.word(last_word) & mask).count_ones() as usize;
        }
        count
    }

    /// Number of zeros in `[0, index)`. `index` is clamped to `len()`.
    pub fn rank0(&self, index: usize) -> usize {
        let index = index.min(self.num_bits);
        index - self.rank1(index)
    }

    /// Position of the `n`-th one (0-based), or `None` if there are not
    /// that many ones.
    pub fn select1(&self, n: usize) -> Option<usize> {
        if n >= self.num_ones() {
            return None;
        }
        let num_blocks = self.block_ranks.len() - 1;
        let block = self.block_ranks[..num_blocks].partition_point(|&r| r as usize <= n) - 1;
        let mut remaining = n - self.block_ranks[block] as usize;
        let start = block * WORDS_PER_BLOCK;
        let end = (start + WORDS_PER_BLOCK).min(self.num_words);
        for w in start..end {
            let word = self.word(w);
            let ones = word.count_ones() as usize;
            if remaining < ones {
                return Some(w * WORD_BITS + select_in_word(word, remaining));
            }
            remaining -= ones;
        }
        None
    }

    /// Position of the `n`-th zero (0-based), or `None` if there are not
    /// that many zeros.
    pub fn select0(&self, n: usize) -> Option<usize> {
        if n >= self.num_zeros() {
            return None;
        }
        let num_blocks = self.block_ranks.len() - 1;
        let zeros_before = |b: usize| b * BLOCK_BITS - self.block_ranks[b] as usize;
        // Largest block whose preceding zero count is <= n.
        let (mut lo, mut hi) = (0usize, num_blocks);
        while hi - lo > 1 {
            let mid = (lo + hi) / 2;
            if zeros_before(mid) <= n {
                lo = mid;
            } else {
                hi = mid;
            }
        }
        let mut remaining = n - zeros_before(lo);
        let start = lo * WORDS_PER_BLOCK;
        let end = (start + WORDS_PER_BLOCK).min(self.num_words);
        for w in start..end {
            let inverted = !self.word(w);
            let zeros = inverted.count_ones() as usize;
            if remaining < zeros {
                let pos = w * WORD_BITS + select_in_word(inverted, remaining);
                return (pos < self.num_bits).then_some(pos);
            }
            remaining -= zeros;
        }
        None
    }

    fn word(&self, w: usize) -> u32 {
        word_at(self.image, w)
    }
}

/// Reads the `w`-th little-endian 32-bit word, zero-filling a short tail.
fn word_at(image: &[u8], w: usize) -> u32 {
    let start = w * 4;
    match image.get(start..start + 4) {
        Some(bytes) => u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]),
        None => {
            let mut buf = [0u8; 4];
            let tail = image.get(start..).unwrap_or(&[]);
            buf[..tail.len()].copy_from_slice(tail);
            u32::from_le_bytes(buf)
        }
    }
}

/// Position of the `k`-th set bit inside `word` (caller guarantees it exists).
fn select_in_word(mut word: u32, k: usize) -> usize {
    for _ in 0..k {
        word &= word - 1;
    }
    word.trailing_zeros() as usize
}
