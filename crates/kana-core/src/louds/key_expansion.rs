/// Per-byte set of edge labels a query byte may match.
///
/// Every byte always matches itself; `add` widens the set. Expansion is
/// context-free, so it suits keys with a single-byte code per symbol.
/// Multi-byte UTF-8 variants (voiced kana) are expanded per character by
/// `LoudsDictionary` instead.
#[derive(Clone)]
pub struct KeyExpansionTable {
    table: Box<[[u64; 4]; 256]>,
}

impl std::fmt::Debug for KeyExpansionTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let expanded = (0..=255u8)
            .filter(|&b| self.table[b as usize].iter().map(|w| w.count_ones()).sum::<u32>() > 1)
            .count();
        f.debug_struct("KeyExpansionTable")
            .field("expanded_keys", &expanded)
            .finish()
    }
}

impl Default for KeyExpansionTable {
    fn default() -> Self {
        let mut table = Box::new([[0u64; 4]; 256]);
        for b in 0..256usize {
            table[b][b / 64] |= 1 << (b % 64);
        }
        Self { table }
    }
}

impl KeyExpansionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Let `key` additionally match every byte in `expanded`.
    pub fn add(&mut self, key: u8, expanded: &[u8]) {
        let set = &mut self.table[key as usize];
        for &label in expanded {
            set[label as usize / 64] |= 1 << (label % 64);
        }
    }

    pub fn is_hit(&self, key: u8, label: u8) -> bool {
        self.table[key as usize][label as usize / 64] & (1 << (label % 64)) != 0
    }
}
