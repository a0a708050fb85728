use tracing::{debug, debug_span};

use super::entry::{RawRecord, RECORD_SIZE, SLOT_SIZE};
use super::{
    DictEntry, DictError, Dictionary, SearchResult, ENTRIES_REGION, INDEX_REGION, LOUDS_REGION,
    STRINGS_REGION,
};
use crate::data_set::DataSetReader;
use crate::louds::{LoudsTrie, NodeId};
use crate::unicode::kana_modifier_variants;

/// Zero-copy dictionary over the regions written by `DictionaryBuilder`.
///
/// Every slot and record is bounds-checked when the view is opened, so
/// lookups never fail on a verified blob.
#[derive(Debug, Clone)]
pub struct LoudsDictionary<'a> {
    trie: LoudsTrie<'a>,
    index: &'a [u8],
    records: &'a [u8],
    strings: &'a [u8],
}

impl<'a> LoudsDictionary<'a> {
    pub fn from_data_set(data_set: &DataSetReader<'a>) -> Result<Self, DictError> {
        Self::from_regions(
            data_set.require(LOUDS_REGION)?,
            data_set.require(INDEX_REGION)?,
            data_set.require(ENTRIES_REGION)?,
            data_set.require(STRINGS_REGION)?,
        )
    }

    pub fn from_regions(
        louds: &'a [u8],
        index: &'a [u8],
        records: &'a [u8],
        strings: &'a [u8],
    ) -> Result<Self, DictError> {
        let _span = debug_span!("dict_open").entered();
        let trie = LoudsTrie::open(louds)?;

        if index.len() != trie.num_keys() * SLOT_SIZE {
            return Err(DictError::Corrupt(format!(
                "index has {} bytes for {} keys",
                index.len(),
                trie.num_keys()
            )));
        }
        if records.len() % RECORD_SIZE != 0 {
            return Err(DictError::Corrupt("entry table size is not a record multiple".into()));
        }
        let num_records = records.len() / RECORD_SIZE;

        for slot in index.chunks_exact(SLOT_SIZE) {
            let (start, count) = decode_slot(slot);
            if start.checked_add(count).map_or(true, |end| end > num_records) {
                return Err(DictError::Corrupt("index slot points past the entry table".into()));
            }
        }
        for raw in records.chunks_exact(RECORD_SIZE).map(RawRecord::decode) {
            let surface = strings
                .get(raw.surface_range())
                .ok_or_else(|| DictError::Corrupt("surface points past the string pool".into()))?;
            std::str::from_utf8(surface)
                .map_err(|_| DictError::Corrupt("surface is not valid UTF-8".into()))?;
        }

        debug!(keys = trie.num_keys(), records = num_records);
        Ok(Self {
            trie,
            index,
            records,
            strings,
        })
    }

    pub fn trie(&self) -> &LoudsTrie<'a> {
        &self.trie
    }

    pub fn num_readings(&self) -> usize {
        self.trie.num_keys()
    }

    pub fn num_entries(&self) -> usize {
        self.records.len() / RECORD_SIZE
    }

    /// Entries stored under a trie key id.
    pub fn entries_of(&self, key_id: u32) -> Vec<DictEntry> {
        let Some(slot) = self
            .index
            .get(key_id as usize * SLOT_SIZE..(key_id as usize + 1) * SLOT_SIZE)
        else {
            return Vec::new();
        };
        let (start, count) = decode_slot(slot);
        self.records[start * RECORD_SIZE..(start + count) * RECORD_SIZE]
            .chunks_exact(RECORD_SIZE)
            .map(|bytes| self.decode_entry(bytes))
            .collect()
    }

    /// Iterate over all `(reading, entries)` pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (String, Vec<DictEntry>)> + '_ {
        self.trie
            .predictive_search(b"")
            .map(move |m| (lossy(m.key), self.entries_of(m.key_id)))
    }

    fn decode_entry(&self, bytes: &[u8]) -> DictEntry {
        let raw = RawRecord::decode(bytes);
        let surface = self
            .strings
            .get(raw.surface_range())
            .map(String::from_utf8_lossy)
            .unwrap_or_default()
            .into_owned();
        DictEntry {
            surface,
            cost: raw.cost,
            left_id: raw.left_id,
            right_id: raw.right_id,
        }
    }

    /// Depth-first walk that lets each query character match any of its
    /// modifier variants, spelled out as whole UTF-8 sequences.
    fn walk_kana_insensitive(
        &self,
        node: NodeId,
        rest: &str,
        reading: &mut String,
        out: &mut Vec<SearchResult>,
    ) {
        let Some(c) = rest.chars().next() else {
            return;
        };
        let rest = &rest[c.len_utf8()..];
        let mut buf = [0u8; 4];
        let single = c.to_string();
        let variants = kana_modifier_variants(c).unwrap_or(single.as_str());

        for v in variants.chars() {
            let Some(next) = v
                .encode_utf8(&mut buf)
                .bytes()
                .try_fold(node, |n, b| self.trie.child(n, b))
            else {
                continue;
            };
            reading.push(v);
            if let Some(key_id) = self.trie.key_id(next) {
                out.push(SearchResult {
                    reading: reading.clone(),
                    entries: self.entries_of(key_id),
                });
            }
            self.walk_kana_insensitive(next, rest, reading, out);
            reading.pop();
        }
    }
}

fn decode_slot(slot: &[u8]) -> (usize, usize) {
    let start = u32::from_le_bytes([slot[0], slot[1], slot[2], slot[3]]) as usize;
    let count = u32::from_le_bytes([slot[4], slot[5], slot[6], slot[7]]) as usize;
    (start, count)
}

fn lossy(bytes: Vec<u8>) -> String {
    String::from_utf8(bytes).unwrap_or_else(|e| String::from_utf8_lossy(e.as_bytes()).into_owned())
}

impl Dictionary for LoudsDictionary<'_> {
    fn lookup(&self, reading: &str) -> Vec<DictEntry> {
        self.trie
            .exact_match(reading.as_bytes())
            .and_then(|node| self.trie.key_id(node))
            .map(|key_id| self.entries_of(key_id))
            .unwrap_or_default()
    }

    fn predict(&self, prefix: &str, max_results: usize) -> Vec<SearchResult> {
        self.trie
            .predictive_search(prefix.as_bytes())
            .take(max_results)
            .map(|m| SearchResult {
                entries: self.entries_of(m.key_id),
                reading: lossy(m.key),
            })
            .collect()
    }

    fn common_prefix_search(&self, query: &str) -> Vec<SearchResult> {
        let query_bytes = query.as_bytes();
        self.trie
            .common_prefix_search(query_bytes)
            .filter_map(|m| {
                // Byte prefixes that split a character are not readings.
                let reading = std::str::from_utf8(&query_bytes[..m.len]).ok()?;
                Some(SearchResult {
                    reading: reading.to_string(),
                    entries: self.entries_of(m.key_id),
                })
            })
            .collect()
    }

    fn common_prefix_search_kana_insensitive(&self, query: &str) -> Vec<SearchResult> {
        let mut out = Vec::new();
        let mut reading = String::new();
        self.walk_kana_insensitive(NodeId::ROOT, query, &mut reading, &mut out);
        out.sort_by(|a, b| {
            a.reading
                .len()
                .cmp(&b.reading.len())
                .then_with(|| (!query.starts_with(&a.reading)).cmp(&!query.starts_with(&b.reading)))
        });
        out
    }
}
