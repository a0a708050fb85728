use std::collections::{BTreeMap, HashMap, HashSet};

use tracing::{debug, debug_span};

use super::entry::{RawRecord, RECORD_SIZE, SLOT_SIZE};
use super::{
    DictEntry, DictError, ENTRIES_REGION, INDEX_REGION, LOUDS_REGION, STRINGS_REGION,
};
use crate::data_set::DataSetWriter;
use crate::louds::{LoudsTrie, LoudsTrieBuilder};

/// Collects `(reading, entry)` pairs and writes the dictionary regions.
#[derive(Debug, Default)]
pub struct DictionaryBuilder {
    readings: BTreeMap<String, Vec<DictEntry>>,
}

impl DictionaryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: impl IntoIterator<Item = (String, Vec<DictEntry>)>) -> Self {
        let mut builder = Self::new();
        for (reading, list) in entries {
            builder.readings.entry(reading).or_default().extend(list);
        }
        builder
    }

    pub fn add(&mut self, reading: &str, entry: DictEntry) {
        self.readings
            .entry(reading.to_string())
            .or_default()
            .push(entry);
    }

    pub fn num_readings(&self) -> usize {
        self.readings.len()
    }

    pub fn num_entries(&self) -> usize {
        self.readings.values().map(Vec::len).sum()
    }

    /// Add the four dictionary regions to `writer`.
    ///
    /// Entries of a reading are stored cheapest first; duplicate surfaces
    /// keep the lowest cost.
    pub fn write_regions(&self, writer: &mut DataSetWriter, alignment: u32) -> Result<(), DictError> {
        let _span = debug_span!("dict_build", readings = self.readings.len()).entered();

        if self.readings.contains_key("") {
            return Err(DictError::Parse("empty reading".to_string()));
        }

        let mut trie_builder = LoudsTrieBuilder::new();
        for reading in self.readings.keys() {
            trie_builder.add(reading.as_bytes());
        }
        let louds = trie_builder.build()?;
        let trie = LoudsTrie::open(&louds)?;

        let mut by_key_id: Vec<Option<Vec<&DictEntry>>> = vec![None; trie.num_keys()];
        for (reading, entries) in &self.readings {
            let key_id = trie
                .exact_match(reading.as_bytes())
                .and_then(|node| trie.key_id(node))
                .ok_or_else(|| DictError::Corrupt(format!("reading {reading} missing from trie")))?;
            by_key_id[key_id as usize] = Some(ranked(entries));
        }

        let mut index = Vec::with_capacity(by_key_id.len() * SLOT_SIZE);
        let mut records = Vec::new();
        let mut strings = Vec::new();
        let mut surface_offsets: HashMap<&str, u32> = HashMap::new();
        let mut record_count = 0u32;

        for entries in by_key_id.iter().map(|e| e.as_deref().unwrap_or(&[])) {
            index.extend_from_slice(&record_count.to_le_bytes());
            index.extend_from_slice(&(entries.len() as u32).to_le_bytes());
            for entry in entries {
                let surface_len = u16::try_from(entry.surface.len()).map_err(|_| {
                    DictError::Parse(format!("surface too long: {}", entry.surface))
                })?;
                let surface_offset = match surface_offsets.get(entry.surface.as_str()) {
                    Some(&offset) => offset,
                    None => {
                        let offset = u32::try_from(strings.len()).map_err(|_| {
                            DictError::Parse("string pool exceeds u32::MAX".to_string())
                        })?;
                        strings.extend_from_slice(entry.surface.as_bytes());
                        surface_offsets.insert(&entry.surface, offset);
                        offset
                    }
                };
                RawRecord {
                    surface_offset,
                    surface_len,
                    cost: entry.cost,
                    left_id: entry.left_id,
                    right_id: entry.right_id,
                }
                .encode(&mut records);
                record_count = record_count
                    .checked_add(1)
                    .ok_or_else(|| DictError::Parse("too many entries".to_string()))?;
            }
        }
        debug_assert_eq!(records.len(), record_count as usize * RECORD_SIZE);

        writer.add(LOUDS_REGION, alignment, &louds)?;
        writer.add(INDEX_REGION, alignment, &index)?;
        writer.add(ENTRIES_REGION, alignment, &records)?;
        writer.add(STRINGS_REGION, 8, &strings)?;

        debug!(
            keys = trie.num_keys(),
            nodes = trie.num_nodes(),
            entries = record_count,
            string_bytes = strings.len()
        );
        Ok(())
    }

    /// A standalone data set holding only the dictionary.
    pub fn build_blob(&self, alignment: u32) -> Result<Vec<u8>, DictError> {
        let mut writer = DataSetWriter::default();
        self.write_regions(&mut writer, alignment)?;
        Ok(writer.into_bytes()?)
    }
}

fn ranked(entries: &[DictEntry]) -> Vec<&DictEntry> {
    let mut sorted: Vec<&DictEntry> = entries.iter().collect();
    sorted.sort_by_key(|e| e.cost);
    let mut seen = HashSet::new();
    sorted.retain(|e| seen.insert(e.surface.as_str()));
    sorted
}
