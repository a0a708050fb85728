//! Reading → entries dictionary stored as DataSet regions.
//!
//! `LoudsDictionary` is a zero-copy view: the trie, the per-key index and
//! the entry records are read straight out of the blob.

mod builder;
mod entry;
mod louds_dict;
#[cfg(test)]
mod tests;

pub use builder::DictionaryBuilder;
pub use entry::DictEntry;
pub use louds_dict::LoudsDictionary;

use crate::data_set::DataSetError;
use crate::louds::LoudsError;

/// Region names inside the data set.
pub const LOUDS_REGION: &str = "dict.louds";
pub const INDEX_REGION: &str = "dict.index";
pub const ENTRIES_REGION: &str = "dict.entries";
pub const STRINGS_REGION: &str = "dict.strings";

#[derive(Debug, thiserror::Error)]
pub enum DictError {
    #[error("data set error: {0}")]
    DataSet(#[from] DataSetError),

    #[error("trie error: {0}")]
    Louds(#[from] LoudsError),

    #[error("corrupt dictionary: {0}")]
    Corrupt(String),

    #[error("parse error: {0}")]
    Parse(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    pub reading: String,
    pub entries: Vec<DictEntry>,
}

pub trait Dictionary: Send + Sync {
    /// Entries for `reading`, cheapest first.
    fn lookup(&self, reading: &str) -> Vec<DictEntry>;

    /// Readings that start with `prefix`, up to `max_results`.
    fn predict(&self, prefix: &str, max_results: usize) -> Vec<SearchResult>;

    /// Readings that are prefixes of `query`, shortest first.
    fn common_prefix_search(&self, query: &str) -> Vec<SearchResult>;

    /// Like `common_prefix_search`, but each query kana also matches its
    /// voiced, semi-voiced and small forms. The returned reading is the
    /// stored one and has the same byte length as the matched query prefix.
    fn common_prefix_search_kana_insensitive(&self, query: &str) -> Vec<SearchResult> {
        self.common_prefix_search(query)
    }

    /// Prediction candidates ranked by cost, deduplicated by surface.
    fn predict_ranked(
        &self,
        prefix: &str,
        max_results: usize,
        scan_limit: usize,
    ) -> Vec<(String, DictEntry)> {
        let mut flat: Vec<(String, DictEntry)> = Vec::new();
        for sr in self.predict(prefix, scan_limit) {
            flat.reserve(sr.entries.len());
            for e in sr.entries {
                flat.push((sr.reading.clone(), e));
            }
        }

        flat.sort_by_key(|(_, e)| e.cost);

        let mut seen = std::collections::HashSet::new();
        flat.retain(|(_, e)| seen.insert(e.surface.clone()));

        flat.truncate(max_results);
        flat
    }
}
