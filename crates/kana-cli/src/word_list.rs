//! Word list source for `dictool build`.
//!
//! One entry per line, tab separated:
//! `reading  left_id  right_id  cost  surface`. Empty lines and lines
//! starting with `#` are skipped, as are lines that do not parse or whose
//! reading is not hiragana.

use std::fs;
use std::io;
use std::path::Path;

use kana_core::dict::{DictEntry, DictionaryBuilder};
use kana_core::unicode::is_hiragana_reading;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct WordListStats {
    pub lines: u64,
    pub entries: u64,
    pub skipped: u64,
}

/// Parse fields `[1]`, `[2]`, `[3]` as `(left_id, right_id, cost)`.
fn parse_id_cost(fields: &[&str]) -> Option<(u16, u16, i16)> {
    let left_id: u16 = fields.get(1)?.trim().parse().ok()?;
    let right_id: u16 = fields.get(2)?.trim().parse().ok()?;
    let cost: i16 = fields.get(3)?.trim().parse().ok()?;
    Some((left_id, right_id, cost))
}

pub fn parse_line(line: &str) -> Option<(String, DictEntry)> {
    let fields: Vec<&str> = line.split('\t').collect();
    let reading = fields.first()?.trim();
    let surface = fields.get(4)?.trim();
    if !is_hiragana_reading(reading) || surface.is_empty() {
        return None;
    }
    let (left_id, right_id, cost) = parse_id_cost(&fields)?;
    Some((
        reading.to_string(),
        DictEntry {
            surface: surface.to_string(),
            cost,
            left_id,
            right_id,
        },
    ))
}

/// Add every entry of `content` to `builder`.
pub fn parse_word_list(content: &str, builder: &mut DictionaryBuilder) -> WordListStats {
    let mut stats = WordListStats::default();
    for line in content.lines() {
        stats.lines += 1;
        if line.is_empty() || line.starts_with('#') {
            stats.skipped += 1;
            continue;
        }
        match parse_line(line) {
            Some((reading, entry)) => {
                builder.add(&reading, entry);
                stats.entries += 1;
            }
            None => stats.skipped += 1,
        }
    }
    stats
}

pub fn read_word_list(path: &Path) -> io::Result<(DictionaryBuilder, WordListStats)> {
    let content = fs::read_to_string(path)?;
    let mut builder = DictionaryBuilder::new();
    let stats = parse_word_list(&content, &mut builder);
    Ok((builder, stats))
}
