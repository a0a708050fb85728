use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use kana_core::data_set::DataSetWriter;
use kana_core::dict::{DictEntry, Dictionary};
use kana_core::settings;
use kana_engine::DataFile;

use super::{column_width, pad};
use crate::word_list::read_word_list;

fn open(file: &str) -> DataFile {
    die!(DataFile::open(Path::new(file)), "Error opening {file}: {}")
}

fn print_entries(entries: &[DictEntry]) {
    let width = column_width(entries.iter().map(|e| e.surface.as_str())).max(7);
    println!("  {}  {:>6}  {:>5}  {:>5}", pad("surface", width), "cost", "lid", "rid");
    for e in entries {
        println!(
            "  {}  {:>6}  {:>5}  {:>5}",
            pad(&e.surface, width),
            e.cost,
            e.left_id,
            e.right_id
        );
    }
}

pub fn build(input: &str, output: &str, alignment: Option<u32>) {
    let alignment = alignment.unwrap_or(settings::settings().data_set.default_alignment);

    eprintln!("Reading {input}...");
    let (builder, stats) = die!(read_word_list(Path::new(input)), "Error reading {input}: {}");
    eprintln!(
        "  {} entries (skipped {} of {} lines)",
        stats.entries, stats.skipped, stats.lines
    );

    eprintln!(
        "Building {} readings ({} entries)...",
        builder.num_readings(),
        builder.num_entries()
    );
    let mut writer = DataSetWriter::default();
    die!(
        builder.write_regions(&mut writer, alignment),
        "Error building dictionary: {}"
    );

    let file = die!(File::create(output), "Error creating {output}: {}");
    let mut out = BufWriter::new(file);
    die!(writer.finish(&mut out), "Error writing {output}: {}");
    die!(out.flush(), "Error writing {output}: {}");

    let file_size = fs::metadata(output).map(|m| m.len()).unwrap_or(0);
    eprintln!("Wrote {output} ({:.1} KB)", file_size as f64 / 1024.0);
}

pub fn info(file: &str) {
    let data = open(file);
    let reader = die!(data.reader(), "Error reading directory: {}");

    println!("Data set:   {file}");
    println!("File size:  {} bytes", data.len());
    println!("Regions:    {}", reader.entries().len());
    println!();

    let width = column_width(reader.entries().iter().map(|e| e.name.as_str())).max(4);
    println!("  {}  {:>10}  {:>10}", pad("name", width), "offset", "size");
    for entry in reader.entries() {
        println!(
            "  {}  {:>10}  {:>10}",
            pad(&entry.name, width),
            entry.offset,
            entry.size
        );
    }

    if let Ok(dict) = data.dictionary() {
        println!();
        println!("Readings:   {}", dict.num_readings());
        println!("Entries:    {}", dict.num_entries());
        println!("Trie nodes: {}", dict.trie().num_nodes());
    }
}

pub fn verify(file: &str) {
    let data = open(file);
    let reader = die!(data.reader(), "Error reading directory: {}");
    println!(
        "OK: {file} ({} bytes, {} regions)",
        data.len(),
        reader.entries().len()
    );
}

pub fn lookup(file: &str, reading: &str) {
    let data = open(file);
    let dict = die!(data.dictionary(), "Error opening dictionary: {}");
    let entries = dict.lookup(reading);
    if entries.is_empty() {
        println!("{reading}: (not found)");
        return;
    }
    println!("{reading}: {} entries", entries.len());
    print_entries(&entries);
}

pub fn prefix(file: &str, query: &str, kana_insensitive: bool) {
    let data = open(file);
    let dict = die!(data.dictionary(), "Error opening dictionary: {}");
    let results = if kana_insensitive {
        dict.common_prefix_search_kana_insensitive(query)
    } else {
        dict.common_prefix_search(query)
    };
    if results.is_empty() {
        println!("{query}: (no prefixes)");
        return;
    }
    let width = column_width(results.iter().map(|r| r.reading.as_str()));
    for r in &results {
        let surfaces: Vec<&str> = r.entries.iter().map(|e| e.surface.as_str()).collect();
        println!("{}  {}", pad(&r.reading, width), surfaces.join(", "));
    }
}

pub fn predict(file: &str, prefix: &str, n: usize) {
    let data = open(file);
    let dict = die!(data.dictionary(), "Error opening dictionary: {}");
    let ranked = dict.predict_ranked(prefix, n, 1000);
    if ranked.is_empty() {
        println!("{prefix}: (no completions)");
        return;
    }
    let width = column_width(ranked.iter().map(|(reading, _)| reading.as_str()));
    for (i, (reading, entry)) in ranked.iter().enumerate() {
        println!(
            "#{:>2}: {}  {} ({})",
            i + 1,
            pad(reading, width),
            entry.surface,
            entry.cost
        );
    }
}
