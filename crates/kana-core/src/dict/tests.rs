use super::*;
use crate::data_set::{DataSetReader, DataSetWriter, DEFAULT_MAGIC};

fn entry(surface: &str, cost: i16) -> DictEntry {
    DictEntry {
        surface: surface.to_string(),
        cost,
        left_id: 10,
        right_id: 20,
    }
}

fn sample_builder() -> DictionaryBuilder {
    let mut b = DictionaryBuilder::new();
    b.add("かんじ", entry("漢字", 3000));
    b.add("かんじ", entry("感じ", 2500));
    b.add("かん", entry("缶", 4000));
    b.add("か", entry("蚊", 5000));
    b.add("がっこう", entry("学校", 2000));
    b.add("はし", entry("橋", 3000));
    b.add("はし", entry("箸", 3100));
    b.add("ばし", entry("馬氏", 6000));
    b.add("きょう", entry("今日", 1500));
    b
}

#[test]
fn lookup_sorted_by_cost() {
    let blob = sample_builder().build_blob(32).unwrap();
    let reader = DataSetReader::new(&blob, DEFAULT_MAGIC).unwrap();
    let dict = LoudsDictionary::from_data_set(&reader).unwrap();

    let entries = dict.lookup("かんじ");
    let surfaces: Vec<&str> = entries.iter().map(|e| e.surface.as_str()).collect();
    assert_eq!(surfaces, ["感じ", "漢字"]);
    assert_eq!(entries[0].left_id, 10);
    assert_eq!(entries[0].right_id, 20);
    assert!(dict.lookup("かんじょう").is_empty());
    assert!(dict.lookup("").is_empty());
    assert_eq!(dict.num_readings(), 7);
    assert_eq!(dict.num_entries(), 9);
}

#[test]
fn duplicate_surface_keeps_cheapest() {
    let mut b = DictionaryBuilder::new();
    b.add("あめ", entry("雨", 3000));
    b.add("あめ", entry("雨", 2000));
    b.add("あめ", entry("飴", 2500));
    let blob = b.build_blob(32).unwrap();
    let reader = DataSetReader::new(&blob, DEFAULT_MAGIC).unwrap();
    let dict = LoudsDictionary::from_data_set(&reader).unwrap();
    let entries = dict.lookup("あめ");
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0], entry("雨", 2000));
}

#[test]
fn common_prefix_search_shortest_first() {
    let blob = sample_builder().build_blob(32).unwrap();
    let reader = DataSetReader::new(&blob, DEFAULT_MAGIC).unwrap();
    let dict = LoudsDictionary::from_data_set(&reader).unwrap();

    let readings: Vec<String> = dict
        .common_prefix_search("かんじる")
        .into_iter()
        .map(|r| r.reading)
        .collect();
    assert_eq!(readings, ["か", "かん", "かんじ"]);
    assert!(dict.common_prefix_search("ん").is_empty());
}

#[test]
fn predict_in_key_order() {
    let blob = sample_builder().build_blob(32).unwrap();
    let reader = DataSetReader::new(&blob, DEFAULT_MAGIC).unwrap();
    let dict = LoudsDictionary::from_data_set(&reader).unwrap();

    let readings: Vec<String> = dict.predict("か", 10).into_iter().map(|r| r.reading).collect();
    assert_eq!(readings, ["か", "かん", "かんじ"]);
    assert_eq!(dict.predict("か", 2).len(), 2);

    let ranked = dict.predict_ranked("か", 2, 10);
    assert_eq!(ranked[0].1.surface, "感じ");
    assert_eq!(ranked[1].1.surface, "漢字");
}

#[test]
fn kana_insensitive_prefix_search() {
    let blob = sample_builder().build_blob(32).unwrap();
    let reader = DataSetReader::new(&blob, DEFAULT_MAGIC).unwrap();
    let dict = LoudsDictionary::from_data_set(&reader).unwrap();

    // "かつこう" reaches "がっこう" through voicing and small tsu.
    let readings: Vec<String> = dict
        .common_prefix_search_kana_insensitive("かつこう")
        .into_iter()
        .map(|r| r.reading)
        .collect();
    assert_eq!(readings, ["か", "がっこう"]);

    // Exact form sorts before the variant at equal length.
    let results = dict.common_prefix_search_kana_insensitive("はし");
    let readings: Vec<&str> = results.iter().map(|r| r.reading.as_str()).collect();
    assert_eq!(readings, ["はし", "ばし"]);
    assert_eq!(results[1].entries[0].surface, "馬氏");
}

#[test]
fn iter_visits_every_reading() {
    let builder = sample_builder();
    let blob = builder.build_blob(32).unwrap();
    let reader = DataSetReader::new(&blob, DEFAULT_MAGIC).unwrap();
    let dict = LoudsDictionary::from_data_set(&reader).unwrap();
    let all: Vec<(String, Vec<DictEntry>)> = dict.iter().collect();
    assert_eq!(all.len(), builder.num_readings());
    assert_eq!(
        all.iter().map(|(_, e)| e.len()).sum::<usize>(),
        builder.num_entries()
    );
}

#[test]
fn regions_share_data_set_with_others() {
    let mut writer = DataSetWriter::default();
    writer.add("other", 64, b"payload").unwrap();
    sample_builder().write_regions(&mut writer, 64).unwrap();
    let blob = writer.into_bytes().unwrap();
    let reader = DataSetReader::new(&blob, DEFAULT_MAGIC).unwrap();
    assert_eq!(reader.get("other"), Some(&b"payload"[..]));
    let dict = LoudsDictionary::from_data_set(&reader).unwrap();
    assert_eq!(dict.lookup("きょう")[0].surface, "今日");
}

#[test]
fn missing_region_is_an_error() {
    let mut writer = DataSetWriter::default();
    writer.add(LOUDS_REGION, 32, b"").unwrap();
    let blob = writer.into_bytes().unwrap();
    let reader = DataSetReader::new(&blob, DEFAULT_MAGIC).unwrap();
    assert!(matches!(
        LoudsDictionary::from_data_set(&reader),
        Err(DictError::DataSet(crate::data_set::DataSetError::MissingRegion(_)))
    ));
}

#[test]
fn corrupt_index_rejected() {
    let blob = sample_builder().build_blob(32).unwrap();
    let reader = DataSetReader::new(&blob, DEFAULT_MAGIC).unwrap();
    let louds = reader.get(LOUDS_REGION).unwrap();
    let index = reader.get(INDEX_REGION).unwrap();
    let records = reader.get(ENTRIES_REGION).unwrap();
    let strings = reader.get(STRINGS_REGION).unwrap();

    assert!(matches!(
        LoudsDictionary::from_regions(louds, &index[..index.len() - 8], records, strings),
        Err(DictError::Corrupt(_))
    ));

    let mut bad_index = index.to_vec();
    bad_index[4..8].copy_from_slice(&1000u32.to_le_bytes());
    assert!(matches!(
        LoudsDictionary::from_regions(louds, &bad_index, records, strings),
        Err(DictError::Corrupt(_))
    ));

    assert!(matches!(
        LoudsDictionary::from_regions(louds, index, records, &strings[..strings.len() - 1]),
        Err(DictError::Corrupt(_))
    ));
}

#[test]
fn empty_reading_rejected() {
    let mut b = DictionaryBuilder::new();
    b.add("", entry("x", 0));
    assert!(matches!(b.build_blob(32), Err(DictError::Parse(_))));
}

#[test]
fn empty_dictionary() {
    let blob = DictionaryBuilder::new().build_blob(32).unwrap();
    let reader = DataSetReader::new(&blob, DEFAULT_MAGIC).unwrap();
    let dict = LoudsDictionary::from_data_set(&reader).unwrap();
    assert_eq!(dict.num_readings(), 0);
    assert!(dict.lookup("あ").is_empty());
    assert!(dict.predict("", 10).is_empty());
}
