use std::fs;
use std::path::Path;

use kana_core::settings;

/// Create `dir` if needed and send engine traces to it. Traces are only
/// written when built with the `trace` feature.
pub fn trace_init(dir: &str) {
    die!(fs::create_dir_all(dir), "Error creating trace dir {dir}: {}");
    kana_engine::init_tracing(Path::new(dir));
}

pub fn settings_export() {
    print!("{}", settings::default_toml());
}

pub fn settings_validate(file: &str) {
    let content = die!(fs::read_to_string(file), "Error reading {file}: {}");
    let s = die!(settings::parse_settings_toml(&content), "Error: {}");
    println!(
        "OK: segments.max_history_segments={}, segments.max_conversion_candidates={}, data_set.default_alignment={}",
        s.segments.max_history_segments,
        s.segments.max_conversion_candidates,
        s.data_set.default_alignment
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trace_init_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let logs = dir.path().join("logs").join("trace");
        trace_init(logs.to_str().unwrap());
        assert!(logs.is_dir());
    }
}
