//! Engine settings loaded from TOML.
//!
//! - `init_custom(toml_content)` sets a custom TOML before first `settings()` call
//! - `settings()` returns `&'static Settings` (lazy-init singleton)
//! - Default values are embedded via `include_str!("default_settings.toml")`
//!
//! Library code takes the sections it needs by reference (see
//! `ConversionRequest`); only process-level callers touch the singleton.

use std::sync::OnceLock;

use serde::Deserialize;

pub const DEFAULT_SETTINGS_TOML: &str = include_str!("default_settings.toml");

/// Upper bound for `segments.max_history_segments`.
pub const MAX_HISTORY_SEGMENTS_LIMIT: usize = 32;

static CUSTOM_TOML: OnceLock<String> = OnceLock::new();

/// Set custom TOML before first `settings()` call.
pub fn init_custom(toml_content: String) -> Result<(), SettingsError> {
    parse_settings_toml(&toml_content)?;
    CUSTOM_TOML
        .set(toml_content)
        .map_err(|_| SettingsError::AlreadyInitialized)
}

/// Get or initialize the global settings singleton.
///
/// Falls back to the embedded defaults if a custom TOML fails to parse,
/// which cannot happen for content accepted by `init_custom`.
pub fn settings() -> &'static Settings {
    static INSTANCE: OnceLock<Settings> = OnceLock::new();
    INSTANCE.get_or_init(|| {
        CUSTOM_TOML
            .get()
            .and_then(|s| parse_settings_toml(s).ok())
            .unwrap_or_default()
    })
}

/// Returns the embedded default settings TOML content.
pub fn default_toml() -> &'static str {
    DEFAULT_SETTINGS_TOML
}

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("TOML parse error: {0}")]
    Parse(String),
    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
    #[error("settings already initialized")]
    AlreadyInitialized,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct Settings {
    pub conversion: ConversionSettings,
    pub segments: SegmentsSettings,
    pub data_set: DataSetSettings,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ConversionSettings {
    pub use_kana_modifier_insensitive_conversion: bool,
}

impl ConversionSettings {
    /// Compile-time copy of the defaults, usable in statics.
    pub const DEFAULT: ConversionSettings = ConversionSettings {
        use_kana_modifier_insensitive_conversion: true,
    };
}

impl Default for ConversionSettings {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct SegmentsSettings {
    pub max_history_segments: usize,
    pub max_conversion_candidates: usize,
    pub max_prediction_candidates: usize,
}

impl Default for SegmentsSettings {
    fn default() -> Self {
        Self {
            max_history_segments: 4,
            max_conversion_candidates: 200,
            max_prediction_candidates: 10,
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct DataSetSettings {
    /// Region alignment in bits.
    pub default_alignment: u32,
}

impl Default for DataSetSettings {
    fn default() -> Self {
        Self {
            default_alignment: 32,
        }
    }
}

pub fn parse_settings_toml(toml_str: &str) -> Result<Settings, SettingsError> {
    let s: Settings = toml::from_str(toml_str).map_err(|e| SettingsError::Parse(e.to_string()))?;
    validate(&s)?;
    Ok(s)
}

fn validate(s: &Settings) -> Result<(), SettingsError> {
    macro_rules! check_positive_usize {
        ($section:ident . $field:ident) => {
            if s.$section.$field == 0 {
                return Err(SettingsError::InvalidValue {
                    field: concat!(stringify!($section), ".", stringify!($field)).to_string(),
                    reason: "must be positive".to_string(),
                });
            }
        };
    }

    check_positive_usize!(segments.max_conversion_candidates);
    check_positive_usize!(segments.max_prediction_candidates);

    if s.segments.max_history_segments > MAX_HISTORY_SEGMENTS_LIMIT {
        return Err(SettingsError::InvalidValue {
            field: "segments.max_history_segments".to_string(),
            reason: format!("must be at most {MAX_HISTORY_SEGMENTS_LIMIT}"),
        });
    }

    if !matches!(s.data_set.default_alignment, 8 | 16 | 32 | 64) {
        return Err(SettingsError::InvalidValue {
            field: "data_set.default_alignment".to_string(),
            reason: "must be one of 8, 16, 32, 64".to_string(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_default_toml() {
        let s = parse_settings_toml(DEFAULT_SETTINGS_TOML).unwrap();
        assert!(s.conversion.use_kana_modifier_insensitive_conversion);
        assert_eq!(s.segments.max_history_segments, 4);
        assert_eq!(s.segments.max_conversion_candidates, 200);
        assert_eq!(s.data_set.default_alignment, 32);
    }

    #[test]
    fn embedded_defaults_match_default_impl() {
        let s = parse_settings_toml(DEFAULT_SETTINGS_TOML).unwrap();
        assert_eq!(s, Settings::default());
    }

    #[test]
    fn reject_zero_candidates() {
        let toml = DEFAULT_SETTINGS_TOML.replace(
            "max_conversion_candidates = 200",
            "max_conversion_candidates = 0",
        );
        let err = parse_settings_toml(&toml).unwrap_err();
        assert!(err.to_string().contains("segments.max_conversion_candidates"));
    }

    #[test]
    fn reject_history_over_limit() {
        let toml =
            DEFAULT_SETTINGS_TOML.replace("max_history_segments = 4", "max_history_segments = 33");
        assert!(matches!(
            parse_settings_toml(&toml),
            Err(SettingsError::InvalidValue { .. })
        ));
    }

    #[test]
    fn reject_bad_alignment() {
        let toml = DEFAULT_SETTINGS_TOML.replace("default_alignment = 32", "default_alignment = 24");
        assert!(matches!(
            parse_settings_toml(&toml),
            Err(SettingsError::InvalidValue { .. })
        ));
    }

    #[test]
    fn reject_missing_section() {
        let err = parse_settings_toml("[conversion]\nuse_kana_modifier_insensitive_conversion = false\n")
            .unwrap_err();
        assert!(matches!(err, SettingsError::Parse(_)));
    }

    #[test]
    fn singleton_returns_defaults() {
        assert_eq!(settings().segments.max_conversion_candidates, 200);
    }
}
