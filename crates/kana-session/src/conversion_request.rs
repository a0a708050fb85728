//! Per-call parameters of a conversion.
//!
//! A `ConversionRequest` borrows everything it refers to: the composer
//! holding the user's input, the client request flags and a configuration
//! snapshot. It is `Copy`; copying shares the referents.

use std::fmt;

use kana_core::settings::ConversionSettings;

/// Source of the text being converted.
pub trait Composer {
    /// Key used for conversion, including any pending romaji.
    fn query_for_conversion(&self) -> String;

    /// Key used for prediction. Pending romaji may be dropped.
    fn query_for_prediction(&self) -> String;
}

/// A composer over a fixed preedit string.
///
/// The prediction query drops trailing ASCII letters, which are romaji not
/// yet turned into kana.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Preedit {
    text: String,
}

impl Preedit {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

impl Composer for Preedit {
    fn query_for_conversion(&self) -> String {
        self.text.clone()
    }

    fn query_for_prediction(&self) -> String {
        self.text
            .trim_end_matches(|c: char| c.is_ascii_alphabetic())
            .to_string()
    }
}

/// Client-side request flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub kana_modifier_insensitive_conversion: bool,
    pub zero_query_suggestion: bool,
    pub mixed_conversion: bool,
}

impl Request {
    pub const DEFAULT: Request = Request {
        kana_modifier_insensitive_conversion: false,
        zero_query_suggestion: false,
        mixed_conversion: false,
    };
}

impl Default for Request {
    fn default() -> Self {
        Self::DEFAULT
    }
}

static DEFAULT_REQUEST: Request = Request::DEFAULT;
static DEFAULT_CONFIG: ConversionSettings = ConversionSettings::DEFAULT;

/// Which composer query becomes the conversion key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ComposerKeySelection {
    #[default]
    ConversionKey,
    PredictionKey,
}

#[derive(Clone, Copy)]
pub struct ConversionRequest<'a> {
    composer: Option<&'a dyn Composer>,
    request: &'a Request,
    config: &'a ConversionSettings,
    composer_key_selection: ComposerKeySelection,
    skip_slow_rewriters: bool,
    create_partial_candidates: bool,
    use_actual_converter_for_realtime_conversion: bool,
}

impl Default for ConversionRequest<'_> {
    fn default() -> Self {
        Self {
            composer: None,
            request: &DEFAULT_REQUEST,
            config: &DEFAULT_CONFIG,
            composer_key_selection: ComposerKeySelection::ConversionKey,
            skip_slow_rewriters: false,
            create_partial_candidates: false,
            use_actual_converter_for_realtime_conversion: false,
        }
    }
}

impl<'a> ConversionRequest<'a> {
    pub fn new(
        composer: Option<&'a dyn Composer>,
        request: &'a Request,
        config: &'a ConversionSettings,
    ) -> Self {
        Self {
            composer,
            request,
            config,
            ..Self::default()
        }
    }

    pub fn has_composer(&self) -> bool {
        self.composer.is_some()
    }

    pub fn composer(&self) -> Option<&'a dyn Composer> {
        self.composer
    }

    pub fn set_composer(&mut self, composer: Option<&'a dyn Composer>) {
        self.composer = composer;
    }

    pub fn request(&self) -> &'a Request {
        self.request
    }

    pub fn set_request(&mut self, request: &'a Request) {
        self.request = request;
    }

    pub fn config(&self) -> &'a ConversionSettings {
        self.config
    }

    pub fn set_config(&mut self, config: &'a ConversionSettings) {
        self.config = config;
    }

    pub fn composer_key_selection(&self) -> ComposerKeySelection {
        self.composer_key_selection
    }

    pub fn set_composer_key_selection(&mut self, selection: ComposerKeySelection) {
        self.composer_key_selection = selection;
    }

    pub fn skip_slow_rewriters(&self) -> bool {
        self.skip_slow_rewriters
    }

    pub fn set_skip_slow_rewriters(&mut self, value: bool) {
        self.skip_slow_rewriters = value;
    }

    pub fn create_partial_candidates(&self) -> bool {
        self.create_partial_candidates
    }

    pub fn set_create_partial_candidates(&mut self, value: bool) {
        self.create_partial_candidates = value;
    }

    pub fn use_actual_converter_for_realtime_conversion(&self) -> bool {
        self.use_actual_converter_for_realtime_conversion
    }

    pub fn set_use_actual_converter_for_realtime_conversion(&mut self, value: bool) {
        self.use_actual_converter_for_realtime_conversion = value;
    }

    /// Field-wise copy; referents stay shared.
    pub fn copy_from(&mut self, other: &ConversionRequest<'a>) {
        *self = *other;
    }

    /// Both the client and the configuration must enable it.
    pub fn is_kana_modifier_insensitive_conversion(&self) -> bool {
        self.request.kana_modifier_insensitive_conversion
            && self.config.use_kana_modifier_insensitive_conversion
    }

    /// Composer query selected by `composer_key_selection`.
    pub fn composer_key(&self) -> Option<String> {
        let composer = self.composer?;
        Some(match self.composer_key_selection {
            ComposerKeySelection::ConversionKey => composer.query_for_conversion(),
            ComposerKeySelection::PredictionKey => composer.query_for_prediction(),
        })
    }
}

impl fmt::Debug for ConversionRequest<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionRequest")
            .field("has_composer", &self.has_composer())
            .field("request", self.request)
            .field("config", self.config)
            .field("composer_key_selection", &self.composer_key_selection)
            .field("skip_slow_rewriters", &self.skip_slow_rewriters)
            .field("create_partial_candidates", &self.create_partial_candidates)
            .field(
                "use_actual_converter_for_realtime_conversion",
                &self.use_actual_converter_for_realtime_conversion,
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_request_has_no_composer() {
        let request = ConversionRequest::default();
        assert!(!request.has_composer());
        assert!(request.composer_key().is_none());
        assert_eq!(request.composer_key_selection(), ComposerKeySelection::ConversionKey);
        assert!(!request.skip_slow_rewriters());
        assert!(!request.create_partial_candidates());
        assert!(!request.use_actual_converter_for_realtime_conversion());
        assert_eq!(request.request(), &Request::default());
        assert_eq!(request.config(), &ConversionSettings::default());
    }

    #[test]
    fn kana_modifier_insensitive_needs_both_flags() {
        let on = Request {
            kana_modifier_insensitive_conversion: true,
            ..Request::default()
        };
        let off = Request::default();
        let enabled = ConversionSettings {
            use_kana_modifier_insensitive_conversion: true,
        };
        let disabled = ConversionSettings {
            use_kana_modifier_insensitive_conversion: false,
        };

        assert!(ConversionRequest::new(None, &on, &enabled).is_kana_modifier_insensitive_conversion());
        assert!(!ConversionRequest::new(None, &on, &disabled).is_kana_modifier_insensitive_conversion());
        assert!(!ConversionRequest::new(None, &off, &enabled).is_kana_modifier_insensitive_conversion());
    }

    #[test]
    fn composer_key_follows_selection() {
        let preedit = Preedit::new("わたしh");
        let mut request = ConversionRequest::default();
        request.set_composer(Some(&preedit));
        assert_eq!(request.composer_key().as_deref(), Some("わたしh"));
        request.set_composer_key_selection(ComposerKeySelection::PredictionKey);
        assert_eq!(request.composer_key().as_deref(), Some("わたし"));
    }

    #[test]
    fn copy_from_shares_referents() {
        let preedit = Preedit::new("かな");
        let client = Request {
            mixed_conversion: true,
            ..Request::default()
        };
        let mut source = ConversionRequest::default();
        source.set_composer(Some(&preedit));
        source.set_request(&client);
        source.set_skip_slow_rewriters(true);
        source.set_create_partial_candidates(true);
        source.set_composer_key_selection(ComposerKeySelection::PredictionKey);

        let mut copy = ConversionRequest::default();
        copy.copy_from(&source);
        assert!(copy.has_composer());
        assert!(std::ptr::eq(copy.request(), &client));
        assert!(copy.skip_slow_rewriters());
        assert!(copy.create_partial_candidates());
        assert_eq!(copy.composer_key_selection(), ComposerKeySelection::PredictionKey);
        assert_eq!(copy.composer_key().as_deref(), Some("かな"));
    }

    #[test]
    fn debug_omits_composer_contents() {
        let preedit = Preedit::new("ひみつ");
        let mut request = ConversionRequest::default();
        request.set_composer(Some(&preedit));
        let text = format!("{request:?}");
        assert!(text.contains("has_composer: true"));
        assert!(!text.contains("ひみつ"));
    }
}
