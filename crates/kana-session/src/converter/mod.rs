//! Fills `Segments` with candidates from a `Dictionary`.
//!
//! Conversion splits runs of FREE segments by greedy longest dictionary
//! prefix; segments whose boundary the user fixed keep it and only get new
//! candidates, and FIXED_VALUE/SUBMITTED segments are left alone. Each
//! rebuilt segment then passes through the rewriters and is cut to the
//! candidate limit.

mod rewriter;

pub use rewriter::{HiraganaRewriter, KatakanaRewriter, Rewriter};

use kana_core::dict::{DictEntry, Dictionary};
use kana_core::unicode::{hiragana_to_katakana, katakana_to_hiragana};
use tracing::{debug, debug_span};

use crate::conversion_request::ConversionRequest;
use crate::segments::{
    Candidate, CandidateAttributes, RequestType, Segment, SegmentType, Segments, SegmentsError,
};

use rewriter::run_rewriters;

/// Added to candidates found only through a voiced/semi-voiced/small kana
/// variant of the key.
pub const KANA_MODIFIER_PENALTY: i32 = 1500;

/// Readings scanned by prediction before ranking.
const PREDICTION_SCAN_LIMIT: usize = 1000;

pub struct Converter<'d> {
    dictionary: &'d dyn Dictionary,
    rewriters: Vec<Box<dyn Rewriter>>,
}

impl std::fmt::Debug for Converter<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Converter")
            .field("rewriters", &self.rewriters.len())
            .finish()
    }
}

impl<'d> Converter<'d> {
    /// Converter with the hiragana and katakana rewriters.
    pub fn new(dictionary: &'d dyn Dictionary) -> Self {
        Self::with_rewriters(
            dictionary,
            vec![Box::new(HiraganaRewriter), Box::new(KatakanaRewriter)],
        )
    }

    pub fn with_rewriters(dictionary: &'d dyn Dictionary, rewriters: Vec<Box<dyn Rewriter>>) -> Self {
        Self {
            dictionary,
            rewriters,
        }
    }

    pub fn add_rewriter(&mut self, rewriter: Box<dyn Rewriter>) {
        self.rewriters.push(rewriter);
    }

    pub fn dictionary(&self) -> &'d dyn Dictionary {
        self.dictionary
    }

    /// Replace the conversion segments with a fresh conversion of `key`.
    pub fn start_conversion(
        &self,
        request: &ConversionRequest<'_>,
        segments: &mut Segments,
        key: &str,
    ) -> Result<(), SegmentsError> {
        if key.is_empty() {
            return Err(SegmentsError::EmptyKey);
        }
        let _span = debug_span!("start_conversion", key).entered();
        segments.set_key(key);
        segments.set_request_type(RequestType::Conversion);
        self.convert(request, segments);
        Ok(())
    }

    /// `start_conversion` with the key taken from the request's composer.
    pub fn start_conversion_for_request(
        &self,
        request: &ConversionRequest<'_>,
        segments: &mut Segments,
    ) -> Result<(), SegmentsError> {
        let key = request.composer_key().ok_or(SegmentsError::MissingComposer)?;
        self.start_conversion(request, segments, &key)
    }

    pub fn start_prediction(
        &self,
        request: &ConversionRequest<'_>,
        segments: &mut Segments,
        key: &str,
    ) -> Result<(), SegmentsError> {
        self.predict(request, segments, key, RequestType::Prediction)
    }

    pub fn start_suggestion(
        &self,
        request: &ConversionRequest<'_>,
        segments: &mut Segments,
        key: &str,
    ) -> Result<(), SegmentsError> {
        self.predict(request, segments, key, RequestType::Suggestion)
    }

    pub fn commit_segment_value(
        &self,
        segments: &mut Segments,
        segment_index: usize,
        candidate_index: isize,
    ) -> Result<(), SegmentsError> {
        segments.commit_segment_value(segment_index, candidate_index)?;
        debug!(segment_index, candidate_index, "committed");
        Ok(())
    }

    /// Resize a segment and convert the affected segments again.
    pub fn resize_segment(
        &self,
        request: &ConversionRequest<'_>,
        segments: &mut Segments,
        segment_index: usize,
        offset: isize,
    ) -> Result<(), SegmentsError> {
        segments.resize_segment(segment_index, offset)?;
        self.convert(request, segments);
        Ok(())
    }

    pub fn resize_segments(
        &self,
        request: &ConversionRequest<'_>,
        segments: &mut Segments,
        start_segment_index: usize,
        segments_size: usize,
        new_sizes: &[u8],
    ) -> Result<(), SegmentsError> {
        segments.resize_segments(start_segment_index, segments_size, new_sizes)?;
        self.convert(request, segments);
        Ok(())
    }

    /// Release a segment to FREE and let it merge with its FREE neighbours.
    pub fn free_segment_value(
        &self,
        request: &ConversionRequest<'_>,
        segments: &mut Segments,
        segment_index: usize,
    ) -> Result<(), SegmentsError> {
        segments.free_segment_value(segment_index)?;
        self.convert(request, segments);
        Ok(())
    }

    pub fn finish_conversion(&self, segments: &mut Segments) {
        segments.finish_conversion();
        debug!(history = segments.history_segments_size(), "conversion finished");
    }

    fn predict(
        &self,
        request: &ConversionRequest<'_>,
        segments: &mut Segments,
        key: &str,
        request_type: RequestType,
    ) -> Result<(), SegmentsError> {
        if key.is_empty() {
            return Err(SegmentsError::EmptyKey);
        }
        let _span = debug_span!("start_prediction", key, ?request_type).entered();
        segments.set_key(key);
        segments.set_request_type(request_type);

        let max = segments.max_prediction_candidates_size();
        let ranked = self
            .dictionary
            .predict_ranked(key, max, PREDICTION_SCAN_LIMIT);
        debug!(results = ranked.len());

        if let Some(segment) = segments.conversion_segment_mut(0) {
            for (reading, entry) in ranked {
                segment.push_back_candidate(candidate_from_entry(&reading, &entry, 0));
            }
            if segment.candidates_size() == 0 {
                segment.push_back_candidate(Candidate::new(key, key));
            }
            run_rewriters(&self.rewriters, request, segment);
            segment.truncate_candidates(max);
        }
        Ok(())
    }

    fn convert(&self, request: &ConversionRequest<'_>, segments: &mut Segments) {
        let old = segments.take_conversion_segments();
        let mut rebuilt: Vec<Segment> = Vec::with_capacity(old.len());
        let mut free_key = String::new();

        for mut segment in old {
            if segment.segment_type() == SegmentType::Free {
                free_key.push_str(segment.key());
                continue;
            }
            self.flush_free_key(request, &mut free_key, &mut rebuilt);
            if segment.segment_type() == SegmentType::FixedBoundary {
                self.fill_candidates(request, &mut segment);
            }
            rebuilt.push(segment);
        }
        self.flush_free_key(request, &mut free_key, &mut rebuilt);

        let max = segments.max_conversion_candidates_size();
        for mut segment in rebuilt {
            if matches!(
                segment.segment_type(),
                SegmentType::Free | SegmentType::FixedBoundary
            ) {
                run_rewriters(&self.rewriters, request, &mut segment);
                segment.truncate_candidates(max);
            }
            segments.push_back_segment(segment);
        }
        debug!(segments = segments.conversion_segments_size(), "converted");
    }

    fn flush_free_key(
        &self,
        request: &ConversionRequest<'_>,
        free_key: &mut String,
        out: &mut Vec<Segment>,
    ) {
        if free_key.is_empty() {
            return;
        }
        let key = std::mem::take(free_key);
        for piece in self.split_key(request, &key) {
            let mut segment = Segment::new(piece, SegmentType::Free);
            self.fill_candidates(request, &mut segment);
            out.push(segment);
        }
    }

    /// Greedy longest-prefix split. Characters that start no dictionary
    /// reading are gathered into one piece.
    fn split_key<'k>(&self, request: &ConversionRequest<'_>, key: &'k str) -> Vec<&'k str> {
        let insensitive = request.is_kana_modifier_insensitive_conversion();
        let mut pieces = Vec::new();
        let mut unknown_start: Option<usize> = None;
        let mut pos = 0;

        while pos < key.len() {
            let rest = &key[pos..];
            let matches = if insensitive {
                self.dictionary.common_prefix_search_kana_insensitive(rest)
            } else {
                self.dictionary.common_prefix_search(rest)
            };
            let longest = matches
                .iter()
                .map(|m| m.reading.len())
                .filter(|&len| len > 0 && rest.is_char_boundary(len))
                .max();

            match longest {
                Some(len) => {
                    if let Some(start) = unknown_start.take() {
                        pieces.push(&key[start..pos]);
                    }
                    pieces.push(&rest[..len]);
                    pos += len;
                }
                None => {
                    unknown_start.get_or_insert(pos);
                    pos += rest.chars().next().map_or(1, char::len_utf8);
                }
            }
        }
        if let Some(start) = unknown_start {
            pieces.push(&key[start..]);
        }
        pieces
    }

    /// Candidates from dictionary entries for the exact key, cheapest
    /// first, plus entries reached through kana-modifier variants when the
    /// request allows it. Meta candidates hold the hiragana and katakana
    /// forms.
    fn fill_candidates(&self, request: &ConversionRequest<'_>, segment: &mut Segment) {
        let key = segment.key().to_string();
        segment.clear_candidates();
        segment.clear_meta_candidates();

        let mut candidates: Vec<Candidate> = self
            .dictionary
            .lookup(&key)
            .iter()
            .map(|e| candidate_from_entry(&key, e, 0))
            .collect();

        if request.is_kana_modifier_insensitive_conversion() {
            for hit in self.dictionary.common_prefix_search_kana_insensitive(&key) {
                if hit.reading.len() != key.len() || hit.reading == key {
                    continue;
                }
                for entry in &hit.entries {
                    let mut c = candidate_from_entry(&key, entry, KANA_MODIFIER_PENALTY);
                    c.attributes |= CandidateAttributes::KANA_MODIFIER_EXPANDED;
                    candidates.push(c);
                }
            }
        }

        candidates.sort_by_key(|c| c.cost);
        let mut seen = std::collections::HashSet::new();
        candidates.retain(|c| seen.insert(c.value.clone()));
        if candidates.is_empty() {
            candidates.push(Candidate::new(key.as_str(), key.as_str()));
        }
        for c in candidates {
            segment.push_back_candidate(c);
        }

        segment.push_meta_candidate(Candidate::new(key.as_str(), katakana_to_hiragana(&key)));
        segment.push_meta_candidate(Candidate::new(key.as_str(), hiragana_to_katakana(&key)));
    }
}

fn candidate_from_entry(key: &str, entry: &DictEntry, penalty: i32) -> Candidate {
    let mut c = Candidate::new(key, entry.surface.as_str()).with_cost(i32::from(entry.cost));
    c.cost = c.cost.saturating_add(penalty);
    c.lid = entry.left_id;
    c.rid = entry.right_id;
    c
}
