//! Multi-segment conversion state.
//!
//! A `Segments` value is a run of history segments (`HISTORY` or
//! `SUBMITTED`, committed earlier and kept as context) followed by the
//! conversion segments currently being edited. Segment indices taken by the
//! transition methods are relative to the first conversion segment.
//!
//! Every transition validates its arguments before touching any state:
//! on `Err` the instance is unchanged.

mod candidate;
mod segment;
#[cfg(test)]
mod tests;

pub use candidate::{Candidate, CandidateAttributes};
pub use segment::{Segment, SegmentType};

use std::fmt;

use kana_core::settings::{SegmentsSettings, MAX_HISTORY_SEGMENTS_LIMIT};
use kana_core::unicode::{full_width_ascii_to_half_width, is_alphabet, is_number};
use tracing::{debug, debug_span, warn};

/// Upper bound on the size array accepted by `resize_segments`.
pub const MAX_RESIZE_ARRAY_SIZE: usize = 256;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum RequestType {
    #[default]
    Conversion,
    Prediction,
    Suggestion,
    PartialPrediction,
    PartialSuggestion,
    ReverseConversion,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RevertEntryType {
    #[default]
    CreateEntry,
}

/// Something a learner recorded during this conversion, undone by
/// `revert_conversion`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RevertEntry {
    pub revert_entry_type: RevertEntryType,
    pub id: u16,
    pub timestamp: u32,
    pub key: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SegmentsError {
    #[error("conversion segment {0} does not exist")]
    SegmentOutOfRange(usize),

    #[error("candidate {index} does not exist in conversion segment {segment}")]
    CandidateOutOfRange { segment: usize, index: isize },

    #[error("invalid resize: {0}")]
    InvalidResize(&'static str),

    #[error("operation needs a {expected:?} request, segments hold {actual:?}")]
    InvalidRequestType {
        expected: RequestType,
        actual: RequestType,
    },

    #[error("partial key {current:?} (+ {new:?}) does not split segment key {key:?}")]
    InvalidPartialKey {
        key: String,
        current: String,
        new: String,
    },

    #[error("conversion key is empty")]
    EmptyKey,

    #[error("conversion request has no composer")]
    MissingComposer,

    #[error("no number or alphabet token at the end of the preceding text")]
    NoHistoryToken,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segments {
    segments: Vec<Segment>,
    request_type: RequestType,
    max_history_segments_size: usize,
    max_prediction_candidates_size: usize,
    max_conversion_candidates_size: usize,
    resized: bool,
    user_history_enabled: bool,
    revert_entries: Vec<RevertEntry>,
}

impl Default for Segments {
    fn default() -> Self {
        Self::with_settings(&SegmentsSettings::default())
    }
}

fn is_history_type(t: SegmentType) -> bool {
    matches!(t, SegmentType::History | SegmentType::Submitted)
}

/// Byte offset of the `n`-th character (or `s.len()`).
fn char_offset(s: &str, n: usize) -> usize {
    s.char_indices().nth(n).map_or(s.len(), |(i, _)| i)
}

impl Segments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(settings: &SegmentsSettings) -> Self {
        Self {
            segments: Vec::new(),
            request_type: RequestType::Conversion,
            max_history_segments_size: settings
                .max_history_segments
                .min(MAX_HISTORY_SEGMENTS_LIMIT),
            max_prediction_candidates_size: settings.max_prediction_candidates,
            max_conversion_candidates_size: settings.max_conversion_candidates,
            resized: false,
            user_history_enabled: true,
            revert_entries: Vec::new(),
        }
    }

    // ---------------------------------------------------------------
    // Accessors
    // ---------------------------------------------------------------

    pub fn request_type(&self) -> RequestType {
        self.request_type
    }

    pub fn set_request_type(&mut self, request_type: RequestType) {
        self.request_type = request_type;
    }

    pub fn user_history_enabled(&self) -> bool {
        self.user_history_enabled
    }

    pub fn set_user_history_enabled(&mut self, enabled: bool) {
        self.user_history_enabled = enabled;
    }

    pub fn segments_size(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Leading segments that are `HISTORY` or `SUBMITTED`.
    pub fn history_segments_size(&self) -> usize {
        self.segments
            .iter()
            .take_while(|s| is_history_type(s.segment_type()))
            .count()
    }

    pub fn conversion_segments_size(&self) -> usize {
        self.segments.len() - self.history_segments_size()
    }

    pub fn segment(&self, i: usize) -> Option<&Segment> {
        self.segments.get(i)
    }

    pub fn segment_mut(&mut self, i: usize) -> Option<&mut Segment> {
        self.segments.get_mut(i)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Segment> {
        self.segments.iter()
    }

    pub fn history_segments(&self) -> &[Segment] {
        &self.segments[..self.history_segments_size()]
    }

    pub fn conversion_segments(&self) -> &[Segment] {
        &self.segments[self.history_segments_size()..]
    }

    pub fn conversion_segments_mut(&mut self) -> &mut [Segment] {
        let start = self.history_segments_size();
        &mut self.segments[start..]
    }

    pub fn history_segment(&self, i: usize) -> Option<&Segment> {
        self.history_segments().get(i)
    }

    pub fn conversion_segment(&self, i: usize) -> Option<&Segment> {
        self.conversion_segments().get(i)
    }

    pub fn conversion_segment_mut(&mut self, i: usize) -> Option<&mut Segment> {
        self.conversion_segments_mut().get_mut(i)
    }

    /// Concatenated keys of the conversion segments.
    pub fn conversion_key(&self) -> String {
        self.conversion_segments().iter().map(Segment::key).collect()
    }

    pub fn push_back_segment(&mut self, segment: Segment) {
        self.segments.push(segment);
    }

    pub fn push_front_segment(&mut self, segment: Segment) {
        self.segments.insert(0, segment);
    }

    /// Insert at absolute position `i`; `false` if `i > segments_size()`.
    pub fn insert_segment(&mut self, i: usize, segment: Segment) -> bool {
        if i > self.segments.len() {
            return false;
        }
        self.segments.insert(i, segment);
        true
    }

    pub fn erase_segment(&mut self, i: usize) -> Option<Segment> {
        (i < self.segments.len()).then(|| self.segments.remove(i))
    }

    /// Remove `size` segments from absolute position `i`; no-op if the
    /// range is invalid.
    pub fn erase_segments(&mut self, i: usize, size: usize) {
        match i.checked_add(size) {
            Some(end) if i < self.segments.len() && end <= self.segments.len() => {
                self.segments.drain(i..end);
            }
            _ => {}
        }
    }

    pub fn pop_front_segment(&mut self) -> Option<Segment> {
        (!self.segments.is_empty()).then(|| self.segments.remove(0))
    }

    pub fn pop_back_segment(&mut self) -> Option<Segment> {
        self.segments.pop()
    }

    /// Drop every segment and revert entry.
    pub fn clear(&mut self) {
        self.clear_segments();
        self.revert_entries.clear();
    }

    pub fn clear_segments(&mut self) {
        self.segments.clear();
        self.resized = false;
    }

    pub fn clear_history_segments(&mut self) {
        let size = self.history_segments_size();
        self.segments.drain(..size);
    }

    pub fn clear_conversion_segments(&mut self) {
        let size = self.history_segments_size();
        self.segments.truncate(size);
        self.resized = false;
    }

    /// Detach the conversion segments, leaving history in place.
    pub(crate) fn take_conversion_segments(&mut self) -> Vec<Segment> {
        let start = self.history_segments_size();
        self.segments.split_off(start)
    }

    pub fn max_history_segments_size(&self) -> usize {
        self.max_history_segments_size
    }

    /// Clamped to `MAX_HISTORY_SEGMENTS_LIMIT`.
    pub fn set_max_history_segments_size(&mut self, size: usize) {
        self.max_history_segments_size = size.min(MAX_HISTORY_SEGMENTS_LIMIT);
    }

    pub fn max_prediction_candidates_size(&self) -> usize {
        self.max_prediction_candidates_size
    }

    pub fn set_max_prediction_candidates_size(&mut self, size: usize) {
        self.max_prediction_candidates_size = size;
    }

    pub fn max_conversion_candidates_size(&self) -> usize {
        self.max_conversion_candidates_size
    }

    pub fn set_max_conversion_candidates_size(&mut self, size: usize) {
        self.max_conversion_candidates_size = size;
    }

    pub fn resized(&self) -> bool {
        self.resized
    }

    pub fn set_resized(&mut self, resized: bool) {
        self.resized = resized;
    }

    pub fn revert_entries(&self) -> &[RevertEntry] {
        &self.revert_entries
    }

    pub fn push_back_revert_entry(&mut self, entry: RevertEntry) {
        self.revert_entries.push(entry);
    }

    pub fn clear_revert_entries(&mut self) {
        self.revert_entries.clear();
    }

    // ---------------------------------------------------------------
    // Transitions
    // ---------------------------------------------------------------

    /// Replace the conversion segments with one FREE segment for `key`.
    pub fn set_key(&mut self, key: &str) {
        self.clear_conversion_segments();
        self.segments.push(Segment::new(key, SegmentType::Free));
    }

    /// Seed a single FIXED_VALUE segment holding `value` for `key`,
    /// without running a converter.
    pub fn initialize_from_key_value(&mut self, key: &str, value: &str) {
        self.clear_conversion_segments();
        self.request_type = RequestType::Conversion;
        let mut segment = Segment::new(key, SegmentType::FixedValue);
        segment.push_back_candidate(Candidate::new(key, value));
        self.segments.push(segment);
    }

    /// Make `candidate_index` the committed value of a conversion segment.
    pub fn commit_segment_value(
        &mut self,
        segment_index: usize,
        candidate_index: isize,
    ) -> Result<(), SegmentsError> {
        let index = self.conversion_index(segment_index)?;
        self.commit_at(index, candidate_index, SegmentType::FixedValue)
    }

    /// Submit the leading part of a segment: the segment keeps
    /// `current_key` with the chosen candidate, and a FREE segment holding
    /// `new_key` is inserted after it.
    ///
    /// `current_key` must be a proper prefix of the segment key. `new_key`
    /// is the rest of the preedit, which may differ from the rest of the
    /// segment key when the prediction query dropped pending romaji.
    pub fn commit_partial_suggestion_segment_value(
        &mut self,
        segment_index: usize,
        candidate_index: isize,
        current_key: &str,
        new_key: &str,
    ) -> Result<(), SegmentsError> {
        let index = self.conversion_index(segment_index)?;
        let segment = &self.segments[index];
        if !segment.is_valid_candidate_index(candidate_index) {
            return Err(SegmentsError::CandidateOutOfRange {
                segment: segment_index,
                index: candidate_index,
            });
        }
        let splits_key = segment
            .key()
            .strip_prefix(current_key)
            .is_some_and(|rest| !rest.is_empty());
        if current_key.is_empty() || new_key.is_empty() || !splits_key {
            return Err(SegmentsError::InvalidPartialKey {
                key: segment.key().to_string(),
                current: current_key.to_string(),
                new: new_key.to_string(),
            });
        }

        self.commit_at(index, candidate_index, SegmentType::Submitted)?;
        let segment = &mut self.segments[index];
        let segment_chars = segment.key_len();
        if let Some(top) = segment.candidate_mut(0) {
            if top.key.chars().count() != segment_chars {
                top.attributes |= CandidateAttributes::AUTO_PARTIAL_SUGGESTION;
            }
        }
        segment.set_key(current_key);
        self.segments
            .insert(index + 1, Segment::new(new_key, SegmentType::Free));
        debug!(index, current_key, new_key, "partial suggestion committed");
        Ok(())
    }

    /// Submit the leading conversion segments in turn, one candidate
    /// index per segment.
    pub fn commit_segments(&mut self, candidate_indices: &[isize]) -> Result<(), SegmentsError> {
        // Dry run: submitting a segment extends the history run past it.
        let mut index = self.history_segments_size();
        for (n, &candidate_index) in candidate_indices.iter().enumerate() {
            let segment = self
                .segments
                .get(index)
                .ok_or(SegmentsError::SegmentOutOfRange(n))?;
            if !segment.is_valid_candidate_index(candidate_index) {
                return Err(SegmentsError::CandidateOutOfRange {
                    segment: n,
                    index: candidate_index,
                });
            }
            index += 1;
            while self
                .segments
                .get(index)
                .is_some_and(|s| is_history_type(s.segment_type()))
            {
                index += 1;
            }
        }

        for &candidate_index in candidate_indices {
            let index = self.conversion_index(0)?;
            self.commit_at(index, candidate_index, SegmentType::Submitted)?;
        }
        Ok(())
    }

    /// Bring a candidate to rank 0 without committing it. Other candidates
    /// keep their relative order.
    pub fn focus_segment_value(
        &mut self,
        segment_index: usize,
        candidate_index: isize,
    ) -> Result<(), SegmentsError> {
        let index = self.conversion_index(segment_index)?;
        let segment = &mut self.segments[index];
        if !segment.move_candidate(candidate_index, 0) {
            return Err(SegmentsError::CandidateOutOfRange {
                segment: segment_index,
                index: candidate_index,
            });
        }
        Ok(())
    }

    /// Release a segment's boundary and value back to FREE. Candidates are
    /// left for the converter to re-derive.
    pub fn free_segment_value(&mut self, segment_index: usize) -> Result<(), SegmentsError> {
        self.require_request_type(RequestType::Conversion)?;
        let index = self.conversion_index(segment_index)?;
        self.segments[index].set_segment_type(SegmentType::Free);
        Ok(())
    }

    /// Move the boundary after a conversion segment by `offset` characters.
    ///
    /// Growing takes characters from the following segments; shrinking
    /// hands the tail to the next segment (or a new one). The resized
    /// segment becomes FIXED_BOUNDARY, the one receiving the remainder
    /// becomes FREE, and both lose their candidates.
    pub fn resize_segment(&mut self, segment_index: usize, offset: isize) -> Result<(), SegmentsError> {
        let _span = debug_span!("resize_segment", segment_index, offset).entered();
        self.require_request_type(RequestType::Conversion)?;
        if offset == 0 {
            return Err(SegmentsError::InvalidResize("offset is zero"));
        }
        let index = self.conversion_index(segment_index)?;
        let is_last = index + 1 == self.segments.len();
        if offset > 0 && is_last {
            return Err(SegmentsError::InvalidResize("the last segment cannot grow"));
        }

        let cur_len = self.segments[index].key_len();
        let new_len = cur_len
            .checked_add_signed(offset)
            .filter(|&len| len > 0)
            .ok_or(SegmentsError::InvalidResize("segment would become empty"))?;

        if offset > 0 {
            let following: usize = self.segments[index + 1..].iter().map(Segment::key_len).sum();
            if offset as usize > following {
                return Err(SegmentsError::InvalidResize(
                    "segment would extend past the end of the key",
                ));
            }

            let mut new_key = self.segments[index].key().to_string();
            let mut remainder = None;
            let mut wanted = offset as usize;
            while wanted > 0 {
                let next = self.segments.remove(index + 1);
                let next_len = next.key_len();
                if next_len <= wanted {
                    new_key.push_str(next.key());
                    wanted -= next_len;
                } else {
                    let split = char_offset(next.key(), wanted);
                    new_key.push_str(&next.key()[..split]);
                    remainder = Some(next.key()[split..].to_string());
                    wanted = 0;
                }
            }

            let segment = &mut self.segments[index];
            segment.clear();
            segment.set_segment_type(SegmentType::FixedBoundary);
            segment.set_key(new_key);
            if let Some(rest) = remainder {
                self.segments
                    .insert(index + 1, Segment::new(rest, SegmentType::Free));
            }
        } else {
            let cur_key = self.segments[index].key().to_string();
            let split = char_offset(&cur_key, new_len);
            let (head, tail) = cur_key.split_at(split);

            let segment = &mut self.segments[index];
            segment.clear();
            segment.set_segment_type(SegmentType::FixedBoundary);
            segment.set_key(head);

            match self.segments.get_mut(index + 1) {
                Some(next) => {
                    let merged = format!("{tail}{}", next.key());
                    next.clear();
                    next.set_key(merged);
                }
                None => self.segments.push(Segment::new(tail, SegmentType::Free)),
            }
        }

        self.resized = true;
        debug!(segments = self.segments.len(), "resized");
        Ok(())
    }

    /// Re-split `segments_size` conversion segments starting at
    /// `start_segment_index` into pieces of `new_sizes` characters. Zero
    /// sizes are skipped; characters left over form a final piece. Every
    /// new segment is FIXED_BOUNDARY.
    pub fn resize_segments(
        &mut self,
        start_segment_index: usize,
        segments_size: usize,
        new_sizes: &[u8],
    ) -> Result<(), SegmentsError> {
        self.require_request_type(RequestType::Conversion)?;
        let start = self.conversion_index(start_segment_index)?;
        let end = start
            .checked_add(segments_size)
            .filter(|&end| end > start && end <= self.segments.len())
            .ok_or(SegmentsError::InvalidResize("segment range is out of bounds"))?;
        if new_sizes.len() > MAX_RESIZE_ARRAY_SIZE {
            return Err(SegmentsError::InvalidResize("too many sizes"));
        }

        let key: String = self.segments[start..end].iter().map(Segment::key).collect();
        if key.is_empty() {
            return Err(SegmentsError::InvalidResize("segments have an empty key"));
        }

        let chars: Vec<char> = key.chars().collect();
        let mut consumed = 0;
        let mut new_keys: Vec<String> = Vec::with_capacity(new_sizes.len() + 1);
        for &size in new_sizes {
            if size != 0 && consumed < chars.len() {
                let piece_end = (consumed + size as usize).min(chars.len());
                new_keys.push(chars[consumed..piece_end].iter().collect());
                consumed = piece_end;
            }
        }
        if consumed < chars.len() {
            new_keys.push(chars[consumed..].iter().collect());
        }

        self.segments.splice(
            start..end,
            new_keys
                .into_iter()
                .map(|k| Segment::new(k, SegmentType::FixedBoundary)),
        );
        self.resized = true;
        Ok(())
    }

    /// Drop the conversion segments, keeping history.
    pub fn cancel_conversion(&mut self) {
        self.clear_conversion_segments();
    }

    /// Drop the conversion segments and revert entries. History is kept.
    pub fn reset_conversion(&mut self) {
        self.clear_conversion_segments();
        self.revert_entries.clear();
    }

    /// Undo the current conversion: revert entries and conversion segments
    /// are dropped, history is kept.
    pub fn revert_conversion(&mut self) {
        if !self.revert_entries.is_empty() {
            debug!(entries = self.revert_entries.len(), "reverting");
        }
        self.revert_entries.clear();
        self.clear_conversion_segments();
    }

    /// Turn the finished conversion into history: SUBMITTED segments become
    /// FIXED_VALUE, only the last `max_history_segments_size` segments are
    /// kept, and all of them become HISTORY.
    pub fn finish_conversion(&mut self) {
        for segment in &mut self.segments {
            if segment.segment_type() == SegmentType::Submitted {
                segment.set_segment_type(SegmentType::FixedValue);
            }
        }
        self.revert_entries.clear();

        let excess = self
            .segments
            .len()
            .saturating_sub(self.max_history_segments_size);
        self.segments.drain(..excess);
        for segment in &mut self.segments {
            segment.set_segment_type(SegmentType::History);
        }
        self.resized = false;
    }

    /// Rebuild a one-segment history from text typed before the cursor.
    /// Only a trailing number or alphabet token is used; one trailing space
    /// is allowed.
    pub fn reconstruct_history(&mut self, preceding_text: &str) -> Result<(), SegmentsError> {
        let Some(token) = last_history_token(preceding_text) else {
            warn!("no history token in preceding text");
            return Err(SegmentsError::NoHistoryToken);
        };

        self.clear();
        let key = full_width_ascii_to_half_width(token);
        let mut candidate = Candidate::new(key.as_str(), token);
        candidate.attributes = CandidateAttributes::NO_LEARNING;
        let mut segment = Segment::new(key.as_str(), SegmentType::History);
        segment.push_back_candidate(candidate);
        self.segments.push(segment);
        Ok(())
    }

    // ---------------------------------------------------------------
    // Helpers
    // ---------------------------------------------------------------

    /// Absolute position of conversion segment `segment_index`.
    fn conversion_index(&self, segment_index: usize) -> Result<usize, SegmentsError> {
        let index = self.history_segments_size() + segment_index;
        if index >= self.segments.len() {
            debug!(segment_index, "segment index out of range");
            return Err(SegmentsError::SegmentOutOfRange(segment_index));
        }
        Ok(index)
    }

    fn require_request_type(&self, expected: RequestType) -> Result<(), SegmentsError> {
        if self.request_type != expected {
            return Err(SegmentsError::InvalidRequestType {
                expected,
                actual: self.request_type,
            });
        }
        Ok(())
    }

    fn commit_at(
        &mut self,
        index: usize,
        candidate_index: isize,
        segment_type: SegmentType,
    ) -> Result<(), SegmentsError> {
        let relative = index - self.history_segments_size().min(index);
        let segment = &mut self.segments[index];
        if !segment.is_valid_candidate_index(candidate_index) {
            return Err(SegmentsError::CandidateOutOfRange {
                segment: relative,
                index: candidate_index,
            });
        }
        segment.set_segment_type(segment_type);
        segment.move_candidate(candidate_index, 0);
        if candidate_index != 0 {
            if let Some(top) = segment.candidate_mut(0) {
                top.attributes |= CandidateAttributes::RERANKED;
            }
        }
        Ok(())
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum TokenScript {
    Number,
    Alphabet,
    Other,
}

fn script_of(c: char) -> TokenScript {
    if is_number(c) {
        TokenScript::Number
    } else if is_alphabet(c) {
        TokenScript::Alphabet
    } else {
        TokenScript::Other
    }
}

/// Trailing run of same-script characters, if it is a number or alphabet
/// token.
fn last_history_token(text: &str) -> Option<&str> {
    let text = text.strip_suffix(' ').unwrap_or(text);
    let last = text.chars().next_back()?;
    let script = script_of(last);
    if script == TokenScript::Other {
        return None;
    }
    let start = text
        .char_indices()
        .rev()
        .take_while(|&(_, c)| script_of(c) == script)
        .last()
        .map_or(text.len(), |(i, _)| i);
    Some(&text[start..])
}

impl fmt::Display for Segments {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{{")?;
        for (i, segment) in self.segments.iter().enumerate() {
            writeln!(f, "  seg {i} {segment}")?;
        }
        f.write_str("}")
    }
}
