use std::fmt;

use super::Candidate;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SegmentType {
    /// Boundary and value are both up to the converter.
    #[default]
    Free,
    /// Boundary set by the user; candidates still converted.
    FixedBoundary,
    /// Value chosen by the user.
    FixedValue,
    /// Committed ahead of the rest of the conversion.
    Submitted,
    /// Committed earlier; kept only as context.
    History,
}

/// A span of the input key with its ranked candidates.
///
/// Candidate index 0 is the best. Negative indices address meta
/// candidates (transliterations): `-1` is the first, `-2` the second.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Segment {
    key: String,
    segment_type: SegmentType,
    candidates: Vec<Candidate>,
    meta_candidates: Vec<Candidate>,
}

/// Position of meta candidate `-i-1`, or `None` for a regular index.
fn meta_index(i: isize) -> Option<usize> {
    (i < 0).then(|| (-(i + 1)) as usize)
}

impl Segment {
    pub fn new(key: impl Into<String>, segment_type: SegmentType) -> Self {
        Self {
            key: key.into(),
            segment_type,
            ..Self::default()
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn set_key(&mut self, key: impl Into<String>) {
        self.key = key.into();
    }

    /// Key length in characters.
    pub fn key_len(&self) -> usize {
        self.key.chars().count()
    }

    pub fn segment_type(&self) -> SegmentType {
        self.segment_type
    }

    pub fn set_segment_type(&mut self, segment_type: SegmentType) {
        self.segment_type = segment_type;
    }

    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    pub fn candidates_size(&self) -> usize {
        self.candidates.len()
    }

    /// Regular candidate for `i >= 0`, meta candidate for `i < 0`.
    pub fn candidate(&self, i: isize) -> Option<&Candidate> {
        match meta_index(i) {
            Some(m) => self.meta_candidates.get(m),
            None => self.candidates.get(i as usize),
        }
    }

    pub fn candidate_mut(&mut self, i: isize) -> Option<&mut Candidate> {
        match meta_index(i) {
            Some(m) => self.meta_candidates.get_mut(m),
            None => self.candidates.get_mut(i as usize),
        }
    }

    /// Whether `i` addresses an existing regular or meta candidate.
    pub fn is_valid_candidate_index(&self, i: isize) -> bool {
        self.candidate(i).is_some()
    }

    /// Index of the first candidate with `value`, regular candidates first.
    pub fn index_of(&self, value: &str) -> Option<isize> {
        if let Some(i) = self.candidates.iter().position(|c| c.value == value) {
            return Some(i as isize);
        }
        self.meta_candidates
            .iter()
            .position(|c| c.value == value)
            .map(|m| -(m as isize) - 1)
    }

    pub fn push_back_candidate(&mut self, candidate: Candidate) {
        self.candidates.push(candidate);
    }

    pub fn push_front_candidate(&mut self, candidate: Candidate) {
        self.candidates.insert(0, candidate);
    }

    /// Insert at `i`; `false` (and no change) if `i > candidates_size()`.
    pub fn insert_candidate(&mut self, i: usize, candidate: Candidate) -> bool {
        if i > self.candidates.len() {
            return false;
        }
        self.candidates.insert(i, candidate);
        true
    }

    pub fn pop_front_candidate(&mut self) -> Option<Candidate> {
        (!self.candidates.is_empty()).then(|| self.candidates.remove(0))
    }

    pub fn pop_back_candidate(&mut self) -> Option<Candidate> {
        self.candidates.pop()
    }

    pub fn erase_candidate(&mut self, i: usize) -> Option<Candidate> {
        (i < self.candidates.len()).then(|| self.candidates.remove(i))
    }

    /// Remove `size` candidates from `i`; no-op if the range is invalid.
    pub fn erase_candidates(&mut self, i: usize, size: usize) {
        match i.checked_add(size) {
            Some(end) if i < self.candidates.len() && end <= self.candidates.len() => {
                self.candidates.drain(i..end);
            }
            _ => {}
        }
    }

    pub fn truncate_candidates(&mut self, len: usize) {
        self.candidates.truncate(len);
    }

    pub fn clear_candidates(&mut self) {
        self.candidates.clear();
    }

    pub fn meta_candidates(&self) -> &[Candidate] {
        &self.meta_candidates
    }

    pub fn meta_candidates_size(&self) -> usize {
        self.meta_candidates.len()
    }

    pub fn push_meta_candidate(&mut self, candidate: Candidate) {
        self.meta_candidates.push(candidate);
    }

    pub fn clear_meta_candidates(&mut self) {
        self.meta_candidates.clear();
    }

    /// Move candidate `old_idx` to `new_idx`, shifting the ones in between
    /// and keeping every other candidate in order. A meta candidate
    /// (`old_idx < 0`) is copied into the regular list at `new_idx`.
    ///
    /// Returns `false` without change for out-of-range indices.
    pub fn move_candidate(&mut self, old_idx: isize, new_idx: usize) -> bool {
        if let Some(m) = meta_index(old_idx) {
            let Some(meta) = self.meta_candidates.get(m).cloned() else {
                return false;
            };
            return self.insert_candidate(new_idx, meta);
        }

        let old_idx = old_idx as usize;
        let len = self.candidates.len();
        if old_idx >= len || new_idx >= len {
            return false;
        }
        if old_idx > new_idx {
            self.candidates[new_idx..=old_idx].rotate_right(1);
        } else if old_idx < new_idx {
            self.candidates[old_idx..=new_idx].rotate_left(1);
        }
        true
    }

    /// Reset to an empty FREE segment.
    pub fn clear(&mut self) {
        self.key.clear();
        self.segment_type = SegmentType::Free;
        self.candidates.clear();
        self.meta_candidates.clear();
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "[segtype={:?} key={}", self.segment_type, self.key)?;
        for (m, c) in self.meta_candidates.iter().enumerate() {
            writeln!(f, "    cand {} {}", -(m as isize) - 1, c)?;
        }
        for (i, c) in self.candidates.iter().enumerate() {
            writeln!(f, "    cand {i} {c}")?;
        }
        f.write_str("]")
    }
}
