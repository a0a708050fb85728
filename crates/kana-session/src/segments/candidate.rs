use std::fmt;
use std::ops::{BitOr, BitOrAssign};

/// Lineage and handling flags of a candidate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct CandidateAttributes(u32);

impl CandidateAttributes {
    pub const BEST_CANDIDATE: Self = Self(1 << 0);
    /// Moved to the top by the user or a rewriter.
    pub const RERANKED: Self = Self(1 << 1);
    pub const NO_HISTORY_LEARNING: Self = Self(1 << 2);
    pub const NO_SUGGEST_LEARNING: Self = Self(1 << 3);
    pub const NO_LEARNING: Self = Self(Self::NO_HISTORY_LEARNING.0 | Self::NO_SUGGEST_LEARNING.0);
    pub const CONTEXT_SENSITIVE: Self = Self(1 << 4);
    pub const SPELLING_CORRECTION: Self = Self(1 << 5);
    pub const NO_VARIANTS_EXPANSION: Self = Self(1 << 6);
    pub const NO_EXTRA_DESCRIPTION: Self = Self(1 << 7);
    pub const REALTIME_CONVERSION: Self = Self(1 << 8);
    pub const USER_DICTIONARY: Self = Self(1 << 9);
    pub const COMMAND_CANDIDATE: Self = Self(1 << 10);
    /// The candidate key covers only a prefix of the segment key.
    pub const PARTIALLY_KEY_CONSUMED: Self = Self(1 << 11);
    pub const TYPING_CORRECTION: Self = Self(1 << 12);
    pub const AUTO_PARTIAL_SUGGESTION: Self = Self(1 << 13);
    pub const KANA_MODIFIER_EXPANDED: Self = Self(1 << 14);
    /// Marked for removal by a rewriter.
    pub const REMOVED: Self = Self(1 << 15);

    pub const fn empty() -> Self {
        Self(0)
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn insert(&mut self, other: Self) {
        self.0 |= other.0;
    }

    pub fn remove(&mut self, other: Self) {
        self.0 &= !other.0;
    }
}

impl BitOr for CandidateAttributes {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for CandidateAttributes {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl fmt::Display for CandidateAttributes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// One conversion of a segment key.
///
/// `content_key`/`content_value` are the content word without functional
/// suffixes such as particles; `value` always starts with `content_value`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Candidate {
    pub key: String,
    pub value: String,
    pub content_key: String,
    pub content_value: String,
    /// Bytes of the segment key this candidate covers.
    pub consumed_key_size: usize,
    pub prefix: String,
    pub suffix: String,
    pub description: String,
    /// Total cost; lower ranks higher.
    pub cost: i32,
    /// Word cost from the dictionary.
    pub wcost: i32,
    pub structure_cost: i32,
    pub lid: u16,
    pub rid: u16,
    pub attributes: CandidateAttributes,
    /// `(key chars, value chars)` per inner segment, when the candidate
    /// spans several words.
    pub inner_segment_boundary: Vec<(usize, usize)>,
}

impl Candidate {
    /// Candidate whose content equals its full key and value.
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        let key = key.into();
        let value = value.into();
        Self {
            content_key: key.clone(),
            content_value: value.clone(),
            consumed_key_size: key.len(),
            key,
            value,
            ..Self::default()
        }
    }

    pub fn with_content(
        key: impl Into<String>,
        value: impl Into<String>,
        content_key: impl Into<String>,
        content_value: impl Into<String>,
    ) -> Self {
        let key = key.into();
        Self {
            consumed_key_size: key.len(),
            key,
            value: value.into(),
            content_key: content_key.into(),
            content_value: content_value.into(),
            ..Self::default()
        }
    }

    pub fn with_cost(mut self, cost: i32) -> Self {
        self.cost = cost;
        self.wcost = cost;
        self
    }

    /// The part of `key` after `content_key`, e.g. a particle reading.
    pub fn functional_key(&self) -> &str {
        if self.key.len() <= self.content_key.len() {
            return "";
        }
        self.key.get(self.content_key.len()..).unwrap_or("")
    }

    /// The part of `value` after `content_value`.
    pub fn functional_value(&self) -> &str {
        if self.value.len() <= self.content_value.len() {
            return "";
        }
        self.value.get(self.content_value.len()..).unwrap_or("")
    }

    /// `value` extends `content_value`, and inner segment boundaries (if
    /// any) add up to the character lengths of `key` and `value`.
    pub fn is_valid(&self) -> bool {
        if !self.value.starts_with(&self.content_value) {
            return false;
        }
        if self.inner_segment_boundary.is_empty() {
            return true;
        }
        let (key_len, value_len) = self
            .inner_segment_boundary
            .iter()
            .fold((0, 0), |(k, v), &(bk, bv)| (k + bk, v + bv));
        key_len == self.key.chars().count() && value_len == self.value.chars().count()
    }
}

impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "(key={} ckey={} val={} cval={} cost={} scost={} wcost={} lid={} rid={} attributes={} consumed_key_size={}",
            self.key,
            self.content_key,
            self.value,
            self.content_value,
            self.cost,
            self.structure_cost,
            self.wcost,
            self.lid,
            self.rid,
            self.attributes,
            self.consumed_key_size
        )?;
        if !self.prefix.is_empty() {
            write!(f, " prefix={}", self.prefix)?;
        }
        if !self.suffix.is_empty() {
            write!(f, " suffix={}", self.suffix)?;
        }
        if !self.description.is_empty() {
            write!(f, " description={}", self.description)?;
        }
        if !self.inner_segment_boundary.is_empty() {
            f.write_str(" segbdd=")?;
            for (k, v) in &self.inner_segment_boundary {
                write!(f, "<{k},{v}>")?;
            }
        }
        f.write_str(")")
    }
}
