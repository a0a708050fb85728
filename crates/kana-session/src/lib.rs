//! Conversion state for the kana engine.
//!
//! `Segments` holds the decomposition of the input into segments and their
//! ranked candidates; `Converter` fills it from a `kana_core` dictionary
//! under a per-call `ConversionRequest`.

pub mod conversion_request;
pub mod converter;
pub mod segments;

pub use conversion_request::{ComposerKeySelection, Composer, ConversionRequest, Preedit, Request};
pub use converter::{Converter, HiraganaRewriter, KatakanaRewriter, Rewriter};
pub use segments::{
    Candidate, CandidateAttributes, RequestType, RevertEntry, Segment, SegmentType, Segments,
    SegmentsError,
};
