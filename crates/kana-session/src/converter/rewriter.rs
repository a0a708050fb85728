use kana_core::unicode::{hiragana_to_katakana, katakana_to_hiragana};

use crate::conversion_request::ConversionRequest;
use crate::segments::{Candidate, Segment};

/// Adds or reorders candidates of one conversion segment.
pub trait Rewriter: Send + Sync {
    /// Returns true if the segment was changed.
    fn rewrite(&self, request: &ConversionRequest<'_>, segment: &mut Segment) -> bool;

    /// Slow rewriters are skipped for requests with `skip_slow_rewriters`.
    fn is_slow(&self) -> bool {
        false
    }
}

/// Worst (highest) candidate cost, or 0 if there are none.
fn worst_cost(segment: &Segment) -> i32 {
    segment.candidates().iter().map(|c| c.cost).max().unwrap_or(0)
}

fn has_value(segment: &Segment, value: &str) -> bool {
    segment.candidates().iter().any(|c| c.value == value)
}

/// Appends `value` below every existing candidate unless already present.
fn append_fallback(segment: &mut Segment, value: String, penalty: i32) -> bool {
    if value.is_empty() || has_value(segment, &value) {
        return false;
    }
    let cost = worst_cost(segment).saturating_add(penalty);
    let candidate = Candidate::new(segment.key(), value).with_cost(cost);
    segment.push_back_candidate(candidate);
    true
}

/// Run rewriters in order on one segment. Returns true if any changed it.
pub(crate) fn run_rewriters(
    rewriters: &[Box<dyn Rewriter>],
    request: &ConversionRequest<'_>,
    segment: &mut Segment,
) -> bool {
    let mut modified = false;
    for rw in rewriters {
        if rw.is_slow() && request.skip_slow_rewriters() {
            continue;
        }
        modified |= rw.rewrite(request, segment);
    }
    modified
}

/// Adds the katakana form of the key as a low-priority candidate.
#[derive(Debug, Clone, Copy, Default)]
pub struct KatakanaRewriter;

impl Rewriter for KatakanaRewriter {
    fn rewrite(&self, _request: &ConversionRequest<'_>, segment: &mut Segment) -> bool {
        let katakana = hiragana_to_katakana(segment.key());
        append_fallback(segment, katakana, 10000)
    }
}

/// Adds the hiragana form of the key, ranked above the katakana fallback.
#[derive(Debug, Clone, Copy, Default)]
pub struct HiraganaRewriter;

impl Rewriter for HiraganaRewriter {
    fn rewrite(&self, _request: &ConversionRequest<'_>, segment: &mut Segment) -> bool {
        let hiragana = katakana_to_hiragana(segment.key());
        append_fallback(segment, hiragana, 5000)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segments::SegmentType;

    fn segment_with(key: &str, values: &[(&str, i32)]) -> Segment {
        let mut seg = Segment::new(key, SegmentType::Free);
        for (v, cost) in values {
            seg.push_back_candidate(Candidate::new(key, *v).with_cost(*cost));
        }
        seg
    }

    #[test]
    fn katakana_appended_last() {
        let mut seg = segment_with("かんじ", &[("漢字", 3000), ("感じ", 4000)]);
        assert!(KatakanaRewriter.rewrite(&ConversionRequest::default(), &mut seg));
        let last = seg.candidates().last().unwrap();
        assert_eq!(last.value, "カンジ");
        assert_eq!(last.cost, 14000);
        assert_eq!(last.key, "かんじ");
    }

    #[test]
    fn existing_value_is_not_duplicated() {
        let mut seg = segment_with("かんじ", &[("カンジ", 100)]);
        assert!(!KatakanaRewriter.rewrite(&ConversionRequest::default(), &mut seg));
        assert_eq!(seg.candidates_size(), 1);
    }

    #[test]
    fn hiragana_before_katakana() {
        let mut seg = segment_with("かんじ", &[("漢字", 3000)]);
        let rewriters: Vec<Box<dyn Rewriter>> =
            vec![Box::new(HiraganaRewriter), Box::new(KatakanaRewriter)];
        assert!(run_rewriters(&rewriters, &ConversionRequest::default(), &mut seg));
        let values: Vec<_> = seg.candidates().iter().map(|c| c.value.as_str()).collect();
        assert_eq!(values, ["漢字", "かんじ", "カンジ"]);
        assert_eq!(seg.candidate(1).unwrap().cost, 8000);
        assert_eq!(seg.candidate(2).unwrap().cost, 18000);
    }

    struct SlowMarker;

    impl Rewriter for SlowMarker {
        fn rewrite(&self, _request: &ConversionRequest<'_>, segment: &mut Segment) -> bool {
            segment.push_back_candidate(Candidate::new(segment.key(), "slow"));
            true
        }

        fn is_slow(&self) -> bool {
            true
        }
    }

    #[test]
    fn slow_rewriters_can_be_skipped() {
        let rewriters: Vec<Box<dyn Rewriter>> = vec![Box::new(SlowMarker)];
        let mut request = ConversionRequest::default();
        request.set_skip_slow_rewriters(true);

        let mut seg = segment_with("a", &[]);
        assert!(!run_rewriters(&rewriters, &request, &mut seg));
        assert_eq!(seg.candidates_size(), 0);

        request.set_skip_slow_rewriters(false);
        assert!(run_rewriters(&rewriters, &request, &mut seg));
        assert_eq!(seg.candidates_size(), 1);
    }
}
