use super::*;
use proptest::prelude::*;

fn segment(key: &str, segment_type: SegmentType, values: &[&str]) -> Segment {
    let mut seg = Segment::new(key, segment_type);
    for v in values {
        seg.push_back_candidate(Candidate::new(key, *v));
    }
    seg
}

fn segments_of(list: &[(&str, SegmentType)]) -> Segments {
    let mut segments = Segments::new();
    for (key, t) in list {
        segments.push_back_segment(segment(key, *t, &[key]));
    }
    segments
}

fn keys(segments: &Segments) -> Vec<&str> {
    segments.iter().map(Segment::key).collect()
}

fn types(segments: &Segments) -> Vec<SegmentType> {
    segments.iter().map(Segment::segment_type).collect()
}

fn values(seg: &Segment) -> Vec<&str> {
    seg.candidates().iter().map(|c| c.value.as_str()).collect()
}

fn kanji() -> Segments {
    let mut segments = Segments::new();
    segments.push_back_segment(segment("かんじ", SegmentType::Free, &["漢字", "感じ", "幹事"]));
    segments
}

// ── Candidate / Segment ─────────────────────────────────────────────

#[test]
fn attributes_combine() {
    let mut attrs = CandidateAttributes::RERANKED | CandidateAttributes::USER_DICTIONARY;
    assert!(attrs.contains(CandidateAttributes::RERANKED));
    assert!(!attrs.contains(CandidateAttributes::NO_LEARNING));
    attrs.insert(CandidateAttributes::NO_LEARNING);
    assert!(attrs.contains(CandidateAttributes::NO_HISTORY_LEARNING));
    attrs.remove(CandidateAttributes::RERANKED | CandidateAttributes::USER_DICTIONARY);
    assert_eq!(attrs, CandidateAttributes::NO_LEARNING);
    assert!(CandidateAttributes::empty().is_empty());
}

#[test]
fn candidate_functional_parts() {
    let c = Candidate::with_content("わたしは", "私は", "わたし", "私");
    assert_eq!(c.functional_key(), "は");
    assert_eq!(c.functional_value(), "は");
    assert_eq!(c.consumed_key_size, "わたしは".len());
    assert!(c.is_valid());

    let plain = Candidate::new("か", "蚊");
    assert_eq!(plain.functional_key(), "");
    assert_eq!(plain.functional_value(), "");
}

#[test]
fn candidate_validity() {
    let mut c = Candidate::with_content("わたしは", "私は", "わたし", "僕");
    assert!(!c.is_valid());

    c.content_value = "私".to_string();
    c.inner_segment_boundary = vec![(3, 1), (1, 1)];
    assert!(c.is_valid());
    c.inner_segment_boundary = vec![(3, 1)];
    assert!(!c.is_valid());
}

#[test]
fn segment_candidate_indexing() {
    let mut seg = segment("かんじ", SegmentType::Free, &["漢字", "感じ"]);
    seg.push_meta_candidate(Candidate::new("かんじ", "カンジ"));
    seg.push_meta_candidate(Candidate::new("かんじ", "kanji"));

    assert_eq!(seg.candidate(1).map(|c| c.value.as_str()), Some("感じ"));
    assert_eq!(seg.candidate(-1).map(|c| c.value.as_str()), Some("カンジ"));
    assert_eq!(seg.candidate(-2).map(|c| c.value.as_str()), Some("kanji"));
    assert!(seg.candidate(2).is_none());
    assert!(seg.candidate(-3).is_none());
    assert!(seg.is_valid_candidate_index(-2));
    assert!(!seg.is_valid_candidate_index(2));

    assert_eq!(seg.index_of("感じ"), Some(1));
    assert_eq!(seg.index_of("kanji"), Some(-2));
    assert_eq!(seg.index_of("幹事"), None);
}

#[test]
fn segment_candidate_editing() {
    let mut seg = segment("かんじ", SegmentType::Free, &["a", "b", "c", "d"]);
    assert!(!seg.insert_candidate(5, Candidate::new("かんじ", "x")));
    assert!(seg.insert_candidate(4, Candidate::new("かんじ", "e")));
    assert_eq!(seg.erase_candidate(0).map(|c| c.value), Some("a".to_string()));
    assert!(seg.erase_candidate(10).is_none());

    seg.erase_candidates(1, 2);
    assert_eq!(values(&seg), ["b", "e"]);
    seg.erase_candidates(1, 5);
    assert_eq!(values(&seg), ["b", "e"]);

    seg.push_front_candidate(Candidate::new("かんじ", "z"));
    assert_eq!(seg.pop_front_candidate().map(|c| c.value), Some("z".to_string()));
    assert_eq!(seg.pop_back_candidate().map(|c| c.value), Some("e".to_string()));
    assert_eq!(seg.candidates_size(), 1);
}

#[test]
fn move_candidate_keeps_others_in_order() {
    let mut seg = segment("k", SegmentType::Free, &["a", "b", "c", "d", "e"]);
    assert!(seg.move_candidate(3, 1));
    assert_eq!(values(&seg), ["a", "d", "b", "c", "e"]);
    assert!(seg.move_candidate(0, 4));
    assert_eq!(values(&seg), ["d", "b", "c", "e", "a"]);
    assert!(seg.move_candidate(2, 2));
    assert_eq!(values(&seg), ["d", "b", "c", "e", "a"]);

    assert!(!seg.move_candidate(5, 0));
    assert!(!seg.move_candidate(0, 5));
    assert_eq!(values(&seg), ["d", "b", "c", "e", "a"]);
}

#[test]
fn move_meta_candidate_copies_it() {
    let mut seg = segment("k", SegmentType::Free, &["a", "b"]);
    seg.push_meta_candidate(Candidate::new("k", "K"));
    assert!(seg.move_candidate(-1, 0));
    assert_eq!(values(&seg), ["K", "a", "b"]);
    assert_eq!(seg.meta_candidates_size(), 1);
    assert!(!seg.move_candidate(-2, 0));
}

#[test]
fn segment_clear_resets_type() {
    let mut seg = segment("k", SegmentType::FixedValue, &["a"]);
    seg.push_meta_candidate(Candidate::new("k", "K"));
    seg.clear();
    assert_eq!(seg, Segment::default());
}

// ── Segments: structure ─────────────────────────────────────────────

#[test]
fn history_and_conversion_regions() {
    let segments = segments_of(&[
        ("a", SegmentType::History),
        ("b", SegmentType::Submitted),
        ("c", SegmentType::Free),
        ("d", SegmentType::FixedValue),
    ]);
    assert_eq!(segments.segments_size(), 4);
    assert_eq!(segments.history_segments_size(), 2);
    assert_eq!(segments.conversion_segments_size(), 2);
    assert_eq!(segments.conversion_segment(0).map(Segment::key), Some("c"));
    assert_eq!(segments.history_segment(1).map(Segment::key), Some("b"));
    assert!(segments.conversion_segment(2).is_none());
    assert_eq!(segments.conversion_key(), "cd");
}

#[test]
fn insert_and_erase_segments() {
    let mut segments = segments_of(&[("a", SegmentType::Free), ("c", SegmentType::Free)]);
    assert!(segments.insert_segment(1, Segment::new("b", SegmentType::Free)));
    assert!(!segments.insert_segment(4, Segment::new("x", SegmentType::Free)));
    assert_eq!(keys(&segments), ["a", "b", "c"]);

    segments.erase_segments(1, 5);
    assert_eq!(segments.segments_size(), 3);
    segments.erase_segments(0, 2);
    assert_eq!(keys(&segments), ["c"]);
    assert!(segments.erase_segment(1).is_none());
    assert_eq!(segments.pop_back_segment().map(|s| s.key().to_string()), Some("c".into()));
    assert!(segments.pop_front_segment().is_none());
    assert!(segments.is_empty());
}

#[test]
fn max_history_is_clamped() {
    let mut segments = Segments::new();
    segments.set_max_history_segments_size(100);
    assert_eq!(segments.max_history_segments_size(), MAX_HISTORY_SEGMENTS_LIMIT);
    segments.set_max_history_segments_size(3);
    assert_eq!(segments.max_history_segments_size(), 3);
}

#[test]
fn defaults_follow_settings() {
    let settings = SegmentsSettings {
        max_history_segments: 7,
        max_conversion_candidates: 9,
        max_prediction_candidates: 3,
    };
    let segments = Segments::with_settings(&settings);
    assert_eq!(segments.max_history_segments_size(), 7);
    assert_eq!(segments.max_conversion_candidates_size(), 9);
    assert_eq!(segments.max_prediction_candidates_size(), 3);
    assert_eq!(segments.request_type(), RequestType::Conversion);
    assert!(segments.user_history_enabled());
}

#[test]
fn set_key_replaces_conversion_only() {
    let mut segments = segments_of(&[("まえ", SegmentType::History), ("あ", SegmentType::Free)]);
    segments.set_key("かんじ");
    assert_eq!(keys(&segments), ["まえ", "かんじ"]);
    assert_eq!(types(&segments), [SegmentType::History, SegmentType::Free]);
    assert_eq!(segments.conversion_segment(0).map(Segment::candidates_size), Some(0));
}

#[test]
fn initialize_from_key_value_seeds_fixed_segment() {
    let mut segments = Segments::new();
    segments.set_request_type(RequestType::Prediction);
    segments.initialize_from_key_value("かんじ", "漢字");
    assert_eq!(segments.request_type(), RequestType::Conversion);
    let seg = segments.conversion_segment(0).unwrap();
    assert_eq!(seg.segment_type(), SegmentType::FixedValue);
    assert_eq!(values(seg), ["漢字"]);
    assert_eq!(seg.candidate(0).unwrap().key, "かんじ");
}

// ── Segments: commit / focus ────────────────────────────────────────

#[test]
fn commit_moves_candidate_to_top() {
    let mut segments = kanji();
    segments.commit_segment_value(0, 2).unwrap();
    let seg = segments.conversion_segment(0).unwrap();
    assert_eq!(seg.segment_type(), SegmentType::FixedValue);
    assert_eq!(values(seg), ["幹事", "漢字", "感じ"]);
    assert!(seg.candidate(0).unwrap().attributes.contains(CandidateAttributes::RERANKED));
}

#[test]
fn commit_top_candidate_is_not_reranked() {
    let mut segments = kanji();
    segments.commit_segment_value(0, 0).unwrap();
    let seg = segments.conversion_segment(0).unwrap();
    assert_eq!(values(seg), ["漢字", "感じ", "幹事"]);
    assert!(seg.candidate(0).unwrap().attributes.is_empty());
}

#[test]
fn commit_meta_candidate() {
    let mut segments = kanji();
    segments
        .conversion_segment_mut(0)
        .unwrap()
        .push_meta_candidate(Candidate::new("かんじ", "カンジ"));
    segments.commit_segment_value(0, -1).unwrap();
    let seg = segments.conversion_segment(0).unwrap();
    assert_eq!(values(seg), ["カンジ", "漢字", "感じ", "幹事"]);
    assert!(seg.candidate(0).unwrap().attributes.contains(CandidateAttributes::RERANKED));
}

#[test]
fn commit_rejects_bad_indices_without_change() {
    let mut segments = kanji();
    let before = segments.clone();
    assert_eq!(
        segments.commit_segment_value(1, 0),
        Err(SegmentsError::SegmentOutOfRange(1))
    );
    assert_eq!(
        segments.commit_segment_value(0, 3),
        Err(SegmentsError::CandidateOutOfRange { segment: 0, index: 3 })
    );
    assert_eq!(
        segments.commit_segment_value(0, -1),
        Err(SegmentsError::CandidateOutOfRange { segment: 0, index: -1 })
    );
    assert_eq!(segments, before);
}

#[test]
fn commit_index_is_relative_to_conversion_region() {
    let mut segments = Segments::new();
    segments.push_back_segment(segment("まえ", SegmentType::History, &["前"]));
    segments.push_back_segment(segment("はし", SegmentType::Free, &["橋", "箸"]));
    segments.commit_segment_value(0, 1).unwrap();
    assert_eq!(values(segments.segment(0).unwrap()), ["前"]);
    assert_eq!(values(segments.segment(1).unwrap()), ["箸", "橋"]);
}

#[test]
fn focus_does_not_commit() {
    let mut segments = kanji();
    segments.focus_segment_value(0, 2).unwrap();
    let seg = segments.conversion_segment(0).unwrap();
    assert_eq!(seg.segment_type(), SegmentType::Free);
    assert_eq!(values(seg), ["幹事", "漢字", "感じ"]);
    assert!(seg.candidate(0).unwrap().attributes.is_empty());

    assert_eq!(
        segments.focus_segment_value(0, 7),
        Err(SegmentsError::CandidateOutOfRange { segment: 0, index: 7 })
    );
}

#[test]
fn commit_segments_submits_leading_segments() {
    let mut segments = Segments::new();
    segments.push_back_segment(segment("わたし", SegmentType::Free, &["私"]));
    segments.push_back_segment(segment("は", SegmentType::Free, &["は", "葉"]));
    segments.push_back_segment(segment("げんき", SegmentType::Free, &["元気"]));

    segments.commit_segments(&[0, 1]).unwrap();
    assert_eq!(
        types(&segments),
        [SegmentType::Submitted, SegmentType::Submitted, SegmentType::Free]
    );
    assert_eq!(values(segments.segment(1).unwrap()), ["葉", "は"]);
    assert_eq!(segments.history_segments_size(), 2);
    assert_eq!(segments.conversion_segment(0).map(Segment::key), Some("げんき"));
}

#[test]
fn commit_segments_is_all_or_nothing() {
    let mut segments = Segments::new();
    segments.push_back_segment(segment("わたし", SegmentType::Free, &["私"]));
    segments.push_back_segment(segment("は", SegmentType::Free, &["は"]));
    let before = segments.clone();

    assert_eq!(
        segments.commit_segments(&[0, 0, 0]),
        Err(SegmentsError::SegmentOutOfRange(2))
    );
    assert_eq!(
        segments.commit_segments(&[0, 4]),
        Err(SegmentsError::CandidateOutOfRange { segment: 1, index: 4 })
    );
    assert_eq!(segments, before);
}

#[test]
fn partial_suggestion_splits_segment() {
    let mut segments = Segments::new();
    let mut seg = Segment::new("わたしは", SegmentType::Free);
    seg.push_back_candidate(Candidate::new("わたしは", "私は"));
    seg.push_back_candidate(Candidate::new("わたし", "私"));
    segments.push_back_segment(seg);

    segments
        .commit_partial_suggestion_segment_value(0, 1, "わたし", "は")
        .unwrap();
    assert_eq!(keys(&segments), ["わたし", "は"]);
    assert_eq!(types(&segments), [SegmentType::Submitted, SegmentType::Free]);
    assert_eq!(segments.history_segments_size(), 1);
    assert_eq!(segments.conversion_segments_size(), 1);

    let top = segments.segment(0).unwrap().candidate(0).unwrap();
    assert_eq!(top.value, "私");
    assert!(top.attributes.contains(CandidateAttributes::RERANKED));
    assert!(top.attributes.contains(CandidateAttributes::AUTO_PARTIAL_SUGGESTION));
    assert_eq!(segments.segment(1).unwrap().candidates_size(), 0);
}

#[test]
fn partial_suggestion_keeps_pending_romaji_in_new_key() {
    let mut segments = Segments::new();
    let mut seg = Segment::new("わたし", SegmentType::Free);
    seg.push_back_candidate(Candidate::new("わたし", "私"));
    seg.push_back_candidate(Candidate::new("わた", "綿"));
    segments.push_back_segment(seg);

    segments
        .commit_partial_suggestion_segment_value(0, 1, "わた", "しh")
        .unwrap();
    assert_eq!(keys(&segments), ["わた", "しh"]);
    assert_eq!(types(&segments), [SegmentType::Submitted, SegmentType::Free]);
    assert_eq!(segments.segment(0).unwrap().candidate(0).unwrap().value, "綿");
}

#[test]
fn partial_suggestion_rejects_mismatched_keys() {
    let mut segments = Segments::new();
    segments.push_back_segment(segment("わたしは", SegmentType::Free, &["私は"]));
    let before = segments.clone();

    for (current, new) in [("", "わたしは"), ("わたし", ""), ("わたしは", "が"), ("かな", "は")] {
        assert!(matches!(
            segments.commit_partial_suggestion_segment_value(0, 0, current, new),
            Err(SegmentsError::InvalidPartialKey { .. })
        ));
    }
    assert!(matches!(
        segments.commit_partial_suggestion_segment_value(0, 1, "わたし", "は"),
        Err(SegmentsError::CandidateOutOfRange { .. })
    ));
    assert_eq!(segments, before);
}

// ── Segments: resize ────────────────────────────────────────────────

#[test]
fn resize_grow_takes_from_next_segment() {
    let mut segments = segments_of(&[
        ("かん", SegmentType::Free),
        ("じを", SegmentType::Free),
        ("かく", SegmentType::Free),
    ]);
    segments.resize_segment(0, 1).unwrap();
    assert_eq!(keys(&segments), ["かんじ", "を", "かく"]);
    assert_eq!(
        types(&segments),
        [SegmentType::FixedBoundary, SegmentType::Free, SegmentType::Free]
    );
    assert_eq!(segments.segment(0).unwrap().candidates_size(), 0);
    assert!(segments.resized());
}

#[test]
fn resize_grow_across_segments() {
    let mut segments = segments_of(&[
        ("かん", SegmentType::Free),
        ("じを", SegmentType::Free),
        ("かく", SegmentType::Free),
    ]);
    segments.resize_segment(0, 3).unwrap();
    assert_eq!(keys(&segments), ["かんじをか", "く"]);
    assert_eq!(types(&segments), [SegmentType::FixedBoundary, SegmentType::Free]);

    let mut exact = segments_of(&[("かん", SegmentType::Free), ("じ", SegmentType::Free)]);
    exact.resize_segment(0, 1).unwrap();
    assert_eq!(keys(&exact), ["かんじ"]);
}

#[test]
fn resize_shrink_moves_tail_forward() {
    let mut segments = Segments::new();
    segments.push_back_segment(segment("かんじ", SegmentType::FixedValue, &["漢字"]));
    segments.push_back_segment(segment("を", SegmentType::FixedValue, &["を"]));
    segments.resize_segment(0, -1).unwrap();
    assert_eq!(keys(&segments), ["かん", "じを"]);
    assert_eq!(types(&segments), [SegmentType::FixedBoundary, SegmentType::Free]);
    assert_eq!(segments.segment(0).unwrap().candidates_size(), 0);
    assert_eq!(segments.segment(1).unwrap().candidates_size(), 0);
}

#[test]
fn resize_shrink_last_segment_appends_one() {
    let mut segments = kanji();
    segments.resize_segment(0, -2).unwrap();
    assert_eq!(keys(&segments), ["か", "んじ"]);
    assert_eq!(types(&segments), [SegmentType::FixedBoundary, SegmentType::Free]);
}

#[test]
fn resize_respects_history() {
    let mut segments = segments_of(&[
        ("まえ", SegmentType::History),
        ("あい", SegmentType::Free),
        ("う", SegmentType::Free),
    ]);
    segments.resize_segment(0, 1).unwrap();
    assert_eq!(keys(&segments), ["まえ", "あいう"]);
    assert_eq!(types(&segments), [SegmentType::History, SegmentType::FixedBoundary]);
}

#[test]
fn resize_rejections_leave_state_untouched() {
    let mut segments = segments_of(&[("かん", SegmentType::Free), ("じ", SegmentType::Free)]);
    let before = segments.clone();

    let invalid = |r: Result<(), SegmentsError>| matches!(r, Err(SegmentsError::InvalidResize(_)));
    assert!(invalid(segments.resize_segment(0, 0)));
    assert!(invalid(segments.resize_segment(1, 1)));
    assert!(invalid(segments.resize_segment(0, -2)));
    assert!(invalid(segments.resize_segment(0, 2)));
    assert_eq!(
        segments.resize_segment(2, -1),
        Err(SegmentsError::SegmentOutOfRange(2))
    );

    segments.set_request_type(RequestType::Prediction);
    assert_eq!(
        segments.resize_segment(0, -1),
        Err(SegmentsError::InvalidRequestType {
            expected: RequestType::Conversion,
            actual: RequestType::Prediction,
        })
    );
    segments.set_request_type(RequestType::Conversion);
    assert_eq!(segments, before);
    assert!(!segments.resized());
}

#[test]
fn resize_extreme_offsets_are_rejected() {
    let mut segments = segments_of(&[("あい", SegmentType::Free), ("うえ", SegmentType::Free)]);
    let before = segments.clone();

    for offset in [isize::MAX, isize::MIN, isize::MIN + 1] {
        assert!(matches!(
            segments.resize_segment(0, offset),
            Err(SegmentsError::InvalidResize(_))
        ));
        assert!(matches!(
            segments.resize_segment(1, offset),
            Err(SegmentsError::InvalidResize(_))
        ));
    }
    assert_eq!(segments, before);
}

#[test]
fn resize_segments_splits_by_sizes() {
    let mut segments = segments_of(&[("あいう", SegmentType::Free), ("えお", SegmentType::Free)]);
    segments.resize_segments(0, 2, &[2, 0, 1]).unwrap();
    assert_eq!(keys(&segments), ["あい", "う", "えお"]);
    assert!(types(&segments)
        .iter()
        .all(|&t| t == SegmentType::FixedBoundary));
    assert!(segments.resized());
}

#[test]
fn resize_segments_clamps_oversized_pieces() {
    let mut segments = segments_of(&[
        ("あいう", SegmentType::Free),
        ("えお", SegmentType::Free),
        ("か", SegmentType::Free),
    ]);
    segments.resize_segments(0, 2, &[4, 9]).unwrap();
    assert_eq!(keys(&segments), ["あいうえ", "お", "か"]);
    assert_eq!(segments.segment(2).unwrap().segment_type(), SegmentType::Free);
}

#[test]
fn resize_segments_rejects_bad_ranges() {
    let mut segments = segments_of(&[("あいう", SegmentType::Free), ("えお", SegmentType::Free)]);
    let before = segments.clone();
    let invalid = |r: Result<(), SegmentsError>| matches!(r, Err(SegmentsError::InvalidResize(_)));

    assert!(invalid(segments.resize_segments(0, 0, &[1])));
    assert!(invalid(segments.resize_segments(1, 2, &[1])));
    assert!(invalid(segments.resize_segments(0, 2, &[1; MAX_RESIZE_ARRAY_SIZE + 1])));
    assert_eq!(
        segments.resize_segments(3, 1, &[1]),
        Err(SegmentsError::SegmentOutOfRange(3))
    );
    assert_eq!(segments, before);
}

#[test]
fn free_segment_value_releases_segment() {
    let mut segments = kanji();
    segments.commit_segment_value(0, 1).unwrap();
    segments.free_segment_value(0).unwrap();
    let seg = segments.conversion_segment(0).unwrap();
    assert_eq!(seg.segment_type(), SegmentType::Free);
    assert_eq!(seg.candidates_size(), 3);
    assert_eq!(
        segments.free_segment_value(1),
        Err(SegmentsError::SegmentOutOfRange(1))
    );
}

// ── Segments: lifecycle ─────────────────────────────────────────────

#[test]
fn finish_conversion_keeps_tail_as_history() {
    let mut segments = segments_of(&[
        ("a", SegmentType::History),
        ("b", SegmentType::Submitted),
        ("c", SegmentType::FixedValue),
        ("d", SegmentType::Free),
    ]);
    segments.set_max_history_segments_size(2);
    segments.push_back_revert_entry(RevertEntry {
        key: "k".into(),
        ..RevertEntry::default()
    });

    segments.finish_conversion();
    assert_eq!(keys(&segments), ["c", "d"]);
    assert_eq!(types(&segments), [SegmentType::History, SegmentType::History]);
    assert!(segments.revert_entries().is_empty());
    assert_eq!(segments.conversion_segments_size(), 0);
}

#[test]
fn finish_conversion_with_zero_history() {
    let mut segments = segments_of(&[("a", SegmentType::Free)]);
    segments.set_max_history_segments_size(0);
    segments.finish_conversion();
    assert!(segments.is_empty());
}

#[test]
fn cancel_reset_revert_keep_history() {
    let build = || {
        let mut s = segments_of(&[("a", SegmentType::History), ("b", SegmentType::Free)]);
        s.push_back_revert_entry(RevertEntry::default());
        s
    };

    let mut cancelled = build();
    cancelled.cancel_conversion();
    assert_eq!(keys(&cancelled), ["a"]);
    assert_eq!(cancelled.revert_entries().len(), 1);

    let mut reset = build();
    reset.reset_conversion();
    assert_eq!(keys(&reset), ["a"]);
    assert!(reset.revert_entries().is_empty());

    let mut reverted = build();
    reverted.revert_conversion();
    assert_eq!(keys(&reverted), ["a"]);
    assert!(reverted.revert_entries().is_empty());

    let mut cleared = build();
    cleared.clear();
    assert!(cleared.is_empty());
    assert!(cleared.revert_entries().is_empty());
}

#[test]
fn reconstruct_history_from_number() {
    let mut segments = segments_of(&[("x", SegmentType::Free)]);
    segments.reconstruct_history("価格は1234").unwrap();
    assert_eq!(keys(&segments), ["1234"]);
    let seg = segments.segment(0).unwrap();
    assert_eq!(seg.segment_type(), SegmentType::History);
    let c = seg.candidate(0).unwrap();
    assert_eq!(c.value, "1234");
    assert!(c.attributes.contains(CandidateAttributes::NO_LEARNING));
}

#[test]
fn reconstruct_history_full_width_alphabet() {
    let mut segments = Segments::new();
    segments.reconstruct_history("今日はＡＢＣ").unwrap();
    let c = segments.segment(0).unwrap().candidate(0).unwrap();
    assert_eq!(c.key, "ABC");
    assert_eq!(c.value, "ＡＢＣ");
}

#[test]
fn reconstruct_history_token_rules() {
    let mut segments = Segments::new();
    segments.reconstruct_history("abc ").unwrap();
    assert_eq!(keys(&segments), ["abc"]);
    segments.reconstruct_history("abc123").unwrap();
    assert_eq!(keys(&segments), ["123"]);

    for text in ["", "abc  ", "こんにちは", "12あ", " "] {
        assert_eq!(
            segments.reconstruct_history(text),
            Err(SegmentsError::NoHistoryToken),
            "{text:?}"
        );
    }
    assert_eq!(keys(&segments), ["123"]);
}

#[test]
fn display_lists_segments() {
    let text = kanji().to_string();
    assert!(text.contains("seg 0"));
    assert!(text.contains("key=かんじ"));
    assert!(text.contains("val=感じ"));
}

// ── Properties ──────────────────────────────────────────────────────

fn arb_segments() -> impl Strategy<Value = Segments> {
    (
        prop::collection::vec("[あいうえお]{0,2}", 0..3),
        prop::collection::vec("[かきくけこ]{1,3}", 1..5),
    )
        .prop_map(|(history, conversion)| {
            let mut segments = Segments::new();
            for key in history.iter().filter(|k| !k.is_empty()) {
                segments.push_back_segment(segment(key, SegmentType::History, &["h"]));
            }
            for key in &conversion {
                segments.push_back_segment(segment(key, SegmentType::Free, &["a", "b"]));
            }
            segments
        })
}

proptest! {
    #[test]
    fn resize_preserves_key_and_history(
        mut segments in arb_segments(),
        ops in prop::collection::vec((0usize..5, -3isize..4), 0..12),
    ) {
        let key = segments.conversion_key();
        let history = segments.history_segments().to_vec();
        for (index, offset) in ops {
            let before = segments.clone();
            if segments.resize_segment(index, offset).is_err() {
                prop_assert_eq!(&segments, &before);
            }
            prop_assert_eq!(segments.conversion_key(), key.clone());
            prop_assert_eq!(segments.history_segments(), &history[..]);
            prop_assert!(segments.iter().all(|s| !s.key().is_empty()));
        }
    }

    #[test]
    fn resize_segments_preserves_key(
        mut segments in arb_segments(),
        start in 0usize..4,
        count in 0usize..5,
        sizes in prop::collection::vec(0u8..4, 0..6),
    ) {
        let key = segments.conversion_key();
        let before = segments.clone();
        match segments.resize_segments(start, count, &sizes) {
            Ok(()) => prop_assert!(segments.iter().all(|s| !s.key().is_empty())),
            Err(_) => prop_assert_eq!(&segments, &before),
        }
        prop_assert_eq!(segments.conversion_key(), key);
    }

    #[test]
    fn commit_keeps_candidate_multiset(
        mut segments in arb_segments(),
        index in 0usize..5,
        candidate in -2isize..3,
    ) {
        let before = segments.clone();
        match segments.commit_segment_value(index, candidate) {
            Ok(()) => {
                let seg = segments.conversion_segment(index).unwrap();
                prop_assert_eq!(seg.segment_type(), SegmentType::FixedValue);
                let mut got = values(seg);
                got.sort_unstable();
                prop_assert_eq!(got, vec!["a", "b"]);
            }
            Err(_) => prop_assert_eq!(&segments, &before),
        }
    }
}
