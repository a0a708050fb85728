//! Character-level Unicode classification for Japanese text.

/// Full Hiragana block (U+3040..U+309F).
pub fn is_hiragana(c: char) -> bool {
    ('\u{3040}'..='\u{309F}').contains(&c)
}

/// ASCII or full-width digit.
pub fn is_number(c: char) -> bool {
    c.is_ascii_digit() || ('\u{FF10}'..='\u{FF19}').contains(&c)
}

/// ASCII or full-width Latin letter.
pub fn is_alphabet(c: char) -> bool {
    c.is_ascii_alphabetic()
        || ('\u{FF21}'..='\u{FF3A}').contains(&c)
        || ('\u{FF41}'..='\u{FF5A}').contains(&c)
}

/// Convert a hiragana string to katakana.
/// Non-hiragana characters (ー, ASCII, etc.) are passed through unchanged.
pub fn hiragana_to_katakana(s: &str) -> String {
    s.chars()
        .map(|c| {
            if ('\u{3041}'..='\u{3096}').contains(&c) {
                char::from_u32(c as u32 + 0x60).unwrap_or(c)
            } else {
                c
            }
        })
        .collect()
}

pub fn katakana_to_hiragana(s: &str) -> String {
    s.chars()
        .map(|c| {
            if ('\u{30A1}'..='\u{30F6}').contains(&c) {
                char::from_u32(c as u32 - 0x60).unwrap_or(c)
            } else {
                c
            }
        })
        .collect()
}

/// Map full-width ASCII variants (U+FF01..U+FF5E) to ASCII.
pub fn full_width_ascii_to_half_width(s: &str) -> String {
    s.chars()
        .map(|c| {
            if ('\u{FF01}'..='\u{FF5E}').contains(&c) {
                char::from_u32(c as u32 - 0xFEE0).unwrap_or(c)
            } else {
                c
            }
        })
        .collect()
}

/// Accepts hiragana and the prolonged sound mark ー, as in "らーめん".
pub fn is_hiragana_reading(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| is_hiragana(c) || c == 'ー')
}

/// Kana that differ only by dakuten, handakuten or size.
const MODIFIER_GROUPS: &[&str] = &[
    "あぁ", "いぃ", "うぅゔ", "えぇ", "おぉ", "かが", "きぎ", "くぐ", "けげ", "こご", "さざ",
    "しじ", "すず", "せぜ", "そぞ", "ただ", "ちぢ", "つっづ", "てで", "とど", "はばぱ", "ひびぴ",
    "ふぶぷ", "へべぺ", "ほぼぽ", "やゃ", "ゆゅ", "よょ", "わゎ",
];

/// Every hiragana equal to `c` when voicing marks and small forms are
/// ignored, `c` included. `None` if `c` has no variants.
///
/// All variants of a character share its UTF-8 length.
pub fn kana_modifier_variants(c: char) -> Option<&'static str> {
    MODIFIER_GROUPS.iter().copied().find(|g| g.contains(c))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_hiragana_reading() {
        assert!(is_hiragana_reading("かんじ"));
        assert!(is_hiragana_reading("らーめん"));
        assert!(!is_hiragana_reading("カタカナ"));
        assert!(!is_hiragana_reading(""));
    }

    #[test]
    fn test_kana_conversion() {
        assert_eq!(hiragana_to_katakana("きょうは"), "キョウハ");
        assert_eq!(hiragana_to_katakana("らーめん"), "ラーメン");
        assert_eq!(hiragana_to_katakana("abc"), "abc");
        assert_eq!(katakana_to_hiragana("キョウハ"), "きょうは");
        assert_eq!(katakana_to_hiragana("ラーメン"), "らーめん");
        assert_eq!(full_width_ascii_to_half_width("ＡＢｃ１２"), "ABc12");
        assert_eq!(full_width_ascii_to_half_width("かな"), "かな");
    }

    #[test]
    fn test_char_classification() {
        assert!(is_number('7'));
        assert!(is_number('７'));
        assert!(!is_number('a'));
        assert!(is_alphabet('Q'));
        assert!(is_alphabet('ｑ'));
        assert!(!is_alphabet('あ'));
        assert!(is_hiragana('ゔ'));
    }

    #[test]
    fn test_modifier_variants() {
        assert_eq!(kana_modifier_variants('は'), Some("はばぱ"));
        assert_eq!(kana_modifier_variants('ぱ'), Some("はばぱ"));
        assert_eq!(kana_modifier_variants('っ'), Some("つっづ"));
        assert_eq!(kana_modifier_variants('ん'), None);
        assert_eq!(kana_modifier_variants('a'), None);
        for group in MODIFIER_GROUPS {
            assert!(group.chars().all(|c| c.len_utf8() == 3));
        }
    }
}
