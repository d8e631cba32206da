//! Text folding for symptom comparison.

use unicode_normalization::UnicodeNormalization;

/// Combining Diacritical Marks block.
const COMBINING_MARKS: std::ops::RangeInclusive<char> = '\u{0300}'..='\u{036f}';

/// Fold text for comparison: lower-case, strip accents, map `đ`/`Đ` to
/// `d`/`D` (the stroke is not a combining mark), trim.
///
/// Total and idempotent.
pub fn normalize(text: &str) -> String {
    let folded: String = text
        .to_lowercase()
        .nfd()
        .filter(|c| !COMBINING_MARKS.contains(c))
        .map(|c| match c {
            'đ' => 'd',
            'Đ' => 'D',
            other => other,
        })
        .collect();

    folded.trim().to_string()
}
