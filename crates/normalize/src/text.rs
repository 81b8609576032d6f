use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Canonicalizes a free-text description into a comparable form.
///
/// Steps, in order: trim and lowercase; NFKD-decompose and drop combining
/// marks (so `hormigón` and `hormigon` compare equal, and compatibility
/// forms like `²` become `2`); fold every character outside
/// `{a-z, 0-9, whitespace, '.', '/', '-'}` to a space; fold `.`, `/` and
/// `-` themselves to spaces; collapse whitespace runs; trim again.
///
/// Total and deterministic: never fails, and applying it twice equals
/// applying it once.
pub fn normalize_text(value: &str) -> String {
    let lowered = value.trim().to_lowercase();

    let mut folded = String::with_capacity(lowered.len());
    for ch in lowered.nfkd() {
        if is_combining_mark(ch) {
            continue;
        }
        match ch {
            'a'..='z' | '0'..='9' => folded.push(ch),
            // The dot/slash/dash separators carry no meaning after
            // decomposition; everything else outside the charset is noise.
            _ => folded.push(' '),
        }
    }

    collapse_whitespace(&folded)
}

/// Collapses repeated whitespace, trims edges, and normalizes every
/// whitespace character to a single ASCII space.
pub fn collapse_whitespace(text: &str) -> String {
    let mut normalized = String::with_capacity(text.len());
    for segment in text.split_whitespace() {
        if !normalized.is_empty() {
            normalized.push(' ');
        }
        normalized.push_str(segment);
    }
    normalized
}
