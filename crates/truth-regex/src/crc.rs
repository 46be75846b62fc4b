//! Pattern identity CRC (`spec.md` §4.3: "computed over the sorted,
//! terminator-joined annotation texts").

use crc32fast::Hasher;

const ANNOTATION_JOIN_TERMINATOR: char = '\u{1F}'; // unit separator, never valid in an annotation

/// Computes the CRC stored on a `Pattern` subject from its declaration's
/// annotation texts. Annotation order does not affect identity: texts are
/// sorted before joining so two patterns with the same annotations in
/// different source order compare equal.
pub fn compute_pattern_crc<S: AsRef<str>>(annotation_texts: &[S]) -> u32 {
    let mut sorted: Vec<&str> = annotation_texts.iter().map(|s| s.as_ref()).collect();
    sorted.sort_unstable();
    let joined = sorted.join(&ANNOTATION_JOIN_TERMINATOR.to_string());

    let mut hasher = Hasher::new();
    hasher.update(joined.as_bytes());
    hasher.finalize()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crc_is_stable_for_same_inputs() {
        let a = compute_pattern_crc(&["Number", "Positive"]);
        let b = compute_pattern_crc(&["Number", "Positive"]);
        assert_eq!(a, b);
    }

    #[test]
    fn crc_ignores_annotation_order() {
        let a = compute_pattern_crc(&["Number", "Positive"]);
        let b = compute_pattern_crc(&["Positive", "Number"]);
        assert_eq!(a, b);
    }

    #[test]
    fn crc_differs_for_different_annotations() {
        let a = compute_pattern_crc(&["Number"]);
        let b = compute_pattern_crc(&["String"]);
        assert_ne!(a, b);
    }
}
