use crate::dictionary::Dictionary;

/// Tunable thresholds for the word-match oracle.
///
/// Lower values of either threshold raise the false-positive rate: matching
/// two three-letter tokens is much easier for gibberish than matching four
/// six-letter words.
#[derive(Debug, Clone, Copy)]
pub struct ScoringParams {
    /// Word matches required to declare the text valid language.
    pub min_matches: usize,
    /// Minimum token length considered a candidate match.
    pub min_word_length: usize,
}

impl Default for ScoringParams {
    fn default() -> Self {
        Self {
            min_matches: 4,
            min_word_length: 4,
        }
    }
}

/// Heuristic pass/fail judgment: does this decryption look like language?
///
/// Splits on single spaces only (the ciphertext keeps its original word
/// boundaries through decryption) and counts tokens that are at least
/// `min_word_length` long and present in the dictionary. Short-circuits as
/// soon as `min_matches` is reached, so a hit near the front of a long text
/// is cheap.
pub fn looks_like_language(candidate: &str, dict: &Dictionary, params: ScoringParams) -> bool {
    let mut count = 0;
    for word in candidate.split(' ') {
        if word.len() >= params.min_word_length && dict.contains(word) {
            count += 1;
            if count >= params.min_matches {
                return true;
            }
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn english() -> Dictionary {
        Dictionary::from_words([
            "ATTACK", "DAWN", "QUICK", "BROWN", "JUMPS", "OVER", "LAZY", "WITH", "THEM",
        ])
    }

    fn params(matches: usize, length: usize) -> ScoringParams {
        ScoringParams {
            min_matches: matches,
            min_word_length: length,
        }
    }

    #[test]
    fn test_accepts_text_with_enough_matches() {
        let text = "THE QUICK BROWN FOX JUMPS OVER LAZY DOGS";
        assert!(looks_like_language(text, &english(), params(4, 4)));
    }

    #[test]
    fn test_rejects_text_below_match_count() {
        let text = "QUICK BROWN XQZJV KWWPT";
        assert!(!looks_like_language(text, &english(), params(4, 4)));
    }

    #[test]
    fn test_short_words_do_not_count() {
        // OVER would match but the length threshold excludes it
        let text = "OVER OVER OVER OVER";
        assert!(!looks_like_language(text, &english(), params(2, 5)));
    }

    #[test]
    fn test_rejects_gibberish() {
        let text = "XKCDQ WPLFM ZZTOP QQQQQ AAAAA BRRRP";
        assert!(!looks_like_language(text, &english(), params(4, 4)));
    }

    #[test]
    fn test_splits_on_single_spaces_only() {
        // A tab-joined token is one word and matches nothing
        let text = "ATTACK\tDAWN ATTACK DAWN ATTACK";
        assert!(!looks_like_language(text, &english(), params(4, 4)));
        assert!(looks_like_language(text, &english(), params(3, 4)));
    }
}
