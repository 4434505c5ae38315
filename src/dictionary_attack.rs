use tracing::debug;

use crate::cipher;
use crate::dictionary::Dictionary;
use crate::job::{CancelToken, Outcome, Progress, ProgressSink, WorkItem};
use crate::scorer::{self, ScoringParams};

/// Trial decryption keyed by the word list itself.
///
/// Every dictionary word is tried as the repeating key, in the set's natural
/// order. The first decryption that passes the word-match oracle wins.
/// Cancellation is checked once per candidate word.
pub fn run(
    item: &WorkItem,
    dict: &Dictionary,
    params: ScoringParams,
    cancel: &CancelToken,
    progress: &dyn ProgressSink,
) -> Outcome {
    progress.report(Progress::Started { label: &item.label });

    let mut tested = 0u64;
    for key in dict.words() {
        if cancel.is_cancelled() {
            debug!("dictionary attack cancelled after {} keys", tested);
            return Outcome::Cancelled;
        }

        tested += 1;
        progress.report(Progress::TryingKey { key, tested });

        let plaintext = cipher::decrypt(&item.ciphertext, key);
        if scorer::looks_like_language(&plaintext, dict, params) {
            progress.report(Progress::Finished {
                label: &item.label,
                success: true,
            });
            return Outcome::Success {
                plaintext,
                key: key.clone(),
            };
        }
    }

    debug!("dictionary exhausted after {} keys", tested);
    progress.report(Progress::Finished {
        label: &item.label,
        success: false,
    });
    Outcome::NotFound
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job::NoProgress;

    fn dict() -> Dictionary {
        Dictionary::from_words([
            "LEMON", "ORANGE", "ATTACK", "DAWN", "UNTIL", "THEN", "WAIT", "HERE",
        ])
    }

    #[test]
    fn test_recovers_dictionary_key() {
        let plain = "ATTACK AT DAWN THEN WAIT HERE UNTIL DAWN";
        let item = WorkItem::new("t", &cipher::encrypt(plain, "LEMON"));
        let params = ScoringParams {
            min_matches: 4,
            min_word_length: 4,
        };

        match run(&item, &dict(), params, &CancelToken::new(), &NoProgress) {
            Outcome::Success { plaintext, key } => {
                assert_eq!(key, "LEMON");
                assert_eq!(plaintext, plain);
            }
            other => panic!("expected success, got {:?}", other),
        }
    }

    #[test]
    fn test_exhausted_dictionary_is_not_found() {
        let item = WorkItem::new("t", "ZZZZZ QQQQQ XXXXX");
        let params = ScoringParams::default();
        let outcome = run(&item, &dict(), params, &CancelToken::new(), &NoProgress);
        assert_eq!(outcome, Outcome::NotFound);
    }

    #[test]
    fn test_cancelled_before_start() {
        let plain = "ATTACK AT DAWN THEN WAIT HERE UNTIL DAWN";
        let item = WorkItem::new("t", &cipher::encrypt(plain, "LEMON"));
        let token = CancelToken::new();
        token.cancel();

        let outcome = run(
            &item,
            &dict(),
            ScoringParams::default(),
            &token,
            &NoProgress,
        );
        assert_eq!(outcome, Outcome::Cancelled);
    }
}
