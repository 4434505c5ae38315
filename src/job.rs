use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::cipher;

/// One unit of cryptanalysis work.
///
/// The item is an immutable input: attacks read it and return an [`Outcome`]
/// instead of writing results back into it. Word-level scoring decrypts
/// `ciphertext` (punctuation preserved, so word boundaries survive), while
/// all statistics run on the `sanitized` projection.
#[derive(Debug, Clone)]
pub struct WorkItem {
    /// Caller-supplied identity, e.g. the source file name. Opaque here.
    pub label: String,
    /// Raw input uppercased, non-letters left in place.
    pub ciphertext: String,
    /// A-Z-only projection of the input, derived once at construction.
    pub sanitized: String,
}

impl WorkItem {
    pub fn new(label: impl Into<String>, raw: &str) -> Self {
        let ciphertext = raw.to_uppercase();
        let sanitized = cipher::sanitize(&ciphertext);
        Self {
            label: label.into(),
            ciphertext,
            sanitized,
        }
    }
}

/// Terminal result of one attack invocation against one item.
///
/// All three attacks report through this shape so callers can treat them
/// uniformly. `NotFound` and `Cancelled` are normal outcomes, not errors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    Success { plaintext: String, key: String },
    NotFound,
    Cancelled,
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success { .. })
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Outcome::Cancelled)
    }
}

/// Cooperative cancellation handle.
///
/// Cloned freely; attacks poll it at documented checkpoints (per dictionary
/// word, per enumerated key, per frequency-analysis phase) and return
/// [`Outcome::Cancelled`] rather than unwinding.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation. Safe to call from any thread, more than once.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

/// Progress events emitted while an attack runs.
///
/// Events borrow from the attack's working state; sinks that need to keep
/// data must copy it out.
#[derive(Debug, Clone, Copy)]
pub enum Progress<'a> {
    /// An attack began working on an item.
    Started { label: &'a str },
    /// A candidate key is being tested. `tested` counts candidates so far
    /// within the current invocation.
    TryingKey { key: &'a str, tested: u64 },
    /// Frequency analysis ranked a candidate key length.
    LengthRanked { length: usize, avg_ioc: f64 },
    /// The attack finished with the given outcome kind.
    Finished { label: &'a str, success: bool },
}

/// Receiver for [`Progress`] events.
///
/// Implementations must be cheap: `TryingKey` fires on the brute-force hot
/// path (throttled to every few thousand keys).
pub trait ProgressSink: Sync {
    fn report(&self, event: Progress<'_>);
}

/// Sink that discards every event.
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn report(&self, _event: Progress<'_>) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_work_item_sanitizes_once() {
        let item = WorkItem::new("note", "Lxfop v, efrnhr!");
        assert_eq!(item.ciphertext, "LXFOP V, EFRNHR!");
        assert_eq!(item.sanitized, "LXFOPVEFRNHR");
        assert_eq!(item.label, "note");
    }

    #[test]
    fn test_cancel_token_is_shared() {
        let token = CancelToken::new();
        let clone = token.clone();
        assert!(!clone.is_cancelled());
        token.cancel();
        assert!(clone.is_cancelled());
    }

    #[test]
    fn test_outcome_predicates() {
        let ok = Outcome::Success {
            plaintext: "HI".into(),
            key: "A".into(),
        };
        assert!(ok.is_success());
        assert!(!ok.is_cancelled());
        assert!(Outcome::Cancelled.is_cancelled());
        assert!(!Outcome::NotFound.is_success());
    }
}
