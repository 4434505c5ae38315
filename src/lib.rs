// lib.rs - Vigenere cryptanalysis toolkit library

pub mod brute_force;
pub mod cipher;
pub mod config;
pub mod dictionary;
pub mod dictionary_attack;
pub mod frequency;
pub mod job;
pub mod processor;
pub mod scorer;
pub mod stats;

// Re-exports for convenience
pub use config::Config;
pub use dictionary::Dictionary;
pub use frequency::{FrequencyParams, LengthHypothesis};
pub use job::{CancelToken, NoProgress, Outcome, Progress, ProgressSink, WorkItem};
pub use processor::{AttackKind, ItemReport};
pub use scorer::ScoringParams;
pub use stats::Statistics;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Error types
pub mod error {
    use thiserror::Error;

    #[derive(Error, Debug)]
    pub enum BreakerError {
        #[error("Configuration error: {0}")]
        Config(String),

        #[error("Dictionary error: {0}")]
        Dictionary(String),

        #[error("IO error: {0}")]
        Io(#[from] std::io::Error),

        #[error("JSON error: {0}")]
        Json(#[from] serde_json::Error),
    }

    pub type Result<T> = std::result::Result<T, BreakerError>;
}

/// Utilities module
pub mod utils {

    /// Format a count with thousands separators
    pub fn format_number(n: u64) -> String {
        let digits = n.to_string();
        let mut out = String::with_capacity(digits.len() + digits.len() / 3);
        let offset = digits.len() % 3;
        for (i, c) in digits.chars().enumerate() {
            if i > 0 && (i + 3 - offset) % 3 == 0 {
                out.push(',');
            }
            out.push(c);
        }
        out
    }

    /// Format a duration in human-readable units
    pub fn format_duration(seconds: f64) -> String {
        if seconds < 60.0 {
            format!("{:.1}s", seconds)
        } else if seconds < 3600.0 {
            format!("{:.1}m", seconds / 60.0)
        } else if seconds < 86400.0 {
            format!("{:.1}h", seconds / 3600.0)
        } else {
            format!("{:.1}d", seconds / 86400.0)
        }
    }

    /// Estimate time remaining for a keyspace sweep at the observed rate
    pub fn estimate_remaining(tested: u64, total: u64, rate: f64) -> String {
        if rate <= 0.0 {
            return "unknown".to_string();
        }
        let remaining = total.saturating_sub(tested) as f64;
        format_duration(remaining / rate)
    }
}
