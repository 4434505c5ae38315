use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::brute_force::MAX_ODOMETER_LENGTH;
use crate::frequency::FrequencyParams;
use crate::scorer::ScoringParams;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub scoring: ScoringConfig,
    pub dictionary: DictionaryConfig,
    pub brute_force: BruteForceConfig,
    pub frequency: FrequencyConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Word matches required before a decryption counts as language.
    pub min_matches: usize,

    /// Minimum token length considered a candidate match. Short tokens
    /// ("A", "IT") match gibberish far too often.
    pub min_word_length: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DictionaryConfig {
    /// Path to the word list, one word per line.
    pub wordlist: String,

    /// Cap on loaded words. Mostly useful with very large lists.
    #[serde(default = "default_wordlist_limit")]
    pub wordlist_limit: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BruteForceConfig {
    /// Shortest key length to enumerate.
    pub min_key_length: usize,

    /// Longest key length to enumerate. The keyspace is 26^length, so every
    /// increment multiplies the sweep by 26.
    pub max_key_length: usize,

    /// Worker threads for the partitioned single-length sweep.
    #[serde(default = "default_workers")]
    pub workers: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrequencyConfig {
    /// Largest key length hypothesized during period estimation. Can be
    /// fairly high without slowing things down noticeably.
    pub max_key_length: usize,

    /// How many top-ranked key lengths get full per-coset shift rankings.
    #[serde(default = "default_ranked_lengths")]
    pub ranked_lengths: usize,

    /// How many top-ranked key lengths have their candidate key tested.
    #[serde(default = "default_tried_lengths")]
    pub tried_lengths: usize,
}

fn default_wordlist_limit() -> usize {
    1_000_000
}

fn default_workers() -> usize {
    1
}

fn default_ranked_lengths() -> usize {
    5
}

fn default_tried_lengths() -> usize {
    3
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content).context("Failed to parse TOML config")?;
        config.validate()?;

        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.scoring.min_matches == 0 {
            anyhow::bail!("scoring.min_matches must be >= 1");
        }
        if self.scoring.min_word_length == 0 {
            anyhow::bail!("scoring.min_word_length must be >= 1");
        }

        if self.dictionary.wordlist.is_empty() {
            anyhow::bail!("dictionary.wordlist path is required");
        }
        if self.dictionary.wordlist_limit == 0 {
            anyhow::bail!("dictionary.wordlist_limit must be >= 1");
        }

        if self.brute_force.min_key_length == 0 {
            anyhow::bail!("brute_force.min_key_length must be >= 1");
        }
        if self.brute_force.min_key_length > self.brute_force.max_key_length {
            anyhow::bail!(
                "brute_force.min_key_length ({}) exceeds max_key_length ({})",
                self.brute_force.min_key_length,
                self.brute_force.max_key_length
            );
        }
        if self.brute_force.max_key_length > MAX_ODOMETER_LENGTH {
            anyhow::bail!(
                "brute_force.max_key_length is too high (>{})",
                MAX_ODOMETER_LENGTH
            );
        }
        if self.brute_force.workers == 0 {
            anyhow::bail!("brute_force.workers must be >= 1");
        }

        if self.frequency.max_key_length < 2 {
            anyhow::bail!("frequency.max_key_length must be >= 2");
        }
        if self.frequency.tried_lengths == 0 {
            anyhow::bail!("frequency.tried_lengths must be >= 1");
        }
        if self.frequency.tried_lengths > self.frequency.ranked_lengths {
            anyhow::bail!(
                "frequency.tried_lengths ({}) exceeds ranked_lengths ({})",
                self.frequency.tried_lengths,
                self.frequency.ranked_lengths
            );
        }

        Ok(())
    }

    pub fn scoring_params(&self) -> ScoringParams {
        ScoringParams {
            min_matches: self.scoring.min_matches,
            min_word_length: self.scoring.min_word_length,
        }
    }

    pub fn frequency_params(&self) -> FrequencyParams {
        FrequencyParams {
            max_key_length: self.frequency.max_key_length,
            ranked_lengths: self.frequency.ranked_lengths,
            tried_lengths: self.frequency.tried_lengths,
        }
    }

    /// Create default configuration text
    pub fn default_toml() -> String {
        r#"
[scoring]
min_matches = 4
min_word_length = 4

[dictionary]
wordlist = "words.txt"
wordlist_limit = 1_000_000

[brute_force]
min_key_length = 2
max_key_length = 5
workers = 1

[frequency]
max_key_length = 15
ranked_lengths = 5
tried_lengths = 3
"#
        .to_string()
    }

    /// Save default config to file
    pub fn save_default(path: impl AsRef<Path>) -> Result<()> {
        fs::write(path.as_ref(), Self::default_toml()).context("Failed to write default config")?;
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            scoring: ScoringConfig {
                min_matches: 4,
                min_word_length: 4,
            },
            dictionary: DictionaryConfig {
                wordlist: "words.txt".to_string(),
                wordlist_limit: 1_000_000,
            },
            brute_force: BruteForceConfig {
                min_key_length: 2,
                max_key_length: 5,
                workers: 1,
            },
            frequency: FrequencyConfig {
                max_key_length: 15,
                ranked_lengths: 5,
                tried_lengths: 3,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.brute_force.max_key_length, 5);
        assert_eq!(config.frequency.max_key_length, 15);
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let toml = toml::to_string(&config).unwrap();
        let parsed: Config = toml::from_str(&toml).unwrap();
        assert_eq!(parsed.scoring.min_matches, config.scoring.min_matches);
        assert_eq!(
            parsed.frequency.tried_lengths,
            config.frequency.tried_lengths
        );
    }

    #[test]
    fn test_validate_rejects_inverted_length_range() {
        let mut config = Config::default();
        config.brute_force.min_key_length = 6;
        config.brute_force.max_key_length = 3;
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("min_key_length"), "got err: {}", err);
    }

    #[test]
    fn test_validate_rejects_oversized_keyspace() {
        let mut config = Config::default();
        config.brute_force.max_key_length = 20;
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("too high"), "got err: {}", err);
    }

    #[test]
    fn test_validate_rejects_tried_above_ranked() {
        let mut config = Config::default();
        config.frequency.tried_lengths = 8;
        config.frequency.ranked_lengths = 5;
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("tried_lengths"), "got err: {}", err);
    }

    #[test]
    fn test_validate_rejects_zero_thresholds() {
        let mut config = Config::default();
        config.scoring.min_matches = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_default_toml_parses() {
        let parsed: Config = toml::from_str(&Config::default_toml()).unwrap();
        assert!(parsed.validate().is_ok());
    }
}
