use anyhow::{Context, Result};
use std::collections::hash_set;
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::info;

/// In-memory word list used both as the candidate key set for the
/// dictionary attack and as the reference set for the word-match scorer.
///
/// Words are uppercased and deduplicated on load; iteration order is the
/// set's natural (unspecified) order.
#[derive(Debug, Clone, Default)]
pub struct Dictionary {
    words: HashSet<String>,
}

impl Dictionary {
    /// Loads a one-word-per-line file. Lines are trimmed, blanks skipped,
    /// everything uppercased; duplicates collapse.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Self::load_limited(path, usize::MAX)
    }

    /// Like [`Dictionary::load`], but stops after `limit` usable lines.
    pub fn load_limited(path: impl AsRef<Path>, limit: usize) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("failed to open word list: {}", path.display()))?;

        let mut words = HashSet::new();
        for line in BufReader::new(file).lines() {
            let line = line?;
            let trimmed = line.trim();
            if !trimmed.is_empty() {
                words.insert(trimmed.to_uppercase());
            }
            if words.len() >= limit {
                break;
            }
        }

        if words.is_empty() {
            anyhow::bail!("word list is empty: {}", path.display());
        }

        info!("Loaded {} words from {}", words.len(), path.display());
        Ok(Self { words })
    }

    /// Builds a dictionary from in-memory words. Mostly used by tests.
    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            words: words
                .into_iter()
                .map(|w| w.as_ref().trim().to_uppercase())
                .filter(|w| !w.is_empty())
                .collect(),
        }
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(word)
    }

    /// Iterates the words in the set's natural order.
    pub fn words(&self) -> hash_set::Iter<'_, String> {
        self.words.iter()
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}
