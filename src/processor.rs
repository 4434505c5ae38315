use serde::Serialize;
use std::time::Instant;
use tracing::{info, warn};

use crate::brute_force;
use crate::config::Config;
use crate::dictionary::Dictionary;
use crate::dictionary_attack;
use crate::frequency;
use crate::job::{CancelToken, Outcome, ProgressSink, WorkItem};
use crate::stats::Statistics;

/// Which attack strategy a batch runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttackKind {
    /// Try every dictionary word as the key.
    Dictionary,
    /// Exhaustive key enumeration over the configured length range.
    BruteForce,
    /// IoC period estimation plus chi-squared key recovery.
    Frequency,
    /// Escalate per item: dictionary, then frequency, then brute force.
    Auto,
}

impl AttackKind {
    pub fn name(&self) -> &'static str {
        match self {
            AttackKind::Dictionary => "dictionary",
            AttackKind::BruteForce => "brute-force",
            AttackKind::Frequency => "frequency",
            AttackKind::Auto => "auto",
        }
    }
}

/// Per-item record returned to the caller once an attack finishes.
#[derive(Debug, Clone, Serialize)]
pub struct ItemReport {
    pub label: String,
    #[serde(flatten)]
    pub outcome: Outcome,
    pub elapsed_secs: f64,
}

/// Runs one attack invocation against one item.
pub fn run_attack(
    kind: AttackKind,
    item: &WorkItem,
    dict: &Dictionary,
    config: &Config,
    cancel: &CancelToken,
    progress: &dyn ProgressSink,
) -> Outcome {
    let scoring = config.scoring_params();
    match kind {
        AttackKind::Dictionary => dictionary_attack::run(item, dict, scoring, cancel, progress),
        AttackKind::BruteForce => {
            if config.brute_force.workers > 1 {
                // Partition each length's keyspace across worker threads
                for len in config.brute_force.min_key_length..=config.brute_force.max_key_length {
                    let outcome = brute_force::run_partitioned(
                        item,
                        dict,
                        len,
                        config.brute_force.workers,
                        scoring,
                        cancel,
                        progress,
                    );
                    if !matches!(outcome, Outcome::NotFound) {
                        return outcome;
                    }
                }
                Outcome::NotFound
            } else {
                brute_force::run(
                    item,
                    dict,
                    config.brute_force.min_key_length,
                    config.brute_force.max_key_length,
                    scoring,
                    cancel,
                    progress,
                )
            }
        }
        AttackKind::Frequency => frequency::run(
            item,
            dict,
            config.frequency_params(),
            scoring,
            cancel,
            progress,
        ),
        AttackKind::Auto => {
            // Cheapest strategies first; brute force is the last resort.
            let chain = [
                AttackKind::Dictionary,
                AttackKind::Frequency,
                AttackKind::BruteForce,
            ];
            for (i, kind) in chain.iter().enumerate() {
                let outcome = run_attack(*kind, item, dict, config, cancel, progress);
                if !matches!(outcome, Outcome::NotFound) {
                    return outcome;
                }
                if let Some(next) = chain.get(i + 1) {
                    info!(
                        "{}: {} attack exhausted, escalating to {}",
                        item.label,
                        kind.name(),
                        next.name()
                    );
                }
            }
            Outcome::NotFound
        }
    }
}

/// Processes a batch of items sequentially with the chosen attack.
///
/// A NotFound item never stops the batch; a cancellation stops the current
/// item and drops the remaining queue, mirroring how an interactive caller
/// treats a stop request.
pub fn run_batch(
    items: &[WorkItem],
    kind: AttackKind,
    dict: &Dictionary,
    config: &Config,
    cancel: &CancelToken,
    progress: &dyn ProgressSink,
    stats: &Statistics,
) -> Vec<ItemReport> {
    let mut reports = Vec::with_capacity(items.len());

    for item in items {
        info!("{}: starting {} attack", item.label, kind.name());
        let started = Instant::now();
        let outcome = run_attack(kind, item, dict, config, cancel, progress);
        let elapsed_secs = started.elapsed().as_secs_f64();

        match &outcome {
            Outcome::Success { key, .. } => {
                stats.increment_solved();
                info!("{}: solved with key {} in {:.2}s", item.label, key, elapsed_secs);
            }
            Outcome::NotFound => {
                info!("{}: search space exhausted, no key found", item.label);
            }
            Outcome::Cancelled => {
                warn!("{}: cancelled, dropping remaining queue", item.label);
            }
        }

        let cancelled = outcome.is_cancelled();
        reports.push(ItemReport {
            label: item.label.clone(),
            outcome,
            elapsed_secs,
        });
        if cancelled {
            break;
        }
    }

    reports
}
