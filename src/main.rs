use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

use vigenere_breaker::error::BreakerError;
use vigenere_breaker::job::{CancelToken, Progress, ProgressSink, WorkItem};
use vigenere_breaker::processor::{self, AttackKind, ItemReport};
use vigenere_breaker::stats::Statistics;
use vigenere_breaker::{brute_force, utils, Config, Dictionary};

/// Vigenere ciphertext breaker
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Ciphertext files to attack
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Config file path
    #[arg(short, long, default_value = "vigcrack.toml")]
    config: String,

    /// Word list path (overrides config)
    #[arg(short, long)]
    wordlist: Option<String>,

    /// Attack strategy
    #[arg(short, long, value_enum, default_value_t = Attack::Auto)]
    attack: Attack,

    /// Resume a brute-force sweep from this key (single length, first file)
    #[arg(long)]
    start_key: Option<String>,

    /// Write the default config to the --config path and exit
    #[arg(long)]
    init_config: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Attack {
    Dictionary,
    BruteForce,
    Frequency,
    Auto,
}

impl From<Attack> for AttackKind {
    fn from(attack: Attack) -> Self {
        match attack {
            Attack::Dictionary => AttackKind::Dictionary,
            Attack::BruteForce => AttackKind::BruteForce,
            Attack::Frequency => AttackKind::Frequency,
            Attack::Auto => AttackKind::Auto,
        }
    }
}

/// Progress sink that feeds the terminal bar and the shared counters.
struct BarSink {
    bar: indicatif::ProgressBar,
    stats: Arc<Statistics>,
    last_tested: std::sync::atomic::AtomicU64,
}

impl ProgressSink for BarSink {
    fn report(&self, event: Progress<'_>) {
        use std::sync::atomic::Ordering;

        match event {
            Progress::Started { label } => {
                self.bar.set_prefix(label.to_string());
                self.last_tested.store(0, Ordering::Relaxed);
            }
            Progress::TryingKey { key, tested } => {
                self.bar.set_message(format!("testing {}", key));
                self.bar.set_position(tested);
                // Events are throttled on the brute-force hot path, so the
                // counter advances by the delta since the last event.
                let last = self.last_tested.swap(tested, Ordering::Relaxed);
                let delta = if tested > last { tested - last } else { 1 };
                self.stats.add_keys_tested(delta);
            }
            Progress::LengthRanked { length, avg_ioc } => {
                self.bar
                    .set_message(format!("length {} IoC {:.4}", length, avg_ioc));
            }
            Progress::Finished { .. } => {
                self.bar.set_message(String::new());
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(args.verbose);

    if args.init_config {
        Config::save_default(&args.config)?;
        info!("Wrote default config to {}", args.config);
        return Ok(());
    }

    let config = load_config(&args.config)?;
    let wordlist = args
        .wordlist
        .as_deref()
        .unwrap_or(&config.dictionary.wordlist);
    let dict = Arc::new(Dictionary::load_limited(
        wordlist,
        config.dictionary.wordlist_limit,
    )?);
    info!("Loaded {} dictionary entries", dict.len());

    let items = load_items(&args.files)?;
    info!("Loaded {} ciphertext file(s)", items.len());

    let start_key = match &args.start_key {
        Some(key) => {
            anyhow::ensure!(
                !key.is_empty() && key.chars().all(|c| c.is_ascii_alphabetic()),
                "--start-key must contain only letters"
            );
            anyhow::ensure!(
                key.len() <= brute_force::MAX_ODOMETER_LENGTH,
                "--start-key longer than {} letters",
                brute_force::MAX_ODOMETER_LENGTH
            );
            Some(key.to_uppercase())
        }
        None => None,
    };

    // Ctrl-C requests cooperative cancellation; attacks stop at their next
    // checkpoint.
    let cancel = CancelToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Cancellation requested, stopping at next checkpoint");
                cancel.cancel();
            }
        });
    }

    let stats = Arc::new(Statistics::new());
    let bar = indicatif::ProgressBar::new_spinner();
    bar.set_style(
        indicatif::ProgressStyle::default_spinner()
            .template("{spinner:.green} {prefix} [{elapsed_precise}] {pos} keys {msg}")
            .unwrap(),
    );

    let reports = {
        let config = config.clone();
        let dict = Arc::clone(&dict);
        let stats = Arc::clone(&stats);
        let cancel = cancel.clone();
        let kind = AttackKind::from(args.attack);
        let sink = BarSink {
            bar: bar.clone(),
            stats: Arc::clone(&stats),
            last_tested: std::sync::atomic::AtomicU64::new(0),
        };

        tokio::task::spawn_blocking(move || {
            if let Some(start_key) = start_key {
                resume_sweep(&items, &start_key, &dict, &config, &cancel, &sink, &stats)
            } else {
                processor::run_batch(&items, kind, &dict, &config, &cancel, &sink, &stats)
            }
        })
        .await
        .context("attack task panicked")?
    };

    bar.finish_and_clear();
    print_reports(&reports)?;

    info!(
        "Tested {} keys in {} ({:.0} keys/s), solved {} item(s)",
        utils::format_number(stats.keys_tested()),
        utils::format_duration(stats.elapsed_secs()),
        stats.rate(),
        stats.items_solved()
    );

    Ok(())
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };

    tracing_subscriber::fmt()
        .with_env_filter(level)
        .with_target(false)
        .init();
}

/// Loads the config file, falling back to defaults when it is absent.
fn load_config(path: &str) -> Result<Config> {
    if Path::new(path).exists() {
        let config = Config::load(path)?;
        info!("Configuration loaded from: {}", path);
        Ok(config)
    } else {
        info!("No config at {}, using defaults", path);
        Ok(Config::default())
    }
}

/// Reads each ciphertext file into a work item labelled by file name.
fn load_items(files: &[PathBuf]) -> Result<Vec<WorkItem>> {
    let mut items = Vec::with_capacity(files.len());
    for path in files {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read ciphertext file: {}", path.display()))?;
        let label = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        items.push(WorkItem::new(label, &raw));
    }
    Ok(items)
}

/// Resumes a single-length brute-force sweep from `start_key` against the
/// first item only; the remaining keyspace of that length is covered.
fn resume_sweep(
    items: &[WorkItem],
    start_key: &str,
    dict: &Dictionary,
    config: &Config,
    cancel: &CancelToken,
    sink: &dyn ProgressSink,
    stats: &Statistics,
) -> Vec<ItemReport> {
    let item = &items[0];
    if items.len() > 1 {
        warn!(
            "--start-key resumes a single sweep; ignoring {} other file(s)",
            items.len() - 1
        );
    }
    info!(
        "Resuming brute force for {} at key {} (keyspace {} at this length)",
        item.label,
        start_key,
        utils::format_number(brute_force::keyspace(start_key.len()))
    );

    let started = std::time::Instant::now();
    let outcome = brute_force::run_from(
        item,
        dict,
        start_key,
        config.scoring_params(),
        cancel,
        sink,
    );
    if outcome.is_success() {
        stats.increment_solved();
    }
    vec![ItemReport {
        label: item.label.clone(),
        outcome,
        elapsed_secs: started.elapsed().as_secs_f64(),
    }]
}

/// Prints a human summary per item plus one JSON line per solved item.
fn print_reports(reports: &[ItemReport]) -> std::result::Result<(), BreakerError> {
    use vigenere_breaker::Outcome;

    for report in reports {
        match &report.outcome {
            Outcome::Success { plaintext, key } => {
                println!("=== {} ===", report.label);
                println!("key: {}", key);
                println!("{}", plaintext);

                let line = serde_json::json!({
                    "timestamp": chrono::Utc::now().to_rfc3339(),
                    "report": report,
                });
                println!("{}", serde_json::to_string(&line)?);
            }
            Outcome::NotFound => {
                println!("=== {} ===", report.label);
                println!("no key found (searched {:.1}s)", report.elapsed_secs);
            }
            Outcome::Cancelled => {
                println!("=== {} ===", report.label);
                println!("cancelled");
            }
        }
    }
    Ok(())
}
