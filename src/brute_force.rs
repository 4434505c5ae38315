use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info};

use crate::cipher::{self, ALPHABET};
use crate::dictionary::Dictionary;
use crate::job::{CancelToken, Outcome, Progress, ProgressSink, WorkItem};
use crate::scorer::{self, ScoringParams};

/// Progress events on the hot path are throttled to once per this many keys.
const PROGRESS_INTERVAL: u64 = 4096;

/// Longest key length whose keyspace (26^len) still fits in a u64.
pub const MAX_ODOMETER_LENGTH: usize = 13;

/// Number of keys of the given length.
///
/// # Panics
///
/// Panics if `len` exceeds [`MAX_ODOMETER_LENGTH`].
pub fn keyspace(len: usize) -> u64 {
    assert!(len <= MAX_ODOMETER_LENGTH, "keyspace overflows u64");
    26u64.pow(len as u32)
}

/// Iterative base-26 counter over fixed-length keys.
///
/// Counts through the keyspace in lexicographic order (`AAA`, `AAB`, ...,
/// `ZZZ`): the rightmost position ticks fastest and carries leftward. An
/// odometer can start anywhere in the keyspace, which is what makes the
/// sweep resumable and partitionable across workers.
#[derive(Debug, Clone)]
pub struct KeyOdometer {
    digits: Vec<u8>,
}

impl KeyOdometer {
    /// Starts at `"AA...A"` of the given length.
    ///
    /// # Panics
    ///
    /// Panics on a zero length or one exceeding [`MAX_ODOMETER_LENGTH`].
    pub fn new(len: usize) -> Self {
        assert!(len > 0, "key length must be positive");
        assert!(len <= MAX_ODOMETER_LENGTH, "key length too large");
        Self {
            digits: vec![b'A'; len],
        }
    }

    /// Resumes from an arbitrary key of uppercase letters.
    ///
    /// # Panics
    ///
    /// Panics if `key` is empty, too long, or contains anything but A-Z.
    pub fn starting_at(key: &str) -> Self {
        assert!(!key.is_empty(), "start key must not be empty");
        assert!(key.len() <= MAX_ODOMETER_LENGTH, "start key too long");
        assert!(
            key.bytes().all(|b| b.is_ascii_uppercase()),
            "start key must be uppercase A-Z"
        );
        Self {
            digits: key.as_bytes().to_vec(),
        }
    }

    /// The key at numeric offset `index` within the keyspace of `len`.
    /// Offset 0 is `"AA...A"`.
    pub fn key_at(len: usize, index: u64) -> Self {
        assert!(index < keyspace(len), "index outside keyspace");
        let mut digits = vec![b'A'; len];
        let mut rest = index;
        for pos in (0..len).rev() {
            digits[pos] = ALPHABET[(rest % 26) as usize];
            rest /= 26;
        }
        Self { digits }
    }

    /// Current key. Always valid uppercase A-Z.
    pub fn as_str(&self) -> &str {
        // digits are only ever set from ALPHABET
        std::str::from_utf8(&self.digits).unwrap()
    }

    /// Ticks to the next key. Returns false once the keyspace is exhausted
    /// (after `"ZZ...Z"`), leaving the odometer at `"AA...A"`.
    pub fn advance(&mut self) -> bool {
        for pos in (0..self.digits.len()).rev() {
            if self.digits[pos] < b'Z' {
                self.digits[pos] += 1;
                return true;
            }
            self.digits[pos] = b'A';
        }
        false
    }
}

/// Exhaustive key search over a range of key lengths.
///
/// Lengths are tried ascending, each enumerated lexicographically from
/// `"AA...A"`. Cancellation is checked once per candidate key, so the
/// worst-case cancellation latency is a single decrypt-and-score;
/// a cancellation aborts the whole multi-length sweep.
pub fn run(
    item: &WorkItem,
    dict: &Dictionary,
    min_key_length: usize,
    max_key_length: usize,
    params: ScoringParams,
    cancel: &CancelToken,
    progress: &dyn ProgressSink,
) -> Outcome {
    progress.report(Progress::Started { label: &item.label });

    let mut tested = 0u64;
    for len in min_key_length..=max_key_length {
        info!("brute force: starting key length {}", len);
        match sweep_length(
            item,
            dict,
            KeyOdometer::new(len),
            None,
            params,
            cancel,
            progress,
            &mut tested,
        ) {
            SweepResult::Found(outcome) => {
                progress.report(Progress::Finished {
                    label: &item.label,
                    success: true,
                });
                return outcome;
            }
            SweepResult::Cancelled => return Outcome::Cancelled,
            SweepResult::Exhausted => {}
        }
    }

    debug!("brute force exhausted after {} keys", tested);
    progress.report(Progress::Finished {
        label: &item.label,
        success: false,
    });
    Outcome::NotFound
}

/// Resumes a single-length sweep from an arbitrary start key and runs it to
/// the end of that keyspace.
pub fn run_from(
    item: &WorkItem,
    dict: &Dictionary,
    start_key: &str,
    params: ScoringParams,
    cancel: &CancelToken,
    progress: &dyn ProgressSink,
) -> Outcome {
    let mut tested = 0u64;
    match sweep_length(
        item,
        dict,
        KeyOdometer::starting_at(start_key),
        None,
        params,
        cancel,
        progress,
        &mut tested,
    ) {
        SweepResult::Found(outcome) => outcome,
        SweepResult::Cancelled => Outcome::Cancelled,
        SweepResult::Exhausted => Outcome::NotFound,
    }
}

/// Splits one key length's keyspace into contiguous slices and sweeps them
/// on scoped worker threads. First passing key wins; all other workers stop
/// at their next candidate via the shared found flag.
pub fn run_partitioned(
    item: &WorkItem,
    dict: &Dictionary,
    key_length: usize,
    workers: usize,
    params: ScoringParams,
    cancel: &CancelToken,
    progress: &dyn ProgressSink,
) -> Outcome {
    assert!(workers > 0, "worker count must be positive");

    let total = keyspace(key_length);
    let workers = workers.min(total as usize).max(1) as u64;
    let slice = total / workers;

    let found = AtomicBool::new(false);
    let result: Mutex<Option<Outcome>> = Mutex::new(None);

    std::thread::scope(|scope| {
        for w in 0..workers {
            let start = w * slice;
            // Last worker absorbs the remainder of the division
            let count = if w == workers - 1 { total - start } else { slice };
            let found = &found;
            let result = &result;

            scope.spawn(move || {
                let mut tested = 0u64;
                let outcome = sweep_length(
                    item,
                    dict,
                    KeyOdometer::key_at(key_length, start),
                    Some((count, found)),
                    params,
                    cancel,
                    progress,
                    &mut tested,
                );
                if let SweepResult::Found(found_outcome) = outcome {
                    found.store(true, Ordering::Relaxed);
                    let mut slot = result.lock();
                    // First result wins; later finishers are discarded
                    if slot.is_none() {
                        *slot = Some(found_outcome);
                    }
                }
            });
        }
    });

    if let Some(outcome) = result.lock().take() {
        return outcome;
    }
    if cancel.is_cancelled() {
        return Outcome::Cancelled;
    }
    Outcome::NotFound
}

enum SweepResult {
    Found(Outcome),
    Cancelled,
    Exhausted,
}

/// Enumerates one length's keys from the odometer's current position.
/// `slice` bounds the number of candidates (for partitioned sweeps) and
/// carries the shared found flag that stops losing workers early.
#[allow(clippy::too_many_arguments)]
fn sweep_length(
    item: &WorkItem,
    dict: &Dictionary,
    mut odometer: KeyOdometer,
    slice: Option<(u64, &AtomicBool)>,
    params: ScoringParams,
    cancel: &CancelToken,
    progress: &dyn ProgressSink,
    tested: &mut u64,
) -> SweepResult {
    let mut remaining = slice.as_ref().map(|(count, _)| *count);

    loop {
        if cancel.is_cancelled() {
            debug!("brute force cancelled at key {}", odometer.as_str());
            return SweepResult::Cancelled;
        }
        if let Some((_, found)) = slice {
            if found.load(Ordering::Relaxed) {
                return SweepResult::Exhausted;
            }
        }
        if let Some(left) = remaining.as_mut() {
            if *left == 0 {
                return SweepResult::Exhausted;
            }
            *left -= 1;
        }

        *tested += 1;
        if *tested % PROGRESS_INTERVAL == 1 {
            progress.report(Progress::TryingKey {
                key: odometer.as_str(),
                tested: *tested,
            });
        }

        let plaintext = cipher::decrypt(&item.ciphertext, odometer.as_str());
        if scorer::looks_like_language(&plaintext, dict, params) {
            return SweepResult::Found(Outcome::Success {
                plaintext,
                key: odometer.as_str().to_string(),
            });
        }

        if !odometer.advance() {
            return SweepResult::Exhausted;
        }
    }
}
