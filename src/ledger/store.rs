use crate::error::LedgerError;
use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

/// One recorded deduction from the safety budget.
///
/// Entries are write-once: the store appends them and never edits or removes
/// them. Field names are the on-disk wire format, one JSON object per line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CostEntry {
    pub prompt: String,
    pub safety_cost: f64,
    pub reasoning: String,
    pub timestamp: String,
}

impl CostEntry {
    pub fn new(prompt: impl Into<String>, safety_cost: f64, reasoning: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            safety_cost,
            reasoning: reasoning.into(),
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

/// Durable, append-only cost log.
///
/// Implementations own their storage medium; callers never assume a location.
/// Reads replay the log and must skip unparseable lines rather than fail,
/// so a crash mid-write never poisons the score.
#[async_trait]
pub trait ScoreStore: Send + Sync {
    /// Remaining budget: `max(0, initial − Σ safety_cost)`. No side effects.
    fn read_score(&self) -> Result<f64, LedgerError>;

    /// All syntactically valid entries, in write order.
    fn read_entries(&self) -> Result<Vec<CostEntry>, LedgerError>;

    /// Durably append one entry. On exhausted retries the entry is NOT
    /// recorded and `WriteExhausted` is returned; prior content is untouched
    /// either way.
    async fn append(&self, entry: &CostEntry) -> Result<(), LedgerError>;
}

/// Bounded retry with a fixed delay between attempts.
///
/// Absorbs transient contention from concurrent writers on the same ledger
/// without letting an unavailable medium hang the caller forever.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            delay: Duration::from_secs(1),
        }
    }
}

/// File-backed store: newline-delimited JSON, one `CostEntry` per line.
///
/// Appends go through `O_APPEND` so each entry lands atomically at the end of
/// the file even with concurrent writers; nothing ever seeks backwards.
pub struct JsonlScoreStore {
    path: PathBuf,
    initial_budget: f64,
    retry: RetryPolicy,
}

impl JsonlScoreStore {
    pub fn new(path: impl Into<PathBuf>, initial_budget: f64) -> Self {
        Self {
            path: path.into(),
            initial_budget,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn replay(&self) -> Result<Vec<CostEntry>, LedgerError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let contents = std::fs::read_to_string(&self.path)?;
        let mut entries = Vec::new();
        for (line_no, line) in contents.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<CostEntry>(line) {
                Ok(entry) => entries.push(entry),
                Err(error) => {
                    // Tolerated: a torn line from a crash mid-write must not
                    // abort the replay or count toward the damage total.
                    debug!(line = line_no + 1, %error, "skipping malformed ledger line");
                }
            }
        }
        Ok(entries)
    }

    fn append_line(&self, line: &str) -> std::io::Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(line.as_bytes())?;
        file.flush()
    }
}

#[async_trait]
impl ScoreStore for JsonlScoreStore {
    fn read_score(&self) -> Result<f64, LedgerError> {
        let total_damage: f64 = self.replay()?.iter().map(|e| e.safety_cost).sum();
        Ok((self.initial_budget - total_damage).max(0.0))
    }

    fn read_entries(&self) -> Result<Vec<CostEntry>, LedgerError> {
        self.replay()
    }

    async fn append(&self, entry: &CostEntry) -> Result<(), LedgerError> {
        let mut line = serde_json::to_string(entry)?;
        line.push('\n');

        let mut last_error = String::new();
        for attempt in 1..=self.retry.max_attempts {
            match self.append_line(&line) {
                Ok(()) => {
                    debug!(cost = entry.safety_cost, "ledger entry recorded");
                    return Ok(());
                }
                Err(error) => {
                    warn!(
                        attempt,
                        max = self.retry.max_attempts,
                        %error,
                        "ledger busy, retrying append"
                    );
                    last_error = error.to_string();
                    if attempt < self.retry.max_attempts {
                        tokio::time::sleep(self.retry.delay).await;
                    }
                }
            }
        }

        Err(LedgerError::WriteExhausted {
            attempts: self.retry.max_attempts,
            last_error,
        })
    }
}
