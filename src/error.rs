use thiserror::Error;

// ─── Top-level error hierarchy ───────────────────────────────────────────────

/// Structured error hierarchy for Scarline.
///
/// Each subsystem defines its own error variant. Library callers can match on
/// these to decide recovery strategy; internal code continues to use
/// `anyhow::Result` for ad-hoc context chains.
#[derive(Debug, Error)]
pub enum ScarlineError {
    // ── Config ───────────────────────────────────────────────────────────
    #[error("config: {0}")]
    Config(#[from] ConfigError),

    // ── Ledger / ScoreStore ─────────────────────────────────────────────
    #[error("ledger: {0}")]
    Ledger(#[from] LedgerError),

    // ── Assessor ────────────────────────────────────────────────────────
    #[error("assessor: {0}")]
    Assessor(#[from] AssessError),

    // ── Jury ────────────────────────────────────────────────────────────
    #[error("jury: {0}")]
    Jury(#[from] JuryError),

    // ── Generic fallthrough (wraps anyhow for interop) ──────────────────
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ─── Config errors ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load config: {0}")]
    Load(String),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

// ─── Ledger errors ──────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum LedgerError {
    /// All write attempts failed. The entry was NOT recorded; the ledger is
    /// unchanged. Callers treat this as a reported condition, not a crash.
    #[error("ledger write failed after {attempts} attempts: {last_error}")]
    WriteExhausted { attempts: u32, last_error: String },

    #[error("entry serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

// ─── Assessor errors ────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum AssessError {
    #[error("assessor request failed: {message}")]
    Request { message: String },

    /// The backend answered but its payload did not match the Vote schema.
    #[error("vote parse failed: {message}")]
    Parse { message: String },
}

// ─── Jury errors ────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum JuryError {
    /// Every seat on the panel failed or timed out. There is no verdict to
    /// aggregate; the caller decides whether to poll again.
    #[error("no quorum: all {panel_size} panel calls failed")]
    NoQuorum { panel_size: usize },
}

// ─── Convenience re-exports ─────────────────────────────────────────────────

/// Shorthand result type for the crate.
pub type Result<T> = std::result::Result<T, ScarlineError>;
