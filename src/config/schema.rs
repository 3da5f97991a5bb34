use crate::error::ConfigError;
use anyhow::{Context, Result};
use directories::UserDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

// ── Top-level config ──────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Path to config.toml - computed from home, not serialized
    #[serde(skip)]
    pub config_path: PathBuf,
    /// Workspace directory (ledger lives here by default) - computed, not serialized
    #[serde(skip)]
    pub workspace_dir: PathBuf,

    #[serde(default)]
    pub budget: BudgetConfig,

    #[serde(default)]
    pub jury: JuryConfig,

    #[serde(default)]
    pub ledger: LedgerConfig,

    #[serde(default)]
    pub assessor: AssessorConfig,
}

// ── Budget thresholds ────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BudgetConfig {
    /// Starting safety budget that recorded costs are deducted from
    #[serde(default = "default_initial_budget")]
    pub initial_budget: f64,
    /// Remaining budget at or below which the engine locks up
    #[serde(default = "default_halt_threshold")]
    pub halt_threshold: f64,
    /// Verdict cost at or above which an action is refused and recorded
    #[serde(default = "default_action_threshold")]
    pub action_threshold: f64,
}

fn default_initial_budget() -> f64 {
    100.0
}

fn default_halt_threshold() -> f64 {
    50.0
}

fn default_action_threshold() -> f64 {
    10.0
}

impl Default for BudgetConfig {
    fn default() -> Self {
        Self {
            initial_budget: default_initial_budget(),
            halt_threshold: default_halt_threshold(),
            action_threshold: default_action_threshold(),
        }
    }
}

// ── Jury panel ───────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JuryConfig {
    /// Number of independent assessor calls per candidate action
    #[serde(default = "default_panel_size")]
    pub panel_size: usize,
    /// Per-vote deadline; a seat that misses it is dropped, not retried
    #[serde(default = "default_vote_timeout_secs")]
    pub vote_timeout_secs: u64,
}

fn default_panel_size() -> usize {
    3
}

fn default_vote_timeout_secs() -> u64 {
    120
}

impl JuryConfig {
    pub fn vote_timeout(&self) -> Duration {
        Duration::from_secs(self.vote_timeout_secs)
    }
}

impl Default for JuryConfig {
    fn default() -> Self {
        Self {
            panel_size: default_panel_size(),
            vote_timeout_secs: default_vote_timeout_secs(),
        }
    }
}

// ── Ledger storage ───────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Ledger file path; tilde-expanded. Defaults to <workspace>/ledger.jsonl
    #[serde(default)]
    pub path: Option<String>,
    /// Bounded attempts for one append before reporting the write as failed
    #[serde(default = "default_max_write_retries")]
    pub max_write_retries: u32,
    /// Fixed delay between append attempts
    #[serde(default = "default_write_retry_delay_secs")]
    pub write_retry_delay_secs: u64,
}

fn default_max_write_retries() -> u32 {
    5
}

fn default_write_retry_delay_secs() -> u64 {
    1
}

impl LedgerConfig {
    /// Resolve the configured ledger path against the workspace directory.
    pub fn resolved_path(&self, workspace_dir: &Path) -> PathBuf {
        match &self.path {
            Some(raw) => PathBuf::from(shellexpand::tilde(raw).into_owned()),
            None => workspace_dir.join("ledger.jsonl"),
        }
    }

    pub fn write_retry_delay(&self) -> Duration {
        Duration::from_secs(self.write_retry_delay_secs)
    }
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            path: None,
            max_write_retries: default_max_write_retries(),
            write_retry_delay_secs: default_write_retry_delay_secs(),
        }
    }
}

// ── Assessor backend ─────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssessorConfig {
    /// Ollama-compatible endpoint; None uses the local default
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default = "default_model")]
    pub model: String,
    /// Deliberate chaos: independent seats should not all think alike
    #[serde(default = "default_temperature")]
    pub temperature: f64,
}

fn default_model() -> String {
    "llama3.2".into()
}

fn default_temperature() -> f64 {
    0.7
}

impl Default for AssessorConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            model: default_model(),
            temperature: default_temperature(),
        }
    }
}

// ── Load / save ──────────────────────────────────────────────────

impl Config {
    pub fn load_or_init() -> Result<Self> {
        let home = UserDirs::new()
            .map(|u| u.home_dir().to_path_buf())
            .context("Could not find home directory")?;
        let scarline_dir = home.join(".scarline");
        let config_path = scarline_dir.join("config.toml");

        if !scarline_dir.exists() {
            fs::create_dir_all(&scarline_dir).context("Failed to create .scarline directory")?;
        }

        if config_path.exists() {
            let contents =
                fs::read_to_string(&config_path).context("Failed to read config file")?;
            let mut config: Config =
                toml::from_str(&contents).context("Failed to parse config file")?;
            // Set computed paths that are skipped during serialization
            config.config_path.clone_from(&config_path);
            config.workspace_dir = scarline_dir;
            config.validate()?;
            Ok(config)
        } else {
            let config = Self {
                config_path: config_path.clone(),
                workspace_dir: scarline_dir,
                ..Self::default()
            };
            config.validate()?;
            config.save()?;
            Ok(config)
        }
    }

    pub fn save(&self) -> Result<()> {
        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(&self.config_path, contents).context("Failed to write config file")?;
        Ok(())
    }

    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.budget.initial_budget <= 0.0 {
            return Err(ConfigError::Validation(
                "budget.initial_budget must be positive".into(),
            ));
        }
        if self.budget.halt_threshold >= self.budget.initial_budget {
            return Err(ConfigError::Validation(
                "budget.halt_threshold must be below budget.initial_budget".into(),
            ));
        }
        if self.budget.action_threshold < 0.0 {
            return Err(ConfigError::Validation(
                "budget.action_threshold must not be negative".into(),
            ));
        }
        if self.jury.panel_size == 0 {
            return Err(ConfigError::Validation(
                "jury.panel_size must be at least 1".into(),
            ));
        }
        if self.ledger.max_write_retries == 0 {
            return Err(ConfigError::Validation(
                "ledger.max_write_retries must be at least 1".into(),
            ));
        }
        Ok(())
    }

    pub fn ledger_path(&self) -> PathBuf {
        self.ledger.resolved_path(&self.workspace_dir)
    }
}
