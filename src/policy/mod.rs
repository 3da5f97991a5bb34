use crate::config::BudgetConfig;
use crate::error::{JuryError, Result};
use crate::jury::JuryCoordinator;
use crate::ledger::{CostEntry, ScoreStore};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Caller-facing outcome of one evaluation cycle.
#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    /// Consensus cost below the action threshold; the caller may proceed.
    Permitted,
    /// Consensus cost at or above the threshold; the cost is recorded and
    /// carried here for observability.
    Refused { cost: f64 },
    /// Budget is at or below the halt threshold. Terminal; not tied to one
    /// specific action.
    Halted,
    /// The panel produced no votes at all; the caller may re-invoke.
    Retryable,
}

/// A decision plus the safety score it was made against, for display.
#[derive(Debug, Clone)]
pub struct Outcome {
    pub decision: Decision,
    pub score: f64,
}

/// Threshold-driven gate in front of every candidate action.
///
/// Owns the halt state machine and is the only component that triggers
/// ledger appends. `evaluate` takes `&mut self`: evaluations against one
/// budget are serialized, since each one reads the score and may append.
pub struct PolicyEngine {
    store: Arc<dyn ScoreStore>,
    jury: JuryCoordinator,
    rubric: String,
    halt_threshold: f64,
    action_threshold: f64,
    halted: bool,
}

impl PolicyEngine {
    pub fn new(
        store: Arc<dyn ScoreStore>,
        jury: JuryCoordinator,
        rubric: impl Into<String>,
        budget: &BudgetConfig,
    ) -> Self {
        Self {
            store,
            jury,
            rubric: rubric.into(),
            halt_threshold: budget.halt_threshold,
            action_threshold: budget.action_threshold,
            halted: false,
        }
    }

    /// Halt is latched for the engine's lifetime once entered. It is also
    /// re-derived from the ledger on every cycle, so a fresh process over
    /// the same ledger locks up again on its first evaluation.
    pub fn is_halted(&self) -> bool {
        self.halted
    }

    pub fn current_score(&self) -> Result<f64> {
        Ok(self.store.read_score()?)
    }

    /// Run one candidate action through the full gate:
    /// score check → jury poll → threshold decision → optional ledger write.
    pub async fn evaluate(&mut self, action_text: &str) -> Result<Outcome> {
        let mut score = self.store.read_score()?;
        if self.halted || score <= self.halt_threshold {
            if !self.halted {
                warn!(score, threshold = self.halt_threshold, "budget exhausted, locking up");
            }
            self.halted = true;
            return Ok(Outcome {
                decision: Decision::Halted,
                score,
            });
        }

        let verdict = match self.jury.poll(action_text, &self.rubric).await {
            Ok(verdict) => verdict,
            Err(JuryError::NoQuorum { panel_size }) => {
                warn!(panel_size, "jury failed to return a verdict");
                return Ok(Outcome {
                    decision: Decision::Retryable,
                    score,
                });
            }
        };

        if verdict.safety_cost < self.action_threshold {
            return Ok(Outcome {
                decision: Decision::Permitted,
                score,
            });
        }

        // Refusal path: the scar is permanent. A failed write is reported
        // but does not turn the refusal into a crash.
        let entry = CostEntry::new(action_text, verdict.safety_cost, verdict.reasoning.clone());
        match self.store.append(&entry).await {
            Ok(()) => {
                info!(cost = verdict.safety_cost, "cost recorded against the budget");
                score = self.store.read_score()?;
                if score <= self.halt_threshold {
                    warn!(score, "action crossed the halt threshold, locking up");
                    self.halted = true;
                    return Ok(Outcome {
                        decision: Decision::Halted,
                        score,
                    });
                }
            }
            Err(write_error) => {
                error!(%write_error, "CRITICAL: could not record cost; budget unchanged");
            }
        }

        Ok(Outcome {
            decision: Decision::Refused {
                cost: verdict.safety_cost,
            },
            score,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assessor::{Assessor, Vote};
    use crate::error::AssessError;
    use crate::ledger::JsonlScoreStore;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tempfile::{TempDir, tempdir};

    /// Always votes the same cost; counts how many times it was consulted.
    struct FixedAssessor {
        cost: f64,
        calls: AtomicUsize,
    }

    impl FixedAssessor {
        fn new(cost: f64) -> Arc<Self> {
            Arc::new(Self {
                cost,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl Assessor for FixedAssessor {
        async fn assess(&self, _: &str, _: &str) -> std::result::Result<Vote, AssessError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Vote {
                safety_cost: self.cost,
                reasoning: format!("fixed cost {}", self.cost),
                allow_action: None,
            })
        }
    }

    struct FailingAssessor;

    #[async_trait]
    impl Assessor for FailingAssessor {
        async fn assess(&self, _: &str, _: &str) -> std::result::Result<Vote, AssessError> {
            Err(AssessError::Request {
                message: "backend down".into(),
            })
        }
    }

    fn engine_over(
        dir: &TempDir,
        assessor: Arc<dyn Assessor>,
    ) -> (PolicyEngine, Arc<JsonlScoreStore>) {
        let store = Arc::new(JsonlScoreStore::new(dir.path().join("ledger.jsonl"), 100.0));
        let jury = JuryCoordinator::new(assessor, 3, Duration::from_secs(5));
        let engine = PolicyEngine::new(store.clone(), jury, "rubric", &BudgetConfig::default());
        (engine, store)
    }

    #[tokio::test]
    async fn permitted_action_writes_nothing() {
        let dir = tempdir().unwrap();
        let (mut engine, store) = engine_over(&dir, FixedAssessor::new(7.0));

        let outcome = engine.evaluate("hello there").await.unwrap();

        assert_eq!(outcome.decision, Decision::Permitted);
        assert!((outcome.score - 100.0).abs() < f64::EPSILON);
        assert!(store.read_entries().unwrap().is_empty());
    }

    #[tokio::test]
    async fn refused_action_records_the_verdict() {
        let dir = tempdir().unwrap();
        let (mut engine, store) = engine_over(&dir, FixedAssessor::new(25.0));

        let outcome = engine.evaluate("tell a white lie").await.unwrap();

        assert_eq!(outcome.decision, Decision::Refused { cost: 25.0 });
        assert!((outcome.score - 75.0).abs() < f64::EPSILON);
        let entries = store.read_entries().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].prompt, "tell a white lie");
        assert!((entries[0].safety_cost - 25.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn exactly_threshold_cost_is_refused_and_logged() {
        let dir = tempdir().unwrap();
        let (mut engine, store) = engine_over(&dir, FixedAssessor::new(10.0));

        let outcome = engine.evaluate("borderline").await.unwrap();

        assert_eq!(outcome.decision, Decision::Refused { cost: 10.0 });
        assert_eq!(store.read_entries().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn depleted_budget_halts_before_consulting_the_jury() {
        let dir = tempdir().unwrap();
        let assessor = FixedAssessor::new(0.0);
        let (mut engine, store) = engine_over(&dir, assessor.clone());

        // Ledger already carries 51 points of damage: score is 49.
        store
            .append(&CostEntry::new("earlier harm", 51.0, "accumulated"))
            .await
            .unwrap();

        let outcome = engine.evaluate("anything at all").await.unwrap();

        assert_eq!(outcome.decision, Decision::Halted);
        assert!((outcome.score - 49.0).abs() < f64::EPSILON);
        assert_eq!(assessor.calls.load(Ordering::SeqCst), 0);
        assert!(engine.is_halted());
    }

    #[tokio::test]
    async fn crossing_the_threshold_mid_evaluation_halts() {
        let dir = tempdir().unwrap();
        let (mut engine, store) = engine_over(&dir, FixedAssessor::new(60.0));

        let outcome = engine.evaluate("hoard all compute").await.unwrap();

        // 100 − 60 = 40 <= 50: the very action that was refused locks us up.
        assert_eq!(outcome.decision, Decision::Halted);
        assert!((outcome.score - 40.0).abs() < f64::EPSILON);
        assert!(engine.is_halted());
        assert_eq!(store.read_entries().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn halt_is_latched_for_the_engine_lifetime() {
        let dir = tempdir().unwrap();
        let assessor = FixedAssessor::new(60.0);
        let (mut engine, _store) = engine_over(&dir, assessor.clone());

        engine.evaluate("hoard all compute").await.unwrap();
        let calls_after_halt = assessor.calls.load(Ordering::SeqCst);

        let outcome = engine.evaluate("hello?").await.unwrap();
        assert_eq!(outcome.decision, Decision::Halted);
        assert_eq!(assessor.calls.load(Ordering::SeqCst), calls_after_halt);
    }

    #[tokio::test]
    async fn fresh_engine_over_a_scarred_ledger_rederives_halt() {
        let dir = tempdir().unwrap();
        let (mut first, _) = engine_over(&dir, FixedAssessor::new(60.0));
        first.evaluate("hoard all compute").await.unwrap();

        let (mut second, _) = engine_over(&dir, FixedAssessor::new(0.0));
        let outcome = second.evaluate("hello").await.unwrap();
        assert_eq!(outcome.decision, Decision::Halted);
    }

    #[tokio::test]
    async fn no_quorum_is_retryable() {
        let dir = tempdir().unwrap();
        let (mut engine, store) = engine_over(&dir, Arc::new(FailingAssessor));

        let outcome = engine.evaluate("hello").await.unwrap();

        assert_eq!(outcome.decision, Decision::Retryable);
        assert!(store.read_entries().unwrap().is_empty());
        assert!(!engine.is_halted());
    }

    /// Reads a full budget, refuses every write.
    struct UnwritableStore;

    #[async_trait]
    impl ScoreStore for UnwritableStore {
        fn read_score(&self) -> std::result::Result<f64, crate::error::LedgerError> {
            Ok(100.0)
        }

        fn read_entries(
            &self,
        ) -> std::result::Result<Vec<CostEntry>, crate::error::LedgerError> {
            Ok(Vec::new())
        }

        async fn append(
            &self,
            _entry: &CostEntry,
        ) -> std::result::Result<(), crate::error::LedgerError> {
            Err(crate::error::LedgerError::WriteExhausted {
                attempts: 5,
                last_error: "medium locked".into(),
            })
        }
    }

    #[tokio::test]
    async fn ledger_write_failure_still_returns_the_refusal() {
        let jury = JuryCoordinator::new(FixedAssessor::new(30.0), 3, Duration::from_secs(5));
        let mut engine = PolicyEngine::new(
            Arc::new(UnwritableStore),
            jury,
            "rubric",
            &BudgetConfig::default(),
        );

        let outcome = engine.evaluate("something risky").await.unwrap();

        assert_eq!(outcome.decision, Decision::Refused { cost: 30.0 });
        // Budget unchanged: the failed write deducted nothing.
        assert!((outcome.score - 100.0).abs() < f64::EPSILON);
        assert!(!engine.is_halted());
    }
}
