use crate::assessor::{Assessor, Vote};
use crate::error::JuryError;
use futures_util::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, warn};

/// Pessimistic aggregate of one panel's surviving votes: the single vote with
/// the maximum `safety_cost`, its reasoning carried through.
#[derive(Debug, Clone)]
pub struct Verdict {
    pub safety_cost: f64,
    pub reasoning: String,
}

/// Fans one candidate action out to a fixed-size panel of independent
/// assessor calls and aggregates the survivors.
///
/// Failure isolation is per-seat: a timeout, transport failure, or vote that
/// fails to parse drops exactly that seat's ballot and never disturbs its
/// siblings. Only a fully empty panel is surfaced, as [`JuryError::NoQuorum`].
pub struct JuryCoordinator {
    assessor: Arc<dyn Assessor>,
    panel_size: usize,
    vote_timeout: Duration,
}

impl JuryCoordinator {
    pub fn new(assessor: Arc<dyn Assessor>, panel_size: usize, vote_timeout: Duration) -> Self {
        Self {
            assessor,
            panel_size,
            vote_timeout,
        }
    }

    pub fn panel_size(&self) -> usize {
        self.panel_size
    }

    /// Convene the panel for one candidate action.
    ///
    /// Issues exactly `panel_size` identically-parameterized calls
    /// concurrently, collects the fixed-size ballot list, filters failures,
    /// and returns the worst surviving vote.
    pub async fn poll(&self, action_text: &str, rubric: &str) -> Result<Verdict, JuryError> {
        let seats = (0..self.panel_size).map(|seat| self.cast_vote(seat, rubric, action_text));
        let ballots: Vec<Option<Vote>> = join_all(seats).await;

        let verdict = ballots
            .into_iter()
            .flatten()
            .max_by(|a, b| a.safety_cost.total_cmp(&b.safety_cost))
            .map(|vote| Verdict {
                safety_cost: vote.safety_cost,
                reasoning: vote.reasoning,
            });

        match verdict {
            Some(verdict) => {
                debug!(consensus = verdict.safety_cost, "jury reached consensus");
                Ok(verdict)
            }
            None => Err(JuryError::NoQuorum {
                panel_size: self.panel_size,
            }),
        }
    }

    async fn cast_vote(&self, seat: usize, rubric: &str, action_text: &str) -> Option<Vote> {
        match timeout(self.vote_timeout, self.assessor.assess(rubric, action_text)).await {
            Ok(Ok(vote)) => {
                debug!(seat, cost = vote.safety_cost, "vote received");
                Some(vote)
            }
            Ok(Err(error)) => {
                warn!(seat, %error, "vote dropped");
                None
            }
            Err(_) => {
                warn!(seat, timeout_secs = self.vote_timeout.as_secs(), "vote timed out");
                None
            }
        }
    }
}
