use crate::error::AssessError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// One assessor's risk verdict for a candidate action.
///
/// Ephemeral: votes live for a single poll and are never persisted
/// individually; only the aggregated verdict can reach the ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vote {
    pub safety_cost: f64,
    pub reasoning: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_action: Option<bool>,
}

/// External risk-assessment capability, consumed not implemented.
///
/// An implementation must deliver a structurally valid [`Vote`] or fail with
/// a tagged error; callers branch on the result instead of catching panics.
#[async_trait]
pub trait Assessor: Send + Sync {
    async fn assess(&self, rubric: &str, action_text: &str) -> Result<Vote, AssessError>;
}

/// Parse a backend's message content into a [`Vote`].
///
/// Anything that doesn't match the schema is a parse failure: the caller
/// drops that single vote, never the whole poll.
pub fn parse_vote(content: &str) -> Result<Vote, AssessError> {
    serde_json::from_str(content).map_err(|error| AssessError::Parse {
        message: error.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vote_parses_from_schema_shaped_json() {
        let vote =
            parse_vote(r#"{"safety_cost": 85.0, "reasoning": "existential", "allow_action": false}"#)
                .unwrap();
        assert!((vote.safety_cost - 85.0).abs() < f64::EPSILON);
        assert_eq!(vote.reasoning, "existential");
        assert_eq!(vote.allow_action, Some(false));
    }

    #[test]
    fn allow_action_is_optional() {
        let vote = parse_vote(r#"{"safety_cost": 0.0, "reasoning": ""}"#).unwrap();
        assert!(vote.allow_action.is_none());
    }

    #[test]
    fn prose_response_is_a_parse_failure() {
        let result = parse_vote("I think this is dangerous.");
        assert!(matches!(result, Err(AssessError::Parse { .. })));
    }

    #[test]
    fn missing_required_field_is_a_parse_failure() {
        let result = parse_vote(r#"{"reasoning": "no cost given"}"#);
        assert!(matches!(result, Err(AssessError::Parse { .. })));
    }
}
