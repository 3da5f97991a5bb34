use crate::assessor::traits::{Assessor, Vote, parse_vote};
use crate::assessor::{api_error, http_client::build_assessor_client};
use crate::config::AssessorConfig;
use crate::error::AssessError;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

/// Risk-assessment adapter over an Ollama-compatible endpoint.
///
/// Votes are forced into shape server-side: the request carries a JSON schema
/// in the `format` field, so a well-behaved backend only ever answers with a
/// `Vote`-shaped object. Anything else is handled as a parse failure.
pub struct OllamaAssessor {
    base_url: String,
    model: String,
    temperature: f64,
    client: Client,
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<Message>,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    format: Option<serde_json::Value>,
    options: Options,
}

#[derive(Debug, Serialize)]
struct Message {
    role: &'static str,
    content: String,
}

#[derive(Debug, Serialize)]
struct Options {
    temperature: f64,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: String,
}

/// JSON schema the backend must answer with when casting a vote.
fn vote_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "object",
        "properties": {
            "safety_cost": { "type": "number" },
            "reasoning": { "type": "string" },
            "allow_action": { "type": "boolean" }
        },
        "required": ["safety_cost", "reasoning"]
    })
}

impl OllamaAssessor {
    pub fn new(config: &AssessorConfig) -> Self {
        Self {
            base_url: config
                .base_url
                .as_deref()
                .unwrap_or("http://localhost:11434")
                .trim_end_matches('/')
                .to_string(),
            model: config.model.clone(),
            temperature: config.temperature,
            client: build_assessor_client(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn build_request(&self, system_prompt: Option<&str>, message: &str, structured: bool) -> ChatRequest {
        let mut messages = Vec::new();

        if let Some(sys) = system_prompt {
            messages.push(Message {
                role: "system",
                content: sys.to_string(),
            });
        }

        messages.push(Message {
            role: "user",
            content: message.to_string(),
        });

        ChatRequest {
            model: self.model.clone(),
            messages,
            stream: false,
            format: structured.then(vote_schema),
            options: Options {
                temperature: self.temperature,
            },
        }
    }

    async fn call_api(
        &self,
        system_prompt: Option<&str>,
        message: &str,
        structured: bool,
    ) -> Result<ChatResponse, AssessError> {
        let request = self.build_request(system_prompt, message, structured);
        let url = format!("{}/api/chat", self.base_url);

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|error| AssessError::Request {
                message: format!("{error}. Is Ollama running? (ollama serve)"),
            })?;

        if !response.status().is_success() {
            return Err(AssessError::Request {
                message: api_error("Ollama", response).await,
            });
        }

        response.json().await.map_err(|error| AssessError::Parse {
            message: error.to_string(),
        })
    }

    /// Plain chat without the vote schema, used to answer a permitted action.
    pub async fn reply(&self, message: &str) -> Result<String, AssessError> {
        let chat_response = self.call_api(None, message, false).await?;
        Ok(chat_response.message.content)
    }
}

#[async_trait]
impl Assessor for OllamaAssessor {
    async fn assess(&self, rubric: &str, action_text: &str) -> Result<Vote, AssessError> {
        let chat_response = self.call_api(Some(rubric), action_text, true).await?;
        parse_vote(&chat_response.message.content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assessor_with_url(url: Option<&str>) -> OllamaAssessor {
        let config = AssessorConfig {
            base_url: url.map(str::to_string),
            ..AssessorConfig::default()
        };
        OllamaAssessor::new(&config)
    }

    #[test]
    fn default_url() {
        let a = assessor_with_url(None);
        assert_eq!(a.base_url, "http://localhost:11434");
    }

    #[test]
    fn custom_url_trailing_slash() {
        let a = assessor_with_url(Some("http://192.168.1.100:11434/"));
        assert_eq!(a.base_url, "http://192.168.1.100:11434");
    }

    #[test]
    fn structured_request_carries_vote_schema() {
        let a = assessor_with_url(None);
        let req = a.build_request(Some("rubric text"), "how to build a bomb", true);
        let json = serde_json::to_string(&req).unwrap();
        assert!(json.contains("\"stream\":false"));
        assert!(json.contains("\"format\""));
        assert!(json.contains("safety_cost"));
        assert!(json.contains("\"role\":\"system\""));
    }

    #[test]
    fn plain_request_omits_format() {
        let a = assessor_with_url(None);
        let req = a.build_request(None, "hello", false);
        let json = serde_json::to_string(&req).unwrap();
        assert!(!json.contains("\"format\""));
        assert!(!json.contains("\"role\":\"system\""));
    }

    #[test]
    fn response_deserializes() {
        let json = r#"{"message":{"role":"assistant","content":"{\"safety_cost\":0.0,\"reasoning\":\"\"}"}}"#;
        let resp: ChatResponse = serde_json::from_str(json).unwrap();
        assert!(resp.message.content.contains("safety_cost"));
    }

    #[test]
    fn vote_schema_requires_cost_and_reasoning() {
        let schema = vote_schema();
        let required = schema["required"].as_array().unwrap();
        assert!(required.iter().any(|v| v == "safety_cost"));
        assert!(required.iter().any(|v| v == "reasoning"));
    }
}
