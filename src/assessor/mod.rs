pub mod http_client;
pub mod ollama;
pub mod traits;

pub use ollama::OllamaAssessor;
pub use traits::{Assessor, Vote};

/// Render a non-success HTTP response into a short error message.
/// Bodies are truncated so a misbehaving backend can't flood the logs.
pub(crate) async fn api_error(backend: &str, response: reqwest::Response) -> String {
    const MAX_BODY_CHARS: usize = 200;

    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let trimmed: String = body.chars().take(MAX_BODY_CHARS).collect();
    format!("{backend} API error {status}: {trimmed}")
}
