use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::errors::TripError;
use crate::wire::ChatMessage;

use super::{read_body, CompletionClient};

pub struct OllamaClient {
    pub model: String,
    pub url: String,
    pub client: Client,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Serialize)]
struct OllamaOptions {
    temperature: f32,
    num_predict: u32,
}

#[derive(Deserialize)]
struct ChatResponse {
    message: MsgOut,
}

#[derive(Deserialize)]
struct MsgOut {
    content: String,
}

#[async_trait]
impl CompletionClient for OllamaClient {
    async fn complete(
        &self,
        system: &str,
        user: &str,
        temperature: f32,
        max_tokens: u32,
    ) -> Result<String, TripError> {
        let url = format!("{}/api/chat", self.url.trim_end_matches('/'));
        let body = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage::system(system), ChatMessage::user(user)],
            stream: false,
            options: OllamaOptions { temperature, num_predict: max_tokens },
        };
        tracing::debug!(%url, model = %self.model, "POST ollama chat");

        let resp = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| TripError::Service(format!("ollama request failed: {e}")))?;

        let text = read_body("ollama", resp).await?;
        let parsed: ChatResponse = serde_json::from_str(&text)
            .map_err(|e| TripError::Service(format!("ollama response parse error: {e}")))?;
        if parsed.message.content.trim().is_empty() {
            return Err(TripError::Service("ollama: empty content".into()));
        }
        Ok(parsed.message.content)
    }

    fn name(&self) -> &str {
        "ollama"
    }
}
