use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::errors::TripError;
use crate::wire::ChatMessage;

use super::{read_body, CompletionClient};

/// Chat Completions client: one system and one user message per call.
pub struct OpenAIClient {
    model: String,
    api_key: String,
    api_base: String,
    client: Client,
}

impl OpenAIClient {
    pub fn new(model: String, api_key: String, api_base: String, client: Client) -> Self {
        Self { model, api_key, api_base, client }
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: MessageOut,
}

#[derive(Deserialize)]
struct MessageOut {
    #[serde(default)]
    content: Option<String>,
}

pub(crate) fn extract_content(body: &str) -> Result<String, TripError> {
    let parsed: ChatResponse = serde_json::from_str(body)
        .map_err(|e| TripError::Service(format!("openai response parse error: {e}")))?;
    parsed
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .filter(|c| !c.trim().is_empty())
        .ok_or_else(|| TripError::Service("openai: empty content".into()))
}

#[async_trait]
impl CompletionClient for OpenAIClient {
    async fn complete(
        &self,
        system: &str,
        user: &str,
        temperature: f32,
        max_tokens: u32,
    ) -> Result<String, TripError> {
        let url = format!("{}/v1/chat/completions", self.api_base.trim_end_matches('/'));
        let body = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage::system(system), ChatMessage::user(user)],
            temperature,
            max_tokens,
        };
        tracing::debug!(%url, model = %self.model, "POST chat completion");

        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| TripError::Service(format!("openai request failed: {e}")))?;

        let text = read_body("openai", resp).await?;
        extract_content(&text)
    }

    fn name(&self) -> &str {
        "openai"
    }
}
