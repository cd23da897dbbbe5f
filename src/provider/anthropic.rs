use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::errors::TripError;

use super::{read_body, CompletionClient};

pub struct AnthropicClient {
    pub model: String,
    pub api_key: String,
    pub api_base: String,
    pub api_version: String,
    pub client: Client,
}

#[derive(Serialize)]
struct MsgRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    messages: Vec<Msg<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
}

#[derive(Serialize)]
struct Msg<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct MsgResponse {
    content: Vec<Block>,
}

#[derive(Deserialize)]
struct Block {
    #[serde(default)]
    text: String,
    #[serde(default)]
    r#type: String,
}

fn extract_text(body: &str) -> Result<String, TripError> {
    let parsed: MsgResponse = serde_json::from_str(body)
        .map_err(|e| TripError::Service(format!("anthropic response parse error: {e}")))?;
    parsed
        .content
        .into_iter()
        .find(|b| b.r#type == "text" && !b.text.is_empty())
        .map(|b| b.text)
        .ok_or_else(|| TripError::Service("anthropic: empty content".into()))
}

#[async_trait]
impl CompletionClient for AnthropicClient {
    async fn complete(
        &self,
        system: &str,
        user: &str,
        temperature: f32,
        max_tokens: u32,
    ) -> Result<String, TripError> {
        let url = format!("{}/v1/messages", self.api_base.trim_end_matches('/'));
        let body = MsgRequest {
            model: &self.model,
            max_tokens,
            temperature,
            messages: vec![Msg { role: "user", content: user }],
            system: (!system.is_empty()).then_some(system),
        };
        tracing::debug!(%url, model = %self.model, "POST messages");

        let resp = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", &self.api_version)
            .json(&body)
            .send()
            .await
            .map_err(|e| TripError::Service(format!("anthropic request failed: {e}")))?;

        let text = read_body("anthropic", resp).await?;
        extract_text(&text)
    }

    fn name(&self) -> &str {
        "anthropic"
    }
}
