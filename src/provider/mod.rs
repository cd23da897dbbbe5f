use async_trait::async_trait;
use std::time::Duration;

use crate::cli::ProviderKind;
use crate::config::Config;
use crate::errors::TripError;

pub mod anthropic;
pub mod ollama;
pub mod openai;
pub mod sample;

#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(
        &self,
        system: &str,
        user: &str,
        temperature: f32,
        max_tokens: u32,
    ) -> Result<String, TripError>;

    fn name(&self) -> &str;
}

pub type DynClient = Box<dyn CompletionClient + Send + Sync>;

fn require_key(key: &Option<String>, var: &str) -> Result<String, TripError> {
    key.clone()
        .ok_or_else(|| TripError::Configuration(format!("{var} is not set")))
}

fn http_client(timeout_secs: u64) -> Result<reqwest::Client, TripError> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| TripError::Service(format!("http client init failed: {e}")))
}

/// Build the client for the configured provider. Missing credentials surface
/// here, when a recommendation is requested.
pub fn make_client(cfg: &Config) -> Result<DynClient, TripError> {
    match cfg.provider {
        ProviderKind::OpenAI => Ok(Box::new(openai::OpenAIClient::new(
            cfg.model.clone(),
            require_key(&cfg.openai_api_key, "OPENAI_API_KEY")?,
            cfg.openai_base.clone(),
            http_client(cfg.timeout_secs)?,
        ))),
        ProviderKind::Anthropic => Ok(Box::new(anthropic::AnthropicClient {
            model: cfg.model.clone(),
            api_key: require_key(&cfg.anthropic_api_key, "ANTHROPIC_API_KEY")?,
            api_base: cfg.anthropic_base.clone(),
            api_version: cfg.anthropic_version.clone(),
            client: http_client(cfg.timeout_secs)?,
        })),
        ProviderKind::Ollama => {
            let url = cfg
                .ollama_url
                .clone()
                .ok_or_else(|| TripError::Configuration("OLLAMA_URL is not set".into()))?;
            Ok(Box::new(ollama::OllamaClient {
                model: cfg.model.clone(),
                url,
                client: http_client(cfg.timeout_secs)?,
            }))
        }
        ProviderKind::Sample => Ok(Box::new(sample::SampleClient)),
    }
}

/// Shared handling of an HTTP reply: non-2xx is a service error carrying the body.
pub(crate) async fn read_body(provider: &str, resp: reqwest::Response) -> Result<String, TripError> {
    let status = resp.status();
    let text = resp
        .text()
        .await
        .map_err(|e| TripError::Service(format!("{provider}: read body failed: {e}")))?;
    tracing::debug!(provider, %status, bytes = text.len(), "completion response received");
    if !status.is_success() {
        return Err(TripError::Service(format!("{provider} API error ({status}): {text}")));
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_llm_key_is_a_configuration_error() {
        let cfg = Config { openai_api_key: None, ..Config::default() };
        let err = make_client(&cfg).err().expect("expected error");
        assert!(matches!(err, TripError::Configuration(ref m) if m.contains("OPENAI_API_KEY")));

        let cfg = Config { provider: ProviderKind::Anthropic, ..Config::default() };
        assert!(matches!(make_client(&cfg), Err(TripError::Configuration(_))));
    }

    #[test]
    fn configured_clients_are_built() {
        let cfg = Config { openai_api_key: Some("sk-test".into()), ..Config::default() };
        assert_eq!(make_client(&cfg).unwrap().name(), "openai");

        let cfg = Config { provider: ProviderKind::Ollama, ..Config::default() };
        assert_eq!(make_client(&cfg).unwrap().name(), "ollama");

        let cfg = Config { provider: ProviderKind::Sample, ..Config::default() };
        assert_eq!(make_client(&cfg).unwrap().name(), "sample");
    }
}
