use anyhow::{Context, Result};
use fs_err as fs;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::cli::{Args, ProviderKind};
use crate::errors::TripError;
use crate::parse::Strategy;

pub const MIN_MAX_TOKENS: u32 = 1000;
pub const MAX_MAX_TOKENS: u32 = 1800;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub schema_version: String,
    pub out_dir: String,
    pub provider: ProviderKind,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout_secs: u64,
    pub strategy: Strategy,
    pub openai_api_key: Option<String>,
    pub openai_base: String,
    pub anthropic_api_key: Option<String>,
    pub anthropic_base: String,
    pub anthropic_version: String,
    pub ollama_url: Option<String>,
    pub maps_api_key: Option<String>,
    pub like_webhook_url: Option<String>,
    pub save_request: bool,
    pub save_response: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            schema_version: "2025-10-01".into(),
            out_dir: ".".into(),
            provider: ProviderKind::OpenAI,
            model: "gpt-4o-mini".into(),
            temperature: 0.7,
            max_tokens: 1500,
            timeout_secs: 120,
            strategy: Strategy::NameFirst,
            openai_api_key: None,
            openai_base: "https://api.openai.com".into(),
            anthropic_api_key: None,
            anthropic_base: "https://api.anthropic.com".into(),
            anthropic_version: "2023-06-01".into(),
            ollama_url: Some("http://localhost:11434".into()),
            maps_api_key: None,
            like_webhook_url: None,
            save_request: false,
            save_response: false,
        }
    }
}

impl Config {
    /// Read a `.toml` or `.yaml`/`.yml` config file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        let cfg = match ext {
            "yaml" | "yml" => serde_yaml::from_str(&text)
                .with_context(|| format!("invalid yaml config {}", path.display()))?,
            _ => toml::from_str(&text)
                .with_context(|| format!("invalid toml config {}", path.display()))?,
        };
        Ok(cfg)
    }

    /// Fill unset credentials from a variable lookup. Only `load` passes the
    /// real environment; nothing downstream reads it.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let fill = |slot: &mut Option<String>, key: &str| {
            if slot.is_none() {
                *slot = lookup(key).filter(|v| !v.trim().is_empty());
            }
        };
        fill(&mut self.openai_api_key, "OPENAI_API_KEY");
        fill(&mut self.anthropic_api_key, "ANTHROPIC_API_KEY");
        fill(&mut self.maps_api_key, "GOOGLE_MAPS_API_KEY");
        fill(&mut self.like_webhook_url, "LIKE_WEBHOOK_URL");
        if let Some(url) = lookup("OLLAMA_URL").filter(|v| !v.trim().is_empty()) {
            self.ollama_url = Some(url);
        }
    }

    pub fn apply_args(&mut self, args: &Args) {
        if let Some(p) = args.provider {
            self.provider = p;
        }
        if let Some(m) = &args.model {
            self.model = m.clone();
        }
        if let Some(t) = args.temperature {
            self.temperature = t;
        }
        if let Some(n) = args.max_tokens {
            self.max_tokens = n;
        }
        if let Some(s) = args.timeout_secs {
            self.timeout_secs = s;
        }
        if let Some(s) = args.strategy {
            self.strategy = s;
        }
        if let Some(d) = &args.out_dir {
            self.out_dir = d.clone();
        }
        self.save_request |= args.save_request;
        self.save_response |= args.save_response;
    }

    pub fn validate(mut self) -> Result<Self, TripError> {
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(TripError::Configuration(format!(
                "temperature {} is outside 0.0..=2.0",
                self.temperature
            )));
        }
        let clamped = self.max_tokens.clamp(MIN_MAX_TOKENS, MAX_MAX_TOKENS);
        if clamped != self.max_tokens {
            tracing::warn!(requested = self.max_tokens, used = clamped, "max_tokens clamped");
            self.max_tokens = clamped;
        }
        Ok(self)
    }

    /// Defaults → file → `.env`/environment → CLI flags.
    pub fn load(args: &Args) -> Result<Self> {
        let mut cfg = match &args.config {
            Some(p) => Self::from_file(Path::new(p))?,
            None => Self::default(),
        };
        dotenv::dotenv().ok();
        cfg.apply_env(|k| std::env::var(k).ok());
        cfg.apply_args(args);
        Ok(cfg.validate()?)
    }
}
