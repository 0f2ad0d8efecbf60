use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde_json::Value;

use triage_core::api::{AnalysisProvider, ClassifierConfig};

use crate::http::{parse_json_response, HttpError};

const SYSTEM_PROMPT: &str =
    "You triage GitHub issues. Reply with a single JSON object and nothing else.";

/// OpenAI-compatible chat completions endpoint.
pub struct ChatCompletionsProvider {
    http: reqwest::Client,
    url: String,
    api_key: String,
    model: String,
    max_tokens: u32,
    temperature: f32,
}

impl ChatCompletionsProvider {
    pub fn new(cfg: &ClassifierConfig) -> Result<Self> {
        let http = reqwest::Client::builder().build()?;
        Ok(Self {
            http,
            url: format!("{}/chat/completions", cfg.base_url.trim_end_matches('/')),
            api_key: cfg.api_key.clone(),
            model: cfg.model.clone(),
            max_tokens: cfg.max_tokens,
            temperature: cfg.temperature,
        })
    }

    fn auth(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        if self.api_key.trim().is_empty() {
            req
        } else {
            req.bearer_auth(&self.api_key)
        }
    }
}

#[async_trait]
impl AnalysisProvider for ChatCompletionsProvider {
    async fn complete(&self, prompt: String) -> Result<String> {
        let url = &self.url;
        tracing::debug!(
            stage = "provider.http.in",
            url = %url,
            model = %self.model,
            prompt_len = prompt.len()
        );
        let payload = serde_json::json!({
            "model": self.model,
            "max_tokens": self.max_tokens,
            "temperature": self.temperature,
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                { "role": "user", "content": prompt },
            ],
        });
        let resp = self
            .auth(self.http.post(url).json(&payload))
            .send()
            .await
            .map_err(|err| HttpError::from_reqwest(err, url.clone()))?;
        let status = resp.status();
        let body = parse_json_response(resp).await?;
        tracing::debug!(stage = "provider.http.out", status = %status);

        extract_content(&body).ok_or_else(|| anyhow!("completion response has no message content"))
    }
}

/// `{ choices: [ { message: { content: "..." } } ] }`
fn extract_content(v: &Value) -> Option<String> {
    v.get("choices")?
        .as_array()?
        .first()?
        .get("message")?
        .get("content")?
        .as_str()
        .map(str::to_string)
}
