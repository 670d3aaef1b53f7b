use super::{Completion, LlmClient};
use crate::config::ProviderSettings;
use async_trait::async_trait;
use serde_json::json;

/// Client for any OpenAI-compatible `/chat/completions` endpoint (OpenAI, Ollama, vLLM, ...).
pub struct OpenAIClient {
    pub base_url: String,
    pub model: String,
    pub api_key: String,
    pub temperature: f32,
    pub max_tokens: Option<u32>,
    pub client: reqwest::Client,
}

impl OpenAIClient {
    pub fn new(base_url: String, model: String, api_key: String, temperature: f32) -> Self {
        Self {
            base_url,
            model,
            api_key,
            temperature,
            max_tokens: None,
            client: reqwest::Client::new(),
        }
    }

    pub fn from_settings(settings: &ProviderSettings) -> Self {
        let mut client = Self::new(
            settings.base_url.clone(),
            settings.model.clone(),
            settings.resolve_api_key(),
            settings.temperature,
        );
        client.max_tokens = settings.max_tokens;
        client
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }

    fn request_body(&self, prompt: &str) -> serde_json::Value {
        let mut body = json!({
            "model": self.model,
            "temperature": self.temperature,
            "messages": [{ "role": "user", "content": prompt }],
        });
        if let Some(max) = self.max_tokens {
            body["max_tokens"] = json!(max);
        }
        body
    }
}

/// Extracts text, resolved model and usage from a chat completion payload.
pub(crate) fn parse_chat_response(
    json: &serde_json::Value,
    requested_model: &str,
) -> anyhow::Result<Completion> {
    let text = json
        .pointer("/choices/0/message/content")
        .and_then(|v| v.as_str())
        .ok_or_else(|| anyhow::anyhow!("chat completion response missing content"))?
        .to_string();

    let model = json
        .get("model")
        .and_then(|v| v.as_str())
        .filter(|m| !m.is_empty())
        .unwrap_or(requested_model)
        .to_string();

    let usage = |field: &str| {
        json.pointer(&format!("/usage/{field}"))
            .and_then(|v| v.as_u64())
            .unwrap_or(0)
    };

    Ok(Completion {
        text,
        model,
        prompt_tokens: usage("prompt_tokens"),
        completion_tokens: usage("completion_tokens"),
    })
}

#[async_trait]
impl LlmClient for OpenAIClient {
    async fn complete(&self, prompt: &str) -> anyhow::Result<Completion> {
        let resp = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&self.request_body(prompt))
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let error_text = resp.text().await.unwrap_or_default();
            anyhow::bail!("chat completions API error ({}): {}", status, error_text);
        }

        let json: serde_json::Value = resp.json().await?;
        parse_chat_response(&json, &self.model)
    }

    fn provider_name(&self) -> &'static str {
        "openai"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_provider_model_and_usage() {
        let body = json!({
            "model": "llama3.2:1b-instruct-q8_0",
            "choices": [{ "message": { "role": "assistant", "content": "Things fall." } }],
            "usage": { "prompt_tokens": 12, "completion_tokens": 3, "total_tokens": 15 }
        });
        let c = parse_chat_response(&body, "llama3.2:1b").unwrap();
        assert_eq!(c.text, "Things fall.");
        assert_eq!(c.model, "llama3.2:1b-instruct-q8_0");
        assert_eq!(c.prompt_tokens, 12);
        assert_eq!(c.completion_tokens, 3);
    }

    #[test]
    fn missing_usage_counts_as_zero() {
        let body = json!({ "choices": [{ "message": { "content": "hi" } }] });
        let c = parse_chat_response(&body, "m").unwrap();
        assert_eq!(c.model, "m");
        assert_eq!((c.prompt_tokens, c.completion_tokens), (0, 0));
    }

    #[test]
    fn missing_content_is_an_error() {
        let body = json!({ "error": { "message": "model 'nope' not found" } });
        let err = parse_chat_response(&body, "nope").unwrap_err();
        assert!(err.to_string().contains("missing content"));
    }

    #[test]
    fn request_carries_single_user_message() {
        let mut c = OpenAIClient::new(
            "http://localhost:11434/v1/".into(),
            "llama3.2:1b".into(),
            "ollama".into(),
            1.0,
        );
        c.max_tokens = Some(256);
        assert_eq!(c.endpoint(), "http://localhost:11434/v1/chat/completions");

        let body = c.request_body("Explain gravity in one sentence.");
        assert_eq!(body["messages"].as_array().unwrap().len(), 1);
        assert_eq!(body["messages"][0]["role"], "user");
        assert_eq!(body["temperature"], 1.0);
        assert_eq!(body["max_tokens"], 256);
    }
}
