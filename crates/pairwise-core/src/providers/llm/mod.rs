use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Raw result of one completion call, before timing is attached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Completion {
    pub text: String,
    /// Model identifier reported by the provider (may differ from the requested one).
    pub model: String,
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
}

#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(&self, prompt: &str) -> anyhow::Result<Completion>;
    fn provider_name(&self) -> &'static str;
}

pub mod fake;
pub mod openai;
