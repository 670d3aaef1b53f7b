use super::{Completion, LlmClient};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Offline client. Either replays a fixed script of outcomes or, in echo
/// mode, answers every prompt with a numbered canned reply.
pub struct FakeClient {
    model: String,
    script: Option<Mutex<VecDeque<Result<Completion, String>>>>,
    calls: AtomicUsize,
}

impl FakeClient {
    pub fn echo(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            script: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// `Err(msg)` entries are returned as provider failures.
    pub fn scripted(outcomes: Vec<Result<Completion, String>>) -> Self {
        Self {
            model: "fake".to_string(),
            script: Some(Mutex::new(outcomes.into())),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LlmClient for FakeClient {
    async fn complete(&self, prompt: &str) -> anyhow::Result<Completion> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;

        let Some(script) = &self.script else {
            let text = format!("[{} reply #{}] {}", self.model, n, prompt);
            return Ok(Completion {
                completion_tokens: text.split_whitespace().count() as u64,
                prompt_tokens: prompt.split_whitespace().count() as u64,
                model: self.model.clone(),
                text,
            });
        };

        let next = script
            .lock()
            .map_err(|_| anyhow::anyhow!("fake client script poisoned"))?
            .pop_front();

        match next {
            Some(Ok(c)) => Ok(c),
            Some(Err(msg)) => Err(anyhow::anyhow!(msg)),
            None => anyhow::bail!("fake client script exhausted after {} calls", n - 1),
        }
    }

    fn provider_name(&self) -> &'static str {
        "fake"
    }
}
