use crate::model::{Generation, GenerationMetadata};
use crate::providers::llm::LlmClient;
use crate::session::Round;
use anyhow::Context;
use chrono::{SecondsFormat, Utc};

/// Produces one response for `prompt`, timing the provider call.
///
/// Provider errors are returned as-is; nothing is retried.
pub async fn generate(client: &dyn LlmClient, prompt: &str) -> anyhow::Result<Generation> {
    if prompt.trim().is_empty() {
        anyhow::bail!("prompt must not be empty");
    }

    let start = Utc::now();
    let completion = client
        .complete(prompt)
        .await
        .with_context(|| format!("{} completion failed", client.provider_name()))?;
    let end = Utc::now();

    let latency_ms = (end - start).num_milliseconds().max(0) as u64;

    tracing::info!(
        event = "pairwise.generation.completed",
        provider = client.provider_name(),
        model = %completion.model,
        input_tokens = completion.prompt_tokens,
        output_tokens = completion.completion_tokens,
        latency_ms = latency_ms,
    );

    Ok(Generation {
        text: completion.text,
        meta: GenerationMetadata {
            model: completion.model,
            input_tokens: completion.prompt_tokens,
            output_tokens: completion.completion_tokens,
            latency_ms,
            timestamp: start.to_rfc3339_opts(SecondsFormat::Micros, false),
        },
    })
}

/// Generates the two candidates of a round, A then B, one after the other.
pub async fn generate_round(client: &dyn LlmClient, prompt: &str) -> anyhow::Result<Round> {
    let a = generate(client, prompt)
        .await
        .context("generating response A")?;
    let b = generate(client, prompt)
        .await
        .context("generating response B")?;

    Ok(Round {
        prompt: prompt.to_string(),
        a,
        b,
    })
}
