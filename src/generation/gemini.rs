use super::sse::SseDecoder;
use super::types::{ErrorEnvelope, GenerateContentRequest, GenerateContentResponse};
use super::{FragmentStream, TextGenerator};
use crate::config::{ApiKey, GenerationConfig};
use crate::prompt::AnalysisPrompt;
use anyhow::{Context, Result};
use async_trait::async_trait;
use futures_util::{future, stream, StreamExt};
use reqwest::Client;

/// Finish reasons of a complete answer; anything else cut the answer short.
const NORMAL_FINISH: [&str; 2] = ["STOP", "MAX_TOKENS"];

pub struct GeminiClient {
    client: Client,
    base_url: String,
    model: String,
}

impl GeminiClient {
    pub fn new(config: &GenerationConfig) -> Result<Self> {
        let client = Client::builder()
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
        })
    }

    fn stream_url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:streamGenerateContent?alt=sse",
            self.base_url, self.model
        )
    }
}

/// Prefer the API's own error message over the raw body.
fn error_message(body: &str) -> String {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(env) if !env.error.message.is_empty() => {
            format!("{} {}: {}", env.error.code, env.error.status, env.error.message)
        }
        _ => body.trim().to_string(),
    }
}

/// Items carried by one event: its text, if any, then an error when the
/// model stopped for any reason other than a normal finish.
fn parse_event(data: &str) -> Vec<Result<String>> {
    let event: GenerateContentResponse = match serde_json::from_str(data) {
        Ok(event) => event,
        Err(e) => {
            return vec![Err(
                anyhow::Error::new(e).context("failed to parse gemini stream event")
            )]
        }
    };
    if let Some(reason) = event.block_reason() {
        return vec![Err(anyhow::anyhow!("prompt blocked by gemini: {}", reason))];
    }

    let mut items = Vec::new();
    let text = event.text();
    if !text.is_empty() {
        items.push(Ok(text));
    }
    if let Some(reason) = event
        .candidates
        .first()
        .and_then(|c| c.finish_reason.as_deref())
        .filter(|r| !NORMAL_FINISH.contains(r))
    {
        items.push(Err(anyhow::anyhow!("gemini stopped the response: {}", reason)));
    }
    items
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, key: &ApiKey, prompt: AnalysisPrompt) -> Result<FragmentStream> {
        let body = GenerateContentRequest::user_text(prompt.into_string());

        let resp = self
            .client
            .post(self.stream_url())
            .header("x-goog-api-key", key.expose())
            .json(&body)
            .send()
            .await
            .context("gemini request failed")?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("gemini {} ({}): {}", self.model, status, error_message(&body));
        }
        tracing::debug!(model = %self.model, "gemini stream opened");

        let mut decoder = SseDecoder::default();
        let fragments = resp
            .bytes_stream()
            .map(Some)
            .chain(stream::once(future::ready(None)))
            .flat_map(move |chunk| {
                let payloads: Vec<Result<String>> = match chunk {
                    Some(Ok(bytes)) => decoder.push(&bytes).into_iter().map(Ok).collect(),
                    Some(Err(e)) => {
                        vec![Err(anyhow::Error::new(e).context("gemini stream interrupted"))]
                    }
                    None => decoder.finish().into_iter().map(Ok).collect(),
                };
                stream::iter(payloads)
            })
            .flat_map(|payload| {
                let items = match payload {
                    Ok(data) => parse_event(&data),
                    Err(e) => vec![Err(e)],
                };
                stream::iter(items)
            });

        Ok(fragments.boxed())
    }
}
