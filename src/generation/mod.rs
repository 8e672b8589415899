pub mod gemini;
pub mod sse;
pub mod types;

use crate::config::ApiKey;
use crate::prompt::AnalysisPrompt;
use anyhow::Result;
use async_trait::async_trait;
use futures_util::stream::BoxStream;

/// Text fragments in arrival order. Finite and not restartable.
pub type FragmentStream = BoxStream<'static, Result<String>>;

#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Sends the prompt and returns the response as it streams in.
    async fn generate(&self, key: &ApiKey, prompt: AnalysisPrompt) -> Result<FragmentStream>;
}

/// Append-only destination for streamed text.
pub trait FragmentSink {
    fn append(&mut self, fragment: &str);
}

impl FragmentSink for String {
    fn append(&mut self, fragment: &str) {
        self.push_str(fragment);
    }
}
