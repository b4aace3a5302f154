//! Generator trait — the abstraction over the text-generation service.
//!
//! The orchestrator only ever needs `generate(prompt, params) -> text`;
//! quantization, device placement and sampling live behind this seam.

use std::time::Duration;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::error::GenerationError;
use crate::mode::GenerationParams;

/// A single generation call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// The assembled prompt
    pub prompt: String,

    /// Effective sampling parameters of the active mode
    pub params: GenerationParams,

    /// Input budget in tokens; services truncate beyond it
    pub max_input_length: usize,
}

/// The core Generator trait.
#[async_trait]
pub trait Generator: Send + Sync {
    /// A human-readable name for this backend (e.g., "tgi", "fallback").
    fn name(&self) -> &str;

    /// Generate a continuation for the prompt.
    async fn generate(
        &self,
        request: GenerationRequest,
    ) -> std::result::Result<String, GenerationError>;

    /// Health check: can we reach the service?
    async fn health_check(&self) -> std::result::Result<bool, GenerationError> {
        Ok(true)
    }

    /// Longest a `generate` call may take when the backend enforces its own
    /// deadlines (e.g. per endpoint of a chain). Callers must not cut such a
    /// backend off earlier.
    fn time_budget(&self) -> Option<Duration> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mode::ModeConfig;

    struct Echo;

    #[async_trait]
    impl Generator for Echo {
        fn name(&self) -> &str {
            "echo"
        }

        async fn generate(
            &self,
            request: GenerationRequest,
        ) -> std::result::Result<String, GenerationError> {
            Ok(request.prompt)
        }
    }

    #[tokio::test]
    async fn default_health_check_is_healthy() {
        assert!(Echo.health_check().await.unwrap());
        assert!(Echo.time_budget().is_none());
    }

    #[tokio::test]
    async fn request_carries_effective_params() {
        let mode = ModeConfig::fast();
        let request = GenerationRequest {
            prompt: "Question: hi\nAnswer: ".into(),
            params: mode.generation.effective(),
            max_input_length: mode.max_input_length,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert!(json["params"].get("length_penalty").is_none());
        assert_eq!(Echo.generate(request).await.unwrap(), "Question: hi\nAnswer: ");
    }
}
