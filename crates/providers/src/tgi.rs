//! Text-generation-inference client.
//!
//! Talks to any server exposing the Hugging Face `POST /generate` contract
//! (text-generation-inference, Inference Endpoints, and transformers-based
//! shims). Beam-search knobs (`num_beams`, `length_penalty`,
//! `no_repeat_ngram_size`) are forwarded as-is; servers that do not support
//! them ignore unknown parameters.

use async_trait::async_trait;
use lingobridge_core::error::GenerationError;
use lingobridge_core::generation::{GenerationRequest, Generator};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

/// A generation backend speaking the TGI `/generate` API.
pub struct TgiGenerator {
    name: String,
    base_url: String,
    api_key: Option<String>,
    client: reqwest::Client,
}

impl TgiGenerator {
    /// Create a client for `base_url` (e.g. `http://localhost:8080`).
    pub fn new(base_url: impl Into<String>, api_key: Option<String>, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to create HTTP client");

        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            name: format!("tgi:{base_url}"),
            base_url,
            api_key: api_key.filter(|k| !k.is_empty()),
            client,
        }
    }

    fn to_api_request(request: &GenerationRequest) -> ApiRequest<'_> {
        let params = request.params.effective();
        ApiRequest {
            inputs: &request.prompt,
            parameters: ApiParameters {
                max_new_tokens: params.max_new_tokens,
                temperature: params.temperature,
                top_p: params.top_p,
                top_k: (params.top_k > 0).then_some(params.top_k),
                repetition_penalty: params.repetition_penalty,
                num_beams: params.beam_count,
                length_penalty: params.length_penalty,
                no_repeat_ngram_size: params.no_repeat_ngram_size,
                truncate: request.max_input_length,
                do_sample: true,
                return_full_text: false,
            },
        }
    }
}

#[async_trait]
impl Generator for TgiGenerator {
    fn name(&self) -> &str {
        &self.name
    }

    async fn generate(
        &self,
        request: GenerationRequest,
    ) -> std::result::Result<String, GenerationError> {
        let url = format!("{}/generate", self.base_url);
        let body = Self::to_api_request(&request);

        debug!(
            backend = %self.name,
            prompt_chars = request.prompt.chars().count(),
            max_new_tokens = body.parameters.max_new_tokens,
            "Sending generation request"
        );

        let mut http = self.client.post(&url).json(&body);
        if let Some(key) = &self.api_key {
            http = http.bearer_auth(key);
        }

        let response = http.send().await.map_err(|e| {
            if e.is_timeout() {
                GenerationError::Timeout(e.to_string())
            } else {
                GenerationError::Network(e.to_string())
            }
        })?;

        let status = response.status().as_u16();

        if status == 429 || status == 503 {
            let error_body = response.text().await.unwrap_or_default();
            return Err(GenerationError::ResourceExhausted(error_body));
        }

        if !(200..300).contains(&status) {
            let error_body = response.text().await.unwrap_or_default();
            warn!(status, body = %error_body, "Generation service returned error");
            return Err(GenerationError::ServiceError {
                status_code: status,
                message: error_body,
            });
        }

        let api_response: ApiResponse =
            response.json().await.map_err(|e| GenerationError::ServiceError {
                status_code: status,
                message: format!("Failed to parse response: {e}"),
            })?;

        api_response
            .into_text()
            .ok_or(GenerationError::EmptyOutput)
    }

    async fn health_check(&self) -> std::result::Result<bool, GenerationError> {
        let url = format!("{}/health", self.base_url);
        match self.client.get(&url).send().await {
            Ok(resp) => Ok(resp.status().is_success()),
            Err(e) => Err(GenerationError::Network(e.to_string())),
        }
    }
}

// ── API types ──

#[derive(Debug, Serialize)]
struct ApiRequest<'a> {
    inputs: &'a str,
    parameters: ApiParameters,
}

#[derive(Debug, Serialize)]
struct ApiParameters {
    max_new_tokens: u32,
    temperature: f32,
    top_p: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_k: Option<u32>,
    repetition_penalty: f32,
    num_beams: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    length_penalty: Option<f32>,
    no_repeat_ngram_size: u32,
    truncate: usize,
    do_sample: bool,
    return_full_text: bool,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ApiResponse {
    Single(ApiGeneration),
    Batch(Vec<ApiGeneration>),
}

#[derive(Debug, Deserialize)]
struct ApiGeneration {
    generated_text: String,
}

impl ApiResponse {
    fn into_text(self) -> Option<String> {
        match self {
            ApiResponse::Single(g) => Some(g.generated_text),
            ApiResponse::Batch(batch) => batch.into_iter().next().map(|g| g.generated_text),
        }
    }
}
