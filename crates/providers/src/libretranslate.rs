//! LibreTranslate-compatible translation and detection client.
//!
//! Endpoints used:
//! - `POST /translate` `{q, source: "auto", target, format: "text"}` → `{translatedText}`
//! - `POST /detect` `{q}` → `[{language, confidence}]`

use async_trait::async_trait;
use lingobridge_core::error::TranslationError;
use lingobridge_core::translation::{LanguageDetector, Translator};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

pub struct LibreTranslateClient {
    base_url: String,
    api_key: Option<String>,
    client: reqwest::Client,
}

impl LibreTranslateClient {
    pub fn new(base_url: impl Into<String>, api_key: Option<String>, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.filter(|k| !k.is_empty()),
            client,
        }
    }

    async fn post<B: Serialize + Sync, R: DeserializeOwned>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<R, TranslationError> {
        let url = format!("{}/{endpoint}", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    TranslationError::Timeout(e.to_string())
                } else {
                    TranslationError::Network(e.to_string())
                }
            })?;

        let status = response.status().as_u16();
        if !(200..300).contains(&status) {
            let error_body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiError>(&error_body)
                .map(|e| e.error)
                .unwrap_or(error_body);
            warn!(status, endpoint, error = %message, "Translation service returned error");
            return Err(TranslationError::ServiceError {
                status_code: status,
                message,
            });
        }

        response.json().await.map_err(|e| TranslationError::ServiceError {
            status_code: status,
            message: format!("Failed to parse response: {e}"),
        })
    }
}

/// Map our language codes to LibreTranslate's.
fn to_service_code(code: &str) -> String {
    match code.trim() {
        "zh-CN" | "zh-cn" | "zh-Hans" | "zh_CN" => "zh".into(),
        "zh-TW" | "zh-tw" | "zh-Hant" | "zh_TW" => "zt".into(),
        other => other
            .split(['-', '_'])
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase(),
    }
}

/// Map LibreTranslate's language codes back to ours.
fn from_service_code(code: &str) -> String {
    match code {
        "zh" | "zh-Hans" => "zh-CN".into(),
        "zt" | "zh-Hant" => "zh-TW".into(),
        other => other.to_string(),
    }
}

#[async_trait]
impl Translator for LibreTranslateClient {
    fn name(&self) -> &str {
        "libretranslate"
    }

    async fn translate(
        &self,
        text: &str,
        target_language: &str,
    ) -> std::result::Result<String, TranslationError> {
        let target = to_service_code(target_language);
        if target.is_empty() {
            return Err(TranslationError::UnsupportedLanguage(target_language.into()));
        }

        debug!(target = %target, chars = text.chars().count(), "Translating");

        let body = TranslateRequest {
            q: text,
            source: "auto",
            target: &target,
            format: "text",
            api_key: self.api_key.as_deref(),
        };
        let response: TranslateResponse = self.post("translate", &body).await?;

        if response.translated_text.trim().is_empty() {
            return Err(TranslationError::EmptyResult);
        }
        Ok(response.translated_text)
    }
}

#[async_trait]
impl LanguageDetector for LibreTranslateClient {
    fn name(&self) -> &str {
        "libretranslate"
    }

    async fn detect(&self, text: &str) -> std::result::Result<String, TranslationError> {
        let body = DetectRequest {
            q: text,
            api_key: self.api_key.as_deref(),
        };
        let candidates: Vec<DetectCandidate> = self.post("detect", &body).await?;

        candidates
            .into_iter()
            .max_by(|a, b| a.confidence.total_cmp(&b.confidence))
            .map(|c| from_service_code(&c.language))
            .ok_or(TranslationError::Undetectable)
    }
}

// ── API types ──

#[derive(Debug, Serialize)]
struct TranslateRequest<'a> {
    q: &'a str,
    source: &'a str,
    target: &'a str,
    format: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    api_key: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TranslateResponse {
    translated_text: String,
}

#[derive(Debug, Serialize)]
struct DetectRequest<'a> {
    q: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    api_key: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct DetectCandidate {
    language: String,
    #[serde(default)]
    confidence: f64,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    error: String,
}
