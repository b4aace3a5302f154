//! Shared test doubles for pipeline tests.

use async_trait::async_trait;
use lingobridge_core::error::{GenerationError, TranslationError};
use lingobridge_core::generation::{GenerationRequest, Generator};
use lingobridge_core::translation::Translator;
use std::sync::Mutex;
use std::time::Duration;

/// A generator that returns a sequence of scripted results.
///
/// Each call to `generate` returns the next result in the queue and records
/// the request. Panics if more calls are made than results provided.
pub struct ScriptedGenerator {
    results: Mutex<Vec<Result<String, GenerationError>>>,
    requests: Mutex<Vec<GenerationRequest>>,
    delay: Duration,
}

impl ScriptedGenerator {
    pub fn new(results: Vec<Result<String, GenerationError>>) -> Self {
        Self {
            results: Mutex::new(results),
            requests: Mutex::new(Vec::new()),
            delay: Duration::ZERO,
        }
    }

    /// Answer each call only after `delay`.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Generator that answers every call with the given texts in order.
    pub fn answers(texts: &[&str]) -> Self {
        Self::new(texts.iter().map(|t| Ok(t.to_string())).collect())
    }

    pub fn failing(error: GenerationError) -> Self {
        Self::new(vec![Err(error)])
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn prompts(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.prompt.clone())
            .collect()
    }

    pub fn last_request(&self) -> Option<GenerationRequest> {
        self.requests.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl Generator for ScriptedGenerator {
    fn name(&self) -> &str {
        "scripted_mock"
    }

    async fn generate(&self, request: GenerationRequest) -> Result<String, GenerationError> {
        let call = {
            let mut requests = self.requests.lock().unwrap();
            requests.push(request);
            requests.len() - 1
        };
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        let results = self.results.lock().unwrap();
        match results.get(call) {
            Some(result) => result.clone(),
            None => panic!(
                "ScriptedGenerator: no more results (call #{}, have {})",
                call,
                results.len()
            ),
        }
    }
}

/// A generator that never answers (for timeout testing).
pub struct HangingGenerator;

#[async_trait]
impl Generator for HangingGenerator {
    fn name(&self) -> &str {
        "hanging"
    }

    async fn generate(&self, _request: GenerationRequest) -> Result<String, GenerationError> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        unreachable!()
    }
}

type TranslateFn = dyn Fn(&str, &str) -> Result<String, TranslationError> + Send + Sync;

/// A translator driven by a closure that records every `(text, target)` call.
pub struct RecordingTranslator {
    respond: Box<TranslateFn>,
    hang: bool,
    calls: Mutex<Vec<(String, String)>>,
}

impl RecordingTranslator {
    pub fn new(
        respond: impl Fn(&str, &str) -> Result<String, TranslationError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            respond: Box::new(respond),
            hang: false,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Fails every call with a network error.
    pub fn failing() -> Self {
        Self::new(|_, _| Err(TranslationError::Network("translation service down".into())))
    }

    /// Never returns.
    pub fn hanging() -> Self {
        Self {
            hang: true,
            ..Self::failing()
        }
    }

    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn targets(&self) -> Vec<String> {
        self.calls().into_iter().map(|(_, target)| target).collect()
    }
}

#[async_trait]
impl Translator for RecordingTranslator {
    fn name(&self) -> &str {
        "recording_mock"
    }

    async fn translate(&self, text: &str, target_language: &str) -> Result<String, TranslationError> {
        self.calls
            .lock()
            .unwrap()
            .push((text.to_string(), target_language.to_string()));
        if self.hang {
            tokio::time::sleep(Duration::from_secs(3600)).await;
        }
        (self.respond)(text, target_language)
    }
}
