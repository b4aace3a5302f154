//! Turns configuration into concrete service clients.

use std::sync::Arc;
use std::time::Duration;
use lingobridge_config::AppConfig;
use lingobridge_core::generation::Generator;
use lingobridge_core::translation::{LanguageDetector, Translator};
use tracing::info;
use crate::fallback::FallbackGenerator;
use crate::identity::IdentityTranslator;
use crate::libretranslate::LibreTranslateClient;
use crate::script::ScriptDetector;
use crate::tgi::TgiGenerator;

/// The external collaborators of one assistant deployment.
#[derive(Clone)]
pub struct Services {
    pub generator: Arc<dyn Generator>,
    pub translator: Arc<dyn Translator>,
    pub detector: Arc<dyn LanguageDetector>,
}

/// Build service clients from configuration.
pub fn build_from_config(config: &AppConfig) -> Services {
    Services {
        generator: build_generator(config),
        translator: build_translator(config),
        detector: build_detector(config),
    }
}

fn build_generator(config: &AppConfig) -> Arc<dyn Generator> {
    let generation = &config.generation;
    let timeout = Duration::from_secs(generation.timeout_secs);

    let primary: Arc<dyn Generator> = Arc::new(TgiGenerator::new(
        &generation.api_url,
        generation.api_key.clone(),
        timeout,
    ));

    if generation.fallback_urls.is_empty() {
        return primary;
    }

    let chain = generation.fallback_urls.iter().fold(
        FallbackGenerator::new("fallback").endpoint(primary, timeout),
        |chain, url| {
            let generator = TgiGenerator::new(url, generation.api_key.clone(), timeout);
            chain.endpoint(Arc::new(generator), timeout)
        },
    );
    info!(
        endpoints = chain.len(),
        budget_secs = chain.budget().as_secs(),
        "Generation fallback chain configured"
    );
    Arc::new(chain)
}

fn build_translator(config: &AppConfig) -> Arc<dyn Translator> {
    let translation = &config.translation;
    match translation.backend.as_str() {
        "none" => Arc::new(IdentityTranslator),
        _ => Arc::new(LibreTranslateClient::new(
            &translation.api_url,
            translation.api_key.clone(),
            Duration::from_secs(translation.timeout_secs),
        )),
    }
}

fn build_detector(config: &AppConfig) -> Arc<dyn LanguageDetector> {
    let translation = &config.translation;
    match translation.detector.as_str() {
        "service" => Arc::new(LibreTranslateClient::new(
            &translation.api_url,
            translation.api_key.clone(),
            Duration::from_secs(translation.timeout_secs),
        )),
        _ => Arc::new(ScriptDetector),
    }
}
