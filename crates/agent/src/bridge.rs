//! Best-effort translation with a fallback chain.
//!
//! Translation is an enhancement, never a requirement: every failure,
//! timeout or empty result degrades to the input text. Outcomes are returned
//! as values ([`Translation`], [`RecoveredText`]) so callers can see what
//! happened without any error escaping.

use std::sync::Arc;
use std::time::Duration;
use lingobridge_core::error::TranslationError;
use lingobridge_core::translation::{LanguageDetector, Translator};
use lingobridge_providers::script::is_written_in;
use tracing::{debug, warn};

/// Why a translation was not attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Input was empty or whitespace
    Blank,
    /// Input already uses the target language's script
    AlreadyInTarget,
    /// Bridging is switched off
    Disabled,
}

/// What a single translation attempt did.
#[derive(Debug, Clone)]
pub enum TranslationStatus {
    Translated,
    Skipped(SkipReason),
    /// The service failed; the text is the untranslated input
    Degraded(TranslationError),
}

/// Result of [`TranslationBridge::translate`]. Always carries usable text.
#[derive(Debug, Clone)]
pub struct Translation {
    pub text: String,
    pub status: TranslationStatus,
}

impl Translation {
    pub fn skipped(text: impl Into<String>, reason: SkipReason) -> Self {
        Self {
            text: text.into(),
            status: TranslationStatus::Skipped(reason),
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self.status, TranslationStatus::Degraded(_))
    }
}

/// How display-language recovery ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryRoute {
    /// One hop into the display language
    Direct,
    /// Source → intermediate → display
    ViaIntermediate,
    /// Every hop failed; original text returned
    Unchanged,
}

/// Result of [`TranslationBridge::translate_with_fallback`].
#[derive(Debug, Clone)]
pub struct RecoveredText {
    pub text: String,
    pub route: RecoveryRoute,
    /// Failures seen along the way, in order
    pub failures: Vec<TranslationError>,
}

/// Stateless façade over the translation and detection services.
pub struct TranslationBridge {
    translator: Arc<dyn Translator>,
    detector: Arc<dyn LanguageDetector>,
    display_language: String,
    intermediate_language: String,
    /// Returned when detection fails; defaults to the display language
    undetected_language: String,
    timeout: Duration,
}

impl TranslationBridge {
    pub fn new(translator: Arc<dyn Translator>, detector: Arc<dyn LanguageDetector>) -> Self {
        Self {
            translator,
            detector,
            display_language: "th".into(),
            intermediate_language: "en".into(),
            undetected_language: "th".into(),
            timeout: Duration::from_secs(15),
        }
    }

    /// Set the display language (also used as the undetected fallback).
    pub fn with_display_language(mut self, language: impl Into<String>) -> Self {
        self.display_language = language.into();
        self.undetected_language = self.display_language.clone();
        self
    }

    pub fn with_intermediate_language(mut self, language: impl Into<String>) -> Self {
        self.intermediate_language = language.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn display_language(&self) -> &str {
        &self.display_language
    }

    pub fn intermediate_language(&self) -> &str {
        &self.intermediate_language
    }

    /// Detect the language of `text`, failing closed to the display language.
    pub async fn detect(&self, text: &str) -> String {
        if text.trim().is_empty() {
            return self.undetected_language.clone();
        }

        match tokio::time::timeout(self.timeout, self.detector.detect(text)).await {
            Ok(Ok(code)) if !code.trim().is_empty() => code,
            Ok(Ok(_)) => self.undetected_language.clone(),
            Ok(Err(e)) => {
                debug!(detector = %self.detector.name(), error = %e, "Language detection failed, assuming display language");
                self.undetected_language.clone()
            }
            Err(_) => {
                warn!(
                    detector = %self.detector.name(),
                    timeout_secs = self.timeout.as_secs(),
                    "Language detection timed out, assuming display language"
                );
                self.undetected_language.clone()
            }
        }
    }

    /// Translate `text` into `target_language`.
    ///
    /// Blank input and input already written in the target script are returned
    /// without calling the service.
    pub async fn translate(&self, text: &str, target_language: &str) -> Translation {
        if text.trim().is_empty() {
            return Translation::skipped(text, SkipReason::Blank);
        }
        if is_written_in(text, target_language) {
            debug!(target = %target_language, "Text already in target script, skipping translation");
            return Translation::skipped(text, SkipReason::AlreadyInTarget);
        }

        let result = tokio::time::timeout(
            self.timeout,
            self.translator.translate(text, target_language),
        )
        .await
        .unwrap_or_else(|_| {
            Err(TranslationError::Timeout(format!(
                "Translation to '{}' timed out after {}s",
                target_language,
                self.timeout.as_secs()
            )))
        })
        .and_then(|translated| {
            if translated.trim().is_empty() {
                Err(TranslationError::EmptyResult)
            } else {
                Ok(translated)
            }
        });

        match result {
            Ok(translated) => Translation {
                text: translated,
                status: TranslationStatus::Translated,
            },
            Err(e) => {
                warn!(
                    translator = %self.translator.name(),
                    target = %target_language,
                    error = %e,
                    "Translation degraded, keeping original text"
                );
                Translation {
                    text: text.to_string(),
                    status: TranslationStatus::Degraded(e),
                }
            }
        }
    }

    /// Recover the display language: direct hop, then a two-hop route through
    /// the intermediate language, then the original text.
    pub async fn translate_with_fallback(&self, text: &str) -> RecoveredText {
        let mut failures = Vec::new();

        if text.trim().is_empty() {
            return RecoveredText {
                text: text.to_string(),
                route: RecoveryRoute::Unchanged,
                failures,
            };
        }

        let direct = self.translate(text, &self.display_language).await;
        match direct.status {
            TranslationStatus::Degraded(e) => failures.push(e),
            _ => {
                return RecoveredText {
                    text: direct.text,
                    route: RecoveryRoute::Direct,
                    failures,
                };
            }
        }

        debug!(
            intermediate = %self.intermediate_language,
            "Direct recovery failed, trying intermediate language"
        );

        let hop = self.translate(text, &self.intermediate_language).await;
        if let TranslationStatus::Degraded(e) = hop.status {
            failures.push(e);
            return RecoveredText {
                text: text.to_string(),
                route: RecoveryRoute::Unchanged,
                failures,
            };
        }

        let back = self.translate(&hop.text, &self.display_language).await;
        match back.status {
            TranslationStatus::Degraded(e) => {
                failures.push(e);
                RecoveredText {
                    text: text.to_string(),
                    route: RecoveryRoute::Unchanged,
                    failures,
                }
            }
            _ => RecoveredText {
                text: back.text,
                route: RecoveryRoute::ViaIntermediate,
                failures,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::RecordingTranslator;
    use lingobridge_providers::ScriptDetector;

    fn bridge(translator: Arc<RecordingTranslator>) -> TranslationBridge {
        TranslationBridge::new(translator, Arc::new(ScriptDetector))
            .with_display_language("th")
            .with_intermediate_language("en")
    }

    #[tokio::test]
    async fn blank_text_is_noop() {
        let translator = Arc::new(RecordingTranslator::failing());
        let out = bridge(translator.clone()).translate("   ", "zh-CN").await;
        assert_eq!(out.text, "   ");
        assert!(matches!(out.status, TranslationStatus::Skipped(SkipReason::Blank)));
        assert_eq!(translator.calls().len(), 0);
    }

    #[tokio::test]
    async fn text_already_in_target_script_is_noop() {
        let translator = Arc::new(RecordingTranslator::failing());
        let out = bridge(translator.clone()).translate("你好", "zh-CN").await;
        assert_eq!(out.text, "你好");
        assert!(matches!(
            out.status,
            TranslationStatus::Skipped(SkipReason::AlreadyInTarget)
        ));
        assert!(translator.calls().is_empty());
    }

    #[tokio::test]
    async fn failure_degrades_to_input() {
        let translator = Arc::new(RecordingTranslator::failing());
        let out = bridge(translator.clone()).translate("Hello", "zh-CN").await;
        assert_eq!(out.text, "Hello");
        assert!(out.is_degraded());
        assert_eq!(translator.calls().len(), 1);
    }

    #[tokio::test]
    async fn empty_result_degrades_to_input() {
        let translator = Arc::new(RecordingTranslator::new(|_, _| Ok("  ".into())));
        let out = bridge(translator).translate("Hello", "zh-CN").await;
        assert_eq!(out.text, "Hello");
        assert!(matches!(
            out.status,
            TranslationStatus::Degraded(TranslationError::EmptyResult)
        ));
    }

    #[tokio::test]
    async fn slow_translation_times_out_as_degraded() {
        let translator = Arc::new(RecordingTranslator::hanging());
        let out = bridge(translator)
            .with_timeout(Duration::from_millis(20))
            .translate("Hello", "zh-CN")
            .await;
        assert_eq!(out.text, "Hello");
        assert!(matches!(
            out.status,
            TranslationStatus::Degraded(TranslationError::Timeout(_))
        ));
    }

    #[tokio::test]
    async fn fallback_direct_hop() {
        let translator = Arc::new(RecordingTranslator::new(|_, target| match target {
            "th" => Ok("สวัสดี".into()),
            _ => Ok("hello".into()),
        }));
        let out = bridge(translator.clone()).translate_with_fallback("你好").await;
        assert_eq!(out.text, "สวัสดี");
        assert_eq!(out.route, RecoveryRoute::Direct);
        assert_eq!(translator.targets(), vec!["th"]);
    }

    #[tokio::test]
    async fn fallback_goes_through_intermediate_when_direct_blank() {
        let translator = Arc::new(RecordingTranslator::new(|text, target| match (text, target) {
            ("こんにちは", "th") => Ok(String::new()),
            ("こんにちは", "en") => Ok("hello".into()),
            ("hello", "th") => Ok("สวัสดี".into()),
            _ => Err(TranslationError::UnsupportedLanguage(target.into())),
        }));
        let out = bridge(translator.clone())
            .translate_with_fallback("こんにちは")
            .await;
        assert_eq!(out.text, "สวัสดี");
        assert_eq!(out.route, RecoveryRoute::ViaIntermediate);
        assert_eq!(out.failures.len(), 1);
        assert_eq!(translator.targets(), vec!["th", "en", "th"]);
    }

    #[tokio::test]
    async fn fallback_never_fails_and_returns_original() {
        let translator = Arc::new(RecordingTranslator::failing());
        let out = bridge(translator.clone()).translate_with_fallback("你好").await;
        assert_eq!(out.text, "你好");
        assert_eq!(out.route, RecoveryRoute::Unchanged);
        assert_eq!(out.failures.len(), 2);
    }

    #[tokio::test]
    async fn fallback_second_hop_failure_returns_original() {
        let translator = Arc::new(RecordingTranslator::new(|_, target| match target {
            "en" => Ok("hello".into()),
            _ => Err(TranslationError::Network("down".into())),
        }));
        let out = bridge(translator).translate_with_fallback("你好").await;
        assert_eq!(out.text, "你好");
        assert_eq!(out.route, RecoveryRoute::Unchanged);
        assert_eq!(out.failures.len(), 2);
    }

    #[tokio::test]
    async fn detect_fails_closed_to_display_language() {
        let b = bridge(Arc::new(RecordingTranslator::failing()));
        assert_eq!(b.detect("12345").await, "th");
        assert_eq!(b.detect("").await, "th");
        assert_eq!(b.detect("你好").await, "zh-CN");
    }
}
