//! Translation and language-detection traits.
//!
//! Both services are best-effort collaborators: callers must treat every
//! error (or empty result) as "no translation happened".

use async_trait::async_trait;
use crate::error::TranslationError;

/// Translates text into a target language, auto-detecting the source.
#[async_trait]
pub trait Translator: Send + Sync {
    fn name(&self) -> &str;

    /// Translate `text` into `target_language` (BCP-47-ish code, e.g. "th", "zh-CN").
    async fn translate(
        &self,
        text: &str,
        target_language: &str,
    ) -> std::result::Result<String, TranslationError>;
}

/// Detects the language of a text.
#[async_trait]
pub trait LanguageDetector: Send + Sync {
    fn name(&self) -> &str;

    /// Return the language code of `text`.
    async fn detect(&self, text: &str) -> std::result::Result<String, TranslationError>;
}

/// Compare two language codes ignoring case and region ("zh-CN" ~ "zh").
pub fn same_language(a: &str, b: &str) -> bool {
    fn primary(code: &str) -> String {
        code.trim()
            .split(['-', '_'])
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase()
    }
    let (a, b) = (primary(a), primary(b));
    !a.is_empty() && a == b
}
