//! Identity translator, used when no translation service is configured.

use async_trait::async_trait;
use lingobridge_core::error::TranslationError;
use lingobridge_core::translation::Translator;

/// Returns every input unchanged.
#[derive(Debug, Default, Clone, Copy)]
pub struct IdentityTranslator;

#[async_trait]
impl Translator for IdentityTranslator {
    fn name(&self) -> &str {
        "identity"
    }

    async fn translate(
        &self,
        text: &str,
        _target_language: &str,
    ) -> std::result::Result<String, TranslationError> {
        Ok(text.to_string())
    }
}
