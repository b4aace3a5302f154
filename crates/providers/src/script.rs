//! Offline language detection by Unicode script.
//!
//! Cheap and dependency-free at runtime: the language is inferred from the
//! dominant script of the letters in the text. Good enough to tell Thai from
//! Chinese from Latin-script answers, which is all the pipeline needs.

use async_trait::async_trait;
use lingobridge_core::error::TranslationError;
use lingobridge_core::translation::LanguageDetector;
use std::collections::HashMap;
use unicode_script::{Script, UnicodeScript};

/// Scripts a language is normally written in.
pub fn scripts_for_language(code: &str) -> &'static [Script] {
    let primary = code
        .trim()
        .split(['-', '_'])
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase();

    match primary.as_str() {
        "th" => &[Script::Thai],
        "zh" => &[Script::Han],
        "ja" => &[Script::Hiragana, Script::Katakana],
        "ko" => &[Script::Hangul],
        "ru" | "uk" | "bg" | "sr" => &[Script::Cyrillic],
        "ar" | "fa" | "ur" => &[Script::Arabic],
        "hi" | "mr" | "ne" => &[Script::Devanagari],
        "el" => &[Script::Greek],
        "he" => &[Script::Hebrew],
        "lo" => &[Script::Lao],
        "km" => &[Script::Khmer],
        "my" => &[Script::Myanmar],
        "en" | "fr" | "de" | "es" | "it" | "pt" | "nl" | "vi" | "id" | "ms" | "tr" | "pl"
        | "sv" | "da" | "no" | "fi" | "cs" | "ro" | "hu" => &[Script::Latin],
        _ => &[],
    }
}

/// Whether `text` already contains characters of the script `language` is written in.
///
/// Unknown languages never match, so callers fall through to a real translation.
pub fn is_written_in(text: &str, language: &str) -> bool {
    let scripts = scripts_for_language(language);
    !scripts.is_empty() && text.chars().any(|c| scripts.contains(&c.script()))
}

fn language_for_script(script: Script) -> Option<&'static str> {
    match script {
        Script::Thai => Some("th"),
        Script::Han => Some("zh-CN"),
        Script::Hiragana | Script::Katakana => Some("ja"),
        Script::Hangul => Some("ko"),
        Script::Cyrillic => Some("ru"),
        Script::Arabic => Some("ar"),
        Script::Devanagari => Some("hi"),
        Script::Greek => Some("el"),
        Script::Hebrew => Some("he"),
        Script::Lao => Some("lo"),
        Script::Khmer => Some("km"),
        Script::Myanmar => Some("my"),
        Script::Latin => Some("en"),
        _ => None,
    }
}

/// Detects language from the dominant Unicode script.
#[derive(Debug, Default, Clone, Copy)]
pub struct ScriptDetector;

impl ScriptDetector {
    pub fn new() -> Self {
        Self
    }

    /// Synchronous detection, also used by the async trait impl.
    pub fn detect_script(&self, text: &str) -> Option<&'static str> {
        let mut counts: HashMap<Script, usize> = HashMap::new();
        for c in text.chars().filter(|c| c.is_alphabetic()) {
            let script = c.script();
            if !matches!(script, Script::Common | Script::Inherited | Script::Unknown) {
                *counts.entry(script).or_default() += 1;
            }
        }

        // Japanese mixes kanji with kana; any kana means Japanese
        let kana = counts.get(&Script::Hiragana).copied().unwrap_or(0)
            + counts.get(&Script::Katakana).copied().unwrap_or(0);
        if kana > 0 {
            return Some("ja");
        }

        counts
            .into_iter()
            .filter_map(|(script, n)| language_for_script(script).map(|lang| (lang, n)))
            .max_by(|a, b| a.1.cmp(&b.1).then_with(|| b.0.cmp(a.0)))
            .map(|(lang, _)| lang)
    }
}

#[async_trait]
impl LanguageDetector for ScriptDetector {
    fn name(&self) -> &str {
        "script"
    }

    async fn detect(&self, text: &str) -> std::result::Result<String, TranslationError> {
        self.detect_script(text)
            .map(str::to_string)
            .ok_or(TranslationError::Undetectable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_dominant_script() {
        let d = ScriptDetector::new();
        assert_eq!(d.detect_script("สวัสดีครับ"), Some("th"));
        assert_eq!(d.detect_script("你好，世界"), Some("zh-CN"));
        assert_eq!(d.detect_script("こんにちは世界"), Some("ja"));
        assert_eq!(d.detect_script("안녕하세요"), Some("ko"));
        assert_eq!(d.detect_script("Hello there"), Some("en"));
        assert_eq!(d.detect_script("Привет"), Some("ru"));
    }

    #[test]
    fn mixed_text_follows_majority() {
        let d = ScriptDetector::new();
        assert_eq!(d.detect_script("ภาษา Python คือภาษาโปรแกรม"), Some("th"));
        assert_eq!(d.detect_script("用 Python 写一个函数来读取文件"), Some("zh-CN"));
    }

    #[test]
    fn no_letters_is_undetectable() {
        let d = ScriptDetector::new();
        assert_eq!(d.detect_script("12345 !?"), None);
        assert_eq!(d.detect_script(""), None);
    }

    #[tokio::test]
    async fn trait_detect_reports_undetectable() {
        let err = ScriptDetector.detect("...").await.unwrap_err();
        assert!(matches!(err, TranslationError::Undetectable));
        assert_eq!(ScriptDetector.detect("ทดสอบ").await.unwrap(), "th");
    }

    #[test]
    fn is_written_in_checks_destination_script() {
        assert!(is_written_in("你好 world", "zh-CN"));
        assert!(!is_written_in("Hello", "zh-CN"));
        assert!(is_written_in("สวัสดี", "th"));
        assert!(!is_written_in("สวัสดี", "en"));
        assert!(!is_written_in("anything", "xx"));
    }
}
