//! Operating modes: named profiles that trade latency against depth.
//!
//! A [`ModeConfig`] is a fully self-contained record: generation parameters,
//! context-window size, input-length cap and system prompt. The
//! [`ModeConfigRegistry`] validates every mode once at construction; lookups
//! afterwards are infallible and unknown ids resolve to the default mode.

use serde::{Deserialize, Serialize};
use crate::error::ModeError;

/// Identifier of a mode. Always trimmed and lowercase.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct ModeId(String);

impl ModeId {
    pub const FAST: &'static str = "fast";
    pub const BALANCED: &'static str = "balanced";
    pub const SMART: &'static str = "smart";

    pub fn new(id: impl AsRef<str>) -> Self {
        Self(id.as_ref().trim().to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for ModeId {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<&str> for ModeId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<ModeId> for String {
    fn from(value: ModeId) -> Self {
        value.0
    }
}

impl std::fmt::Display for ModeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(&self.0)
    }
}

/// Sampling and decoding parameters forwarded to the generation service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationParams {
    /// Maximum tokens to generate
    pub max_new_tokens: u32,

    /// Sampling temperature
    pub temperature: f32,

    /// Nucleus sampling cutoff
    pub top_p: f32,

    /// Top-k cutoff (0 disables)
    pub top_k: u32,

    /// Beam search width (1 = plain sampling)
    pub beam_count: u32,

    pub repetition_penalty: f32,

    /// Only meaningful with beam search
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length_penalty: Option<f32>,

    /// 0 disables
    pub no_repeat_ngram_size: u32,
}

impl GenerationParams {
    /// The parameter set actually sent to the service.
    ///
    /// `length_penalty` only applies to beam search and is dropped for
    /// single-beam decoding.
    pub fn effective(&self) -> Self {
        let mut params = self.clone();
        if params.beam_count <= 1 {
            params.length_penalty = None;
        }
        params
    }

    fn validate(&self) -> Result<(), String> {
        if self.max_new_tokens == 0 || self.max_new_tokens > 4096 {
            return Err("max_new_tokens must be between 1 and 4096".into());
        }
        if !(self.temperature > 0.0 && self.temperature <= 2.0) {
            return Err("temperature must be in (0, 2]".into());
        }
        if !(self.top_p > 0.0 && self.top_p <= 1.0) {
            return Err("top_p must be in (0, 1]".into());
        }
        if self.beam_count == 0 || self.beam_count > 16 {
            return Err("beam_count must be between 1 and 16".into());
        }
        if !(self.repetition_penalty > 0.0 && self.repetition_penalty <= 10.0) {
            return Err("repetition_penalty must be in (0, 10]".into());
        }
        if let Some(lp) = self.length_penalty {
            if !lp.is_finite() {
                return Err("length_penalty must be finite".into());
            }
        }
        if self.no_repeat_ngram_size > 32 {
            return Err("no_repeat_ngram_size must be at most 32".into());
        }
        Ok(())
    }
}

/// A complete operating profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModeConfig {
    pub id: ModeId,

    /// One-line summary shown to users
    #[serde(default)]
    pub description: String,

    #[serde(flatten)]
    pub generation: GenerationParams,

    /// Turns of history included in each prompt; the store keeps twice as many entries
    pub max_context_turns: usize,

    /// Prompt budget in tokens
    pub max_input_length: usize,

    pub system_prompt: String,
}

impl ModeConfig {
    /// Entry cap of the conversation context under this mode.
    pub fn context_capacity(&self) -> usize {
        self.max_context_turns * 2
    }

    pub fn validate(&self) -> Result<(), ModeError> {
        let invalid = |reason: String| ModeError::Invalid {
            mode: self.id.to_string(),
            reason,
        };

        if self.id.as_str().is_empty() {
            return Err(invalid("mode id must not be empty".into()));
        }
        self.generation.validate().map_err(invalid)?;
        if self.max_context_turns == 0 || self.max_context_turns > 64 {
            return Err(invalid("max_context_turns must be between 1 and 64".into()));
        }
        if self.max_input_length < 16 {
            return Err(invalid("max_input_length must be at least 16".into()));
        }
        if self.system_prompt.trim().is_empty() {
            return Err(invalid("system_prompt must not be empty".into()));
        }
        Ok(())
    }

    /// Fast mode: short answers, single-beam sampling, small windows.
    pub fn fast() -> Self {
        Self {
            id: ModeId::new(ModeId::FAST),
            description: "โหมดเร็ว: ตอบสั้นกระชับ เหมาะสำหรับคำถามทั่วไป ใช้ทรัพยากรน้อย".into(),
            generation: GenerationParams {
                max_new_tokens: 32,
                temperature: 0.8,
                top_p: 0.95,
                top_k: 50,
                beam_count: 1,
                repetition_penalty: 1.1,
                length_penalty: Some(0.8),
                no_repeat_ngram_size: 2,
            },
            max_context_turns: 3,
            max_input_length: 128,
            system_prompt: "You are a fast and efficient AI assistant. Provide concise and direct responses.\n\
                Focus on key points and keep explanations brief:\n\
                - Programming: Show minimal working examples\n\
                - Math: Quick solutions\n\
                - Knowledge: Core concepts only\n\
                - Technical: Key points only"
                .into(),
        }
    }

    /// Balanced mode: the default profile.
    pub fn balanced() -> Self {
        Self {
            id: ModeId::new(ModeId::BALANCED),
            description: "โหมดสมดุล: สมดุลระหว่างความเร็วและความละเอียด เหมาะสำหรับการเขียนโค้ดและการอธิบายแนวคิด".into(),
            generation: GenerationParams {
                max_new_tokens: 64,
                temperature: 0.7,
                top_p: 0.92,
                top_k: 40,
                beam_count: 2,
                repetition_penalty: 1.2,
                length_penalty: Some(1.0),
                no_repeat_ngram_size: 3,
            },
            max_context_turns: 5,
            max_input_length: 256,
            system_prompt: "You are an intelligent AI assistant. Please provide detailed and accurate responses.\n\
                If the question is about:\n\
                - Programming: Include code examples and explanations\n\
                - Math: Show step-by-step solutions\n\
                - General Knowledge: Provide comprehensive explanations with examples\n\
                - Technical Topics: Break down complex concepts"
                .into(),
        }
    }

    /// Smart mode: longest answers, widest beam search, largest windows.
    pub fn smart() -> Self {
        Self {
            id: ModeId::new(ModeId::SMART),
            description: "โหมดฉลาด: วิเคราะห์ละเอียด ให้คำอธิบายเชิงลึกพร้อมตัวอย่าง".into(),
            generation: GenerationParams {
                max_new_tokens: 128,
                temperature: 0.5,
                top_p: 0.85,
                top_k: 30,
                beam_count: 4,
                repetition_penalty: 1.3,
                length_penalty: Some(1.2),
                no_repeat_ngram_size: 4,
            },
            max_context_turns: 8,
            max_input_length: 512,
            system_prompt: "You are an advanced AI assistant focused on comprehensive and detailed responses.\n\
                For each topic provide thorough analysis:\n\
                - Programming: Detailed implementations with best practices, error handling, and optimization\n\
                - Math: Complete step-by-step solutions with explanations and alternative approaches\n\
                - Knowledge: In-depth explanations with context, examples, and practical applications\n\
                - Technical Topics: Comprehensive breakdown with theory, implementation, and considerations\n\
                Consider edge cases and include relevant examples in your responses."
                .into(),
        }
    }
}

/// The catalogue of available modes.
#[derive(Debug, Clone)]
pub struct ModeConfigRegistry {
    modes: Vec<ModeConfig>,
    default_index: usize,
}

impl ModeConfigRegistry {
    /// Build a registry, validating every mode.
    ///
    /// Later modes with the same id replace earlier ones in place.
    pub fn new(
        modes: impl IntoIterator<Item = ModeConfig>,
        default_mode: impl Into<ModeId>,
    ) -> Result<Self, ModeError> {
        let mut registered: Vec<ModeConfig> = Vec::new();
        for mode in modes {
            mode.validate()?;
            match registered.iter_mut().find(|m| m.id == mode.id) {
                Some(existing) => *existing = mode,
                None => registered.push(mode),
            }
        }

        let default_mode = default_mode.into();
        let default_index = registered
            .iter()
            .position(|m| m.id == default_mode)
            .ok_or_else(|| ModeError::MissingDefault(default_mode.to_string()))?;

        Ok(Self {
            modes: registered,
            default_index,
        })
    }

    /// Insert or replace a mode.
    pub fn with_mode(mut self, mode: ModeConfig) -> Result<Self, ModeError> {
        mode.validate()?;
        match self.modes.iter_mut().find(|m| m.id == mode.id) {
            Some(existing) => *existing = mode,
            None => self.modes.push(mode),
        }
        Ok(self)
    }

    /// Resolve a mode id; unknown ids yield the default mode.
    pub fn lookup(&self, mode_id: &str) -> &ModeConfig {
        let wanted = ModeId::new(mode_id);
        self.modes
            .iter()
            .find(|m| m.id == wanted)
            .unwrap_or_else(|| self.default_mode())
    }

    pub fn contains(&self, mode_id: &str) -> bool {
        let wanted = ModeId::new(mode_id);
        self.modes.iter().any(|m| m.id == wanted)
    }

    pub fn default_mode(&self) -> &ModeConfig {
        &self.modes[self.default_index]
    }

    /// All modes in registration order.
    pub fn modes(&self) -> impl Iterator<Item = &ModeConfig> {
        self.modes.iter()
    }

    pub fn len(&self) -> usize {
        self.modes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modes.is_empty()
    }
}

impl Default for ModeConfigRegistry {
    /// The built-in fast / balanced / smart catalogue with `balanced` as default.
    fn default() -> Self {
        Self {
            modes: vec![
                ModeConfig::fast(),
                ModeConfig::balanced(),
                ModeConfig::smart(),
            ],
            default_index: 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_modes_are_valid() {
        let registry = ModeConfigRegistry::default();
        for mode in registry.modes() {
            assert!(mode.validate().is_ok(), "{} should validate", mode.id);
        }
        assert_eq!(registry.len(), 3);
        assert_eq!(registry.default_mode().id.as_str(), "balanced");
    }

    #[test]
    fn unknown_mode_resolves_to_default() {
        let registry = ModeConfigRegistry::default();
        for id in ["turbo", "", "  ", "fastest", "smart!"] {
            assert_eq!(registry.lookup(id).id.as_str(), "balanced");
        }
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let registry = ModeConfigRegistry::default();
        assert_eq!(registry.lookup("FAST").id.as_str(), "fast");
        assert_eq!(registry.lookup(" Smart ").id.as_str(), "smart");
    }

    #[test]
    fn modes_scale_in_depth() {
        let registry = ModeConfigRegistry::default();
        let fast = registry.lookup("fast");
        let balanced = registry.lookup("balanced");
        let smart = registry.lookup("smart");

        assert!(fast.generation.max_new_tokens < balanced.generation.max_new_tokens);
        assert!(balanced.generation.max_new_tokens < smart.generation.max_new_tokens);
        assert!(fast.generation.beam_count < smart.generation.beam_count);
        assert!(fast.max_context_turns < smart.max_context_turns);
        assert!(fast.max_input_length < smart.max_input_length);
        assert!(fast.system_prompt.len() < smart.system_prompt.len());
    }

    #[test]
    fn built_in_descriptions_are_thai() {
        for mode in ModeConfigRegistry::default().modes() {
            assert!(mode.description.starts_with("โหมด"), "{}", mode.id);
        }
    }

    #[test]
    fn single_beam_drops_length_penalty() {
        let fast = ModeConfig::fast();
        assert_eq!(fast.generation.length_penalty, Some(0.8));
        assert_eq!(fast.generation.effective().length_penalty, None);

        let smart = ModeConfig::smart();
        assert_eq!(smart.generation.effective().length_penalty, Some(1.2));
    }

    #[test]
    fn context_capacity_is_two_entries_per_turn() {
        assert_eq!(ModeConfig::fast().context_capacity(), 6);
        assert_eq!(ModeConfig::smart().context_capacity(), 16);
    }

    #[test]
    fn invalid_mode_rejected_at_construction() {
        let mut broken = ModeConfig::fast();
        broken.id = ModeId::new("broken");
        broken.generation.top_p = 1.5;

        let err = ModeConfigRegistry::new(vec![ModeConfig::balanced(), broken], "balanced")
            .unwrap_err();
        assert!(err.to_string().contains("top_p"));
    }

    #[test]
    fn missing_default_rejected() {
        let err = ModeConfigRegistry::new(vec![ModeConfig::fast()], "balanced").unwrap_err();
        assert!(matches!(err, ModeError::MissingDefault(_)));
    }

    #[test]
    fn with_mode_adds_and_overrides() {
        let mut tiny = ModeConfig::fast();
        tiny.id = ModeId::new("Tiny");
        tiny.generation.max_new_tokens = 8;

        let mut faster = ModeConfig::fast();
        faster.generation.max_new_tokens = 16;

        let registry = ModeConfigRegistry::default()
            .with_mode(tiny)
            .unwrap()
            .with_mode(faster)
            .unwrap();

        assert_eq!(registry.len(), 4);
        assert!(registry.contains("tiny"));
        assert_eq!(registry.lookup("tiny").generation.max_new_tokens, 8);
        assert_eq!(registry.lookup("fast").generation.max_new_tokens, 16);
    }

    #[test]
    fn mode_config_parses_from_toml_shape() {
        let json = serde_json::json!({
            "id": "Concise",
            "max_new_tokens": 24,
            "temperature": 0.6,
            "top_p": 0.9,
            "top_k": 20,
            "beam_count": 1,
            "repetition_penalty": 1.1,
            "no_repeat_ngram_size": 2,
            "max_context_turns": 2,
            "max_input_length": 96,
            "system_prompt": "Answer in one sentence."
        });
        let mode: ModeConfig = serde_json::from_value(json).unwrap();
        assert_eq!(mode.id.as_str(), "concise");
        assert_eq!(mode.generation.length_penalty, None);
        assert!(mode.validate().is_ok());
    }
}
