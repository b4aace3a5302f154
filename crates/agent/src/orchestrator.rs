//! The generation pipeline: one user message in, one display-language answer out.
//!
//! Each call runs:
//!
//! 1. **Bridge** the user text into the model's language (best effort)
//! 2. **Assemble** the prompt from the active mode and recent context
//! 3. **Generate** with the mode's sampling parameters
//! 4. **Extract** the answer after the last `Answer:` marker
//! 5. **Recover** the display language when the answer came back in another one
//! 6. **Record** the turn in the conversation context
//!
//! Translation problems never surface as errors. Generation problems become an
//! apology message and leave the context exactly as it was.

use std::sync::Arc;
use std::time::Duration;
use chrono::Utc;
use lingobridge_config::{AppConfig, ConfigError};
use lingobridge_core::error::GenerationError;
use lingobridge_core::event::{DomainEvent, EventBus};
use lingobridge_core::generation::{GenerationRequest, Generator};
use lingobridge_core::mode::{ModeConfig, ModeConfigRegistry, ModeId};
use lingobridge_core::translation::same_language;
use lingobridge_memory::ConversationContext;
use lingobridge_providers::Services;
use tracing::{debug, info, warn};
use crate::bridge::{RecoveryRoute, SkipReason, Translation, TranslationBridge, TranslationStatus};
use crate::prompt::{build_prompt, extract_answer};

/// Whether a request answers a fresh turn or re-answers the latest one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnKind {
    New,
    /// `recorded` is true when the previous answer was stored in the context
    Retry { recorded: bool },
}

/// A successful answer and how it was produced.
#[derive(Debug, Clone)]
pub struct Answer {
    /// Text shown to the user
    pub text: String,
    pub mode: ModeId,
    pub detected_language: String,
    /// Outcome of bridging the user text
    pub bridge: TranslationStatus,
    /// Set when the answer needed display-language recovery
    pub recovery: Option<RecoveryRoute>,
}

/// What the user sees after a request.
#[derive(Debug, Clone)]
pub enum AnswerOutcome {
    Answered(Answer),
    /// Generation failed; `message` is the apology shown instead
    Failed {
        message: String,
        error: GenerationError,
    },
}

impl AnswerOutcome {
    pub fn text(&self) -> &str {
        match self {
            Self::Answered(answer) => &answer.text,
            Self::Failed { message, .. } => message,
        }
    }

    pub fn into_text(self) -> String {
        match self {
            Self::Answered(answer) => answer.text,
            Self::Failed { message, .. } => message,
        }
    }

    pub fn is_answered(&self) -> bool {
        matches!(self, Self::Answered(_))
    }
}

/// Owns one session's active mode and conversation context.
pub struct GenerationOrchestrator {
    registry: Arc<ModeConfigRegistry>,
    active_mode: ModeId,
    context: ConversationContext,
    bridge: TranslationBridge,
    generator: Arc<dyn Generator>,
    /// Model input language; `None` sends user text untranslated
    bridge_language: Option<String>,
    /// Answers in these languages are shown as-is
    passthrough_languages: Vec<String>,
    apology_message: String,
    generation_timeout: Duration,
    event_bus: Arc<EventBus>,
}

impl GenerationOrchestrator {
    /// Create an orchestrator starting in the registry's default mode.
    pub fn new(
        generator: Arc<dyn Generator>,
        bridge: TranslationBridge,
        registry: Arc<ModeConfigRegistry>,
    ) -> Self {
        let active_mode = registry.default_mode().id.clone();
        let display = bridge.display_language().to_string();
        let intermediate = bridge.intermediate_language().to_string();
        Self {
            registry,
            active_mode,
            context: ConversationContext::new(),
            bridge,
            generator,
            bridge_language: Some("zh-CN".into()),
            passthrough_languages: vec![display, intermediate],
            apology_message: "ขออภัย เกิดข้อผิดพลาด".into(),
            generation_timeout: Duration::from_secs(120),
            event_bus: Arc::new(EventBus::default()),
        }
    }

    /// Build a session from application config and its service clients.
    pub fn from_config(
        config: &AppConfig,
        services: Services,
        event_bus: Arc<EventBus>,
    ) -> Result<Self, ConfigError> {
        let registry = Arc::new(config.mode_registry()?);
        let languages = &config.languages;

        let bridge = TranslationBridge::new(services.translator, services.detector)
            .with_display_language(&languages.display)
            .with_intermediate_language(&languages.intermediate)
            .with_timeout(Duration::from_secs(config.translation.timeout_secs));

        let orchestrator = Self::new(services.generator, bridge, registry)
            .with_mode(&config.default_mode)
            .with_bridge_language(languages.bridge_language().map(str::to_string))
            .with_passthrough_languages(languages.passthrough.clone())
            .with_apology_message(&config.apology_message)
            .with_generation_timeout(Duration::from_secs(config.generation.timeout_secs))
            .with_event_bus(event_bus);
        Ok(orchestrator)
    }

    /// Start in the given mode; unknown ids resolve to the default.
    pub fn with_mode(mut self, mode_id: &str) -> Self {
        self.active_mode = self.registry.lookup(mode_id).id.clone();
        self
    }

    pub fn with_bridge_language(mut self, language: Option<String>) -> Self {
        self.bridge_language = language;
        self
    }

    pub fn with_passthrough_languages(mut self, languages: Vec<String>) -> Self {
        self.passthrough_languages = languages;
        self
    }

    pub fn with_apology_message(mut self, message: impl Into<String>) -> Self {
        self.apology_message = message.into();
        self
    }

    pub fn with_generation_timeout(mut self, timeout: Duration) -> Self {
        self.generation_timeout = timeout;
        self
    }

    pub fn with_event_bus(mut self, event_bus: Arc<EventBus>) -> Self {
        self.event_bus = event_bus;
        self
    }

    /// Answer a new user message. Never fails; errors become the apology text.
    pub async fn answer(&mut self, user_text: &str) -> String {
        self.respond(user_text, TurnKind::New).await.into_text()
    }

    /// Re-answer the latest turn, replacing its stored answer instead of adding a pair.
    pub async fn reanswer(&mut self, user_text: &str) -> AnswerOutcome {
        let recorded = self.context.latest_turn_asked(user_text);
        self.respond(user_text, TurnKind::Retry { recorded }).await
    }

    /// Run the full pipeline for one request.
    pub async fn respond(&mut self, user_text: &str, kind: TurnKind) -> AnswerOutcome {
        let registry = Arc::clone(&self.registry);
        let mode = registry.lookup(self.active_mode.as_str());

        let bridged = self.bridge_input(user_text).await;
        let raw = match self.generate(mode, &bridged.text, kind).await {
            Ok(raw) => raw,
            Err(e) => return self.fail(mode, e),
        };

        let answer = extract_answer(&raw);
        if answer.is_empty() {
            return self.fail(mode, GenerationError::EmptyOutput);
        }

        let detected_language = self.bridge.detect(answer).await;
        let passthrough = self
            .passthrough_languages
            .iter()
            .any(|lang| same_language(lang, &detected_language));

        let (text, recovery) = if passthrough {
            (answer.to_string(), None)
        } else {
            debug!(detected = %detected_language, "Answer outside passthrough languages, recovering display language");
            let recovered = self.bridge.translate_with_fallback(answer).await;
            for failure in &recovered.failures {
                self.event_bus.publish(DomainEvent::TranslationDegraded {
                    stage: "recover".into(),
                    reason: failure.to_string(),
                    timestamp: Utc::now(),
                });
            }
            (recovered.text, Some(recovered.route))
        };

        self.record(user_text, &text, mode, kind);

        info!(
            mode = %mode.id,
            detected = %detected_language,
            recovered = recovery.is_some(),
            "Answer generated"
        );
        self.event_bus.publish(DomainEvent::AnswerGenerated {
            mode: mode.id.to_string(),
            detected_language: detected_language.clone(),
            recovered: recovery.is_some(),
            retry: matches!(kind, TurnKind::Retry { .. }),
            timestamp: Utc::now(),
        });

        AnswerOutcome::Answered(Answer {
            text,
            mode: mode.id.clone(),
            detected_language,
            bridge: bridged.status,
            recovery,
        })
    }

    async fn bridge_input(&self, user_text: &str) -> Translation {
        let Some(target) = &self.bridge_language else {
            return Translation::skipped(user_text, SkipReason::Disabled);
        };

        let bridged = self.bridge.translate(user_text, target).await;
        if let TranslationStatus::Degraded(e) = &bridged.status {
            self.event_bus.publish(DomainEvent::TranslationDegraded {
                stage: "bridge".into(),
                reason: e.to_string(),
                timestamp: Utc::now(),
            });
        }
        bridged
    }

    async fn generate(
        &self,
        mode: &ModeConfig,
        question: &str,
        kind: TurnKind,
    ) -> Result<String, GenerationError> {
        let limit = mode.context_capacity();
        let prompt = match kind {
            TurnKind::Retry { recorded: true } => build_prompt(
                &mode.system_prompt,
                self.context.render_before_latest_turn(limit),
                question,
                mode.max_input_length,
            ),
            _ => build_prompt(
                &mode.system_prompt,
                self.context.render(limit),
                question,
                mode.max_input_length,
            ),
        };

        if prompt.dropped_lines > 0 || prompt.question_truncated {
            debug!(
                dropped_lines = prompt.dropped_lines,
                question_truncated = prompt.question_truncated,
                "Prompt fitted to input budget"
            );
        }

        let request = GenerationRequest {
            prompt: prompt.text,
            params: mode.generation.effective(),
            max_input_length: mode.max_input_length,
        };

        debug!(generator = %self.generator.name(), mode = %mode.id, "Sending generation request");

        // A chain with its own per-endpoint deadlines gets its full budget.
        let deadline = self
            .generator
            .time_budget()
            .map_or(self.generation_timeout, |budget| budget.max(self.generation_timeout));
        tokio::time::timeout(deadline, self.generator.generate(request))
            .await
            .unwrap_or_else(|_| {
                Err(GenerationError::Timeout(format!(
                    "no answer within {deadline:?}"
                )))
            })
    }

    fn record(&mut self, user_text: &str, answer: &str, mode: &ModeConfig, kind: TurnKind) {
        let replaced = matches!(kind, TurnKind::Retry { recorded: true })
            && self.context.replace_last_answer(user_text, answer);
        if !replaced {
            self.context
                .append_turn(user_text, answer, mode.max_context_turns);
        }
    }

    fn fail(&self, mode: &ModeConfig, error: GenerationError) -> AnswerOutcome {
        warn!(mode = %mode.id, error = %error, "Generation failed, returning apology");
        self.event_bus.publish(DomainEvent::GenerationFailed {
            mode: mode.id.to_string(),
            error_message: error.to_string(),
            timestamp: Utc::now(),
        });
        AnswerOutcome::Failed {
            message: format!("{}: {}", self.apology_message, error),
            error,
        }
    }

    /// Switch the active mode. Unknown ids resolve to the default mode.
    ///
    /// Returns `false` when the resolved mode is already active; context is
    /// never touched either way.
    pub fn change_mode(&mut self, mode_id: &str) -> bool {
        let resolved = self.registry.lookup(mode_id).id.clone();
        if resolved == self.active_mode {
            debug!(mode = %resolved, "Mode already active");
            return false;
        }

        info!(from = %self.active_mode, to = %resolved, "Mode changed");
        self.event_bus.publish(DomainEvent::ModeChanged {
            from: self.active_mode.to_string(),
            to: resolved.to_string(),
            timestamp: Utc::now(),
        });
        self.active_mode = resolved;
        true
    }

    pub fn active_mode(&self) -> &ModeConfig {
        self.registry.lookup(self.active_mode.as_str())
    }

    pub fn registry(&self) -> &ModeConfigRegistry {
        &self.registry
    }

    pub fn context(&self) -> &ConversationContext {
        &self.context
    }

    pub fn clear_context(&mut self) {
        self.context.clear();
    }

    pub fn event_bus(&self) -> &Arc<EventBus> {
        &self.event_bus
    }
}
