//! The assistant pipeline: translation bridge, generation orchestrator and
//! the conversation state machine a front end drives.
//!
//! A submitted message flows through:
//!
//! 1. **ConversationStateMachine** records a pending turn
//! 2. **GenerationOrchestrator** bridges, prompts, generates and recovers
//! 3. **TranslationBridge** handles every language hop, degrading to the input
//! 4. The turn is marked answered and the context gains one pair
//!
//! Sessions are independent; calls within one session are serialized by
//! [`SessionHandle`].

pub mod bridge;
pub mod orchestrator;
pub mod prompt;
pub mod session;

#[cfg(test)]
mod test_helpers;

pub use bridge::{
    RecoveredText, RecoveryRoute, SkipReason, Translation, TranslationBridge, TranslationStatus,
};
pub use orchestrator::{Answer, AnswerOutcome, GenerationOrchestrator, TurnKind};
pub use prompt::{ANSWER_MARKER, Prompt, build_prompt, estimate_tokens, extract_answer};
pub use session::{
    ConversationStateMachine, SessionHandle, SessionRegistry, Turn, TurnError, TurnState,
};
