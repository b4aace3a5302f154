//! # LingoBridge Core
//!
//! Domain types, traits, and error definitions for the LingoBridge assistant
//! orchestrator. This crate performs **no I/O**; it defines the domain model
//! that all other crates implement against.
//!
//! ## Design Philosophy
//!
//! Every external service is a trait here (`Generator`, `Translator`,
//! `LanguageDetector`). Implementations live in `lingobridge-providers`.
//! This enables:
//! - Swapping backends via configuration
//! - Testing the pipeline with stub services
//! - Clean dependency graph (all crates depend inward on core)

pub mod error;
pub mod event;
pub mod generation;
pub mod message;
pub mod mode;
pub mod translation;

// Re-export key types at crate root for ergonomics
pub use error::{GenerationError, ModeError, TranslationError};
pub use event::{DomainEvent, EventBus};
pub use generation::{GenerationRequest, Generator};
pub use message::{ContextEntry, Role};
pub use mode::{GenerationParams, ModeConfig, ModeConfigRegistry, ModeId};
pub use translation::{LanguageDetector, Translator, same_language};
