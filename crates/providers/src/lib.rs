//! Service clients for LingoBridge.
//!
//! Generation backends implement `lingobridge_core::Generator`; translation
//! backends implement `Translator` and/or `LanguageDetector`. The router
//! builds the configured set.

pub mod fallback;
pub mod identity;
pub mod libretranslate;
pub mod router;
pub mod script;
pub mod tgi;

pub use fallback::FallbackGenerator;
pub use identity::IdentityTranslator;
pub use libretranslate::LibreTranslateClient;
pub use router::{Services, build_from_config};
pub use script::{ScriptDetector, is_written_in};
pub use tgi::TgiGenerator;
