//! Chat backend implementations for agentic.
//!
//! All backends implement `agentic_core::ChatBackend`. Exactly one is
//! selected at startup by [`build_from_config`].

mod http;
pub mod ollama;
pub mod openai_compat;
pub mod router;

pub use ollama::OllamaBackend;
pub use openai_compat::OpenAiCompatBackend;
pub use router::build_from_config;
