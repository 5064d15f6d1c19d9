//! Gemini `generateContent` client.
//!
//! Provides typed request/response messages, an explicitly configured HTTP
//! client, and the [`certgen_core::generator::TextGenerator`] implementation
//! used by the design request service.

pub mod client;
pub mod config;
pub mod messages;

pub use client::{GeminiClient, GeminiError};
pub use config::GeminiConfig;
