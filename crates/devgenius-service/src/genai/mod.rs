//! Generative-AI integration.
//!
//! The service relays chat prompts to the Gemini `generateContent` endpoint.
//! Request and response bodies are passed through mostly untouched; only the
//! error envelope is parsed so failures can be mapped to API errors.

pub mod client;
pub mod types;

pub use client::{GenAiClient, GenAiError};
pub use types::{ApiErrorBody, ApiErrorResponse, GenerateRequest};
