//! # voxweb Vision
//!
//! Vision analysis collaborator backed by an OpenAI-compatible
//! chat-completions endpoint with image input (`gpt-4o` class models).

mod api;
mod client;

pub use client::{OpenAiVision, CONTENT_PROMPT, DESCRIBE_PROMPT};
