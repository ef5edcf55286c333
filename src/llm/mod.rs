//! Model-provider seam.
//!
//! This module provides:
//! * [`ModelClient`]: async trait for the two provider capabilities the
//!   backend uses (chat completion and audio transcription).
//! * [`OpenAiClient`]: OpenAI-compatible REST implementation.
//! * [`LlmError`]: error variants for provider calls.
//!
//! The client is built once at startup and passed into the drafting engine
//! and the transcription adapter, so tests substitute a scripted double.

pub mod client;

pub use client::{LlmError, ModelClient, OpenAiClient};
