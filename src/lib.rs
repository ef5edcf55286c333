//! Robotalk: email reply drafting backend.
//!
//! Turns an inbound email thread plus a short spoken or typed instruction
//! into a ready-to-send reply draft using an LLM completion call, and
//! transcribes voice instructions with known product-name fixes applied.

pub mod config;
pub mod draft;
pub mod llm;
pub mod normalize;
pub mod server;
pub mod transcribe;
