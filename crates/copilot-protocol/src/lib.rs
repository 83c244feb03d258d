//! Wire types for both sides of the gateway.
//!
//! `openai` holds the canonical, OpenAI-compatible shapes exposed to callers;
//! `copilot` holds the backend-native shapes. `sse` decodes the backend's
//! line-oriented event stream.

pub mod copilot;
pub mod openai;
pub mod sse;

mod serde_helpers;
