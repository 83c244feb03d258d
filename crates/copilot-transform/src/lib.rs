//! Pure conversions between the Copilot backend shapes and the
//! OpenAI-compatible shapes. Nothing here performs IO.

pub mod list_models;
