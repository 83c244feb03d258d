use serde::{Deserialize, Serialize};

use crate::openai::chat_completions::types::Message;
use crate::serde_helpers::is_false;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<Message>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub stream: bool,
    #[serde(default)]
    pub temperature: f64,
    #[serde(default)]
    pub top_p: f64,
    /// Number of completions; `0` means "unset" and is sent as `1`.
    #[serde(default)]
    pub n: i64,
}

impl ChatRequest {
    pub fn new(model: impl Into<String>, messages: Vec<Message>) -> Self {
        Self {
            model: model.into(),
            messages,
            stream: false,
            temperature: 0.0,
            top_p: 0.0,
            n: 0,
        }
    }

    pub fn with_stream(mut self, stream: bool) -> Self {
        self.stream = stream;
        self
    }

    /// Returns the request as it goes on the wire.
    pub fn normalized(mut self) -> Self {
        if self.n == 0 {
            self.n = 1;
        }
        self
    }
}
