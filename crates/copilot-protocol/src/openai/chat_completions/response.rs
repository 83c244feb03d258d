use serde::{Deserialize, Serialize};

use crate::openai::chat_completions::types::{Delta, Message, Usage};
use crate::serde_helpers::{is_zero, null_as_default};

/// One frame of a chat completion. Buffered calls produce exactly one;
/// streamed calls produce one per `data:` line.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub choices: Vec<Choice>,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "is_zero"
    )]
    pub created: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub usage: Usage,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Choice {
    /// Empty until the turn completes.
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "String::is_empty"
    )]
    pub finish_reason: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub index: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<Message>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delta: Option<Delta>,
}

impl ChatResponse {
    /// Concatenated text of every choice, whichever of message/delta it carries.
    pub fn text(&self) -> String {
        self.choices
            .iter()
            .filter_map(|choice| match (&choice.message, &choice.delta) {
                (Some(message), _) => Some(message.content.as_str()),
                (None, Some(delta)) => delta.content.as_deref(),
                (None, None) => None,
            })
            .collect()
    }
}
