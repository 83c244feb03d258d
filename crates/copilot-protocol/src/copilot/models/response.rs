use serde::{Deserialize, Serialize};

use crate::copilot::models::types::Model;
use crate::serde_helpers::null_as_default;

/// Body of `GET /models` on the backend.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelsResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub data: Vec<Model>,
    #[serde(default)]
    pub object: String,
}
