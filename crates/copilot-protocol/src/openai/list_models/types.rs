use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Model {
    /// The Unix timestamp (in seconds) when the model was created.
    pub created: i64,
    /// The model identifier, which can be referenced in the API endpoints.
    pub id: String,
    pub object: String,
    /// The organization that owns the model.
    pub owned_by: String,
    pub permission: Vec<Permission>,
    pub root: String,
    pub parent: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Permission {
    pub created: i64,
    pub id: String,
    pub object: String,
    pub allow_create_engine: bool,
    pub allow_sampling: bool,
    pub allow_logprobs: bool,
    pub allow_search_indices: bool,
    pub allow_view: bool,
    pub allow_fine_tuning: bool,
    pub organization: String,
    pub group: Option<String>,
    pub is_blocking: bool,
}
