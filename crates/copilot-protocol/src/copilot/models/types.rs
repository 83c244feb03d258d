use serde::{Deserialize, Serialize};

use crate::serde_helpers::null_as_default;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Model {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub object: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub vendor: String,
    #[serde(default)]
    pub preview: bool,
    #[serde(default)]
    pub model_picker_enabled: bool,
    #[serde(default)]
    pub capabilities: ModelCapabilities,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policy: Option<ModelPolicy>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelCapabilities {
    #[serde(default)]
    pub family: String,
    #[serde(default)]
    pub object: String,
    #[serde(default, rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub tokenizer: String,
    #[serde(default)]
    pub supports: ModelSupports,
    #[serde(default)]
    pub limits: ModelCapabilityLimits,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelSupports {
    #[serde(default, deserialize_with = "null_as_default")]
    pub streaming: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tool_calls: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub parallel_tool_calls: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub vision: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub structured_outputs: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub dimensions: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelCapabilityLimits {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_context_window_tokens: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_prompt_tokens: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_inputs: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vision: Option<VisionLimits>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisionLimits {
    #[serde(default)]
    pub max_prompt_image_size: u64,
    #[serde(default)]
    pub max_prompt_images: u64,
    #[serde(default)]
    pub supported_media_types: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelPolicy {
    pub state: String,
    #[serde(default)]
    pub terms: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::copilot::models::ModelsResponse;

    #[test]
    fn decodes_backend_catalog_with_optional_sections() {
        let body = r#"{
            "data": [
                {
                    "capabilities": {
                        "family": "gpt-4o",
                        "limits": {
                            "max_context_window_tokens": 128000,
                            "max_output_tokens": 4096,
                            "max_prompt_tokens": 64000,
                            "vision": {
                                "max_prompt_image_size": 3145728,
                                "max_prompt_images": 1,
                                "supported_media_types": ["image/jpeg", "image/png"]
                            }
                        },
                        "object": "model_capabilities",
                        "supports": {"parallel_tool_calls": true, "streaming": true, "tool_calls": true, "vision": true},
                        "tokenizer": "o200k_base",
                        "type": "chat"
                    },
                    "id": "gpt-4o",
                    "model_picker_enabled": true,
                    "name": "GPT 4o",
                    "object": "model",
                    "preview": false,
                    "vendor": "Azure OpenAI",
                    "version": "gpt-4o-2024-11-20"
                },
                {
                    "capabilities": {
                        "family": "text-embedding-3-small",
                        "limits": {"max_inputs": 512},
                        "object": "model_capabilities",
                        "supports": {"dimensions": true},
                        "tokenizer": "cl100k_base",
                        "type": "embeddings"
                    },
                    "id": "text-embedding-3-small",
                    "model_picker_enabled": false,
                    "name": "Embedding V3 small",
                    "object": "model",
                    "policy": {"state": "enabled", "terms": "Enable access"},
                    "preview": false,
                    "vendor": "Azure OpenAI",
                    "version": "text-embedding-3-small"
                }
            ],
            "object": "list"
        }"#;

        let resp: ModelsResponse = serde_json::from_str(body).expect("decode models");
        assert_eq!(resp.data.len(), 2);

        let chat = &resp.data[0];
        assert_eq!(chat.capabilities.kind, "chat");
        assert!(chat.capabilities.supports.vision);
        assert!(chat.policy.is_none());
        let vision = chat.capabilities.limits.vision.as_ref().expect("vision limits");
        assert_eq!(vision.max_prompt_images, 1);

        let embed = &resp.data[1];
        assert!(!embed.model_picker_enabled);
        assert_eq!(embed.capabilities.limits.max_inputs, Some(512));
        assert!(embed.capabilities.limits.vision.is_none());
        assert_eq!(embed.policy.as_ref().map(|p| p.state.as_str()), Some("enabled"));
    }
}
