use time::OffsetDateTime;

use copilot_protocol::copilot::models::Model as CopilotModel;
use copilot_protocol::copilot::models::ModelsResponse as CopilotModelsResponse;
use copilot_protocol::openai::list_models::{
    ListModelsResponse as OpenAIListModelsResponse, ListObjectType, Model as OpenAIModel,
    Permission as OpenAIPermission,
};

/// Convert a Copilot model catalog into the OpenAI list-models shape, stamping
/// `created` with the current time (the backend exposes none).
pub fn transform_response(response: CopilotModelsResponse) -> OpenAIListModelsResponse {
    transform_response_at(response, OffsetDateTime::now_utc().unix_timestamp())
}

/// Same as [`transform_response`] with an explicit creation timestamp.
pub fn transform_response_at(
    response: CopilotModelsResponse,
    created: i64,
) -> OpenAIListModelsResponse {
    OpenAIListModelsResponse {
        object: ListObjectType::List,
        data: response
            .data
            .into_iter()
            .map(|model| transform_model(model, created))
            .collect(),
    }
}

/// Copilot has no fine-tune lineage, so `root` and `parent` point at the model
/// itself. Every allow-flag that a client could act on follows the picker flag.
pub fn transform_model(model: CopilotModel, created: i64) -> OpenAIModel {
    let enabled = model.model_picker_enabled;
    OpenAIModel {
        created,
        object: model.object,
        owned_by: model.vendor,
        permission: vec![OpenAIPermission {
            created,
            id: format!("modelperm-{}", model.id),
            object: "model_permission".to_string(),
            allow_create_engine: enabled,
            allow_sampling: enabled,
            allow_logprobs: enabled,
            allow_view: enabled,
            ..Default::default()
        }],
        root: model.id.clone(),
        parent: model.id.clone(),
        id: model.id,
    }
}
