use tokio_util::sync::CancellationToken;

use copilot_protocol::copilot::models::{Model, ModelsResponse};

use crate::CopilotClient;
use crate::error::CopilotError;

impl CopilotClient {
    /// Fetches the backend model catalog, in backend order.
    pub async fn models(
        &self,
        token: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<Model>, CopilotError> {
        let body = self
            .fetch("models.list", token, &self.config.models_url, cancel)
            .await?;
        let models: ModelsResponse = serde_json::from_slice(&body).map_err(CopilotError::Decode)?;
        Ok(models.data)
    }
}
