use std::future::Future;

use tokio_util::sync::CancellationToken;
use tracing::debug;

use copilot_protocol::openai::chat_completions::{ChatRequest, ChatResponse};

use crate::CopilotClient;
use crate::error::{BoxError, CopilotError};

/// Decodes one buffered body or one SSE `data:` payload.
pub fn decode_chat_response(bytes: &[u8]) -> Result<ChatResponse, CopilotError> {
    serde_json::from_slice(bytes).map_err(CopilotError::Decode)
}

impl CopilotClient {
    /// Sends a chat completion and hands every decoded frame to `on_frame`.
    ///
    /// Buffered requests produce exactly one frame; streamed requests produce
    /// one per `data:` line. The first decode or handler error stops the call
    /// and nothing after it is read.
    pub async fn chat_completions<F, Fut>(
        &self,
        token: &str,
        request: ChatRequest,
        cancel: &CancellationToken,
        mut on_frame: F,
    ) -> Result<(), CopilotError>
    where
        F: FnMut(ChatResponse) -> Fut,
        Fut: Future<Output = Result<(), BoxError>>,
    {
        let request = request.normalized();
        let url = self.config.completions_url.as_str();

        if !request.stream {
            let body = self
                .request("chat.completions", token, url, &request, cancel)
                .await?;
            let frame = decode_chat_response(&body)?;
            return on_frame(frame).await.map_err(CopilotError::Callback);
        }

        let mut frames = self
            .stream("chat.completions", token, url, &request, cancel)
            .await?;
        let mut delivered = 0usize;
        while let Some(payload) = frames.next_frame(cancel).await? {
            let frame = decode_chat_response(&payload)?;
            on_frame(frame).await.map_err(CopilotError::Callback)?;
            delivered += 1;
        }
        debug!(
            event = "upstream_stream_end",
            op = "chat.completions",
            frames = delivered
        );
        Ok(())
    }
}
