//! Outbound client for the Copilot chat backend.
//!
//! [`CopilotClient`] owns a single wreq client and the fixed identity headers.
//! Every operation takes a [`CancellationToken`] governing the whole call,
//! including reads of an in-flight event stream.

mod chat;
mod config;
mod error;
mod headers;
mod models;
mod transport;

pub use chat::decode_chat_response;
pub use config::CopilotClientConfig;
pub use error::{BoxError, CopilotError, StatusError, TransportErrorKind};
pub use headers::{
    EDITOR_PLUGIN_VERSION, EDITOR_VERSION, OPENAI_INTENT, OPENAI_ORGANIZATION, USER_AGENT,
};
pub use transport::SseFrames;

pub use tokio_util::sync::CancellationToken;

use wreq::{Client, Proxy};

#[derive(Clone)]
pub struct CopilotClient {
    http: Client,
    config: CopilotClientConfig,
}

impl CopilotClient {
    pub fn new(config: CopilotClientConfig) -> Result<Self, CopilotError> {
        let http = build_client(&config)?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &CopilotClientConfig {
        &self.config
    }
}

fn build_client(config: &CopilotClientConfig) -> Result<Client, wreq::Error> {
    let mut builder = Client::builder()
        .connect_timeout(config.connect_timeout)
        .timeout(config.request_timeout)
        .read_timeout(config.stream_idle_timeout);

    if let Some(proxy) = config.proxy.as_deref() {
        builder = builder.proxy(Proxy::all(proxy)?);
    }

    builder.build()
}
