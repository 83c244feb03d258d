use std::time::Duration;

use copilot_common::{
    DEFAULT_COMPLETIONS_URL, DEFAULT_MAX_SSE_LINE_BYTES, DEFAULT_MODELS_URL, GlobalConfig,
};

#[derive(Debug, Clone)]
pub struct CopilotClientConfig {
    pub completions_url: String,
    pub models_url: String,
    pub proxy: Option<String>,
    pub max_sse_line_bytes: usize,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub stream_idle_timeout: Duration,
}

impl CopilotClientConfig {
    pub fn from_global(global: &GlobalConfig) -> Self {
        Self {
            completions_url: global.completions_url.clone(),
            models_url: global.models_url.clone(),
            proxy: global.proxy.clone(),
            max_sse_line_bytes: global.max_sse_line_bytes,
            ..Self::default()
        }
    }

    /// Points both endpoints at `base_url` (`{base}/chat/completions`, `{base}/models`).
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        let base = base_url.trim_end_matches('/');
        self.completions_url = format!("{base}/chat/completions");
        self.models_url = format!("{base}/models");
        self
    }

    pub fn with_max_sse_line_bytes(mut self, max_sse_line_bytes: usize) -> Self {
        self.max_sse_line_bytes = max_sse_line_bytes;
        self
    }
}

impl Default for CopilotClientConfig {
    fn default() -> Self {
        Self {
            completions_url: DEFAULT_COMPLETIONS_URL.to_string(),
            models_url: DEFAULT_MODELS_URL.to_string(),
            proxy: None,
            max_sse_line_bytes: DEFAULT_MAX_SSE_LINE_BYTES,
            connect_timeout: Duration::from_secs(5),
            request_timeout: Duration::from_secs(86400),
            stream_idle_timeout: Duration::from_secs(30),
        }
    }
}
