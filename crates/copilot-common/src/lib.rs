pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8787;
pub const DEFAULT_COMPLETIONS_URL: &str = "https://api.githubcopilot.com/chat/completions";
pub const DEFAULT_MODELS_URL: &str = "https://api.githubcopilot.com/models";
pub const DEFAULT_MAX_SSE_LINE_BYTES: usize = 1024 * 1024;

#[derive(Debug, thiserror::Error)]
pub enum GlobalConfigError {
    #[error("invalid global config field {field}: {reason}")]
    InvalidField {
        field: &'static str,
        reason: String,
    },
}

/// Final, merged configuration used by the running process.
///
/// Merge order: CLI > ENV > built-in defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobalConfig {
    pub host: String,
    pub port: u16,
    /// Optional outbound proxy (for upstream egress).
    pub proxy: Option<String>,
    pub completions_url: String,
    pub models_url: String,
    /// Longest SSE line accepted from the backend.
    pub max_sse_line_bytes: usize,
    /// Fallback OAuth token used when a request carries no bearer token.
    pub token: Option<String>,
}

impl GlobalConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Optional layer used for merging global config.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GlobalConfigPatch {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub proxy: Option<String>,
    pub completions_url: Option<String>,
    pub models_url: Option<String>,
    pub max_sse_line_bytes: Option<usize>,
    pub token: Option<String>,
}

impl GlobalConfigPatch {
    pub fn overlay(&mut self, other: GlobalConfigPatch) {
        if other.host.is_some() {
            self.host = other.host;
        }
        if other.port.is_some() {
            self.port = other.port;
        }
        if other.proxy.is_some() {
            self.proxy = other.proxy;
        }
        if other.completions_url.is_some() {
            self.completions_url = other.completions_url;
        }
        if other.models_url.is_some() {
            self.models_url = other.models_url;
        }
        if other.max_sse_line_bytes.is_some() {
            self.max_sse_line_bytes = other.max_sse_line_bytes;
        }
        if other.token.is_some() {
            self.token = other.token;
        }
    }

    pub fn into_config(self) -> Result<GlobalConfig, GlobalConfigError> {
        let max_sse_line_bytes = self
            .max_sse_line_bytes
            .unwrap_or(DEFAULT_MAX_SSE_LINE_BYTES);
        if max_sse_line_bytes == 0 {
            return Err(GlobalConfigError::InvalidField {
                field: "max_sse_line_bytes",
                reason: "must be greater than zero".to_string(),
            });
        }
        Ok(GlobalConfig {
            host: self.host.unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: self.port.unwrap_or(DEFAULT_PORT),
            proxy: non_empty(self.proxy),
            completions_url: non_empty(self.completions_url)
                .unwrap_or_else(|| DEFAULT_COMPLETIONS_URL.to_string()),
            models_url: non_empty(self.models_url)
                .unwrap_or_else(|| DEFAULT_MODELS_URL.to_string()),
            max_sse_line_bytes,
            token: non_empty(self.token),
        })
    }
}

impl From<GlobalConfig> for GlobalConfigPatch {
    fn from(value: GlobalConfig) -> Self {
        Self {
            host: Some(value.host),
            port: Some(value.port),
            proxy: value.proxy,
            completions_url: Some(value.completions_url),
            models_url: Some(value.models_url),
            max_sse_line_bytes: Some(value.max_sse_line_bytes),
            token: value.token,
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
}
