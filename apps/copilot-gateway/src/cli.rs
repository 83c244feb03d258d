use anyhow::Context;
use clap::Parser;

use copilot_common::GlobalConfigPatch;

#[derive(Debug, Clone, Parser)]
#[command(
    name = "copilot-gateway",
    version,
    about = "OpenAI-compatible gateway for the Copilot chat API"
)]
pub(crate) struct Cli {
    /// Bind host.
    #[arg(long, env = "COPILOT_GATEWAY_HOST")]
    pub(crate) host: Option<String>,

    /// Bind port.
    #[arg(long, env = "COPILOT_GATEWAY_PORT")]
    pub(crate) port: Option<String>,

    /// Optional outbound proxy for backend requests.
    #[arg(long, env = "COPILOT_GATEWAY_PROXY")]
    pub(crate) proxy: Option<String>,

    /// Chat completions endpoint of the backend.
    #[arg(long, env = "COPILOT_GATEWAY_COMPLETIONS_URL")]
    pub(crate) completions_url: Option<String>,

    /// Model catalog endpoint of the backend.
    #[arg(long, env = "COPILOT_GATEWAY_MODELS_URL")]
    pub(crate) models_url: Option<String>,

    /// Longest SSE line accepted from the backend, in bytes.
    #[arg(long, env = "COPILOT_GATEWAY_MAX_SSE_LINE_BYTES")]
    pub(crate) max_sse_line_bytes: Option<String>,

    /// Token used when a request carries no bearer token.
    #[arg(long, env = "COPILOT_GATEWAY_TOKEN", hide_env_values = true)]
    pub(crate) token: Option<String>,
}

impl Cli {
    /// clap already applies CLI > ENV per field; unset and placeholder
    /// values are left for the defaults.
    pub(crate) fn into_patch(self) -> anyhow::Result<GlobalConfigPatch> {
        Ok(GlobalConfigPatch {
            host: sanitize_optional_env_value(self.host),
            port: parse_env_value(self.port, "COPILOT_GATEWAY_PORT")?,
            proxy: sanitize_optional_env_value(self.proxy),
            completions_url: sanitize_optional_env_value(self.completions_url),
            models_url: sanitize_optional_env_value(self.models_url),
            max_sse_line_bytes: parse_env_value(
                self.max_sse_line_bytes,
                "COPILOT_GATEWAY_MAX_SSE_LINE_BYTES",
            )?,
            token: sanitize_optional_env_value(self.token),
        })
    }
}

fn sanitize_optional_env_value(value: Option<String>) -> Option<String> {
    let trimmed = value?.trim().to_string();
    if trimmed.is_empty() {
        return None;
    }
    // Unresolved `${VAR}` placeholders count as unset.
    if trimmed.starts_with("${") && trimmed.ends_with('}') {
        return None;
    }
    Some(trimmed)
}

fn parse_env_value<T>(value: Option<String>, env_name: &str) -> anyhow::Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let Some(raw) = sanitize_optional_env_value(value) else {
        return Ok(None);
    };
    let parsed = raw
        .parse::<T>()
        .with_context(|| format!("invalid {env_name} value: {raw}"))?;
    Ok(Some(parsed))
}
