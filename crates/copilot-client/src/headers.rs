use http::HeaderMap;
use http::header::{AUTHORIZATION, CONTENT_TYPE, HeaderName, HeaderValue};

use crate::error::CopilotError;

pub const EDITOR_VERSION: &str = "vscode/1.95.3";
pub const EDITOR_PLUGIN_VERSION: &str = "copilot-chat/0.22.4";
pub const USER_AGENT: &str = "GitHubCopilotChat/0.22.4";
pub const OPENAI_ORGANIZATION: &str = "github-copilot";
pub const OPENAI_INTENT: &str = "conversation-panel";

const EVENT_STREAM: &str = "text/event-stream; charset=utf-8";
const APPLICATION_JSON: &str = "application/json";

/// Identity headers sent on every backend call.
static COPILOT_HEADERS: [(&str, &str); 5] = [
    ("editor-version", EDITOR_VERSION),
    ("editor-plugin-version", EDITOR_PLUGIN_VERSION),
    ("user-agent", USER_AGENT),
    ("openai-organization", OPENAI_ORGANIZATION),
    ("openai-intent", OPENAI_INTENT),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BodyKind {
    None,
    Json,
    EventStream,
}

pub(crate) fn build_headers(token: &str, body: BodyKind) -> Result<HeaderMap, CopilotError> {
    let mut headers = HeaderMap::with_capacity(COPILOT_HEADERS.len() + 2);
    for (name, value) in COPILOT_HEADERS {
        headers.insert(
            HeaderName::from_static(name),
            HeaderValue::from_static(value),
        );
    }

    let mut auth = HeaderValue::from_str(&format!("Bearer {token}"))
        .map_err(|_| CopilotError::InvalidToken)?;
    auth.set_sensitive(true);
    headers.insert(AUTHORIZATION, auth);

    match body {
        BodyKind::None => {}
        BodyKind::Json => {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static(APPLICATION_JSON));
        }
        BodyKind::EventStream => {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static(EVENT_STREAM));
        }
    }
    Ok(headers)
}
