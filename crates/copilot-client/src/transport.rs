use std::future::Future;
use std::time::Instant;

use bytes::Bytes;
use futures_util::StreamExt;
use futures_util::stream::BoxStream;
use http::StatusCode;
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use copilot_protocol::sse::{SseLine, SseLineParser};

use crate::CopilotClient;
use crate::error::{CopilotError, StatusError};
use crate::headers::{BodyKind, build_headers};

const PROVIDER_NAME: &str = "copilot";

impl CopilotClient {
    /// Sends an authenticated GET. The response is returned as-is.
    pub(crate) async fn do_get(
        &self,
        op: &str,
        token: &str,
        url: &str,
        cancel: &CancellationToken,
    ) -> Result<wreq::Response, CopilotError> {
        let headers = build_headers(token, BodyKind::None)?;
        send_with_logging(op, "GET", url, false, cancel, || {
            self.http.get(url).headers(headers).send()
        })
        .await
    }

    /// Sends an authenticated POST with a JSON body. The response is returned as-is.
    pub(crate) async fn do_post<T: Serialize + ?Sized>(
        &self,
        op: &str,
        token: &str,
        url: &str,
        body: &T,
        is_stream: bool,
        cancel: &CancellationToken,
    ) -> Result<wreq::Response, CopilotError> {
        let payload = serde_json::to_vec(body).map_err(CopilotError::Encode)?;
        let kind = if is_stream {
            BodyKind::EventStream
        } else {
            BodyKind::Json
        };
        let headers = build_headers(token, kind)?;
        send_with_logging(op, "POST", url, is_stream, cancel, || {
            self.http.post(url).headers(headers).body(payload).send()
        })
        .await
    }

    /// GET, require 200, read the whole body.
    pub(crate) async fn fetch(
        &self,
        op: &str,
        token: &str,
        url: &str,
        cancel: &CancellationToken,
    ) -> Result<Bytes, CopilotError> {
        let response = self.do_get(op, token, url, cancel).await?;
        let response = ensure_ok(op, response, cancel).await?;
        read_body(response, cancel).await
    }

    /// POST, require 200, read the whole body.
    pub(crate) async fn request<T: Serialize + ?Sized>(
        &self,
        op: &str,
        token: &str,
        url: &str,
        body: &T,
        cancel: &CancellationToken,
    ) -> Result<Bytes, CopilotError> {
        let response = self.do_post(op, token, url, body, false, cancel).await?;
        let response = ensure_ok(op, response, cancel).await?;
        read_body(response, cancel).await
    }

    /// POST, require 200, then hand back a reader over the `data:` frames.
    pub(crate) async fn stream<T: Serialize + ?Sized>(
        &self,
        op: &str,
        token: &str,
        url: &str,
        body: &T,
        cancel: &CancellationToken,
    ) -> Result<SseFrames, CopilotError> {
        let response = self.do_post(op, token, url, body, true, cancel).await?;
        let response = ensure_ok(op, response, cancel).await?;
        Ok(SseFrames::new(
            response.bytes_stream().boxed(),
            self.config.max_sse_line_bytes,
        ))
    }
}

/// Reads `data:` payloads off a backend event stream, one line at a time.
///
/// Ends at `data: [DONE]` or at end of body. The body is released when the
/// reader is dropped.
pub struct SseFrames {
    body: BoxStream<'static, Result<Bytes, wreq::Error>>,
    parser: SseLineParser,
    finished: bool,
}

impl SseFrames {
    pub(crate) fn new(
        body: BoxStream<'static, Result<Bytes, wreq::Error>>,
        max_line_bytes: usize,
    ) -> Self {
        Self {
            body,
            parser: SseLineParser::with_max_line_bytes(max_line_bytes),
            finished: false,
        }
    }

    /// Returns the next data payload, or `None` once the stream has ended.
    ///
    /// `cancel` is checked before every line and raced against every network
    /// read; a fired token yields [`CopilotError::Cancelled`] and the pending
    /// line is discarded.
    pub async fn next_frame(
        &mut self,
        cancel: &CancellationToken,
    ) -> Result<Option<Bytes>, CopilotError> {
        loop {
            if self.finished {
                return Ok(None);
            }

            if let Some(line) = self.parser.next_line()? {
                return self.accept(line, cancel);
            }

            let next = tokio::select! {
                biased;
                _ = cancel.cancelled() => None,
                next = self.body.next() => Some(next),
            };
            let Some(next) = next else {
                self.finished = true;
                return Err(CopilotError::Cancelled);
            };

            match next {
                Some(chunk) => self.parser.push_bytes(&chunk?),
                None => {
                    let tail = self.parser.finish()?;
                    let frame = match tail {
                        Some(line) => self.accept(line, cancel),
                        None => Ok(None),
                    };
                    self.finished = true;
                    return frame;
                }
            }
        }
    }

    fn accept(
        &mut self,
        line: SseLine,
        cancel: &CancellationToken,
    ) -> Result<Option<Bytes>, CopilotError> {
        if cancel.is_cancelled() {
            self.finished = true;
            return Err(CopilotError::Cancelled);
        }
        match line {
            SseLine::Done => {
                self.finished = true;
                Ok(None)
            }
            SseLine::Data(payload) => Ok(Some(payload)),
        }
    }
}

async fn send_with_logging<F, Fut>(
    op: &str,
    method: &str,
    url: &str,
    is_stream: bool,
    cancel: &CancellationToken,
    send: F,
) -> Result<wreq::Response, CopilotError>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<wreq::Response, wreq::Error>>,
{
    if cancel.is_cancelled() {
        return Err(CopilotError::Cancelled);
    }
    let started_at = log_upstream_request(op, method, url, is_stream);
    let result = tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(CopilotError::Cancelled),
        result = send() => result.map_err(CopilotError::from),
    };
    match &result {
        Ok(response) => log_upstream_response_ok(
            op,
            response.status(),
            started_at.elapsed().as_millis(),
            is_stream,
        ),
        Err(err) => log_upstream_response_err(op, started_at.elapsed().as_millis(), err),
    }
    result
}

fn log_upstream_request(op: &str, method: &str, url: &str, is_stream: bool) -> Instant {
    info!(
        event = "upstream_request",
        provider = %PROVIDER_NAME,
        op = %op,
        method = %method,
        url = %url,
        is_stream = is_stream
    );
    Instant::now()
}

fn log_upstream_response_ok(op: &str, status: StatusCode, elapsed_ms: u128, is_stream: bool) {
    info!(
        event = "upstream_response",
        provider = %PROVIDER_NAME,
        op = %op,
        status = %status.as_u16(),
        elapsed_ms = elapsed_ms,
        is_stream = is_stream
    );
}

fn log_upstream_response_err(op: &str, elapsed_ms: u128, err: impl std::fmt::Display) {
    warn!(
        event = "upstream_response",
        provider = %PROVIDER_NAME,
        op = %op,
        status = "error",
        elapsed_ms = elapsed_ms,
        error = %err
    );
}

/// Anything but 200 becomes a [`StatusError`] carrying the body verbatim.
async fn ensure_ok(
    op: &str,
    response: wreq::Response,
    cancel: &CancellationToken,
) -> Result<wreq::Response, CopilotError> {
    let status = response.status();
    if status == StatusCode::OK {
        return Ok(response);
    }

    let body = match read_body(response, cancel).await {
        Ok(body) => body,
        Err(CopilotError::Cancelled) => return Err(CopilotError::Cancelled),
        Err(_) => Bytes::new(),
    };
    warn!(
        event = "upstream_status",
        provider = %PROVIDER_NAME,
        op = %op,
        status = %status.as_u16(),
        body_bytes = body.len()
    );
    Err(StatusError {
        status_code: status.as_u16(),
        status: status_line(status),
        message: String::from_utf8_lossy(&body).into_owned(),
    }
    .into())
}

async fn read_body(
    response: wreq::Response,
    cancel: &CancellationToken,
) -> Result<Bytes, CopilotError> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(CopilotError::Cancelled),
        body = response.bytes() => body.map_err(CopilotError::from),
    }
}

fn status_line(status: StatusCode) -> String {
    match status.canonical_reason() {
        Some(reason) => format!("{} {reason}", status.as_u16()),
        None => status.as_u16().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::stream;

    fn frames_from(chunks: Vec<Bytes>) -> SseFrames {
        let body = stream::iter(chunks.into_iter().map(Ok::<_, wreq::Error>)).boxed();
        SseFrames::new(body, 1024)
    }

    #[test]
    fn status_line_uses_canonical_reason() {
        assert_eq!(status_line(StatusCode::TOO_MANY_REQUESTS), "429 Too Many Requests");
        assert_eq!(status_line(StatusCode::from_u16(599).unwrap()), "599");
    }

    #[tokio::test]
    async fn frames_stop_at_done() {
        let cancel = CancellationToken::new();
        let mut frames = frames_from(vec![
            Bytes::from_static(b": ping\n\ndata: {\"id\":\"1\"}\n"),
            Bytes::from_static(b"\ndata: [DONE]\n\ndata: {\"id\":\"2\"}\n"),
        ]);
        assert_eq!(
            frames.next_frame(&cancel).await.unwrap(),
            Some(Bytes::from_static(b"{\"id\":\"1\"}"))
        );
        assert_eq!(frames.next_frame(&cancel).await.unwrap(), None);
        assert_eq!(frames.next_frame(&cancel).await.unwrap(), None);
    }

    #[tokio::test]
    async fn unterminated_tail_is_delivered_at_eof() {
        let cancel = CancellationToken::new();
        let mut frames = frames_from(vec![
            Bytes::from_static(b"data: {\"id\":"),
            Bytes::from_static(b"\"tail\"}"),
        ]);
        assert_eq!(
            frames.next_frame(&cancel).await.unwrap(),
            Some(Bytes::from_static(b"{\"id\":\"tail\"}"))
        );
        assert_eq!(frames.next_frame(&cancel).await.unwrap(), None);
    }

    #[tokio::test]
    async fn cancelled_token_discards_buffered_lines() {
        let cancel = CancellationToken::new();
        let mut frames = frames_from(vec![Bytes::from_static(
            b"data: {\"id\":\"1\"}\ndata: {\"id\":\"2\"}\n",
        )]);
        assert!(frames.next_frame(&cancel).await.unwrap().is_some());
        cancel.cancel();
        assert!(matches!(
            frames.next_frame(&cancel).await,
            Err(CopilotError::Cancelled)
        ));
        assert_eq!(frames.next_frame(&cancel).await.unwrap(), None);
    }

    #[tokio::test]
    async fn cancel_interrupts_a_stalled_body_read() {
        let cancel = CancellationToken::new();
        let body = stream::iter(vec![Ok::<_, wreq::Error>(Bytes::from_static(
            b"data: {\"id\":\"1\"}\n",
        ))])
        .chain(stream::pending())
        .boxed();
        let mut frames = SseFrames::new(body, 1024);
        assert!(frames.next_frame(&cancel).await.unwrap().is_some());

        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(std::time::Duration::from_millis(50)).await;
            trigger.cancel();
        });
        assert!(matches!(
            frames.next_frame(&cancel).await,
            Err(CopilotError::Cancelled)
        ));
    }

    #[tokio::test]
    async fn overlong_line_fails_the_stream() {
        let cancel = CancellationToken::new();
        let long = Bytes::from(format!("data: {}\n", "y".repeat(2048)));
        let mut frames = frames_from(vec![long]);
        assert!(matches!(
            frames.next_frame(&cancel).await,
            Err(CopilotError::LineTooLong(_))
        ));
    }
}
