use std::error::Error;
use std::fmt;

use bytes::{Buf, Bytes, BytesMut};

/// Upper bound for a single line when none is configured.
pub const DEFAULT_MAX_LINE_BYTES: usize = 1024 * 1024;

const INITIAL_BUFFER_BYTES: usize = 4096;
const DATA_PREFIX: &[u8] = b"data:";
const DONE_SENTINEL: &[u8] = b"[DONE]";

/// A qualifying line of the backend event stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SseLine {
    /// Payload of a `data:` line, prefix stripped and whitespace trimmed.
    Data(Bytes),
    /// `data: [DONE]`.
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SseLineTooLong {
    pub limit: usize,
}

impl fmt::Display for SseLineTooLong {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sse line exceeds {} bytes", self.limit)
    }
}

impl Error for SseLineTooLong {}

/// Splits a byte stream into lines and keeps only `data:` lines.
///
/// Blank separators, `:` comments, `event:`/`id:` fields and anything else
/// without the `data:` prefix are dropped.
#[derive(Debug)]
pub struct SseLineParser {
    buffer: BytesMut,
    max_line_bytes: usize,
}

impl Default for SseLineParser {
    fn default() -> Self {
        Self::new()
    }
}

impl SseLineParser {
    pub fn new() -> Self {
        Self::with_max_line_bytes(DEFAULT_MAX_LINE_BYTES)
    }

    pub fn with_max_line_bytes(max_line_bytes: usize) -> Self {
        Self {
            buffer: BytesMut::with_capacity(INITIAL_BUFFER_BYTES.min(max_line_bytes.max(1))),
            max_line_bytes,
        }
    }

    pub fn push_bytes(&mut self, chunk: &[u8]) {
        self.buffer.extend_from_slice(chunk);
    }

    /// Returns the next complete qualifying line, or `None` when more input is
    /// needed.
    pub fn next_line(&mut self) -> Result<Option<SseLine>, SseLineTooLong> {
        while let Some(pos) = self.buffer.iter().position(|b| *b == b'\n') {
            let mut line = self.buffer.split_to(pos + 1).freeze();
            line.truncate(pos);
            if line.last() == Some(&b'\r') {
                line.truncate(pos - 1);
            }
            if line.len() > self.max_line_bytes {
                return Err(self.too_long());
            }
            if let Some(parsed) = classify(line) {
                return Ok(Some(parsed));
            }
        }

        // A trailing `\r` may belong to a `\r\n` split across chunks.
        let mut pending = self.buffer.len();
        if self.buffer.last() == Some(&b'\r') {
            pending -= 1;
        }
        if pending > self.max_line_bytes {
            return Err(self.too_long());
        }
        Ok(None)
    }

    /// Flushes an unterminated final line once the input has ended.
    pub fn finish(&mut self) -> Result<Option<SseLine>, SseLineTooLong> {
        if self.buffer.is_empty() {
            return Ok(None);
        }
        let mut line = std::mem::take(&mut self.buffer).freeze();
        if line.last() == Some(&b'\r') {
            line.truncate(line.len() - 1);
        }
        if line.len() > self.max_line_bytes {
            return Err(self.too_long());
        }
        Ok(classify(line))
    }

    fn too_long(&mut self) -> SseLineTooLong {
        self.buffer.clear();
        SseLineTooLong {
            limit: self.max_line_bytes,
        }
    }
}

fn classify(mut line: Bytes) -> Option<SseLine> {
    if !line.starts_with(DATA_PREFIX) {
        return None;
    }
    line.advance(DATA_PREFIX.len());

    let start = line
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(line.len());
    let end = line
        .iter()
        .rposition(|b| !b.is_ascii_whitespace())
        .map_or(start, |idx| idx + 1);
    let payload = line.slice(start..end);

    if payload.as_ref() == DONE_SENTINEL {
        Some(SseLine::Done)
    } else {
        Some(SseLine::Data(payload))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(parser: &mut SseLineParser) -> Vec<SseLine> {
        let mut out = Vec::new();
        while let Some(line) = parser.next_line().expect("line within limit") {
            out.push(line);
        }
        out
    }

    #[test]
    fn keeps_only_data_lines() {
        let mut parser = SseLineParser::new();
        parser.push_bytes(b": keep-alive\n\nevent: message\ndata: {\"id\":\"a\"}\r\n\ndata:{\"id\":\"b\"}  \n");
        assert_eq!(
            drain(&mut parser),
            vec![
                SseLine::Data(Bytes::from_static(b"{\"id\":\"a\"}")),
                SseLine::Data(Bytes::from_static(b"{\"id\":\"b\"}")),
            ]
        );
    }

    #[test]
    fn reassembles_lines_split_across_chunks() {
        let mut parser = SseLineParser::new();
        parser.push_bytes(b"da");
        assert_eq!(parser.next_line().unwrap(), None);
        parser.push_bytes(b"ta: {\"x\"");
        assert_eq!(parser.next_line().unwrap(), None);
        parser.push_bytes(b":1}\n\ndata: [DONE]\n");
        assert_eq!(
            drain(&mut parser),
            vec![
                SseLine::Data(Bytes::from_static(b"{\"x\":1}")),
                SseLine::Done
            ]
        );
    }

    #[test]
    fn finish_flushes_unterminated_line() {
        let mut parser = SseLineParser::new();
        parser.push_bytes(b"data: [DONE]");
        assert_eq!(parser.next_line().unwrap(), None);
        assert_eq!(parser.finish().unwrap(), Some(SseLine::Done));
        assert_eq!(parser.finish().unwrap(), None);
    }

    #[test]
    fn empty_data_line_is_still_a_frame() {
        let mut parser = SseLineParser::new();
        parser.push_bytes(b"data:\n");
        assert_eq!(drain(&mut parser), vec![SseLine::Data(Bytes::new())]);
    }

    #[test]
    fn rejects_lines_over_the_limit() {
        let mut parser = SseLineParser::with_max_line_bytes(16);
        parser.push_bytes(b"data: 0123456789abcdef\n");
        assert_eq!(parser.next_line(), Err(SseLineTooLong { limit: 16 }));

        let mut parser = SseLineParser::with_max_line_bytes(16);
        parser.push_bytes(b"data: 0123456789abcdef");
        assert_eq!(parser.next_line(), Err(SseLineTooLong { limit: 16 }));
    }

    #[test]
    fn crlf_split_across_chunks_keeps_the_limit() {
        let mut parser = SseLineParser::with_max_line_bytes(16);
        parser.push_bytes(b"data: 0123456789\r");
        assert_eq!(parser.next_line(), Ok(None));
        parser.push_bytes(b"\n");
        assert_eq!(
            parser.next_line(),
            Ok(Some(SseLine::Data(Bytes::from_static(b"0123456789"))))
        );

        let mut parser = SseLineParser::with_max_line_bytes(16);
        parser.push_bytes(b"data: 0123456789a\r");
        assert_eq!(parser.next_line(), Err(SseLineTooLong { limit: 16 }));
    }

    #[test]
    fn grows_past_initial_buffer() {
        let payload = "x".repeat(10_000);
        let mut parser = SseLineParser::new();
        parser.push_bytes(format!("data: {payload}\n").as_bytes());
        assert_eq!(
            drain(&mut parser),
            vec![SseLine::Data(Bytes::from(payload))]
        );
    }
}
