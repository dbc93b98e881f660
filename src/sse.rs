//! Server-sent event framing.
//!
//! The relay speaks the same line protocol as the upstream provider:
//! `data: <json>\n\n` content frames, a closing `data: [DONE]\n\n` and an
//! optional `event: error` frame. [`SseDecoder`] reassembles frames from
//! arbitrarily split byte chunks.

use bytes::Bytes;
use log::warn;
use serde_json::{json, Value};

pub const DONE_MARKER: &str = "[DONE]";

/// Upper bound on bytes held for a frame that has not terminated yet.
pub const MAX_PENDING_BYTES: usize = 1024 * 1024;

pub fn delta_frame(content: &str) -> Bytes {
    let payload = json!({ "choices": [{ "delta": { "content": content } }] });
    Bytes::from(format!("data: {}\n\n", payload))
}

pub fn done_frame() -> Bytes {
    Bytes::from(format!("data: {}\n\n", DONE_MARKER))
}

pub fn error_frame(message: &str) -> Bytes {
    let payload = json!({ "error": message });
    Bytes::from(format!("event: error\ndata: {}\n\n", payload))
}

/// One complete frame: the optional `event:` name and its `data:` lines joined by `\n`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseFrame {
    pub event: Option<String>,
    pub data: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    Delta(String),
    Done,
    Error(String),
    Other,
}

impl SseFrame {
    fn parse(block: &str) -> Option<Self> {
        let mut event = None;
        let mut data: Vec<&str> = Vec::new();
        for line in block.lines() {
            let line = line.trim_end_matches('\r');
            if let Some(rest) = line.strip_prefix("event:") {
                event = Some(rest.trim().to_string());
            } else if let Some(rest) = line.strip_prefix("data:") {
                data.push(rest.strip_prefix(' ').unwrap_or(rest));
            }
        }
        if event.is_none() && data.is_empty() {
            return None;
        }
        Some(Self {
            event,
            data: data.join("\n"),
        })
    }

    pub fn classify(&self) -> StreamEvent {
        if self.event.as_deref() == Some("error") {
            let message = serde_json::from_str::<Value>(&self.data)
                .ok()
                .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(str::to_string))
                .unwrap_or_else(|| self.data.clone());
            return StreamEvent::Error(message);
        }
        if self.data.trim() == DONE_MARKER {
            return StreamEvent::Done;
        }
        let Ok(value) = serde_json::from_str::<Value>(&self.data) else {
            return StreamEvent::Other;
        };
        value
            .pointer("/choices/0/delta/content")
            .and_then(|c| c.as_str())
            .map(|c| StreamEvent::Delta(c.to_string()))
            .unwrap_or(StreamEvent::Other)
    }
}

/// Incremental frame parser.
///
/// Frames end at a blank line. Whatever follows the last blank line is kept
/// in the buffer and completed by the next `feed`, so a frame split across
/// reads (even mid UTF-8 sequence) is decoded once, whole.
///
/// Each byte is scanned for a boundary once; a new chunk only rescans the
/// last three bytes of the carried-over tail. A tail that grows past
/// [`MAX_PENDING_BYTES`] without terminating is discarded.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buf: Vec<u8>,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn feed(&mut self, chunk: &[u8]) -> Vec<SseFrame> {
        // A separator can straddle the previous tail and this chunk.
        let mut from = self.buf.len().saturating_sub(3);
        self.buf.extend_from_slice(chunk);
        let mut frames = Vec::new();
        while let Some((end, sep_len)) = find_boundary(&self.buf, from) {
            let block: Vec<u8> = self.buf.drain(..end + sep_len).take(end).collect();
            if let Some(frame) = SseFrame::parse(&String::from_utf8_lossy(&block)) {
                frames.push(frame);
            }
            from = 0;
        }
        if self.buf.len() > MAX_PENDING_BYTES {
            warn!(
                "Discarding {} bytes of unterminated SSE frame",
                self.buf.len()
            );
            self.buf = Vec::new();
        }
        frames
    }
}

fn find_boundary(buf: &[u8], from: usize) -> Option<(usize, usize)> {
    for i in from..buf.len() {
        if buf[i..].starts_with(b"\n\n") {
            return Some((i, 2));
        }
        if buf[i..].starts_with(b"\r\n\r\n") {
            return Some((i, 4));
        }
    }
    None
}
