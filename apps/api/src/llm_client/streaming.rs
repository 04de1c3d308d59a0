//! SSE fragment stream for `streamGenerateContent?alt=sse`.
//!
//! Turns the raw byte stream into `Fragment`s, one per `data:` line. The
//! stream owns the HTTP response body: dropping it releases the connection.

use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::Bytes;
use futures::stream::{BoxStream, Stream, StreamExt};
use tracing::{debug, warn};

use crate::llm_client::types::GenerateContentResponse;
use crate::llm_client::LlmError;

/// One piece of a streamed response. `text` is `None` when the chunk carried
/// no candidate, content, parts or text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    pub text: Option<String>,
}

impl Fragment {
    pub fn empty() -> Self {
        Self { text: None }
    }
}

#[cfg(test)]
impl Fragment {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
        }
    }
}

pub type FragmentStream = BoxStream<'static, Result<Fragment, LlmError>>;

/// Adapter from SSE bytes to fragments.
pub struct SseFragmentStream {
    inner: Pin<Box<dyn Stream<Item = Result<Bytes, reqwest::Error>> + Send>>,
    buffer: String,
    pending_utf8: Vec<u8>,
}

impl SseFragmentStream {
    pub(crate) fn new(
        byte_stream: impl Stream<Item = Result<Bytes, reqwest::Error>> + Send + 'static,
    ) -> Self {
        Self {
            inner: Box::pin(byte_stream),
            buffer: String::new(),
            pending_utf8: Vec::new(),
        }
    }

    /// Appends bytes to the line buffer, holding back an incomplete UTF-8
    /// sequence split across network chunks.
    fn push_bytes(&mut self, bytes: &[u8]) {
        self.pending_utf8.extend_from_slice(bytes);
        let valid_up_to = match std::str::from_utf8(&self.pending_utf8) {
            Ok(text) => {
                self.buffer.push_str(text);
                self.pending_utf8.clear();
                return;
            }
            Err(e) if e.error_len().is_none() => e.valid_up_to(),
            Err(_) => {
                let bytes = std::mem::take(&mut self.pending_utf8);
                self.buffer.push_str(&String::from_utf8_lossy(&bytes));
                return;
            }
        };
        let rest = self.pending_utf8.split_off(valid_up_to);
        self.buffer
            .push_str(&String::from_utf8_lossy(&self.pending_utf8));
        self.pending_utf8 = rest;
    }
}

impl Stream for SseFragmentStream {
    type Item = Result<Fragment, LlmError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();

        loop {
            if let Some(fragment) = next_event(&mut this.buffer, false) {
                return Poll::Ready(Some(Ok(fragment)));
            }

            match this.inner.as_mut().poll_next(cx) {
                Poll::Ready(Some(Ok(bytes))) => this.push_bytes(&bytes),
                Poll::Ready(Some(Err(e))) => {
                    return Poll::Ready(Some(Err(LlmError::from_reqwest(e))));
                }
                Poll::Ready(None) => {
                    if !this.pending_utf8.is_empty() {
                        let tail = std::mem::take(&mut this.pending_utf8);
                        this.buffer.push_str(&String::from_utf8_lossy(&tail));
                    }
                    return Poll::Ready(next_event(&mut this.buffer, true).map(Ok));
                }
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}

/// Pops the next `data:` line off the buffer. With `at_eof` the final
/// unterminated line is consumed as well.
fn next_event(buffer: &mut String, at_eof: bool) -> Option<Fragment> {
    loop {
        let line = match buffer.find('\n') {
            Some(pos) => {
                let line = buffer[..pos].trim().to_string();
                buffer.drain(..=pos);
                line
            }
            None if at_eof && !buffer.trim().is_empty() => std::mem::take(buffer).trim().to_string(),
            None => return None,
        };

        // Blank lines separate events; `event:`/`id:`/`retry:` carry nothing for us.
        let Some(data) = line.strip_prefix("data:") else {
            continue;
        };

        return Some(parse_fragment(data.trim()));
    }
}

fn parse_fragment(data: &str) -> Fragment {
    match serde_json::from_str::<GenerateContentResponse>(data) {
        Ok(chunk) => {
            if let Some(reason) = chunk.block_reason() {
                warn!("Stream chunk blocked by backend: {reason}");
            }
            Fragment { text: chunk.text() }
        }
        Err(e) => {
            warn!(
                "Skipping undecodable stream chunk: {e} (data: {})",
                data.chars().take(200).collect::<String>()
            );
            Fragment::empty()
        }
    }
}

/// Drains a fragment stream into one buffer, in receipt order. Fragments
/// without text are skipped; a transport error aborts the whole call.
pub async fn collect_fragments(mut stream: FragmentStream) -> Result<String, LlmError> {
    let mut buffer = String::new();
    let mut received = 0usize;
    let mut skipped = 0usize;

    while let Some(fragment) = stream.next().await {
        received += 1;
        match fragment?.text {
            Some(text) => buffer.push_str(&text),
            None => skipped += 1,
        }
    }

    debug!(
        "Stream drained: {received} fragments ({skipped} without text), {} chars",
        buffer.len()
    );
    Ok(buffer)
}
