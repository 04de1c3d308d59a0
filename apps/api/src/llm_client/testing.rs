//! Scripted `GenerationBackend` for orchestrator and router tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use futures::StreamExt;

use crate::llm_client::streaming::{Fragment, FragmentStream};
use crate::llm_client::{GenerationBackend, GenerationRequest, LlmError};

enum Reply {
    Text(String),
    Fragments(Vec<Option<String>>),
    Fail(LlmError),
}

/// Answers every call with the same scripted reply and records what it saw.
pub struct ScriptedBackend {
    reply: Reply,
    calls: AtomicUsize,
    stream_calls: AtomicUsize,
    last_request: Mutex<Option<GenerationRequest>>,
}

impl ScriptedBackend {
    fn with(reply: Reply) -> Self {
        Self {
            reply,
            calls: AtomicUsize::new(0),
            stream_calls: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        }
    }

    /// Replies with `text`, whole for `generate`, as one fragment for streams.
    pub fn replying(text: impl Into<String>) -> Self {
        Self::with(Reply::Text(text.into()))
    }

    /// Replies with the given fragments; `None` is a fragment without text.
    pub fn streaming(fragments: Vec<Option<&str>>) -> Self {
        Self::with(Reply::Fragments(
            fragments
                .into_iter()
                .map(|f| f.map(str::to_string))
                .collect(),
        ))
    }

    pub fn failing(error: LlmError) -> Self {
        Self::with(Reply::Fail(error))
    }

    /// Total calls across both profiles.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn stream_calls(&self) -> usize {
        self.stream_calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<GenerationRequest> {
        self.last_request.lock().unwrap().clone()
    }

    pub fn last_prompt(&self) -> String {
        self.last_request()
            .map(|r| {
                r.contents
                    .iter()
                    .flat_map(|c| c.parts.iter())
                    .map(|p| p.text.as_str())
                    .collect::<Vec<_>>()
                    .join("\n")
            })
            .unwrap_or_default()
    }

    fn record(&self, request: &GenerationRequest) {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().unwrap() = Some(request.clone());
    }
}

#[async_trait]
impl GenerationBackend for ScriptedBackend {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, LlmError> {
        self.record(request);
        match &self.reply {
            Reply::Text(text) => Ok(text.clone()),
            Reply::Fragments(fragments) => Ok(fragments.iter().flatten().cloned().collect()),
            Reply::Fail(e) => Err(e.clone()),
        }
    }

    async fn generate_stream(
        &self,
        request: &GenerationRequest,
    ) -> Result<FragmentStream, LlmError> {
        self.record(request);
        self.stream_calls.fetch_add(1, Ordering::SeqCst);
        let fragments: Vec<Result<Fragment, LlmError>> = match &self.reply {
            Reply::Text(text) => vec![Ok(Fragment::text(text.clone()))],
            Reply::Fragments(fragments) => fragments
                .iter()
                .map(|f| Ok(Fragment { text: f.clone() }))
                .collect(),
            Reply::Fail(e) => return Err(e.clone()),
        };
        Ok(futures::stream::iter(fragments).boxed())
    }
}
