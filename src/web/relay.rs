//! Chat relay: forwards the upstream event stream to the client, or a mock
//! stream when the upstream is unconfigured or unavailable.
//!
//! Once the response has started, every outcome ends the stream with a
//! terminal frame: `[DONE]` from the source, or one `event: error` frame.

use bytes::Bytes;
use futures_util::{Stream, StreamExt};
use log::{debug, info, warn};
use std::convert::Infallible;
use std::sync::Arc;
use uuid::Uuid;

use crate::config::MockDelay;
use crate::mock::{CancelHandle, MockStream};
use crate::sse::{self, SseDecoder, StreamEvent};
use crate::upstream::UpstreamClient;
use crate::web::models::ChatRequest;

pub struct Relay {
    id: Uuid,
    request: ChatRequest,
    upstream: Option<Arc<UpstreamClient>>,
    mock_delay: MockDelay,
    cancel: CancelHandle,
}

impl Relay {
    pub fn new(
        request: ChatRequest,
        upstream: Option<Arc<UpstreamClient>>,
        mock_delay: MockDelay,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            request,
            upstream,
            mock_delay,
            cancel: CancelHandle::default(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Switch handed to the mock stream if this relay falls back to it.
    #[cfg(test)]
    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    /// Lazily produces the response body. Nothing happens until the server
    /// polls it, and dropping it (client gone) stops all further work.
    pub fn into_stream(self) -> impl Stream<Item = Result<Bytes, Infallible>> {
        let Relay {
            id,
            request,
            upstream,
            mock_delay,
            cancel,
        } = self;

        async_stream::stream! {
            let mut progress = Progress::new(id);

            let upstream_body = match upstream {
                Some(client) => {
                    let conversation = request.conversation();
                    match client.open(&conversation, request.model.as_deref()).await {
                        Ok(body) => Some(body),
                        Err(e) => {
                            warn!("relay {}: upstream unavailable, falling back to mock: {}", id, e);
                            None
                        }
                    }
                }
                None => {
                    debug!("relay {}: no upstream credential, using mock", id);
                    None
                }
            };

            match upstream_body {
                Some(mut body) => {
                    progress.source = "upstream";
                    while let Some(item) = body.next().await {
                        match item {
                            Ok(chunk) => {
                                progress.observe(&chunk);
                                yield Ok(chunk);
                            }
                            Err(e) => {
                                warn!("relay {}: {}", id, e);
                                let frame = sse::error_frame("Upstream stream interrupted");
                                progress.observe(&frame);
                                yield Ok(frame);
                                break;
                            }
                        }
                    }
                }
                None => {
                    let mock = MockStream::for_message(request.latest_user_message(), mock_delay)
                        .with_cancel(cancel);
                    progress.watch(mock.cancel_handle());
                    let mut frames = Box::pin(mock.into_stream());
                    while let Some(frame) = frames.next().await {
                        progress.observe(&frame);
                        yield Ok(frame);
                    }
                }
            }

            progress.finish();
        }
    }
}

// Accounting for one relay. Dropped unfinished means the client went away.
struct Progress {
    id: Uuid,
    source: &'static str,
    decoder: SseDecoder,
    bytes: usize,
    content_chars: usize,
    saw_done: bool,
    saw_error: bool,
    finished: bool,
    cancel: Option<CancelHandle>,
}

impl Progress {
    fn new(id: Uuid) -> Self {
        Self {
            id,
            source: "mock",
            decoder: SseDecoder::new(),
            bytes: 0,
            content_chars: 0,
            saw_done: false,
            saw_error: false,
            finished: false,
            cancel: None,
        }
    }

    fn watch(&mut self, cancel: CancelHandle) {
        self.cancel = Some(cancel);
    }

    fn observe(&mut self, chunk: &[u8]) {
        self.bytes += chunk.len();
        for frame in self.decoder.feed(chunk) {
            match frame.classify() {
                StreamEvent::Delta(content) => self.content_chars += content.chars().count(),
                StreamEvent::Done => self.saw_done = true,
                StreamEvent::Error(_) => self.saw_error = true,
                StreamEvent::Other => {}
            }
        }
    }

    fn finish(&mut self) {
        self.finished = true;
        info!(
            "relay {}: {} stream finished, {} bytes, {} content characters, done={}, error={}",
            self.id, self.source, self.bytes, self.content_chars, self.saw_done, self.saw_error
        );
    }
}

impl Drop for Progress {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        if let Some(cancel) = &self.cancel {
            cancel.cancel();
        }
        info!(
            "relay {}: client disconnected after {} bytes of {} stream",
            self.id, self.bytes, self.source
        );
    }
}
