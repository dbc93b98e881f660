mod responses;

use bytes::Bytes;
use futures_util::Stream;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::config::MockDelay;
use crate::sse;

/// Picks the canned answer for a user message.
///
/// The first table entry with any keyword contained in the lowercased
/// message wins; no match yields the general answer.
pub fn select_response(user_message: &str) -> &'static str {
    let message = user_message.to_lowercase();
    responses::CANNED
        .iter()
        .find(|(triggers, _)| triggers.iter().any(|t| message.contains(t)))
        .map(|(_, text)| *text)
        .unwrap_or(responses::GENERAL)
}

/// Clonable switch that stops a [`MockStream`] before its next frame.
#[derive(Debug, Clone, Default)]
pub struct CancelHandle(Arc<AtomicBool>);

impl CancelHandle {
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Locally synthesized stand-in for the upstream event stream.
pub struct MockStream {
    text: &'static str,
    delay: MockDelay,
    cancel: CancelHandle,
}

impl MockStream {
    pub fn new(text: &'static str, delay: MockDelay) -> Self {
        Self {
            text,
            delay,
            cancel: CancelHandle::default(),
        }
    }

    pub fn for_message(user_message: &str, delay: MockDelay) -> Self {
        Self::new(select_response(user_message), delay)
    }

    /// Replaces the stream's switch with one the caller already holds.
    pub fn with_cancel(mut self, cancel: CancelHandle) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    /// Consumes the generator into its frame sequence: one empty delta, one
    /// delta per word, then `[DONE]`. Once cancelled nothing more is yielded,
    /// the terminal frame included.
    pub fn into_stream(self) -> impl Stream<Item = Bytes> {
        let MockStream { text, delay, cancel } = self;
        async_stream::stream! {
            if cancel.is_cancelled() {
                return;
            }
            yield sse::delta_frame("");

            let words = text.split(' ').filter(|w| !w.is_empty());
            for (index, word) in words.enumerate() {
                if cancel.is_cancelled() {
                    return;
                }
                if index == 0 {
                    yield sse::delta_frame(word);
                } else {
                    yield sse::delta_frame(&format!(" {}", word));
                }
                let pause = delay.sample();
                if !pause.is_zero() {
                    tokio::time::sleep(pause).await;
                }
            }

            if cancel.is_cancelled() {
                return;
            }
            yield sse::done_frame();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sse::{SseDecoder, StreamEvent};
    use futures_util::StreamExt;

    fn decode(frames: &[Bytes]) -> Vec<StreamEvent> {
        let mut decoder = SseDecoder::new();
        frames
            .iter()
            .flat_map(|f| decoder.feed(f))
            .map(|f| f.classify())
            .collect()
    }

    #[test]
    fn ecg_trigger_matches_in_any_case() {
        assert_eq!(select_response("How do I filter an ECG?"), responses::CANNED[0].1);
        assert_eq!(select_response("ekg lead placement"), responses::CANNED[0].1);
        assert!(select_response("Electrocardiogram basics").starts_with("**ECG Signal Analysis"));
    }

    #[test]
    fn first_matching_entry_wins_over_later_ones() {
        // "ecg" (entry 0) and "mri" (entry 3) both match
        assert_eq!(select_response("ECG during MRI"), responses::CANNED[0].1);
        assert_eq!(select_response("MRI imaging of impedance"), responses::CANNED[1].1);
    }

    #[test]
    fn unmatched_message_gets_general_text_verbatim() {
        assert_eq!(select_response("what's the weather like"), responses::GENERAL);
        assert_eq!(select_response(""), responses::GENERAL);
    }

    #[tokio::test]
    async fn stream_reassembles_the_canned_text() {
        let frames: Vec<Bytes> = MockStream::new("Hello  brave\nnew world", MockDelay::NONE)
            .into_stream()
            .collect()
            .await;
        let events = decode(&frames);

        assert_eq!(events.first(), Some(&StreamEvent::Delta(String::new())));
        assert_eq!(events.last(), Some(&StreamEvent::Done));
        let text: String = events
            .iter()
            .filter_map(|e| match e {
                StreamEvent::Delta(c) => Some(c.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(text, "Hello brave\nnew world");
        // empty delta + 3 words + done
        assert_eq!(events.len(), 5);
    }

    #[tokio::test]
    async fn cancellation_stops_words_and_suppresses_done() {
        let mock = MockStream::for_message("ecg please", MockDelay::NONE);
        let handle = mock.cancel_handle();
        let mut stream = Box::pin(mock.into_stream());

        let mut seen = Vec::new();
        for _ in 0..3 {
            seen.push(stream.next().await.unwrap());
        }
        handle.cancel();
        while let Some(frame) = stream.next().await {
            seen.push(frame);
        }

        let events = decode(&seen);
        assert_eq!(events.len(), 3);
        assert!(!events.contains(&StreamEvent::Done));
    }

    #[tokio::test]
    async fn shared_cancel_handle_controls_the_stream() {
        let handle = CancelHandle::default();
        let mock = MockStream::for_message("anything", MockDelay::NONE).with_cancel(handle.clone());
        handle.cancel();
        assert!(mock.cancel_handle().is_cancelled());
        let frames: Vec<Bytes> = mock.into_stream().collect().await;
        assert!(frames.is_empty());
    }

    #[tokio::test]
    async fn cancelled_before_start_yields_nothing() {
        let mock = MockStream::for_message("anything", MockDelay::NONE);
        mock.cancel_handle().cancel();
        let frames: Vec<Bytes> = mock.into_stream().collect().await;
        assert!(frames.is_empty());
    }
}
