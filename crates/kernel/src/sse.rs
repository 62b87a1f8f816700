//! Incremental server-sent events parser.
//!
//! Follows the `text/event-stream` framing: `event:` and `data:` fields,
//! frames separated by a blank line, `:` comment lines ignored. Bytes may
//! arrive split at any point, including inside a UTF-8 sequence.

use std::collections::VecDeque;

use futures::{Stream, StreamExt};

use crate::api::KernelApiError;
use crate::events::KernelEvent;

/// One dispatched event frame.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SseFrame {
    /// Value of the `event:` field, `None` for the default `message` type.
    pub event: Option<String>,
    /// `data:` lines joined with `\n`.
    pub data: String,
}

/// Buffers raw bytes and emits complete frames.
#[derive(Debug, Default)]
pub struct SseParser {
    buffer: Vec<u8>,
    event: Option<String>,
    data: Vec<String>,
}

impl SseParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk and return every frame it completes.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<SseFrame> {
        self.buffer.extend_from_slice(chunk);
        let mut frames = Vec::new();

        while let Some(pos) = self.buffer.iter().position(|b| *b == b'\n') {
            let mut line: Vec<u8> = self.buffer.drain(..=pos).collect();
            line.pop();
            if line.last() == Some(&b'\r') {
                line.pop();
            }
            let line = String::from_utf8_lossy(&line);
            if let Some(frame) = self.process_line(&line) {
                frames.push(frame);
            }
        }

        frames
    }

    /// Flush a trailing unterminated line and any pending frame.
    pub fn finish(&mut self) -> Vec<SseFrame> {
        let rest = std::mem::take(&mut self.buffer);
        let mut frames = Vec::new();
        if !rest.is_empty() {
            let line = String::from_utf8_lossy(&rest);
            let line = line.trim_end_matches('\r');
            if let Some(frame) = self.process_line(line) {
                frames.push(frame);
            }
        }
        if let Some(frame) = self.dispatch() {
            frames.push(frame);
        }
        frames
    }

    fn process_line(&mut self, line: &str) -> Option<SseFrame> {
        if line.is_empty() {
            return self.dispatch();
        }
        if line.starts_with(':') {
            return None;
        }

        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };

        match field {
            "event" => self.event = Some(value.to_string()),
            "data" => self.data.push(value.to_string()),
            // `id` and `retry` carry nothing the job clients use.
            _ => {}
        }
        None
    }

    fn dispatch(&mut self) -> Option<SseFrame> {
        let event = self.event.take();
        if self.data.is_empty() {
            return None;
        }
        let data = std::mem::take(&mut self.data).join("\n");
        Some(SseFrame { event, data })
    }
}

struct StreamState<S> {
    bytes: std::pin::Pin<Box<S>>,
    parser: SseParser,
    pending: VecDeque<SseFrame>,
    finished: bool,
}

/// Turn a byte stream into a stream of [`KernelEvent`]s.
///
/// Frames that do not map to a known event are skipped. A transport error
/// is yielded once and ends the stream.
pub fn event_stream<S, B, E>(
    bytes: S,
) -> impl Stream<Item = Result<KernelEvent, KernelApiError>> + Send + 'static
where
    S: Stream<Item = Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
    E: Into<KernelApiError> + Send + 'static,
{
    let state = StreamState {
        bytes: Box::pin(bytes),
        parser: SseParser::new(),
        pending: VecDeque::new(),
        finished: false,
    };

    futures::stream::unfold(state, |mut st| async move {
        loop {
            if let Some(frame) = st.pending.pop_front() {
                match KernelEvent::from_frame(&frame) {
                    Some(event) => return Some((Ok(event), st)),
                    None => {
                        tracing::debug!(event = ?frame.event, "Skipping unrecognized stream frame");
                        continue;
                    }
                }
            }
            if st.finished {
                return None;
            }
            match st.bytes.next().await {
                Some(Ok(chunk)) => {
                    let frames = st.parser.feed(chunk.as_ref());
                    st.pending.extend(frames);
                }
                Some(Err(e)) => {
                    st.finished = true;
                    return Some((Err(e.into()), st));
                }
                None => {
                    st.finished = true;
                    let frames = st.parser.finish();
                    st.pending.extend(frames);
                }
            }
        }
    })
}
