//! Shared test doubles for relay and router tests.

#![allow(dead_code)] // each test binary uses a different subset

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::StreamExt;

use genrelay_core::{EventKind, OutboundEvent, PacingConfig};
use genrelay_server::relay::{RelayObserver, RelayOptions, SessionOutcome, StreamRelay};
use genrelay_server::upstream::{
    GenerateRequest, Upstream, UpstreamError, UpstreamResponse,
};

/// What the scripted upstream does after its last chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tail {
    /// Body ends normally.
    End,
    /// Body never ends (a slow generation).
    Hang,
    /// Connection breaks.
    Reset,
}

/// Counters shared between a [`ScriptedUpstream`] and the test.
#[derive(Debug, Default)]
pub struct Probe {
    pub opened: AtomicUsize,
    /// Upstream responses currently alive (opened and not yet dropped).
    pub live: AtomicUsize,
    /// Body chunks handed to the relay.
    pub reads: AtomicUsize,
    pub requests: Mutex<Vec<GenerateRequest>>,
}

impl Probe {
    pub fn live(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }
}

/// Decrements `Probe::live` when the body is dropped.
struct LiveGuard(Arc<Probe>);

impl Drop for LiveGuard {
    fn drop(&mut self) {
        self.0.live.fetch_sub(1, Ordering::SeqCst);
    }
}

/// In-memory upstream replaying a fixed list of body chunks.
pub struct ScriptedUpstream {
    pub status: u16,
    pub chunks: Vec<Vec<u8>>,
    pub tail: Tail,
    pub refuse: bool,
    pub probe: Arc<Probe>,
}

impl ScriptedUpstream {
    /// One body chunk per line, each terminated by `\n`.
    pub fn lines(lines: &[&str]) -> Self {
        Self::chunks(lines.iter().map(|l| format!("{l}\n").into_bytes()).collect())
    }

    pub fn chunks(chunks: Vec<Vec<u8>>) -> Self {
        Self {
            status: 200,
            chunks,
            tail: Tail::End,
            refuse: false,
            probe: Arc::new(Probe::default()),
        }
    }

    /// Upstream whose connection attempt fails.
    pub fn refusing() -> Self {
        Self {
            refuse: true,
            ..Self::chunks(Vec::new())
        }
    }

    #[must_use]
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    #[must_use]
    pub fn with_tail(mut self, tail: Tail) -> Self {
        self.tail = tail;
        self
    }
}

#[async_trait]
impl Upstream for ScriptedUpstream {
    async fn open(&self, request: &GenerateRequest) -> Result<UpstreamResponse, UpstreamError> {
        self.probe.requests.lock().unwrap().push(request.clone());
        if self.refuse {
            return Err(UpstreamError::Connect("connection refused".into()));
        }
        self.probe.opened.fetch_add(1, Ordering::SeqCst);
        self.probe.live.fetch_add(1, Ordering::SeqCst);

        let guard = LiveGuard(Arc::clone(&self.probe));
        let probe = Arc::clone(&self.probe);
        let chunks = self.chunks.clone();
        let tail = self.tail;
        let body = async_stream::stream! {
            let _guard = guard;
            for chunk in chunks {
                probe.reads.fetch_add(1, Ordering::SeqCst);
                yield Ok(Bytes::from(chunk));
            }
            match tail {
                Tail::End => {}
                Tail::Hang => {
                    std::future::pending::<()>().await;
                }
                Tail::Reset => {
                    yield Err(UpstreamError::Transport("connection reset".into()));
                }
            }
        };

        Ok(UpstreamResponse {
            status: self.status,
            body: Box::pin(body),
        })
    }
}

/// Observer recording what the relay reports.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    pub malformed: AtomicUsize,
    pub upstream_errors: AtomicUsize,
    pub partial_bytes: AtomicUsize,
    pub endings: Mutex<Vec<(SessionOutcome, usize)>>,
}

impl RecordingObserver {
    pub fn malformed(&self) -> usize {
        self.malformed.load(Ordering::SeqCst)
    }

    pub fn endings(&self) -> Vec<(SessionOutcome, usize)> {
        self.endings.lock().unwrap().clone()
    }
}

impl RelayObserver for RecordingObserver {
    fn malformed_line(&self, _session_id: &str, _line: &[u8], _error: &genrelay_core::Error) {
        self.malformed.fetch_add(1, Ordering::SeqCst);
    }

    fn upstream_failed(&self, _session_id: &str, _error: &UpstreamError) {
        self.upstream_errors.fetch_add(1, Ordering::SeqCst);
    }

    fn partial_line_discarded(&self, _session_id: &str, bytes: usize) {
        self.partial_bytes.fetch_add(bytes, Ordering::SeqCst);
    }

    fn session_ended(&self, _session_id: &str, outcome: SessionOutcome, chunks: usize) {
        self.endings.lock().unwrap().push((outcome, chunks));
    }
}

pub fn unpaced() -> RelayOptions {
    RelayOptions {
        pacing: PacingConfig::none(),
        max_line_bytes: 1024,
    }
}

/// Relay over `upstream` with no pacing and a recording observer.
pub fn relay_for(upstream: ScriptedUpstream) -> (StreamRelay, Arc<Probe>, Arc<RecordingObserver>) {
    let probe = Arc::clone(&upstream.probe);
    let observer = Arc::new(RecordingObserver::default());
    let relay = StreamRelay::new(Arc::new(upstream), unpaced())
        .with_observer(Arc::clone(&observer) as Arc<dyn RelayObserver>);
    (relay, probe, observer)
}

pub fn request() -> GenerateRequest {
    GenerateRequest::new("llama3.2", "What is the capital of France?")
}

/// Run a whole session and collect its events.
pub async fn collect(relay: &StreamRelay) -> Vec<OutboundEvent> {
    relay.relay(request()).collect().await
}

/// Payloads of `message` events, minus the fixed start/closing banners.
pub fn fragments(events: &[OutboundEvent]) -> Vec<String> {
    let messages: Vec<&OutboundEvent> = events
        .iter()
        .filter(|e| e.kind == EventKind::Message)
        .collect();
    assert!(messages.len() >= 2, "banners missing: {events:?}");
    messages[1..messages.len() - 1]
        .iter()
        .map(|e| e.payload.clone())
        .collect()
}

/// The sequence ends with exactly one `close` and nothing after it.
pub fn assert_single_trailing_close(events: &[OutboundEvent]) {
    let closes = events.iter().filter(|e| e.is_terminal()).count();
    assert_eq!(closes, 1, "expected one close event: {events:?}");
    assert!(
        events.last().is_some_and(OutboundEvent::is_terminal),
        "close must be last: {events:?}"
    );
}
