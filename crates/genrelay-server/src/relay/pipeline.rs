//! Relay pipeline: upstream NDJSON body → outbound event stream.
//!
//! Data flow:
//! ```text
//! Upstream::open → byte chunks → LineFramer → parse_line → OutboundEvent
//! ```
//!
//! Every session runs inside the returned stream itself; nothing is
//! spawned. The consumer drives it one event at a time, and dropping the
//! stream drops the pending read or sleep together with the upstream
//! response it owns.

use std::sync::Arc;
use std::time::Duration;

use async_stream::stream;
use futures_util::StreamExt;
use uuid::Uuid;

use genrelay_core::event::{CLOSING_BANNER, START_BANNER};
use genrelay_core::ndjson::{self, LineFramer};
use genrelay_core::OutboundEvent;

use super::observer::{RelayObserver, SessionOutcome, TracingObserver};
use super::types::{failure_event, EventStream, RelayOptions, SessionGuard};
use crate::upstream::{GenerateRequest, Upstream, UpstreamResponse};

/// Relays one upstream streaming response to one client per call.
#[derive(Clone)]
pub struct StreamRelay {
    upstream: Arc<dyn Upstream>,
    observer: Arc<dyn RelayObserver>,
    options: RelayOptions,
}

impl StreamRelay {
    /// Create a relay that logs through [`TracingObserver`].
    pub fn new(upstream: Arc<dyn Upstream>, options: RelayOptions) -> Self {
        Self {
            upstream,
            observer: Arc::new(TracingObserver),
            options,
        }
    }

    /// Replace the observability hook.
    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn RelayObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Start a session for `request`.
    ///
    /// Nothing happens until the returned stream is polled. The stream
    /// always ends with exactly one `close` event, whatever the upstream
    /// does; the only way to stop it earlier is to drop it.
    pub fn relay(&self, request: GenerateRequest) -> EventStream {
        let upstream = Arc::clone(&self.upstream);
        let observer = Arc::clone(&self.observer);
        let options = self.options;

        Box::pin(stream! {
            let session_id = Uuid::new_v4().to_string();
            let mut guard = SessionGuard::new(Arc::clone(&observer), session_id.clone());
            observer.session_started(&session_id, &request.model);

            yield OutboundEvent::message(START_BANNER);

            let outcome = 'session: {
                let UpstreamResponse { status, mut body } = match upstream.open(&request).await {
                    Ok(response) => response,
                    Err(e) => {
                        observer.upstream_failed(&session_id, &e);
                        yield failure_event(&e);
                        break 'session SessionOutcome::UpstreamFailed;
                    }
                };

                pace(options.pacing.before_status()).await;
                observer.upstream_status(&session_id, status);
                yield OutboundEvent::upstream_status(status);
                pace(options.pacing.before_body()).await;

                let mut framer = LineFramer::new(options.max_line_bytes);
                loop {
                    match body.next().await {
                        Some(Ok(bytes)) => framer.push(&bytes),
                        Some(Err(e)) => {
                            observer.upstream_failed(&session_id, &e);
                            yield failure_event(&e);
                            break 'session SessionOutcome::UpstreamFailed;
                        }
                        None => {
                            if framer.pending_bytes() > 0 {
                                observer.partial_line_discarded(&session_id, framer.pending_bytes());
                            }
                            break 'session SessionOutcome::Completed;
                        }
                    }

                    while let Some(next) = framer.next_line() {
                        let line = match next {
                            Ok(line) => line,
                            Err(e) => {
                                observer.malformed_line(&session_id, &[], &e);
                                continue;
                            }
                        };
                        if ndjson::is_blank(&line) {
                            continue;
                        }
                        let chunk = match ndjson::parse_line(&line) {
                            Ok(chunk) => chunk,
                            Err(e) => {
                                observer.malformed_line(&session_id, &line, &e);
                                continue;
                            }
                        };
                        if let Some(message) = &chunk.error {
                            observer.upstream_reported_error(&session_id, message);
                        }

                        pace(options.pacing.between_chunks()).await;
                        observer.chunk_relayed(&session_id, &chunk.response);
                        guard.record_chunk();
                        yield OutboundEvent::message(chunk.response);

                        if chunk.done {
                            observer.generation_finished(&session_id, chunk.stats.as_ref());
                            break 'session SessionOutcome::Completed;
                        }
                    }
                }
            };
            // The upstream response was scoped to the block above and is
            // released before the closing sequence starts.

            yield OutboundEvent::message(CLOSING_BANNER);
            pace(options.pacing.before_close()).await;
            guard.finish(outcome);
            yield OutboundEvent::close();
        })
    }
}

/// Cooperative pacing delay; zero means no suspension at all.
async fn pace(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}
