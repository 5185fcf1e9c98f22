//! Server-Sent Events framing over the synchronous workflow.
//!
//! The orchestrator is synchronous and pushes events through a sink
//! closure; here that sink feeds a bounded channel drained by an SSE
//! stream. Bounded on purpose: a stalled client applies backpressure to
//! the workflow instead of buffering a whole build in memory.

use std::convert::Infallible;
use std::time::Duration;

use axum::response::sse::{Event, KeepAlive, Sse};
use futures::stream::Stream;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use builder::core::types::ProgressEvent;
use builder::io::completion::CommandCompletion;
use builder::io::config::BuilderConfig;
use builder::orchestrator::Orchestrator;

const EVENT_BUFFER: usize = 16;

/// Orchestrator over the configured completion command.
pub fn orchestrator_for(config: &BuilderConfig) -> Orchestrator<CommandCompletion> {
    let completion = CommandCompletion::new(
        config.completion.command.clone(),
        config.completion_timeout(),
        config.completion.output_limit_bytes,
    );
    Orchestrator::new(completion, config.clone())
}

/// Run `workflow` on a blocking task and frame its progress events as an
/// SSE response.
///
/// The stream ends when the workflow returns. A disconnected client drops
/// the receiver; the workflow's remaining sends fail silently and it runs
/// to completion with no shared state to corrupt.
pub fn stream_workflow<F>(workflow: F) -> Sse<impl Stream<Item = Result<Event, Infallible>>>
where
    F: FnOnce(mpsc::Sender<ProgressEvent>) + Send + 'static,
{
    let (tx, mut rx) = mpsc::channel::<ProgressEvent>(EVENT_BUFFER);
    let task = tokio::task::spawn_blocking(move || workflow(tx));

    let stream = async_stream::stream! {
        // Send initial connected event
        yield Ok(Event::default().event("connected").data("{}"));

        while let Some(event) = rx.recv().await {
            match serde_json::to_string(&event) {
                Ok(json) => yield Ok(Event::default().event("progress").data(json)),
                Err(err) => warn!(error = %err, "failed to serialize progress event"),
            }
        }
        if let Err(err) = task.await {
            warn!(error = %err, "workflow task failed");
        }
        debug!("workflow stream finished");
    };

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("ping"),
    )
}

/// Sink adapter for the synchronous orchestrator: blocking sends into the
/// bounded channel, with dropped-receiver errors ignored.
pub fn blocking_sink(tx: &mpsc::Sender<ProgressEvent>) -> impl FnMut(ProgressEvent) + '_ {
    move |event| {
        let _ = tx.blocking_send(event);
    }
}
