use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::Stream;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt as _;

use crate::notify::ServerEvent;
use crate::AppState;

/// Live change feed.
///
/// Route: GET /api/events. The first event is a `pdfs-list` snapshot; after
/// that every published change is forwarded as it happens, until the client
/// goes away or the server shuts down.
pub async fn event_stream(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    // Subscribe before taking the snapshot so nothing falls in between.
    let rx = state.bus.subscribe();

    let snapshot = match state.pdfs.list(None).await {
        Ok(assets) => Some(ServerEvent::PdfsList(assets)),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to list pdfs for new subscriber");
            None
        }
    };

    let live = BroadcastStream::new(rx).filter_map(|result| match result {
        Ok(event) => Some(event),
        Err(BroadcastStreamRecvError::Lagged(missed)) => {
            tracing::warn!(missed, "Event subscriber lagged");
            None
        }
    });

    let stream = tokio_stream::iter(snapshot)
        .chain(live)
        .filter_map(|event| to_sse(&event));
    let stream = futures::StreamExt::take_until(stream, state.shutdown.clone().cancelled_owned());

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keepalive"),
    )
}

fn to_sse(event: &ServerEvent) -> Option<Result<Event, Infallible>> {
    match serde_json::to_string(event) {
        Ok(json) => Some(Ok(Event::default().event(event.event_type()).data(json))),
        Err(e) => {
            tracing::error!(event = event.event_type(), error = %e, "Failed to encode event");
            None
        }
    }
}
