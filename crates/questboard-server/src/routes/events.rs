use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use std::convert::Infallible;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt as _;

use crate::state::AppState;

/// GET /api/events: SSE stream that emits `update` after every mutation.
/// The event data names what changed. Lagged receivers skip missed events.
pub async fn sse_events(State(app): State<AppState>) -> impl axum::response::IntoResponse {
    let rx = app.event_tx.subscribe();
    let stream = BroadcastStream::new(rx).filter_map(|msg| {
        msg.ok().map(|kind| {
            Ok::<Event, Infallible>(Event::default().event("update").data(kind.as_str()))
        })
    });
    Sse::new(stream).keep_alive(KeepAlive::default())
}
