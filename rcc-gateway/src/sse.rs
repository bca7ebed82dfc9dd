//! `GET /api/v1/telemetry[?radio=<id>]` — the SSE wire format of spec §6.

use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::Stream;
use serde::Deserialize;
use serde_json::json;
use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::StreamExt;

use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct TelemetryQuery {
    #[serde(default)]
    pub radio: Option<String>,
}

pub async fn telemetry(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TelemetryQuery>,
    headers: HeaderMap,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let last_event_id = headers
        .get("last-event-id")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok());

    let snapshot = match &query.radio {
        Some(id) => match state.manager.get_summary(id).await {
            Ok(s) => json!({"id": s.id, "model": s.model, "status": s.status}),
            Err(_) => json!({}),
        },
        None => {
            let inventory = state.manager.list().await;
            json!({"activeRadioId": inventory.active_radio_id, "count": inventory.radios.len()})
        }
    };

    let subscription = state
        .telemetry
        .subscribe(query.radio, last_event_id, snapshot)
        .await;

    let stream = ReceiverStream::new(subscription.rx).map(|event| {
        let data = serde_json::to_string(&event.payload).unwrap_or_else(|_| "{}".to_string());
        Ok(Event::default()
            .event(event.payload.event_name())
            .id(event.id.to_string())
            .data(data))
    });

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}
