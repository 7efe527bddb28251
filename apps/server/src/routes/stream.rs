use std::convert::Infallible;

use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, State};
use axum::http::HeaderMap;
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::Stream;
use tokio::sync::mpsc;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tracing::{debug, warn};

use super::execute::{parse_request, request_id};
use crate::AppState;
use crate::error::ApiError;

/// Runs one orchestration, streaming its progress as Server-Sent Events.
///
/// Validation happens before the stream opens so a bad request gets a plain
/// 400. Closing the connection cancels the outstanding agents.
pub async fn execute_stream(
    State(state): State<AppState>,
    headers: HeaderMap,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, ApiError> {
    let request = parse_request(multipart?, request_id(&headers)).await?;
    state.orchestrator.validate(&request)?;

    let (tx, rx) = mpsc::unbounded_channel();
    let orchestrator = state.orchestrator.clone();

    tokio::spawn(async move {
        tokio::select! {
            result = orchestrator.execute_with_events(request, &tx) => {
                if let Err(error) = result {
                    warn!(error = %error, "Streamed orchestration failed");
                }
            }
            () = tx.closed() => {
                debug!("Stream client disconnected, cancelling orchestration");
            }
        }
    });

    let stream = UnboundedReceiverStream::new(rx).map(|progress| {
        let data = serde_json::to_string(&progress).unwrap_or_else(|e| {
            serde_json::json!({ "type": "error", "error": e.to_string() }).to_string()
        });
        Ok(Event::default().event(progress.event.name()).data(data))
    });

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}
