//! HTTP request handlers.

use std::convert::Infallible;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use sorteio_core::{CeremonyStatus, DrawEvent};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::{Stream, StreamExt};
use tracing::{error, info, warn};

use crate::error::ApiError;
use crate::state::AppState;

/// Channel depth for the draw event stream.
///
/// Small on purpose: a slow consumer applies backpressure to the drawing
/// loop instead of letting it race ahead of what the client has seen.
const DRAW_STREAM_BUFFER: usize = 8;

/// One frame of the draw stream.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum DrawStreamEvent {
    /// A prize was committed.
    Winner(DrawEvent),

    /// Every prize was committed; carries the full ordered winner list.
    Completed { winners: Vec<DrawEvent> },

    /// The ceremony stopped early; earlier commits are retained.
    Aborted {
        code: &'static str,
        message: String,
        stopped_at_index: usize,
    },
}

impl DrawStreamEvent {
    const fn kind(&self) -> &'static str {
        match self {
            Self::Winner(_) => "winner",
            Self::Completed { .. } => "completed",
            Self::Aborted { .. } => "aborted",
        }
    }
}

/// Builds the service router.
#[must_use]
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/raffles/{id}/draw", post(draw))
        .route("/raffles/{id}/reset", post(reset))
        .route("/raffles/{id}/ceremony", get(ceremony_state))
        .with_state(state)
}

async fn healthz() -> &'static str {
    "ok"
}

/// `GET /raffles/{id}/ceremony`
async fn ceremony_state(
    State(state): State<AppState>,
    Path(raffle_id): Path<String>,
) -> Result<Json<CeremonyStatus>, ApiError> {
    let store = state.store.clone();
    let lookup_id = raffle_id.clone();
    tokio::task::spawn_blocking(move || store.get_raffle(&lookup_id))
        .await
        .map_err(|err| ApiError::internal(format!("lookup task failed: {err}")))?
        .map_err(sorteio_core::DrawError::from)?;

    Ok(Json(state.sequencer.ceremony_state(&raffle_id)))
}

/// `POST /raffles/{id}/reset`
async fn reset(
    State(state): State<AppState>,
    Path(raffle_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let sequencer = state.sequencer.clone();
    tokio::task::spawn_blocking(move || sequencer.reset(&raffle_id))
        .await
        .map_err(|err| ApiError::internal(format!("reset task failed: {err}")))??;
    Ok(StatusCode::NO_CONTENT)
}

/// `POST /raffles/{id}/draw`
///
/// Starts a ceremony and streams it as server-sent events: one `winner`
/// event per prize, then a terminal `completed` event with the full
/// ordered winner list, or a terminal `aborted` event naming the index
/// reached. Start-time failures are plain JSON error responses.
///
/// Disconnecting cancels the ceremony at the next step boundary; prizes
/// already committed stay final.
async fn draw(
    State(state): State<AppState>,
    Path(raffle_id): Path<String>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, ApiError> {
    let sequencer = state.sequencer.clone();
    let start_id = raffle_id.clone();
    let session = tokio::task::spawn_blocking(move || sequencer.start(&start_id))
        .await
        .map_err(|err| ApiError::internal(format!("draw task failed: {err}")))??;

    let (tx, rx) = mpsc::channel::<DrawStreamEvent>(DRAW_STREAM_BUFFER);
    tokio::task::spawn_blocking(move || {
        let mut session = session;
        while let Some(step) = session.draw_next() {
            let frame = match step {
                Ok(event) => DrawStreamEvent::Winner(event),
                Err(err) => DrawStreamEvent::Aborted {
                    code: err.code(),
                    message: err.to_string(),
                    stopped_at_index: session.current_prize_index(),
                },
            };
            let terminal = matches!(frame, DrawStreamEvent::Aborted { .. });
            if tx.blocking_send(frame).is_err() {
                // Client went away; dropping the session cancels the
                // remaining steps.
                warn!(raffle_id = %raffle_id, "draw stream consumer disconnected");
                return;
            }
            if terminal {
                return;
            }
        }
        let winners = session.into_winners();
        info!(raffle_id = %raffle_id, winners = winners.len(), "draw stream completed");
        let _ = tx.blocking_send(DrawStreamEvent::Completed { winners });
    });

    let stream = ReceiverStream::new(rx).map(|frame| Ok(sse_event(&frame)));
    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}

fn sse_event(frame: &DrawStreamEvent) -> Event {
    match Event::default().event(frame.kind()).json_data(frame) {
        Ok(event) => event,
        Err(err) => {
            error!(error = %err, "failed to serialize draw stream frame");
            Event::default()
                .event("error")
                .data("{\"code\":\"SERIALIZATION\"}")
        },
    }
}
