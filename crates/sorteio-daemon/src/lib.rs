//! # sorteio-daemon
//!
//! HTTP service exposing the raffle drawing engine:
//!
//! - `POST /raffles/{id}/draw`: runs a ceremony, streaming one SSE
//!   `winner` event per prize followed by a terminal `completed` or
//!   `aborted` event
//! - `POST /raffles/{id}/reset`: returns all prizes to the undrawn state
//! - `GET /raffles/{id}/ceremony`: the raffle's ceremony status
//! - `GET /healthz`: liveness
//!
//! The engine itself injects no delays; the stream emits events as fast as
//! steps commit, and any presentation pacing happens in the consumer.

pub mod error;
pub mod handlers;
pub mod state;

pub use handlers::router;
pub use state::AppState;
