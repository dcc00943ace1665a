//! The raffle drawing ceremony.
//!
//! This module owns the ceremony lifecycle:
//! - [`DrawSequencer`]: orchestrates a ceremony per raffle
//! - [`DrawSession`]: the caller-facing lazy event stream
//! - [`DrawEvent`]: one committed prize result
//! - [`CeremonyRegistry`] / [`CeremonyStatus`]: per-raffle state and the
//!   advisory ceremony lock
//! - [`DrawError`] / [`ErrorClass`]: the failure taxonomy
//!
//! A ceremony is one run from `start` through `Completed` or `Aborted`:
//!
//! ```text
//! Idle -> Running(0) -> Running(1) -> ... -> Completed
//!              |             |
//!              +-------------+--> Aborted(index reached)
//! ```
//!
//! Steps for one raffle never execute concurrently; different raffles are
//! fully independent. Aborts and cancellation never revert a committed
//! prize; only an explicit reset does.

mod error;
mod event;
mod registry;
mod sequencer;
mod session;

pub use self::error::{DrawError, ErrorClass};
pub use self::event::DrawEvent;
pub use self::registry::{CeremonyRegistry, CeremonyStatus};
pub use self::sequencer::{DrawSequencer, SelectorFactory};
pub use self::session::DrawSession;
