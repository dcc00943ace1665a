//! Draw events.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{Lead, Prize, WinnerSnapshot};

/// One committed prize result, emitted as the ceremony advances.
///
/// Events are transient: they are not persisted, and a replayed ceremony
/// after a reset produces fresh events with new ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrawEvent {
    /// Unique id of this emission.
    pub event_id: Uuid,

    /// The prize that was drawn.
    pub prize_id: String,

    /// The prize's 1-based draw position.
    pub prize_order: u32,

    /// The winning lead's id.
    pub winner_id: String,

    /// The winner as they looked at selection time.
    pub winner: WinnerSnapshot,

    /// When the winner was committed.
    pub timestamp: DateTime<Utc>,
}

impl DrawEvent {
    /// Builds the event for a committed prize.
    #[must_use]
    pub fn new(prize: &Prize, winner: &Lead, timestamp: DateTime<Utc>) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            prize_id: prize.id.clone(),
            prize_order: prize.order,
            winner_id: winner.id.clone(),
            winner: WinnerSnapshot::from(winner),
            timestamp,
        }
    }
}
