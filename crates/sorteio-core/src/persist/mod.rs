//! Atomic result persistence.
//!
//! [`ResultPersister`] is the only writer of prize winner data. A commit is
//! one conditional store write (compare-and-set on an unset winner); a
//! reset clears every prize of a raffle and is refused while that raffle's
//! ceremony lock is held.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::ceremony::{CeremonyRegistry, DrawError};
use crate::store::RaffleStore;

/// Commits prize winners and clears them on reset.
#[derive(Clone)]
pub struct ResultPersister {
    store: Arc<dyn RaffleStore>,
    registry: Arc<CeremonyRegistry>,
}

impl ResultPersister {
    /// Creates a persister over `store`, consulting `registry` for the
    /// ceremony lock on reset.
    #[must_use]
    pub fn new(store: Arc<dyn RaffleStore>, registry: Arc<CeremonyRegistry>) -> Self {
        Self { store, registry }
    }

    /// Conditionally commits `winner_id` on `prize_id`.
    ///
    /// # Errors
    ///
    /// Returns [`DrawError::PrizeAlreadyDrawn`] when the prize already has
    /// a winner (the commit lost a race), [`DrawError::PrizeNotFound`] for
    /// an unknown prize, or [`DrawError::Storage`] on data-layer failure.
    pub fn commit(
        &self,
        prize_id: &str,
        winner_id: &str,
        drawn_at: DateTime<Utc>,
    ) -> Result<(), DrawError> {
        self.store
            .update_prize_winner(prize_id, winner_id, drawn_at)?;
        debug!(prize_id = %prize_id, winner_id = %winner_id, "winner committed");
        Ok(())
    }

    /// Clears winner data on every prize of `raffle_id`.
    ///
    /// # Errors
    ///
    /// Returns [`DrawError::CeremonyInProgress`] while a ceremony is
    /// running for the raffle, [`DrawError::RaffleNotFound`] for an
    /// unknown raffle, or [`DrawError::Storage`] on data-layer failure.
    pub fn reset_raffle(&self, raffle_id: &str) -> Result<(), DrawError> {
        if self.registry.is_running(raffle_id) {
            return Err(DrawError::CeremonyInProgress {
                raffle_id: raffle_id.to_string(),
            });
        }
        self.store.clear_prize_winners(raffle_id)?;
        debug!(raffle_id = %raffle_id, "prize winners cleared");
        Ok(())
    }
}
