//! Data-layer access for raffles, prizes, and leads.
//!
//! The [`RaffleStore`] trait is the engine's only view of persistence. Two
//! implementations are provided:
//! - [`SqliteRaffleStore`]: the production backend (`SQLite`, WAL mode)
//! - [`MemoryRaffleStore`]: an in-memory backend for tests
//!
//! The single correctness-critical operation is
//! [`RaffleStore::update_prize_winner`]: a conditional write that succeeds
//! only while the prize's winner is unset. Both backends implement it as
//! one atomic compare-and-set; it is the sole guard against a double-draw
//! race between processes.

mod memory;
mod sqlite;

use chrono::{DateTime, Utc};
use thiserror::Error;

pub use self::memory::MemoryRaffleStore;
pub use self::sqlite::SqliteRaffleStore;
use crate::domain::{Lead, Prize, Raffle};

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StoreError {
    /// No raffle exists with the given id.
    #[error("raffle not found: {raffle_id}")]
    RaffleNotFound {
        /// The raffle id that was not found.
        raffle_id: String,
    },

    /// No prize exists with the given id.
    #[error("prize not found: {prize_id}")]
    PrizeNotFound {
        /// The prize id that was not found.
        prize_id: String,
    },

    /// The conditional winner write found a winner already committed.
    #[error("prize {prize_id} already has a winner")]
    PrizeAlreadyDrawn {
        /// The prize id that was already drawn.
        prize_id: String,
    },

    /// Database error from `SQLite`.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// A stored timestamp failed to parse.
    #[error("invalid stored timestamp {value:?} on {column}")]
    InvalidTimestamp {
        /// The column holding the bad value.
        column: &'static str,
        /// The raw stored text.
        value: String,
    },
}

/// The engine's interface to the data layer.
///
/// Implementations must be safe to share across threads; the sequencer
/// holds the store behind an `Arc` and different raffles may be drawn
/// concurrently.
pub trait RaffleStore: Send + Sync {
    /// Loads a raffle by id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::RaffleNotFound`] if no such raffle exists.
    fn get_raffle(&self, raffle_id: &str) -> Result<Raffle, StoreError>;

    /// Lists a raffle's prizes ascending by draw order.
    ///
    /// Returns an empty list for a raffle with no prizes; the caller
    /// decides whether that is an error.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::RaffleNotFound`] if no such raffle exists.
    fn list_prizes_ordered(&self, raffle_id: &str) -> Result<Vec<Prize>, StoreError>;

    /// Lists the consenting leads of a company.
    ///
    /// The eligibility filter re-checks consent and company scoping, so an
    /// implementation returning a broader set is tolerated but wasteful.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the query fails.
    fn list_eligible_leads(&self, company_id: &str) -> Result<Vec<Lead>, StoreError>;

    /// Conditionally commits a prize's winner.
    ///
    /// The write succeeds only while the prize's `winner_id` is unset and
    /// must be a single atomic operation.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::PrizeAlreadyDrawn`] if a winner is already
    /// committed, or [`StoreError::PrizeNotFound`] if the prize does not
    /// exist.
    fn update_prize_winner(
        &self,
        prize_id: &str,
        winner_id: &str,
        drawn_at: DateTime<Utc>,
    ) -> Result<(), StoreError>;

    /// Clears `winner_id` and `drawn_at` on every prize of a raffle.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::RaffleNotFound`] if no such raffle exists.
    fn clear_prize_winners(&self, raffle_id: &str) -> Result<(), StoreError>;
}

#[cfg(test)]
pub(crate) mod test_fixtures {
    use chrono::{TimeZone, Utc};

    use crate::domain::{Lead, Prize, Raffle};

    pub(crate) fn raffle(id: &str, company_id: &str, allow_multiple_wins: bool) -> Raffle {
        Raffle {
            id: id.to_string(),
            company_id: company_id.to_string(),
            title: format!("Raffle {id}"),
            description: String::new(),
            start_date: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
            end_date: Utc.with_ymd_and_hms(2025, 12, 31, 23, 59, 59).unwrap(),
            is_active: true,
            allow_multiple_wins,
            max_participants: None,
            social_sharing_enabled: false,
        }
    }

    pub(crate) fn lead(id: &str, company_id: &str, consent: bool) -> Lead {
        Lead {
            id: id.to_string(),
            company_id: company_id.to_string(),
            name: id.to_string(),
            email: Some(format!("{id}@example.com")),
            phone: None,
            lgpd_consent: consent,
        }
    }

    pub(crate) fn prize(id: &str, raffle_id: &str, order: u32) -> Prize {
        Prize {
            id: id.to_string(),
            raffle_id: raffle_id.to_string(),
            name: format!("Prize {order}"),
            description: String::new(),
            order,
            winner_id: None,
            drawn_at: None,
        }
    }
}
