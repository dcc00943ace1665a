//! Domain model for raffles, prizes, and participants.
//!
//! This module defines the persistent data types the drawing engine operates
//! on:
//! - [`Raffle`]: A company-owned raffle with its drawing policy
//! - [`Prize`]: A prize slot drawn in a fixed 1-based order
//! - [`Lead`]: A captured participant, read-only to the engine
//! - [`WinnerSnapshot`]: The display copy of a lead taken at selection time
//!
//! The engine never mutates [`Raffle`] or [`Lead`] rows. [`Prize`] winner
//! fields move from unset to set exactly once per ceremony and are cleared
//! only by an explicit reset.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A company-owned raffle.
///
/// Created and edited before any draw; the engine assumes
/// `allow_multiple_wins` is not edited while a ceremony is in flight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Raffle {
    /// Unique raffle identifier.
    pub id: String,

    /// Owning company. Scopes the eligible participant pool.
    pub company_id: String,

    /// Display title.
    pub title: String,

    /// Display description.
    #[serde(default)]
    pub description: String,

    /// Start of the participation window.
    pub start_date: DateTime<Utc>,

    /// End of the participation window.
    pub end_date: DateTime<Utc>,

    /// Whether the raffle is open for participation.
    ///
    /// Gates registration in the surrounding product, not the draw itself.
    pub is_active: bool,

    /// When `true`, one participant may win any number of prizes in a
    /// single ceremony. When `false`, winners of earlier prizes are
    /// excluded from later steps of the same ceremony.
    pub allow_multiple_wins: bool,

    /// Optional registration cap. Carried as data; not enforced here.
    #[serde(default)]
    pub max_participants: Option<u32>,

    /// Whether winners may share their result. Carried as data.
    #[serde(default)]
    pub social_sharing_enabled: bool,
}

/// A prize slot within a raffle.
///
/// `winner_id` and `drawn_at` are written exactly once each, only by the
/// result persister, and only move from `None` to `Some`. A reset clears
/// both on every prize of the raffle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prize {
    /// Unique prize identifier.
    pub id: String,

    /// The raffle this prize belongs to.
    pub raffle_id: String,

    /// Display name.
    pub name: String,

    /// Display description.
    #[serde(default)]
    pub description: String,

    /// 1-based draw position. Unique and contiguous per raffle.
    pub order: u32,

    /// The winning lead, once drawn.
    #[serde(default)]
    pub winner_id: Option<String>,

    /// When the winner was committed.
    #[serde(default)]
    pub drawn_at: Option<DateTime<Utc>>,
}

impl Prize {
    /// Returns `true` if this prize has a committed winner.
    #[must_use]
    pub const fn is_drawn(&self) -> bool {
        self.winner_id.is_some()
    }
}

/// A captured participant (lead). Read-only to the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lead {
    /// Unique lead identifier.
    pub id: String,

    /// The company that captured this lead.
    pub company_id: String,

    /// Display name.
    pub name: String,

    /// Contact email, if provided.
    #[serde(default)]
    pub email: Option<String>,

    /// Contact phone, if provided.
    #[serde(default)]
    pub phone: Option<String>,

    /// Data-protection consent flag. Gates eligibility for every draw.
    pub lgpd_consent: bool,
}

/// The display copy of a lead captured at the moment of selection.
///
/// Emitted inside draw events so consumers can render the winner without
/// a further lookup, and so the event remains stable if the lead row is
/// later edited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WinnerSnapshot {
    /// The winning lead's identifier.
    pub lead_id: String,

    /// Name at selection time.
    pub name: String,

    /// Email at selection time, if any.
    #[serde(default)]
    pub email: Option<String>,

    /// Phone at selection time, if any.
    #[serde(default)]
    pub phone: Option<String>,
}

impl From<&Lead> for WinnerSnapshot {
    fn from(lead: &Lead) -> Self {
        Self {
            lead_id: lead.id.clone(),
            name: lead.name.clone(),
            email: lead.email.clone(),
            phone: lead.phone.clone(),
        }
    }
}

/// Violation of the prize-order invariant (unique, contiguous from 1).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum PrizeOrderError {
    /// Two prizes share the same order value.
    #[error("duplicate prize order {order}")]
    Duplicate {
        /// The duplicated order value.
        order: u32,
    },

    /// The order sequence has a gap or does not start at 1.
    #[error("expected prize order {expected} at position {position}, found {found}")]
    NonContiguous {
        /// 0-based position in the ordered prize list.
        position: usize,
        /// The order value that position should carry.
        expected: u32,
        /// The order value actually found.
        found: u32,
    },
}

/// Validates that `prizes` (sorted ascending by `order`) carry orders
/// `1..=prizes.len()` with no gaps or duplicates.
///
/// # Errors
///
/// Returns a [`PrizeOrderError`] describing the first violation.
#[allow(clippy::cast_possible_truncation)] // prize counts are far below u32::MAX
pub fn validate_prize_order(prizes: &[Prize]) -> Result<(), PrizeOrderError> {
    let mut previous: Option<u32> = None;
    for (position, prize) in prizes.iter().enumerate() {
        let expected = position as u32 + 1;
        if prize.order != expected {
            if previous == Some(prize.order) {
                return Err(PrizeOrderError::Duplicate { order: prize.order });
            }
            return Err(PrizeOrderError::NonContiguous {
                position,
                expected,
                found: prize.order,
            });
        }
        previous = Some(prize.order);
    }
    Ok(())
}
