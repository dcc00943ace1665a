//! Ceremony error types.

use thiserror::Error;

use crate::domain::PrizeOrderError;
use crate::store::StoreError;

/// Errors that can occur while starting, stepping, or resetting a ceremony.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DrawError {
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

    /// The raffle has no prizes configured.
    #[error("no prizes configured for raffle {raffle_id}")]
    NoPrizesConfigured {
        /// The raffle id.
        raffle_id: String,
    },

    /// The eligible pool was empty at a step that needed a selection.
    ///
    /// `prize_index` is 0 when raised before the first step; mid-ceremony
    /// it is the 0-based index the ceremony stopped at, with every earlier
    /// prize already committed and retained.
    #[error("no eligible participants for raffle {raffle_id} at prize index {prize_index}")]
    NoEligibleParticipants {
        /// The raffle id.
        raffle_id: String,
        /// The 0-based prize index the ceremony stopped at.
        prize_index: usize,
    },

    /// A ceremony is already running for this raffle.
    #[error("ceremony already in progress for raffle {raffle_id}")]
    CeremonyInProgress {
        /// The raffle id.
        raffle_id: String,
    },

    /// The conditional winner write lost a race: the prize already had a
    /// winner when the commit ran.
    #[error("prize {prize_id} already has a winner")]
    PrizeAlreadyDrawn {
        /// The prize id that was already drawn.
        prize_id: String,
    },

    /// The raffle's prize orders are not unique and contiguous from 1.
    #[error("invalid prize order for raffle {raffle_id}: {source}")]
    InvalidPrizeOrder {
        /// The raffle id.
        raffle_id: String,
        /// The specific order violation.
        #[source]
        source: PrizeOrderError,
    },

    /// The data layer failed.
    #[error("storage error: {0}")]
    Storage(#[source] StoreError),
}

impl From<StoreError> for DrawError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::RaffleNotFound { raffle_id } => Self::RaffleNotFound { raffle_id },
            StoreError::PrizeNotFound { prize_id } => Self::PrizeNotFound { prize_id },
            StoreError::PrizeAlreadyDrawn { prize_id } => Self::PrizeAlreadyDrawn { prize_id },
            other => Self::Storage(other),
        }
    }
}

/// Error classification for propagation policy and API mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Configuration problems the caller can fix and retry.
    Validation,
    /// Lost races and held locks; retry or wait.
    Concurrency,
    /// Unknown raffle or prize.
    NotFound,
    /// Data-layer failure.
    Storage,
}

impl std::fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation => write!(f, "validation"),
            Self::Concurrency => write!(f, "concurrency"),
            Self::NotFound => write!(f, "not_found"),
            Self::Storage => write!(f, "storage"),
        }
    }
}

impl DrawError {
    /// Returns the error classification.
    #[must_use]
    pub const fn class(&self) -> ErrorClass {
        match self {
            Self::NoPrizesConfigured { .. }
            | Self::NoEligibleParticipants { .. }
            | Self::InvalidPrizeOrder { .. } => ErrorClass::Validation,
            Self::CeremonyInProgress { .. } | Self::PrizeAlreadyDrawn { .. } => {
                ErrorClass::Concurrency
            },
            Self::RaffleNotFound { .. } | Self::PrizeNotFound { .. } => ErrorClass::NotFound,
            Self::Storage(_) => ErrorClass::Storage,
        }
    }

    /// Returns `true` if the caller can recover by fixing configuration,
    /// retrying, or waiting for the running ceremony to finish.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        !matches!(self, Self::Storage(_))
    }

    /// Returns a stable machine-readable code for API payloads.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::RaffleNotFound { .. } => "RAFFLE_NOT_FOUND",
            Self::PrizeNotFound { .. } => "PRIZE_NOT_FOUND",
            Self::NoPrizesConfigured { .. } => "NO_PRIZES_CONFIGURED",
            Self::NoEligibleParticipants { .. } => "NO_ELIGIBLE_PARTICIPANTS",
            Self::CeremonyInProgress { .. } => "CEREMONY_IN_PROGRESS",
            Self::PrizeAlreadyDrawn { .. } => "PRIZE_ALREADY_DRAWN",
            Self::InvalidPrizeOrder { .. } => "INVALID_PRIZE_ORDER",
            Self::Storage(_) => "STORAGE_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_conversion_lifts_shared_variants() {
        let err = DrawError::from(StoreError::RaffleNotFound {
            raffle_id: "raffle-1".to_string(),
        });
        assert!(matches!(err, DrawError::RaffleNotFound { .. }));

        let err = DrawError::from(StoreError::PrizeAlreadyDrawn {
            prize_id: "prize-1".to_string(),
        });
        assert!(matches!(err, DrawError::PrizeAlreadyDrawn { .. }));
    }

    #[test]
    fn test_classification() {
        let validation = DrawError::NoPrizesConfigured {
            raffle_id: "raffle-1".to_string(),
        };
        assert_eq!(validation.class(), ErrorClass::Validation);
        assert!(validation.is_recoverable());

        let concurrency = DrawError::CeremonyInProgress {
            raffle_id: "raffle-1".to_string(),
        };
        assert_eq!(concurrency.class(), ErrorClass::Concurrency);
        assert!(concurrency.is_recoverable());

        let not_found = DrawError::RaffleNotFound {
            raffle_id: "raffle-1".to_string(),
        };
        assert_eq!(not_found.class(), ErrorClass::NotFound);
    }

    #[test]
    fn test_error_codes_are_stable() {
        let err = DrawError::NoEligibleParticipants {
            raffle_id: "raffle-1".to_string(),
            prize_index: 2,
        };
        assert_eq!(err.code(), "NO_ELIGIBLE_PARTICIPANTS");
        assert!(err.to_string().contains("prize index 2"));
    }
}
