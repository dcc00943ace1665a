//! Ceremony status tracking and the per-raffle advisory lock.
//!
//! The registry holds one [`CeremonyStatus`] per raffle; a `Running` entry
//! IS the ceremony lock ("at most one running ceremony per raffle"). The
//! lock is advisory and process-local: across processes the conditional
//! winner write in the store is the guard that actually prevents a
//! double-draw (see [`crate::store::RaffleStore::update_prize_winner`]).
//!
//! Acquisition hands out a [`CeremonyGuard`]. The guard finalizes the
//! ceremony into `Completed` or `Aborted`, and on drop without
//! finalization (a cancelled session, or a `start` that failed validation)
//! it restores the raffle's pre-start status when nothing was committed,
//! or records `Aborted` at the index reached otherwise.

// Mutex poisoning indicates a panic in another thread, which is
// unrecoverable.
#![allow(clippy::missing_panics_doc)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

use super::error::DrawError;

/// Lifecycle status of a raffle's most recent ceremony.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum CeremonyStatus {
    /// No ceremony has run since the last reset (or ever).
    Idle,

    /// A ceremony is in flight.
    Running {
        /// 0-based index of the prize about to be drawn.
        current_prize_index: usize,
    },

    /// Every prize was committed.
    Completed,

    /// The ceremony stopped before the last prize; earlier commits are
    /// retained as final.
    Aborted {
        /// 0-based index of the prize the ceremony stopped at.
        stopped_at_index: usize,
    },
}

impl CeremonyStatus {
    /// Returns `true` if a ceremony is in flight.
    #[must_use]
    pub const fn is_running(&self) -> bool {
        matches!(self, Self::Running { .. })
    }

    /// Returns `true` for `Completed` and `Aborted`.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Aborted { .. })
    }

    /// Returns the string representation of this status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "IDLE",
            Self::Running { .. } => "RUNNING",
            Self::Completed => "COMPLETED",
            Self::Aborted { .. } => "ABORTED",
        }
    }
}

/// Per-raffle ceremony status map and advisory lock.
#[derive(Debug, Default)]
pub struct CeremonyRegistry {
    inner: Mutex<HashMap<String, CeremonyStatus>>,
}

impl CeremonyRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the raffle's current ceremony status (`Idle` if never drawn).
    #[must_use]
    pub fn status(&self, raffle_id: &str) -> CeremonyStatus {
        self.inner
            .lock()
            .unwrap()
            .get(raffle_id)
            .copied()
            .unwrap_or(CeremonyStatus::Idle)
    }

    /// Returns `true` if a ceremony is in flight for the raffle.
    #[must_use]
    pub fn is_running(&self, raffle_id: &str) -> bool {
        self.status(raffle_id).is_running()
    }

    /// Acquires the ceremony lock, transitioning the raffle to
    /// `Running { 0 }`.
    ///
    /// The check and the transition happen under one mutex acquisition, so
    /// two concurrent `begin` calls cannot both succeed.
    ///
    /// # Errors
    ///
    /// Returns [`DrawError::CeremonyInProgress`] if a ceremony is already
    /// running.
    pub(crate) fn begin(self: &Arc<Self>, raffle_id: &str) -> Result<CeremonyGuard, DrawError> {
        let mut inner = self.inner.lock().unwrap();
        let prior = inner
            .get(raffle_id)
            .copied()
            .unwrap_or(CeremonyStatus::Idle);
        if prior.is_running() {
            return Err(DrawError::CeremonyInProgress {
                raffle_id: raffle_id.to_string(),
            });
        }
        inner.insert(
            raffle_id.to_string(),
            CeremonyStatus::Running {
                current_prize_index: 0,
            },
        );
        Ok(CeremonyGuard {
            registry: Arc::clone(self),
            raffle_id: raffle_id.to_string(),
            prior,
            committed: 0,
            finalized: false,
        })
    }

    /// Clears the raffle's status back to `Idle` after a reset.
    ///
    /// # Errors
    ///
    /// Returns [`DrawError::CeremonyInProgress`] if a ceremony is running.
    pub(crate) fn clear(&self, raffle_id: &str) -> Result<(), DrawError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.get(raffle_id).is_some_and(CeremonyStatus::is_running) {
            return Err(DrawError::CeremonyInProgress {
                raffle_id: raffle_id.to_string(),
            });
        }
        inner.remove(raffle_id);
        Ok(())
    }

    fn set(&self, raffle_id: &str, status: CeremonyStatus) {
        self.inner
            .lock()
            .unwrap()
            .insert(raffle_id.to_string(), status);
    }

    fn restore(&self, raffle_id: &str, prior: CeremonyStatus) {
        let mut inner = self.inner.lock().unwrap();
        if prior == CeremonyStatus::Idle {
            inner.remove(raffle_id);
        } else {
            inner.insert(raffle_id.to_string(), prior);
        }
    }
}

/// RAII handle for one acquired ceremony lock.
///
/// Held by the draw session for the lifetime of the ceremony.
#[derive(Debug)]
pub(crate) struct CeremonyGuard {
    registry: Arc<CeremonyRegistry>,
    raffle_id: String,
    prior: CeremonyStatus,
    committed: usize,
    finalized: bool,
}

impl CeremonyGuard {
    /// Records that `next_index` prizes are committed and the ceremony is
    /// about to draw prize `next_index`.
    pub(crate) fn advance(&mut self, next_index: usize) {
        self.committed = next_index;
        self.registry.set(
            &self.raffle_id,
            CeremonyStatus::Running {
                current_prize_index: next_index,
            },
        );
    }

    /// Finalizes the ceremony as completed and releases the lock.
    pub(crate) fn complete(&mut self) {
        self.finalized = true;
        self.registry.set(&self.raffle_id, CeremonyStatus::Completed);
    }

    /// Finalizes the ceremony as aborted at `stopped_at_index` and releases
    /// the lock.
    pub(crate) fn abort(&mut self, stopped_at_index: usize) {
        self.finalized = true;
        self.registry.set(
            &self.raffle_id,
            CeremonyStatus::Aborted { stopped_at_index },
        );
    }
}

impl Drop for CeremonyGuard {
    fn drop(&mut self) {
        if self.finalized {
            return;
        }
        // Cancelled session or failed start. With zero commits nothing
        // happened, so the pre-start status comes back; with partial
        // commits the ceremony is aborted at the index reached.
        if self.committed == 0 {
            self.registry.restore(&self.raffle_id, self.prior);
        } else {
            self.registry.set(
                &self.raffle_id,
                CeremonyStatus::Aborted {
                    stopped_at_index: self.committed,
                },
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_defaults_to_idle() {
        let registry = CeremonyRegistry::new();
        assert_eq!(registry.status("raffle-1"), CeremonyStatus::Idle);
        assert!(!registry.is_running("raffle-1"));
    }

    #[test]
    fn test_begin_locks_out_second_ceremony() {
        let registry = Arc::new(CeremonyRegistry::new());
        let _guard = registry.begin("raffle-1").unwrap();
        assert!(registry.is_running("raffle-1"));

        let err = registry.begin("raffle-1").unwrap_err();
        assert!(matches!(err, DrawError::CeremonyInProgress { .. }));
    }

    #[test]
    fn test_raffles_lock_independently() {
        let registry = Arc::new(CeremonyRegistry::new());
        let _a = registry.begin("raffle-1").unwrap();
        let b = registry.begin("raffle-2");
        assert!(b.is_ok());
    }

    #[test]
    fn test_dropped_guard_without_commits_restores_prior() {
        let registry = Arc::new(CeremonyRegistry::new());
        {
            let _guard = registry.begin("raffle-1").unwrap();
        }
        assert_eq!(registry.status("raffle-1"), CeremonyStatus::Idle);

        // A completed raffle keeps its status through a failed restart.
        {
            let mut guard = registry.begin("raffle-1").unwrap();
            guard.complete();
        }
        {
            let _guard = registry.begin("raffle-1").unwrap();
        }
        assert_eq!(registry.status("raffle-1"), CeremonyStatus::Completed);
    }

    #[test]
    fn test_dropped_guard_with_commits_aborts_at_index() {
        let registry = Arc::new(CeremonyRegistry::new());
        {
            let mut guard = registry.begin("raffle-1").unwrap();
            guard.advance(2);
        }
        assert_eq!(
            registry.status("raffle-1"),
            CeremonyStatus::Aborted { stopped_at_index: 2 }
        );
    }

    #[test]
    fn test_complete_releases_lock() {
        let registry = Arc::new(CeremonyRegistry::new());
        let mut guard = registry.begin("raffle-1").unwrap();
        guard.advance(1);
        guard.complete();
        drop(guard);

        assert_eq!(registry.status("raffle-1"), CeremonyStatus::Completed);
        assert!(registry.begin("raffle-1").is_ok());
    }

    #[test]
    fn test_clear_refuses_running_ceremony() {
        let registry = Arc::new(CeremonyRegistry::new());
        let guard = registry.begin("raffle-1").unwrap();
        let err = registry.clear("raffle-1").unwrap_err();
        assert!(matches!(err, DrawError::CeremonyInProgress { .. }));
        drop(guard);
        assert!(registry.clear("raffle-1").is_ok());
        assert_eq!(registry.status("raffle-1"), CeremonyStatus::Idle);
    }

    #[test]
    fn test_status_serde_roundtrip() {
        for status in [
            CeremonyStatus::Idle,
            CeremonyStatus::Running {
                current_prize_index: 3,
            },
            CeremonyStatus::Completed,
            CeremonyStatus::Aborted { stopped_at_index: 1 },
        ] {
            let json = serde_json::to_string(&status).unwrap();
            let restored: CeremonyStatus = serde_json::from_str(&json).unwrap();
            assert_eq!(status, restored);
        }
    }
}
