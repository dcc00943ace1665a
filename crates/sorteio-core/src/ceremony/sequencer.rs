//! The draw sequencer.

use std::sync::Arc;

use tracing::info;

use super::error::DrawError;
use super::event::DrawEvent;
use super::registry::{CeremonyRegistry, CeremonyStatus};
use super::session::DrawSession;
use crate::domain::validate_prize_order;
use crate::eligibility::EligibilityFilter;
use crate::persist::ResultPersister;
use crate::selection::{UniformSelector, WinnerSelector};
use crate::store::RaffleStore;

/// Factory producing one selector per ceremony.
pub type SelectorFactory = dyn Fn() -> Box<dyn WinnerSelector> + Send + Sync;

/// Orchestrates raffle ceremonies.
///
/// One sequencer is shared per process (`Arc`); different raffles may be
/// drawn concurrently through it, while the per-raffle ceremony lock keeps
/// each raffle's steps strictly sequential.
pub struct DrawSequencer {
    store: Arc<dyn RaffleStore>,
    registry: Arc<CeremonyRegistry>,
    persister: ResultPersister,
    selector_factory: Arc<SelectorFactory>,
}

impl DrawSequencer {
    /// Creates a sequencer with the default entropy-seeded selector.
    #[must_use]
    pub fn new(store: Arc<dyn RaffleStore>) -> Self {
        Self::with_selector_factory(
            store,
            Arc::new(|| Box::new(UniformSelector::from_entropy()) as Box<dyn WinnerSelector>),
        )
    }

    /// Creates a sequencer with a custom selector factory.
    ///
    /// Used by tests (seeded selectors) and by the CLI's `--seed` flag.
    #[must_use]
    pub fn with_selector_factory(
        store: Arc<dyn RaffleStore>,
        selector_factory: Arc<SelectorFactory>,
    ) -> Self {
        let registry = Arc::new(CeremonyRegistry::new());
        let persister = ResultPersister::new(Arc::clone(&store), Arc::clone(&registry));
        Self {
            store,
            registry,
            persister,
            selector_factory,
        }
    }

    /// Starts a ceremony for `raffle_id` and returns its session.
    ///
    /// Acquires the per-raffle ceremony lock, loads the raffle, its
    /// ordered prizes, and the initial eligible pool, and transitions the
    /// raffle to `Running`. A validation failure releases the lock and
    /// leaves all state untouched.
    ///
    /// # Errors
    ///
    /// - [`DrawError::CeremonyInProgress`] if a ceremony is already running
    /// - [`DrawError::RaffleNotFound`] for an unknown raffle
    /// - [`DrawError::NoPrizesConfigured`] when the raffle has no prizes
    /// - [`DrawError::InvalidPrizeOrder`] on a broken order sequence
    /// - [`DrawError::NoEligibleParticipants`] when the pool is empty
    /// - [`DrawError::Storage`] on data-layer failure
    pub fn start(&self, raffle_id: &str) -> Result<DrawSession, DrawError> {
        let guard = self.registry.begin(raffle_id)?;

        let raffle = self.store.get_raffle(raffle_id)?;
        let prizes = self.store.list_prizes_ordered(raffle_id)?;
        if prizes.is_empty() {
            return Err(DrawError::NoPrizesConfigured {
                raffle_id: raffle_id.to_string(),
            });
        }
        validate_prize_order(&prizes).map_err(|source| DrawError::InvalidPrizeOrder {
            raffle_id: raffle_id.to_string(),
            source,
        })?;

        let leads = self.store.list_eligible_leads(&raffle.company_id)?;
        let filter = EligibilityFilter::for_raffle(&raffle);
        let pool = filter.initial_pool(&leads);
        if pool.is_empty() {
            return Err(DrawError::NoEligibleParticipants {
                raffle_id: raffle_id.to_string(),
                prize_index: 0,
            });
        }

        info!(
            raffle_id = %raffle_id,
            prizes = prizes.len(),
            pool = pool.len(),
            allow_multiple_wins = raffle.allow_multiple_wins,
            "ceremony started"
        );
        Ok(DrawSession::new(
            raffle,
            prizes,
            pool,
            filter,
            (self.selector_factory)(),
            self.persister.clone(),
            guard,
        ))
    }

    /// Drives a full ceremony to its end, returning the ordered winner
    /// list.
    ///
    /// # Errors
    ///
    /// Any [`DrawSequencer::start`] error, or the abort error of the step
    /// the ceremony stopped at (earlier prizes stay committed).
    pub fn run(&self, raffle_id: &str) -> Result<Vec<DrawEvent>, DrawError> {
        let mut session = self.start(raffle_id)?;
        while let Some(step) = session.draw_next() {
            step?;
        }
        Ok(session.into_winners())
    }

    /// Returns all of a raffle's prizes to the undrawn state.
    ///
    /// # Errors
    ///
    /// Returns [`DrawError::CeremonyInProgress`] while a ceremony is
    /// running, or [`DrawError::RaffleNotFound`] for an unknown raffle.
    pub fn reset(&self, raffle_id: &str) -> Result<(), DrawError> {
        self.persister.reset_raffle(raffle_id)?;
        self.registry.clear(raffle_id)?;
        info!(raffle_id = %raffle_id, "raffle reset");
        Ok(())
    }

    /// Returns the raffle's current ceremony status.
    #[must_use]
    pub fn ceremony_state(&self, raffle_id: &str) -> CeremonyStatus {
        self.registry.status(raffle_id)
    }

    /// The persister backing this sequencer.
    #[must_use]
    pub const fn persister(&self) -> &ResultPersister {
        &self.persister
    }

    /// The ceremony registry backing this sequencer.
    #[must_use]
    pub const fn registry(&self) -> &Arc<CeremonyRegistry> {
        &self.registry
    }
}

impl std::fmt::Debug for DrawSequencer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DrawSequencer").finish_non_exhaustive()
    }
}
