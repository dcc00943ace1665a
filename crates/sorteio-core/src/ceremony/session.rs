//! The caller-facing draw session.

use std::collections::HashSet;

use chrono::Utc;
use tracing::{info, warn};

use super::error::DrawError;
use super::event::DrawEvent;
use super::registry::CeremonyGuard;
use crate::domain::{Lead, Prize, Raffle};
use crate::eligibility::EligibilityFilter;
use crate::persist::ResultPersister;
use crate::selection::WinnerSelector;

/// A lazy, finite, non-restartable sequence of [`DrawEvent`]s: one per
/// prize, in prize order.
///
/// Each call to [`DrawSession::draw_next`] (or [`Iterator::next`]) performs
/// one full step: derive the step's candidate pool, select a winner
/// uniformly, commit it with the conditional write, and emit the event.
/// Nothing happens between calls, so any presentation pacing is simply how
/// fast the consumer asks for the next event.
///
/// Dropping the session before it finishes cancels the remaining steps:
/// prizes already committed stay final (only an explicit reset clears
/// them), the ceremony lock is released, and the raffle's status records
/// where the ceremony stopped.
pub struct DrawSession {
    raffle: Raffle,
    prizes: Vec<Prize>,
    pool: Vec<Lead>,
    filter: EligibilityFilter,
    selector: Box<dyn WinnerSelector>,
    persister: ResultPersister,
    guard: CeremonyGuard,
    excluded: HashSet<String>,
    winners: Vec<DrawEvent>,
    index: usize,
    finished: bool,
}

impl DrawSession {
    pub(crate) fn new(
        raffle: Raffle,
        prizes: Vec<Prize>,
        pool: Vec<Lead>,
        filter: EligibilityFilter,
        selector: Box<dyn WinnerSelector>,
        persister: ResultPersister,
        guard: CeremonyGuard,
    ) -> Self {
        Self {
            raffle,
            prizes,
            pool,
            filter,
            selector,
            persister,
            guard,
            excluded: HashSet::new(),
            winners: Vec::new(),
            index: 0,
            finished: false,
        }
    }

    /// The raffle this ceremony draws for.
    #[must_use]
    pub fn raffle(&self) -> &Raffle {
        &self.raffle
    }

    /// Total number of prizes in this ceremony.
    #[must_use]
    pub fn prize_count(&self) -> usize {
        self.prizes.len()
    }

    /// 0-based index of the next prize to draw.
    #[must_use]
    pub const fn current_prize_index(&self) -> usize {
        self.index
    }

    /// Events committed so far, in prize order.
    #[must_use]
    pub fn winners(&self) -> &[DrawEvent] {
        &self.winners
    }

    /// Returns `true` once the ceremony has completed or aborted.
    #[must_use]
    pub const fn is_finished(&self) -> bool {
        self.finished
    }

    /// Consumes the session, returning the ordered winner list.
    #[must_use]
    pub fn into_winners(self) -> Vec<DrawEvent> {
        let mut session = self;
        std::mem::take(&mut session.winners)
    }

    /// Performs the next draw step.
    ///
    /// Returns `None` once the ceremony is over. A returned error is
    /// terminal: the ceremony is aborted at the current index and every
    /// earlier prize stays committed.
    pub fn draw_next(&mut self) -> Option<Result<DrawEvent, DrawError>> {
        if self.finished || self.index >= self.prizes.len() {
            return None;
        }
        let prize = self.prizes[self.index].clone();

        let candidates = self.filter.step_candidates(&self.pool, &self.excluded);
        let selected = self
            .selector
            .pick(candidates.len())
            .map(|choice| candidates[choice].clone());
        let winner = match selected {
            Ok(winner) => winner,
            Err(_) => {
                return Some(Err(self.abort_step(DrawError::NoEligibleParticipants {
                    raffle_id: self.raffle.id.clone(),
                    prize_index: self.index,
                })));
            },
        };

        let drawn_at = Utc::now();
        if let Err(err) = self.persister.commit(&prize.id, &winner.id, drawn_at) {
            return Some(Err(self.abort_step(err)));
        }

        let event = DrawEvent::new(&prize, &winner, drawn_at);
        if !self.raffle.allow_multiple_wins {
            self.excluded.insert(winner.id.clone());
        }
        self.winners.push(event.clone());
        self.index += 1;
        info!(
            raffle_id = %self.raffle.id,
            prize_id = %prize.id,
            prize_order = prize.order,
            winner_id = %winner.id,
            "prize drawn"
        );

        if self.index == self.prizes.len() {
            self.finished = true;
            self.guard.complete();
            info!(
                raffle_id = %self.raffle.id,
                winners = self.winners.len(),
                "ceremony completed"
            );
        } else {
            self.guard.advance(self.index);
        }
        Some(Ok(event))
    }

    fn abort_step(&mut self, err: DrawError) -> DrawError {
        warn!(
            raffle_id = %self.raffle.id,
            prize_index = self.index,
            committed = self.winners.len(),
            error = %err,
            "ceremony aborted"
        );
        self.guard.abort(self.index);
        self.finished = true;
        err
    }
}

impl Iterator for DrawSession {
    type Item = Result<DrawEvent, DrawError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.draw_next()
    }
}

impl std::fmt::Debug for DrawSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DrawSession")
            .field("raffle_id", &self.raffle.id)
            .field("prizes", &self.prizes.len())
            .field("pool", &self.pool.len())
            .field("index", &self.index)
            .field("finished", &self.finished)
            .finish_non_exhaustive()
    }
}
