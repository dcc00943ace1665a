//! In-memory raffle store for tests.
//!
//! Mirrors the conditional-write semantics of the `SQLite` backend: the
//! winner commit checks and writes under a single mutex acquisition, so the
//! compare-and-set contract holds for concurrent in-process callers.

#![allow(clippy::missing_panics_doc)] // mutex poisoning is unrecoverable

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Utc};

use super::{RaffleStore, StoreError};
use crate::domain::{Lead, Prize, Raffle};

#[derive(Default)]
struct Inner {
    raffles: HashMap<String, Raffle>,
    prizes: HashMap<String, Prize>,
    leads: HashMap<String, Lead>,
}

/// An in-memory [`RaffleStore`].
#[derive(Default)]
pub struct MemoryRaffleStore {
    inner: Mutex<Inner>,
}

impl MemoryRaffleStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a raffle row.
    pub fn insert_raffle(&self, raffle: Raffle) {
        let mut inner = self.inner.lock().unwrap();
        inner.raffles.insert(raffle.id.clone(), raffle);
    }

    /// Inserts a lead row.
    pub fn insert_lead(&self, lead: Lead) {
        let mut inner = self.inner.lock().unwrap();
        inner.leads.insert(lead.id.clone(), lead);
    }

    /// Inserts a prize row.
    pub fn insert_prize(&self, prize: Prize) {
        let mut inner = self.inner.lock().unwrap();
        inner.prizes.insert(prize.id.clone(), prize);
    }

    /// Reads back a prize for assertions.
    #[must_use]
    pub fn prize(&self, prize_id: &str) -> Option<Prize> {
        self.inner.lock().unwrap().prizes.get(prize_id).cloned()
    }
}

impl RaffleStore for MemoryRaffleStore {
    fn get_raffle(&self, raffle_id: &str) -> Result<Raffle, StoreError> {
        let inner = self.inner.lock().unwrap();
        inner
            .raffles
            .get(raffle_id)
            .cloned()
            .ok_or_else(|| StoreError::RaffleNotFound {
                raffle_id: raffle_id.to_string(),
            })
    }

    fn list_prizes_ordered(&self, raffle_id: &str) -> Result<Vec<Prize>, StoreError> {
        let inner = self.inner.lock().unwrap();
        if !inner.raffles.contains_key(raffle_id) {
            return Err(StoreError::RaffleNotFound {
                raffle_id: raffle_id.to_string(),
            });
        }
        let mut prizes: Vec<Prize> = inner
            .prizes
            .values()
            .filter(|prize| prize.raffle_id == raffle_id)
            .cloned()
            .collect();
        prizes.sort_by_key(|prize| prize.order);
        Ok(prizes)
    }

    fn list_eligible_leads(&self, company_id: &str) -> Result<Vec<Lead>, StoreError> {
        let inner = self.inner.lock().unwrap();
        let mut leads: Vec<Lead> = inner
            .leads
            .values()
            .filter(|lead| lead.company_id == company_id && lead.lgpd_consent)
            .cloned()
            .collect();
        leads.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(leads)
    }

    fn update_prize_winner(
        &self,
        prize_id: &str,
        winner_id: &str,
        drawn_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().unwrap();
        let prize = inner
            .prizes
            .get_mut(prize_id)
            .ok_or_else(|| StoreError::PrizeNotFound {
                prize_id: prize_id.to_string(),
            })?;
        if prize.winner_id.is_some() {
            return Err(StoreError::PrizeAlreadyDrawn {
                prize_id: prize_id.to_string(),
            });
        }
        prize.winner_id = Some(winner_id.to_string());
        prize.drawn_at = Some(drawn_at);
        Ok(())
    }

    fn clear_prize_winners(&self, raffle_id: &str) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().unwrap();
        if !inner.raffles.contains_key(raffle_id) {
            return Err(StoreError::RaffleNotFound {
                raffle_id: raffle_id.to_string(),
            });
        }
        for prize in inner.prizes.values_mut() {
            if prize.raffle_id == raffle_id {
                prize.winner_id = None;
                prize.drawn_at = None;
            }
        }
        Ok(())
    }
}
