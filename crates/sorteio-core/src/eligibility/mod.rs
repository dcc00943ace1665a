//! Eligible-pool derivation for a raffle ceremony.
//!
//! The filter owns the two eligibility predicates:
//! - the lead belongs to the raffle's company, and
//! - the lead has given LGPD consent.
//!
//! Both are re-checked here even when the store claims to pre-filter, so a
//! permissive store implementation can never leak a non-consenting lead
//! into a draw.
//!
//! When the raffle disallows multiple wins, the pool for step *k* excludes
//! every winner committed in steps `1..k-1` of the same ceremony. The
//! exclusion set is in-memory and scoped to one ceremony; prior ceremonies
//! never reduce the pool.

use std::collections::HashSet;

use crate::domain::{Lead, Raffle};

/// Derives the eligible participant set for one raffle's ceremony.
#[derive(Debug, Clone)]
pub struct EligibilityFilter {
    company_id: String,
    allow_multiple_wins: bool,
}

impl EligibilityFilter {
    /// Creates a filter bound to `raffle`'s company and drawing policy.
    #[must_use]
    pub fn for_raffle(raffle: &Raffle) -> Self {
        Self {
            company_id: raffle.company_id.clone(),
            allow_multiple_wins: raffle.allow_multiple_wins,
        }
    }

    /// Returns `true` if `lead` may enter this raffle's pool at all.
    #[must_use]
    pub fn is_eligible(&self, lead: &Lead) -> bool {
        lead.lgpd_consent && lead.company_id == self.company_id
    }

    /// Computes the ceremony's initial pool from the full lead list.
    ///
    /// Order is irrelevant to the draw; the input order is preserved so
    /// seeded selections stay reproducible.
    #[must_use]
    pub fn initial_pool(&self, leads: &[Lead]) -> Vec<Lead> {
        leads
            .iter()
            .filter(|lead| self.is_eligible(lead))
            .cloned()
            .collect()
    }

    /// Computes the candidate set for one prize step.
    ///
    /// With multiple wins allowed the full pool is reused unreduced at
    /// every step; otherwise leads in `excluded` (winners of earlier steps
    /// in this ceremony) are removed.
    #[must_use]
    pub fn step_candidates<'a>(
        &self,
        pool: &'a [Lead],
        excluded: &HashSet<String>,
    ) -> Vec<&'a Lead> {
        pool.iter()
            .filter(|lead| self.allow_multiple_wins || !excluded.contains(&lead.id))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn raffle(allow_multiple_wins: bool) -> Raffle {
        Raffle {
            id: "raffle-1".to_string(),
            company_id: "company-1".to_string(),
            title: "Sorteio".to_string(),
            description: String::new(),
            start_date: Utc::now(),
            end_date: Utc::now(),
            is_active: true,
            allow_multiple_wins,
            max_participants: None,
            social_sharing_enabled: false,
        }
    }

    fn lead(id: &str, company_id: &str, consent: bool) -> Lead {
        Lead {
            id: id.to_string(),
            company_id: company_id.to_string(),
            name: id.to_string(),
            email: None,
            phone: None,
            lgpd_consent: consent,
        }
    }

    #[test]
    fn test_initial_pool_requires_consent_and_company() {
        let filter = EligibilityFilter::for_raffle(&raffle(false));
        let leads = vec![
            lead("a", "company-1", true),
            lead("b", "company-1", false),
            lead("c", "company-2", true),
        ];
        let pool = filter.initial_pool(&leads);
        assert_eq!(pool.len(), 1);
        assert_eq!(pool[0].id, "a");
    }

    #[test]
    fn test_initial_pool_preserves_input_order() {
        let filter = EligibilityFilter::for_raffle(&raffle(false));
        let leads = vec![
            lead("z", "company-1", true),
            lead("a", "company-1", true),
            lead("m", "company-1", true),
        ];
        let pool = filter.initial_pool(&leads);
        let ids: Vec<&str> = pool.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, ["z", "a", "m"]);
    }

    #[test]
    fn test_step_candidates_excludes_prior_winners() {
        let filter = EligibilityFilter::for_raffle(&raffle(false));
        let pool = vec![
            lead("a", "company-1", true),
            lead("b", "company-1", true),
        ];
        let mut excluded = HashSet::new();
        excluded.insert("a".to_string());
        let candidates = filter.step_candidates(&pool, &excluded);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].id, "b");
    }

    #[test]
    fn test_step_candidates_ignores_exclusions_with_multiple_wins() {
        let filter = EligibilityFilter::for_raffle(&raffle(true));
        let pool = vec![
            lead("a", "company-1", true),
            lead("b", "company-1", true),
        ];
        let mut excluded = HashSet::new();
        excluded.insert("a".to_string());
        excluded.insert("b".to_string());
        let candidates = filter.step_candidates(&pool, &excluded);
        assert_eq!(candidates.len(), 2);
    }

    #[test]
    fn test_step_candidates_can_exhaust_pool() {
        let filter = EligibilityFilter::for_raffle(&raffle(false));
        let pool = vec![lead("a", "company-1", true)];
        let mut excluded = HashSet::new();
        excluded.insert("a".to_string());
        assert!(filter.step_candidates(&pool, &excluded).is_empty());
    }
}
