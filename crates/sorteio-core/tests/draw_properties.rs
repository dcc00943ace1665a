//! Property tests for the drawing invariants.
//!
//! For arbitrary pool sizes, prize counts, drawing policies, and selector
//! seeds, a ceremony either completes with one event per prize or aborts
//! exactly where the pool ran dry, and a non-consenting lead never wins.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{TimeZone, Utc};
use proptest::prelude::*;
use sorteio_core::{
    DrawError, DrawSequencer, Lead, MemoryRaffleStore, Prize, Raffle, RaffleStore,
    UniformSelector, WinnerSelector,
};

fn seeded_store(
    consenting: usize,
    non_consenting: usize,
    prizes: u32,
    allow_multiple_wins: bool,
) -> Arc<MemoryRaffleStore> {
    let store = Arc::new(MemoryRaffleStore::new());
    store.insert_raffle(Raffle {
        id: "raffle-1".to_string(),
        company_id: "company-1".to_string(),
        title: "Raffle".to_string(),
        description: String::new(),
        start_date: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
        end_date: Utc.with_ymd_and_hms(2025, 12, 31, 0, 0, 0).unwrap(),
        is_active: true,
        allow_multiple_wins,
        max_participants: None,
        social_sharing_enabled: false,
    });
    for i in 0..consenting {
        store.insert_lead(Lead {
            id: format!("yes-{i}"),
            company_id: "company-1".to_string(),
            name: format!("yes-{i}"),
            email: None,
            phone: None,
            lgpd_consent: true,
        });
    }
    for i in 0..non_consenting {
        store.insert_lead(Lead {
            id: format!("no-{i}"),
            company_id: "company-1".to_string(),
            name: format!("no-{i}"),
            email: None,
            phone: None,
            lgpd_consent: false,
        });
    }
    for order in 1..=prizes {
        store.insert_prize(Prize {
            id: format!("prize-{order}"),
            raffle_id: "raffle-1".to_string(),
            name: format!("Prize {order}"),
            description: String::new(),
            order,
            winner_id: None,
            drawn_at: None,
        });
    }
    store
}

proptest! {
    #[test]
    fn ceremony_outcome_matches_pool_arithmetic(
        consenting in 1usize..10,
        non_consenting in 0usize..6,
        prizes in 1u32..8,
        allow_multiple_wins in any::<bool>(),
        seed in any::<u64>(),
    ) {
        let store = seeded_store(consenting, non_consenting, prizes, allow_multiple_wins);
        let sequencer = DrawSequencer::with_selector_factory(
            Arc::clone(&store) as Arc<dyn RaffleStore>,
            Arc::new(move || {
                Box::new(UniformSelector::from_seed(seed)) as Box<dyn WinnerSelector>
            }),
        );

        let result = sequencer.run("raffle-1");
        let enough = allow_multiple_wins || consenting >= prizes as usize;

        if enough {
            let winners = result.unwrap();
            prop_assert_eq!(winners.len(), prizes as usize);

            // Winners are consenting pool members; distinct unless
            // multiple wins are allowed.
            for event in &winners {
                prop_assert!(event.winner_id.starts_with("yes-"));
            }
            if !allow_multiple_wins {
                let distinct: HashSet<&str> =
                    winners.iter().map(|e| e.winner_id.as_str()).collect();
                prop_assert_eq!(distinct.len(), winners.len());
            }
        } else {
            // The pool runs dry exactly after `consenting` commits.
            match result {
                Err(DrawError::NoEligibleParticipants { prize_index, .. }) => {
                    prop_assert_eq!(prize_index, consenting);
                },
                other => prop_assert!(false, "expected pool exhaustion, got {other:?}"),
            }
            for order in 1..=prizes {
                let committed = store
                    .prize(&format!("prize-{order}"))
                    .unwrap()
                    .is_drawn();
                prop_assert_eq!(committed, (order as usize) <= consenting);
            }
        }
    }
}
