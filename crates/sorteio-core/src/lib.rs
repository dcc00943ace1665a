//! # sorteio-core
//!
//! The raffle drawing engine: given a raffle's ordered prizes and its pool
//! of consenting participants, perform a sequential, constrained, uniform
//! random allocation of winners, persist each allocation atomically, and
//! support replay after an explicit reset.
//!
//! ## Components
//!
//! - [`EligibilityFilter`]: derives the eligible pool (company scope +
//!   LGPD consent), shrinking it per step when multiple wins are off
//! - [`WinnerSelector`] / [`UniformSelector`]: one uniform pick per prize
//! - [`ResultPersister`]: the only writer of winner data; one conditional
//!   compare-and-set per prize, plus reset
//! - [`DrawSequencer`]: orchestrates the ceremony and owns its state
//! - [`DrawSession`]: the caller-facing lazy stream of [`DrawEvent`]s
//!
//! The engine has no timers and injects no delays: consumers pace a
//! ceremony by how fast they pull events from the session. Presentation
//! concerns (animation, sharing) live entirely outside this crate.
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use chrono::Utc;
//! use sorteio_core::{
//!     DrawSequencer, Lead, MemoryRaffleStore, Prize, Raffle, RaffleStore,
//! };
//!
//! let store = Arc::new(MemoryRaffleStore::new());
//! store.insert_raffle(Raffle {
//!     id: "raffle-1".into(),
//!     company_id: "company-1".into(),
//!     title: "Sorteio de Brindes".into(),
//!     description: String::new(),
//!     start_date: Utc::now(),
//!     end_date: Utc::now(),
//!     is_active: true,
//!     allow_multiple_wins: false,
//!     max_participants: None,
//!     social_sharing_enabled: false,
//! });
//! store.insert_lead(Lead {
//!     id: "lead-1".into(),
//!     company_id: "company-1".into(),
//!     name: "Ana".into(),
//!     email: None,
//!     phone: None,
//!     lgpd_consent: true,
//! });
//! store.insert_prize(Prize {
//!     id: "prize-1".into(),
//!     raffle_id: "raffle-1".into(),
//!     name: "Camiseta".into(),
//!     description: String::new(),
//!     order: 1,
//!     winner_id: None,
//!     drawn_at: None,
//! });
//!
//! let sequencer = DrawSequencer::new(store.clone() as Arc<dyn RaffleStore>);
//! let winners = sequencer.run("raffle-1").unwrap();
//! assert_eq!(winners.len(), 1);
//! assert_eq!(winners[0].winner_id, "lead-1");
//! ```

pub mod ceremony;
pub mod config;
pub mod domain;
pub mod eligibility;
pub mod persist;
pub mod selection;
pub mod store;

pub use ceremony::{
    CeremonyRegistry, CeremonyStatus, DrawError, DrawEvent, DrawSequencer, DrawSession,
    ErrorClass, SelectorFactory,
};
pub use config::{ConfigError, SorteioConfig};
pub use domain::{validate_prize_order, Lead, Prize, PrizeOrderError, Raffle, WinnerSnapshot};
pub use eligibility::EligibilityFilter;
pub use persist::ResultPersister;
pub use selection::{SelectionError, UniformSelector, WinnerSelector};
pub use store::{MemoryRaffleStore, RaffleStore, SqliteRaffleStore, StoreError};
