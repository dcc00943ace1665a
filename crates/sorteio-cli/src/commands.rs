//! Command implementations.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::Deserialize;
use sorteio_core::{
    DrawSequencer, Lead, Prize, Raffle, RaffleStore, SorteioConfig, SqliteRaffleStore,
    UniformSelector, WinnerSelector,
};

fn open_store(config: &SorteioConfig) -> Result<Arc<SqliteRaffleStore>> {
    let store = SqliteRaffleStore::open(&config.database.path).with_context(|| {
        format!(
            "failed to open database at {}",
            config.database.path.display()
        )
    })?;
    Ok(Arc::new(store))
}

fn sequencer(store: Arc<SqliteRaffleStore>, seed: Option<u64>) -> DrawSequencer {
    match seed {
        Some(seed) => DrawSequencer::with_selector_factory(
            store as Arc<dyn RaffleStore>,
            Arc::new(move || {
                Box::new(UniformSelector::from_seed(seed)) as Box<dyn WinnerSelector>
            }),
        ),
        None => DrawSequencer::new(store as Arc<dyn RaffleStore>),
    }
}

/// Runs a full ceremony, printing each winner as it is committed.
pub fn draw(config: &SorteioConfig, raffle_id: &str, seed: Option<u64>) -> Result<()> {
    let store = open_store(config)?;
    let raffle = store.get_raffle(raffle_id)?;
    println!("Drawing '{}' ({raffle_id})", raffle.title);

    let sequencer = sequencer(store, seed);
    let mut session = sequencer.start(raffle_id)?;
    let total = session.prize_count();
    while let Some(step) = session.draw_next() {
        let event = step.with_context(|| {
            format!(
                "ceremony aborted after {} of {total} prizes; committed winners are final \
                 (use `sorteio reset {raffle_id}` to discard them)",
                session.winners().len()
            )
        })?;
        println!(
            "  {}º {} -> {} ({})",
            event.prize_order,
            event.winner.name,
            event.winner_id,
            event.timestamp.format("%Y-%m-%d %H:%M:%S UTC")
        );
    }
    println!("Completed: {total} prize(s) drawn.");
    Ok(())
}

/// Clears every winner of a raffle.
pub fn reset(config: &SorteioConfig, raffle_id: &str) -> Result<()> {
    let store = open_store(config)?;
    let sequencer = sequencer(store, None);
    sequencer.reset(raffle_id)?;
    println!("Raffle {raffle_id} reset; all prizes undrawn.");
    Ok(())
}

/// Prints a raffle's prizes with their committed winners.
pub fn status(config: &SorteioConfig, raffle_id: &str) -> Result<()> {
    let store = open_store(config)?;
    let raffle = store.get_raffle(raffle_id)?;
    let prizes = store.list_prizes_ordered(raffle_id)?;

    println!("{} ({raffle_id})", raffle.title);
    println!(
        "  multiple wins: {}",
        if raffle.allow_multiple_wins { "yes" } else { "no" }
    );
    if prizes.is_empty() {
        println!("  no prizes configured");
        return Ok(());
    }
    for prize in &prizes {
        match (&prize.winner_id, &prize.drawn_at) {
            (Some(winner_id), Some(drawn_at)) => println!(
                "  {}º {} -> {winner_id} at {}",
                prize.order,
                prize.name,
                drawn_at.format("%Y-%m-%d %H:%M:%S UTC")
            ),
            _ => println!("  {}º {} -> (undrawn)", prize.order, prize.name),
        }
    }
    Ok(())
}

/// A JSON fixture: rows to insert, in dependency order.
#[derive(Debug, Deserialize)]
pub struct Fixture {
    /// Raffle rows.
    #[serde(default)]
    pub raffles: Vec<Raffle>,

    /// Lead rows.
    #[serde(default)]
    pub leads: Vec<Lead>,

    /// Prize rows.
    #[serde(default)]
    pub prizes: Vec<Prize>,
}

/// Loads a JSON fixture into the store.
pub fn load(config: &SorteioConfig, file: &Path) -> Result<()> {
    let content = std::fs::read_to_string(file)
        .with_context(|| format!("failed to read fixture {}", file.display()))?;
    let fixture: Fixture = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse fixture {}", file.display()))?;

    let store = open_store(config)?;
    // Leads before prizes: prize rows may reference a winner.
    for raffle in &fixture.raffles {
        store
            .insert_raffle(raffle)
            .with_context(|| format!("failed to insert raffle {}", raffle.id))?;
    }
    for lead in &fixture.leads {
        store
            .insert_lead(lead)
            .with_context(|| format!("failed to insert lead {}", lead.id))?;
    }
    for prize in &fixture.prizes {
        store
            .insert_prize(prize)
            .with_context(|| format!("failed to insert prize {}", prize.id))?;
    }
    println!(
        "Loaded {} raffle(s), {} lead(s), {} prize(s) from {}.",
        fixture.raffles.len(),
        fixture.leads.len(),
        fixture.prizes.len(),
        file.display()
    );
    Ok(())
}
