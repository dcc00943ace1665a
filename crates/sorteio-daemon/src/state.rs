//! Shared service state.

use std::sync::Arc;

use sorteio_core::{DrawSequencer, RaffleStore};

/// State shared across handlers.
///
/// Cheap to clone; both fields are shared references. The store appears
/// twice in the object graph (directly and inside the sequencer) so
/// read-only handlers can query it without widening the sequencer's API.
#[derive(Clone)]
pub struct AppState {
    /// The drawing engine.
    pub sequencer: Arc<DrawSequencer>,
    /// The data layer, for read-only lookups.
    pub store: Arc<dyn RaffleStore>,
}

impl AppState {
    /// Creates service state over a store, wiring up the sequencer.
    #[must_use]
    pub fn new(store: Arc<dyn RaffleStore>) -> Self {
        let sequencer = Arc::new(DrawSequencer::new(Arc::clone(&store)));
        Self { sequencer, store }
    }
}
