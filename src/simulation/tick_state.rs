//! Working state that only lives for the duration of one tick

use std::collections::HashSet;

use super::types::{CarId, StreetId};

/// Per-tick markers, rebuilt empty at the start of every tick
#[derive(Debug, Default)]
pub struct TickState {
    /// Cars that overtook, crossed an intersection or arrived on a new street
    acted: HashSet<CarId>,
    /// Incoming streets whose head car already had its crossing attempt
    attempted: HashSet<StreetId>,
}

impl TickState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_acted(&self, car: CarId) -> bool {
        self.acted.contains(&car)
    }

    pub fn mark_acted(&mut self, car: CarId) {
        self.acted.insert(car);
    }

    /// Claims the single crossing attempt an incoming street gets per tick.
    /// Returns false if it was already used.
    pub fn begin_attempt(&mut self, incoming: StreetId) -> bool {
        self.attempted.insert(incoming)
    }
}
