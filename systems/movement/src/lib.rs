#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Movement system that proposes one step for every critter due to move.
//!
//! Critters do not plan routes. Each due critter picks uniformly at random
//! among the walkable neighbours of its cell, excluding the cell it just
//! left. On a validated corridor this leaves exactly one choice everywhere
//! except at the entry, so the randomness only matters on malformed maps.

use critter_defence_core::{CellKind, Command, CritterView, Direction, Event, GridView};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Pure system that reacts to world events and emits movement commands.
#[derive(Debug)]
pub struct Movement<R = ChaCha8Rng> {
    rng: R,
    candidates: Vec<Direction>,
}

impl Movement<ChaCha8Rng> {
    /// Creates a movement system whose choices are seeded from `seed`.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self::with_rng(ChaCha8Rng::seed_from_u64(seed))
    }
}

impl<R: Rng> Movement<R> {
    /// Creates a movement system drawing its choices from the provided generator.
    #[must_use]
    pub fn with_rng(rng: R) -> Self {
        Self {
            rng,
            candidates: Vec::with_capacity(Direction::SCAN_ORDER.len()),
        }
    }

    /// Consumes world events and immutable views to emit `StepCritter` commands.
    ///
    /// Nothing is emitted unless the events contain a tick. Critters are
    /// visited in spawn order so a fixed seed yields a fixed command stream.
    pub fn handle(
        &mut self,
        events: &[Event],
        critters: &CritterView,
        grid: GridView<'_>,
        out: &mut Vec<Command>,
    ) {
        if !events
            .iter()
            .any(|event| matches!(event, Event::TimeAdvanced { .. }))
        {
            return;
        }

        for critter in critters.iter().filter(|critter| critter.move_due) {
            self.candidates.clear();
            for direction in Direction::SCAN_ORDER {
                let Some(neighbor) = critter.cell.step(direction) else {
                    continue;
                };
                if Some(neighbor) == critter.last_cell {
                    continue;
                }
                if grid.kind(neighbor).is_some_and(CellKind::is_walkable) {
                    self.candidates.push(direction);
                }
            }

            if self.candidates.is_empty() {
                continue;
            }

            let choice = self.rng.gen_range(0..self.candidates.len());
            out.push(Command::StepCritter {
                critter: critter.id,
                direction: self.candidates[choice],
            });
        }
    }
}
