#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Wave controller responsible for emitting critter spawn commands.
//!
//! A wave spawns its quota one critter at a time, waits until every critter
//! has died or exited, and only then starts the next, larger wave. A spawn
//! counts toward the quota once the world confirms it with
//! [`Event::CritterSpawned`]; a rejected spawn is retried after another
//! interval.

use critter_defence_core::{Command, CritterKind, Event};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Deserialize;

/// Tuning parameters of the wave progression.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct WaveConfig {
    /// Number of the first wave. Also the level of its critters.
    pub first_wave: u32,
    /// Critters in a hypothetical wave zero.
    pub base_critters: u32,
    /// Additional critters per wave number.
    pub critters_per_wave: u32,
    /// Ticks between two spawns of the same wave.
    pub spawn_interval_ticks: u32,
    /// Number of the final wave. `None` keeps the waves coming forever.
    pub last_wave: Option<u32>,
}

impl WaveConfig {
    /// Number of critters spawned during `wave`.
    #[must_use]
    pub fn total_for(&self, wave: u32) -> u32 {
        self.base_critters
            .saturating_add(self.critters_per_wave.saturating_mul(wave))
    }
}

impl Default for WaveConfig {
    fn default() -> Self {
        Self {
            first_wave: 1,
            base_critters: 5,
            critters_per_wave: 2,
            spawn_interval_ticks: 120,
            last_wave: None,
        }
    }
}

/// Progress of the current wave.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WavePhase {
    /// The quota has not been spawned yet.
    Spawning,
    /// Every critter was spawned and some are still alive.
    Draining,
    /// The wave is over; the next one starts on the following tick.
    Complete,
    /// The final configured wave is over.
    Finished,
}

/// Pure system that spawns critters wave by wave.
#[derive(Debug)]
pub struct Waves<R = ChaCha8Rng> {
    config: WaveConfig,
    rng: R,
    current_wave: u32,
    total_this_wave: u32,
    spawned_this_wave: u32,
    pending_spawns: u32,
    spawn_frame_counter: u32,
}

impl Waves<ChaCha8Rng> {
    /// Creates a wave controller whose critter kinds are seeded from `seed`.
    #[must_use]
    pub fn new(config: WaveConfig, seed: u64) -> Self {
        Self::with_rng(config, ChaCha8Rng::seed_from_u64(seed))
    }
}

impl<R: Rng> Waves<R> {
    /// Creates a wave controller drawing critter kinds from the provided generator.
    #[must_use]
    pub fn with_rng(config: WaveConfig, rng: R) -> Self {
        Self {
            config,
            rng,
            current_wave: config.first_wave,
            total_this_wave: config.total_for(config.first_wave),
            spawned_this_wave: 0,
            pending_spawns: 0,
            spawn_frame_counter: 0,
        }
    }

    /// Number of the wave in progress.
    #[must_use]
    pub const fn current_wave(&self) -> u32 {
        self.current_wave
    }

    /// Quota of the wave in progress.
    #[must_use]
    pub const fn total_this_wave(&self) -> u32 {
        self.total_this_wave
    }

    /// Critters the world confirmed as spawned during the wave in progress.
    #[must_use]
    pub const fn spawned_this_wave(&self) -> u32 {
        self.spawned_this_wave
    }

    /// Phase of the current wave given the number of live critters.
    #[must_use]
    pub fn phase(&self, live_critters: usize) -> WavePhase {
        if self.spawned_this_wave < self.total_this_wave {
            WavePhase::Spawning
        } else if live_critters > 0 {
            WavePhase::Draining
        } else if self
            .config
            .last_wave
            .is_some_and(|last| self.current_wave >= last)
        {
            WavePhase::Finished
        } else {
            WavePhase::Complete
        }
    }

    /// Advances to the next wave and resets the spawn counters.
    pub fn start_next_wave(&mut self) {
        self.current_wave = self.current_wave.saturating_add(1);
        self.total_this_wave = self.config.total_for(self.current_wave);
        self.spawned_this_wave = 0;
        self.pending_spawns = 0;
        self.spawn_frame_counter = 0;
        tracing::info!(
            wave = self.current_wave,
            critters = self.total_this_wave,
            "wave started"
        );
    }

    /// Consumes world events to emit `SpawnCritter` commands.
    ///
    /// `live_critters` is the number of critters currently in the world.
    /// Nothing happens unless the events contain a tick.
    pub fn handle(&mut self, events: &[Event], live_critters: usize, out: &mut Vec<Command>) {
        if !events
            .iter()
            .any(|event| matches!(event, Event::TimeAdvanced { .. }))
        {
            return;
        }

        match self.phase(live_critters) {
            WavePhase::Spawning => {
                let requested = self.spawned_this_wave.saturating_add(self.pending_spawns);
                if requested >= self.total_this_wave {
                    return;
                }
                if self.spawn_frame_counter >= self.config.spawn_interval_ticks {
                    self.spawn_frame_counter = 0;
                    self.pending_spawns += 1;
                    let kind = CritterKind::ALL[self.rng.gen_range(0..CritterKind::ALL.len())];
                    out.push(Command::SpawnCritter {
                        kind,
                        level: self.current_wave,
                    });
                } else {
                    self.spawn_frame_counter += 1;
                }
            }
            WavePhase::Complete => self.start_next_wave(),
            WavePhase::Draining | WavePhase::Finished => {}
        }
    }

    /// Settles the spawn requests emitted by [`Waves::handle`] against the
    /// world's answer.
    ///
    /// Confirmed spawns count toward the quota; rejected ones are dropped.
    pub fn record_spawns(&mut self, events: &[Event]) {
        for event in events {
            if self.pending_spawns == 0 {
                return;
            }
            match event {
                Event::CritterSpawned { .. } => {
                    self.pending_spawns -= 1;
                    self.spawned_this_wave += 1;
                }
                Event::CritterSpawnRejected { kind } => {
                    self.pending_spawns -= 1;
                    tracing::warn!(?kind, wave = self.current_wave, "spawn rejected by the world");
                }
                _ => {}
            }
        }
    }
}
