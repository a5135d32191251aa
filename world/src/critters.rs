//! Critter roster and per-critter movement cadence.

use critter_defence_core::{CellCoord, CritterId, CritterKind, CritterSnapshot};

/// Live critter stored inside the world.
#[derive(Clone, Debug)]
pub(crate) struct Critter {
    pub(crate) id: CritterId,
    pub(crate) kind: CritterKind,
    pub(crate) cell: CellCoord,
    pub(crate) last_cell: Option<CellCoord>,
    pub(crate) health: i32,
    max_health: i32,
    pub(crate) power: u32,
    pub(crate) reward: u32,
    level: u32,
    move_interval_ticks: u32,
    frame_counter: u32,
    pub(crate) move_due: bool,
}

impl Critter {
    fn spawn(id: CritterId, kind: CritterKind, level: u32, cell: CellCoord) -> Self {
        let stats = kind.stats(level);
        Self {
            id,
            kind,
            cell,
            last_cell: None,
            health: stats.max_health,
            max_health: stats.max_health,
            power: stats.power,
            reward: stats.reward,
            level,
            move_interval_ticks: stats.move_interval_ticks,
            frame_counter: 0,
            move_due: false,
        }
    }

    /// Health may drop below zero; there is no clamping.
    pub(crate) fn take_damage(&mut self, amount: u32) {
        let amount = i32::try_from(amount).unwrap_or(i32::MAX);
        self.health = self.health.saturating_sub(amount);
    }

    pub(crate) const fn is_dead(&self) -> bool {
        self.health <= 0
    }

    /// Advances the frame counter. A due move that was not consumed in the
    /// previous tick is forfeited.
    fn advance_cadence(&mut self) {
        self.move_due = false;
        if self.frame_counter < self.move_interval_ticks {
            self.frame_counter += 1;
        } else {
            self.frame_counter = 0;
            self.move_due = true;
        }
    }

    pub(crate) fn step_to(&mut self, destination: CellCoord) {
        self.last_cell = Some(self.cell);
        self.cell = destination;
        self.move_due = false;
    }

    pub(crate) fn snapshot(&self) -> CritterSnapshot {
        CritterSnapshot {
            id: self.id,
            kind: self.kind,
            cell: self.cell,
            last_cell: self.last_cell,
            health: self.health,
            max_health: self.max_health,
            power: self.power,
            reward: self.reward,
            level: self.level,
            move_due: self.move_due,
        }
    }
}

/// Ordered collection of live critters. Iteration order is spawn order.
#[derive(Debug)]
pub(crate) struct CritterRoster {
    critters: Vec<Critter>,
    next_id: u32,
}

impl CritterRoster {
    pub(crate) fn new() -> Self {
        Self {
            critters: Vec::new(),
            next_id: 0,
        }
    }

    pub(crate) fn clear(&mut self) {
        self.critters.clear();
        self.next_id = 0;
    }

    pub(crate) fn spawn(&mut self, kind: CritterKind, level: u32, cell: CellCoord) -> CritterId {
        let id = CritterId::new(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.critters.push(Critter::spawn(id, kind, level, cell));
        id
    }

    pub(crate) fn get(&self, id: CritterId) -> Option<&Critter> {
        self.critters.iter().find(|critter| critter.id == id)
    }

    pub(crate) fn get_mut(&mut self, id: CritterId) -> Option<&mut Critter> {
        self.critters.iter_mut().find(|critter| critter.id == id)
    }

    pub(crate) fn remove(&mut self, id: CritterId) -> Option<Critter> {
        let index = self.critters.iter().position(|critter| critter.id == id)?;
        Some(self.critters.remove(index))
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &Critter> {
        self.critters.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Critter> {
        self.critters.iter_mut()
    }

    pub(crate) fn len(&self) -> usize {
        self.critters.len()
    }

    pub(crate) fn advance_cadence(&mut self) {
        for critter in &mut self.critters {
            critter.advance_cadence();
        }
    }

    /// Drops every dead critter while preserving the order of survivors.
    pub(crate) fn purge_dead(&mut self) {
        self.critters.retain(|critter| !critter.is_dead());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cadence_waits_interval_frames_before_each_move() {
        let mut roster = CritterRoster::new();
        let id = roster.spawn(CritterKind::Speedy, 1, CellCoord::new(0, 0));

        for _ in 0..30 {
            roster.advance_cadence();
            assert!(!roster.get(id).expect("spawned").move_due);
        }

        roster.advance_cadence();
        assert!(roster.get(id).expect("spawned").move_due);

        roster.advance_cadence();
        assert!(
            !roster.get(id).expect("spawned").move_due,
            "unused moves are forfeited on the next tick"
        );
    }

    #[test]
    fn damage_is_not_clamped_at_zero() {
        let mut roster = CritterRoster::new();
        let id = roster.spawn(CritterKind::Speedy, 0, CellCoord::new(0, 0));
        let critter = roster.get_mut(id).expect("spawned");
        critter.take_damage(45);
        assert_eq!(critter.health, -15);
        assert!(critter.is_dead());

        roster.purge_dead();
        assert_eq!(roster.len(), 0);
    }

    #[test]
    fn identifiers_follow_spawn_order() {
        let mut roster = CritterRoster::new();
        let first = roster.spawn(CritterKind::Tanky, 1, CellCoord::new(0, 0));
        let second = roster.spawn(CritterKind::Strong, 1, CellCoord::new(0, 0));
        assert!(first < second);

        let removed = roster.remove(first).expect("first exists");
        assert_eq!(removed.kind, CritterKind::Tanky);
        assert!(roster.remove(first).is_none());
        assert_eq!(roster.iter().map(|critter| critter.id).collect::<Vec<_>>(), vec![second]);
    }
}
