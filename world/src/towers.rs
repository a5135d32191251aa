//! Authoritative tower state management utilities.

use std::{collections::BTreeMap, time::Duration};

use critter_defence_core::{
    BulletSnapshot, CellCoord, Event, TowerCooldownSnapshot, TowerId, TowerKind, TowerSnapshot,
    TowerStats, BULLET_COLLISION_RADIUS, BULLET_MAX_RANGE, BULLET_SPEED,
};
use glam::Vec2;

use crate::critters::CritterRoster;

/// Projectile owned by the tower that fired it.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Bullet {
    position: Vec2,
    velocity: Vec2,
    damage: u32,
    active: bool,
}

impl Bullet {
    fn aimed(origin: Vec2, target: Vec2, damage: u32) -> Self {
        Self {
            position: origin,
            velocity: (target - origin).normalize_or_zero() * BULLET_SPEED,
            damage,
            active: true,
        }
    }

    fn snapshot(&self) -> BulletSnapshot {
        BulletSnapshot {
            position: self.position,
            velocity: self.velocity,
            damage: self.damage,
        }
    }
}

/// Snapshot of a tower stored inside the world.
#[derive(Clone, Debug)]
pub(crate) struct TowerState {
    pub(crate) id: TowerId,
    pub(crate) kind: TowerKind,
    pub(crate) cell: CellCoord,
    pub(crate) position: Vec2,
    pub(crate) stats: TowerStats,
    cooldown_elapsed: Duration,
    bullets: Vec<Bullet>,
    kills: u32,
}

impl TowerState {
    pub(crate) fn is_ready(&self) -> bool {
        self.cooldown_elapsed >= self.stats.fire_cooldown()
    }

    /// Spawns a bullet toward `target` and restarts the cooldown.
    pub(crate) fn fire_at(&mut self, target: Vec2) {
        self.bullets
            .push(Bullet::aimed(self.position, target, self.stats.power));
        self.cooldown_elapsed = Duration::ZERO;
    }

    pub(crate) fn snapshot(&self) -> TowerSnapshot {
        TowerSnapshot {
            id: self.id,
            kind: self.kind,
            cell: self.cell,
            position: self.position,
            stats: self.stats,
            bullets: self.bullets.iter().map(Bullet::snapshot).collect(),
            kills: self.kills,
        }
    }

    pub(crate) fn cooldown_snapshot(&self) -> TowerCooldownSnapshot {
        TowerCooldownSnapshot {
            tower: self.id,
            kind: self.kind,
            ready_in: self
                .stats
                .fire_cooldown()
                .saturating_sub(self.cooldown_elapsed),
        }
    }
}

/// Registry that stores towers and manages identifier allocation.
#[derive(Debug)]
pub(crate) struct TowerRegistry {
    entries: BTreeMap<TowerId, TowerState>,
    next_tower_id: TowerId,
}

impl TowerRegistry {
    /// Creates an empty tower registry with a reset identifier counter.
    pub(crate) fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_tower_id: TowerId::new(0),
        }
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
        self.next_tower_id = TowerId::new(0);
    }

    /// Stores a level-one tower centred on `cell`.
    pub(crate) fn insert(&mut self, kind: TowerKind, cell: CellCoord) -> TowerId {
        let id = self.next_tower_id;
        self.next_tower_id = TowerId::new(id.get().wrapping_add(1));
        let _ = self.entries.insert(
            id,
            TowerState {
                id,
                kind,
                cell,
                position: cell.center(),
                stats: kind.base_stats(),
                cooldown_elapsed: Duration::ZERO,
                bullets: Vec::new(),
                kills: 0,
            },
        );
        id
    }

    pub(crate) fn remove(&mut self, id: TowerId) -> Option<TowerState> {
        self.entries.remove(&id)
    }

    pub(crate) fn get_mut(&mut self, id: TowerId) -> Option<&mut TowerState> {
        self.entries.get_mut(&id)
    }

    pub(crate) fn occupies(&self, cell: CellCoord) -> bool {
        self.entries.values().any(|tower| tower.cell == cell)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &TowerState> {
        self.entries.values()
    }

    pub(crate) fn advance_cooldowns(&mut self, dt: Duration) {
        for tower in self.entries.values_mut() {
            tower.cooldown_elapsed = tower.cooldown_elapsed.saturating_add(dt);
        }
    }

    /// Moves every active bullet and applies hits to critters.
    ///
    /// Killed critters stay in the roster, marked dead, until the caller
    /// purges them; later bullets skip them.
    pub(crate) fn resolve_bullets(
        &mut self,
        critters: &mut CritterRoster,
        out_events: &mut Vec<Event>,
    ) {
        for tower in self.entries.values_mut() {
            let origin = tower.position;
            for bullet in tower.bullets.iter_mut().filter(|bullet| bullet.active) {
                bullet.position += bullet.velocity;
                if bullet.position.distance(origin) > BULLET_MAX_RANGE {
                    bullet.active = false;
                    continue;
                }

                let Some(critter) = critters.iter_mut().find(|critter| {
                    !critter.is_dead()
                        && bullet.position.distance(critter.cell.center()) < BULLET_COLLISION_RADIUS
                }) else {
                    continue;
                };

                bullet.active = false;
                critter.take_damage(bullet.damage);
                if critter.is_dead() {
                    tower.kills = tower.kills.saturating_add(1);
                    tracing::debug!(
                        critter = critter.id.get(),
                        tower = tower.id.get(),
                        reward = critter.reward,
                        "critter killed"
                    );
                    out_events.push(Event::CritterKilled {
                        critter: critter.id,
                        kind: critter.kind,
                        tower: tower.id,
                        reward: critter.reward,
                    });
                } else {
                    out_events.push(Event::CritterDamaged {
                        critter: critter.id,
                        tower: tower.id,
                        damage: bullet.damage,
                        remaining: critter.health,
                    });
                }
            }
        }
    }

    pub(crate) fn purge_bullets(&mut self) {
        for tower in self.entries.values_mut() {
            tower.bullets.retain(|bullet| bullet.active);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use critter_defence_core::CritterKind;

    #[test]
    fn registry_starts_empty_with_zero_identifier() {
        let registry = TowerRegistry::new();
        assert!(registry.entries.is_empty());
        assert_eq!(registry.next_tower_id.get(), 0);
    }

    #[test]
    fn inserted_tower_is_centred_on_its_cell() {
        let mut registry = TowerRegistry::new();
        let id = registry.insert(TowerKind::Slow, CellCoord::new(2, 3));
        let tower = registry.get_mut(id).expect("tower stored");
        assert_eq!(tower.position, Vec2::new(100.0, 140.0));
        assert_eq!(tower.stats, TowerKind::Slow.base_stats());
        assert!(registry.occupies(CellCoord::new(2, 3)));
        assert!(!registry.occupies(CellCoord::new(3, 3)));
    }

    #[test]
    fn cooldown_requires_reciprocal_of_rate() {
        let mut registry = TowerRegistry::new();
        let id = registry.insert(TowerKind::Basic, CellCoord::new(0, 0));
        registry.advance_cooldowns(Duration::from_millis(999));
        assert!(!registry.get_mut(id).expect("tower").is_ready());
        registry.advance_cooldowns(Duration::from_millis(1));
        let tower = registry.get_mut(id).expect("tower");
        assert!(tower.is_ready());

        tower.fire_at(Vec2::new(100.0, 20.0));
        assert!(!tower.is_ready());
        assert_eq!(
            tower.cooldown_snapshot().ready_in,
            Duration::from_secs(1)
        );
    }

    #[test]
    fn bullet_expires_beyond_maximum_travel() {
        let mut registry = TowerRegistry::new();
        let mut critters = CritterRoster::new();
        let mut events = Vec::new();
        let id = registry.insert(TowerKind::Basic, CellCoord::new(0, 0));
        registry
            .get_mut(id)
            .expect("tower")
            .fire_at(Vec2::new(1_000.0, 20.0));

        for _ in 0..60 {
            registry.resolve_bullets(&mut critters, &mut events);
        }
        assert_eq!(registry.get_mut(id).expect("tower").bullets.len(), 1);

        registry.resolve_bullets(&mut critters, &mut events);
        registry.purge_bullets();
        assert!(registry.get_mut(id).expect("tower").bullets.is_empty());
        assert!(events.is_empty());
    }

    #[test]
    fn bullet_hits_at_most_one_critter() {
        let mut registry = TowerRegistry::new();
        let mut critters = CritterRoster::new();
        let mut events = Vec::new();
        let first = critters.spawn(CritterKind::Tanky, 1, CellCoord::new(1, 0));
        let second = critters.spawn(CritterKind::Tanky, 1, CellCoord::new(1, 0));
        let id = registry.insert(TowerKind::Basic, CellCoord::new(0, 0));
        registry
            .get_mut(id)
            .expect("tower")
            .fire_at(CellCoord::new(1, 0).center());

        for _ in 0..8 {
            registry.resolve_bullets(&mut critters, &mut events);
        }

        assert_eq!(
            events,
            vec![Event::CritterDamaged {
                critter: first,
                tower: id,
                damage: 25,
                remaining: 90,
            }]
        );
        assert_eq!(critters.get(second).expect("second").health, 115);
    }

    #[test]
    fn simultaneous_bullets_do_not_both_claim_the_same_kill() {
        let mut registry = TowerRegistry::new();
        let mut critters = CritterRoster::new();
        let mut events = Vec::new();
        let weak = critters.spawn(CritterKind::Speedy, 1, CellCoord::new(1, 0));
        let sturdy = critters.spawn(CritterKind::Tanky, 1, CellCoord::new(1, 0));
        critters.get_mut(weak).expect("weak").health = 10;
        let reward = critters.get(weak).expect("weak").reward;

        let left = registry.insert(TowerKind::Basic, CellCoord::new(0, 0));
        let right = registry.insert(TowerKind::Basic, CellCoord::new(2, 0));
        for id in [left, right] {
            registry
                .get_mut(id)
                .expect("tower")
                .fire_at(CellCoord::new(1, 0).center());
        }

        for _ in 0..8 {
            registry.resolve_bullets(&mut critters, &mut events);
        }

        assert_eq!(
            events,
            vec![
                Event::CritterKilled {
                    critter: weak,
                    kind: CritterKind::Speedy,
                    tower: left,
                    reward,
                },
                Event::CritterDamaged {
                    critter: sturdy,
                    tower: right,
                    damage: 25,
                    remaining: 90,
                },
            ]
        );

        critters.purge_dead();
        registry.purge_bullets();
        assert_eq!(critters.len(), 1);
        assert!(critters.get(weak).is_none());
        assert_eq!(critters.get(sturdy).expect("sturdy").health, 90);
        for tower in registry.iter() {
            assert!(tower.bullets.is_empty());
        }
        assert_eq!(registry.get_mut(left).expect("left").kills, 1);
        assert_eq!(registry.get_mut(right).expect("right").kills, 0);
    }
}
