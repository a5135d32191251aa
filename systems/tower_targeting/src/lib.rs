#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that computes deterministic tower targets from world snapshots.

use critter_defence_core::{
    CellCoord, CritterId, CritterSnapshot, CritterView, TargetingPolicy, TowerTarget, TowerView,
};
use glam::Vec2;

/// Tower targeting system that reuses scratch buffers to avoid repeated allocations.
#[derive(Debug, Default)]
pub struct TowerTargeting {
    critter_workspace: Vec<CritterCandidate>,
}

impl TowerTargeting {
    /// Creates a new tower targeting system with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Computes one target per tower for the provided world snapshot.
    ///
    /// The output buffer is cleared before populating it with the latest
    /// assignments. Each tower applies the policy of its kind; towers with no
    /// critter in range produce no entry.
    pub fn handle(
        &mut self,
        towers: &TowerView,
        critters: &CritterView,
        exit: Option<CellCoord>,
        out: &mut Vec<TowerTarget>,
    ) {
        out.clear();

        if towers.iter().next().is_none() || critters.is_empty() {
            return;
        }

        self.prepare_critter_workspace(critters);

        for tower in towers.iter() {
            let policy = tower.kind.targeting_policy();
            let selected = select_among(
                policy,
                &self.critter_workspace,
                tower.stats.range_px(),
                tower.position,
                exit,
            );

            if let Some(candidate) = selected {
                out.push(TowerTarget {
                    tower: tower.id,
                    critter: candidate.id,
                    critter_center: candidate.center,
                });
            }
        }
    }

    fn prepare_critter_workspace(&mut self, critters: &CritterView) {
        self.critter_workspace.clear();
        self.critter_workspace.reserve(critters.len());
        self.critter_workspace.extend(
            critters
                .iter()
                .filter(|snapshot| snapshot.health > 0)
                .map(CritterCandidate::from_snapshot),
        );
    }
}

/// Chooses the critter a tower at `tower_position` should shoot.
///
/// Only critters whose centre lies within `range_px` (inclusive) count. Ties
/// go to the critter visited first, which for a [`CritterView`] is the
/// earliest spawned. Without an exit, `ExitPriority` falls back to that order.
#[must_use]
pub fn select_target<'a>(
    policy: TargetingPolicy,
    critters: impl IntoIterator<Item = &'a CritterSnapshot>,
    range_px: f32,
    tower_position: Vec2,
    exit: Option<CellCoord>,
) -> Option<CritterId> {
    let candidates: Vec<CritterCandidate> = critters
        .into_iter()
        .filter(|snapshot| snapshot.health > 0)
        .map(CritterCandidate::from_snapshot)
        .collect();
    select_among(policy, &candidates, range_px, tower_position, exit).map(|candidate| candidate.id)
}

fn select_among<'c>(
    policy: TargetingPolicy,
    candidates: &'c [CritterCandidate],
    range_px: f32,
    tower_position: Vec2,
    exit: Option<CellCoord>,
) -> Option<&'c CritterCandidate> {
    let mut in_range = candidates
        .iter()
        .filter(|candidate| candidate.center.distance(tower_position) <= range_px);

    let mut best = in_range.next()?;
    for candidate in in_range {
        let replaces = match policy {
            TargetingPolicy::Nearest => {
                candidate.center.distance_squared(tower_position)
                    < best.center.distance_squared(tower_position)
            }
            TargetingPolicy::ExitPriority => match exit {
                Some(exit) => {
                    candidate.cell.manhattan_distance(exit) < best.cell.manhattan_distance(exit)
                }
                None => false,
            },
            TargetingPolicy::Weakest => candidate.health < best.health,
            TargetingPolicy::Strongest => candidate.health > best.health,
        };
        if replaces {
            best = candidate;
        }
    }
    Some(best)
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct CritterCandidate {
    id: CritterId,
    cell: CellCoord,
    center: Vec2,
    health: i32,
}

impl CritterCandidate {
    fn from_snapshot(snapshot: &CritterSnapshot) -> Self {
        Self {
            id: snapshot.id,
            cell: snapshot.cell,
            center: snapshot.center(),
            health: snapshot.health,
        }
    }
}
