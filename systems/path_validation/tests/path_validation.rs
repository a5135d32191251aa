use critter_defence_core::{CellCoord, CellKind, Command, ValidationError};
use critter_defence_system_path_validation::PathValidator;
use critter_defence_world::{self as world, query, World};

fn build(columns: u32, rows: u32, entry: (u32, u32), exit: (u32, u32), path: &[(u32, u32)]) -> World {
    let mut world = World::new();
    let mut events = Vec::new();
    world::apply(&mut world, Command::ConfigureGrid { columns, rows }, &mut events);
    for &(column, row) in path {
        world::apply(
            &mut world,
            Command::SetCell {
                cell: CellCoord::new(column, row),
                kind: CellKind::Path,
            },
            &mut events,
        );
    }
    world::apply(
        &mut world,
        Command::SetEntry {
            cell: CellCoord::new(entry.0, entry.1),
        },
        &mut events,
    );
    world::apply(
        &mut world,
        Command::SetExit {
            cell: CellCoord::new(exit.0, exit.1),
        },
        &mut events,
    );
    world
}

#[test]
fn five_by_one_corridor_passes() {
    let world = build(5, 1, (0, 0), (4, 0), &[(1, 0), (2, 0), (3, 0)]);
    let mut validator = PathValidator::new();
    assert_eq!(validator.validate(query::grid_view(&world)), Ok(()));
}

#[test]
fn branch_on_larger_grid_fails() {
    let path = [
        (1, 1),
        (2, 1),
        (3, 1),
        (4, 1),
        (5, 1),
        (3, 2),
        (3, 3),
    ];
    let world = build(7, 5, (0, 1), (6, 1), &path);
    let mut validator = PathValidator::new();
    assert_eq!(
        validator.validate(query::grid_view(&world)),
        Err(ValidationError::BranchingOrDeadEnd {
            cell: CellCoord::new(3, 3),
        })
    );
}

#[test]
fn moving_the_entry_leaves_a_stale_entry_behind() {
    let mut world = build(6, 1, (0, 0), (5, 0), &[(1, 0), (2, 0), (3, 0), (4, 0)]);
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::SetEntry {
            cell: CellCoord::new(1, 0),
        },
        &mut events,
    );

    let mut validator = PathValidator::new();
    assert_eq!(
        validator.validate(query::grid_view(&world)),
        Err(ValidationError::MultipleOrMissingEntry { count: 2 }),
        "the previous entry keeps its kind until it is edited"
    );

    world::apply(
        &mut world,
        Command::SetCell {
            cell: CellCoord::new(0, 0),
            kind: CellKind::Scenery,
        },
        &mut events,
    );
    assert_eq!(validator.validate(query::grid_view(&world)), Ok(()));
}

#[test]
fn verdict_does_not_depend_on_corridor_direction() {
    let path = [(1, 0), (2, 0), (2, 1), (2, 2), (3, 2)];
    let forward = build(5, 3, (0, 0), (4, 2), &path);
    let backward = build(5, 3, (4, 2), (0, 0), &path);

    let mut validator = PathValidator::new();
    assert_eq!(validator.validate(query::grid_view(&forward)), Ok(()));
    assert_eq!(validator.validate(query::grid_view(&backward)), Ok(()));
}
