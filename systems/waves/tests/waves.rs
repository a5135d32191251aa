use critter_defence_core::{CellCoord, CellKind, Command, Event, TICK_DURATION};
use critter_defence_system_waves::{WaveConfig, WavePhase, Waves};
use critter_defence_world::{self as world, query, World};

fn corridor() -> World {
    let mut world = World::new();
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::ConfigureGrid {
            columns: 4,
            rows: 1,
        },
        &mut events,
    );
    world::apply(
        &mut world,
        Command::SetEntry {
            cell: CellCoord::new(0, 0),
        },
        &mut events,
    );
    for column in 1..3 {
        world::apply(
            &mut world,
            Command::SetCell {
                cell: CellCoord::new(column, 0),
                kind: CellKind::Path,
            },
            &mut events,
        );
    }
    world::apply(
        &mut world,
        Command::SetExit {
            cell: CellCoord::new(3, 0),
        },
        &mut events,
    );
    world
}

fn tick(world: &mut World, waves: &mut Waves, log: &mut Vec<Event>) {
    let mut events = Vec::new();
    world::apply(world, Command::Tick { dt: TICK_DURATION }, &mut events);

    let mut commands = Vec::new();
    waves.handle(&events, query::critter_count(world), &mut commands);
    log.append(&mut events);

    let mut outcome = Vec::new();
    for command in commands {
        world::apply(world, command, &mut outcome);
    }
    waves.record_spawns(&outcome);
    log.append(&mut outcome);
}

fn clear_critters(world: &mut World, log: &mut Vec<Event>) {
    for critter in query::critter_view(world).into_vec() {
        world::apply(world, Command::RemoveCritter { critter: critter.id }, log);
    }
}

#[test]
fn wave_totals_increase_and_start_only_when_drained() {
    let mut world = corridor();
    let config = WaveConfig {
        spawn_interval_ticks: 2,
        ..WaveConfig::default()
    };
    let mut waves = Waves::new(config, 0xabcd);
    let mut log = Vec::new();
    let mut totals = Vec::new();

    for _ in 0..3 {
        let wave = waves.current_wave();
        totals.push(waves.total_this_wave());

        while waves.phase(query::critter_count(&world)) == WavePhase::Spawning {
            tick(&mut world, &mut waves, &mut log);
        }
        assert_eq!(query::critter_count(&world), waves.total_this_wave() as usize);

        for _ in 0..10 {
            tick(&mut world, &mut waves, &mut log);
            assert_eq!(waves.current_wave(), wave, "wave advanced with critters alive");
        }

        clear_critters(&mut world, &mut log);
        tick(&mut world, &mut waves, &mut log);
        assert_eq!(waves.current_wave(), wave + 1);
    }

    assert_eq!(totals, vec![7, 9, 11]);
    assert!(totals.windows(2).all(|pair| pair[0] < pair[1]));

    let levels: Vec<u32> = log
        .iter()
        .filter_map(|event| match event {
            Event::CritterSpawned { level, .. } => Some(*level),
            _ => None,
        })
        .collect();
    assert_eq!(levels.len(), 27);
    assert!(levels[..7].iter().all(|level| *level == 1));
    assert!(levels[7..16].iter().all(|level| *level == 2));
    assert!(levels[16..].iter().all(|level| *level == 3));
}

#[test]
fn critters_spawn_at_the_entry() {
    let mut world = corridor();
    let mut waves = Waves::new(
        WaveConfig {
            spawn_interval_ticks: 0,
            ..WaveConfig::default()
        },
        7,
    );
    let mut log = Vec::new();

    tick(&mut world, &mut waves, &mut log);

    let critters = query::critter_view(&world).into_vec();
    assert_eq!(critters.len(), 1);
    assert_eq!(critters[0].cell, CellCoord::new(0, 0));
    assert_eq!(critters[0].last_cell, None);
}

#[test]
fn same_seed_spawns_same_kinds() {
    let kinds = |seed: u64| {
        let mut world = corridor();
        let mut waves = Waves::new(
            WaveConfig {
                spawn_interval_ticks: 0,
                ..WaveConfig::default()
            },
            seed,
        );
        let mut log = Vec::new();
        for _ in 0..7 {
            tick(&mut world, &mut waves, &mut log);
        }
        log.into_iter()
            .filter_map(|event| match event {
                Event::CritterSpawned { kind, .. } => Some(kind),
                _ => None,
            })
            .collect::<Vec<_>>()
    };

    assert_eq!(kinds(21), kinds(21));
    assert_eq!(kinds(21).len(), 7);
}

#[test]
fn repainted_entry_still_receives_spawns() {
    let mut world = World::new();
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::ConfigureGrid {
            columns: 6,
            rows: 1,
        },
        &mut events,
    );
    let edits = [
        Command::SetEntry {
            cell: CellCoord::new(0, 0),
        },
        Command::SetCell {
            cell: CellCoord::new(0, 0),
            kind: CellKind::Scenery,
        },
        Command::SetCell {
            cell: CellCoord::new(1, 0),
            kind: CellKind::Entry,
        },
        Command::SetExit {
            cell: CellCoord::new(5, 0),
        },
    ];
    for command in edits {
        world::apply(&mut world, command, &mut events);
    }

    let mut waves = Waves::new(
        WaveConfig {
            spawn_interval_ticks: 0,
            ..WaveConfig::default()
        },
        5,
    );
    let mut log = Vec::new();
    for _ in 0..3 {
        tick(&mut world, &mut waves, &mut log);
    }

    assert_eq!(query::critter_count(&world), 3);
    assert_eq!(waves.spawned_this_wave(), 3);
    assert!(query::critter_view(&world)
        .iter()
        .all(|critter| critter.cell == CellCoord::new(1, 0)));
}

#[test]
fn spawns_rejected_by_the_world_hold_the_wave_back() {
    let mut world = World::new();
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::ConfigureGrid {
            columns: 3,
            rows: 1,
        },
        &mut events,
    );

    let mut waves = Waves::new(
        WaveConfig {
            spawn_interval_ticks: 0,
            ..WaveConfig::default()
        },
        5,
    );
    let mut log = Vec::new();
    for _ in 0..100 {
        tick(&mut world, &mut waves, &mut log);
    }

    assert_eq!(waves.current_wave(), 1);
    assert_eq!(waves.spawned_this_wave(), 0);
    assert_eq!(waves.phase(query::critter_count(&world)), WavePhase::Spawning);
    assert!(log
        .iter()
        .any(|event| matches!(event, Event::CritterSpawnRejected { .. })));
}
