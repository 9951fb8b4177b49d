use std::{
    collections::hash_map::DefaultHasher,
    hash::{Hash, Hasher},
    time::Duration,
};

use faemaze_core::{CellCoord, Event, PropKind};
use faemaze_simulation::{PlacementInput, PlacementRequest, Simulation, SimulationConfig};
use faemaze_world::{query, MazeLayout};

const GLADE: &str = "\
S.........S
.###.#.##.#
...#.#..#..
.#.....~#.#
.#.###..#..
...#H......
";

#[test]
fn deterministic_replay_produces_identical_event_log() {
    let first = replay();
    let second = replay();

    assert_eq!(first.len(), second.len());
    assert_eq!(fingerprint(&first), fingerprint(&second), "replay diverged");
    assert!(first
        .iter()
        .any(|event| matches!(event, Event::VisitorSpawned { .. })));
}

fn replay() -> Vec<Event> {
    let layout = MazeLayout::parse(GLADE).expect("valid layout");
    let mut simulation = Simulation::new(&layout, SimulationConfig::default()).expect("valid config");
    let script = [
        (5, PropKind::Lantern, CellCoord::new(4, 2)),
        (12, PropKind::Wisp, CellCoord::new(6, 3)),
        (30, PropKind::Puka, CellCoord::new(7, 3)),
        (45, PropKind::FairyRing, CellCoord::new(9, 4)),
    ];

    let mut log = Vec::new();
    for tick in 0..240 {
        let requests = script
            .iter()
            .filter(|(at, _, _)| *at == tick)
            .map(|(_, kind, cell)| {
                PlacementRequest::new(*kind, query::grid_to_world(simulation.world(), *cell))
            })
            .collect();
        let report = simulation.tick(Duration::from_millis(125), &PlacementInput::new(requests));
        log.extend(report.events);
    }
    log
}

fn fingerprint(events: &[Event]) -> u64 {
    let mut hasher = DefaultHasher::new();
    events.hash(&mut hasher);
    hasher.finish()
}
