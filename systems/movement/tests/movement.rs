use std::time::Duration;

use faemaze_core::{CellCoord, Command, Direction, Event, VisitorState};
use faemaze_system_movement::{Config, Movement};
use faemaze_world::{self as world, query, MazeLayout, World, WorldConfig};

const LOOP: &str = "\
S...H
.###.
.....
";

fn world_from(layout: &str) -> World {
    let layout = MazeLayout::parse(layout).expect("valid layout");
    World::new(&layout, WorldConfig::default()).expect("valid config")
}

fn spawn_at_entrance(world: &mut World) {
    let entrance = query::entrances(world)[0];
    let mut events = Vec::new();
    world::apply(world, Command::SpawnVisitor { entrance }, &mut events);
}

fn planned_commands(world: &World, movement: &mut Movement, events: &[Event]) -> Vec<Command> {
    let mut commands = Vec::new();
    movement.handle(
        events,
        &query::visitor_view(world),
        query::grid(world),
        query::pathfinder(world),
        query::hearts(world),
        &mut commands,
    );
    commands
}

fn tick(world: &mut World, movement: &mut Movement, dt: Duration) -> Vec<Event> {
    let mut events = Vec::new();
    world::apply(world, Command::Tick { dt }, &mut events);
    for command in planned_commands(world, movement, &events) {
        world::apply(world, command, &mut events);
    }
    events
}

#[test]
fn visitor_follows_corridor_to_heart() {
    let mut world = world_from("S...H");
    let mut movement = Movement::default();
    spawn_at_entrance(&mut world);

    let mut reached = false;
    for _ in 0..4 {
        let events = tick(&mut world, &mut movement, Duration::from_millis(500));
        reached |= events
            .iter()
            .any(|event| matches!(event, Event::VisitorReachedHeart { .. }));
    }

    assert!(reached, "visitor should reach the heart in four steps");
    assert_eq!(query::visitor_count(&world), 0);
}

#[test]
fn attraction_pulls_visitors_onto_the_long_route() {
    let mut world = world_from(LOOP);
    let mut events = Vec::new();
    for cell in [(0, 1), (0, 2), (1, 2), (2, 2), (3, 2), (4, 2), (4, 1)] {
        world::apply(
            &mut world,
            Command::AddAttraction {
                cell: CellCoord::new(cell.0, cell.1),
                delta: 9.0,
            },
            &mut events,
        );
    }
    spawn_at_entrance(&mut world);
    world::apply(
        &mut world,
        Command::Tick {
            dt: Duration::from_millis(500),
        },
        &mut events,
    );

    let mut drawn = Movement::default();
    let mut indifferent = Movement::new(Config::new(0.0, 0.0, 0.0, 1));
    let visitor = query::visitor_view(&world).into_vec()[0].id;

    assert_eq!(
        planned_commands(&world, &mut drawn, &events),
        vec![Command::StepVisitor {
            visitor,
            direction: Direction::South,
        }]
    );
    assert_eq!(
        planned_commands(&world, &mut indifferent, &events),
        vec![Command::StepVisitor {
            visitor,
            direction: Direction::East,
        }]
    );
}

#[test]
fn unreachable_heart_falls_back_to_wandering() {
    let mut world = world_from("S.#H");
    let mut movement = Movement::default();
    spawn_at_entrance(&mut world);

    let events = tick(&mut world, &mut movement, Duration::from_millis(500));

    assert!(events.iter().any(|event| matches!(
        event,
        Event::VisitorAdvanced { to, .. } if *to == CellCoord::new(1, 0)
    )));
    assert_eq!(movement.cached_routes(), 0);
}

#[test]
fn visitors_wait_for_their_step_interval() {
    let mut world = world_from("S...H");
    let mut movement = Movement::default();
    spawn_at_entrance(&mut world);

    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::Tick {
            dt: Duration::from_millis(100),
        },
        &mut events,
    );

    assert!(planned_commands(&world, &mut movement, &events).is_empty());
}

#[test]
fn batches_without_time_do_not_move_visitors() {
    let mut world = world_from("S...H");
    let mut movement = Movement::default();
    spawn_at_entrance(&mut world);
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::Tick {
            dt: Duration::from_millis(500),
        },
        &mut events,
    );

    let unrelated = [Event::EssenceChanged { essence: 3 }];
    assert!(planned_commands(&world, &mut movement, &unrelated).is_empty());
}

#[test]
fn state_changes_and_attraction_invalidate_routes() {
    let mut world = world_from(LOOP);
    let mut movement = Movement::default();
    spawn_at_entrance(&mut world);
    let _ = tick(&mut world, &mut movement, Duration::from_millis(500));
    assert_eq!(movement.cached_routes(), 1);

    let visitor = query::visitor_view(&world).into_vec()[0].id;
    let _ = planned_commands(
        &world,
        &mut movement,
        &[Event::VisitorStateChanged {
            visitor,
            state: VisitorState::Fascinated,
        }],
    );
    assert_eq!(movement.cached_routes(), 0);

    let _ = tick(&mut world, &mut movement, Duration::from_millis(500));
    assert_eq!(movement.cached_routes(), 1);
    let _ = planned_commands(
        &world,
        &mut movement,
        &[Event::AttractionChanged {
            origin: CellCoord::new(2, 2),
            cells: 4,
        }],
    );
    assert_eq!(movement.cached_routes(), 0);
}
