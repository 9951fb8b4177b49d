use faemaze_core::{CellCoord, Command, PropKind};
use faemaze_system_placement::{Placement, PlacementInput, PlacementRequest};
use glam::Vec3;

fn unit_grid(position: Vec3) -> Option<CellCoord> {
    if position.x < 0.0 || position.y < 0.0 || position.x >= 4.0 || position.y >= 4.0 {
        return None;
    }
    Some(CellCoord::new(position.x as u32, position.y as u32))
}

#[test]
fn requests_become_place_commands_in_order() {
    let mut placement = Placement::new();
    let mut commands = Vec::new();
    let input = PlacementInput::new(vec![
        PlacementRequest::new(PropKind::Lantern, Vec3::new(1.5, 2.5, 0.0)),
        PlacementRequest::new(PropKind::Puka, Vec3::new(3.1, 0.2, 0.0)),
    ]);

    placement.handle(&input, unit_grid, &mut commands);

    assert_eq!(
        commands,
        vec![
            Command::PlaceProp {
                kind: PropKind::Lantern,
                cell: CellCoord::new(1, 2),
            },
            Command::PlaceProp {
                kind: PropKind::Puka,
                cell: CellCoord::new(3, 0),
            },
        ]
    );
    assert_eq!(placement.dropped(), 0);
}

#[test]
fn positions_off_the_grid_are_dropped() {
    let mut placement = Placement::new();
    let mut commands = Vec::new();
    let input = PlacementInput::new(vec![
        PlacementRequest::new(PropKind::Wisp, Vec3::new(-1.0, 2.0, 0.0)),
        PlacementRequest::new(PropKind::FairyRing, Vec3::new(0.5, 0.5, 0.0)),
        PlacementRequest::new(PropKind::Wisp, Vec3::new(9.0, 9.0, 0.0)),
    ]);

    placement.handle(&input, unit_grid, &mut commands);

    assert_eq!(
        commands,
        vec![Command::PlaceProp {
            kind: PropKind::FairyRing,
            cell: CellCoord::new(0, 0),
        }]
    );
    assert_eq!(placement.dropped(), 2);
}

#[test]
fn empty_input_emits_nothing() {
    let mut placement = Placement::default();
    let mut commands = Vec::new();
    let input = PlacementInput::default();
    assert!(input.is_empty());

    placement.handle(&input, |_| panic!("no conversions expected"), &mut commands);

    assert!(commands.is_empty());
}
