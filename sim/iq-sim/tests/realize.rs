//! Scene realization and frame-loop behavior against on-disk documents.

#![allow(clippy::unwrap_used)]

use std::fs;
use std::path::PathBuf;

use iq_sim::{FallbackMeshSource, KeyboardState, OperatorInput, Simulator};

const ROBOT_MPD: &str = "\
0 FILE testbot.mpd
0 Name: testbot
1 72 0 -40 0 1 0 0 0 1 0 0 0 1 chassis.ldr
1 4 0 -80 -60 1 0 0 0 1 0 0 0 1 arm.ldr
1 0 -220 -20 120 1 0 0 0 1 0 0 0 1 228-2500-208.dat
1 0 220 -20 120 1 0 0 0 1 0 0 0 1 228-2500-208.dat
1 0 -220 -20 -120 1 0 0 0 1 0 0 0 1 228-2500-208.dat
1 0 220 -20 -120 1 0 0 0 1 0 0 0 1 228-2500-208.dat
0 FILE chassis.ldr
1 16 0 0 0 1 0 0 0 1 0 0 0 1 228-2500-021.dat
1 16 0 0 80 1 0 0 0 1 0 0 0 1 228-2500-021.dat
0 FILE arm.ldr
1 16 0 0 0 1 0 0 0 1 0 0 0 1 228-2546.dat
";

const ROBOT_DEF: &str = "\
version: 1
source_file: testbot.mpd
main_model: testbot
summary:
  total_wheels: 4
  total_motors: 2
  total_sensors: 0
  has_brain: true
drivetrain:
  type: tank
  left_drive: LeftSideDrive.ldr
  right_drive: RightSideDrive.ldr
  rotation_center: [0, -20, 0]
  rotation_axis: [0, 1, 0]
  track_width: 440
  wheel_diameter: 100
motors:
  - submodel: LeftSideDrive.ldr
    port: 1
    count: 1
  - submodel: RightSideDrive.ldr
    port: 6
    count: 1
submodels:
wheel_assemblies:
  left_front:
    world_position: [-220, -20, 120]
    spin_axis: [-1, 0, 0]
    outer_diameter_mm: 100
    parts:
      - part: 228-2500-208
  right_front:
    world_position: [220, -20, 120]
    spin_axis: [1, 0, 0]
    outer_diameter_mm: 100
    parts:
      - part: 228-2500-208
  left_rear:
    world_position: [-220, -20, -120]
    spin_axis: [-1, 0, 0]
    outer_diameter_mm: 100
    parts:
      - part: 228-2500-208
  right_rear:
    world_position: [220, -20, -120]
    spin_axis: [1, 0, 0]
    outer_diameter_mm: 100
    parts:
      - part: 228-2500-208
";

const SCENE: &str = "\
name: Realization Test

physics:
  friction: 0.8

robots:
  - mpd: testbot.mpd
    position: [0, 0, 0]
    rotation: 0

cylinders:
  - position: [0, 20]
    radius: 2
    height: 7
    color: [0.9, 0.2, 0.2]
";

/// Write the test documents into a fresh temp directory.
fn scene_dir(tag: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("iq-sim-realize-{}-{tag}", std::process::id()));
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("testbot.mpd"), ROBOT_MPD).unwrap();
    fs::write(dir.join("testbot.robotdef"), ROBOT_DEF).unwrap();
    fs::write(dir.join("test.scene"), SCENE).unwrap();
    dir
}

#[test]
fn realizes_robots_parts_and_cylinders() {
    let dir = scene_dir("basic");
    let mut meshes = FallbackMeshSource;
    let sim = Simulator::from_scene_file(dir.join("test.scene"), &mut meshes, None).unwrap();

    assert_eq!(sim.robots().len(), 1);
    assert_eq!(sim.cylinders().len(), 1);
    // 4 wheels + 2 chassis beams + 1 arm part.
    assert_eq!(sim.parts().len(), 7);

    let robot = &sim.robots()[0];
    assert!(robot.driving);
    assert_eq!(robot.wheels.len(), 4);
    assert_eq!(robot.ports.left, Some(1));
    assert_eq!(robot.ports.right, Some(6));

    // Every wheel part matched the assembly at its own position.
    let wheel_parts: Vec<_> = sim
        .parts()
        .iter()
        .filter(|p| p.wheel.is_some())
        .collect();
    assert_eq!(wheel_parts.len(), 4);
    let mut matched: Vec<_> = wheel_parts.iter().map(|p| p.wheel.unwrap()).collect();
    matched.sort_unstable();
    assert_eq!(matched, vec![0, 1, 2, 3]);

    // Fallback meshes extend half an inch below each part origin, so the
    // ground offset lifting the lowest corner onto Y = 0 must be positive.
    let body = &sim.bodies()[0];
    assert!(body.ground_offset > 0.0);

    // No program anywhere: no active robot.
    assert_eq!(sim.active_robot(), None);
}

#[test]
fn keyboard_drives_robot_zero() {
    let dir = scene_dir("keyboard");
    let mut meshes = FallbackMeshSource;
    let mut sim = Simulator::from_scene_file(dir.join("test.scene"), &mut meshes, None).unwrap();

    let input = OperatorInput {
        keyboard: KeyboardState {
            w: true,
            ..Default::default()
        },
        ..Default::default()
    };
    for _ in 0..60 {
        sim.step(1.0 / 60.0, &input);
    }

    let drivetrain = &sim.bodies()[0].drivetrain;
    assert!(
        drivetrain.pos_z > 3.0,
        "keyboard forward did not move the robot: {}",
        drivetrain.pos_z
    );
    assert!(drivetrain.pos_x.abs() < 0.01);

    // Wheels spun along with the travel.
    let robot = &sim.robots()[0];
    assert!(robot.wheels[0].spin_angle.abs() > 0.1);
}

#[test]
fn select_robot_without_program_is_noop() {
    let dir = scene_dir("select");
    let mut meshes = FallbackMeshSource;
    let mut sim = Simulator::from_scene_file(dir.join("test.scene"), &mut meshes, None).unwrap();

    sim.select_robot(1);
    assert_eq!(sim.active_robot(), None);
    sim.select_robot(4);
    assert_eq!(sim.active_robot(), None);
}

#[test]
fn render_frame_covers_all_parts() {
    let dir = scene_dir("render");
    let mut meshes = FallbackMeshSource;
    let mut sim = Simulator::from_scene_file(dir.join("test.scene"), &mut meshes, None).unwrap();
    sim.step(1.0 / 60.0, &OperatorInput::default());

    let frame = sim.render_frame();
    assert_eq!(frame.parts.len(), sim.parts().len());
    assert_eq!(frame.cylinders.len(), 1);
    assert!(!frame.collision_overlay);

    // All transforms finite and affine.
    for part in &frame.parts {
        assert!(part.transform.iter().all(|v| v.is_finite()));
        assert_eq!(part.transform[15], 1.0);
    }

    // Operator status rides along for the overlay.
    assert_eq!(frame.robots.len(), 1);
    assert!(frame.robots[0].driving);
    assert!(!frame.robots[0].programmed);
}

#[test]
fn missing_definition_degrades_to_static_robot() {
    let dir = scene_dir("nodef");
    fs::remove_file(dir.join("testbot.robotdef")).unwrap();

    let mut meshes = FallbackMeshSource;
    let mut sim = Simulator::from_scene_file(dir.join("test.scene"), &mut meshes, None).unwrap();
    assert!(!sim.robots()[0].driving);

    // Driving input does nothing.
    let input = OperatorInput {
        keyboard: KeyboardState {
            w: true,
            ..Default::default()
        },
        ..Default::default()
    };
    for _ in 0..30 {
        sim.step(1.0 / 60.0, &input);
    }
    assert_eq!(sim.bodies()[0].drivetrain.pos_z, 0.0);
}
