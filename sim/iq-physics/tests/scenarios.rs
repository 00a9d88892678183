//! End-to-end drive scenarios: a miniature frame loop over drivetrain,
//! collision response, and cylinder physics, checked against expected field
//! behavior.

#![allow(clippy::unwrap_used)]

use std::f64::consts::{FRAC_PI_2, PI};

use iq_physics::{
    Cylinder, Drivetrain, Field, PartCollider, RobotBody, RobotCollider, SubmodelCollider,
    collision, step_cylinders,
};
use iq_types::{Obb, PhysicsParams};
use nalgebra::Point3;

const DT: f64 = 1.0 / 60.0;

/// A 10 in square robot body, 4 in tall, pivot at its center.
fn test_robot(x: f64, z: f64, yaw: f64) -> RobotBody {
    let part = PartCollider::new(
        0,
        Obb::from_bounds(Point3::new(-5.0, 0.0, -5.0), Point3::new(5.0, 4.0, 5.0)),
    );
    let submodel = SubmodelCollider::enclosing(vec![part]).unwrap();
    let mut drivetrain = Drivetrain::default();
    drivetrain.set_friction(0.8);
    let mut body = RobotBody::new(drivetrain, RobotCollider::new(vec![submodel]), 0.0);
    body.drivetrain.set_position(x, z, yaw);
    body
}

/// One simulator frame: drivetrains, response, cylinders.
fn frame(bodies: &mut [RobotBody], cylinders: &mut [Cylinder], field: &Field) {
    let settings = collision::CollisionSettings::default();
    let params = PhysicsParams::default();
    for body in bodies.iter_mut() {
        body.drivetrain.step(DT);
    }
    collision::resolve(bodies, cylinders, field, &settings);
    step_cylinders(cylinders, field, &params, DT);
}

#[test]
fn s1_straight_drive() {
    let field = Field::default();
    let mut bodies = [test_robot(0.0, 0.0, 0.0)];
    let mut cylinders: [Cylinder; 0] = [];

    bodies[0].drivetrain.set_motors(50.0, 50.0);
    for _ in 0..60 {
        frame(&mut bodies, &mut cylinders, &field);
    }

    let drivetrain = &bodies[0].drivetrain;
    assert!(
        drivetrain.pos_x.abs() < 0.01,
        "drifted sideways: {}",
        drivetrain.pos_x
    );
    assert!(
        drivetrain.pos_z > 3.0,
        "too little forward travel: {}",
        drivetrain.pos_z
    );
    assert!(drivetrain.yaw.abs() < 1e-9, "yawed: {}", drivetrain.yaw);
}

#[test]
fn s2_in_place_turn() {
    let field = Field::default();
    let mut bodies = [test_robot(0.0, 0.0, 0.0)];
    let mut cylinders: [Cylinder; 0] = [];

    bodies[0].drivetrain.set_motors(-50.0, 50.0);
    for _ in 0..60 {
        frame(&mut bodies, &mut cylinders, &field);
    }

    let drivetrain = &bodies[0].drivetrain;
    assert!(drivetrain.pos_x.abs() < 0.5);
    assert!(drivetrain.pos_z.abs() < 0.5);
    assert!(drivetrain.yaw > 0.0, "expected CCW turn: {}", drivetrain.yaw);
}

#[test]
fn s3_wall_stop() {
    let field = Field::default();
    // Facing +X (yaw 90 degrees CCW maps forward +Z onto +X), front face
    // 6 inches from the wall.
    let mut bodies = [test_robot(25.0, 0.0, FRAC_PI_2)];
    let mut cylinders: [Cylinder; 0] = [];

    bodies[0].drivetrain.set_motors(75.0, 75.0);
    for _ in 0..120 {
        frame(&mut bodies, &mut cylinders, &field);
    }

    let drivetrain = &bodies[0].drivetrain;
    let front = drivetrain.pos_x + 5.0;
    assert!(
        (front - field.max_x).abs() <= 0.15 + 1e-6,
        "front face not resting at the wall: {front}"
    );
    assert!(
        drivetrain.vel_x.abs() < 1e-6,
        "still moving into the wall: {}",
        drivetrain.vel_x
    );
    assert!(drivetrain.in_contact);
    assert!((drivetrain.contact_normal_x - -1.0).abs() < 1e-9);
    assert!(drivetrain.contact_normal_z.abs() < 1e-9);
}

#[test]
fn s4_cylinder_push() {
    let field = Field::default();
    let mut bodies = [test_robot(0.0, 0.0, 0.0)];
    let mut cylinders = [Cylinder::new(0.0, 10.0, 2.0, 7.0, 0.1)];

    bodies[0].drivetrain.set_motors(50.0, 50.0);
    let mut saw_forward_cylinder_velocity = false;
    for _ in 0..30 {
        frame(&mut bodies, &mut cylinders, &field);
        if cylinders[0].vel_z > 0.0 {
            saw_forward_cylinder_velocity = true;
        }
    }

    assert!(
        cylinders[0].z > 10.0,
        "cylinder not pushed: {}",
        cylinders[0].z
    );
    assert!(saw_forward_cylinder_velocity);
    assert!(
        bodies[0].drivetrain.forward_velocity > 1.0,
        "robot was arrested by the cylinder"
    );
}

#[test]
fn s5_two_robot_collision() {
    let field = Field::default();
    // Facing each other, 4 inches of daylight between front faces.
    let mut bodies = [test_robot(0.0, -7.0, 0.0), test_robot(0.0, 7.0, PI)];
    let mut cylinders: [Cylinder; 0] = [];

    bodies[0].drivetrain.set_motors(50.0, 50.0);
    bodies[1].drivetrain.set_motors(50.0, 50.0);
    for _ in 0..60 {
        frame(&mut bodies, &mut cylinders, &field);
    }

    let centroid = (bodies[0].drivetrain.pos_z + bodies[1].drivetrain.pos_z) / 2.0;
    assert!(
        centroid.abs() < 0.2,
        "symmetric push-off moved the centroid: {centroid}"
    );

    assert!(bodies[0].drivetrain.in_contact);
    assert!(bodies[1].drivetrain.in_contact);
    let n0 = bodies[0].drivetrain.contact_normal_z;
    let n1 = bodies[1].drivetrain.contact_normal_z;
    assert!(
        (n0 + n1).abs() < 1e-9 && n0 != 0.0,
        "contact normals not opposite: {n0} vs {n1}"
    );
}

#[test]
fn wall_containment_holds_from_any_command() {
    let field = Field::default();
    for (left, right, yaw) in [
        (100.0, 100.0, 0.0),
        (100.0, 100.0, FRAC_PI_2),
        (100.0, 100.0, 2.4),
        (-100.0, 100.0, 1.0),
        (-100.0, -100.0, -FRAC_PI_2),
    ] {
        let mut bodies = [test_robot(20.0, 30.0, yaw)];
        let mut cylinders: [Cylinder; 0] = [];
        bodies[0].drivetrain.set_motors(left, right);

        for _ in 0..600 {
            frame(&mut bodies, &mut cylinders, &field);
        }

        // The submodel box must not extend past the field boundary by more
        // than the dead-zone after response has converged.
        let aabb = bodies[0].world_submodel_obb(0).enclosing_aabb();
        let slack = 0.15 + 1e-6;
        assert!(aabb.max.x <= field.max_x + slack, "escaped +X: {:?}", aabb.max);
        assert!(aabb.min.x >= field.min_x - slack, "escaped -X: {:?}", aabb.min);
        assert!(aabb.max.z <= field.max_z + slack, "escaped +Z: {:?}", aabb.max);
        assert!(aabb.min.z >= field.min_z - slack, "escaped -Z: {:?}", aabb.min);
    }
}
