//! The per-part transform builder: the one place where the CAD, mesh, and
//! world frames meet.
//!
//! Composition order, per part, per frame:
//!
//! 1. optional wheel-spin rotation about the part's spin axis - orientation
//!    only, the part spins in place - then optional articulation about the
//!    owning submodel's joint
//! 2. chassis yaw about the pivot, in CAD space - position and orientation
//! 3. CAD→world axis conversion `C·R·C` with `C = diag(1, -1, -1)`
//! 4. LDU→inch scaling with the matching Y/Z position flip
//! 5. translation to the robot's world position plus ground offset
//!
//! The output is a column-major 4×4 ready for the renderer.

use nalgebra::{Matrix3, Vector3};

use iq_types::math::{
    cad_position_to_world, cad_rotation_to_world, column_major_transform, rotation_axis_angle,
};

/// Wheel-spin input to the transform builder.
#[derive(Debug, Clone, Copy)]
pub struct WheelSpin {
    /// Spin axis in CAD coordinates.
    pub axis: Vector3<f64>,
    /// Accumulated spin angle, radians.
    pub angle: f64,
}

/// Articulation input: a submodel rotated about its own joint (an arm, a
/// claw), expressed in pivot-relative CAD coordinates.
#[derive(Debug, Clone, Copy)]
pub struct ArticulationSpin {
    /// Joint axis in CAD coordinates.
    pub axis: Vector3<f64>,
    /// Joint origin, pivot-relative, LDU.
    pub origin: Vector3<f64>,
    /// Joint angle, radians.
    pub angle: f64,
}

/// Build a part's world transform.
///
/// - `position_cad`: part position relative to the pivot, LDU, CAD frame
/// - `rotation_cad`: baked part rotation, CAD frame
/// - `spin`: wheel-spin rotation, if the part belongs to a wheel assembly
/// - `articulation`: joint rotation, if the part belongs to an articulated
///   submodel
/// - `yaw_axis_cad`: chassis rotation axis in CAD coordinates (vertical by
///   default, i.e. `[0, 1, 0]` in the Y-down CAD frame)
/// - `yaw`: chassis yaw in radians, positive counter-clockwise from above
/// - `world_translation`: robot world position with the ground offset in Y
#[must_use]
pub fn build_part_transform(
    position_cad: &Vector3<f64>,
    rotation_cad: &Matrix3<f64>,
    spin: Option<WheelSpin>,
    articulation: Option<ArticulationSpin>,
    yaw_axis_cad: &Vector3<f64>,
    yaw: f64,
    world_translation: &Vector3<f64>,
) -> [f64; 16] {
    // (1) Wheel spin rotates the part about its own center: orientation
    // changes, position doesn't.
    let spun = match spin {
        Some(WheelSpin { axis, angle }) => rotation_axis_angle(&axis, angle) * rotation_cad,
        None => *rotation_cad,
    };

    // (1b) Articulation swings the whole submodel about its joint origin:
    // position and orientation.
    let (jointed_pos, jointed_rot) = match articulation {
        Some(ArticulationSpin {
            axis,
            origin,
            angle,
        }) => {
            let joint = rotation_axis_angle(&axis, angle);
            (origin + joint * (position_cad - origin), joint * spun)
        }
        None => (*position_cad, spun),
    };

    // (2) Chassis yaw about the pivot (the pivot is this frame's origin).
    // Render yaw is CCW about world Y-up; the CAD axis points down, so the
    // CAD-space angle is negated.
    let yaw_cad = rotation_axis_angle(yaw_axis_cad, -yaw);
    let rotated_pos = yaw_cad * jointed_pos;
    let rotated_rot = yaw_cad * jointed_rot;

    // (3)-(4) Convert into the render frame.
    let world_rot = cad_rotation_to_world(&rotated_rot);
    let local_pos = cad_position_to_world(&rotated_pos);

    // (5) Place relative to the robot.
    column_major_transform(&world_rot, &(local_pos + world_translation))
}

/// World transform for a field cylinder: scale a unit cylinder (radius 1,
/// height 1, base at the origin) and translate onto the floor.
#[must_use]
pub fn cylinder_transform(x: f64, z: f64, radius: f64, height: f64) -> [f64; 16] {
    let mut out = [0.0; 16];
    out[0] = radius;
    out[5] = height;
    out[10] = radius;
    out[12] = x;
    out[14] = z;
    out[15] = 1.0;
    out
}
