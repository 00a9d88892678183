//! Rotation and frame-conversion helpers.
//!
//! Assembly documents store rotations as row-major 3×3 matrices applied as
//! `v' = R·v`; composition is always `R = R_world · R_local`. The renderer
//! consumes column-major 4×4 matrices. Everything in between goes through
//! the helpers here so the three coordinate frames (CAD, mesh, world) are
//! never mixed ad hoc.

use nalgebra::{Matrix3, Matrix4, Rotation3, Unit, Vector3};

/// One LDU (LDraw unit, 0.4 mm) in world inches.
pub const LDU_TO_INCHES: f64 = 0.02;

/// Build a rotation matrix from the nine row-major floats of an assembly
/// placement line.
#[must_use]
pub fn rotation_from_rows(values: &[f64; 9]) -> Matrix3<f64> {
    Matrix3::from_row_slice(values)
}

/// Rotation about the world Y axis (yaw), positive counter-clockwise when
/// viewed from above.
#[must_use]
pub fn rotation_y(angle_rad: f64) -> Matrix3<f64> {
    Rotation3::from_axis_angle(&Vector3::y_axis(), angle_rad).into_inner()
}

/// Rotation about an arbitrary axis by `angle_rad` (Rodrigues).
///
/// A degenerate (near-zero) axis yields the identity, so callers can feed an
/// unchecked spin axis straight from a robot definition. Because the rotation
/// is rebuilt from an accumulated angle each frame, spinning a wheel N times
/// by `angle` is exactly one rotation by `N·angle`.
#[must_use]
pub fn rotation_axis_angle(axis: &Vector3<f64>, angle_rad: f64) -> Matrix3<f64> {
    match Unit::try_new(*axis, 1e-12) {
        Some(unit) => Rotation3::from_axis_angle(&unit, angle_rad).into_inner(),
        None => Matrix3::identity(),
    }
}

/// Convert a CAD-frame rotation to the world frame: `C·R·C` with
/// `C = diag(1, -1, -1)`, which flips both Y (down → up) and Z (back → front).
#[must_use]
pub fn cad_rotation_to_world(rotation: &Matrix3<f64>) -> Matrix3<f64> {
    let c = Matrix3::from_diagonal(&Vector3::new(1.0, -1.0, -1.0));
    c * rotation * c
}

/// Convert a CAD-frame position (LDU) to a world-frame position (inches).
#[must_use]
pub fn cad_position_to_world(position: &Vector3<f64>) -> Vector3<f64> {
    Vector3::new(
        position.x * LDU_TO_INCHES,
        -position.y * LDU_TO_INCHES,
        -position.z * LDU_TO_INCHES,
    )
}

/// Pack a rotation and translation into the column-major 4×4 layout the
/// rendering layer consumes.
#[must_use]
pub fn column_major_transform(rotation: &Matrix3<f64>, translation: &Vector3<f64>) -> [f64; 16] {
    let mut m = Matrix4::identity();
    m.fixed_view_mut::<3, 3>(0, 0).copy_from(rotation);
    m.fixed_view_mut::<3, 1>(0, 3).copy_from(translation);

    let mut out = [0.0; 16];
    out.copy_from_slice(m.as_slice());
    out
}

/// Normalize an angle to the half-open interval `(-PI, PI]`.
#[must_use]
pub fn normalize_angle(mut angle: f64) -> f64 {
    use std::f64::consts::PI;
    while angle > PI {
        angle -= 2.0 * PI;
    }
    while angle <= -PI {
        angle += 2.0 * PI;
    }
    angle
}
