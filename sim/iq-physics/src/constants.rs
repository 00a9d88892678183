//! Physical constants for VEX IQ robots.
//!
//! Motor figures follow the VEX IQ Smart Motor specification; the rest are
//! tuned defaults for a typical competition robot.

use std::f64::consts::PI;

/// Motor speed at no load, RPM.
pub const MOTOR_MAX_RPM: f64 = 120.0;

/// Motor stall torque, inch-pounds (0.52 N·m).
pub const MOTOR_STALL_TORQUE: f64 = 4.6;

/// Typical robot mass in pounds.
pub const DEFAULT_ROBOT_MASS: f64 = 3.0;

/// Rotational inertia of a robot-sized plate, slug·in²
/// (1/12 · m · (w² + h²) for a 10 in square at 3 lb).
pub const DEFAULT_MOMENT_OF_INERTIA: f64 = 0.13;

/// Default drive wheel diameter in inches.
pub const DEFAULT_WHEEL_DIAMETER: f64 = 4.0;

/// Default distance between left and right wheel contact patches, inches.
pub const DEFAULT_TRACK_WIDTH: f64 = 10.0;

/// Per-frame velocity decay from rolling resistance and air drag.
pub const LINEAR_DAMPING: f64 = 0.90;

/// Per-frame angular velocity decay.
pub const ANGULAR_DAMPING: f64 = 0.85;

/// Extra per-frame decay while both motors are commanded to zero
/// (back-EMF braking of unpowered smart motors).
pub const BRAKE_FACTOR: f64 = 0.85;

/// Forward speed below which a braking robot snaps to rest, inches/s.
pub const LINEAR_DEADBAND: f64 = 0.5;

/// Angular speed below which a braking robot snaps to rest, rad/s.
pub const ANGULAR_DEADBAND: f64 = 0.01;

/// Standard gravity in inches/s²; also the pounds→slugs divisor.
pub const STANDARD_GRAVITY: f64 = 386.1;

/// Convert pounds to slugs for F = ma in imperial units.
#[must_use]
pub fn lbs_to_slugs(lbs: f64) -> f64 {
    lbs / STANDARD_GRAVITY
}

/// Wheel surface speed in inches/s for a motor speed in RPM.
#[must_use]
pub fn rpm_to_surface_speed(rpm: f64, wheel_diameter: f64) -> f64 {
    (rpm / 60.0) * PI * wheel_diameter
}
