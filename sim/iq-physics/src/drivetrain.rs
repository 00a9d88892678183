//! Force-based tank (differential) drive.
//!
//! Physics model:
//!
//! - Motors apply torque to wheels along a linear torque curve (full torque
//!   at stall, none at free speed)
//! - Wheels apply force to the ground through friction; force beyond the
//!   friction limit is clamped and the side is flagged as slipping
//! - Collision response injects accumulated external forces and torque
//! - Net force drives F = ma in slugs; velocities are damped each frame and
//!   braked hard when both commands are zero
//!
//! Coordinate system: X right, Y up, Z forward (the robot faces +Z at zero
//! yaw); positive yaw is counter-clockwise seen from above.

use tracing::warn;

use crate::constants::{
    ANGULAR_DAMPING, ANGULAR_DEADBAND, BRAKE_FACTOR, DEFAULT_MOMENT_OF_INERTIA, DEFAULT_ROBOT_MASS,
    DEFAULT_TRACK_WIDTH, DEFAULT_WHEEL_DIAMETER, LINEAR_DAMPING, LINEAR_DEADBAND, MOTOR_MAX_RPM,
    MOTOR_STALL_TORQUE, STANDARD_GRAVITY, lbs_to_slugs, rpm_to_surface_speed,
};
use iq_types::math::normalize_angle;

/// Static drivetrain configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrivetrainConfig {
    /// Distance between wheel contact patches, inches.
    pub track_width: f64,
    /// Drive wheel diameter, inches.
    pub wheel_diameter: f64,
    /// Motor free speed, RPM.
    pub max_rpm: f64,
    /// Robot mass, pounds.
    pub robot_mass: f64,
    /// Yaw inertia, slug·in².
    pub moment_of_inertia: f64,
    /// Gravity, inches/s². Scales the weight behind the friction cap;
    /// mass (and so inertia) is gravity-invariant.
    pub gravity: f64,
    /// Tuning scalar on forward force.
    pub forward_scale: f64,
    /// Tuning scalar on drive torque.
    pub turn_scale: f64,
}

impl Default for DrivetrainConfig {
    fn default() -> Self {
        Self {
            track_width: DEFAULT_TRACK_WIDTH,
            wheel_diameter: DEFAULT_WHEEL_DIAMETER,
            max_rpm: MOTOR_MAX_RPM,
            robot_mass: DEFAULT_ROBOT_MASS,
            moment_of_inertia: DEFAULT_MOMENT_OF_INERTIA,
            gravity: STANDARD_GRAVITY,
            forward_scale: 1.0,
            turn_scale: 1.0,
        }
    }
}

impl DrivetrainConfig {
    /// Override the track width, inches.
    #[must_use]
    pub fn with_track_width(mut self, inches: f64) -> Self {
        if inches > 0.0 {
            self.track_width = inches;
        }
        self
    }

    /// Override the wheel diameter, inches.
    #[must_use]
    pub fn with_wheel_diameter(mut self, inches: f64) -> Self {
        if inches > 0.0 {
            self.wheel_diameter = inches;
        }
        self
    }

    /// Override gravity, inches/s² (from the scene's physics block).
    #[must_use]
    pub fn with_gravity(mut self, gravity: f64) -> Self {
        if gravity > 0.0 {
            self.gravity = gravity;
        }
        self
    }
}

/// How to stop the drivetrain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrakeMode {
    /// Zero the commands and let friction slow the robot.
    Coast,
    /// Zero the commands and kill all velocity immediately.
    Brake,
}

/// Tank-drive state: pose, velocities, motor commands, and the external
/// force channel collision response writes into.
#[derive(Debug, Clone)]
pub struct Drivetrain {
    /// Static configuration.
    pub config: DrivetrainConfig,

    /// Left motor command, percent (-100..=100).
    pub left_motor_pct: f64,
    /// Right motor command, percent (-100..=100).
    pub right_motor_pct: f64,

    /// World X position, inches.
    pub pos_x: f64,
    /// World Z position, inches.
    pub pos_z: f64,
    /// Yaw in radians, 0 = facing +Z, positive CCW from above.
    pub yaw: f64,

    /// World X velocity, inches/s.
    pub vel_x: f64,
    /// World Z velocity, inches/s.
    pub vel_z: f64,
    /// Yaw rate, rad/s.
    pub angular_vel: f64,

    /// Accumulated external force X, lbf. Cleared every step.
    pub ext_force_x: f64,
    /// Accumulated external force Z, lbf. Cleared every step.
    pub ext_force_z: f64,
    /// Accumulated external torque, in·lbf. Cleared every step.
    pub ext_torque: f64,

    /// Wheel-ground friction coefficient, from the scene.
    pub friction_coeff: f64,

    /// Left wheels exceeded the friction limit last step.
    pub left_slipping: bool,
    /// Right wheels exceeded the friction limit last step.
    pub right_slipping: bool,

    /// Forward speed in the robot frame, inches/s (derived).
    pub forward_velocity: f64,
    /// Left wheel surface velocity, inches/s (derived).
    pub left_wheel_vel: f64,
    /// Right wheel surface velocity, inches/s (derived).
    pub right_wheel_vel: f64,

    /// A contact normal is active; the next step attenuates motion into the
    /// surface. Consumed (cleared) by [`Drivetrain::step`].
    pub in_contact: bool,
    /// Contact normal X (points from the surface toward the robot).
    pub contact_normal_x: f64,
    /// Contact normal Z.
    pub contact_normal_z: f64,

    // Last finite pose, restored if integration ever goes non-finite.
    last_valid: (f64, f64, f64),
}

impl Default for Drivetrain {
    fn default() -> Self {
        Self::new(DrivetrainConfig::default())
    }
}

impl Drivetrain {
    /// Create a drivetrain at the origin with the given configuration.
    #[must_use]
    pub fn new(config: DrivetrainConfig) -> Self {
        Self {
            config,
            left_motor_pct: 0.0,
            right_motor_pct: 0.0,
            pos_x: 0.0,
            pos_z: 0.0,
            yaw: 0.0,
            vel_x: 0.0,
            vel_z: 0.0,
            angular_vel: 0.0,
            ext_force_x: 0.0,
            ext_force_z: 0.0,
            ext_torque: 0.0,
            friction_coeff: 0.8,
            left_slipping: false,
            right_slipping: false,
            forward_velocity: 0.0,
            left_wheel_vel: 0.0,
            right_wheel_vel: 0.0,
            in_contact: false,
            contact_normal_x: 0.0,
            contact_normal_z: 0.0,
            last_valid: (0.0, 0.0, 0.0),
        }
    }

    /// Set motor power as percentages of maximum, saturated to
    /// `-100..=100`. This mirrors how IQ motors are commanded
    /// (`motor.spin(FORWARD, 50, PERCENT)`).
    pub fn set_motors(&mut self, left_percent: f64, right_percent: f64) {
        self.left_motor_pct = left_percent.clamp(-100.0, 100.0);
        self.right_motor_pct = right_percent.clamp(-100.0, 100.0);
    }

    /// Stop both motors.
    pub fn stop(&mut self, mode: BrakeMode) {
        self.left_motor_pct = 0.0;
        self.right_motor_pct = 0.0;
        if mode == BrakeMode::Brake {
            self.vel_x = 0.0;
            self.vel_z = 0.0;
            self.angular_vel = 0.0;
        }
    }

    /// Accumulate an external world-frame force (lbf) for the next step.
    pub fn apply_force(&mut self, force_x: f64, force_z: f64) {
        self.ext_force_x += force_x;
        self.ext_force_z += force_z;
    }

    /// Accumulate an external torque (in·lbf) for the next step.
    pub fn apply_torque(&mut self, torque: f64) {
        self.ext_torque += torque;
    }

    /// Set the wheel-ground friction coefficient.
    pub fn set_friction(&mut self, friction_coeff: f64) {
        self.friction_coeff = friction_coeff;
    }

    /// Record a contact normal (surface → robot); the next step removes the
    /// velocity component into that surface.
    pub fn set_contact(&mut self, normal_x: f64, normal_z: f64) {
        self.in_contact = true;
        self.contact_normal_x = normal_x;
        self.contact_normal_z = normal_z;
    }

    /// Teleport to a pose, zeroing velocities.
    pub fn set_position(&mut self, x: f64, z: f64, yaw: f64) {
        self.pos_x = x;
        self.pos_z = z;
        self.yaw = yaw;
        self.vel_x = 0.0;
        self.vel_z = 0.0;
        self.angular_vel = 0.0;
        self.last_valid = (x, z, yaw);
    }

    /// Whether either side is slipping.
    #[must_use]
    pub fn is_slipping(&self) -> bool {
        self.left_slipping || self.right_slipping
    }

    /// Advance the drivetrain by `dt` seconds.
    ///
    /// Over-range inputs are saturated, never rejected; the caller clamps
    /// `dt` against window stalls. If integration produces non-finite
    /// numbers the pose snaps back to the last valid one.
    pub fn step(&mut self, dt: f64) {
        let config = &self.config;
        let wheel_radius = config.wheel_diameter / 2.0;

        // Torque curve: full torque at stall, zero at free speed.
        let max_surface_speed = rpm_to_surface_speed(config.max_rpm, config.wheel_diameter);
        let left_ratio = (self.left_wheel_vel.abs() / max_surface_speed).min(1.0);
        let right_ratio = (self.right_wheel_vel.abs() / max_surface_speed).min(1.0);
        let left_torque = MOTOR_STALL_TORQUE * (1.0 - left_ratio);
        let right_torque = MOTOR_STALL_TORQUE * (1.0 - right_ratio);

        let left_motor_force = (self.left_motor_pct / 100.0) * (left_torque / wheel_radius);
        let right_motor_force = (self.right_motor_pct / 100.0) * (right_torque / wheel_radius);

        // Friction cap per side: half the robot's weight carries each
        // side. Weight scales with the scene's gravity; at standard
        // gravity a pound of mass weighs one pound-force.
        let weight = config.robot_mass * (config.gravity / STANDARD_GRAVITY);
        let max_friction = (weight / 2.0) * self.friction_coeff;
        let (left_force, left_slip) = clamp_to_friction(left_motor_force, max_friction);
        let (right_force, right_slip) = clamp_to_friction(right_motor_force, max_friction);
        self.left_slipping = left_slip;
        self.right_slipping = right_slip;

        // Net body force and differential torque.
        let track_half = config.track_width / 2.0;
        let mut forward_force = (left_force + right_force) * config.forward_scale;
        let drive_torque = (right_force - left_force) * track_half * config.turn_scale;

        // External forces arrive in the world frame; rotate into the robot
        // frame (+Z forward) and add.
        let (sin_h, cos_h) = self.yaw.sin_cos();
        let ext_forward = self.ext_force_z * cos_h + self.ext_force_x * sin_h;
        let ext_lateral = -self.ext_force_z * sin_h + self.ext_force_x * cos_h;
        forward_force += ext_forward;
        let lateral_force = ext_lateral;
        let total_torque = drive_torque + self.ext_torque;

        // The accumulators are a single-writer single-reader channel from
        // collision response; clear after consuming.
        self.ext_force_x = 0.0;
        self.ext_force_z = 0.0;
        self.ext_torque = 0.0;

        // F = ma with mass in slugs.
        let mass_slugs = lbs_to_slugs(config.robot_mass);
        let forward_accel = forward_force / mass_slugs;
        let lateral_accel = lateral_force / mass_slugs;
        let angular_accel = total_torque / config.moment_of_inertia;

        // Integrate velocities in the robot frame.
        let mut vel_forward = self.vel_z * cos_h + self.vel_x * sin_h;
        let mut vel_lateral = -self.vel_z * sin_h + self.vel_x * cos_h;
        vel_forward += forward_accel * dt;
        vel_lateral += lateral_accel * dt;
        self.angular_vel += angular_accel * dt;

        vel_forward *= LINEAR_DAMPING;
        vel_lateral *= LINEAR_DAMPING;
        self.angular_vel *= ANGULAR_DAMPING;

        // Unpowered smart motors brake hard.
        let motors_off = self.left_motor_pct.abs() < 1.0 && self.right_motor_pct.abs() < 1.0;
        if motors_off {
            vel_forward *= BRAKE_FACTOR;
            self.angular_vel *= BRAKE_FACTOR;
            if vel_forward.abs() < LINEAR_DEADBAND {
                vel_forward = 0.0;
            }
            if self.angular_vel.abs() < ANGULAR_DEADBAND {
                self.angular_vel = 0.0;
            }
        }

        // Back to the world frame.
        self.vel_x = vel_forward * sin_h + vel_lateral * cos_h;
        self.vel_z = vel_forward * cos_h - vel_lateral * sin_h;

        // While in contact, remove the velocity component into the surface.
        if self.in_contact {
            let into = self.vel_x * self.contact_normal_x + self.vel_z * self.contact_normal_z;
            if into < 0.0 {
                self.vel_x -= into * self.contact_normal_x;
                self.vel_z -= into * self.contact_normal_z;
            }
            // Consumed; response re-arms it if the contact persists.
            self.in_contact = false;
        }

        self.pos_x += self.vel_x * dt;
        self.pos_z += self.vel_z * dt;
        self.yaw = normalize_angle(self.yaw + self.angular_vel * dt);

        // Derived values for wheel animation and the next torque curve.
        self.forward_velocity = vel_forward;
        self.left_wheel_vel = vel_forward - self.angular_vel * track_half;
        self.right_wheel_vel = vel_forward + self.angular_vel * track_half;

        self.sanitize();
    }

    /// Restore the last valid pose if integration diverged.
    pub(crate) fn sanitize(&mut self) {
        if self.pos_x.is_finite()
            && self.pos_z.is_finite()
            && self.yaw.is_finite()
            && self.vel_x.is_finite()
            && self.vel_z.is_finite()
            && self.angular_vel.is_finite()
        {
            self.last_valid = (self.pos_x, self.pos_z, self.yaw);
            return;
        }

        warn!("non-finite drivetrain state, restoring last valid pose");
        let (x, z, yaw) = self.last_valid;
        self.pos_x = x;
        self.pos_z = z;
        self.yaw = yaw;
        self.vel_x = 0.0;
        self.vel_z = 0.0;
        self.angular_vel = 0.0;
        self.forward_velocity = 0.0;
        self.left_wheel_vel = 0.0;
        self.right_wheel_vel = 0.0;
    }
}

/// Clamp a wheel force to the friction limit, reporting slip.
fn clamp_to_friction(force: f64, max_friction: f64) -> (f64, bool) {
    if force.abs() > max_friction {
        (max_friction.copysign(force), true)
    } else {
        (force, false)
    }
}
