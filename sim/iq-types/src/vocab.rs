//! Shared simulation vocabulary.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Contact classification for a rendered entity, used for debug
/// visualization and response bookkeeping.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum CollisionState {
    /// Not in contact.
    #[default]
    None,
    /// The entity's submodel bounding box overlaps another robot's.
    SubmodelTouch,
    /// The entity's part bounding box overlaps another robot's part.
    PartTouch,
    /// In contact with a wall or a field object.
    ExternalTouch,
}

impl CollisionState {
    /// Whether any contact was recorded.
    #[must_use]
    pub fn is_touching(self) -> bool {
        self != Self::None
    }
}

/// Drivetrain family declared by a robot definition.
///
/// Only [`DrivetrainKind::Tank`] has active dynamics; the other variants are
/// recognized by the loader but simulated as non-driving chassis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum DrivetrainKind {
    /// Unrecognized or missing drivetrain declaration.
    #[default]
    Unknown,
    /// Differential (tank) drive.
    Tank,
    /// Mecanum drive (placeholder, no dynamics).
    Mecanum,
    /// Omni drive (placeholder, no dynamics).
    Omni,
    /// Ackermann steering (placeholder, no dynamics).
    Ackermann,
}

impl DrivetrainKind {
    /// Whether this drivetrain kind is simulated.
    #[must_use]
    pub fn drives(self) -> bool {
        self == Self::Tank
    }
}

/// Which side of the drivetrain a wheel assembly belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Side {
    /// Left side of the chassis.
    Left,
    /// Right side of the chassis.
    Right,
}

impl Side {
    /// Whether this is the right side.
    #[must_use]
    pub fn is_right(self) -> bool {
        self == Self::Right
    }
}

/// Motor command for one robot, as percentages in `-100..=100`.
///
/// This is the single record every input source (keyboard, gamepad, robot
/// program over IPC) reduces to before the drivetrain integrates.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RobotInput {
    /// Left drive command in percent.
    pub left_pct: f64,
    /// Right drive command in percent.
    pub right_pct: f64,
}

impl RobotInput {
    /// Build an input, saturating both commands to `-100..=100`.
    #[must_use]
    pub fn new(left_pct: f64, right_pct: f64) -> Self {
        Self {
            left_pct: left_pct.clamp(-100.0, 100.0),
            right_pct: right_pct.clamp(-100.0, 100.0),
        }
    }

    /// A stopped drivetrain.
    #[must_use]
    pub fn stop() -> Self {
        Self::default()
    }
}

/// Scene-level physics constants.
///
/// Loaded once from the scene file and read-only afterwards. Units are
/// imperial to match the rest of the simulation: friction coefficients are
/// dimensionless, gravity is in inches/s².
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PhysicsParams {
    /// Wheel-ground friction coefficient (rubber on foam tile).
    pub friction: f64,
    /// Friction applied when pushing field cylinders.
    pub cylinder_friction: f64,
    /// Gravity in inches/s² (386.1 = 9.81 m/s²).
    pub gravity: f64,
}

impl Default for PhysicsParams {
    fn default() -> Self {
        Self {
            friction: 0.8,
            cylinder_friction: 0.5,
            gravity: 386.1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_physics_defaults() {
        let params = PhysicsParams::default();
        assert_eq!(params.friction, 0.8);
        assert_eq!(params.cylinder_friction, 0.5);
        assert_eq!(params.gravity, 386.1);
    }

    #[test]
    fn test_input_saturates() {
        let input = RobotInput::new(250.0, -180.0);
        assert_eq!(input.left_pct, 100.0);
        assert_eq!(input.right_pct, -100.0);
    }

    #[test]
    fn test_only_tank_drives() {
        assert!(DrivetrainKind::Tank.drives());
        assert!(!DrivetrainKind::Mecanum.drives());
        assert!(!DrivetrainKind::Unknown.drives());
    }
}
