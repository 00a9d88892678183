//! Drive-port map (`.config`) schema.
//!
//! A robot's `.config` file assigns brain ports to named motors and tags
//! each with the mechanism it drives. Only the drivetrain entries matter
//! here: `mechanism: drivetrain.left_wheels` (or `.right_wheels`) binds that
//! motor's port to a drivetrain side. The robot definition's motors list
//! remains authoritative; this map fills in ports the definition leaves
//! unassigned.

use std::fs;
use std::path::Path;

use tracing::info;

use crate::error::{ConfigError, Result};
use crate::indent::Document;

/// Motor ports feeding the two drivetrain sides.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrivePorts {
    /// Port of the left drive motor.
    pub left: Option<u8>,
    /// Port of the right drive motor.
    pub right: Option<u8>,
}

impl DrivePorts {
    /// Merge two maps, preferring `self` (the authoritative source).
    #[must_use]
    pub fn or(self, fallback: Self) -> Self {
        Self {
            left: self.left.or(fallback.left),
            right: self.right.or(fallback.right),
        }
    }

    /// Whether either side has a port assigned.
    #[must_use]
    pub fn any(self) -> bool {
        self.left.is_some() || self.right.is_some()
    }
}

/// Load a drive-port map from disk.
pub fn load_drive_config_file(path: impl AsRef<Path>) -> Result<DrivePorts> {
    let path = path.as_ref();
    let text =
        fs::read_to_string(path).map_err(|e| ConfigError::io(path.display().to_string(), e))?;
    let ports = parse_drive_config_str(&text);
    if ports.any() {
        info!(path = %path.display(), left = ?ports.left, right = ?ports.right, "loaded drive ports");
    }
    Ok(ports)
}

/// Parse a drive-port map from text. An absent `motors` section simply
/// yields an empty map.
#[must_use]
pub fn parse_drive_config_str(input: &str) -> DrivePorts {
    let doc = Document::parse(input);
    let mut ports = DrivePorts::default();

    let Some(motors) = doc.root("motors") else {
        return ports;
    };

    for motor in &motors.children {
        let port = motor
            .child_value("port")
            .and_then(|value| value.parse::<u8>().ok());
        let Some(mechanism) = motor.child_value("mechanism") else {
            continue;
        };
        if mechanism.contains("drivetrain.left") {
            ports.left = port;
        } else if mechanism.contains("drivetrain.right") {
            ports.right = port;
        }
    }

    ports
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_mechanism_matching() {
        let ports = parse_drive_config_str(
            "motors:\n\
             \x20\x20LeftSideDrive_1:\n\
             \x20\x20\x20\x20port: 1\n\
             \x20\x20\x20\x20mechanism: drivetrain.left_wheels\n\
             \x20\x20RightSideDrive_1:\n\
             \x20\x20\x20\x20port: 6\n\
             \x20\x20\x20\x20mechanism: drivetrain.right_wheels\n\
             \x20\x20ArmMotor:\n\
             \x20\x20\x20\x20port: 10\n\
             \x20\x20\x20\x20mechanism: arm\n",
        );
        assert_eq!(ports.left, Some(1));
        assert_eq!(ports.right, Some(6));
    }

    #[test]
    fn test_missing_section_is_empty() {
        let ports = parse_drive_config_str("name: something\n");
        assert!(!ports.any());
    }

    #[test]
    fn test_merge_prefers_authoritative() {
        let authoritative = DrivePorts {
            left: Some(2),
            right: None,
        };
        let fallback = DrivePorts {
            left: Some(1),
            right: Some(6),
        };
        let merged = authoritative.or(fallback);
        assert_eq!(merged.left, Some(2));
        assert_eq!(merged.right, Some(6));
    }
}
