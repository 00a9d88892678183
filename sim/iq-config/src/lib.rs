//! Declarative configuration loaders for the VEX IQ field simulator.
//!
//! Three document kinds share one indented key/value syntax (two-space
//! indentation, `#` comments, `- ` list items, `[a, b, c]` inline arrays):
//!
//! - **Robot definitions** (`.robotdef`) - drivetrain geometry, pivot,
//!   wheel assemblies, articulated submodels ([`RobotDefinition`])
//! - **Drive-port maps** (`.config`) - motor port to drivetrain side
//!   assignments ([`DrivePorts`])
//! - **Scenes** (`.scene`) - robot placements, field cylinders, physics
//!   constants ([`Scene`])
//!
//! All three are parsed through the same [`indent`] document model rather
//! than three ad-hoc scanners, so indentation and list handling behave
//! identically everywhere.
//!
//! Loaders are lenient the way the simulator needs them to be: unknown keys
//! are ignored, missing optional fields take defaults, and only unreadable
//! files or structurally empty documents are errors. The caller decides
//! which failures are fatal (a missing scene) and which degrade gracefully
//! (a missing robot definition).

#![doc(html_root_url = "https://docs.rs/iq-config/0.3.0")]
#![deny(clippy::unwrap_used, clippy::expect_used)]
#![warn(missing_docs)]
#![allow(
    clippy::missing_const_for_fn,
    clippy::module_name_repetitions,
    clippy::missing_errors_doc,
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
)]

pub mod indent;

mod driveports;
mod error;
mod robotdef;
mod scene;

pub use driveports::{DrivePorts, load_drive_config_file, parse_drive_config_str};
pub use error::{ConfigError, Result};
pub use robotdef::{
    ArticulatedSubmodel, DrivetrainGeometry, MotorBinding, RobotDefinition, Summary, WheelAssembly,
    load_robotdef_file, parse_robotdef_str,
};
pub use scene::{CylinderSpec, RobotPlacement, Scene, load_scene_file, parse_scene_str};

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use iq_types::DrivetrainKind;

    #[test]
    fn test_robotdef_and_scene_share_syntax() {
        let def = parse_robotdef_str(
            "version: 1\n\
             drivetrain:\n\
             \x20\x20type: tank\n\
             \x20\x20track_width: 500\n",
        )
        .unwrap();
        assert_eq!(def.drivetrain.kind, DrivetrainKind::Tank);

        let scene = parse_scene_str(
            "name: Test\n\
             physics:\n\
             \x20\x20friction: 0.9\n",
        )
        .unwrap();
        assert_eq!(scene.physics.friction, 0.9);
    }
}
