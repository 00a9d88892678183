//! Core types for the VEX IQ field simulator.
//!
//! This crate provides the foundation the rest of the workspace builds on:
//!
//! - [`math`] - Rotation composition, axis-angle spin, CAD/world conversion
//! - [`Obb`] / [`Aabb`] - Oriented and axis-aligned bounding boxes
//! - [`CollisionState`], [`DrivetrainKind`], [`Side`], [`RobotInput`] -
//!   shared simulation vocabulary
//!
//! # Design Philosophy
//!
//! These types are **pure data and pure math**. They have no I/O, no frame
//! loop, no logging. They're the common language between:
//!
//! - The assembly and configuration loaders (`iq-ldraw`, `iq-config`)
//! - The physics engine (`iq-physics`)
//! - The robot-program bridge (`iq-ipc`)
//! - The orchestrator and rendering boundary (`iq-sim`)
//!
//! # Coordinate Systems
//!
//! Three frames coexist in the simulator and are reconciled in one place
//! (the per-part transform builder in `iq-sim`):
//!
//! | Frame | Axes | Units |
//! |---|---|---|
//! | CAD | X-right, Y-down, Z-back | LDU (0.4 mm) |
//! | Mesh | X-right, Y-up, Z-front | world units |
//! | World | X-right, Y-up, Z-front | inches |
//!
//! The conversion constants and helpers live in [`math`].
//!
//! # Example
//!
//! ```
//! use iq_types::Obb;
//! use nalgebra::{Point3, Vector3};
//!
//! let a = Obb::from_bounds(Point3::new(-1.0, -1.0, -1.0), Point3::new(1.0, 1.0, 1.0));
//! let b = a.transformed(&Vector3::new(1.5, 0.0, 0.0), &iq_types::math::rotation_y(0.3));
//!
//! assert!(a.intersects(&b));
//! assert!(b.intersects(&a));
//! ```

#![doc(html_root_url = "https://docs.rs/iq-types/0.3.0")]
#![deny(clippy::unwrap_used, clippy::expect_used)]
#![warn(missing_docs)]
#![allow(
    clippy::missing_const_for_fn,     // Many methods can't be const due to nalgebra
    clippy::suboptimal_flops,          // mul_add style changes aren't always clearer
    clippy::cast_precision_loss,       // usize to f64 is fine for counts
)]

pub mod math;
mod obb;
mod vocab;

pub use obb::{Aabb, Obb};
pub use vocab::{CollisionState, DrivetrainKind, PhysicsParams, RobotInput, Side};

// Re-export math types for convenience
pub use nalgebra::{Matrix3, Matrix4, Point3, Rotation3, UnitVector3, Vector3};

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::Vector3;

    #[test]
    fn test_obb_roundtrip_through_world() {
        let local = Obb::from_bounds(Point3::new(-2.0, 0.0, -1.0), Point3::new(2.0, 4.0, 1.0));
        let world = local.transformed(
            &Vector3::new(10.0, 0.0, -5.0),
            &math::rotation_y(std::f64::consts::FRAC_PI_2),
        );

        // Half extents are expressed in the box's own frame and never change.
        assert_relative_eq!(world.half_extents, local.half_extents);
        // Center moved with the transform.
        assert_relative_eq!(world.center.y, 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_vocab_defaults() {
        assert_eq!(CollisionState::default(), CollisionState::None);
        assert_eq!(RobotInput::default().left_pct, 0.0);
        assert!(!Side::Left.is_right());
    }
}
