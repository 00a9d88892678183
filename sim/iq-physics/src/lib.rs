//! Rigid-body physics for the VEX IQ field simulator.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                     collision::resolve                       │
//! │  robot-robot, robot-wall, robot-cylinder response,           │
//! │  sub-stepped to convergence, dead-zone tolerant              │
//! └──────────────┬───────────────────────────────┬───────────────┘
//!                │ external forces,              │ push-out,
//!                │ contact normals               │ momentum transfer
//!                ▼                               ▼
//! ┌──────────────────────────────┐  ┌──────────────────────────────┐
//! │          Drivetrain          │  │       cylinder physics       │
//! │  force-based tank drive:     │  │  circle-circle inelastic     │
//! │  torque curve, friction cap, │  │  contact, friction, field    │
//! │  F=ma integration, braking   │  │  clamping                    │
//! └──────────────────────────────┘  └──────────────────────────────┘
//! ```
//!
//! The orchestrator owns the step order (commands → drivetrains →
//! collision response → cylinders); this crate owns the math inside each
//! step. Nothing here suspends, allocates per frame beyond scratch, or
//! reports runtime errors: integrators saturate bad inputs and collision
//! defensively restores the last valid pose if numbers go non-finite.
//!
//! Units are imperial throughout: inches, pounds (force), seconds, with
//! mass converted to slugs (lb / 386.1) only inside F = ma.
//!
//! # External-force channel
//!
//! Collision response communicates with the integrator through each
//! drivetrain's external force/torque accumulators and contact-normal slot:
//! response writes, the next [`Drivetrain::step`] reads and clears. That
//! write-then-read-then-clear handoff is the only coupling between the two
//! halves of the crate.

#![doc(html_root_url = "https://docs.rs/iq-physics/0.3.0")]
#![deny(clippy::unwrap_used, clippy::expect_used)]
#![warn(missing_docs)]
#![allow(
    clippy::missing_const_for_fn,
    clippy::suboptimal_flops,
    clippy::module_name_repetitions,
    clippy::cast_precision_loss,
)]

pub mod collision;
pub mod constants;

mod collider;
mod cylinder;
mod drivetrain;
mod field;

pub use collider::{PartCollider, RobotBody, RobotCollider, SubmodelCollider};
pub use collision::CollisionSettings;
pub use cylinder::{Cylinder, step_cylinders};
pub use drivetrain::{BrakeMode, Drivetrain, DrivetrainConfig};
pub use field::{Field, Wall};
