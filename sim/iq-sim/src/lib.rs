//! Simulation orchestrator for the VEX IQ field simulator.
//!
//! This crate ties the leaf crates together: it realizes a loaded
//! [`Scene`](iq_config::Scene) into robot instances, part instances, and
//! cylinders; runs the per-frame loop; and publishes a [`RenderFrame`] for
//! the (external) rendering layer.
//!
//! # Frame loop
//!
//! Every frame, in this exact order:
//!
//! 1. Pump IPC bridges and poll operator input
//! 2. Resolve each robot's motor command (program state for the active
//!    programmed robot, keyboard fallback otherwise)
//! 3. Step every drivetrain
//! 4. Run collision response, iterated to convergence
//! 5. Step cylinder physics
//! 6. Sync poses into render transforms and integrate wheel spin
//! 7. (debug only) run the detection pass to mark touching entities
//! 8. Publish the frame
//!
//! The whole loop is single-threaded and cooperative; the only concurrency
//! is with robot-program child processes behind non-blocking pipes.
//!
//! # External collaborators
//!
//! Windowing/GL, the mesh-file decoder, the HID gamepad layer, and the text
//! overlay are not part of this crate. They plug in through:
//!
//! - [`MeshSource`] - "load mesh bounds by part id"
//! - [`OperatorInput`] - per-frame keyboard/gamepad snapshot
//! - [`RenderFrame`] - per-frame transforms, colors and collision states

#![doc(html_root_url = "https://docs.rs/iq-sim/0.3.0")]
#![deny(clippy::unwrap_used, clippy::expect_used)]
#![warn(missing_docs)]
#![allow(
    clippy::missing_const_for_fn,
    clippy::module_name_repetitions,
    clippy::missing_errors_doc,
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
)]

mod error;
mod input;
mod mesh;
mod part;
mod render;
mod robot;
mod sim;
mod transform;

pub use error::{Result, SimError};
pub use input::{
    KeyboardState, OperatorInput, fold_triggers, gamepad_tank, keyboard_tank, trigger_pressed,
};
pub use mesh::{FallbackMeshSource, MeshCache, MeshId, MeshInfo, MeshSource};
pub use part::PartInstance;
pub use render::{CylinderRender, PartRender, RenderFrame, RobotStatus};
pub use robot::{ArticulationState, Launcher, RobotInstance, WheelState};
pub use sim::Simulator;
pub use transform::{ArticulationSpin, WheelSpin, build_part_transform, cylinder_transform};
