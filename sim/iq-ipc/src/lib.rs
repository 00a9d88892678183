//! Robot-program bridge.
//!
//! A programmed robot runs its control code in an external child process.
//! The simulator talks to it over the child's stdin/stdout with UTF-8 JSON
//! objects, one per line:
//!
//! - simulator → program: [`HostMessage`] (`gamepad`, `tick`, `shutdown`)
//! - program → simulator: [`ProgramMessage`] (`ready`, `state`, `status`,
//!   `error`, `shutdown`)
//!
//! # Single-threaded by design
//!
//! The simulator's frame loop is cooperative and single-threaded; the
//! bridge must never block it or spawn reader threads. The child's stdout
//! is switched to non-blocking mode, and once per frame [`ProgramBridge::pump`]
//! reads whatever bytes are available into a line buffer, consuming complete
//! lines and keeping partial ones for the next frame.
//!
//! # Failure model
//!
//! Everything here is runtime-recoverable: a dead child, a broken pipe, a
//! malformed line, or an unknown message type demotes the robot (its motors
//! freeze at zero, the connected flag clears) and the loop carries on.

#![doc(html_root_url = "https://docs.rs/iq-ipc/0.3.0")]
#![deny(clippy::unwrap_used, clippy::expect_used)]
#![warn(missing_docs)]
#![allow(
    clippy::missing_const_for_fn,
    clippy::module_name_repetitions,
    clippy::missing_errors_doc,
    clippy::cast_precision_loss,
)]

mod bridge;
mod decode;
mod error;
mod messages;
mod state;

pub use bridge::ProgramBridge;
pub use decode::LineDecoder;
pub use error::{IpcError, Result};
pub use messages::{
    AXIS_DEADZONE_PCT, GamepadAxes, GamepadButtons, HostMessage, MotorTelemetry, ProgramMessage,
    PneumaticTelemetry, TRIGGER_THRESHOLD,
};
pub use state::{ProgramState, robot_input_from_state};
