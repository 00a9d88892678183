//! Wire protocol: one JSON object per newline-terminated line.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Stick dead-zone as a percentage of full range.
pub const AXIS_DEADZONE_PCT: i32 = 10;

/// Fraction of analog trigger travel past which a trigger reads as a
/// pressed button. The wire protocol carries only the resulting booleans
/// (`LDown`/`RDown` in [`GamepadButtons`]); the operator-input mapping
/// applies this threshold when folding raw trigger travel in.
pub const TRIGGER_THRESHOLD: f64 = 0.5;

/// Controller stick axes, each `-100..=100`.
///
/// Matches the IQ controller layout: `A` is left stick Y (forward
/// positive, sign already flipped from raw hardware), `B` left stick X,
/// `C` right stick X, `D` right stick Y.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GamepadAxes {
    /// Left stick Y, forward positive.
    #[serde(rename = "A")]
    pub a: i32,
    /// Left stick X, right positive.
    #[serde(rename = "B")]
    pub b: i32,
    /// Right stick X, right positive.
    #[serde(rename = "C")]
    pub c: i32,
    /// Right stick Y, forward positive.
    #[serde(rename = "D")]
    pub d: i32,
}

/// Controller buttons in the IQ naming scheme.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[allow(missing_docs)]
pub struct GamepadButtons {
    #[serde(rename = "LUp")]
    pub l_up: bool,
    #[serde(rename = "LDown")]
    pub l_down: bool,
    #[serde(rename = "RUp")]
    pub r_up: bool,
    #[serde(rename = "RDown")]
    pub r_down: bool,
    #[serde(rename = "EUp")]
    pub e_up: bool,
    #[serde(rename = "EDown")]
    pub e_down: bool,
    #[serde(rename = "FUp")]
    pub f_up: bool,
    #[serde(rename = "FDown")]
    pub f_down: bool,
}

/// Messages from the simulator to the robot program.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum HostMessage {
    /// Operator controller sample.
    Gamepad {
        /// Stick axes.
        axes: GamepadAxes,
        /// Button states.
        buttons: GamepadButtons,
    },
    /// Frame tick prompting a state response.
    Tick {
        /// Frame time in seconds.
        dt: f64,
    },
    /// Teardown notice.
    Shutdown,
}

/// Telemetry for one motor port.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MotorTelemetry {
    /// Commanded speed, percent `-100..=100`.
    #[serde(default)]
    pub speed: i32,
    /// Whether the motor is spinning.
    #[serde(default)]
    pub spinning: bool,
    /// Encoder position, degrees.
    #[serde(default)]
    pub position: f64,
}

/// Telemetry for one pneumatic port.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PneumaticTelemetry {
    /// Cylinder extended.
    #[serde(default)]
    pub extended: bool,
    /// Pump running.
    #[serde(default)]
    pub pump: bool,
}

/// Messages from the robot program to the simulator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ProgramMessage {
    /// The program finished loading.
    Ready {
        /// Project name for the operator display.
        #[serde(default)]
        project: String,
    },
    /// Actuator state snapshot, keyed by port number strings.
    State {
        /// Motor telemetry per port.
        #[serde(default)]
        motors: HashMap<String, MotorTelemetry>,
        /// Pneumatic telemetry per port.
        #[serde(default)]
        pneumatics: HashMap<String, PneumaticTelemetry>,
    },
    /// Informational message for the operator.
    Status {
        /// Display text.
        #[serde(default)]
        message: String,
    },
    /// Program-side error report.
    Error {
        /// Display text.
        #[serde(default)]
        message: String,
    },
    /// The program is exiting.
    Shutdown,
    /// Any message type this simulator doesn't know; ignored.
    #[serde(other)]
    Unknown,
}
