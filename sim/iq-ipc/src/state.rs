//! Latest-known program state and its mapping to drivetrain input.

use std::collections::HashMap;

use tracing::{error, info, warn};

use crate::messages::{MotorTelemetry, PneumaticTelemetry, ProgramMessage};
use iq_config::DrivePorts;
use iq_types::RobotInput;

/// The most recent actuator state reported by a robot program.
///
/// Motors and pneumatics are keyed by brain port. Only the drive ports feed
/// the physics; everything else is retained for the operator display.
#[derive(Debug, Clone, Default)]
pub struct ProgramState {
    /// The program reported `ready`.
    pub ready: bool,
    /// Project name from the `ready` message.
    pub project: String,
    /// Motor telemetry by port.
    pub motors: HashMap<u8, MotorTelemetry>,
    /// Pneumatic telemetry by port.
    pub pneumatics: HashMap<u8, PneumaticTelemetry>,
    /// Last `status` message.
    pub status: String,
    /// Last `error` message.
    pub error: String,
}

impl ProgramState {
    /// Fold one message into the state. Returns `false` when the message
    /// was a shutdown notice.
    pub fn apply(&mut self, message: &ProgramMessage) -> bool {
        match message {
            ProgramMessage::Ready { project } => {
                self.ready = true;
                self.project = project.clone();
                info!(%project, "robot program ready");
            }
            ProgramMessage::State { motors, pneumatics } => {
                self.motors = parse_ports(motors);
                self.pneumatics = parse_ports(pneumatics);
            }
            ProgramMessage::Status { message } => {
                self.status = message.clone();
                info!(%message, "robot program status");
            }
            ProgramMessage::Error { message } => {
                self.error = message.clone();
                error!(%message, "robot program error");
            }
            ProgramMessage::Shutdown => {
                info!("robot program shut down");
                return false;
            }
            ProgramMessage::Unknown => {}
        }
        true
    }

    /// Commanded speed of the motor on `port`, percent.
    #[must_use]
    pub fn motor_speed(&self, port: u8) -> f64 {
        self.motors
            .get(&port)
            .map_or(0.0, |m| f64::from(m.speed))
    }

    /// Encoder position of the motor on `port`, degrees.
    #[must_use]
    pub fn motor_position(&self, port: u8) -> f64 {
        self.motors.get(&port).map_or(0.0, |m| m.position)
    }
}

/// Re-key telemetry maps from wire port strings to port numbers, dropping
/// entries with non-numeric keys.
fn parse_ports<T: Copy>(wire: &HashMap<String, T>) -> HashMap<u8, T> {
    let mut out = HashMap::with_capacity(wire.len());
    for (key, value) in wire {
        match key.parse::<u8>() {
            Ok(port) => {
                out.insert(port, *value);
            }
            Err(_) => warn!(%key, "ignoring telemetry with non-numeric port"),
        }
    }
    out
}

/// Map the program's motor state onto a drivetrain command using the
/// resolved drive ports. Unassigned sides stay at zero.
#[must_use]
pub fn robot_input_from_state(state: &ProgramState, ports: DrivePorts) -> RobotInput {
    let left = ports.left.map_or(0.0, |port| state.motor_speed(port));
    let right = ports.right.map_or(0.0, |port| state.motor_speed(port));
    RobotInput::new(left, right)
}
