//! Child-process management for robot programs.

use std::io::{Read, Write};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::decode::LineDecoder;
use crate::error::{IpcError, Result};
use crate::messages::{GamepadAxes, GamepadButtons, HostMessage};
use crate::state::ProgramState;

/// How long a child gets to exit gracefully after the shutdown notice.
const SHUTDOWN_GRACE: Duration = Duration::from_millis(100);

/// A spawned robot program and its line-framed JSON channel.
///
/// One bridge per programmed robot. All I/O is non-blocking and driven by
/// the frame loop: call [`ProgramBridge::pump`] once per frame to ingest
/// whatever the program wrote, and the send methods to push controller
/// samples and ticks.
#[derive(Debug)]
pub struct ProgramBridge {
    child: Child,
    stdin: ChildStdin,
    stdout: ChildStdout,
    decoder: LineDecoder,
    state: ProgramState,
    connected: bool,
    command_line: String,
}

impl ProgramBridge {
    /// Spawn a robot program with piped stdin/stdout.
    ///
    /// `program` is the interpreter or executable, `args` its arguments
    /// (typically the bridge script and the robot program path).
    pub fn spawn(program: &str, args: &[&str]) -> Result<Self> {
        let command_line = format!("{program} {}", args.join(" "));
        info!(command = %command_line, "spawning robot program");

        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .spawn()
            .map_err(|e| IpcError::spawn(&command_line, e))?;

        let stdin = child.stdin.take().ok_or(IpcError::MissingPipe {
            program: command_line.clone(),
            stream: "stdin",
        })?;
        let stdout = child.stdout.take().ok_or(IpcError::MissingPipe {
            program: command_line.clone(),
            stream: "stdout",
        })?;

        set_nonblocking(&stdout)?;

        Ok(Self {
            child,
            stdin,
            stdout,
            decoder: LineDecoder::new(),
            state: ProgramState::default(),
            connected: true,
            command_line,
        })
    }

    /// Whether the child is still alive and talking.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// Whether the program reported `ready`.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.connected && self.state.ready
    }

    /// Latest program state.
    #[must_use]
    pub fn state(&self) -> &ProgramState {
        &self.state
    }

    /// Drain available bytes and fold complete messages into the state.
    /// Returns `true` if at least one message arrived.
    pub fn pump(&mut self) -> bool {
        if !self.connected {
            return false;
        }

        // A dead child demotes the robot; its last buffered output is
        // still consumed below.
        if let Ok(Some(status)) = self.child.try_wait() {
            warn!(command = %self.command_line, %status, "robot program exited");
            self.connected = false;
        }

        let mut buf = [0_u8; 1024];
        loop {
            match self.stdout.read(&mut buf) {
                Ok(0) => {
                    if self.connected {
                        debug!(command = %self.command_line, "robot program closed stdout");
                        self.connected = false;
                    }
                    break;
                }
                Ok(n) => self.decoder.push_bytes(&buf[..n]),
                Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => break,
                Err(e) => {
                    warn!(command = %self.command_line, %e, "robot program read failed");
                    self.connected = false;
                    break;
                }
            }
        }

        let mut any = false;
        for message in self.decoder.drain_messages() {
            any = true;
            if !self.state.apply(&message) {
                self.connected = false;
            }
        }
        any
    }

    /// Send one message, newline-framed. Write failures (a dead pipe)
    /// demote the robot rather than propagating.
    pub fn send(&mut self, message: &HostMessage) {
        if !self.connected {
            return;
        }
        let Ok(mut line) = serde_json::to_string(message) else {
            return;
        };
        line.push('\n');
        if let Err(e) = self.stdin.write_all(line.as_bytes()) {
            warn!(command = %self.command_line, %e, "robot program write failed");
            self.connected = false;
        }
    }

    /// Send the per-frame tick that prompts a state response.
    pub fn send_tick(&mut self, dt: f64) {
        self.send(&HostMessage::Tick { dt });
    }

    /// Send a controller sample.
    pub fn send_gamepad(&mut self, axes: GamepadAxes, buttons: GamepadButtons) {
        self.send(&HostMessage::Gamepad { axes, buttons });
    }

    /// Graceful teardown: shutdown notice, a short grace period, then kill.
    pub fn shutdown(mut self) {
        if self.connected {
            self.send(&HostMessage::Shutdown);
            std::thread::sleep(SHUTDOWN_GRACE);
        }
        match self.child.try_wait() {
            Ok(Some(_)) => {}
            _ => {
                let _ = self.child.kill();
            }
        }
        let _ = self.child.wait();
        info!(command = %self.command_line, "robot program terminated");
    }
}

/// Switch a pipe to non-blocking mode so the per-frame pump never stalls
/// the simulation.
#[cfg(unix)]
fn set_nonblocking(stdout: &ChildStdout) -> Result<()> {
    use std::os::fd::AsRawFd;

    let fd = stdout.as_raw_fd();
    // Safety: fcntl on a fd we own, with valid flag arguments.
    unsafe {
        let flags = libc::fcntl(fd, libc::F_GETFL);
        if flags < 0 {
            return Err(IpcError::Io(std::io::Error::last_os_error()));
        }
        if libc::fcntl(fd, libc::F_SETFL, flags | libc::O_NONBLOCK) < 0 {
            return Err(IpcError::Io(std::io::Error::last_os_error()));
        }
    }
    Ok(())
}

#[cfg(not(unix))]
fn set_nonblocking(_stdout: &ChildStdout) -> Result<()> {
    // Anonymous pipes can't be made non-blocking here; reads rely on the
    // child producing output promptly.
    Ok(())
}

#[cfg(all(test, unix))]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    /// Spawn a stand-in "program" that reports ready plus one state and
    /// then echoes until stdin closes.
    #[test]
    fn test_bridge_round_trip_with_real_process() {
        let script = "printf '{\"type\":\"ready\",\"project\":\"stub\"}\\n\
                      {\"type\":\"state\",\"motors\":{\"1\":{\"speed\":50,\"spinning\":true,\"position\":0.0}}}\\n'; \
                      cat > /dev/null";
        let mut bridge = ProgramBridge::spawn("/bin/sh", &["-c", script]).unwrap();

        bridge.send_tick(1.0 / 60.0);

        // Give the child a moment to print, then pump.
        let mut got = false;
        for _ in 0..50 {
            std::thread::sleep(Duration::from_millis(10));
            if bridge.pump() {
                got = true;
                break;
            }
        }

        assert!(got, "no messages arrived from the child");
        assert!(bridge.is_ready());
        assert_eq!(bridge.state().project, "stub");
        assert_eq!(bridge.state().motor_speed(1), 50.0);

        bridge.shutdown();
    }

    #[test]
    fn test_spawn_failure_is_an_error() {
        let result = ProgramBridge::spawn("/nonexistent/interpreter", &[]);
        assert!(matches!(result, Err(IpcError::Spawn { .. })));
    }
}
