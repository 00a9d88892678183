//! Operator input: keyboard snapshot, gamepad sample, and the fallback
//! mappings for robots without programs.
//!
//! The HID layer itself is external; the windowing shell fills in an
//! [`OperatorInput`] each frame (sticks and buttons pre-mapped, triggers
//! as raw travel) and the orchestrator does the rest, including folding
//! trigger travel into the button fields robot programs see.

use iq_ipc::{AXIS_DEADZONE_PCT, GamepadAxes, GamepadButtons, TRIGGER_THRESHOLD};
use iq_types::RobotInput;

/// Keyboard state relevant to the simulation, sampled once per frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeyboardState {
    /// W held (robot 0 forward).
    pub w: bool,
    /// A held (robot 0 turn left).
    pub a: bool,
    /// S held (robot 0 reverse).
    pub s: bool,
    /// D held (robot 0 turn right).
    pub d: bool,
    /// Up arrow held (robot 1 forward).
    pub up: bool,
    /// Down arrow held (robot 1 reverse).
    pub down: bool,
    /// Left arrow held (robot 1 turn left).
    pub left: bool,
    /// Right arrow held (robot 1 turn right).
    pub right: bool,
}

/// One frame of operator input.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct OperatorInput {
    /// Keyboard snapshot.
    pub keyboard: KeyboardState,
    /// Gamepad sample, if a controller is connected.
    pub gamepad: Option<(GamepadAxes, GamepadButtons)>,
    /// Raw analog trigger travel `(left, right)` in `0.0..=1.0`; folded
    /// into the button fields before the sample reaches a robot program.
    pub triggers: (f64, f64),
    /// Number key 1-4 pressed this frame: switch the active robot.
    pub select_robot: Option<u8>,
    /// Collision-overlay toggle pressed this frame.
    pub toggle_collision_debug: bool,
}

/// Keyboard tank mapping for non-programmed robots: WASD drives robot 0,
/// the arrow keys drive robot 1. Other placements idle.
#[must_use]
pub fn keyboard_tank(robot_index: usize, keyboard: &KeyboardState) -> RobotInput {
    let (forward, reverse, turn_left, turn_right) = match robot_index {
        0 => (keyboard.w, keyboard.s, keyboard.a, keyboard.d),
        1 => (keyboard.up, keyboard.down, keyboard.left, keyboard.right),
        _ => return RobotInput::stop(),
    };

    let drive = f64::from(i32::from(forward) - i32::from(reverse));
    // Positive turn is CCW: the right side speeds up, the left slows down.
    let turn = f64::from(i32::from(turn_left) - i32::from(turn_right));

    RobotInput::new((drive - turn) * 100.0, (drive + turn) * 100.0)
}

/// Gamepad tank mapping: left stick Y drives the left side, right stick Y
/// the right side, with the standard stick dead-zone.
#[must_use]
pub fn gamepad_tank(axes: &GamepadAxes) -> RobotInput {
    RobotInput::new(deadzoned(axes.a), deadzoned(axes.d))
}

fn deadzoned(axis: i32) -> f64 {
    if axis.abs() < AXIS_DEADZONE_PCT {
        0.0
    } else {
        f64::from(axis)
    }
}

/// Whether analog trigger travel (`0.0..=1.0`) reads as a pressed button.
#[must_use]
pub fn trigger_pressed(travel: f64) -> bool {
    travel >= TRIGGER_THRESHOLD
}

/// Fold raw trigger travel into the button fields the wire protocol
/// carries: on common controllers the IQ layout's lower paddles are analog
/// triggers, and robot programs only ever see them as buttons.
#[must_use]
pub fn fold_triggers(
    mut buttons: GamepadButtons,
    left_travel: f64,
    right_travel: f64,
) -> GamepadButtons {
    buttons.l_down = buttons.l_down || trigger_pressed(left_travel);
    buttons.r_down = buttons.r_down || trigger_pressed(right_travel);
    buttons
}
