use crate::dispatch::ObjectId;
use crate::puzzle::CubeSpin;

/// What the player meant, independent of which device said it
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    /// hit-test result, nearest object first
    Select(Vec<ObjectId>),
    EnterDigit(u8),
    Confirm,
    Reset,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpinKey {
    Up,
    Down,
    Left,
    Right,
}

/// ELI5:
/// ┌────────────┬──────────────────────────────┐
/// │ key code   │ intent                       │
/// ├────────────┼──────────────────────────────┤
/// │ Space      │ enter the facing cube digit  │
/// │ Enter      │ confirm the code             │
/// │ Backspace  │ reset the entered digits     │
/// │ W A S D    │ held, turns the cube         │
/// └────────────┴──────────────────────────────┘
/// `facing_digit` is whatever face the cube shows right now.
pub fn key_intent(code: &str, facing_digit: u8) -> Option<Intent> {
    match code {
        "Space" => Some(Intent::EnterDigit(facing_digit)),
        "Enter" | "NumpadEnter" => Some(Intent::Confirm),
        "Backspace" => Some(Intent::Reset),
        _ => None,
    }
}

pub fn spin_key(code: &str) -> Option<SpinKey> {
    match code {
        "KeyW" => Some(SpinKey::Up),
        "KeyS" => Some(SpinKey::Down),
        "KeyA" => Some(SpinKey::Left),
        "KeyD" => Some(SpinKey::Right),
        _ => None,
    }
}

/// Records a rotate key going down or up
pub fn hold(spin: &mut CubeSpin, key: SpinKey, held: bool) {
    match key {
        SpinKey::Up => spin.up = held,
        SpinKey::Down => spin.down = held,
        SpinKey::Left => spin.left = held,
        SpinKey::Right => spin.right = held,
    }
}
