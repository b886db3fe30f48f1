//! Puzzle rules and state for the haunted room.
//!
//! Every puzzle owns its own state and only talks outward through a
//! [`SceneSink`]. None of them know about meshes, canvases or the DOM.
use crate::engine::Vec3;
use serde::{Deserialize, Serialize};

pub mod bookshelf;
pub mod cube_lock;
pub mod missing_item;
pub mod orientation;
pub mod runes;

pub use bookshelf::{Bookshelf, SelectOutcome};
pub use cube_lock::CubeLock;
pub use missing_item::{ItemStage, MissingItem};
pub use orientation::{CubeOrientation, CubeSpin};
pub use runes::{RuneClick, RuneSequence};

// ==================== Colors ====================
/// TABLE
/// ┌────────┬───────┬──────────┐
/// │ token  │ digit │ hex      │
/// ├────────┼───────┼──────────┤
/// │ Orange │   1   │ 0xffa500 │
/// │ Yellow │   2   │ 0xffff00 │
/// │ Red    │   3   │ 0xff0000 │
/// │ Blue   │   4   │ 0x0000ff │
/// │ Green  │   5   │ 0x00ff00 │
/// │ Purple │   6   │ 0x800080 │
/// └────────┴───────┴──────────┘
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorToken {
    Orange,
    Yellow,
    Red,
    Blue,
    Green,
    Purple,
}

impl ColorToken {
    pub const PALETTE: [ColorToken; 6] = [
        ColorToken::Orange,
        ColorToken::Yellow,
        ColorToken::Red,
        ColorToken::Blue,
        ColorToken::Green,
        ColorToken::Purple,
    ];

    pub fn digit(self) -> u8 {
        match self {
            ColorToken::Orange => 1,
            ColorToken::Yellow => 2,
            ColorToken::Red => 3,
            ColorToken::Blue => 4,
            ColorToken::Green => 5,
            ColorToken::Purple => 6,
        }
    }

    pub fn from_digit(digit: u8) -> Option<ColorToken> {
        ColorToken::PALETTE
            .into_iter()
            .find(|color| color.digit() == digit)
    }

    pub fn hex(self) -> u32 {
        match self {
            ColorToken::Orange => 0xffa500,
            ColorToken::Yellow => 0xffff00,
            ColorToken::Red => 0xff0000,
            ColorToken::Blue => 0x0000ff,
            ColorToken::Green => 0x00ff00,
            ColorToken::Purple => 0x800080,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ColorToken::Orange => "orange",
            ColorToken::Yellow => "yellow",
            ColorToken::Red => "red",
            ColorToken::Blue => "blue",
            ColorToken::Green => "green",
            ColorToken::Purple => "purple",
        }
    }
}

/// a solved puzzle is painted this color
pub const SOLVED_HEX: u32 = 0x00ff00;

// ==================== Puzzle State ====================
/// `locked` only ever goes true -> false and `solved` only false -> true,
/// there is no method that reverses either
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PuzzleState {
    solved: bool,
    locked: bool,
}

impl PuzzleState {
    pub fn locked() -> Self {
        PuzzleState {
            solved: false,
            locked: true,
        }
    }

    pub fn unlocked() -> Self {
        PuzzleState::default()
    }

    pub fn is_solved(&self) -> bool {
        self.solved
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// returns true only on the call that actually unlocked
    pub fn unlock(&mut self) -> bool {
        std::mem::replace(&mut self.locked, false)
    }

    /// returns true only on the call that actually solved
    pub fn solve(&mut self) -> bool {
        self.locked = false;
        !std::mem::replace(&mut self.solved, true)
    }
}

// ==================== Scene ====================
/// Puzzle-facing handle for things the presentation layer draws
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SceneObject {
    Portal,
    Cube,
    Cage,
    RuneClue,
    Rune(usize),
    Terminal,
    Book(ColorToken),
    Door,
    Cabinet,
    CabinetDoor,
    Light(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageChannel {
    Portal,
    Book,
    Rune,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Vec3,
}

impl Transform {
    pub fn at(position: Vec3) -> Self {
        Transform {
            position,
            rotation: Vec3::ZERO,
        }
    }

    pub fn with_rotation(mut self, rotation: Vec3) -> Self {
        self.rotation = rotation;
        self
    }
}

/// How long a message stays on screen
pub const MESSAGE_DURATION_MS: u32 = 2000;

/// hanging lamps over the room, indexed 0..HANGING_LIGHTS
pub const HANGING_LIGHTS: usize = 4;
const FLASH_INTENSITY: f32 = 8.0;
const FLASH_RESTORE_MS: u32 = 200;

/// Everything the puzzles ask of the outside world
#[derive(Debug, Clone, PartialEq)]
pub enum SceneCommand {
    ShowMessage {
        channel: MessageChannel,
        text: String,
        duration_ms: u32,
    },
    /// spike a light, the sink returns it to its resting level afterwards
    FlashLight {
        light: usize,
        intensity: f32,
        restore_delay_ms: u32,
    },
    SetLightIntensity {
        light: usize,
        intensity: f32,
    },
    /// TABLE
    /// ┌──────────────┬──────────────────────────┐
    /// │ object       │ transform relative to    │
    /// ├──────────────┼──────────────────────────┤
    /// │ Book, Door   │ the room                 │
    /// │ CabinetDoor  │ the cabinet              │
    /// │ Rune         │ the cabinet door         │
    /// │ Cube         │ the table                │
    /// └──────────────┴──────────────────────────┘
    /// Books stay in room coordinates on and off the shelf.
    MoveObject {
        object: SceneObject,
        transform: Transform,
    },
    Recolor {
        object: SceneObject,
        color: u32,
    },
    SetEmissive {
        object: SceneObject,
        intensity: f32,
    },
    SetVisible {
        object: SceneObject,
        visible: bool,
    },
    ShowFacingDigit(u8),
    OpenDoor,
    OpenCabinet,
    OpenTerminal,
    CloseTerminal,
    ClearTerminal,
    PlayScare,
}

pub trait SceneSink {
    fn send(&mut self, command: SceneCommand);

    fn show_message(&mut self, channel: MessageChannel, text: &str) {
        self.send(SceneCommand::ShowMessage {
            channel,
            text: text.to_string(),
            duration_ms: MESSAGE_DURATION_MS,
        });
    }
}

/// Spikes every hanging lamp at once, the room's "something happened" cue
pub fn flash_all_lights(sink: &mut dyn SceneSink) {
    for light in 0..HANGING_LIGHTS {
        sink.send(SceneCommand::FlashLight {
            light,
            intensity: FLASH_INTENSITY,
            restore_delay_ms: FLASH_RESTORE_MS,
        });
    }
}

/// recording sink, what tests and headless runs use
impl SceneSink for Vec<SceneCommand> {
    fn send(&mut self, command: SceneCommand) {
        self.push(command);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digits_round_trip_through_palette() {
        for color in ColorToken::PALETTE {
            assert_eq!(ColorToken::from_digit(color.digit()), Some(color));
        }
        assert_eq!(ColorToken::from_digit(0), None);
        assert_eq!(ColorToken::from_digit(7), None);
    }

    #[test]
    fn puzzle_state_never_relocks() {
        let mut state = PuzzleState::locked();
        assert!(state.is_locked());
        assert!(state.unlock());
        assert!(!state.unlock());
        assert!(!state.is_locked());

        assert!(state.solve());
        assert!(!state.solve());
        assert!(state.is_solved());
        assert!(!state.is_locked());
    }

    #[test]
    fn solving_a_locked_puzzle_also_unlocks_it() {
        let mut state = PuzzleState::locked();
        state.solve();
        assert!(!state.is_locked());
    }

    #[test]
    fn show_message_uses_default_duration() {
        let mut sink: Vec<SceneCommand> = Vec::new();
        sink.show_message(MessageChannel::Rune, "hello");
        assert_eq!(
            sink,
            vec![SceneCommand::ShowMessage {
                channel: MessageChannel::Rune,
                text: "hello".into(),
                duration_ms: MESSAGE_DURATION_MS,
            }]
        );
    }
}
