use super::{
    MessageChannel, PuzzleState, SceneCommand, SceneObject, SceneSink, Transform, SOLVED_HEX,
};
use crate::engine::Vec3;

pub const RUNE_COUNT: usize = 3;

/// resting colors in press order: red, violet, teal. The clue paper shows them
/// in this order.
pub const RUNE_COLORS: [u32; RUNE_COUNT] = [0xff0000, 0x5500ff, 0x00ffaa];
const RUNE_HINT: &str = "Maybe I can use this code somewhere....";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuneClick {
    Ignored,
    /// right rune, `next` is now expected
    Advanced { next: usize },
    Solved,
    Reset,
}

/// Three runes on the cabinet door, pressed in index order.
///
/// State only moves forward on the expected index; any other press drops
/// every rune back to unlit and waits for rune 0 again.
#[derive(Debug, Clone, Default)]
pub struct RuneSequence {
    activated: [bool; RUNE_COUNT],
    next_expected: usize,
    state: PuzzleState,
}

impl RuneSequence {
    pub fn new() -> Self {
        RuneSequence::default()
    }

    pub fn activated(&self) -> &[bool; RUNE_COUNT] {
        &self.activated
    }

    pub fn next_expected(&self) -> usize {
        self.next_expected
    }

    pub fn is_solved(&self) -> bool {
        self.state.is_solved()
    }

    pub fn click(&mut self, index: usize, sink: &mut dyn SceneSink) -> RuneClick {
        if self.state.is_solved() {
            return RuneClick::Ignored;
        }
        sink.show_message(MessageChannel::Rune, RUNE_HINT);

        if index != self.next_expected {
            self.reset(sink);
            return RuneClick::Reset;
        }

        self.activated[index] = true;
        self.next_expected += 1;
        sink.send(SceneCommand::Recolor {
            object: SceneObject::Rune(index),
            color: SOLVED_HEX,
        });

        if self.next_expected == RUNE_COUNT {
            self.state.solve();
            log!("Haunted shelf solved!");
            RuneClick::Solved
        } else {
            RuneClick::Advanced {
                next: self.next_expected,
            }
        }
    }

    fn reset(&mut self, sink: &mut dyn SceneSink) {
        self.activated = [false; RUNE_COUNT];
        self.next_expected = 0;
        for (index, color) in RUNE_COLORS.iter().enumerate() {
            sink.send(SceneCommand::Recolor {
                object: SceneObject::Rune(index),
                color: *color,
            });
        }
    }
}

/// Resting spot of a rune on the cabinet door, door-local
pub fn rest_transform(index: usize) -> Transform {
    Transform::at(Vec3::new(-0.4 + index as f32 * 0.4, 0.0, 0.46))
}

pub fn rune_color(index: usize) -> Option<u32> {
    RUNE_COLORS.get(index).copied()
}
