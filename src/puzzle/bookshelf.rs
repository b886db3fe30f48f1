use super::{
    ColorToken, MessageChannel, PuzzleState, SceneCommand, SceneObject, SceneSink, Transform,
    SOLVED_HEX,
};
use crate::engine::Vec3;
use std::f32::consts::FRAC_PI_2;

pub const SHELF_SLOTS: usize = 5;

// shelf-local slot layout, books stand in a row along x
const SLOT_ORIGIN_X: f32 = -0.8;
const SLOT_SPACING: f32 = 0.45;
const SLOT_Y: f32 = 0.5;
const SLOT_Z: f32 = 0.1;

// the shelf hangs on the right wall, turned to face the room
const SHELF_POSITION: Vec3 = Vec3::new(4.9, -1.2, 1.0);
const SHELF_YAW: f32 = -FRAC_PI_2;

const MISSING_BOOK_HINT: &str = "One book is missing... find it first";

/// What a click on a shelved book ended up doing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectOutcome {
    /// the shelf is still waiting for its missing book
    MissingBook,
    Selected,
    Deselected,
    Swapped { solved: bool },
    Ignored,
}

/// One line of the clue paper above the shelf
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StroopLine {
    /// the color the word names
    pub word: ColorToken,
    /// the color it is printed in, the one that counts
    pub ink: ColorToken,
}

/// Stroop bookshelf: put the books in the order of the clue's *ink* colors.
///
/// Books move by swapping two of them. The shelf starts locked with one slot
/// empty, the missing book unlocks it when placed.
#[derive(Debug, Clone)]
pub struct Bookshelf {
    slots: Vec<Option<ColorToken>>,
    target: Vec<ColorToken>,
    missing: Option<(usize, ColorToken)>,
    selected: Option<ColorToken>,
    state: PuzzleState,
}

impl Bookshelf {
    /// Full shelf, interactive right away
    pub fn complete(arrangement: Vec<ColorToken>, target: Vec<ColorToken>) -> Self {
        Bookshelf {
            slots: arrangement.into_iter().map(Some).collect(),
            target,
            missing: None,
            selected: None,
            state: PuzzleState::unlocked(),
        }
    }

    /// Shelf with the book at `missing_slot` taken away, locked until it is
    /// placed back
    pub fn with_missing(
        arrangement: Vec<ColorToken>,
        target: Vec<ColorToken>,
        missing_slot: usize,
    ) -> Self {
        let mut slots: Vec<Option<ColorToken>> = arrangement.into_iter().map(Some).collect();
        let missing = slots
            .get_mut(missing_slot)
            .and_then(|slot| slot.take())
            .map(|book| (missing_slot, book));
        Bookshelf {
            slots,
            target,
            missing,
            selected: None,
            state: if missing.is_some() {
                PuzzleState::locked()
            } else {
                PuzzleState::unlocked()
            },
        }
    }

    pub fn missing_book(&self) -> Option<ColorToken> {
        self.missing.map(|(_, book)| book)
    }

    pub fn contains(&self, book: ColorToken) -> bool {
        self.position_of(book).is_some()
    }

    pub fn slots(&self) -> &[Option<ColorToken>] {
        &self.slots
    }

    pub fn selected(&self) -> Option<ColorToken> {
        self.selected
    }

    pub fn target(&self) -> &[ColorToken] {
        &self.target
    }

    pub fn is_unlocked(&self) -> bool {
        !self.state.is_locked()
    }

    pub fn is_solved(&self) -> bool {
        self.state.is_solved()
    }

    /// Clue paper, top to bottom. The inks spell the target order, the
    /// words never match their ink.
    pub fn stroop_clue(&self) -> Vec<StroopLine> {
        self.target
            .iter()
            .map(|ink| StroopLine {
                word: misleading_word(*ink),
                ink: *ink,
            })
            .collect()
    }

    /// Books on the shelf left to right, gaps skipped
    pub fn arrangement(&self) -> Vec<ColorToken> {
        self.slots.iter().flatten().copied().collect()
    }

    /// Puts the missing book back in its slot and unlocks the shelf. A shelf
    /// that is complete in the target order is solved right away.
    pub fn place(&mut self, book: ColorToken, sink: &mut dyn SceneSink) -> bool {
        let Some((slot, expected)) = self.missing else {
            return false;
        };
        if expected != book {
            return false;
        }
        self.slots[slot] = Some(book);
        self.missing = None;
        self.state.unlock();
        sink.send(SceneCommand::MoveObject {
            object: SceneObject::Book(book),
            transform: slot_transform(slot),
        });
        log!("Bookshelf puzzle is now active!");
        self.check(sink);
        true
    }

    /// Two-click protocol: pick a book, then pick the one to swap it with.
    /// Picking the selected book again puts it down.
    pub fn select(&mut self, book: ColorToken, sink: &mut dyn SceneSink) -> SelectOutcome {
        if self.state.is_locked() {
            sink.show_message(MessageChannel::Book, MISSING_BOOK_HINT);
            return SelectOutcome::MissingBook;
        }
        if self.state.is_solved() || !self.contains(book) {
            return SelectOutcome::Ignored;
        }
        match self.selected.take() {
            None => {
                self.selected = Some(book);
                SelectOutcome::Selected
            }
            Some(picked) if picked == book => SelectOutcome::Deselected,
            Some(picked) => SelectOutcome::Swapped {
                solved: self.attempt_swap(picked, book, sink),
            },
        }
    }

    /// Swaps two shelved books and checks the order. Returns true on the swap
    /// that solves the shelf.
    pub fn attempt_swap(&mut self, a: ColorToken, b: ColorToken, sink: &mut dyn SceneSink) -> bool {
        if self.state.is_locked() || self.state.is_solved() {
            return false;
        }
        let (Some(slot_a), Some(slot_b)) = (self.position_of(a), self.position_of(b)) else {
            return false;
        };
        if slot_a == slot_b {
            return false;
        }
        self.slots.swap(slot_a, slot_b);
        sink.send(SceneCommand::MoveObject {
            object: SceneObject::Book(a),
            transform: slot_transform(slot_b),
        });
        sink.send(SceneCommand::MoveObject {
            object: SceneObject::Book(b),
            transform: slot_transform(slot_a),
        });
        self.check(sink)
    }

    fn check(&mut self, sink: &mut dyn SceneSink) -> bool {
        let in_order = self.slots.len() == self.target.len()
            && self
                .slots
                .iter()
                .zip(&self.target)
                .all(|(slot, want)| *slot == Some(*want));
        if !in_order || !self.state.solve() {
            return false;
        }
        for book in self.arrangement() {
            sink.send(SceneCommand::Recolor {
                object: SceneObject::Book(book),
                color: SOLVED_HEX,
            });
        }
        log!("Bookshelf puzzle solved! Cube unlocked.");
        true
    }

    fn position_of(&self, book: ColorToken) -> Option<usize> {
        self.slots.iter().position(|slot| *slot == Some(book))
    }
}

/// TABLE
/// ┌────────┬────────┐
/// │ ink    │ word   │
/// ├────────┼────────┤
/// │ orange │ RED    │
/// │ yellow │ BLUE   │
/// │ purple │ ORANGE │
/// │ blue   │ YELLOW │
/// │ red    │ PURPLE │
/// │ green  │ RED    │
/// └────────┴────────┘
fn misleading_word(ink: ColorToken) -> ColorToken {
    match ink {
        ColorToken::Orange => ColorToken::Red,
        ColorToken::Yellow => ColorToken::Blue,
        ColorToken::Purple => ColorToken::Orange,
        ColorToken::Blue => ColorToken::Yellow,
        ColorToken::Red => ColorToken::Purple,
        ColorToken::Green => ColorToken::Red,
    }
}

fn slot_local_position(slot: usize) -> Vec3 {
    Vec3::new(SLOT_ORIGIN_X + slot as f32 * SLOT_SPACING, SLOT_Y, SLOT_Z)
}

/// Slot `slot` in room coordinates. The shelf is turned -90° about y, which
/// maps local (x, y, z) to (-z, y, x).
pub fn slot_world_position(slot: usize) -> Vec3 {
    let local = slot_local_position(slot);
    Vec3::new(
        SHELF_POSITION.x - local.z,
        SHELF_POSITION.y + local.y,
        SHELF_POSITION.z + local.x,
    )
}

/// Where a book stands in slot `slot`, room coordinates, turned with the shelf
pub fn slot_transform(slot: usize) -> Transform {
    Transform::at(slot_world_position(slot)).with_rotation(Vec3::new(0.0, SHELF_YAW, 0.0))
}
