use super::{ColorToken, PuzzleState, SceneCommand, SceneObject, SceneSink};
use crate::rng::SessionRng;

/// The color-memory lock on the portal.
///
/// Stays locked (no digits accepted) until the bookshelf is solved. Digits
/// come from whichever cube face points at the player, the lock itself never
/// looks at the cube.
#[derive(Debug, Clone)]
pub struct CubeLock {
    code: Vec<u8>,
    input: Vec<u8>,
    state: PuzzleState,
}

impl CubeLock {
    pub fn new(code: Vec<u8>) -> Self {
        CubeLock {
            code,
            input: Vec::new(),
            state: PuzzleState::locked(),
        }
    }

    /// Draws `length` clue colors from the palette, the code is their digits
    pub fn generate(rng: &mut SessionRng, length: usize) -> Self {
        let code = (0..length)
            .filter_map(|_| rng.pick(&ColorToken::PALETTE))
            .map(ColorToken::digit)
            .collect();
        CubeLock::new(code)
    }

    pub fn code(&self) -> &[u8] {
        &self.code
    }

    /// clue wall colors, in code order
    pub fn clue_colors(&self) -> Vec<ColorToken> {
        self.code
            .iter()
            .filter_map(|digit| ColorToken::from_digit(*digit))
            .collect()
    }

    pub fn input(&self) -> &[u8] {
        &self.input
    }

    pub fn is_locked(&self) -> bool {
        self.state.is_locked()
    }

    pub fn is_solved(&self) -> bool {
        self.state.is_solved()
    }

    /// Lifts the cage off the cube, happens once
    pub fn unlock(&mut self, sink: &mut dyn SceneSink) -> bool {
        if !self.state.unlock() {
            return false;
        }
        sink.send(SceneCommand::SetVisible {
            object: SceneObject::Cage,
            visible: false,
        });
        log!("Cube unlocked");
        true
    }

    /// Appends a digit; ignored while locked, after solve, or outside 1..=6
    pub fn enter_digit(&mut self, digit: u8) -> bool {
        if self.state.is_locked() || self.state.is_solved() {
            return false;
        }
        if ColorToken::from_digit(digit).is_none() {
            return false;
        }
        self.input.push(digit);
        log!("Entered: {} -> {:?}", digit, self.input);
        true
    }

    /// Checks the entered digits; a mismatch wipes them
    pub fn confirm(&mut self, sink: &mut dyn SceneSink) -> bool {
        if self.state.is_locked() || self.state.is_solved() {
            return false;
        }
        if self.matches(&self.input) {
            self.solve(sink);
            true
        } else {
            log!("wrong code. Try again!!");
            self.input.clear();
            false
        }
    }

    pub fn reset(&mut self) {
        self.input.clear();
        log!("code reset");
    }

    /// Terminal entry, the whole code typed as text. Any non-digit character
    /// makes the attempt a mismatch.
    pub fn submit_code(&mut self, text: &str, sink: &mut dyn SceneSink) -> bool {
        if self.state.is_solved() {
            return false;
        }
        let accepted = !self.state.is_locked()
            && parse_code(text).is_some_and(|digits| self.matches(&digits));
        if accepted {
            sink.send(SceneCommand::CloseTerminal);
            self.solve(sink);
        } else {
            sink.send(SceneCommand::ClearTerminal);
        }
        accepted
    }

    fn matches(&self, candidate: &[u8]) -> bool {
        candidate == self.code.as_slice()
    }

    fn solve(&mut self, sink: &mut dyn SceneSink) {
        if self.state.solve() {
            self.input.clear();
            sink.send(SceneCommand::OpenDoor);
            log!("Cube puzzle solved! Door opening...");
        }
    }
}

fn parse_code(text: &str) -> Option<Vec<u8>> {
    text.trim()
        .chars()
        .map(|c| c.to_digit(10).map(|digit| digit as u8))
        .collect()
}
