use crate::engine::Vec3;
use crate::puzzle::{ColorToken, SceneCommand, SceneObject, SceneSink, Transform};
use std::f32::consts::{FRAC_PI_2, TAU};

/// TABLE
/// ┌──────────────────── Animation Flow ─────────────────────┐
/// │                                                         │
/// │  GameSession::tick()                                    │
/// │     └─► Animator::step()                                │
/// │           ├─► task.step(sink)  → Step::InProgress       │
/// │           │                      (task stays)           │
/// │           └─► task.step(sink)  → Step::Done(completion) │
/// │                                  (task dropped,         │
/// │                                   completion returned)  │
/// │                                                         │
/// └─────────────────────────────────────────────────────────┘
/// Tasks advance a fixed amount per call; the game loop calls at 60hz.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    InProgress,
    Done(Option<Completion>),
}

/// Finished animations the session reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    CabinetOpened,
    BookLanded(ColorToken),
    DoorOpened,
    ScareDue,
}

pub trait AnimationTask {
    fn step(&mut self, sink: &mut dyn SceneSink) -> Step;
    /// 0.0 at spawn, 1.0 when done
    fn progress(&self) -> f32;
}

/// At most one task per key is active
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnimationKey {
    CabinetSwing,
    BookFlight,
    PortalBlink,
    PortalPulse,
    DoorRise,
    Flicker(usize),
    Scare,
}

#[derive(Default)]
pub struct Animator {
    tasks: Vec<(AnimationKey, Box<dyn AnimationTask>)>,
}

impl Animator {
    /// Starts `task`; an active task under the same key is cancelled first.
    /// Returns whether something was replaced.
    pub fn spawn(&mut self, key: AnimationKey, task: impl AnimationTask + 'static) -> bool {
        let replaced = self.cancel(key);
        self.tasks.push((key, Box::new(task)));
        replaced
    }

    pub fn cancel(&mut self, key: AnimationKey) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|(active, _)| *active != key);
        self.tasks.len() != before
    }

    pub fn is_active(&self, key: AnimationKey) -> bool {
        self.tasks.iter().any(|(active, _)| *active == key)
    }

    pub fn progress(&self, key: AnimationKey) -> Option<f32> {
        self.tasks
            .iter()
            .find(|(active, _)| *active == key)
            .map(|(_, task)| task.progress())
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Steps every task once, in spawn order
    pub fn step(&mut self, sink: &mut dyn SceneSink) -> Vec<Completion> {
        let mut completions = Vec::new();
        self.tasks.retain_mut(|(_, task)| match task.step(sink) {
            Step::InProgress => true,
            Step::Done(completion) => {
                completions.extend(completion);
                false
            }
        });
        completions
    }
}

// ==================== Cabinet ====================
const CABINET_SWING_STEP: f32 = 0.02;
const CABINET_DOOR_POSITION: Vec3 = Vec3::new(0.0, 0.0, 0.35);

/// Haunted cabinet door creeping open a quarter turn
#[derive(Debug, Default)]
pub struct CabinetSwing {
    t: f32,
}

impl AnimationTask for CabinetSwing {
    fn step(&mut self, sink: &mut dyn SceneSink) -> Step {
        self.t += CABINET_SWING_STEP;
        let open = self.t >= FRAC_PI_2;
        let angle = if open { FRAC_PI_2 } else { self.t };
        sink.send(SceneCommand::MoveObject {
            object: SceneObject::CabinetDoor,
            transform: Transform::at(CABINET_DOOR_POSITION).with_rotation(Vec3::new(
                0.0, -angle, 0.0,
            )),
        });
        if open {
            Step::Done(Some(Completion::CabinetOpened))
        } else {
            Step::InProgress
        }
    }

    fn progress(&self) -> f32 {
        (self.t / FRAC_PI_2).min(1.0)
    }
}

// ==================== Book Flight ====================
const FLIGHT_LERP: f32 = 0.04;
const FLIGHT_T_STEP: f32 = 0.02;
const FLIGHT_BOB: f32 = 0.01;
const FLIGHT_LANDING_DISTANCE: f32 = 0.03;
// the bob can keep the book circling the slot for a while, past this it is
// snapped in
const FLIGHT_MAX_T: f32 = 12.0;

/// Missing book floating from the cabinet back to its shelf slot, in room
/// coordinates
#[derive(Debug)]
pub struct BookFlight {
    book: ColorToken,
    position: Vec3,
    rotation: Vec3,
    target: Vec3,
    start_distance: f32,
    t: f32,
}

impl BookFlight {
    pub fn new(book: ColorToken, from: Vec3, target: Vec3) -> Self {
        BookFlight {
            book,
            position: from,
            rotation: Vec3::ZERO,
            target,
            start_distance: from.distance_to(target),
            t: 0.0,
        }
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }
}

impl AnimationTask for BookFlight {
    fn step(&mut self, sink: &mut dyn SceneSink) -> Step {
        self.t += FLIGHT_T_STEP;
        self.position.y += (self.t * 3.0).sin() * FLIGHT_BOB;
        self.position = self.position.lerp(self.target, FLIGHT_LERP);
        self.rotation.x += 0.02;
        self.rotation.y += 0.015;

        let landed = self.position.distance_to(self.target) <= FLIGHT_LANDING_DISTANCE
            || self.t >= FLIGHT_MAX_T;
        if landed {
            self.position = self.target;
            self.rotation = Vec3::ZERO;
        }
        sink.send(SceneCommand::MoveObject {
            object: SceneObject::Book(self.book),
            transform: Transform::at(self.position).with_rotation(self.rotation),
        });
        if landed {
            Step::Done(Some(Completion::BookLanded(self.book)))
        } else {
            Step::InProgress
        }
    }

    fn progress(&self) -> f32 {
        if self.start_distance <= f32::EPSILON {
            return 1.0;
        }
        (1.0 - self.position.distance_to(self.target) / self.start_distance).clamp(0.0, 1.0)
    }
}

// ==================== Portal ====================
// 150ms at 60 updates a second
const BLINK_FRAMES: u32 = 9;
pub const PORTAL_REST_GLOW: f32 = 1.0;
pub const PORTAL_BLINK_GLOW: f32 = 2.0;

/// Portal glows brighter for a moment after a digit is entered
#[derive(Debug)]
pub struct PortalBlink {
    frames_left: u32,
}

impl Default for PortalBlink {
    fn default() -> Self {
        PortalBlink {
            frames_left: BLINK_FRAMES,
        }
    }
}

impl AnimationTask for PortalBlink {
    fn step(&mut self, sink: &mut dyn SceneSink) -> Step {
        self.frames_left = self.frames_left.saturating_sub(1);
        if self.frames_left > 0 {
            return Step::InProgress;
        }
        sink.send(SceneCommand::SetEmissive {
            object: SceneObject::Portal,
            intensity: PORTAL_REST_GLOW,
        });
        Step::Done(None)
    }

    fn progress(&self) -> f32 {
        1.0 - self.frames_left as f32 / BLINK_FRAMES as f32
    }
}

const PULSE_STEP: f32 = 0.05;

/// Portal throbbing once the code is right
#[derive(Debug, Default)]
pub struct PortalPulse {
    t: f32,
}

impl AnimationTask for PortalPulse {
    fn step(&mut self, sink: &mut dyn SceneSink) -> Step {
        self.t += PULSE_STEP;
        if self.t < TAU {
            sink.send(SceneCommand::SetEmissive {
                object: SceneObject::Portal,
                intensity: 1.5 + (self.t * 8.0).sin(),
            });
            return Step::InProgress;
        }
        sink.send(SceneCommand::SetEmissive {
            object: SceneObject::Portal,
            intensity: PORTAL_REST_GLOW,
        });
        Step::Done(None)
    }

    fn progress(&self) -> f32 {
        (self.t / TAU).min(1.0)
    }
}

// ==================== Exit Door ====================
const DOOR_STEP: f32 = 0.01;
const DOOR_BASE_Y: f32 = 0.5;
const DOOR_LIFT: f32 = 4.0;
const DOOR_Z: f32 = 4.95;

/// Exit door sliding up into the ceiling
#[derive(Debug, Default)]
pub struct DoorRise {
    progress: f32,
}

impl AnimationTask for DoorRise {
    fn step(&mut self, sink: &mut dyn SceneSink) -> Step {
        self.progress = (self.progress + DOOR_STEP).min(1.0);
        sink.send(SceneCommand::MoveObject {
            object: SceneObject::Door,
            transform: Transform::at(Vec3::new(
                0.0,
                DOOR_BASE_Y + self.progress * DOOR_LIFT,
                DOOR_Z,
            )),
        });
        if self.progress >= 1.0 {
            Step::Done(Some(Completion::DoorOpened))
        } else {
            Step::InProgress
        }
    }

    fn progress(&self) -> f32 {
        self.progress
    }
}

// ==================== Lights ====================
pub const LIGHT_BASE_INTENSITY: f32 = 4.0;

/// A hanging lamp stuttering for a few frames. Levels are rolled up front so
/// the task itself stays deterministic.
#[derive(Debug)]
pub struct Flicker {
    light: usize,
    levels: Vec<f32>,
    frame: usize,
}

impl Flicker {
    pub fn new(light: usize, levels: Vec<f32>) -> Self {
        Flicker {
            light,
            levels,
            frame: 0,
        }
    }
}

impl AnimationTask for Flicker {
    fn step(&mut self, sink: &mut dyn SceneSink) -> Step {
        let intensity = match self.levels.get(self.frame) {
            Some(level) => LIGHT_BASE_INTENSITY * level,
            None => LIGHT_BASE_INTENSITY,
        };
        self.frame += 1;
        sink.send(SceneCommand::SetLightIntensity {
            light: self.light,
            intensity,
        });
        if self.frame > self.levels.len() {
            Step::Done(None)
        } else {
            Step::InProgress
        }
    }

    fn progress(&self) -> f32 {
        self.frame as f32 / (self.levels.len() + 1) as f32
    }
}

/// Waits `frames` updates, then reports `completion`
#[derive(Debug)]
pub struct Countdown {
    frames: u32,
    frames_left: u32,
    completion: Completion,
}

impl Countdown {
    pub fn new(frames: u32, completion: Completion) -> Self {
        Countdown {
            frames,
            frames_left: frames,
            completion,
        }
    }
}

impl AnimationTask for Countdown {
    fn step(&mut self, _sink: &mut dyn SceneSink) -> Step {
        self.frames_left = self.frames_left.saturating_sub(1);
        if self.frames_left == 0 {
            Step::Done(Some(self.completion))
        } else {
            Step::InProgress
        }
    }

    fn progress(&self) -> f32 {
        if self.frames == 0 {
            return 1.0;
        }
        1.0 - self.frames_left as f32 / self.frames as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn run_to_end(task: &mut dyn AnimationTask, limit: usize) -> (usize, Option<Completion>) {
        let mut sink = Vec::new();
        for frame in 1..=limit {
            if let Step::Done(completion) = task.step(&mut sink) {
                return (frame, completion);
            }
        }
        panic!("animation did not finish in {} frames", limit);
    }

    #[test]
    fn cabinet_swings_a_quarter_turn() {
        let mut swing = CabinetSwing::default();
        let (frames, completion) = run_to_end(&mut swing, 200);
        assert_eq!(completion, Some(Completion::CabinetOpened));
        // pi/2 at 0.02 per frame
        assert!((78..=80).contains(&frames));
        assert_relative_eq!(swing.progress(), 1.0);
    }

    #[test]
    fn book_lands_exactly_on_target() {
        let from = Vec3::new(-2.2, -0.65, 4.5);
        let target = Vec3::new(4.8, -0.7, 1.1);
        let mut flight = BookFlight::new(ColorToken::Blue, from, target);
        let mut sink = Vec::new();
        let mut landed = None;
        for _ in 0..1000 {
            if let Step::Done(completion) = flight.step(&mut sink) {
                landed = completion;
                break;
            }
        }
        assert_eq!(landed, Some(Completion::BookLanded(ColorToken::Blue)));
        assert_eq!(flight.position(), target);
        assert_eq!(
            sink.last(),
            Some(&SceneCommand::MoveObject {
                object: SceneObject::Book(ColorToken::Blue),
                transform: Transform::at(target),
            })
        );
    }

    #[test]
    fn door_rises_four_units() {
        let mut door = DoorRise::default();
        let mut sink = Vec::new();
        let mut done = false;
        for _ in 0..200 {
            if door.step(&mut sink) == Step::Done(Some(Completion::DoorOpened)) {
                done = true;
                break;
            }
        }
        assert!(done);
        match sink.last() {
            Some(SceneCommand::MoveObject { transform, .. }) => {
                assert_relative_eq!(transform.position.y, 4.5, epsilon = 1e-4)
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn pulse_settles_back_to_rest() {
        let mut pulse = PortalPulse::default();
        let mut sink = Vec::new();
        while pulse.step(&mut sink) == Step::InProgress {}
        assert_eq!(
            sink.last(),
            Some(&SceneCommand::SetEmissive {
                object: SceneObject::Portal,
                intensity: PORTAL_REST_GLOW,
            })
        );
    }

    #[test]
    fn flicker_restores_base_intensity() {
        let mut flicker = Flicker::new(2, vec![0.5, 0.3]);
        let mut sink = Vec::new();
        while flicker.step(&mut sink) == Step::InProgress {}
        let levels: Vec<f32> = sink
            .iter()
            .filter_map(|command| match command {
                SceneCommand::SetLightIntensity { light: 2, intensity } => Some(*intensity),
                _ => None,
            })
            .collect();
        assert_eq!(levels.len(), 3);
        assert_relative_eq!(levels[0], 2.0);
        assert_relative_eq!(levels[1], 1.2, epsilon = 1e-6);
        assert_relative_eq!(levels[2], LIGHT_BASE_INTENSITY);
    }

    #[test]
    fn countdown_reports_after_frames() {
        let mut countdown = Countdown::new(3, Completion::ScareDue);
        let (frames, completion) = run_to_end(&mut countdown, 10);
        assert_eq!(frames, 3);
        assert_eq!(completion, Some(Completion::ScareDue));
    }

    #[test]
    fn spawning_same_key_replaces_task() {
        let mut animator = Animator::default();
        assert!(!animator.spawn(AnimationKey::PortalBlink, PortalBlink::default()));
        assert!(animator.spawn(AnimationKey::PortalBlink, PortalBlink::default()));
        assert_eq!(animator.len(), 1);
    }

    #[test]
    fn cancel_removes_task_without_completion() {
        let mut animator = Animator::default();
        animator.spawn(AnimationKey::Scare, Countdown::new(1, Completion::ScareDue));
        assert!(animator.cancel(AnimationKey::Scare));
        assert!(!animator.cancel(AnimationKey::Scare));
        let mut sink = Vec::new();
        assert!(animator.step(&mut sink).is_empty());
    }

    #[test]
    fn animator_collects_completions_and_drops_finished() {
        let mut animator = Animator::default();
        animator.spawn(AnimationKey::Scare, Countdown::new(1, Completion::ScareDue));
        animator.spawn(AnimationKey::DoorRise, DoorRise::default());
        let mut sink = Vec::new();

        assert_eq!(animator.step(&mut sink), vec![Completion::ScareDue]);
        assert!(!animator.is_active(AnimationKey::Scare));
        assert!(animator.is_active(AnimationKey::DoorRise));
        assert_relative_eq!(
            animator.progress(AnimationKey::DoorRise).unwrap_or_default(),
            0.01
        );
    }
}
