use crate::animation::{
    AnimationKey, Animator, BookFlight, CabinetSwing, Completion, Countdown, DoorRise, Flicker,
    PortalBlink, PortalPulse, PORTAL_BLINK_GLOW,
};
use crate::config::RoomConfig;
use crate::dispatch::{dispatch, Gates, HandlerKind, ObjectId, ObjectTable};
use crate::engine::Vec3;
use crate::input::{hold, key_intent, spin_key, Intent};
use crate::puzzle::bookshelf::slot_world_position;
use crate::puzzle::runes::{rest_transform, RUNE_COUNT};
use crate::puzzle::{
    flash_all_lights, Bookshelf, ColorToken, CubeLock, CubeOrientation, CubeSpin, ItemStage,
    MessageChannel, MissingItem, RuneClick, RuneSequence, SceneCommand, SceneObject, SceneSink,
    SelectOutcome, Transform, HANGING_LIGHTS,
};
use crate::rng::SessionRng;

const PORTAL_LOCKED_HINT: &str = "The portal is inactive... solve the bookshelf first.";
const RUNE_CLUE_HINT: &str = "Maybe this code is used somewhere...";

// cube sits on the table, table-local
const CUBE_POSITION: Vec3 = Vec3::new(0.4, 0.35, 0.0);
// just inside the haunted cabinet, room coordinates
const CABINET_INTERIOR: Vec3 = Vec3::new(-2.2, -0.65, 4.85);

// below this the player is not looking at the cabinet
const LOOK_THRESHOLD: f32 = 0.97;
const RUNE_JITTER: f32 = 0.0075;
const RUNE_SPIN_JITTER: f32 = 0.02;

const FLICKER_CHANCE: f32 = 0.01;
const FLICKER_MIN_FRAMES: u32 = 5;
const FLICKER_MAX_FRAMES: u32 = 15;
const FLICKER_MIN_LEVEL: f32 = 0.3;

// 5 to 15 seconds at 60 updates a second
const SCARE_MIN_FRAMES: u32 = 300;
const SCARE_MAX_FRAMES: u32 = 900;

/// ELI5:
/// ┌───────────────────── One Session ─────────────────────┐
/// │                                                       │
/// │  runes ──solved──► missing book revealed, cabinet     │
/// │                    swings open                        │
/// │  book collected ──flight lands──► bookshelf unlocked  │
/// │                  (solved if already in target order)  │
/// │  bookshelf ──solved──► cube unlocked, cage hidden     │
/// │  cube code ──confirmed──► portal pulses, door rises   │
/// │                                                       │
/// └───────────────────────────────────────────────────────┘
/// Owns every puzzle and everything that moves. Input arrives through the
/// methods below, the browser loop calls [`GameSession::tick`] at 60hz and
/// every visible change leaves through the [`SceneSink`].
pub struct GameSession {
    cube: CubeLock,
    shelf: Bookshelf,
    missing: MissingItem,
    missing_slot: usize,
    runes: RuneSequence,
    orientation: CubeOrientation,
    spin: CubeSpin,
    facing: u8,
    objects: ObjectTable,
    animator: Animator,
    rng: SessionRng,
    look_alignment: f32,
    rune_spin: [f32; RUNE_COUNT],
    runes_at_rest: bool,
    terminal_open: bool,
    entered: bool,
    door_open: bool,
}

impl GameSession {
    pub fn new(config: &RoomConfig, mut rng: SessionRng) -> Self {
        let config = match config.validate() {
            Ok(()) => config.clone(),
            Err(err) => {
                warn!("room config rejected, using defaults : {:#}", err);
                RoomConfig::default()
            }
        };
        let cube = match &config.code {
            Some(code) => CubeLock::new(code.clone()),
            None => CubeLock::generate(&mut rng, config.code_length),
        };
        log!("Current cube puzzle code (for testing): {:?}", cube.code());

        // validate() guarantees the slot is on the shelf
        let book = config.start_order[config.missing_slot];
        let shelf = Bookshelf::with_missing(
            config.start_order.clone(),
            config.target_order.clone(),
            config.missing_slot,
        );
        let objects = ObjectTable::standard(&config.start_order, Some(book));
        let orientation = CubeOrientation::default();

        GameSession {
            cube,
            shelf,
            missing: MissingItem::new(book),
            missing_slot: config.missing_slot,
            runes: RuneSequence::new(),
            facing: orientation.facing_digit(),
            orientation,
            spin: CubeSpin::default(),
            objects,
            animator: Animator::default(),
            rng,
            look_alignment: 0.0,
            rune_spin: [0.0; RUNE_COUNT],
            runes_at_rest: true,
            terminal_open: false,
            entered: false,
            door_open: false,
        }
    }

    // ==================== Accessors ====================
    pub fn cube(&self) -> &CubeLock {
        &self.cube
    }

    pub fn shelf(&self) -> &Bookshelf {
        &self.shelf
    }

    pub fn missing_item(&self) -> &MissingItem {
        &self.missing
    }

    pub fn runes(&self) -> &RuneSequence {
        &self.runes
    }

    pub fn orientation(&self) -> CubeOrientation {
        self.orientation
    }

    pub fn facing_digit(&self) -> u8 {
        self.facing
    }

    pub fn objects(&self) -> &ObjectTable {
        &self.objects
    }

    pub fn animator(&self) -> &Animator {
        &self.animator
    }

    pub fn terminal_open(&self) -> bool {
        self.terminal_open
    }

    pub fn door_open(&self) -> bool {
        self.door_open
    }

    // ==================== Input ====================
    /// Player walked in: show the cube's starting face and arm the scare.
    /// Only the first call does anything.
    pub fn enter_room(&mut self, sink: &mut dyn SceneSink) {
        if std::mem::replace(&mut self.entered, true) {
            return;
        }
        self.show_facing(sink);
        let delay = self.rng.range_u32(SCARE_MIN_FRAMES, SCARE_MAX_FRAMES + 1);
        self.animator.spawn(
            AnimationKey::Scare,
            Countdown::new(delay, Completion::ScareDue),
        );
    }

    /// How directly the camera faces the cabinet, 1.0 is dead on
    pub fn set_look_alignment(&mut self, alignment: f32) {
        self.look_alignment = alignment.clamp(-1.0, 1.0);
    }

    pub fn handle(&mut self, intent: Intent, sink: &mut dyn SceneSink) -> Option<HandlerKind> {
        match intent {
            Intent::Select(hits) => return self.pointer_click(&hits, sink),
            Intent::EnterDigit(digit) => self.enter_digit(digit, sink),
            Intent::Confirm => {
                if self.cube.confirm(sink) {
                    self.on_cube_solved();
                }
            }
            Intent::Reset => self.cube.reset(),
        }
        None
    }

    pub fn key_down(&mut self, code: &str, sink: &mut dyn SceneSink) {
        if let Some(key) = spin_key(code) {
            hold(&mut self.spin, key, true);
            return;
        }
        if let Some(intent) = key_intent(code, self.orientation.facing_digit()) {
            self.handle(intent, sink);
        }
    }

    pub fn key_up(&mut self, code: &str) {
        if let Some(key) = spin_key(code) {
            hold(&mut self.spin, key, false);
        }
    }

    /// Routes a click to the first handler that claims one of `hits`
    pub fn pointer_click(
        &mut self,
        hits: &[ObjectId],
        sink: &mut dyn SceneSink,
    ) -> Option<HandlerKind> {
        let claim = dispatch(hits, &self.objects, &*self)?;
        match (claim.handler, claim.object) {
            (HandlerKind::Portal, _) => {
                if self.cube.is_locked() {
                    sink.show_message(MessageChannel::Portal, PORTAL_LOCKED_HINT);
                } else {
                    log!("Portal active!");
                }
            }
            (HandlerKind::RuneClue, _) => sink.show_message(MessageChannel::Rune, RUNE_CLUE_HINT),
            (HandlerKind::Rune, SceneObject::Rune(index)) => self.click_rune(index, sink),
            (HandlerKind::Terminal, _) => {
                self.terminal_open = true;
                sink.send(SceneCommand::OpenTerminal);
            }
            (HandlerKind::MissingItem, _) => self.collect_missing(sink),
            (HandlerKind::Bookshelf, SceneObject::Book(book)) => self.select_book(book, sink),
            _ => {}
        }
        Some(claim.handler)
    }

    /// Code typed into the terminal
    pub fn submit_code(&mut self, text: &str, sink: &mut dyn SceneSink) -> bool {
        if !self.cube.submit_code(text, sink) {
            return false;
        }
        self.terminal_open = false;
        self.on_cube_solved();
        true
    }

    pub fn cancel_terminal(&mut self, sink: &mut dyn SceneSink) {
        if std::mem::replace(&mut self.terminal_open, false) {
            sink.send(SceneCommand::CloseTerminal);
        }
    }

    // ==================== Frame ====================
    /// One fixed update
    pub fn tick(&mut self, sink: &mut dyn SceneSink) {
        if !self.cube.is_locked() && self.orientation.rotate(self.spin) {
            sink.send(SceneCommand::MoveObject {
                object: SceneObject::Cube,
                transform: Transform::at(CUBE_POSITION).with_rotation(self.orientation.as_vec3()),
            });
        }
        let facing = self.orientation.facing_digit();
        if facing != self.facing {
            self.facing = facing;
            self.show_facing(sink);
        }

        self.twitch_runes(sink);
        self.roll_flickers();

        for completion in self.animator.step(sink) {
            self.on_completion(completion, sink);
        }
    }

    fn on_completion(&mut self, completion: Completion, sink: &mut dyn SceneSink) {
        match completion {
            Completion::CabinetOpened => {
                sink.send(SceneCommand::SetVisible {
                    object: SceneObject::Book(self.missing.book()),
                    visible: true,
                });
            }
            Completion::BookLanded(_) => {
                // a shelf that starts in target order is solved by the placing
                if self.missing.place(&mut self.shelf, sink) && self.shelf.is_solved() {
                    self.cube.unlock(sink);
                }
            }
            Completion::DoorOpened => {
                self.door_open = true;
                log!("The door is open");
            }
            Completion::ScareDue => sink.send(SceneCommand::PlayScare),
        }
    }

    // ==================== Puzzle glue ====================
    fn enter_digit(&mut self, digit: u8, sink: &mut dyn SceneSink) {
        if !self.cube.enter_digit(digit) {
            return;
        }
        sink.send(SceneCommand::SetEmissive {
            object: SceneObject::Portal,
            intensity: PORTAL_BLINK_GLOW,
        });
        self.animator
            .spawn(AnimationKey::PortalBlink, PortalBlink::default());
    }

    fn on_cube_solved(&mut self) {
        // the pulse owns the portal glow from here on
        self.animator.cancel(AnimationKey::PortalBlink);
        self.animator
            .spawn(AnimationKey::PortalPulse, PortalPulse::default());
        self.animator.spawn(AnimationKey::DoorRise, DoorRise::default());
    }

    fn click_rune(&mut self, index: usize, sink: &mut dyn SceneSink) {
        if self.runes.click(index, sink) != RuneClick::Solved {
            return;
        }
        self.missing.reveal();
        flash_all_lights(sink);
        sink.send(SceneCommand::OpenCabinet);
        self.animator
            .spawn(AnimationKey::CabinetSwing, CabinetSwing::default());
        self.rest_runes(sink);
    }

    fn collect_missing(&mut self, sink: &mut dyn SceneSink) {
        if !self.missing.collect(sink) {
            return;
        }
        self.animator.spawn(
            AnimationKey::BookFlight,
            BookFlight::new(
                self.missing.book(),
                CABINET_INTERIOR,
                slot_world_position(self.missing_slot),
            ),
        );
    }

    fn select_book(&mut self, book: ColorToken, sink: &mut dyn SceneSink) {
        if self.shelf.select(book, sink) == (SelectOutcome::Swapped { solved: true }) {
            self.cube.unlock(sink);
        }
    }

    fn show_facing(&self, sink: &mut dyn SceneSink) {
        if let Some(color) = ColorToken::from_digit(self.facing) {
            sink.send(SceneCommand::Recolor {
                object: SceneObject::Portal,
                color: color.hex(),
            });
        }
        sink.send(SceneCommand::ShowFacingDigit(self.facing));
    }

    // ==================== Ambient ====================
    fn twitch_runes(&mut self, sink: &mut dyn SceneSink) {
        if self.runes.is_solved() {
            return;
        }
        if self.look_alignment >= LOOK_THRESHOLD {
            if !self.runes_at_rest {
                self.rest_runes(sink);
            }
            return;
        }
        self.runes_at_rest = false;
        for index in 0..RUNE_COUNT {
            let rest = rest_transform(index).position;
            let position = Vec3::new(
                rest.x + self.rng.range_f32(-RUNE_JITTER, RUNE_JITTER),
                rest.y + self.rng.range_f32(-RUNE_JITTER, RUNE_JITTER),
                rest.z,
            );
            self.rune_spin[index] += self.rng.range_f32(-RUNE_SPIN_JITTER, RUNE_SPIN_JITTER);
            sink.send(SceneCommand::MoveObject {
                object: SceneObject::Rune(index),
                transform: Transform::at(position).with_rotation(Vec3::new(
                    0.0,
                    0.0,
                    self.rune_spin[index],
                )),
            });
        }
    }

    fn rest_runes(&mut self, sink: &mut dyn SceneSink) {
        self.runes_at_rest = true;
        self.rune_spin = [0.0; RUNE_COUNT];
        for index in 0..RUNE_COUNT {
            sink.send(SceneCommand::MoveObject {
                object: SceneObject::Rune(index),
                transform: rest_transform(index),
            });
        }
    }

    fn roll_flickers(&mut self) {
        for light in 0..HANGING_LIGHTS {
            let key = AnimationKey::Flicker(light);
            if self.animator.is_active(key) || !self.rng.chance(FLICKER_CHANCE) {
                continue;
            }
            let frames = self
                .rng
                .range_u32(FLICKER_MIN_FRAMES, FLICKER_MAX_FRAMES + 1);
            let levels = (0..frames)
                .map(|_| self.rng.range_f32(FLICKER_MIN_LEVEL, 1.0))
                .collect();
            self.animator.spawn(key, Flicker::new(light, levels));
        }
    }
}

impl Gates for GameSession {
    fn runes_solved(&self) -> bool {
        self.runes.is_solved()
    }

    fn missing_item_collected(&self) -> bool {
        matches!(
            self.missing.stage(),
            ItemStage::Collected | ItemStage::Placed
        )
    }

    fn shelf_locked(&self) -> bool {
        !self.shelf.is_unlocked()
    }

    fn on_shelf(&self, book: ColorToken) -> bool {
        self.shelf.contains(book)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::puzzle::ColorToken::{Blue, Orange, Purple, Yellow};

    const CODE: [u8; 6] = [3, 1, 4, 1, 5, 6];

    fn session() -> GameSession {
        let config = RoomConfig {
            code: Some(CODE.to_vec()),
            ..RoomConfig::default()
        };
        GameSession::new(&config, SessionRng::from_seed(7))
    }

    fn click(
        session: &mut GameSession,
        object: SceneObject,
        sink: &mut Vec<SceneCommand>,
    ) -> Option<HandlerKind> {
        let id = session.objects().id_of(object).expect("object is tagged");
        session.pointer_click(&[id], sink)
    }

    fn tick_until(
        session: &mut GameSession,
        sink: &mut Vec<SceneCommand>,
        limit: usize,
        done: impl Fn(&GameSession) -> bool,
    ) -> bool {
        for _ in 0..limit {
            session.tick(sink);
            if done(session) {
                return true;
            }
        }
        false
    }

    fn solve_runes(session: &mut GameSession, sink: &mut Vec<SceneCommand>) {
        for index in 0..RUNE_COUNT {
            click(session, SceneObject::Rune(index), sink);
        }
    }

    fn unlock_cube(session: &mut GameSession) {
        let mut sink = Vec::new();
        session.cube.unlock(&mut sink);
    }

    #[test]
    fn full_playthrough_opens_the_door() {
        let mut session = session();
        let mut sink = Vec::new();
        session.enter_room(&mut sink);

        solve_runes(&mut session, &mut sink);
        assert!(session.runes().is_solved());
        assert_eq!(session.missing_item().stage(), ItemStage::Revealed);
        assert!(sink.contains(&SceneCommand::OpenCabinet));

        sink.clear();
        assert!(tick_until(&mut session, &mut sink, 200, |session| {
            !session.animator().is_active(AnimationKey::CabinetSwing)
        }));
        assert!(sink.contains(&SceneCommand::SetVisible {
            object: SceneObject::Book(Blue),
            visible: true,
        }));

        assert_eq!(
            click(&mut session, SceneObject::Book(Blue), &mut sink),
            Some(HandlerKind::MissingItem)
        );
        assert_eq!(session.missing_item().stage(), ItemStage::Collected);
        assert!(tick_until(&mut session, &mut sink, 1000, |session| {
            session.shelf().is_unlocked()
        }));
        assert_eq!(session.missing_item().stage(), ItemStage::Placed);

        for (a, b) in [(Purple, Orange), (Purple, Yellow), (Blue, Purple)] {
            click(&mut session, SceneObject::Book(a), &mut sink);
            click(&mut session, SceneObject::Book(b), &mut sink);
        }
        assert!(session.shelf().is_solved());
        assert!(!session.cube().is_locked());

        for digit in CODE {
            session.handle(Intent::EnterDigit(digit), &mut sink);
        }
        session.handle(Intent::Confirm, &mut sink);
        assert!(session.cube().is_solved());
        assert!(sink.contains(&SceneCommand::OpenDoor));

        assert!(tick_until(&mut session, &mut sink, 200, |session| {
            session.door_open()
        }));
    }

    #[test]
    fn locked_portal_explains_itself() {
        let mut session = session();
        let mut sink = Vec::new();
        assert_eq!(
            click(&mut session, SceneObject::Portal, &mut sink),
            Some(HandlerKind::Portal)
        );
        assert_eq!(
            sink,
            vec![SceneCommand::ShowMessage {
                channel: MessageChannel::Portal,
                text: PORTAL_LOCKED_HINT.into(),
                duration_ms: crate::puzzle::MESSAGE_DURATION_MS,
            }]
        );
    }

    #[test]
    fn rune_clue_shows_hint() {
        let mut session = session();
        let mut sink = Vec::new();
        click(&mut session, SceneObject::RuneClue, &mut sink);
        assert!(matches!(
            &sink[..],
            [SceneCommand::ShowMessage {
                channel: MessageChannel::Rune,
                ..
            }]
        ));
    }

    #[test]
    fn reveal_happens_once_per_rune_solve() {
        let mut session = session();
        let mut sink = Vec::new();
        solve_runes(&mut session, &mut sink);
        let flashes = sink
            .iter()
            .filter(|command| matches!(command, SceneCommand::FlashLight { .. }))
            .count();
        assert_eq!(flashes, HANGING_LIGHTS);

        // solved runes no longer claim clicks
        sink.clear();
        assert_eq!(click(&mut session, SceneObject::Rune(0), &mut sink), None);
        assert!(sink.is_empty());
        assert_eq!(session.missing_item().stage(), ItemStage::Revealed);
    }

    #[test]
    fn hidden_book_cannot_be_collected() {
        let mut session = session();
        let mut sink = Vec::new();
        assert_eq!(
            click(&mut session, SceneObject::Book(Blue), &mut sink),
            Some(HandlerKind::MissingItem)
        );
        assert_eq!(session.missing_item().stage(), ItemStage::Hidden);
        assert!(!session.animator().is_active(AnimationKey::BookFlight));
    }

    #[test]
    fn locked_shelf_hints_at_missing_book() {
        let mut session = session();
        let mut sink = Vec::new();
        assert_eq!(
            click(&mut session, SceneObject::Book(Purple), &mut sink),
            Some(HandlerKind::Bookshelf)
        );
        assert!(matches!(
            &sink[..],
            [SceneCommand::ShowMessage {
                channel: MessageChannel::Book,
                ..
            }]
        ));
    }

    #[test]
    fn digits_blink_the_portal_only_when_unlocked() {
        let mut session = session();
        let mut sink = Vec::new();
        session.key_down("Space", &mut sink);
        assert!(sink.is_empty());
        assert!(session.cube().input().is_empty());

        unlock_cube(&mut session);
        session.key_down("Space", &mut sink);
        assert_eq!(session.cube().input(), &[1]);
        assert_eq!(
            sink,
            vec![SceneCommand::SetEmissive {
                object: SceneObject::Portal,
                intensity: PORTAL_BLINK_GLOW,
            }]
        );
        assert!(session.animator().is_active(AnimationKey::PortalBlink));

        session.key_down("Backspace", &mut sink);
        assert!(session.cube().input().is_empty());
    }

    #[test]
    fn held_key_turns_cube_and_updates_facing() {
        let mut session = session();
        let mut sink = Vec::new();

        session.key_down("KeyD", &mut sink);
        session.tick(&mut sink);
        assert_eq!(session.orientation(), CubeOrientation::default());

        unlock_cube(&mut session);
        // a quarter turn is past pi/4 after 27 frames
        for _ in 0..30 {
            session.tick(&mut sink);
        }
        assert_eq!(session.facing_digit(), 6);
        assert!(sink.contains(&SceneCommand::ShowFacingDigit(6)));

        session.key_up("KeyD");
        let yaw = session.orientation().yaw;
        session.tick(&mut sink);
        assert_eq!(session.orientation().yaw, yaw);
    }

    #[test]
    fn terminal_is_gated_and_can_be_cancelled() {
        let mut session = session();
        let mut sink = Vec::new();
        assert_eq!(
            click(&mut session, SceneObject::Terminal, &mut sink),
            Some(HandlerKind::Terminal)
        );
        assert!(session.terminal_open());

        assert!(!session.submit_code("314156", &mut sink));
        assert!(!session.cube().is_solved());
        assert_eq!(sink.last(), Some(&SceneCommand::ClearTerminal));

        session.cancel_terminal(&mut sink);
        assert!(!session.terminal_open());
        assert_eq!(sink.last(), Some(&SceneCommand::CloseTerminal));
    }

    #[test]
    fn terminal_code_solves_unlocked_cube() {
        let mut session = session();
        let mut sink = Vec::new();
        unlock_cube(&mut session);
        click(&mut session, SceneObject::Terminal, &mut sink);
        assert!(session.submit_code("314156", &mut sink));
        assert!(!session.terminal_open());
        assert!(session.animator().is_active(AnimationKey::DoorRise));
        assert!(session.animator().is_active(AnimationKey::PortalPulse));
    }

    #[test]
    fn scare_fires_once_within_fifteen_seconds() {
        let mut session = session();
        let mut sink = Vec::new();
        session.enter_room(&mut sink);
        session.enter_room(&mut sink);
        for _ in 0..SCARE_MAX_FRAMES + 10 {
            session.tick(&mut sink);
        }
        let scares = sink
            .iter()
            .filter(|command| **command == SceneCommand::PlayScare)
            .count();
        assert_eq!(scares, 1);
    }

    #[test]
    fn runes_twitch_until_watched() {
        let mut session = session();
        let mut sink = Vec::new();
        session.set_look_alignment(0.2);
        session.tick(&mut sink);
        let moved = sink
            .iter()
            .filter(|command| {
                matches!(
                    command,
                    SceneCommand::MoveObject {
                        object: SceneObject::Rune(_),
                        ..
                    }
                )
            })
            .count();
        assert_eq!(moved, RUNE_COUNT);

        sink.clear();
        session.set_look_alignment(1.0);
        session.tick(&mut sink);
        assert!(sink.contains(&SceneCommand::MoveObject {
            object: SceneObject::Rune(1),
            transform: rest_transform(1),
        }));

        // already at rest, nothing more to send
        sink.clear();
        session.tick(&mut sink);
        assert!(!sink.iter().any(|command| matches!(
            command,
            SceneCommand::MoveObject {
                object: SceneObject::Rune(_),
                ..
            }
        )));
    }

    #[test]
    fn scare_is_armed_only_after_entering() {
        let mut session = session();
        let mut sink = Vec::new();
        for _ in 0..SCARE_MAX_FRAMES + 10 {
            session.tick(&mut sink);
        }
        assert!(!session.animator().is_active(AnimationKey::Scare));
        assert!(!sink.contains(&SceneCommand::PlayScare));

        session.enter_room(&mut sink);
        assert!(session.animator().is_active(AnimationKey::Scare));
        assert!(sink.contains(&SceneCommand::ShowFacingDigit(session.facing_digit())));
    }

    #[test]
    fn select_intent_goes_through_dispatch() {
        let mut session = session();
        let mut sink = Vec::new();
        let hits = vec![
            session.objects().id_of(SceneObject::Rune(0)).expect("rune is tagged"),
            session.objects().id_of(SceneObject::Cabinet).expect("cabinet is tagged"),
        ];
        assert_eq!(
            session.handle(Intent::Select(hits), &mut sink),
            Some(HandlerKind::Rune)
        );
        assert_eq!(session.runes().next_expected(), 1);
    }

    #[test]
    fn shelf_already_in_target_order_solves_when_book_lands() {
        let defaults = RoomConfig::default();
        let config = RoomConfig {
            code: Some(CODE.to_vec()),
            start_order: defaults.target_order.clone(),
            ..defaults
        };
        let mut session = GameSession::new(&config, SessionRng::from_seed(9));
        let mut sink = Vec::new();

        solve_runes(&mut session, &mut sink);
        tick_until(&mut session, &mut sink, 200, |session| {
            !session.animator().is_active(AnimationKey::CabinetSwing)
        });
        let book = session.missing_item().book();
        click(&mut session, SceneObject::Book(book), &mut sink);
        assert!(tick_until(&mut session, &mut sink, 1000, |session| {
            session.shelf().is_unlocked()
        }));

        assert_eq!(session.shelf().arrangement(), session.shelf().target());
        assert!(session.shelf().is_solved());
        assert!(!session.cube().is_locked());
        assert!(sink.contains(&SceneCommand::SetVisible {
            object: SceneObject::Cage,
            visible: false,
        }));
    }

    #[test]
    fn invalid_config_falls_back_to_defaults() {
        let config = RoomConfig {
            missing_slot: 42,
            ..RoomConfig::default()
        };
        let session = GameSession::new(&config, SessionRng::from_seed(1));
        assert_eq!(session.missing_item().book(), Blue);
        assert_eq!(session.cube().code().len(), 6);
    }
}
