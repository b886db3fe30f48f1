use crate::config::{RoomConfig, CONFIG_PATH};
use crate::dispatch::ObjectId;
use crate::engine::input::{InputEvent, InputQueue};
use crate::engine::{Game, Point, Rect, Renderer, FRAME_SIZE};
use crate::input::Intent;
use crate::presentation::{DomSink, SceneView};
use crate::puzzle::bookshelf::slot_world_position;
use crate::puzzle::runes::{RUNE_COLORS, RUNE_COUNT};
use crate::puzzle::{ColorToken, ItemStage, SceneObject, HANGING_LIGHTS};
use crate::rng::SessionRng;
use crate::session::GameSession;
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;

/// TABLE
/// ┌───────────────────── Game Architecture Overview ────────────────────────┐
/// │                                                                         │
/// │    ┌─────────────┐          ┌─────────────┐          ┌──────────────┐   │
/// │    │  engine.rs  │  events  │   game.rs   │  intents │  session.rs  │   │
/// │    │  GameLoop   ├─────────►│ HauntedRoom ├─────────►│  GameSession │   │
/// │    │  InputQueue │          │  hit tests  │          │  tick()      │   │
/// │    └─────────────┘          └──────▲──────┘          └──────┬───────┘   │
/// │                                    │                        │           │
/// │                              ┌─────┴──────┐   SceneCommand  │           │
/// │                              │  DomSink   │◄────────────────┘           │
/// │                              │  SceneView │                             │
/// │                              └────────────┘                             │
/// │                                                                         │
/// ├──────────────────────── Call Sequence ──────────────────────────────────┤
/// │                                                                         │
/// │  1. GameLoop drains browser events into the InputQueue                  │
/// │  2. HauntedRoom.update() turns clicks into hit lists, keys into         │
/// │     session calls, then ticks the session once. The intro's continue    │
/// │     click enters the room and arms the scare                            │
/// │  3. HauntedRoom.draw() paints a floor plan from the SceneView           │
/// │                                                                         │
/// └─────────────────────────────────────────────────────────────────────────┘
pub enum HauntedRoom {
    /// waiting on room.json and the rng seed
    Loading,
    Loaded(Room),
}

pub struct Room {
    session: GameSession,
    sink: DomSink,
}

impl HauntedRoom {
    pub fn new() -> Self {
        HauntedRoom::Loading
    }
}

impl Default for HauntedRoom {
    fn default() -> Self {
        HauntedRoom::new()
    }
}

#[async_trait(?Send)]
impl Game for HauntedRoom {
    async fn initialize(&self) -> Result<Box<dyn Game>> {
        match self {
            HauntedRoom::Loading => {
                let config = RoomConfig::load(CONFIG_PATH).await;
                let rng = SessionRng::from_entropy().context("seeding the room")?;
                let session = GameSession::new(&config, rng);
                let sink = DomSink::new(SceneView::for_session(&session));
                Ok(Box::new(HauntedRoom::Loaded(Room { session, sink })))
            }
            HauntedRoom::Loaded(_) => Err(anyhow!("Game is already initialized")),
        }
    }

    fn update(&mut self, input: &InputQueue) {
        if let HauntedRoom::Loaded(room) = self {
            for event in input.events() {
                room.handle(event);
            }
            room.session.tick(&mut room.sink);
            room.sink.advance(FRAME_SIZE);
        }
    }

    fn draw(&mut self, renderer: &Renderer) {
        if let HauntedRoom::Loaded(room) = self {
            room.draw(renderer);
        }
    }
}

impl Room {
    fn handle(&mut self, event: &InputEvent) {
        match event {
            InputEvent::KeyDown(code) => self.session.key_down(code, &mut self.sink),
            InputEvent::KeyUp(code) => self.session.key_up(code),
            InputEvent::Click(point) => {
                let hits = hit_test(&self.session, self.sink.view(), *point);
                if let Some(handler) = self.session.handle(Intent::Select(hits), &mut self.sink) {
                    log!("click handled by {:?}", handler);
                }
            }
            InputEvent::Hover(point) => self.session.set_look_alignment(look_alignment(*point)),
            InputEvent::SubmitCode(text) => {
                self.session.submit_code(text, &mut self.sink);
            }
            InputEvent::CancelTerminal => self.session.cancel_terminal(&mut self.sink),
            InputEvent::EnterRoom => self.session.enter_room(&mut self.sink),
        }
    }

    fn draw(&self, renderer: &Renderer) {
        let view = self.sink.view();
        renderer.clear(&ROOM_RECT);
        renderer.fill_rect(&ROOM_RECT, FLOOR);
        renderer.stroke_rect(&ROOM_RECT, WALL);

        for light in 0..HANGING_LIGHTS {
            let level = view.light_intensity(light).unwrap_or_default();
            renderer.fill_rect_alpha(&lamp_rect(light), LAMP, level / 8.0);
        }

        // clue tiles on the left wall spell the cube code in colors
        for (index, color) in self.session.cube().clue_colors().into_iter().enumerate() {
            let tile = centered(to_screen(-4.8, -1.5 + index as f32 * 0.6), 10.0, 24.0);
            renderer.fill_rect(&tile, color.hex());
        }
        draw_stroop_paper(renderer, &self.session);

        for (object, rect) in layout(&self.session, view) {
            match object {
                SceneObject::Portal => {
                    let color = view.color(object).unwrap_or(ColorToken::Orange.hex());
                    renderer.fill_rect_alpha(&rect, color, view.emissive(object) / 2.5);
                    renderer.stroke_rect(&rect, WALL);
                }
                SceneObject::Cube => {
                    let color = ColorToken::from_digit(view.facing_digit())
                        .map(ColorToken::hex)
                        .unwrap_or(WALL);
                    renderer.fill_rect(&rect, color);
                    renderer.fill_text(&view.facing_digit().to_string(), rect.center(), INK);
                    if view.is_visible(SceneObject::Cage) {
                        renderer.stroke_rect(&CAGE_RECT, CAGE);
                    }
                }
                SceneObject::Door => {
                    let open = view
                        .transform(object)
                        .map(|transform| ((transform.position.y - 0.5) / 4.0).clamp(0.0, 1.0))
                        .unwrap_or(0.0);
                    renderer.fill_rect_alpha(&rect, WOOD, 1.0 - open);
                }
                SceneObject::Cabinet => {
                    renderer.fill_rect(&rect, WOOD);
                    if view.cabinet_open() {
                        renderer.stroke_rect(&rect, SOLVED);
                    }
                }
                SceneObject::Book(_) | SceneObject::Rune(_) => {
                    renderer.fill_rect(&rect, view.color(object).unwrap_or(WALL));
                    if Some(object) == selected(&self.session) {
                        renderer.stroke_rect(&rect, INK);
                    }
                }
                SceneObject::Terminal => {
                    renderer.fill_rect(&rect, TERMINAL);
                    renderer.fill_text(">_", rect.center(), SOLVED);
                }
                SceneObject::RuneClue => draw_rune_paper(renderer, &rect),
                _ => {}
            }
        }

        let entered: Vec<String> = self
            .session
            .cube()
            .input()
            .iter()
            .map(|digit| digit.to_string())
            .collect();
        renderer.fill_text(
            &format!("code: {}", entered.join(" ")),
            Point { x: 12.0, y: 24.0 },
            INK,
        );
    }
}

/// Stroop clue on the wall next to the shelf, one word per slot
fn draw_stroop_paper(renderer: &Renderer, session: &GameSession) {
    renderer.fill_rect(&STROOP_PAPER_RECT, PAPER);
    for (index, line) in session.shelf().stroop_clue().into_iter().enumerate() {
        let position = Point {
            x: STROOP_PAPER_RECT.x + 8.0,
            y: STROOP_PAPER_RECT.y + 20.0 + index as f32 * 18.0,
        };
        renderer.fill_text(&line.word.name().to_uppercase(), position, line.ink.hex());
    }
}

/// Rune order: one swatch per rune, left to right, arrows between
fn draw_rune_paper(renderer: &Renderer, paper: &Rect) {
    renderer.fill_rect(paper, PAPER);
    for (index, color) in RUNE_COLORS.into_iter().enumerate() {
        let center = Point {
            x: paper.x + 10.0 + index as f32 * 20.0,
            y: paper.y + paper.height / 2.0,
        };
        renderer.fill_rect(&centered(center, 10.0, 10.0), color);
        if index + 1 < RUNE_COUNT {
            let arrow = Point {
                x: center.x + 5.0,
                y: center.y + 5.0,
            };
            renderer.fill_text(">", arrow, WALL);
        }
    }
}

fn selected(session: &GameSession) -> Option<SceneObject> {
    session.shelf().selected().map(SceneObject::Book)
}

// ==================== Floor Plan ====================
// ELI5: the canvas is the room seen from above
// ┌──────────────────────────────────┐
// │          portal  cube            │  z = -5 (top)
// │                                  │
// │ clue                       shelf │
// │                                  │
// │   cabinet   door   terminal      │  z = +5 (bottom)
// └──────────────────────────────────┘
// room units are 55px, room center is canvas center
const ROOM_RECT: Rect = Rect::new(0.0, 0.0, 600.0, 600.0);
const CAGE_RECT: Rect = Rect::new(302.0, 60.0, 40.0, 40.0);
const SCALE: f32 = 55.0;
const CENTER: Point = Point { x: 300.0, y: 300.0 };
const CABINET: Point = Point { x: 179.0, y: 559.0 };
const STROOP_PAPER_RECT: Rect = Rect::new(448.0, 300.0, 90.0, 110.0);

const FLOOR: u32 = 0x1a1414;
const WALL: u32 = 0x555555;
const WOOD: u32 = 0x5c3a21;
const PAPER: u32 = 0xd8cfae;
const TERMINAL: u32 = 0x111111;
const LAMP: u32 = 0xfff2c0;
const CAGE: u32 = 0x999999;
const INK: u32 = 0xffffff;
const SOLVED: u32 = 0x00ff00;

const LAMP_POSITIONS: [(f32, f32); HANGING_LIGHTS] =
    [(-3.0, 0.5), (0.0, -2.5), (2.5, 3.0), (-1.0, 4.5)];

fn to_screen(x: f32, z: f32) -> Point {
    Point {
        x: CENTER.x + x * SCALE,
        y: CENTER.y + z * SCALE,
    }
}

fn centered(center: Point, width: f32, height: f32) -> Rect {
    Rect::new(center.x - width / 2.0, center.y - height / 2.0, width, height)
}

fn lamp_rect(light: usize) -> Rect {
    let (x, z) = LAMP_POSITIONS[light % HANGING_LIGHTS];
    centered(to_screen(x, z), 16.0, 16.0)
}

/// Every drawable object and where it is on the plan, back to front
fn layout(session: &GameSession, view: &SceneView) -> Vec<(SceneObject, Rect)> {
    let mut placed = vec![
        (SceneObject::Portal, centered(to_screen(-0.4, -4.0), 40.0, 30.0)),
        (SceneObject::Cube, centered(to_screen(0.4, -4.0), 30.0, 30.0)),
        (SceneObject::RuneClue, centered(to_screen(-3.5, 4.8), 60.0, 18.0)),
        (SceneObject::Cabinet, centered(CABINET, 60.0, 36.0)),
        (SceneObject::Terminal, centered(to_screen(1.5, 4.9), 36.0, 18.0)),
        (SceneObject::Door, centered(to_screen(0.0, 4.95), 55.0, 10.0)),
    ];

    for index in 0..RUNE_COUNT {
        let jitter = view
            .transform(SceneObject::Rune(index))
            .map(|transform| transform.position.x - (-0.4 + index as f32 * 0.4))
            .unwrap_or(0.0);
        let center = Point {
            x: CABINET.x + (-0.4 + index as f32 * 0.4 + jitter) * SCALE,
            y: CABINET.y - 8.0,
        };
        placed.push((SceneObject::Rune(index), centered(center, 12.0, 12.0)));
    }

    // shelved books stand along the right wall
    for (slot, book) in session.shelf().slots().iter().enumerate() {
        if let Some(book) = book {
            let position = slot_world_position(slot);
            let rect = centered(to_screen(position.x, position.z), 14.0, 22.0);
            placed.push((SceneObject::Book(*book), rect));
        }
    }

    let missing = session.missing_item();
    let book = SceneObject::Book(missing.book());
    if view.is_visible(book) && missing.stage() != ItemStage::Placed {
        let center = match view.transform(book) {
            Some(transform) if missing.stage() == ItemStage::Collected => {
                to_screen(transform.position.x, transform.position.z)
            }
            _ => Point {
                x: CABINET.x,
                y: CABINET.y + 6.0,
            },
        };
        placed.push((book, centered(center, 14.0, 22.0)));
    }
    placed
}

/// Objects under `point`, smallest first since small things sit in front of
/// the big ones on the plan
fn hit_test(session: &GameSession, view: &SceneView, point: Point) -> Vec<ObjectId> {
    let mut hits: Vec<(SceneObject, Rect)> = layout(session, view)
        .into_iter()
        .filter(|(_, rect)| rect.contains(point))
        .collect();
    hits.sort_by(|(_, a), (_, b)| (a.width * a.height).total_cmp(&(b.width * b.height)));
    hits.into_iter()
        .filter_map(|(object, _)| session.objects().id_of(object))
        .collect()
}

/// Cosine between looking at the pointer and looking at the cabinet, from
/// the middle of the room
fn look_alignment(point: Point) -> f32 {
    let gaze = (point.x - CENTER.x, point.y - CENTER.y);
    let cabinet = (CABINET.x - CENTER.x, CABINET.y - CENTER.y);
    let gaze_len = (gaze.0 * gaze.0 + gaze.1 * gaze.1).sqrt();
    let cabinet_len = (cabinet.0 * cabinet.0 + cabinet.1 * cabinet.1).sqrt();
    if gaze_len <= f32::EPSILON {
        return 0.0;
    }
    (gaze.0 * cabinet.0 + gaze.1 * cabinet.1) / (gaze_len * cabinet_len)
}
