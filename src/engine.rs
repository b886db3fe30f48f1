use crate::browser;
use anyhow::{anyhow, Result};
// ELI5: web assembly is a single threaded environment, so Rc RefCell > Mutex
use async_trait::async_trait;
use std::cell::RefCell;
use std::rc::Rc;
use web_sys::CanvasRenderingContext2d;

use self::input::{InputQueue, InputReceiver};

#[async_trait(?Send)]
pub trait Game {
    async fn initialize(&self) -> Result<Box<dyn Game>>;
    fn update(&mut self, input: &InputQueue);
    fn draw(&mut self, renderer: &Renderer);
}

// length of a frame in milliseconds
// - every animation in the room advances a fixed amount per update, so the
// update rate has to stay pinned at 60hz no matter the display refresh rate
pub const FRAME_SIZE: f32 = 1.0 / 60.0 * 1000.0;

pub struct GameLoop {
    last_frame: f64,
    accumulated_delta: f32,
}

type SharedLoopClosure = Rc<RefCell<Option<browser::LoopClosure>>>;

impl GameLoop {
    pub async fn start(game: impl Game + 'static) -> Result<()> {
        let mut receiver: InputReceiver = input::prepare_input()?;
        let mut game = game.initialize().await?;
        let mut game_loop = GameLoop {
            last_frame: browser::now()?,
            accumulated_delta: 0.0,
        };
        let renderer = Renderer {
            context: browser::context()?,
        };
        let mut queue = InputQueue::default();
        let f: SharedLoopClosure = Rc::new(RefCell::new(None));
        let g = f.clone();
        *g.borrow_mut() = Some(browser::create_raf_closure(move |perf: f64| {
            queue.process(&mut receiver);
            game_loop.accumulated_delta += (perf - game_loop.last_frame) as f32;
            while game_loop.accumulated_delta > FRAME_SIZE {
                game.update(&queue);
                // events are consumed by the first fixed step that sees them
                queue.clear();
                game_loop.accumulated_delta -= FRAME_SIZE;
            }
            game_loop.last_frame = perf;
            game.draw(&renderer);
            if let Some(callback) = f.borrow().as_ref() {
                if let Err(err) = browser::request_animation_frame(callback) {
                    warn!("GameLoop: stopping, {:#}", err);
                }
            }
        }));

        browser::request_animation_frame(
            g.borrow()
                .as_ref()
                .ok_or_else(|| anyhow!("GameLoop: Loop is None"))?,
        )?;

        Ok(())
    }
}

// ==================== Geometry ====================
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Rect {
            x,
            y,
            width,
            height,
        }
    }

    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x
            && point.x <= self.x + self.width
            && point.y >= self.y
            && point.y <= self.y + self.height
    }

    pub fn center(&self) -> Point {
        Point {
            x: self.x + self.width * 0.5,
            y: self.y + self.height * 0.5,
        }
    }
}

/// 3D vector in room space, the unit the presentation layer positions meshes in
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3::new(0.0, 0.0, 0.0);

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Vec3 { x, y, z }
    }

    /// moves `alpha` of the way toward `target`
    pub fn lerp(self, target: Vec3, alpha: f32) -> Vec3 {
        Vec3 {
            x: self.x + (target.x - self.x) * alpha,
            y: self.y + (target.y - self.y) * alpha,
            z: self.z + (target.z - self.z) * alpha,
        }
    }

    pub fn distance_to(self, other: Vec3) -> f32 {
        let (dx, dy, dz) = (self.x - other.x, self.y - other.y, self.z - other.z);
        (dx * dx + dy * dy + dz * dz).sqrt()
    }
}

// ==================== Renderer ====================
pub struct Renderer {
    context: CanvasRenderingContext2d,
}

impl Renderer {
    pub fn clear(&self, rect: &Rect) {
        self.context.clear_rect(
            rect.x.into(),
            rect.y.into(),
            rect.width.into(),
            rect.height.into(),
        );
    }

    pub fn fill_rect(&self, rect: &Rect, color: u32) {
        self.context.set_fill_style_str(&css_color(color));
        self.context.fill_rect(
            rect.x.into(),
            rect.y.into(),
            rect.width.into(),
            rect.height.into(),
        );
    }

    pub fn stroke_rect(&self, rect: &Rect, color: u32) {
        self.context.set_stroke_style_str(&css_color(color));
        self.context.stroke_rect(
            rect.x.into(),
            rect.y.into(),
            rect.width.into(),
            rect.height.into(),
        );
    }

    /// `alpha` scales the fill, used for glow and light levels
    pub fn fill_rect_alpha(&self, rect: &Rect, color: u32, alpha: f32) {
        self.context.set_global_alpha(alpha.clamp(0.0, 1.0).into());
        self.fill_rect(rect, color);
        self.context.set_global_alpha(1.0);
    }

    pub fn fill_text(&self, text: &str, position: Point, color: u32) {
        self.context.set_fill_style_str(&css_color(color));
        self.context.set_font("16px monospace");
        if let Err(err) = self
            .context
            .fill_text(text, position.x.into(), position.y.into())
        {
            warn!("Could not draw {:?} : {:#?}", text, err);
        }
    }
}

pub fn css_color(color: u32) -> String {
    format!("#{:06x}", color & 0x00ff_ffff)
}

// ==================== Input ====================
pub mod input {
    use super::Point;
    use crate::browser;
    use anyhow::{anyhow, Result};
    use futures::channel::mpsc::{unbounded, UnboundedReceiver, UnboundedSender};
    use wasm_bindgen::JsCast;
    use web_sys::{HtmlElement, HtmlInputElement, KeyboardEvent, MouseEvent};

    /// Raw browser events, before the room decides what they mean
    #[derive(Debug, Clone, PartialEq)]
    pub enum InputEvent {
        KeyDown(String),
        KeyUp(String),
        Click(Point),
        Hover(Point),
        SubmitCode(String),
        CancelTerminal,
        /// the intro's continue click, first user gesture on the page
        EnterRoom,
    }

    pub type InputReceiver = UnboundedReceiver<InputEvent>;

    /// Events collected since the last fixed update
    #[derive(Debug, Default)]
    pub struct InputQueue {
        events: Vec<InputEvent>,
    }

    impl InputQueue {
        pub fn process(&mut self, receiver: &mut InputReceiver) {
            // drain without blocking, the closed/empty cases both end the frame
            while let Ok(Some(event)) = receiver.try_next() {
                self.events.push(event);
            }
        }

        pub fn push(&mut self, event: InputEvent) {
            self.events.push(event);
        }

        pub fn events(&self) -> &[InputEvent] {
            &self.events
        }

        pub fn clear(&mut self) {
            self.events.clear();
        }
    }

    /// Hooks keyboard, canvas pointer and terminal buttons into one channel
    pub fn prepare_input() -> Result<InputReceiver> {
        let (sender, receiver) = unbounded::<InputEvent>();
        let window = browser::window()?;
        let canvas = browser::canvas()?;

        let keydown_sender = sender.clone();
        let onkeydown = browser::closure_wrap(Box::new(move |event: KeyboardEvent| {
            send(&keydown_sender, InputEvent::KeyDown(event.code()));
        }) as Box<dyn FnMut(KeyboardEvent)>);

        let keyup_sender = sender.clone();
        let onkeyup = browser::closure_wrap(Box::new(move |event: KeyboardEvent| {
            send(&keyup_sender, InputEvent::KeyUp(event.code()));
        }) as Box<dyn FnMut(KeyboardEvent)>);

        let click_sender = sender.clone();
        let onclick = browser::closure_wrap(Box::new(move |event: MouseEvent| {
            send(&click_sender, InputEvent::Click(offset_point(&event)));
        }) as Box<dyn FnMut(MouseEvent)>);

        let hover_sender = sender.clone();
        let onmousemove = browser::closure_wrap(Box::new(move |event: MouseEvent| {
            send(&hover_sender, InputEvent::Hover(offset_point(&event)));
        }) as Box<dyn FnMut(MouseEvent)>);

        window.set_onkeydown(Some(onkeydown.as_ref().unchecked_ref()));
        window.set_onkeyup(Some(onkeyup.as_ref().unchecked_ref()));
        canvas.set_onclick(Some(onclick.as_ref().unchecked_ref()));
        canvas.set_onmousemove(Some(onmousemove.as_ref().unchecked_ref()));
        // listeners live as long as the page
        onkeydown.forget();
        onkeyup.forget();
        onclick.forget();
        onmousemove.forget();

        // the terminal overlay is optional markup
        if let Err(err) = prepare_terminal(&sender) {
            warn!("terminal input disabled : {:#}", err);
        }
        // without an intro there is no gesture to wait for, walk straight in
        if let Err(err) = prepare_intro(&sender) {
            warn!("no story intro, entering right away : {:#}", err);
            send(&sender, InputEvent::EnterRoom);
        }

        Ok(receiver)
    }

    fn prepare_terminal(sender: &UnboundedSender<InputEvent>) -> Result<()> {
        let submit = browser::element_by_id::<HtmlElement>(browser::html::SUBMIT_BUTTON_ID)?;
        let cancel = browser::element_by_id::<HtmlElement>(browser::html::CANCEL_BUTTON_ID)?;
        // make sure the field exists before wiring the button that reads it
        browser::element_by_id::<HtmlInputElement>(browser::html::CODE_INPUT_ID)
            .map_err(|err| anyhow!("terminal has no code field : {:#}", err))?;

        let submit_sender = sender.clone();
        let onsubmit = browser::closure_wrap(Box::new(move || {
            match browser::element_by_id::<HtmlInputElement>(browser::html::CODE_INPUT_ID) {
                Ok(field) => send(&submit_sender, InputEvent::SubmitCode(field.value())),
                Err(err) => warn!("{:#}", err),
            }
        }) as Box<dyn FnMut()>);

        let cancel_sender = sender.clone();
        let oncancel = browser::closure_wrap(Box::new(move || {
            send(&cancel_sender, InputEvent::CancelTerminal);
        }) as Box<dyn FnMut()>);

        submit.set_onclick(Some(onsubmit.as_ref().unchecked_ref()));
        cancel.set_onclick(Some(oncancel.as_ref().unchecked_ref()));
        onsubmit.forget();
        oncancel.forget();
        Ok(())
    }

    fn prepare_intro(sender: &UnboundedSender<InputEvent>) -> Result<()> {
        let intro = browser::element_by_id::<HtmlElement>(browser::html::STORY_INTRO_ID)?;
        let continue_button =
            browser::element_by_id::<HtmlElement>(browser::html::CONTINUE_BUTTON_ID)?;

        let enter_sender = sender.clone();
        let oncontinue = browser::closure_wrap(Box::new(move || {
            if let Err(err) = browser::set_display(&intro, false) {
                warn!("{:#}", err);
            }
            send(&enter_sender, InputEvent::EnterRoom);
        }) as Box<dyn FnMut()>);

        continue_button.set_onclick(Some(oncontinue.as_ref().unchecked_ref()));
        oncontinue.forget();
        Ok(())
    }

    fn send(sender: &UnboundedSender<InputEvent>, event: InputEvent) {
        if let Err(err) = sender.unbounded_send(event) {
            warn!("Could not send input event : {:#?}", err);
        }
    }

    fn offset_point(event: &MouseEvent) -> Point {
        Point {
            x: event.offset_x() as f32,
            y: event.offset_y() as f32,
        }
    }

}
