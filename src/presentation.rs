//! What the player sees. [`SceneView`] is the room as the commands have left
//! it, [`DomSink`] additionally mirrors messages, the terminal and audio into
//! the page.
use crate::animation::{LIGHT_BASE_INTENSITY, PORTAL_REST_GLOW};
use crate::browser;
use crate::puzzle::bookshelf::slot_transform;
use crate::puzzle::runes::{rest_transform, rune_color, RUNE_COUNT};
use crate::puzzle::{
    ItemStage, MessageChannel, SceneCommand, SceneObject, SceneSink, Transform, HANGING_LIGHTS,
};
use crate::session::GameSession;
use anyhow::{anyhow, Result};
use std::collections::{HashMap, HashSet};
use wasm_bindgen_futures::JsFuture;
use web_sys::{HtmlElement, HtmlInputElement, HtmlMediaElement};

#[derive(Debug, Clone, Copy, PartialEq)]
struct Lamp {
    intensity: f32,
    flash_ms_left: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub text: String,
    ms_left: f32,
}

#[derive(Debug, Clone)]
pub struct SceneView {
    transforms: HashMap<SceneObject, Transform>,
    colors: HashMap<SceneObject, u32>,
    emissive: HashMap<SceneObject, f32>,
    hidden: HashSet<SceneObject>,
    lamps: [Lamp; HANGING_LIGHTS],
    messages: HashMap<MessageChannel, Message>,
    facing_digit: u8,
    door_opening: bool,
    cabinet_open: bool,
    terminal_open: bool,
    scares: u32,
}

impl SceneView {
    /// The room as it looks before anything has happened in `session`
    pub fn for_session(session: &GameSession) -> Self {
        let mut view = SceneView {
            transforms: HashMap::new(),
            colors: HashMap::new(),
            emissive: HashMap::new(),
            hidden: HashSet::new(),
            lamps: [Lamp {
                intensity: LIGHT_BASE_INTENSITY,
                flash_ms_left: 0.0,
            }; HANGING_LIGHTS],
            messages: HashMap::new(),
            facing_digit: session.facing_digit(),
            door_opening: false,
            cabinet_open: false,
            terminal_open: false,
            scares: 0,
        };
        for (slot, book) in session.shelf().slots().iter().enumerate() {
            if let Some(book) = book {
                view.transforms
                    .insert(SceneObject::Book(*book), slot_transform(slot));
                view.colors.insert(SceneObject::Book(*book), book.hex());
            }
        }
        let missing = session.missing_item().book();
        view.colors.insert(SceneObject::Book(missing), missing.hex());
        if session.missing_item().stage() == ItemStage::Hidden {
            view.hidden.insert(SceneObject::Book(missing));
        }
        for index in 0..RUNE_COUNT {
            view.transforms
                .insert(SceneObject::Rune(index), rest_transform(index));
            if let Some(color) = rune_color(index) {
                view.colors.insert(SceneObject::Rune(index), color);
            }
        }
        view.emissive.insert(SceneObject::Portal, PORTAL_REST_GLOW);
        view
    }

    pub fn apply(&mut self, command: &SceneCommand) {
        match command {
            SceneCommand::ShowMessage {
                channel,
                text,
                duration_ms,
            } => {
                self.messages.insert(
                    *channel,
                    Message {
                        text: text.clone(),
                        ms_left: *duration_ms as f32,
                    },
                );
            }
            SceneCommand::FlashLight {
                light,
                intensity,
                restore_delay_ms,
            } => {
                if let Some(lamp) = self.lamps.get_mut(*light) {
                    lamp.intensity = *intensity;
                    lamp.flash_ms_left = *restore_delay_ms as f32;
                }
            }
            SceneCommand::SetLightIntensity { light, intensity } => {
                if let Some(lamp) = self.lamps.get_mut(*light) {
                    lamp.intensity = *intensity;
                }
            }
            SceneCommand::MoveObject { object, transform } => {
                self.transforms.insert(*object, *transform);
            }
            SceneCommand::Recolor { object, color } => {
                self.colors.insert(*object, *color);
            }
            SceneCommand::SetEmissive { object, intensity } => {
                self.emissive.insert(*object, *intensity);
            }
            SceneCommand::SetVisible { object, visible } => {
                if *visible {
                    self.hidden.remove(object);
                } else {
                    self.hidden.insert(*object);
                }
            }
            SceneCommand::ShowFacingDigit(digit) => self.facing_digit = *digit,
            SceneCommand::OpenDoor => self.door_opening = true,
            SceneCommand::OpenCabinet => self.cabinet_open = true,
            SceneCommand::OpenTerminal => self.terminal_open = true,
            SceneCommand::CloseTerminal => self.terminal_open = false,
            SceneCommand::ClearTerminal => {}
            SceneCommand::PlayScare => self.scares += 1,
        }
    }

    /// Runs down message and flash timers
    pub fn advance(&mut self, elapsed_ms: f32) {
        self.messages.retain(|_, message| {
            message.ms_left -= elapsed_ms;
            message.ms_left > 0.0
        });
        for lamp in self.lamps.iter_mut().filter(|lamp| lamp.flash_ms_left > 0.0) {
            lamp.flash_ms_left -= elapsed_ms;
            if lamp.flash_ms_left <= 0.0 {
                lamp.flash_ms_left = 0.0;
                lamp.intensity = LIGHT_BASE_INTENSITY;
            }
        }
    }

    pub fn transform(&self, object: SceneObject) -> Option<Transform> {
        self.transforms.get(&object).copied()
    }

    pub fn color(&self, object: SceneObject) -> Option<u32> {
        self.colors.get(&object).copied()
    }

    pub fn emissive(&self, object: SceneObject) -> f32 {
        self.emissive.get(&object).copied().unwrap_or(0.0)
    }

    pub fn is_visible(&self, object: SceneObject) -> bool {
        !self.hidden.contains(&object)
    }

    pub fn light_intensity(&self, light: usize) -> Option<f32> {
        self.lamps.get(light).map(|lamp| lamp.intensity)
    }

    pub fn message(&self, channel: MessageChannel) -> Option<&Message> {
        self.messages.get(&channel)
    }

    pub fn facing_digit(&self) -> u8 {
        self.facing_digit
    }

    pub fn door_opening(&self) -> bool {
        self.door_opening
    }

    pub fn cabinet_open(&self) -> bool {
        self.cabinet_open
    }

    pub fn terminal_open(&self) -> bool {
        self.terminal_open
    }

    pub fn scares(&self) -> u32 {
        self.scares
    }
}

impl SceneSink for SceneView {
    fn send(&mut self, command: SceneCommand) {
        self.apply(&command);
    }
}

// ==================== DOM ====================
/// Sink used in the browser. A missing element only costs a warning, the
/// game keeps running.
pub struct DomSink {
    view: SceneView,
    shown: HashSet<MessageChannel>,
}

impl DomSink {
    pub fn new(view: SceneView) -> Self {
        DomSink {
            view,
            shown: HashSet::new(),
        }
    }

    pub fn view(&self) -> &SceneView {
        &self.view
    }

    /// Advances timers and hides message boxes that ran out
    pub fn advance(&mut self, elapsed_ms: f32) {
        self.view.advance(elapsed_ms);
        let expired: Vec<MessageChannel> = self
            .shown
            .iter()
            .filter(|channel| self.view.message(**channel).is_none())
            .copied()
            .collect();
        for channel in expired {
            self.shown.remove(&channel);
            if let Err(err) = message_box(channel, None) {
                warn!("{:#}", err);
            }
        }
    }

    fn reflect(&mut self, command: &SceneCommand) -> Result<()> {
        match command {
            SceneCommand::ShowMessage { channel, text, .. } => {
                self.shown.insert(*channel);
                message_box(*channel, Some(text))
            }
            SceneCommand::OpenTerminal => terminal(true),
            SceneCommand::CloseTerminal => terminal(false),
            SceneCommand::ClearTerminal => {
                browser::element_by_id::<HtmlInputElement>(browser::html::CODE_INPUT_ID)?
                    .set_value("");
                Ok(())
            }
            SceneCommand::PlayScare => play_scare(),
            _ => Ok(()),
        }
    }
}

impl SceneSink for DomSink {
    fn send(&mut self, command: SceneCommand) {
        self.view.apply(&command);
        if let Err(err) = self.reflect(&command) {
            warn!("{:?} not shown : {:#}", command, err);
        }
    }
}

fn message_box_id(channel: MessageChannel) -> &'static str {
    match channel {
        MessageChannel::Portal => browser::html::PORTAL_MESSAGE_ID,
        MessageChannel::Book => browser::html::BOOK_MESSAGE_ID,
        MessageChannel::Rune => browser::html::RUNE_MESSAGE_ID,
    }
}

/// `Some(text)` shows the box with that text, `None` hides it
fn message_box(channel: MessageChannel, text: Option<&str>) -> Result<()> {
    let element = browser::element_by_id::<HtmlElement>(message_box_id(channel))?;
    if let Some(text) = text {
        element.set_inner_text(text);
    }
    browser::set_display(&element, text.is_some())
}

fn terminal(open: bool) -> Result<()> {
    let element = browser::element_by_id::<HtmlElement>(browser::html::CODE_INTERFACE_ID)?;
    browser::set_display(&element, open)
}

fn play_scare() -> Result<()> {
    for id in [
        browser::html::CHAINSAW_AUDIO_ID,
        browser::html::SCREAM_AUDIO_ID,
    ] {
        let audio = browser::element_by_id::<HtmlMediaElement>(id)?;
        audio
            .pause()
            .map_err(|err| anyhow!("Could not pause #{} {:#?}", id, err))?;
        audio.set_current_time(0.0);
        let playing = audio
            .play()
            .map_err(|err| anyhow!("Could not play #{} {:#?}", id, err))?;
        // rejects when the page has not had a user gesture yet
        browser::spawn_local(async move {
            if let Err(err) = JsFuture::from(playing).await {
                warn!("#{} refused to play : {:#?}", id, err);
            }
        });
    }
    Ok(())
}
