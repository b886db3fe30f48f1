// ==================== Imports ====================
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsValue;

// macros have to be declared before the modules that log
#[macro_use]
mod browser;
mod engine;

pub mod animation;
pub mod config;
pub mod dispatch;
pub mod input;
pub mod presentation;
pub mod puzzle;
pub mod rng;
pub mod session;

mod game;

use engine::GameLoop;
use game::HauntedRoom;

// ==================== Main Functions ====================
/// Main entry for Webassembly module
/// - installs the panic hook
/// - loads the room and starts the game loop
#[wasm_bindgen]
pub fn main_js() -> Result<(), JsValue> {
    // setup better panic messages for debugging
    console_error_panic_hook::set_once();

    // spawns a new asynchronous task in local thread, for web assembly
    // environment, using wasm_bindgen_futures
    browser::spawn_local(async move {
        if let Err(err) = GameLoop::start(HauntedRoom::new()).await {
            warn!("Could not start the haunted room : {:#}", err);
        }
    });

    Ok(())
}
