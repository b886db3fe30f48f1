//! Browser smoke tests, run with `wasm-pack test --headless --firefox`
#![cfg(target_arch = "wasm32")]

use haunted_room::config::RoomConfig;
use haunted_room::presentation::SceneView;
use haunted_room::puzzle::{SceneObject, SOLVED_HEX};
use haunted_room::rng::SessionRng;
use haunted_room::session::GameSession;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

#[wasm_bindgen_test]
fn entropy_is_available_in_the_browser() {
    assert!(SessionRng::from_entropy().is_ok());
}

#[wasm_bindgen_test]
fn solving_runes_opens_the_cabinet() {
    let seed = (js_sys::Math::random() * 1e9) as u64;
    let mut session = GameSession::new(&RoomConfig::default(), SessionRng::from_seed(seed));
    let mut view = SceneView::for_session(&session);

    for index in 0..3 {
        let id = session
            .objects()
            .id_of(SceneObject::Rune(index))
            .expect("rune is tagged");
        session.pointer_click(&[id], &mut view);
    }

    assert!(view.cabinet_open());
    assert_eq!(view.color(SceneObject::Rune(2)), Some(SOLVED_HEX));
}
