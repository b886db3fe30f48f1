use anyhow::{anyhow, Result};
use serde::de::DeserializeOwned;
use std::future::Future;
use wasm_bindgen::closure::{Closure, WasmClosure};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;

#[rustfmt::skip]
use web_sys::{
    Document,
    Window,
    CanvasRenderingContext2d,
    HtmlCanvasElement,
    HtmlElement,
    Response,
};

// ==================== Logging ====================
// ELI5: console.log only exists inside the browser
// ┌──────────────────┬──────────────────────────────────┐
// │ target           │ log!/warn! end up in             │
// ├──────────────────┼──────────────────────────────────┤
// │ wasm32 (browser) │ devtools console (web_sys)       │
// │ native (tests)   │ stdout / stderr                  │
// └──────────────────┴──────────────────────────────────┘
// calling a web_sys import natively panics, so the split is compile time
#[cfg(target_arch = "wasm32")]
macro_rules! log {
    ($($t:tt)*) => {
        web_sys::console::log_1(&format!($($t)*).into())
    };
}

#[cfg(not(target_arch = "wasm32"))]
macro_rules! log {
    ($($t:tt)*) => {
        println!($($t)*)
    };
}

#[cfg(target_arch = "wasm32")]
macro_rules! warn {
    ($($t:tt)*) => {
        web_sys::console::warn_1(&format!($($t)*).into())
    };
}

#[cfg(not(target_arch = "wasm32"))]
macro_rules! warn {
    ($($t:tt)*) => {
        eprintln!($($t)*)
    };
}

// ==================== Constants ====================
// Constants related to HTML elements
pub mod html {
    pub const CANVAS_ID: &str = "canvas";
    pub const STORY_INTRO_ID: &str = "story-intro";
    pub const CONTINUE_BUTTON_ID: &str = "continue-btn";
    pub const CONTEXT_2D: &str = "2d";
    pub const PORTAL_MESSAGE_ID: &str = "portal-message";
    pub const BOOK_MESSAGE_ID: &str = "book-message";
    pub const RUNE_MESSAGE_ID: &str = "rune-message";
    pub const CODE_INTERFACE_ID: &str = "code-interface";
    pub const CODE_INPUT_ID: &str = "code-input";
    pub const SUBMIT_BUTTON_ID: &str = "submit-btn";
    pub const CANCEL_BUTTON_ID: &str = "cancel-btn";
    pub const CHAINSAW_AUDIO_ID: &str = "chainsaw";
    pub const SCREAM_AUDIO_ID: &str = "scream";
}

pub type LoopClosure = Closure<dyn FnMut(f64)>;

pub fn context() -> Result<CanvasRenderingContext2d> {
    canvas()?
        .get_context(html::CONTEXT_2D)
        // Result<Option<Object>, JsValue>
        // - JsValue error -> anyhow
        // - None -> anyhow
        .map_err(|js_value| anyhow!("Error getting context : {:#?}", js_value))?
        .ok_or_else(|| anyhow!("No 2d context found"))?
        .dyn_into::<CanvasRenderingContext2d>()
        .map_err(|element| {
            anyhow!(
                "Error converting {:#?} to CanvasRenderingContext2d",
                element
            )
        })
}

pub fn canvas() -> Result<HtmlCanvasElement> {
    element_by_id::<HtmlCanvasElement>(html::CANVAS_ID)
}

/// Looks up a DOM element and casts it to the requested web_sys type
/// # Arguments
/// * `id` - element id attribute
/// # Returns
/// * `Ok(T)` - element exists and is a `T`
/// * `Err` - missing element or wrong element type
pub fn element_by_id<T: JsCast>(id: &str) -> Result<T> {
    document()?
        .get_element_by_id(id)
        .ok_or_else(|| anyhow!("No Element found with ID : '{}'", id))?
        .dyn_into::<T>()
        .map_err(|element| anyhow!("Error converting {:#?} for ID : '{}'", element, id))
}

pub fn set_display(element: &HtmlElement, visible: bool) -> Result<()> {
    element
        .style()
        .set_property("display", if visible { "block" } else { "none" })
        .map_err(|err| anyhow!("Could not set display style : {:#?}", err))
}

pub fn window() -> Result<Window> {
    web_sys::window().ok_or_else(|| anyhow!("Window not found"))
}

pub fn document() -> Result<Document> {
    window()?
        .document()
        .ok_or_else(|| anyhow!("No Document Found"))
}

pub fn now() -> Result<f64> {
    Ok(window()?
        .performance()
        .ok_or_else(|| anyhow!("Performance object not found"))?
        .now())
}

pub fn request_animation_frame(callback: &LoopClosure) -> Result<i32> {
    window()?
        .request_animation_frame(callback.as_ref().unchecked_ref())
        .map_err(|err| anyhow!("Cannot request animation frame : {:#?}", err))
}

pub fn create_raf_closure(f: impl FnMut(f64) + 'static) -> LoopClosure {
    closure_wrap(Box::new(f) as Box<dyn FnMut(f64)>)
}

pub fn closure_wrap<T: WasmClosure + ?Sized>(data: Box<T>) -> Closure<T> {
    Closure::wrap(data)
}

pub fn spawn_local<F>(future: F)
where
    F: Future<Output = ()> + 'static,
{
    wasm_bindgen_futures::spawn_local(future);
}

pub async fn fetch_json<T>(json_path: &str) -> Result<T>
where
    T: DeserializeOwned,
{
    let resp_value = fetch_with_str(json_path).await?;
    let resp: Response = resp_value
        .dyn_into()
        .map_err(|element| anyhow!("error converting [{:#?}] to Response", element))?;
    if !resp.ok() {
        return Err(anyhow!("fetching {} returned status {}", json_path, resp.status()));
    }
    let json = resp
        .json()
        .map_err(|err| anyhow!("Could not get JSON from response [{:#?}]", err))?;

    let json_value = JsFuture::from(json)
        .await
        .map_err(|err| anyhow!("error fetching [{:#?}]", err))?;

    serde_wasm_bindgen::from_value(json_value)
        .map_err(|err| anyhow!("error converting response : {:#?}", err))
}

async fn fetch_with_str(resource: &str) -> Result<JsValue> {
    let resp = window()?.fetch_with_str(resource);

    JsFuture::from(resp)
        .await
        .map_err(|err| anyhow!("error fetching : {:#?}", err))
}
