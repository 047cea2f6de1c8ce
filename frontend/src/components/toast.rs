//! Transient notifications. Every failed API call ends up here; nothing is
//! retried.

use gloo_console::error;
use wasm_bindgen::JsCast;
use web_sys::HtmlElement;

const TOAST_MS: u32 = 3000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Info,
    Error,
}

impl Tone {
    fn background(&self) -> &'static str {
        match self {
            Tone::Info => "rgba(0, 0, 0, 0.8)",
            Tone::Error => "rgba(176, 0, 32, 0.9)",
        }
    }
}

pub fn show_toast(message: &str) {
    toast(message, Tone::Info);
}

/// Shows `message` as an error and mirrors it to the console.
pub fn show_error(message: impl std::fmt::Display) {
    let message = message.to_string();
    error!(message.clone());
    toast(&message, Tone::Error);
}

fn toast(message: &str, tone: Tone) {
    let Some(document) = web_sys::window().and_then(|w| w.document()) else {
        return;
    };
    if let (Ok(toast), Some(body)) = (document.create_element("div"), document.body()) {
        // set_text_content: server messages are not markup
        toast.set_text_content(Some(message));
        let html_toast: HtmlElement = toast.unchecked_into();
        let style = html_toast.style();
        style.set_property("position", "fixed").ok();
        style.set_property("bottom", "20px").ok();
        style.set_property("left", "50%").ok();
        style.set_property("transform", "translateX(-50%)").ok();
        style.set_property("background", tone.background()).ok();
        style.set_property("color", "#fff").ok();
        style.set_property("padding", "10px 20px").ok();
        style.set_property("border-radius", "4px").ok();
        style.set_property("z-index", "10000").ok();
        style.set_property("font-family", "Arial, sans-serif").ok();

        if body.append_child(&html_toast).is_ok() {
            wasm_bindgen_futures::spawn_local(async move {
                gloo_timers::future::TimeoutFuture::new(TOAST_MS).await;
                if let Some(parent) = html_toast.parent_node() {
                    parent.remove_child(&html_toast).ok();
                }
            });
        }
    }
}
