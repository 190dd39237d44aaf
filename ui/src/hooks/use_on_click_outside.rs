use wasm_bindgen::prelude::*;
use web_sys::{Event, Node};
use yew::prelude::*;

const EVENTS: [&str; 2] = ["mousedown", "touchstart"];

/// Calls `handler` on every mouse or touch press that lands outside the
/// element behind `node`. Presses are ignored while `node` is not mounted.
#[hook]
pub fn use_on_click_outside(node: NodeRef, handler: Callback<Event>) {
    use_effect_with((node, handler), |(node, handler)| {
        let node = node.clone();
        let handler = handler.clone();
        let closure = Closure::wrap(Box::new(move |event: Event| {
            let Some(element) = node.get() else {
                return;
            };
            let target =
                event.target().and_then(|t| t.dyn_into::<Node>().ok());
            if !element.contains(target.as_ref()) {
                handler.emit(event);
            }
        }) as Box<dyn FnMut(Event)>);

        let document = web_sys::window().and_then(|w| w.document());
        if let Some(document) = &document {
            for name in EVENTS {
                if let Err(e) = document.add_event_listener_with_callback(
                    name,
                    closure.as_ref().unchecked_ref(),
                ) {
                    tracing::error!(
                        event = name,
                        error = ?e,
                        "Failed to add listener"
                    );
                }
            }
        }

        // Rust owns the closure; JS only holds a pointer to it
        move || {
            if let Some(document) = document {
                for name in EVENTS {
                    let _ = document.remove_event_listener_with_callback(
                        name,
                        closure.as_ref().unchecked_ref(),
                    );
                }
            }
            drop(closure);
        }
    });
}
