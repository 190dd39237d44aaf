use std::rc::Rc;

use wasm_bindgen::prelude::*;
use web_sys::{CloseEvent, Event, MessageEvent, WebSocket};
use yew::prelude::*;

/// `WebSocket.readyState`, see
/// <https://developer.mozilla.org/en-US/docs/Web/API/WebSocket/readyState>
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadyState {
    Connecting,
    Open,
    Closing,
    Closed,
}

impl ReadyState {
    pub fn from_code(code: u16) -> Self {
        match code {
            WebSocket::CONNECTING => Self::Connecting,
            WebSocket::OPEN => Self::Open,
            WebSocket::CLOSING => Self::Closing,
            _ => Self::Closed,
        }
    }
}

/// Text messages received so far, oldest first. Kept across reconnects.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MessageLog(pub Vec<String>);

impl Reducible for MessageLog {
    type Action = String;

    fn reduce(self: Rc<Self>, message: String) -> Rc<Self> {
        let mut messages = self.0.clone();
        messages.push(message);
        Rc::new(MessageLog(messages))
    }
}

/// Return value from the use_websocket hook.
pub struct UseWebSocket {
    pub messages: Vec<String>,
    /// Send a text frame. Logs an error instead when the socket is not open.
    pub send_message: Callback<String>,
}

/// An open socket with its listeners. Dropping it removes the listeners and
/// closes the socket.
struct Connection {
    socket: WebSocket,
    on_open: Closure<dyn FnMut(Event)>,
    on_message: Closure<dyn FnMut(MessageEvent)>,
    on_close: Closure<dyn FnMut(CloseEvent)>,
}

impl Connection {
    fn open(
        url: &str,
        messages: UseReducerDispatcher<MessageLog>,
    ) -> Result<Self, JsValue> {
        let socket = WebSocket::new(url)?;

        let on_open = {
            let url = url.to_string();
            Closure::wrap(Box::new(move |_: Event| {
                tracing::info!(url = %url, "WebSocket connected");
            }) as Box<dyn FnMut(Event)>)
        };
        let on_message = Closure::wrap(Box::new(move |event: MessageEvent| {
            match event.data().as_string() {
                Some(text) => messages.dispatch(text),
                None => tracing::debug!("Ignoring binary WebSocket message"),
            }
        }) as Box<dyn FnMut(MessageEvent)>);
        let on_close = {
            let url = url.to_string();
            Closure::wrap(Box::new(move |event: CloseEvent| {
                tracing::info!(
                    url = %url,
                    code = event.code(),
                    "WebSocket disconnected"
                );
            }) as Box<dyn FnMut(CloseEvent)>)
        };

        socket.add_event_listener_with_callback(
            "open",
            on_open.as_ref().unchecked_ref(),
        )?;
        socket.add_event_listener_with_callback(
            "message",
            on_message.as_ref().unchecked_ref(),
        )?;
        socket.add_event_listener_with_callback(
            "close",
            on_close.as_ref().unchecked_ref(),
        )?;

        Ok(Connection {
            socket,
            on_open,
            on_message,
            on_close,
        })
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        let _ = self.socket.remove_event_listener_with_callback(
            "open",
            self.on_open.as_ref().unchecked_ref(),
        );
        let _ = self.socket.remove_event_listener_with_callback(
            "message",
            self.on_message.as_ref().unchecked_ref(),
        );
        let _ = self.socket.remove_event_listener_with_callback(
            "close",
            self.on_close.as_ref().unchecked_ref(),
        );
        if let Err(e) = self.socket.close() {
            tracing::error!(error = ?e, "Failed to close WebSocket");
        }
    }
}

/// Keep a WebSocket connection to `url` open while the component is mounted.
///
/// A new `url` closes the previous socket before connecting again. Incoming
/// text messages are appended to `messages`.
///
/// # Example
/// ```ignore
/// let chat = use_websocket("wss://chat.example.com/room/1");
/// chat.send_message.emit("hello".into());
/// ```
#[hook]
pub fn use_websocket(url: &str) -> UseWebSocket {
    let messages = use_reducer(MessageLog::default);
    let socket = use_mut_ref(|| None::<WebSocket>);

    {
        let dispatcher = messages.dispatcher();
        let socket = socket.clone();
        use_effect_with(url.to_string(), move |url| {
            let connection = match Connection::open(url, dispatcher) {
                Ok(connection) => Some(connection),
                Err(e) => {
                    tracing::error!(
                        url = %url,
                        error = ?e,
                        "Failed to open WebSocket"
                    );
                    None
                }
            };
            *socket.borrow_mut() =
                connection.as_ref().map(|c| c.socket.clone());

            move || {
                socket.borrow_mut().take();
                drop(connection);
            }
        });
    }

    let send_message = Callback::from(move |message: String| {
        let socket = socket.borrow();
        match socket.as_ref() {
            Some(socket)
                if ReadyState::from_code(socket.ready_state())
                    == ReadyState::Open =>
            {
                if let Err(e) = socket.send_with_str(&message) {
                    tracing::error!(error = ?e, "Failed to send message");
                }
            }
            _ => {
                tracing::error!("WebSocket is not open. Unable to send message.")
            }
        }
    });

    UseWebSocket {
        messages: messages.0.clone(),
        send_message,
    }
}
