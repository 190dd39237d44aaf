//! Function component hooks.
//!
//! [`use_fetch_with_abort`] and its siblings drive a
//! [`fetcher::CancellableFetcher`] from the component lifecycle. The rest
//! are smaller browser helpers that components tend to pair with it.

pub mod use_debounce;
pub mod use_fetch;
pub mod use_filter_items;
pub mod use_interval;
pub mod use_load_image;
pub mod use_local_storage;
pub mod use_on_click_outside;
pub mod use_previous;
pub mod use_toggle;
pub mod use_websocket;

pub use use_debounce::use_debounce;
pub use use_fetch::{
    FetchHookReturn, use_fetch, use_fetch_with_abort, use_fetch_with_config,
};
pub use use_filter_items::{
    UseFilterItems, filter_items, matches_query, use_filter_items,
};
pub use use_interval::use_interval;
pub use use_load_image::{
    ImageLoad, ImageLoadAction, LoadImageError, use_load_image,
};
pub use use_local_storage::{UseLocalStorage, decode_stored, use_local_storage};
pub use use_on_click_outside::use_on_click_outside;
pub use use_previous::use_previous;
pub use use_toggle::{Toggle, ToggleAction, use_toggle};
pub use use_websocket::{MessageLog, ReadyState, UseWebSocket, use_websocket};
