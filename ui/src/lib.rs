//! yew hooks: a cancellable fetch binding plus timer, storage, socket and
//! DOM helpers.

pub mod executor;
pub mod hooks;
pub mod logs;

pub use executor::YewExecutor;
pub use hooks::*;
