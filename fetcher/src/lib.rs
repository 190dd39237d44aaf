//! Lifecycle management for a single cancellable request per consumer.
//!
//! The transport and the scheduler are supplied by the host through the
//! [`Transport`] and [`Executor`] traits; this crate owns only the request
//! state machine and its cancellation rules.

mod cancellation;
mod config;
mod error;
mod executor;
mod fetcher;
mod request;
mod state;
pub mod telemetry;
mod transport;

pub use cancellation::{CancellationHandle, Cancelled};
pub use config::{ConfigError, FetcherConfig};
pub use error::{FetchError, RESPONSE_NOT_OK, TransportError};
pub use executor::Executor;
pub use fetcher::CancellableFetcher;
pub use request::{FetchOptions, FetchRequest, JSON_CONTENT_TYPE};
pub use reqwest::{Method, StatusCode};
pub use state::{FetchSnapshot, Phase, RequestId, RequestPhase, RequestState};
pub use transport::{HttpTransport, Response, Transport, TransportFuture};
