//! Request lifecycle state.
//!
//! Each observation of a new key creates one [`RequestState`]. The phase enum
//! carries the payload, so `data` can only exist once a request has
//! succeeded and `error` only once it has failed:
//!
//! ```text
//! Idle
//! Pending ──► Succeeded(data)
//!    │   ──► Failed(error)
//!    └─────► Cancelled   (superseded or torn down, not surfaced)
//! ```

use derive_more::Display;

use crate::{CancellationHandle, FetchError};

/// Identifies one request within a fetcher. Strictly increasing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display)]
#[display("#{_0}")]
pub struct RequestId(pub u64);

/// Payload-free view of a [`RequestPhase`], for logging and assertions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Phase {
    Idle,
    Pending,
    Succeeded,
    Failed,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RequestPhase<T> {
    Idle,
    Pending,
    Succeeded(T),
    Failed(FetchError),
    Cancelled,
}

impl<T> RequestPhase<T> {
    pub fn kind(&self) -> Phase {
        match self {
            Self::Idle => Phase::Idle,
            Self::Pending => Phase::Pending,
            Self::Succeeded(_) => Phase::Succeeded,
            Self::Failed(_) => Phase::Failed,
            Self::Cancelled => Phase::Cancelled,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            Self::Succeeded(data) => Some(data),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&FetchError> {
        match self {
            Self::Failed(error) => Some(error),
            _ => None,
        }
    }
}

/// One logical fetch lifecycle for one key.
#[derive(Debug)]
pub struct RequestState<T> {
    pub id: RequestId,
    pub key: String,
    pub phase: RequestPhase<T>,
    pub token: CancellationHandle,
}

impl<T> RequestState<T> {
    pub fn pending(id: RequestId, key: String) -> Self {
        RequestState {
            id,
            key,
            phase: RequestPhase::Pending,
            token: CancellationHandle::new(),
        }
    }

    pub fn idle(id: RequestId, key: String) -> Self {
        RequestState {
            id,
            key,
            phase: RequestPhase::Idle,
            token: CancellationHandle::new(),
        }
    }

    /// Signal the token and, if the request had not settled yet, park it in
    /// `Cancelled`. Terminal phases keep their payload.
    pub fn supersede(&mut self) {
        self.token.signal();
        if self.phase.is_pending() {
            self.phase = RequestPhase::Cancelled;
        }
    }
}

impl<T: Clone> RequestState<T> {
    pub fn snapshot(&self) -> FetchSnapshot<T> {
        FetchSnapshot {
            data: self.phase.data().cloned(),
            loading: self.phase.is_pending(),
            error: self.phase.error().cloned(),
        }
    }
}

/// What a consumer sees: `(data, loading, error)` for the current key.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchSnapshot<T> {
    pub data: Option<T>,
    pub loading: bool,
    pub error: Option<FetchError>,
}

impl<T> Default for FetchSnapshot<T> {
    fn default() -> Self {
        FetchSnapshot {
            data: None,
            loading: false,
            error: None,
        }
    }
}
