use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::time::Duration;

use futures::FutureExt;
use futures::future::{self, Either, LocalBoxFuture};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::{
    Executor, FetchError, FetchOptions, FetchRequest, FetchSnapshot,
    FetcherConfig, Phase, RequestId, RequestPhase, RequestState, Transport,
};

type ChangeListener<T> = Rc<dyn Fn(&FetchSnapshot<T>)>;

struct Shared<T> {
    /// The only state allowed to change what the consumer sees.
    current: Option<RequestState<T>>,
    next_id: u64,
    torn_down: bool,
    listener: Option<ChangeListener<T>>,
}

impl<T> Shared<T> {
    fn new() -> Self {
        Shared {
            current: None,
            next_id: 0,
            torn_down: false,
            listener: None,
        }
    }

    fn next_request_id(&mut self) -> RequestId {
        self.next_id += 1;
        RequestId(self.next_id)
    }
}

/// Keeps `(data, loading, error)` in step with the most recent request for
/// the current key.
///
/// Observing a new key supersedes the previous request: its cancellation
/// handle is signalled, its transport future is dropped, and whatever it
/// eventually produces is discarded. Observing the same key again is free.
///
/// # Example
///
/// ```rust,ignore
/// let fetcher = CancellableFetcher::<serde_json::Value>::new(
///     Rc::new(HttpTransport::default()),
///     executor,
/// );
/// fetcher.on_change(|snapshot| render(snapshot));
///
/// let snapshot = fetcher.observe("https://api.example.com/data");
/// assert!(snapshot.loading);
/// ```
pub struct CancellableFetcher<T = Value> {
    transport: Rc<dyn Transport>,
    executor: Rc<dyn Executor>,
    options: FetchOptions,
    config: FetcherConfig,
    shared: Rc<RefCell<Shared<T>>>,
}

impl<T> CancellableFetcher<T> {
    pub fn new(
        transport: Rc<dyn Transport>,
        executor: Rc<dyn Executor>,
    ) -> Self {
        CancellableFetcher {
            transport,
            executor,
            options: FetchOptions::default(),
            config: FetcherConfig::default(),
            shared: Rc::new(RefCell::new(Shared::new())),
        }
    }

    pub fn with_options(mut self, options: FetchOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_config(mut self, config: FetcherConfig) -> Self {
        self.config = config;
        self
    }

    pub fn phase(&self) -> Phase {
        self.shared
            .borrow()
            .current
            .as_ref()
            .map_or(Phase::Idle, |state| state.phase.kind())
    }

    /// The key of the current request, if any key has been observed.
    pub fn key(&self) -> Option<String> {
        self.shared
            .borrow()
            .current
            .as_ref()
            .map(|state| state.key.clone())
    }

    pub fn is_torn_down(&self) -> bool {
        self.shared.borrow().torn_down
    }

    /// Cancel the live request and stop all further observable changes.
    /// Called automatically on drop.
    pub fn teardown(&self) {
        let mut shared = self.shared.borrow_mut();
        if shared.torn_down {
            return;
        }
        shared.torn_down = true;
        shared.listener = None;
        if let Some(current) = shared.current.as_mut() {
            tracing::debug!(
                request_id = %current.id,
                key = %current.key,
                phase = %current.phase.kind(),
                "tearing down fetcher"
            );
            current.supersede();
        }
    }
}

impl<T> CancellableFetcher<T>
where
    T: DeserializeOwned + Clone + 'static,
{
    /// Register the consumer's change listener, replacing any previous one.
    ///
    /// It is called with the new snapshot after each asynchronous phase
    /// change of the current request, never for a superseded request and
    /// never after teardown. No internal borrow is held during the call.
    pub fn on_change(&self, listener: impl Fn(&FetchSnapshot<T>) + 'static) {
        let mut shared = self.shared.borrow_mut();
        if !shared.torn_down {
            shared.listener = Some(Rc::new(listener));
        }
    }

    /// Observe `key`, starting a request if it differs from the current key.
    ///
    /// Does not call the change listener; the returned snapshot already
    /// reflects the observation.
    pub fn observe(&self, key: &str) -> FetchSnapshot<T> {
        let (snapshot, task) = {
            let mut shared = self.shared.borrow_mut();
            if shared.torn_down {
                tracing::debug!(key, "observe after teardown ignored");
                return FetchSnapshot::default();
            }
            if let Some(current) = &shared.current {
                if current.key == key {
                    return current.snapshot();
                }
            }
            self.begin(&mut shared, key.to_string())
        };
        self.spawn(task);
        snapshot
    }

    /// Re-issue the request for the current key, superseding the one in
    /// flight. Does nothing before the first observation or after teardown.
    pub fn refetch(&self) -> FetchSnapshot<T> {
        let (snapshot, task) = {
            let mut shared = self.shared.borrow_mut();
            if shared.torn_down {
                return FetchSnapshot::default();
            }
            let Some(key) = shared.current.as_ref().map(|s| s.key.clone())
            else {
                return FetchSnapshot::default();
            };
            self.begin(&mut shared, key)
        };
        self.spawn(task);
        snapshot
    }

    pub fn snapshot(&self) -> FetchSnapshot<T> {
        self.shared
            .borrow()
            .current
            .as_ref()
            .map(RequestState::snapshot)
            .unwrap_or_default()
    }

    fn begin(
        &self,
        shared: &mut Shared<T>,
        key: String,
    ) -> (FetchSnapshot<T>, Option<LocalBoxFuture<'static, ()>>) {
        if let Some(previous) = shared.current.as_mut() {
            if previous.phase.is_pending() {
                tracing::debug!(
                    request_id = %previous.id,
                    key = %previous.key,
                    "superseding in-flight request"
                );
            }
            previous.supersede();
        }

        let id = shared.next_request_id();
        if key.is_empty() && self.config.skip_empty_key {
            tracing::debug!(request_id = %id, "empty key, staying idle");
            shared.current = Some(RequestState::idle(id, key));
            return (FetchSnapshot::default(), None);
        }

        let state = RequestState::pending(id, key);
        tracing::debug!(
            request_id = %id,
            key = %state.key,
            method = %self.options.method,
            "starting request"
        );
        let task = RequestTask {
            id,
            request: FetchRequest::new(
                &state.key,
                &self.options,
                state.token.clone(),
            ),
            transport: self.transport.clone(),
            executor: self.executor.clone(),
            timeout: self.config.timeout,
            shared: Rc::downgrade(&self.shared),
        };
        let snapshot = state.snapshot();
        shared.current = Some(state);
        (snapshot, Some(task.run().boxed_local()))
    }

    /// Spawn outside of any borrow so an eager executor cannot re-enter.
    fn spawn(&self, task: Option<LocalBoxFuture<'static, ()>>) {
        if let Some(task) = task {
            self.executor.spawn_local(task);
        }
    }
}

impl<T> Drop for CancellableFetcher<T> {
    fn drop(&mut self) {
        self.teardown();
    }
}

/// Everything one in-flight request needs, detached from the fetcher.
struct RequestTask<T> {
    id: RequestId,
    request: FetchRequest,
    transport: Rc<dyn Transport>,
    executor: Rc<dyn Executor>,
    timeout: Option<Duration>,
    shared: Weak<RefCell<Shared<T>>>,
}

impl<T> RequestTask<T>
where
    T: DeserializeOwned + Clone + 'static,
{
    async fn run(self) {
        let RequestTask {
            id,
            request,
            transport,
            executor,
            timeout,
            shared,
        } = self;
        let token = request.cancellation.clone();
        if token.is_cancelled() {
            tracing::debug!(
                request_id = %id,
                "request superseded before it was sent"
            );
            return;
        }

        let exchange = exchange::<T>(transport, request).boxed_local();
        let deadline = match timeout {
            Some(timeout) => executor.sleep(timeout),
            None => future::pending().boxed_local(),
        };
        let interrupted = future::select(token.cancelled(), deadline);

        let result = match future::select(exchange, interrupted).await {
            Either::Left((result, _)) => result,
            Either::Right((Either::Left(_), _)) => {
                tracing::debug!(
                    request_id = %id,
                    "request cancelled in flight"
                );
                return;
            }
            Either::Right((Either::Right(_), _)) => {
                Err(FetchError::Timeout(timeout.unwrap_or_default()))
            }
        };

        if token.is_cancelled() {
            tracing::debug!(
                request_id = %id,
                "dropping result of cancelled request"
            );
            return;
        }
        settle(&shared, id, result);
    }
}

async fn exchange<T: DeserializeOwned>(
    transport: Rc<dyn Transport>,
    request: FetchRequest,
) -> Result<T, FetchError> {
    let response = transport.fetch(request).await?;
    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::HttpStatus(status));
    }
    let body = response.body().await?;
    Ok(serde_json::from_slice(&body)?)
}

/// Write a result, but only if request `id` is still the live one.
fn settle<T: Clone>(
    shared: &Weak<RefCell<Shared<T>>>,
    id: RequestId,
    result: Result<T, FetchError>,
) {
    let Some(shared) = shared.upgrade() else {
        tracing::debug!(request_id = %id, "fetcher dropped before settling");
        return;
    };

    let (snapshot, listener) = {
        let mut shared = shared.borrow_mut();
        if shared.torn_down {
            tracing::debug!(
                request_id = %id,
                "fetcher torn down, dropping result"
            );
            return;
        }
        let Some(state) = shared
            .current
            .as_mut()
            .filter(|state| state.id == id && state.phase.is_pending())
        else {
            tracing::debug!(
                request_id = %id,
                "dropping result of superseded request"
            );
            return;
        };

        state.phase = match result {
            Ok(data) => {
                tracing::info!(
                    request_id = %id,
                    key = %state.key,
                    "request succeeded"
                );
                RequestPhase::Succeeded(data)
            }
            Err(error) => {
                tracing::warn!(
                    request_id = %id,
                    key = %state.key,
                    %error,
                    "request failed"
                );
                RequestPhase::Failed(error)
            }
        };
        let snapshot = state.snapshot();
        (snapshot, shared.listener.clone())
    };

    if let Some(listener) = listener {
        listener(&snapshot);
    }
}
