pub mod mock;
pub mod server;

use std::cell::RefCell;
use std::future::Future;
use std::rc::Rc;
use std::time::Duration;

use fetcher::telemetry;
use fetcher::{
    CancellableFetcher, Executor, FetchError, FetchSnapshot, FetcherConfig,
};
use futures::FutureExt;
use futures::future::LocalBoxFuture;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing_log::LogTracer;
use tracing_subscriber::util::SubscriberInitExt;

pub use mock::{MockGate, MockReply, MockTransport};
pub use server::{StubServer, spawn_stub_server};

/// Polls made by [`wait_until_settled`] before giving up.
const WAIT_ATTEMPTS: usize = 1000;

/// Yields given to the local executor by [`settle`]. A request needs a
/// handful of polls (transport, body, completion), this leaves headroom.
const SETTLE_YIELDS: usize = 32;

/// [`Executor`] backed by the surrounding tokio `LocalSet`.
pub struct LocalExecutor;

impl Executor for LocalExecutor {
    fn spawn_local(&self, task: LocalBoxFuture<'static, ()>) {
        tokio::task::spawn_local(task);
    }

    fn sleep(&self, duration: Duration) -> LocalBoxFuture<'static, ()> {
        tokio::time::sleep(duration).boxed_local()
    }
}

/// A fetcher wired to a mock transport, recording every snapshot passed to
/// its change listener.
pub struct TestFetcher<T = Value> {
    pub fetcher: CancellableFetcher<T>,
    pub transport: MockTransport,
    pub changes: Rc<RefCell<Vec<FetchSnapshot<T>>>>,
}

impl<T: Clone> TestFetcher<T> {
    pub fn changes(&self) -> Vec<FetchSnapshot<T>> {
        self.changes.borrow().clone()
    }

    pub fn change_count(&self) -> usize {
        self.changes.borrow().len()
    }
}

/// Initialise tracing once per test binary. Set `TEST_LOG` to see debug
/// output.
pub fn init_tracing() {
    let filter = if std::env::var("TEST_LOG").is_ok() {
        "debug"
    } else {
        "error"
    };
    let subscriber = telemetry::get_subscriber(filter.into());
    let _ = LogTracer::init();
    let _ = subscriber.try_init();
}

/// Run `f` inside a fresh `LocalSet` so fetch tasks can be spawned.
pub async fn run_local<F: Future>(f: F) -> F::Output {
    tokio::task::LocalSet::new().run_until(f).await
}

/// Let every runnable local task make progress.
pub async fn settle() {
    for _ in 0..SETTLE_YIELDS {
        tokio::task::yield_now().await;
    }
}

/// Wait in real time for a fetcher driven by a real transport to leave
/// `loading`, for up to ten seconds.
pub async fn wait_until_settled<T>(fetcher: &CancellableFetcher<T>)
where
    T: DeserializeOwned + Clone + 'static,
{
    for _ in 0..WAIT_ATTEMPTS {
        if !fetcher.snapshot().loading {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

pub fn spawn_fetcher<T>() -> TestFetcher<T>
where
    T: DeserializeOwned + Clone + 'static,
{
    spawn_fetcher_with_config(FetcherConfig::default())
}

pub fn spawn_fetcher_with_config<T>(config: FetcherConfig) -> TestFetcher<T>
where
    T: DeserializeOwned + Clone + 'static,
{
    init_tracing();

    let transport = MockTransport::new();
    let fetcher = CancellableFetcher::new(
        Rc::new(transport.clone()),
        Rc::new(LocalExecutor),
    )
    .with_config(config);

    let changes = Rc::new(RefCell::new(Vec::new()));
    fetcher.on_change({
        let changes = changes.clone();
        move |snapshot: &FetchSnapshot<T>| {
            changes.borrow_mut().push(snapshot.clone())
        }
    });

    TestFetcher {
        fetcher,
        transport,
        changes,
    }
}

/// Assert that a snapshot settled on an error matching `expected`.
pub fn assert_fetch_error<T>(
    snapshot: &FetchSnapshot<T>,
    expected: impl Fn(&FetchError) -> bool,
) {
    assert!(!snapshot.loading, "snapshot is still loading");
    assert!(snapshot.data.is_none(), "snapshot carries data");
    match &snapshot.error {
        Some(error) => assert!(expected(error), "unexpected error: {error:?}"),
        None => panic!("Expected FetchError"),
    }
}
