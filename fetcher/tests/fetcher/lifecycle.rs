use fetcher::{FetchOptions, FetcherConfig, Method, Phase};
use serde::Deserialize;
use serde_json::{Value, json};
use test_helpers::{
    MockReply, TestFetcher, run_local, settle, spawn_fetcher,
    spawn_fetcher_with_config,
};

const TODO_URL: &str = "https://jsonplaceholder.typicode.com/todos/1";

#[tokio::test]
async fn first_observation_is_loading() -> anyhow::Result<()> {
    run_local(async {
        let app = spawn_fetcher::<Value>();
        let _gate = app.transport.hold(TODO_URL);

        let snapshot = app.fetcher.observe(TODO_URL);

        assert!(snapshot.loading);
        assert!(snapshot.data.is_none());
        assert!(snapshot.error.is_none());
        assert_eq!(app.fetcher.phase(), Phase::Pending);
        assert_eq!(app.fetcher.key().as_deref(), Some(TODO_URL));

        Ok(())
    })
    .await
}

#[tokio::test]
async fn successful_response_populates_data() -> anyhow::Result<()> {
    run_local(async {
        let app = spawn_fetcher::<Value>();
        app.transport
            .respond(TODO_URL, MockReply::ok(json!({"message": "Success"})));

        app.fetcher.observe(TODO_URL);
        settle().await;

        let snapshot = app.fetcher.snapshot();
        assert_eq!(snapshot.data, Some(json!({"message": "Success"})));
        assert!(!snapshot.loading);
        assert!(snapshot.error.is_none());
        assert_eq!(app.fetcher.phase(), Phase::Succeeded);

        // exactly one change, carrying the terminal snapshot
        assert_eq!(app.changes(), vec![snapshot]);

        Ok(())
    })
    .await
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
struct Todo {
    id: u32,
    title: String,
    completed: bool,
}

#[tokio::test]
async fn body_decodes_into_typed_data() -> anyhow::Result<()> {
    run_local(async {
        let app = spawn_fetcher::<Todo>();
        app.transport.respond(
            TODO_URL,
            MockReply::ok(json!({
                "userId": 1,
                "id": 1,
                "title": "delectus aut autem",
                "completed": false
            })),
        );

        app.fetcher.observe(TODO_URL);
        settle().await;

        let todo = app.fetcher.snapshot().data.expect("todo decoded");
        assert_eq!(
            todo,
            Todo {
                id: 1,
                title: "delectus aut autem".into(),
                completed: false,
            }
        );

        Ok(())
    })
    .await
}

#[tokio::test]
async fn same_key_is_fetched_once() -> anyhow::Result<()> {
    run_local(async {
        let app = spawn_fetcher::<Value>();
        app.transport.respond(TODO_URL, MockReply::ok(json!({"id": 1})));

        // a fresh String each time: equality is by value
        for _ in 0..3 {
            let key = String::from(TODO_URL);
            assert!(app.fetcher.observe(&key).loading);
        }
        settle().await;

        let snapshot = app.fetcher.observe(TODO_URL);
        assert!(!snapshot.loading);
        assert_eq!(snapshot.data, Some(json!({"id": 1})));
        assert_eq!(app.transport.calls(), 1);
        assert_eq!(app.change_count(), 1);

        Ok(())
    })
    .await
}

#[tokio::test]
async fn new_key_after_success_starts_a_new_request() -> anyhow::Result<()> {
    run_local(async {
        let app = spawn_fetcher::<Value>();
        app.transport.respond("/a", MockReply::ok(json!("a")));
        app.transport.respond("/b", MockReply::ok(json!("b")));

        app.fetcher.observe("/a");
        settle().await;
        assert_eq!(app.fetcher.snapshot().data, Some(json!("a")));

        // the previous data is not carried over to the new key
        let snapshot = app.fetcher.observe("/b");
        assert!(snapshot.loading);
        assert!(snapshot.data.is_none());

        settle().await;
        assert_eq!(app.fetcher.snapshot().data, Some(json!("b")));
        assert_eq!(app.transport.calls(), 2);

        Ok(())
    })
    .await
}

#[tokio::test]
async fn refetch_reissues_the_current_key() -> anyhow::Result<()> {
    run_local(async {
        let app = spawn_fetcher::<Value>();
        app.transport.respond(TODO_URL, MockReply::ok(json!({"rev": 1})));
        app.transport.respond(TODO_URL, MockReply::ok(json!({"rev": 2})));

        app.fetcher.observe(TODO_URL);
        settle().await;
        assert_eq!(app.fetcher.snapshot().data, Some(json!({"rev": 1})));

        assert!(app.fetcher.refetch().loading);
        settle().await;

        assert_eq!(app.fetcher.snapshot().data, Some(json!({"rev": 2})));
        assert_eq!(app.transport.calls_for(TODO_URL), 2);
        assert_eq!(app.change_count(), 2);

        Ok(())
    })
    .await
}

#[tokio::test]
async fn refetch_supersedes_the_request_in_flight() -> anyhow::Result<()> {
    run_local(async {
        let app = spawn_fetcher::<Value>();
        let first = app.transport.hold(TODO_URL);
        app.transport.respond(TODO_URL, MockReply::ok(json!({"rev": 2})));

        app.fetcher.observe(TODO_URL);
        settle().await;
        app.fetcher.refetch();
        settle().await;

        assert!(!first.resolve(MockReply::ok(json!({"rev": 1}))));
        settle().await;

        assert_eq!(app.fetcher.snapshot().data, Some(json!({"rev": 2})));
        assert_eq!(app.change_count(), 1);

        Ok(())
    })
    .await
}

#[tokio::test]
async fn refetch_before_any_observation_does_nothing() -> anyhow::Result<()> {
    run_local(async {
        let app = spawn_fetcher::<Value>();

        let snapshot = app.fetcher.refetch();

        assert!(!snapshot.loading);
        assert_eq!(app.fetcher.phase(), Phase::Idle);
        assert_eq!(app.transport.calls(), 0);

        Ok(())
    })
    .await
}

#[tokio::test]
async fn empty_key_is_fetched_by_default() -> anyhow::Result<()> {
    run_local(async {
        let app = spawn_fetcher::<Value>();
        app.transport.respond("", MockReply::ok(json!([])));

        assert!(app.fetcher.observe("").loading);
        settle().await;

        assert_eq!(app.fetcher.snapshot().data, Some(json!([])));
        assert_eq!(app.transport.calls_for(""), 1);

        Ok(())
    })
    .await
}

#[tokio::test]
async fn empty_key_can_park_the_fetcher_idle() -> anyhow::Result<()> {
    run_local(async {
        let app = spawn_fetcher_with_config::<Value>(
            FetcherConfig::default().with_skip_empty_key(true),
        );
        let gate = app.transport.hold(TODO_URL);

        app.fetcher.observe(TODO_URL);
        settle().await;
        let snapshot = app.fetcher.observe("");
        assert!(!snapshot.loading);
        assert_eq!(app.fetcher.phase(), Phase::Idle);
        settle().await;

        // clearing the key cancelled the request that was in flight
        let requests = app.transport.requests();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].cancellation.is_cancelled());

        assert!(!gate.resolve(MockReply::ok(json!({}))));
        settle().await;
        assert_eq!(app.change_count(), 0);

        Ok(())
    })
    .await
}

#[tokio::test]
async fn requests_carry_method_headers_and_json_body() -> anyhow::Result<()> {
    run_local(async {
        let TestFetcher {
            fetcher,
            transport,
            changes,
        } = spawn_fetcher::<Value>();
        let fetcher = fetcher.with_options(
            FetchOptions::default()
                .with_method(Method::POST)
                .with_header("X-Request-Source", "tests")
                .with_json_body(json!({"title": "write tests"})),
        );
        transport.respond(TODO_URL, MockReply::ok(json!({"id": 201})));

        fetcher.observe(TODO_URL);
        settle().await;

        let request = &transport.requests()[0];
        assert_eq!(request.method, Method::POST);
        assert_eq!(request.header("content-type"), Some("application/json"));
        assert_eq!(request.header("x-request-source"), Some("tests"));
        assert_eq!(request.body, Some(json!({"title": "write tests"})));
        assert_eq!(fetcher.snapshot().data, Some(json!({"id": 201})));
        assert_eq!(changes.borrow().len(), 1);

        Ok(())
    })
    .await
}
