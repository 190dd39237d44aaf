use std::rc::Rc;
use std::time::Duration;

use fetcher::{
    CancellableFetcher, FetchError, FetcherConfig, HttpTransport,
    RESPONSE_NOT_OK, StatusCode, TransportError,
};
use serde::Deserialize;
use serde_json::{Value, json};
use test_helpers::{
    LocalExecutor, MockReply, assert_fetch_error, run_local, settle,
    spawn_fetcher, spawn_fetcher_with_config, wait_until_settled,
};

const URL: &str = "https://api.example.com/items";

#[tokio::test]
async fn non_success_status_is_reported_with_a_fixed_message()
-> anyhow::Result<()> {
    run_local(async {
        let app = spawn_fetcher::<Value>();
        app.transport.respond(
            URL,
            MockReply::json(
                StatusCode::NOT_FOUND,
                json!({"message": "Not Found"}),
            ),
        );

        app.fetcher.observe(URL);
        settle().await;

        let snapshot = app.fetcher.snapshot();
        assert_fetch_error(&snapshot, |e| {
            *e == FetchError::HttpStatus(StatusCode::NOT_FOUND)
        });
        // the server's message is not echoed
        let error = snapshot.error.unwrap();
        assert_eq!(error.to_string(), RESPONSE_NOT_OK);
        assert_eq!(app.change_count(), 1);

        Ok(())
    })
    .await
}

#[tokio::test]
async fn transport_failure_surfaces_that_error() -> anyhow::Result<()> {
    run_local(async {
        let app = spawn_fetcher::<Value>();
        app.transport
            .respond(URL, MockReply::network_error("Fetch failed"));

        app.fetcher.observe(URL);
        settle().await;

        let snapshot = app.fetcher.snapshot();
        assert_fetch_error(&snapshot, |e| {
            *e == FetchError::Transport(TransportError::Network(
                "Fetch failed".into(),
            ))
        });
        assert_eq!(snapshot.error.unwrap().to_string(), "Fetch failed");

        Ok(())
    })
    .await
}

#[tokio::test]
async fn invalid_json_is_a_decode_error() -> anyhow::Result<()> {
    run_local(async {
        let app = spawn_fetcher::<Value>();
        app.transport
            .respond(URL, MockReply::raw(StatusCode::OK, "<html>oops</html>"));

        app.fetcher.observe(URL);
        settle().await;

        assert_fetch_error(&app.fetcher.snapshot(), |e| {
            matches!(e, FetchError::Decode(_))
        });

        Ok(())
    })
    .await
}

#[derive(Debug, Clone, Deserialize)]
#[allow(dead_code)]
struct Item {
    id: u32,
}

#[tokio::test]
async fn body_of_the_wrong_shape_is_a_decode_error() -> anyhow::Result<()> {
    run_local(async {
        let app = spawn_fetcher::<Item>();
        app.transport.respond(URL, MockReply::ok(json!({"id": "seven"})));

        app.fetcher.observe(URL);
        settle().await;

        assert_fetch_error(&app.fetcher.snapshot(), |e| {
            matches!(e, FetchError::Decode(m) if m.contains("invalid type"))
        });

        Ok(())
    })
    .await
}

#[tokio::test]
async fn abort_not_requested_by_the_fetcher_is_an_error() -> anyhow::Result<()>
{
    run_local(async {
        let app = spawn_fetcher::<Value>();
        app.transport
            .respond(URL, MockReply::Fail(TransportError::Aborted));

        app.fetcher.observe(URL);
        settle().await;

        // loading must still end when something else aborted the request
        assert_fetch_error(&app.fetcher.snapshot(), |e| {
            *e == FetchError::Transport(TransportError::Aborted)
        });

        Ok(())
    })
    .await
}

#[tokio::test]
async fn slow_request_times_out() -> anyhow::Result<()> {
    run_local(async {
        let timeout = Duration::from_millis(20);
        let app = spawn_fetcher_with_config::<Value>(
            FetcherConfig::default().with_timeout(timeout),
        );
        let gate = app.transport.hold(URL);

        assert!(app.fetcher.observe(URL).loading);
        tokio::time::sleep(Duration::from_millis(80)).await;
        settle().await;

        assert_fetch_error(&app.fetcher.snapshot(), |e| {
            *e == FetchError::Timeout(timeout)
        });
        // the exchange was dropped along with its pending reply
        assert!(!gate.resolve(MockReply::ok(json!({}))));
        assert_eq!(app.change_count(), 1);

        Ok(())
    })
    .await
}

#[tokio::test]
async fn unreachable_host_fails_over_http() -> anyhow::Result<()> {
    run_local(async {
        test_helpers::init_tracing();
        let fetcher = CancellableFetcher::<Value>::new(
            Rc::new(HttpTransport::default()),
            Rc::new(LocalExecutor),
        )
        .with_config(
            FetcherConfig::default().with_timeout(Duration::from_secs(10)),
        );

        // nothing listens on the discard port
        assert!(fetcher.observe("http://127.0.0.1:9/data").loading);
        wait_until_settled(&fetcher).await;

        assert_fetch_error(&fetcher.snapshot(), |e| {
            matches!(
                e,
                FetchError::Transport(TransportError::Network(_))
                    | FetchError::Timeout(_)
            )
        });

        Ok(())
    })
    .await
}
