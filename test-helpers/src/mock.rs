//! Scripted transport for fetcher tests.
//!
//! Replies are queued per url and handed out in order. A reply can be
//! available immediately ([`MockTransport::respond`]) or held back until the
//! test releases it through a [`MockGate`] ([`MockTransport::hold`]), which is
//! how tests arrange for an older request to finish after a newer one.

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

use fetcher::{
    FetchRequest, Response, StatusCode, Transport, TransportError,
    TransportFuture,
};
use futures::FutureExt;
use futures::channel::oneshot;
use serde_json::Value;

/// What the mock transport answers with.
#[derive(Debug, Clone)]
pub enum MockReply {
    Body { status: StatusCode, body: Vec<u8> },
    Fail(TransportError),
}

impl MockReply {
    /// `200 OK` with a JSON body.
    pub fn ok(body: Value) -> Self {
        Self::json(StatusCode::OK, body)
    }

    pub fn json(status: StatusCode, body: Value) -> Self {
        MockReply::Body {
            status,
            body: body.to_string().into_bytes(),
        }
    }

    /// A body that is not necessarily valid JSON.
    pub fn raw(status: StatusCode, body: &str) -> Self {
        MockReply::Body {
            status,
            body: body.as_bytes().to_vec(),
        }
    }

    pub fn network_error(message: &str) -> Self {
        MockReply::Fail(TransportError::Network(message.to_string()))
    }
}

enum Script {
    Ready(MockReply),
    Held(oneshot::Receiver<MockReply>),
}

/// Releases a held reply.
pub struct MockGate {
    sender: oneshot::Sender<MockReply>,
}

impl MockGate {
    /// Deliver the reply. Returns false if the request was already dropped,
    /// which is what happens to a superseded request.
    pub fn resolve(self, reply: MockReply) -> bool {
        self.sender.send(reply).is_ok()
    }
}

#[derive(Default)]
struct Inner {
    scripts: HashMap<String, VecDeque<Script>>,
    requests: Vec<FetchRequest>,
}

/// Cloneable handle; clones share scripts and the request log.
#[derive(Clone, Default)]
pub struct MockTransport {
    inner: Rc<RefCell<Inner>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a reply that is available as soon as `url` is fetched.
    pub fn respond(&self, url: &str, reply: MockReply) {
        self.push(url, Script::Ready(reply));
    }

    /// Queue a reply for `url` that stays pending until the gate resolves.
    pub fn hold(&self, url: &str) -> MockGate {
        let (sender, receiver) = oneshot::channel();
        self.push(url, Script::Held(receiver));
        MockGate { sender }
    }

    /// Number of requests issued so far, for any url.
    pub fn calls(&self) -> usize {
        self.inner.borrow().requests.len()
    }

    pub fn calls_for(&self, url: &str) -> usize {
        self.inner
            .borrow()
            .requests
            .iter()
            .filter(|request| request.url == url)
            .count()
    }

    pub fn requests(&self) -> Vec<FetchRequest> {
        self.inner.borrow().requests.clone()
    }

    fn push(&self, url: &str, script: Script) {
        self.inner
            .borrow_mut()
            .scripts
            .entry(url.to_string())
            .or_default()
            .push_back(script);
    }
}

impl Transport for MockTransport {
    fn fetch(
        &self,
        request: FetchRequest,
    ) -> TransportFuture<Box<dyn Response>> {
        let script = {
            let mut inner = self.inner.borrow_mut();
            inner.requests.push(request.clone());
            inner
                .scripts
                .get_mut(&request.url)
                .and_then(VecDeque::pop_front)
        };
        let url = request.url;
        let cancellation = request.cancellation;

        async move {
            let reply = match script {
                Some(Script::Ready(reply)) => reply,
                Some(Script::Held(receiver)) => match receiver.await {
                    Ok(reply) => reply,
                    Err(_) => {
                        return Err(TransportError::Network(
                            "mock gate dropped".to_string(),
                        ));
                    }
                },
                None => {
                    return Err(TransportError::Network(format!(
                        "no mock reply queued for {url}"
                    )));
                }
            };
            if cancellation.is_cancelled() {
                return Err(TransportError::Aborted);
            }
            match reply {
                MockReply::Body { status, body } => {
                    Ok(Box::new(MockResponse { status, body })
                        as Box<dyn Response>)
                }
                MockReply::Fail(error) => Err(error),
            }
        }
        .boxed_local()
    }
}

struct MockResponse {
    status: StatusCode,
    body: Vec<u8>,
}

impl Response for MockResponse {
    fn status(&self) -> StatusCode {
        self.status
    }

    fn body(self: Box<Self>) -> TransportFuture<Vec<u8>> {
        async move {
            // reading the body is its own suspension point
            tokio::task::yield_now().await;
            Ok(self.body)
        }
        .boxed_local()
    }
}
