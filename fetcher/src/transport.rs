use futures::FutureExt;
use futures::future::{self, Either, LocalBoxFuture};
use reqwest::StatusCode;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

use crate::{FetchRequest, TransportError};

pub type TransportFuture<T> =
    LocalBoxFuture<'static, Result<T, TransportError>>;

/// A response whose status is known but whose body has not been read yet.
pub trait Response {
    fn status(&self) -> StatusCode;

    /// Read the full body. This is a second suspension point after the
    /// request itself.
    fn body(self: Box<Self>) -> TransportFuture<Vec<u8>>;
}

/// The host's asynchronous HTTP capability.
///
/// Implementations should give up with [`TransportError::Aborted`] when
/// `request.cancellation` is signalled, but the fetcher does not rely on it:
/// it drops the returned future as soon as the handle is signalled.
pub trait Transport {
    fn fetch(
        &self,
        request: FetchRequest,
    ) -> TransportFuture<Box<dyn Response>>;
}

/// [`Transport`] backed by reqwest (the browser `fetch` API on wasm).
#[derive(Clone, Default)]
pub struct HttpTransport {
    pub inner_client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(inner_client: reqwest::Client) -> Self {
        HttpTransport { inner_client }
    }
}

impl Transport for HttpTransport {
    fn fetch(
        &self,
        request: FetchRequest,
    ) -> TransportFuture<Box<dyn Response>> {
        let headers = match header_map(&request.headers) {
            Ok(headers) => headers,
            Err(e) => return future::ready(Err(e)).boxed_local(),
        };
        let mut builder = self
            .inner_client
            .request(request.method.clone(), &request.url)
            .headers(headers);
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        #[cfg(target_arch = "wasm32")]
        let builder = builder.fetch_credentials_include();

        let cancelled = request.cancellation.cancelled();
        async move {
            match future::select(Box::pin(builder.send()), cancelled).await {
                Either::Left((Ok(response), _)) => {
                    Ok(Box::new(HttpResponse(response)) as Box<dyn Response>)
                }
                Either::Left((Err(e), _)) => Err(TransportError::from(e)),
                Either::Right(((), _)) => Err(TransportError::Aborted),
            }
        }
        .boxed_local()
    }
}

/// One value per name; a later entry replaces an earlier one.
fn header_map(
    headers: &[(String, String)],
) -> Result<HeaderMap, TransportError> {
    let mut map = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        let invalid =
            || TransportError::Network(format!("invalid header {name:?}"));
        let header_name =
            HeaderName::from_bytes(name.as_bytes()).map_err(|_| invalid())?;
        let header_value =
            HeaderValue::from_str(value).map_err(|_| invalid())?;
        map.insert(header_name, header_value);
    }
    Ok(map)
}

struct HttpResponse(reqwest::Response);

impl Response for HttpResponse {
    fn status(&self) -> StatusCode {
        self.0.status()
    }

    fn body(self: Box<Self>) -> TransportFuture<Vec<u8>> {
        async move {
            let bytes =
                self.0.bytes().await.map_err(TransportError::from)?;
            Ok::<_, TransportError>(bytes.to_vec())
        }
        .boxed_local()
    }
}
