use std::marker::PhantomData;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CACHE_CONTROL, PRAGMA};
use reqwest::{Request, StatusCode, Url};
use tokio::task::AbortHandle;
use tracing::{debug, warn};

use crate::encoding::{encode_json_body, encode_url_query};
use crate::endpoint::{Endpoint, HttpHeaders, HttpTask, Parameters};
use crate::error::{EncodingError, NetworkError};

pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

/// Performs one HTTP round trip.
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    async fn execute(&self, request: Request) -> Result<TransportResponse, NetworkError>;
}

#[async_trait]
impl Transport for reqwest::Client {
    async fn execute(&self, request: Request) -> Result<TransportResponse, NetworkError> {
        let response = reqwest::Client::execute(self, request).await?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await?.to_vec();
        Ok(TransportResponse {
            status,
            headers,
            body,
        })
    }
}

fn endpoint_url(base: &str, path: &str) -> Result<Url, EncodingError> {
    let invalid = |reason: String| EncodingError::InvalidUrl {
        url: base.to_string(),
        reason,
    };

    let mut url = Url::parse(base).map_err(|e| invalid(e.to_string()))?;
    url.path_segments_mut()
        .map_err(|_| invalid("cannot be a base".to_string()))?
        .pop_if_empty()
        .extend(path.split('/').filter(|segment| !segment.is_empty()));
    Ok(url)
}

fn add_headers(request: &mut Request, headers: &HttpHeaders) -> Result<(), EncodingError> {
    for (key, value) in headers {
        let name = HeaderName::from_bytes(key.as_bytes())
            .map_err(|_| EncodingError::InvalidHeader(key.clone()))?;
        let value =
            HeaderValue::from_str(value).map_err(|_| EncodingError::InvalidHeader(key.clone()))?;
        request.headers_mut().insert(name, value);
    }
    Ok(())
}

fn configure(
    request: &mut Request,
    body: Option<&Parameters>,
    query: Option<&Parameters>,
) -> Result<(), EncodingError> {
    if let Some(body) = body {
        encode_json_body(request, body)?;
    }
    if let Some(query) = query {
        encode_url_query(request, query)?;
    }
    Ok(())
}

/// Turns an endpoint description into a request ready for the transport.
/// Every request bypasses caches and gives up after [`REQUEST_TIMEOUT`].
pub fn build_request<E: Endpoint + ?Sized>(route: &E) -> Result<Request, EncodingError> {
    let url = endpoint_url(route.base_url(), route.path())?;
    let mut request = Request::new(route.method().into(), url);
    *request.timeout_mut() = Some(REQUEST_TIMEOUT);

    let headers = request.headers_mut();
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    headers.insert(PRAGMA, HeaderValue::from_static("no-cache"));

    if let Some(headers) = route.headers() {
        add_headers(&mut request, &headers)?;
    }

    match route.task() {
        HttpTask::Plain => {}
        HttpTask::Parametrized { body, query } => {
            configure(&mut request, body.as_ref(), query.as_ref())?;
        }
        HttpTask::ParametrizedWithHeaders {
            body,
            query,
            headers,
        } => {
            if let Some(headers) = headers {
                add_headers(&mut request, &headers)?;
            }
            configure(&mut request, body.as_ref(), query.as_ref())?;
        }
    }

    Ok(request)
}

/// Aborts the spawned round trip once its caller stops waiting for it.
struct AbortOnDrop(AbortHandle);

impl Drop for AbortOnDrop {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// Sends requests for one kind of endpoint. At most one request is in flight
/// per router: starting a new one aborts the previous.
pub struct Router<E, T = reqwest::Client> {
    transport: Arc<T>,
    in_flight: Mutex<Option<AbortHandle>>,
    _endpoint: PhantomData<fn(&E)>,
}

impl<E: Endpoint> Router<E, reqwest::Client> {
    pub fn with_default_client() -> Self {
        Self::new(reqwest::Client::new())
    }
}

impl<E: Endpoint, T: Transport> Router<E, T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport: Arc::new(transport),
            in_flight: Mutex::new(None),
            _endpoint: PhantomData,
        }
    }

    /// Build errors, transport errors and non-success statuses all come back
    /// through the same `Err`.
    pub async fn request(&self, route: &E) -> Result<TransportResponse, NetworkError> {
        let request = build_request(route).map_err(|e| {
            warn!(path = route.path(), error = %e, "request not sent");
            NetworkError::Build(e)
        })?;
        debug!(method = %request.method(), url = %request.url(), "dispatching");

        let transport = Arc::clone(&self.transport);
        let task = tokio::spawn(async move { transport.execute(request).await });
        let _abandon = AbortOnDrop(task.abort_handle());
        self.replace_in_flight(Some(task.abort_handle()));

        let response = match task.await {
            Ok(result) => result?,
            Err(e) if e.is_cancelled() => return Err(NetworkError::Cancelled),
            Err(e) => return Err(NetworkError::Transport(e.to_string())),
        };

        if !response.status.is_success() {
            return Err(NetworkError::Status {
                status: response.status.as_u16(),
                body: String::from_utf8_lossy(&response.body).into_owned(),
            });
        }
        debug!(status = %response.status, bytes = response.body.len(), "response received");
        Ok(response)
    }

    pub fn cancel(&self) {
        self.replace_in_flight(None);
    }

    fn replace_in_flight(&self, handle: Option<AbortHandle>) {
        let mut in_flight = self
            .in_flight
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(previous) = std::mem::replace(&mut *in_flight, handle) {
            previous.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::endpoint::HttpMethod;
    use reqwest::header::CONTENT_TYPE;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Notify;

    struct TestEndpoint {
        base: &'static str,
        path: &'static str,
        headers: Option<HttpHeaders>,
        task: HttpTask,
    }

    impl TestEndpoint {
        fn new(path: &'static str, task: HttpTask) -> Self {
            Self {
                base: "https://api.example.com/",
                path,
                headers: None,
                task,
            }
        }
    }

    impl Endpoint for TestEndpoint {
        fn base_url(&self) -> &str {
            self.base
        }
        fn path(&self) -> &str {
            self.path
        }
        fn method(&self) -> HttpMethod {
            HttpMethod::Get
        }
        fn headers(&self) -> Option<HttpHeaders> {
            self.headers.clone()
        }
        fn task(&self) -> HttpTask {
            self.task.clone()
        }
    }

    fn params(value: serde_json::Value) -> Option<Parameters> {
        value.as_object().cloned()
    }

    struct NotifyOnDrop<'a>(&'a Notify);

    impl Drop for NotifyOnDrop<'_> {
        fn drop(&mut self) {
            self.0.notify_one();
        }
    }

    /// Answers with the request path as body; "slow" paths never answer in
    /// time and "missing" paths answer 404. A slow call signals `started`
    /// when it begins and `abandoned` when it is dropped.
    #[derive(Default)]
    struct ScriptedTransport {
        calls: AtomicUsize,
        started: Notify,
        abandoned: Notify,
    }

    #[async_trait]
    impl Transport for ScriptedTransport {
        async fn execute(&self, request: Request) -> Result<TransportResponse, NetworkError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let path = request.url().path().to_string();
            if path.ends_with("slow") {
                let _abandoned = NotifyOnDrop(&self.abandoned);
                self.started.notify_one();
                tokio::time::sleep(Duration::from_secs(30)).await;
            }
            let status = if path.ends_with("missing") {
                StatusCode::NOT_FOUND
            } else {
                StatusCode::OK
            };
            Ok(TransportResponse {
                status,
                headers: HeaderMap::new(),
                body: path.into_bytes(),
            })
        }
    }

    #[test]
    fn test_parametrized_request() {
        let route = TestEndpoint::new(
            "games/top",
            HttpTask::Parametrized {
                body: params(json!({ "offset": "0" })),
                query: params(json!({ "limit": "10" })),
            },
        );

        let request = build_request(&route).unwrap();

        assert_eq!(
            request.url().as_str(),
            "https://api.example.com/games/top?limit=10"
        );
        let body = request.body().and_then(|b| b.as_bytes()).unwrap();
        let body: serde_json::Value = serde_json::from_slice(body).unwrap();
        assert_eq!(body, json!({ "offset": "0" }));
        assert_eq!(request.method(), reqwest::Method::GET);
    }

    #[test]
    fn test_plain_request_bypasses_cache() {
        let route = TestEndpoint::new("games/top", HttpTask::Plain);

        let request = build_request(&route).unwrap();

        assert_eq!(request.url().as_str(), "https://api.example.com/games/top");
        assert_eq!(request.timeout(), Some(&REQUEST_TIMEOUT));
        assert_eq!(request.headers()[CACHE_CONTROL], "no-cache");
        assert_eq!(request.headers()[PRAGMA], "no-cache");
        assert!(request.body().is_none());
        assert!(!request.headers().contains_key(CONTENT_TYPE));
    }

    #[test]
    fn test_path_is_appended_to_base_path() {
        let mut route = TestEndpoint::new("/games/top", HttpTask::Plain);
        route.base = "https://api.twitch.tv/kraken";

        let request = build_request(&route).unwrap();

        assert_eq!(
            request.url().as_str(),
            "https://api.twitch.tv/kraken/games/top"
        );
    }

    #[test]
    fn test_extra_headers_are_merged() {
        let mut route = TestEndpoint::new(
            "games/top",
            HttpTask::ParametrizedWithHeaders {
                body: None,
                query: params(json!({ "limit": 5 })),
                headers: Some(HttpHeaders::from([(
                    "Client-ID".to_string(),
                    "override".to_string(),
                )])),
            },
        );
        route.headers = Some(HttpHeaders::from([
            ("Accept".to_string(), "application/json".to_string()),
            ("Client-ID".to_string(), "endpoint".to_string()),
        ]));

        let request = build_request(&route).unwrap();

        assert_eq!(request.headers()["accept"], "application/json");
        assert_eq!(request.headers()["client-id"], "override");
        assert_eq!(request.url().query(), Some("limit=5"));
    }

    #[test]
    fn test_build_errors() {
        let mut bad_url = TestEndpoint::new("games", HttpTask::Plain);
        bad_url.base = "not a url";
        assert!(matches!(
            build_request(&bad_url),
            Err(EncodingError::InvalidUrl { .. })
        ));

        let bad_header = TestEndpoint::new(
            "games",
            HttpTask::ParametrizedWithHeaders {
                body: None,
                query: None,
                headers: Some(HttpHeaders::from([(
                    "bad header".to_string(),
                    "x".to_string(),
                )])),
            },
        );
        assert!(matches!(
            build_request(&bad_header),
            Err(EncodingError::InvalidHeader(name)) if name == "bad header"
        ));
    }

    #[tokio::test]
    async fn test_request_returns_response() {
        let router = Router::new(ScriptedTransport::default());

        let response = router
            .request(&TestEndpoint::new("games/top", HttpTask::Plain))
            .await
            .unwrap();

        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.body, b"/games/top");
    }

    #[tokio::test]
    async fn test_build_error_skips_transport() {
        let router = Router::new(ScriptedTransport::default());
        let route = TestEndpoint::new(
            "games/top",
            HttpTask::Parametrized {
                body: None,
                query: params(json!({ "ids": [1, 2] })),
            },
        );

        let result = router.request(&route).await;

        assert!(matches!(
            result,
            Err(NetworkError::Build(EncodingError::UnsupportedQueryValue(_)))
        ));
        assert_eq!(router.transport.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_error_status_is_surfaced() {
        let router = Router::new(ScriptedTransport::default());

        let result = router
            .request(&TestEndpoint::new("missing", HttpTask::Plain))
            .await;

        assert!(matches!(
            result,
            Err(NetworkError::Status { status: 404, .. })
        ));
    }

    #[tokio::test]
    async fn test_new_request_cancels_previous() {
        let router = Arc::new(Router::new(ScriptedTransport::default()));

        let first = {
            let router = router.clone();
            tokio::spawn(async move {
                router
                    .request(&TestEndpoint::new("slow", HttpTask::Plain))
                    .await
            })
        };
        router.transport.started.notified().await;

        let second = router
            .request(&TestEndpoint::new("fast", HttpTask::Plain))
            .await;

        assert!(second.is_ok());
        let first = tokio::time::timeout(Duration::from_secs(5), first)
            .await
            .expect("first request should end once replaced")
            .unwrap();
        assert!(matches!(first, Err(NetworkError::Cancelled)));
    }

    #[tokio::test]
    async fn test_dropped_request_aborts_transport() {
        let router = Arc::new(Router::new(ScriptedTransport::default()));

        let caller = {
            let router = router.clone();
            tokio::spawn(async move {
                router
                    .request(&TestEndpoint::new("slow", HttpTask::Plain))
                    .await
            })
        };
        router.transport.started.notified().await;

        caller.abort();
        assert!(caller.await.unwrap_err().is_cancelled());

        tokio::time::timeout(Duration::from_secs(5), router.transport.abandoned.notified())
            .await
            .expect("transport call should be dropped with its caller");
    }
}
