use std::collections::BTreeMap;
use std::fmt::Display;

pub type HttpHeaders = BTreeMap<String, String>;
pub type Parameters = serde_json::Map<String, serde_json::Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl From<HttpMethod> for reqwest::Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Patch => reqwest::Method::PATCH,
            HttpMethod::Delete => reqwest::Method::DELETE,
        }
    }
}

impl Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", reqwest::Method::from(*self))
    }
}

/// How an endpoint's parameters go on the wire.
#[derive(Debug, Clone, PartialEq)]
pub enum HttpTask {
    /// No body and no query string.
    Plain,
    /// `body` is sent as JSON, `query` is URL-encoded into the query string.
    Parametrized {
        body: Option<Parameters>,
        query: Option<Parameters>,
    },
    /// Like `Parametrized`, with extra headers merged in first.
    ParametrizedWithHeaders {
        body: Option<Parameters>,
        query: Option<Parameters>,
        headers: Option<HttpHeaders>,
    },
}

pub trait Endpoint: Send + Sync {
    fn base_url(&self) -> &str;
    fn path(&self) -> &str;
    fn method(&self) -> HttpMethod;
    fn headers(&self) -> Option<HttpHeaders>;
    fn task(&self) -> HttpTask;
}
