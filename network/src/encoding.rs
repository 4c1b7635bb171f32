use reqwest::header::{HeaderValue, CONTENT_TYPE};
use reqwest::Request;
use serde_json::Value;

use crate::endpoint::Parameters;
use crate::error::EncodingError;

const JSON: &str = "application/json";
const FORM: &str = "application/x-www-form-urlencoded; charset=utf-8";

/// Writes `parameters` as a JSON object into the request body.
pub fn encode_json_body(request: &mut Request, parameters: &Parameters) -> Result<(), EncodingError> {
    let body = serde_json::to_vec(parameters)?;
    *request.body_mut() = Some(body.into());

    if !request.headers().contains_key(CONTENT_TYPE) {
        request
            .headers_mut()
            .insert(CONTENT_TYPE, HeaderValue::from_static(JSON));
    }
    Ok(())
}

/// Appends `parameters` to the request URL's query string. Only scalar values
/// have a query string form.
pub fn encode_url_query(request: &mut Request, parameters: &Parameters) -> Result<(), EncodingError> {
    if parameters.is_empty() {
        return Ok(());
    }

    let pairs = parameters
        .iter()
        .map(|(key, value)| {
            let value = match value {
                Value::String(s) => s.clone(),
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                _ => return Err(EncodingError::UnsupportedQueryValue(key.clone())),
            };
            Ok((key.as_str(), value))
        })
        .collect::<Result<Vec<_>, _>>()?;

    request.url_mut().query_pairs_mut().extend_pairs(pairs);

    if !request.headers().contains_key(CONTENT_TYPE) {
        request
            .headers_mut()
            .insert(CONTENT_TYPE, HeaderValue::from_static(FORM));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::{Method, Url};
    use serde_json::json;

    fn request() -> Request {
        Request::new(
            Method::GET,
            Url::parse("https://api.example.com/games/top").unwrap(),
        )
    }

    fn params(value: Value) -> Parameters {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_query_values_are_stringified() {
        let mut request = request();
        encode_url_query(
            &mut request,
            &params(json!({ "limit": 25, "live": true, "q": "hello world" })),
        )
        .unwrap();

        assert_eq!(
            request.url().as_str(),
            "https://api.example.com/games/top?limit=25&live=true&q=hello+world"
        );
        assert_eq!(request.headers()[CONTENT_TYPE], FORM);
    }

    #[test]
    fn test_nested_query_value_is_rejected() {
        let mut request = request();
        let result = encode_url_query(&mut request, &params(json!({ "filter": { "a": 1 } })));

        assert!(matches!(
            result,
            Err(EncodingError::UnsupportedQueryValue(key)) if key == "filter"
        ));
        assert_eq!(request.url().query(), None);
    }

    #[test]
    fn test_empty_query_leaves_request_alone() {
        let mut request = request();
        encode_url_query(&mut request, &Parameters::new()).unwrap();

        assert_eq!(request.url().query(), None);
        assert!(!request.headers().contains_key(CONTENT_TYPE));
    }

    #[test]
    fn test_json_body() {
        let mut request = request();
        encode_json_body(&mut request, &params(json!({ "offset": "0" }))).unwrap();

        let body = request.body().and_then(|b| b.as_bytes()).unwrap();
        assert_eq!(body, br#"{"offset":"0"}"#);
        assert_eq!(request.headers()[CONTENT_TYPE], JSON);
    }

    #[test]
    fn test_existing_content_type_is_kept() {
        let mut request = request();
        request
            .headers_mut()
            .insert(CONTENT_TYPE, HeaderValue::from_static("text/plain"));
        encode_json_body(&mut request, &params(json!({ "a": 1 }))).unwrap();

        assert_eq!(request.headers()[CONTENT_TYPE], "text/plain");
    }
}
