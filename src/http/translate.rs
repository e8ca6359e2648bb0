//! Translation of a wire response into the caller-facing [`Response`].

use crate::base::clienterror::{TlsClientError, TlsClientResult};
use crate::http::HttpResponse;
use cookie::Cookie;
use http::header::SET_COOKIE;
use http::HeaderMap;
use serde::Serialize;
use std::collections::HashMap;
use tracing::trace;

/// Fully read response bound to a session.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    pub session_id: String,
    pub status: u16,
    pub body: String,
    #[serde(serialize_with = "serialize_headers")]
    pub headers: HeaderMap,
    pub cookies: HashMap<String, String>,
}

/// Headers as name to list of values, values decoded lossily.
fn serialize_headers<S: serde::Serializer>(headers: &HeaderMap, s: S) -> Result<S::Ok, S::Error> {
    use serde::ser::SerializeMap;
    let mut map = s.serialize_map(Some(headers.keys_len()))?;
    for name in headers.keys() {
        let values: Vec<String> = headers
            .get_all(name)
            .iter()
            .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
            .collect();
        map.serialize_entry(name.as_str(), &values)?;
    }
    map.end()
}

/// Drain `response` and build a [`Response`].
///
/// The body is consumed exactly once and released on every path. Fails only
/// when reading the body fails.
pub async fn build_response(
    session_id: &str,
    response: HttpResponse,
    cookies: &[Cookie<'static>],
) -> TlsClientResult<Response> {
    let (status, _, headers, body) = response.into_parts();
    let bytes = body
        .bytes()
        .await
        .map_err(|e| TlsClientError::io("failed to read response body", e))?;

    trace!(
        session_id,
        status = status.as_u16(),
        len = bytes.len(),
        "response drained"
    );

    Ok(Response {
        session_id: session_id.to_string(),
        status: status.as_u16(),
        body: String::from_utf8_lossy(&bytes).into_owned(),
        headers,
        cookies: cookies_to_map(cookies),
    })
}

/// Flatten cookies into name to serialized cookie. The last cookie with a
/// given name wins.
pub fn cookies_to_map(cookies: &[Cookie<'_>]) -> HashMap<String, String> {
    cookies
        .iter()
        .map(|c| (c.name().to_string(), c.to_string()))
        .collect()
}

/// Parse every `Set-Cookie` header; malformed ones are skipped.
pub fn cookies_from_headers(headers: &HeaderMap) -> Vec<Cookie<'static>> {
    headers
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .filter_map(|v| Cookie::parse(v.to_string()).ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;

    #[test]
    fn test_cookies_to_map_distinct() {
        let cookies = vec![Cookie::new("a", "1"), Cookie::new("b", "2")];
        let map = cookies_to_map(&cookies);
        assert_eq!(map.len(), 2);
        assert_eq!(map["a"], "a=1");
    }

    #[test]
    fn test_cookies_to_map_last_wins() {
        let cookies = vec![Cookie::new("a", "1"), Cookie::new("a", "2")];
        let map = cookies_to_map(&cookies);
        assert_eq!(map.len(), 1);
        assert_eq!(map["a"], "a=2");
    }

    #[test]
    fn test_cookie_attributes_serialized() {
        let cookie = Cookie::parse("sid=xyz; Path=/; HttpOnly").unwrap();
        let map = cookies_to_map(&[cookie]);
        assert!(map["sid"].starts_with("sid=xyz"));
        assert!(map["sid"].contains("HttpOnly"));
    }

    #[test]
    fn test_cookies_from_headers() {
        let mut headers = HeaderMap::new();
        headers.append(SET_COOKIE, HeaderValue::from_static("a=1; Path=/"));
        headers.append(SET_COOKIE, HeaderValue::from_static("b=2"));
        headers.append(SET_COOKIE, HeaderValue::from_static("=novalue"));
        let cookies = cookies_from_headers(&headers);
        let names: Vec<_> = cookies.iter().map(|c| c.name()).collect();
        assert_eq!(names, vec!["a", "b"]);
    }
}
