//! Translation of a [`RequestInput`] into a wire request.

use crate::base::clienterror::{TlsClientError, TlsClientResult};
use crate::http::orderedheaders::HeaderOrder;
use crate::input::RequestInput;
use bytes::Bytes;
use http::header::{HeaderName, HeaderValue};
use http::{Method, Request, Uri};
use std::str::FromStr;
use url::Url;

/// Request handed to a client. The header order travels as a [`HeaderOrder`]
/// extension.
pub type WireRequest = Request<Bytes>;

/// Build the wire request described by `input`.
///
/// Header keys that differ only in case are distinct input entries; each
/// is sent as its own header line in key order.
pub fn build_request(input: &RequestInput) -> TlsClientResult<WireRequest> {
    if input.request_method.is_empty() || input.request_url.is_empty() {
        return Err(TlsClientError::validation(
            "no request url or request method provided",
        ));
    }

    let body = match input.request_body.as_deref() {
        Some(body) if !body.is_empty() => {
            if !input.headers.contains_key("content-type")
                && !input.headers.contains_key("Content-Type")
            {
                return Err(TlsClientError::validation(
                    "if you are using a request post body please specify a Content-Type Header",
                ));
            }
            Bytes::copy_from_slice(body.as_bytes())
        }
        _ => Bytes::new(),
    };

    let method = Method::from_bytes(input.request_method.as_bytes())
        .map_err(|e| invalid("failed to create request object", e))?;
    let uri = parse_uri(&input.request_url)?;

    let mut request = Request::new(body);
    *request.method_mut() = method;
    *request.uri_mut() = uri;

    let headers = request.headers_mut();
    for (key, value) in &input.headers {
        let name = HeaderName::from_str(key)
            .map_err(|e| invalid(&format!("invalid header name {:?}", key), e))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| invalid(&format!("invalid value for header {:?}", key), e))?;
        headers.append(name, value);
    }

    request
        .extensions_mut()
        .insert(HeaderOrder::new(input.header_order.iter().cloned()));

    Ok(request)
}

fn parse_uri(raw: &str) -> TlsClientResult<Uri> {
    let url = Url::parse(raw).map_err(|e| invalid("failed to create request object", e))?;
    if url.host_str().is_none() {
        return Err(TlsClientError::validation(format!(
            "failed to create request object: url {:?} has no host",
            raw
        )));
    }
    Uri::from_str(url.as_str()).map_err(|e| invalid("failed to create request object", e))
}

fn invalid<E: std::fmt::Display>(context: &str, cause: E) -> TlsClientError {
    TlsClientError::validation(format!("{}: {}", context, cause))
}
