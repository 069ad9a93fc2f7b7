//! Outgoing HTTP response type and the [`IntoResponse`] conversion trait.

use bytes::Bytes;
use http::header::{CONTENT_TYPE, HeaderValue};
use http::{HeaderMap, StatusCode};
use http_body_util::Full;
use serde::Serialize;
use tracing::error;

const JSON: &str = "application/json";
const TEXT: &str = "text/plain; charset=utf-8";

/// An outgoing HTTP response.
///
/// ```rust
/// use countries_api::Response;
/// use http::StatusCode;
///
/// Response::text("ok");
/// Response::status(StatusCode::NOT_FOUND);
/// ```
#[derive(Debug)]
pub struct Response {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl Response {
    /// `200 OK` with a `text/plain` body.
    pub fn text(body: impl Into<String>) -> Self {
        Self::with_body(StatusCode::OK, TEXT, Bytes::from(body.into()))
    }

    /// Response with no body.
    pub fn status(status: StatusCode) -> Self {
        Self { status, headers: HeaderMap::new(), body: Bytes::new() }
    }

    fn with_body(status: StatusCode, content_type: &'static str, body: Bytes) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
        Self { status, headers, body }
    }

    pub fn status_code(&self) -> StatusCode { self.status }
    pub fn body(&self) -> &[u8] { &self.body }

    /// Hands the response to hyper. `content-length` is derived from the body.
    pub(crate) fn into_hyper(self) -> http::Response<Full<Bytes>> {
        let mut res = http::Response::new(Full::new(self.body));
        *res.status_mut() = self.status;
        *res.headers_mut() = self.headers;
        res
    }
}

/// Conversion into an HTTP [`Response`]; anything a handler returns implements it.
pub trait IntoResponse {
    fn into_response(self) -> Response;
}

impl IntoResponse for Response {
    fn into_response(self) -> Response { self }
}

/// A serde-serialized JSON body, `200 OK` unless paired with a status.
///
/// ```rust
/// use countries_api::{IntoResponse, Json};
/// use http::StatusCode;
///
/// let ok = Json(vec!["Canada"]).into_response();
/// let rejected = (StatusCode::BAD_REQUEST, Json("nope")).into_response();
/// ```
pub struct Json<T>(pub T);

impl<T: Serialize> IntoResponse for Json<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, self).into_response()
    }
}

impl<T: Serialize> IntoResponse for (StatusCode, Json<T>) {
    fn into_response(self) -> Response {
        let (status, Json(value)) = self;
        match serde_json::to_vec(&value) {
            Ok(bytes) => Response::with_body(status, JSON, Bytes::from(bytes)),
            Err(e) => {
                error!(error = %e, "response serialization failed");
                Response::status(StatusCode::INTERNAL_SERVER_ERROR)
            }
        }
    }
}
