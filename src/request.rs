//! Incoming HTTP request type.

use http::Uri;

/// An incoming request, as seen by a handler.
///
/// Only the query string reaches handlers, decoded once up front. Bodies are
/// not read: every route this service exposes is a `GET`.
#[derive(Debug)]
pub struct Request {
    query: Vec<(String, String)>,
}

impl Request {
    pub(crate) fn new(uri: &Uri) -> Self {
        let query = uri.query()
            .map(|q| url::form_urlencoded::parse(q.as_bytes()).into_owned().collect())
            .unwrap_or_default();
        Self { query }
    }

    /// Case-insensitive query parameter lookup, percent-decoded.
    ///
    /// The first occurrence wins. An empty value counts as absent, so
    /// `?take=` behaves like no `take` at all.
    pub fn query(&self, name: &str) -> Option<&str> {
        self.query.iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
            .filter(|v| !v.is_empty())
    }
}
