//! Radix-tree request router.
//!
//! One [`matchit`] tree per HTTP method, O(path-length) lookup. A path that
//! exists under another method resolves to [`Route::MethodNotAllowed`] so the
//! server can answer `405` instead of `404`.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use http::Method;
use matchit::Router as MatchitRouter;

use crate::handler::{self, BoxedHandler};
use crate::request::Request;
use crate::response::IntoResponse;

/// The application router. Build it once at startup and pass it to
/// [`Server::serve`](crate::Server::serve).
pub struct Router {
    routes: HashMap<Method, MatchitRouter<BoxedHandler>>,
}

/// Outcome of a route lookup.
pub(crate) enum Route {
    Found(BoxedHandler),
    MethodNotAllowed,
    NotFound,
}

impl Router {
    pub fn new() -> Self {
        Self { routes: HashMap::new() }
    }

    /// Register a handler for a method + path pair.
    ///
    /// # Panics
    ///
    /// Panics if `path` is not a valid route or conflicts with one already
    /// registered for `method`. Routes are fixed at startup.
    pub fn on<F, Fut, R>(mut self, method: Method, path: &str, handler: F) -> Self
    where
        F: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
        R: IntoResponse,
    {
        self.routes
            .entry(method)
            .or_default()
            .insert(path, handler::boxed(handler))
            .unwrap_or_else(|e| panic!("invalid route `{path}`: {e}"));
        self
    }

    pub fn get<F, Fut, R>(self, path: &str, handler: F) -> Self
    where
        F: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
        R: IntoResponse,
    {
        self.on(Method::GET, path, handler)
    }

    pub(crate) fn lookup(&self, method: &Method, path: &str) -> Route {
        if let Some(matched) = self.routes.get(method).and_then(|tree| tree.at(path).ok()) {
            return Route::Found(Arc::clone(matched.value));
        }

        let elsewhere = self.routes.iter()
            .any(|(m, tree)| m != method && tree.at(path).is_ok());
        if elsewhere { Route::MethodNotAllowed } else { Route::NotFound }
    }
}

impl Default for Router {
    fn default() -> Self { Self::new() }
}
