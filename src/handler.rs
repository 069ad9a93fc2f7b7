//! Route handlers, boxed to one storable type.
//!
//! The country route is a closure capturing the shared service, the liveness
//! route a plain `async fn`. Both are wrapped into a `BoxedHandler` when
//! registered so one router tree can hold them.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::request::Request;
use crate::response::{IntoResponse, Response};

/// `Send` so the multi-threaded runtime may move it between workers.
pub(crate) type BoxFuture = Pin<Box<dyn Future<Output = Response> + Send>>;

/// A registered handler, shared by every connection task.
pub(crate) type BoxedHandler = Arc<dyn Fn(Request) -> BoxFuture + Send + Sync>;

pub(crate) fn boxed<F, Fut, R>(handler: F) -> BoxedHandler
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse,
{
    Arc::new(move |req: Request| -> BoxFuture {
        let fut = handler(req);
        Box::pin(async move { fut.await.into_response() })
    })
}

#[cfg(test)]
mod tests {
    use http::StatusCode;

    use super::*;
    use crate::response::Json;

    #[tokio::test]
    async fn closures_and_fns_share_one_type() {
        async fn plain(_req: Request) -> Response {
            Response::text("plain")
        }
        let label = Arc::new(String::from("captured"));
        let handlers: Vec<BoxedHandler> = vec![
            boxed(plain),
            boxed(move |_req: Request| {
                let label = Arc::clone(&label);
                async move { (StatusCode::ACCEPTED, Json(label.as_str().to_owned())) }
            }),
        ];

        let uri: http::Uri = "/".parse().unwrap();
        let first = handlers[0](Request::new(&uri)).await;
        assert_eq!(first.body(), b"plain");

        let second = handlers[1](Request::new(&uri)).await;
        assert_eq!(second.status_code(), StatusCode::ACCEPTED);
        assert_eq!(second.body(), br#""captured""#);
    }
}
