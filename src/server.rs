//! HTTP server and graceful shutdown.
//!
//! Each accepted connection runs on its own tokio task and speaks HTTP/1.1 or
//! HTTP/2, whichever the client negotiates. On shutdown the server stops
//! accepting and asks every open connection to close gracefully: idle
//! keep-alive connections close at once, in-flight requests finish first.
//!
//! A request whose client disconnects is dropped mid-flight, which also drops
//! any outbound upstream call its handler was awaiting.

use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use bytes::Bytes;
use http::StatusCode;
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::service::service_fn;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as ConnBuilder;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::{Instrument, error, info, info_span};

use crate::error::Error;
use crate::request::Request;
use crate::response::Response;
use crate::router::{Route, Router};

/// The HTTP server, bound and ready to serve.
pub struct Server {
    listener: TcpListener,
    addr: SocketAddr,
}

impl Server {
    /// Binds a listener on `addr`. Port `0` picks a free port; read it back
    /// with [`local_addr`](Server::local_addr).
    pub async fn bind(addr: SocketAddr) -> Result<Self, Error> {
        let listener = TcpListener::bind(addr).await?;
        let addr = listener.local_addr()?;
        Ok(Self { listener, addr })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    /// Serves until SIGTERM or Ctrl-C, then drains in-flight connections.
    pub async fn serve(self, router: Router) -> Result<(), Error> {
        self.serve_with_shutdown(router, shutdown_signal()).await
    }

    /// Serves until `signal` resolves, then drains in-flight connections.
    pub async fn serve_with_shutdown(
        self,
        router: Router,
        signal: impl Future<Output = ()>,
    ) -> Result<(), Error> {
        let Self { listener, addr } = self;
        let router = Arc::new(router);
        let mut tasks = tokio::task::JoinSet::new();
        let (shutdown_tx, shutdown_rx) = watch::channel(());

        tokio::pin!(signal);
        info!(%addr, "countries-api listening");

        loop {
            tokio::select! {
                // Checked first so a shutdown stops new accepts immediately.
                biased;

                () = &mut signal => {
                    info!(in_flight = tasks.len(), "shutdown signal received, draining connections");
                    break;
                }

                res = listener.accept() => {
                    let (stream, peer) = match res {
                        Ok(v) => v,
                        Err(e) => {
                            error!("accept error: {e}");
                            continue;
                        }
                    };

                    let router = Arc::clone(&router);
                    let mut shutdown = shutdown_rx.clone();
                    let io = TokioIo::new(stream);

                    tasks.spawn(async move {
                        let svc = service_fn(move |req| dispatch(Arc::clone(&router), req));
                        let builder = ConnBuilder::new(TokioExecutor::new());
                        let conn = builder.serve_connection(io, svc);
                        tokio::pin!(conn);

                        let res = tokio::select! {
                            res = conn.as_mut() => res,
                            _ = shutdown.changed() => {
                                conn.as_mut().graceful_shutdown();
                                conn.as_mut().await
                            }
                        };
                        if let Err(e) = res {
                            error!(%peer, "connection error: {e}");
                        }
                    });
                }

                // Reap finished connections so the set stays bounded.
                Some(_) = tasks.join_next(), if !tasks.is_empty() => {}
            }
        }

        shutdown_tx.send_replace(());
        while tasks.join_next().await.is_some() {}

        info!("countries-api stopped");
        Ok(())
    }
}

/// Routes one request and produces one response, logging a line per request.
/// Every failure becomes a response, so hyper never sees an error.
async fn dispatch(
    router: Arc<Router>,
    req: hyper::Request<Incoming>,
) -> Result<http::Response<Full<Bytes>>, Infallible> {
    let started = Instant::now();
    let (parts, _body) = req.into_parts();
    let span = info_span!("request", method = %parts.method, path = %parts.uri.path());

    let response = async move {
        let route = router.lookup(&parts.method, parts.uri.path());
        let response = match route {
            Route::Found(handler) => handler(Request::new(&parts.uri)).await,
            Route::MethodNotAllowed => Response::status(StatusCode::METHOD_NOT_ALLOWED),
            Route::NotFound => Response::status(StatusCode::NOT_FOUND),
        };
        info!(
            status = response.status_code().as_u16(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "request completed"
        );
        response
    }
    .instrument(span)
    .await;

    Ok(response.into_hyper())
}

/// Resolves on SIGTERM (Kubernetes pod termination) or Ctrl-C.
///
/// If a handler cannot be installed, that signal is logged and ignored so the
/// server keeps running on the other.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("failed to install Ctrl-C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let sigterm = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut term) => {
                term.recv().await;
            }
            Err(e) => {
                error!("failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let sigterm = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c  => {}
        () = sigterm => {}
    }
}
