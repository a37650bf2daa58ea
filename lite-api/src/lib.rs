//! lite-api: a thin HTTP gateway for hotel availability search.
//!
//! Clients query `GET /hotels/` with stay dates, currency, nationality,
//! hotel ids and room occupancies. The request is validated, translated
//! into the Hotelbeds availability format, sent upstream with a signed
//! request, and the answer is reduced to one price per hotel in the
//! requested currency. The raw supplier exchange is echoed back alongside.

pub mod client;
pub mod clock;
pub mod config;
pub mod dto;
pub mod handlers;
pub mod model;
pub mod service;
pub mod telemetry;

use std::{
    any::Any,
    future::{Future, IntoFuture},
    sync::Arc,
    time::Duration,
};

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use tokio::{net::TcpListener, sync::Notify};
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};
use tracing::{error, warn};

use crate::service::HotelService;

// ------------------------------------------------------------------ //
//  Shared application state                                           //
// ------------------------------------------------------------------ //

/// Shared state injected into every Axum handler via `State`.
pub struct AppState {
    pub service: HotelService,
}

/// Build the HTTP router.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::health))
        .route("/hotels", get(handlers::search_hotels))
        .route("/hotels/", get(handlers::search_hotels))
        .layer(TraceLayer::new_for_http())
        .layer(CatchPanicLayer::custom(panic_response))
        .with_state(Arc::new(state))
}

fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic payload");
    error!(panic = detail, "handler panicked");

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(serde_json::json!({"error": "internal server error"})),
    )
        .into_response()
}

/// Time in-flight requests get to finish once shutdown starts.
pub const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

/// Serve `router` until `shutdown` resolves, then stop accepting connections
/// and give in-flight requests at most `drain` to complete.
pub async fn serve<F>(
    listener: TcpListener,
    router: Router,
    shutdown: F,
    drain: Duration,
) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let draining = Arc::new(Notify::new());
    let signal = {
        let draining = Arc::clone(&draining);
        async move {
            shutdown.await;
            draining.notify_one();
        }
    };

    let server = axum::serve(listener, router)
        .with_graceful_shutdown(signal)
        .into_future();
    let deadline = async {
        draining.notified().await;
        tokio::time::sleep(drain).await;
    };

    tokio::select! {
        res = server => res,
        _ = deadline => {
            warn!(drain_secs = drain.as_secs_f64(), "in-flight requests still running, stopping anyway");
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;
    use tokio::io::AsyncWriteExt;
    use tokio::net::TcpStream;
    use tokio::sync::oneshot;

    async fn bind() -> (TcpListener, std::net::SocketAddr) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        (listener, addr)
    }

    #[tokio::test]
    async fn idle_server_stops_on_signal() {
        let (listener, _) = bind().await;
        let (tx, rx) = oneshot::channel::<()>();
        let server = tokio::spawn(serve(
            listener,
            Router::new().route("/", get(|| async { "ok" })),
            async move {
                let _ = rx.await;
            },
            Duration::from_secs(30),
        ));

        tx.send(()).unwrap();
        let res = tokio::time::timeout(Duration::from_secs(5), server)
            .await
            .expect("server did not stop")
            .unwrap();
        assert!(res.is_ok());
    }

    #[tokio::test]
    async fn stuck_request_does_not_hold_shutdown_past_drain() {
        let (listener, addr) = bind().await;
        let started = Arc::new(Notify::new());
        let router = {
            let started = Arc::clone(&started);
            Router::new().route(
                "/stuck",
                get(move || {
                    let started = Arc::clone(&started);
                    async move {
                        started.notify_one();
                        std::future::pending::<&'static str>().await
                    }
                }),
            )
        };
        let (tx, rx) = oneshot::channel::<()>();
        let server = tokio::spawn(serve(
            listener,
            router,
            async move {
                let _ = rx.await;
            },
            Duration::from_millis(200),
        ));

        let mut conn = TcpStream::connect(addr).await.unwrap();
        conn.write_all(b"GET /stuck HTTP/1.1\r\nHost: localhost\r\n\r\n")
            .await
            .unwrap();
        started.notified().await;

        let begun = Instant::now();
        tx.send(()).unwrap();
        let res = tokio::time::timeout(Duration::from_secs(5), server)
            .await
            .expect("shutdown was not bounded")
            .unwrap();
        assert!(res.is_ok());
        assert!(begun.elapsed() >= Duration::from_millis(200));
    }
}
