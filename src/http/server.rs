//! HTTP server setup.
//!
//! # Responsibilities
//! - Create the Axum router with a single fallback handler
//! - Wire up middleware (tracing, timeout, request ID)
//! - Buffer request bodies up to the configured limit
//! - Run the application on a blocking thread and stream its output back
//! - Record request metrics
//!
//! # Data Flow
//! ```text
//! axum::Request
//!     → Request::from_http
//!     → spawn_blocking(Application::serve)
//!         → ChannelWriter: head over a oneshot, body chunks over an mpsc
//!     → axum::Response with a streaming body
//! ```

use std::convert::Infallible;
use std::future::Future;
use std::io;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::{Body, Bytes},
    extract::State,
    http::{HeaderName, HeaderValue, StatusCode},
    response::IntoResponse,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::{mpsc, oneshot};
use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use uuid::Uuid;

use super::headers::Headers;
use super::writer::ResponseWriter;
use super::{Request, Response};
use crate::app::Application;
use crate::observability::metrics;

/// Header carrying the per-request correlation ID.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Body chunks buffered between the application thread and the client.
const BODY_CHANNEL_CAPACITY: usize = 16;

/// Generates a UUID v4 for requests arriving without an ID.
#[derive(Debug, Clone, Copy, Default)]
struct MakeRequestUuid;

impl MakeRequestId for MakeRequestUuid {
    fn make_request_id<B>(&mut self, _request: &axum::http::Request<B>) -> Option<RequestId> {
        let id = HeaderValue::from_str(&Uuid::new_v4().to_string()).ok()?;
        Some(RequestId::new(id))
    }
}

/// Writer handed to the application for one request.
struct ChannelWriter {
    head: Option<oneshot::Sender<(u16, Headers)>>,
    body: mpsc::Sender<Bytes>,
}

impl io::Write for ChannelWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.body
            .blocking_send(Bytes::copy_from_slice(buf))
            .map_err(|_| io::Error::new(io::ErrorKind::BrokenPipe, "client went away"))?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl ResponseWriter for ChannelWriter {
    fn write_head(&mut self, code: u16, headers: &Headers) -> io::Result<()> {
        let sender = self
            .head
            .take()
            .ok_or_else(|| io::Error::other("head already written"))?;
        sender
            .send((code, headers.clone()))
            .map_err(|_| io::Error::new(io::ErrorKind::BrokenPipe, "client went away"))
    }

    fn head_written(&self) -> bool {
        self.head.is_none()
    }
}

/// HTTP front end for an [`Application`].
#[derive(Debug, Clone)]
pub struct Server {
    app: Arc<Application>,
}

impl Server {
    pub fn new(app: Arc<Application>) -> Self {
        Self { app }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    pub fn router(&self) -> Router {
        let timeout = Duration::from_secs(self.app.config().server.request_timeout_secs);
        let request_id = HeaderName::from_static(X_REQUEST_ID);

        Router::new()
            .fallback(handle)
            .with_state(Arc::clone(&self.app))
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::new(request_id.clone(), MakeRequestUuid))
                    .layer(TraceLayer::new_for_http().make_span_with(
                        |request: &axum::http::Request<Body>| {
                            let id = request
                                .headers()
                                .get(X_REQUEST_ID)
                                .and_then(|v| v.to_str().ok())
                                .unwrap_or("unknown");
                            tracing::info_span!(
                                "request",
                                method = %request.method(),
                                path = %request.uri().path(),
                                request_id = %id,
                            )
                        },
                    ))
                    .layer(TimeoutLayer::new(timeout))
                    .layer(PropagateRequestIdLayer::new(request_id)),
            )
    }

    /// Serve connections from `listener` until `shutdown` resolves.
    pub async fn run<F>(self, listener: TcpListener, shutdown: F) -> io::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown)
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

async fn handle(
    State(app): State<Arc<Application>>,
    request: axum::extract::Request,
) -> axum::response::Response {
    let start = Instant::now();
    let (parts, body) = request.into_parts();
    let method = parts.method.to_string();

    let limit = app.config().server.max_body_size;
    let body = match axum::body::to_bytes(body, limit).await {
        Ok(body) => body,
        Err(e) => {
            tracing::warn!(method = %method, path = %parts.uri.path(), limit, error = %e, "Request body rejected");
            metrics::record_request(&method, 413, start);
            return StatusCode::PAYLOAD_TOO_LARGE.into_response();
        }
    };

    let req = Request::from_http(&parts, body.to_vec());
    let (head_tx, head_rx) = oneshot::channel();
    let (body_tx, body_rx) = mpsc::channel::<Bytes>(BODY_CHANNEL_CAPACITY);
    let writer = ChannelWriter {
        head: Some(head_tx),
        body: body_tx,
    };

    let worker = Arc::clone(&app);
    tokio::task::spawn_blocking(move || {
        let mut c = worker.build_context(req, Response::new().with_writer(writer));
        worker.serve(&mut c);
    });

    let (code, headers) = match head_rx.await {
        Ok(head) => head,
        Err(_) => {
            tracing::error!(method = %method, path = %parts.uri.path(), "Application produced no response");
            metrics::record_request(&method, 500, start);
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    let stream = futures_util::stream::unfold(body_rx, |mut rx| async move {
        rx.recv().await.map(|chunk| (Ok::<_, Infallible>(chunk), rx))
    });
    let mut response = axum::response::Response::new(Body::from_stream(stream));
    *response.status_mut() = StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    *response.headers_mut() = headers.to_header_map();

    metrics::record_request(&method, code, start);
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_channel_writer() {
        let (head_tx, mut head_rx) = oneshot::channel();
        let (body_tx, mut body_rx) = mpsc::channel(4);
        let mut writer = ChannelWriter {
            head: Some(head_tx),
            body: body_tx,
        };

        assert!(!writer.head_written());
        writer.write_head(201, &Headers::from([("X-Test", "1")])).unwrap();
        assert!(writer.head_written());
        assert!(writer.write_head(200, &Headers::new()).is_err());

        writer.write_all(b"chunk").unwrap();
        drop(writer);

        let (code, headers) = head_rx.try_recv().unwrap();
        assert_eq!(code, 201);
        assert_eq!(headers.header("X-Test"), "1");
        assert_eq!(body_rx.try_recv().unwrap(), Bytes::from_static(b"chunk"));
        assert!(body_rx.try_recv().is_err());
    }

    #[test]
    fn test_make_request_id() {
        let request = axum::http::Request::new(());
        let id = MakeRequestUuid.make_request_id(&request).unwrap();
        let value = id.header_value().to_str().unwrap();
        assert!(Uuid::parse_str(value).is_ok());
    }
}
