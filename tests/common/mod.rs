//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;

use mojo::http::{Recorder, Request, Response};
use mojo::{Application, Server};
use tokio::net::TcpListener;
use tokio::sync::oneshot;

/// A running server; dropping it shuts the server down.
pub struct TestServer {
    pub addr: SocketAddr,
    _shutdown: oneshot::Sender<()>,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

/// Serve `app` on an ephemeral port.
pub async fn start_server(app: Application) -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = oneshot::channel::<()>();

    let server = Server::new(Arc::new(app));
    tokio::spawn(async move {
        let shutdown = async {
            let _ = rx.await;
        };
        server.run(listener, shutdown).await.unwrap();
    });

    TestServer {
        addr,
        _shutdown: tx,
    }
}

/// Run one request through the full application pipeline in-process.
pub fn request(app: &Application, req: Request) -> Recorder {
    let recorder = Recorder::new();
    let mut c = app.build_context(req, Response::new().with_writer(recorder.clone()));
    app.serve(&mut c);
    recorder
}

pub fn get(app: &Application, path: &str) -> Recorder {
    request(app, Request::new("GET", path))
}
