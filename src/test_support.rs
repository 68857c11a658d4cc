//! Test helpers: an in-process stand-in for the config service

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::Value;
use std::collections::HashMap;
use std::net::TcpListener;
use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;

#[derive(Clone)]
struct StubState {
    documents: Arc<Mutex<HashMap<String, Value>>>,
    probe_status: StatusCode,
}

/// Config service stub serving `/api/configs` on a random local port
pub(crate) struct StubConfigService {
    endpoint: String,
    shutdown: Option<oneshot::Sender<()>>,
}

pub(crate) struct StubConfigServiceBuilder {
    documents: HashMap<String, Value>,
    probe_status: StatusCode,
}

impl StubConfigService {
    pub(crate) fn builder() -> StubConfigServiceBuilder {
        StubConfigServiceBuilder {
            documents: HashMap::new(),
            probe_status: StatusCode::OK,
        }
    }

    pub(crate) fn start() -> Self {
        Self::builder().start()
    }

    pub(crate) fn endpoint(&self) -> String {
        self.endpoint.clone()
    }
}

impl Drop for StubConfigService {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
    }
}

impl StubConfigServiceBuilder {
    pub(crate) fn document(mut self, name: &str, document: Value) -> Self {
        self.documents.insert(name.to_string(), document);
        self
    }

    pub(crate) fn probe_status(mut self, status: u16) -> Self {
        self.probe_status = StatusCode::from_u16(status).unwrap();
        self
    }

    pub(crate) fn start(self) -> StubConfigService {
        let state = StubState {
            documents: Arc::new(Mutex::new(self.documents)),
            probe_status: self.probe_status,
        };
        let app = Router::new()
            .route("/api/configs", get(probe))
            .route("/api/configs/:name", get(get_document).put(put_document))
            .with_state(state);

        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.set_nonblocking(true).unwrap();
        let addr = listener.local_addr().unwrap();
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        std::thread::spawn(move || {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap();
            runtime.block_on(async move {
                let listener = tokio::net::TcpListener::from_std(listener).unwrap();
                let _ = axum::serve(listener, app)
                    .with_graceful_shutdown(async {
                        let _ = shutdown_rx.await;
                    })
                    .await;
            });
        });

        StubConfigService {
            endpoint: format!("http://{}/api/configs", addr),
            shutdown: Some(shutdown_tx),
        }
    }
}

async fn probe(State(state): State<StubState>) -> StatusCode {
    state.probe_status
}

async fn get_document(State(state): State<StubState>, Path(name): Path<String>) -> Response {
    let documents = state.documents.lock().unwrap();
    match documents.get(&name) {
        Some(document) => Json(document.clone()).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn put_document(
    State(state): State<StubState>,
    Path(name): Path<String>,
    Json(document): Json<Value>,
) -> StatusCode {
    state.documents.lock().unwrap().insert(name, document);
    StatusCode::NO_CONTENT
}

/// URL on a local port nothing listens on
pub(crate) fn closed_port_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{}/api/configs", port)
}
