// Chain server: exposes runnables at `{path}/invoke`
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use log::{error, info, warn};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;

use crate::callbacks::CallbackHandler;
use crate::core::Runnable;
use crate::error::RelayError;
use crate::models::{InvokeRequest, InvokeResponse};

pub type SharedChain = Arc<dyn Runnable<HashMap<String, String>, String>>;

#[derive(Clone)]
struct RouteState {
    path: String,
    chain: SharedChain,
    input_variables: Vec<String>,
    callbacks: Option<Arc<dyn CallbackHandler>>,
}

pub struct ChainServer {
    title: String,
    routes: Vec<RouteState>,
    callbacks: Option<Arc<dyn CallbackHandler>>,
    server_handle: Mutex<Option<tokio::task::JoinHandle<()>>>,
}

impl ChainServer {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            routes: Vec::new(),
            callbacks: None,
            server_handle: Mutex::new(None),
        }
    }

    pub fn with_callbacks(mut self, handler: Arc<dyn CallbackHandler>) -> Self {
        self.callbacks = Some(handler);
        self
    }

    /// Serve `chain` at `{path}/invoke`; `input_variables` feed `{path}/input_schema`.
    /// Adding a path that is already served replaces the earlier chain.
    pub fn add_routes(mut self, path: &str, chain: SharedChain, input_variables: Vec<String>) -> Self {
        let trimmed = path.trim().trim_matches('/');
        let path = if trimmed.is_empty() {
            String::new()
        } else {
            format!("/{}", trimmed)
        };
        let route = RouteState {
            path,
            chain,
            input_variables,
            callbacks: None,
        };

        match self.routes.iter_mut().find(|existing| existing.path == route.path) {
            Some(existing) => {
                warn!("Replacing chain served at {}/invoke", route.path);
                *existing = route;
            }
            None => self.routes.push(route),
        }
        self
    }

    pub fn paths(&self) -> Vec<&str> {
        self.routes.iter().map(|route| route.path.as_str()).collect()
    }

    pub fn router(&self) -> Router {
        let title = self.title.clone();
        let mut router = Router::new().route(
            "/",
            get(move || {
                let title = title.clone();
                async move { title }
            }),
        );

        for route in &self.routes {
            let mut state = route.clone();
            state.callbacks = self.callbacks.clone();
            router = router
                .route(
                    &format!("{}/invoke", state.path),
                    post(invoke_route).with_state(state.clone()),
                )
                .route(
                    &format!("{}/input_schema", state.path),
                    get(input_schema).with_state(state),
                );
        }

        router.layer(CorsLayer::permissive())
    }

    // Run in the foreground until the listener fails
    pub async fn serve(&self, address: &str) -> Result<(), RelayError> {
        let listener = TcpListener::bind(address).await?;
        info!("{} listening on http://{} (routes: {:?})", self.title, listener.local_addr()?, self.paths());
        axum::serve(listener, self.router()).await?;
        Ok(())
    }

    // Run in a background task; returns the bound address
    pub async fn start(&self, address: &str) -> Result<SocketAddr, RelayError> {
        let listener = TcpListener::bind(address).await?;
        let local_addr = listener.local_addr()?;
        let app = self.router();

        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                error!("Chain server error: {}", e);
            }
        });

        if let Ok(mut server_handle) = self.server_handle.lock() {
            *server_handle = Some(handle);
        }
        info!("{} started on http://{}", self.title, local_addr);
        Ok(local_addr)
    }

    pub fn stop(&self) {
        if let Ok(mut server_handle) = self.server_handle.lock() {
            if let Some(handle) = server_handle.take() {
                handle.abort();
                info!("{} stopped", self.title);
            }
        }
    }
}

#[axum::debug_handler]
async fn invoke_route(State(state): State<RouteState>, Json(payload): Json<InvokeRequest>) -> Response {
    if let Some(callbacks) = &state.callbacks {
        callbacks.on_chain_start(&state.path, &payload.input);
    }

    match state.chain.invoke(payload.input).await {
        Ok(output) => {
            if let Some(callbacks) = &state.callbacks {
                callbacks.on_chain_end(&state.path, &output);
            }
            Json(InvokeResponse::new(output)).into_response()
        }
        Err(e) => {
            if let Some(callbacks) = &state.callbacks {
                callbacks.on_chain_error(&state.path, &e.to_string());
            }
            let status = match e {
                RelayError::MissingPlaceholder { .. } | RelayError::InvalidTemplate(_) => {
                    StatusCode::UNPROCESSABLE_ENTITY
                }
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            };
            error!("{}/invoke failed: {}", state.path, e);
            (status, Json(json!({ "detail": e.to_string() }))).into_response()
        }
    }
}

#[axum::debug_handler]
async fn input_schema(State(state): State<RouteState>) -> Json<Value> {
    let properties: serde_json::Map<String, Value> = state
        .input_variables
        .iter()
        .map(|name| (name.clone(), json!({ "title": name, "type": "string" })))
        .collect();

    Json(json!({
        "title": format!("{}Input", state.path.trim_start_matches('/')),
        "type": "object",
        "properties": properties,
        "required": state.input_variables,
    }))
}
