use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Router, middleware,
    routing::{get, post},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use clinic_auth::{AuthState, authenticate, require_role};
use clinic_storage::{AccountStore, PatientStore, Role};

use crate::handlers;

/// Shared application state: the two storage interfaces plus auth.
///
/// Everything here is immutable after startup; the only cross-request
/// shared resource is whatever pool the stores hold internally.
#[derive(Clone)]
pub struct AppState {
    pub accounts: Arc<dyn AccountStore>,
    pub patients: Arc<dyn PatientStore>,
    pub auth: AuthState,
}

/// Builds the full router.
///
/// Public routes sit at the root; everything under `/api` passes the token
/// gate first and then a per-group role gate.
pub fn build_app(state: AppState) -> Router {
    let receptionist = Router::new()
        .route(
            "/patients",
            post(handlers::add_patient).get(handlers::list_patients),
        )
        .route(
            "/patients/{id}",
            get(handlers::get_patient)
                .put(handlers::update_patient)
                .delete(handlers::delete_patient),
        )
        .route(
            "/patients/{id}/export/csv",
            get(handlers::export_patient_csv),
        )
        .layer(middleware::from_fn(|req, next| {
            require_role(&[Role::Receptionist], req, next)
        }));

    let doctor = Router::new()
        .route("/patients", get(handlers::list_patients))
        .route(
            "/patients/{id}",
            get(handlers::get_patient).put(handlers::update_diagnosis),
        )
        .route(
            "/patients/{id}/export/csv",
            get(handlers::export_patient_csv),
        )
        .layer(middleware::from_fn(|req, next| {
            require_role(&[Role::Doctor], req, next)
        }));

    let api = Router::new()
        .nest("/receptionist", receptionist)
        .nest("/doctor", doctor)
        .layer(middleware::from_fn_with_state(
            state.auth.clone(),
            authenticate,
        ));

    Router::new()
        .route("/healthz", get(handlers::healthz))
        .route("/register", post(handlers::register))
        .route("/login", post(handlers::login))
        .nest("/api", api)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub struct ClinicServer {
    addr: SocketAddr,
    app: Router,
}

impl ClinicServer {
    /// Runs the server until ctrl-c.
    pub async fn run(self) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(self.addr).await?;
        tracing::info!(addr = %self.addr, "server listening");
        axum::serve(listener, self.app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;
        Ok(())
    }
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("shutdown signal received");
}

pub struct ServerBuilder {
    addr: SocketAddr,
    state: AppState,
}

impl ServerBuilder {
    pub fn new(state: AppState) -> Self {
        Self {
            addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            state,
        }
    }

    pub fn with_addr(mut self, addr: SocketAddr) -> Self {
        self.addr = addr;
        self
    }

    pub fn build(self) -> ClinicServer {
        let app = build_app(self.state);
        ClinicServer {
            addr: self.addr,
            app,
        }
    }
}
