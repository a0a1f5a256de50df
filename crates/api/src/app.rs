use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use domain::services::{AccountService, KeyValueStore, Ledger};
use domain::DomainError;
use persistence::repositories::EventRepository;

use crate::config::Config;
use crate::error::ApiError;
use crate::middleware::{metrics_handler, metrics_middleware, require_admin, require_user, trace_id};
use crate::routes::{admin, auth, events, health, registrations, users};
use crate::services::SessionStore;

/// Store handle shared by every service.
pub type SharedStore = Arc<dyn KeyValueStore>;

/// The ledger as wired by the server: events and registrations in one store.
pub type AppLedger = Ledger<EventRepository<SharedStore>, SharedStore>;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub ledger: Arc<Mutex<AppLedger>>,
    pub accounts: Arc<Mutex<AccountService<SharedStore>>>,
    pub sessions: Arc<SessionStore>,
}

impl AppState {
    pub fn new(config: Config, store: SharedStore) -> Result<Self, DomainError> {
        let catalog = EventRepository::new(Arc::clone(&store));
        let ledger = Ledger::open(catalog, Arc::clone(&store))?;

        Ok(Self {
            config: Arc::new(config),
            ledger: Arc::new(Mutex::new(ledger)),
            accounts: Arc::new(Mutex::new(AccountService::new(store))),
            sessions: Arc::new(SessionStore::new()),
        })
    }

    /// Locks the ledger. Never hold the guard across an `.await`.
    pub fn ledger(&self) -> Result<MutexGuard<'_, AppLedger>, ApiError> {
        self.ledger
            .lock()
            .map_err(|_| ApiError::Internal("Ledger lock poisoned".into()))
    }

    pub fn accounts(&self) -> Result<MutexGuard<'_, AccountService<SharedStore>>, ApiError> {
        self.accounts
            .lock()
            .map_err(|_| ApiError::Internal("Accounts lock poisoned".into()))
    }
}

pub fn create_app(config: Config, store: SharedStore) -> Result<Router, DomainError> {
    let state = AppState::new(config, store)?;
    Ok(router(state))
}

pub fn router(state: AppState) -> Router {
    let request_timeout = Duration::from_secs(state.config.server.request_timeout_secs);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Signed-in routes
    let user_routes = Router::new()
        .route("/api/v1/auth/logout", post(auth::logout))
        .route(
            "/api/v1/me/registrations",
            get(registrations::my_registrations),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), require_user));

    // Admin routes
    let admin_routes = Router::new()
        .route("/api/v1/admin/events", post(admin::create_event))
        .route(
            "/api/v1/admin/events/:event_id",
            put(admin::update_event).delete(admin::delete_event),
        )
        .route(
            "/api/v1/admin/registrations",
            get(admin::list_registrations),
        )
        .route(
            "/api/v1/admin/registrations/pending",
            get(admin::list_pending_registrations),
        )
        .route(
            "/api/v1/admin/registrations/approve",
            post(admin::approve_registration),
        )
        .route(
            "/api/v1/admin/registrations/reject",
            post(admin::reject_registration),
        )
        .route("/api/v1/admin/users", get(users::list_users))
        .route("/api/v1/admin/users/:user_id", delete(users::delete_user))
        .route("/api/v1/admin/users/:user_id/role", put(users::update_user_role))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_admin));

    // Public routes (no authentication required)
    let public_routes = Router::new()
        .route("/api/health", get(health::health_check))
        .route("/api/health/live", get(health::live))
        .route("/metrics", get(metrics_handler))
        .route("/api/v1/events", get(events::list_events))
        .route("/api/v1/events/:event_id", get(events::get_event))
        .route(
            "/api/v1/events/:event_id/registrations",
            post(registrations::submit_registration),
        )
        .route("/api/v1/auth/signup", post(auth::signup))
        .route("/api/v1/auth/login", post(auth::login));

    Router::new()
        .merge(public_routes)
        .merge(user_routes)
        .merge(admin_routes)
        // Global middleware (order matters: bottom layers run first)
        .layer(TimeoutLayer::new(request_timeout))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(trace_id))
        .layer(cors)
        .with_state(state)
}
