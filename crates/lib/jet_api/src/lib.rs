//! # jet_api
//!
//! HTTP API library for Jet: users, login and token-guarded routes.

pub mod bootstrap;
pub mod config;
pub mod error;
pub mod handlers;
pub mod logging;
pub mod middleware;
pub mod models;
pub mod response;
pub mod services;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use jet_core::auth::jwt::TokenService;
use jet_core::repo::UserRepository;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any, CorsLayer};

use crate::config::AppConfig;
use crate::handlers::{auth, health, users};
use crate::middleware::auth::AllowList;
use crate::services::auth::AuthService;
use crate::services::users::UserService;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    /// Signs and verifies access tokens.
    pub tokens: Arc<TokenService>,
    /// Paths the auth middleware lets through without a token.
    pub allow_list: Arc<AllowList>,
    pub users: UserService,
    pub auth: AuthService,
    /// Backing store, used directly by the health probe.
    pub store: Arc<dyn UserRepository>,
}

/// Builds the Axum router with all routes and shared state.
///
/// Request pipeline, outermost first: panic recovery, request logging,
/// CORS, authentication, routes.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let v1 = Router::new()
        .route("/login", post(auth::login_handler))
        .route("/register", post(auth::register_handler))
        .route("/profile", get(auth::profile_handler))
        .route("/users", get(users::list_users).post(users::create_user))
        .route("/users/insert", post(users::insert_initial_data))
        .route(
            "/users/{id}",
            get(users::get_user)
                .put(users::update_user)
                .delete(users::delete_user),
        );

    Router::new()
        .route("/health", get(health::health_check))
        .nest("/api/v1", v1)
        .fallback(handlers::not_found)
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::require_auth,
        ))
        .layer(cors)
        .layer(axum::middleware::from_fn(
            middleware::request_log::log_requests,
        ))
        .layer(CatchPanicLayer::custom(middleware::recover::handle_panic))
        .with_state(state)
}
