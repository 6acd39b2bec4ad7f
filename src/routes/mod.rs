//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! Every route sits behind the request gate, which resolves the session
//! cookie into a per-request `RequestContext` before any handler runs. Pages
//! are GET handlers in `pages`; form submissions are POST handlers in
//! `actions` and finish with a redirect or a re-rendered form.

pub mod actions;
pub mod pages;

use axum::Router;
use axum::http::StatusCode;
use axum::middleware;
use axum::routing::{get, post};
use tower_http::trace::TraceLayer;

use crate::gate;
use crate::state::AppState;

/// Build the full application router.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(pages::home))
        .route("/login", get(pages::login).post(actions::login))
        .route("/register", get(pages::register).post(actions::register))
        .route("/user", get(pages::profile).post(actions::update_profile))
        .route("/logout", post(actions::logout))
        .route("/points", get(pages::points))
        .route("/points/reload", post(actions::reload_points))
        .route("/my-points", get(pages::my_points))
        .route("/my-points/add", post(actions::add_points))
        .route("/my-points/remove", post(actions::remove_points))
        .route("/healthz", get(healthz))
        .layer(middleware::from_fn_with_state(state.clone(), gate::gate))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}
