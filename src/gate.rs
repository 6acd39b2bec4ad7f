//! Request gate: resolves the signed-in user from the session cookie.
//!
//! ARCHITECTURE
//! ============
//! Runs as axum middleware in front of every route. A present cookie is
//! resolved through `Backend::get_my_details`; the outcome is stored as a
//! [`RequestContext`] in the request extensions, so handlers get the user
//! per request instead of from shared state.
//!
//! FAILURE MODE
//! ============
//! A failed lookup (expired token, backend down) never fails the request:
//! it continues anonymous and the cookie is left untouched. The only
//! short-circuit is the `/login` redirect for cookie-less requests to
//! protected paths when [`GateMode::Protect`] is configured.

use std::convert::Infallible;

use axum::extract::{FromRequestParts, Request, State};
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::cookie::CookieJar;

use crate::api::User;
use crate::state::AppState;

pub const LOGIN_PATH: &str = "/login";
pub const DEFAULT_PUBLIC_PATHS: &[&str] = &["/", "/login", "/register", "/points", "/healthz"];

// =============================================================================
// POLICY
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GateMode {
    /// Cookie-less requests always pass through.
    #[default]
    Open,
    /// Cookie-less requests to non-public paths are redirected to `/login`.
    Protect,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatePolicy {
    pub mode: GateMode,
    public_paths: Vec<String>,
}

impl Default for GatePolicy {
    fn default() -> Self {
        Self::new(GateMode::Open)
    }
}

impl GatePolicy {
    #[must_use]
    pub fn new(mode: GateMode) -> Self {
        Self { mode, public_paths: DEFAULT_PUBLIC_PATHS.iter().map(|p| (*p).to_owned()).collect() }
    }

    /// Replace the public path set. `/login` is always kept public.
    #[must_use]
    pub fn with_public_paths(mut self, paths: impl IntoIterator<Item = String>) -> Self {
        self.public_paths = paths.into_iter().collect();
        if !self.public_paths.iter().any(|p| p == LOGIN_PATH) {
            self.public_paths.push(LOGIN_PATH.to_owned());
        }
        self
    }

    #[must_use]
    pub fn public_paths(&self) -> &[String] {
        &self.public_paths
    }

    /// Whether a request without a session cookie must be redirected.
    #[must_use]
    pub fn redirects_anonymous(&self, path: &str) -> bool {
        self.mode == GateMode::Protect && !self.public_paths.iter().any(|p| p == path)
    }
}

// =============================================================================
// REQUEST CONTEXT
// =============================================================================

/// Per-request view of who is signed in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    pub user: Option<User>,
    pub token: Option<String>,
}

impl RequestContext {
    #[must_use]
    pub fn anonymous() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn signed_in(user: User, token: String) -> Self {
        Self { user: Some(user), token: Some(token) }
    }
}

impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts
            .extensions
            .get::<RequestContext>()
            .cloned()
            .unwrap_or_default())
    }
}

/// Signed-in user extracted from the request context.
/// Use as a handler parameter to require a session; redirects to `/login`
/// otherwise.
#[derive(Debug, Clone)]
pub struct SignedIn {
    pub user: User,
    pub token: String,
}

impl<S> FromRequestParts<S> for SignedIn
where
    S: Send + Sync,
{
    type Rejection = Redirect;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Ok(context) = RequestContext::from_request_parts(parts, state).await;
        match context {
            RequestContext { user: Some(user), token: Some(token) } => Ok(Self { user, token }),
            _ => Err(Redirect::to(LOGIN_PATH)),
        }
    }
}

// =============================================================================
// MIDDLEWARE
// =============================================================================

/// Resolve the session cookie into a [`RequestContext`] and hand off.
pub async fn gate(State(state): State<AppState>, jar: CookieJar, mut request: Request, next: Next) -> Response {
    let Some(token) = state.session.token(&jar).map(str::to_owned) else {
        let path = request.uri().path();
        if state.gate.redirects_anonymous(path) {
            tracing::debug!(%path, "no session cookie; redirecting to login");
            return Redirect::to(LOGIN_PATH).into_response();
        }
        request.extensions_mut().insert(RequestContext::anonymous());
        return next.run(request).await;
    };

    let context = match state.api.get_my_details(&token).await {
        Ok(user) => {
            tracing::debug!(user_id = user.id, "session resolved");
            RequestContext::signed_in(user, token)
        }
        Err(e) => {
            tracing::debug!(error = %e, "session lookup failed; continuing anonymous");
            RequestContext::anonymous()
        }
    };

    request.extensions_mut().insert(context);
    next.run(request).await
}

#[cfg(test)]
#[path = "gate_test.rs"]
mod tests;
