//! Backend API: typed client for the remote scoring/user REST service.
//!
//! DESIGN
//! ======
//! Route handlers and the request gate talk to the backend through the
//! [`Backend`] trait. [`ApiClient`] is the reqwest implementation; tests swap
//! in a mock. Every method returns `Result<_, ApiError>`; failures are logged
//! at the client boundary before they are returned, so callers decide only
//! how to degrade.

pub mod client;
pub mod config;
pub mod types;

pub use client::ApiClient;
pub use types::{AccessToken, ApiError, NewUser, PointsMethod, TrackPoints, UpdateUserRequest, User};

/// Operations the frontend needs from the backend.
#[async_trait::async_trait]
pub trait Backend: Send + Sync {
    /// `POST /api/auth/login` with `{<credential_field>, password}`.
    async fn login(&self, credential: &str, password: &str) -> Result<AccessToken, ApiError>;

    /// `GET /api/auth/logout` with the bearer token.
    async fn logout(&self, token: &str) -> Result<(), ApiError>;

    /// `GET /api/user/me`. Fails with `MissingField` when the body has no
    /// `data.user.user_name`, even on a 2xx.
    async fn get_my_details(&self, token: &str) -> Result<User, ApiError>;

    /// `PUT` the partial user to the configured update path.
    async fn update_my_details(&self, token: &str, details: &UpdateUserRequest, id: i64) -> Result<User, ApiError>;

    /// `POST` the new user to the configured register path. Returns the raw body.
    async fn create_new_user(&self, user: &NewUser) -> Result<serde_json::Value, ApiError>;

    /// Scoring lookup. `Ok(None)` when the backend found no matching row.
    async fn get_results(
        &self,
        category: &str,
        gender: &str,
        event: &str,
        mark: f64,
    ) -> Result<Option<TrackPoints>, ApiError>;

    /// Add or remove a saved points record for a user.
    async fn request_user_points(
        &self,
        token: &str,
        user_id: i64,
        points_id: i64,
        method: PointsMethod,
    ) -> Result<serde_json::Value, ApiError>;

    /// Saved points of a user. Zero results is an empty list.
    async fn get_my_points(&self, token: &str, user_id: i64) -> Result<Vec<TrackPoints>, ApiError>;

    /// Ask the backend to (re)load its scoring table.
    async fn reload_points_table(&self) -> Result<serde_json::Value, ApiError>;
}
