//! Backend wire types and the client error.

use axum::http::StatusCode;
use serde::{Deserialize, Deserializer, Serialize};

// =============================================================================
// ERROR
// =============================================================================

/// Errors produced by backend API calls.
///
/// The variants keep the failure kinds apart for logging and tests; callers
/// that only care about the outcome use [`ApiError::status`].
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    ClientBuild(String),

    /// The request never produced a response (connect, TLS, body read).
    #[error("API request failed: {0}")]
    Transport(String),

    /// The backend answered with a non-success HTTP status.
    #[error("API response error: status {status}")]
    Status { status: u16, body: String },

    /// The response body was not the JSON shape we expect.
    #[error("API response parse failed: {0}")]
    Decode(String),

    /// The response decoded but a required field was absent or empty.
    #[error("API response missing field: {0}")]
    MissingField(&'static str),
}

impl ApiError {
    /// Outcome status reported to callers. Every failure collapses to
    /// `400 Bad Request`.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        StatusCode::BAD_REQUEST
    }

    /// True when the backend rejected the bearer credential.
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Status { status: 401 | 403, .. })
    }
}

// =============================================================================
// USERS
// =============================================================================

/// A backend user as returned by `/api/user/me` and profile updates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct User {
    pub id: i64,
    #[serde(deserialize_with = "string_or_null")]
    pub user_name: String,
    #[serde(deserialize_with = "string_or_null")]
    pub first_name: String,
    #[serde(deserialize_with = "string_or_null")]
    pub last_name: String,
    #[serde(deserialize_with = "string_or_null")]
    pub email: String,
    pub phone: Option<String>,
    /// Placeholder only; never serialized back out.
    #[serde(skip_serializing, deserialize_with = "string_or_null")]
    pub password: String,
}

/// A JSON `null` reads as an empty string.
fn string_or_null<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Partial user sent on profile update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateUserRequest {
    pub user_name: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
}

/// Registration payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NewUser {
    pub user_name: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub password: String,
}

/// Login response. `access_token` becomes the session cookie value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccessToken {
    pub status: String,
    pub access_token: String,
}

/// `{ "status": ..., "data": { "user": {...} } }`
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct UserEnvelope {
    pub data: Option<UserData>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct UserData {
    pub user: Option<User>,
}

impl UserEnvelope {
    /// Pull the user out of the envelope, requiring a non-empty `user_name`.
    pub(crate) fn into_user(self) -> Result<User, ApiError> {
        let user = self
            .data
            .and_then(|d| d.user)
            .ok_or(ApiError::MissingField("data.user"))?;
        if user.user_name.is_empty() {
            return Err(ApiError::MissingField("data.user.user_name"));
        }
        Ok(user)
    }
}

// =============================================================================
// POINTS
// =============================================================================

/// One row of the scoring table. The backend emits PascalCase keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackPoints {
    #[serde(default, alias = "Id")]
    pub id: Option<i64>,
    #[serde(alias = "Category")]
    pub category: String,
    #[serde(alias = "Event")]
    pub event: String,
    #[serde(alias = "Gender")]
    pub gender: String,
    #[serde(alias = "Mark")]
    pub mark: f64,
    #[serde(alias = "Points")]
    pub points: i64,
}

/// `{ "points": {...} | null }`
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct PointsEnvelope {
    pub points: Option<TrackPoints>,
}

/// `{ "user_points": [...] }`
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct UserPointsEnvelope {
    pub user_points: Option<Vec<TrackPoints>>,
}

/// Add or remove a saved points record. Distinguished only by HTTP verb.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointsMethod {
    Add,
    Remove,
}

impl PointsMethod {
    #[must_use]
    pub fn http_method(self) -> reqwest::Method {
        match self {
            Self::Add => reqwest::Method::POST,
            Self::Remove => reqwest::Method::DELETE,
        }
    }
}

#[cfg(test)]
#[path = "types_test.rs"]
mod tests;
