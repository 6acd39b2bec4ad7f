//! reqwest implementation of [`Backend`].
//!
//! One round trip per call: no retries, no caching. A timeout applies only
//! when `API_TIMEOUT_SECS` is configured.

use std::time::Duration;

use reqwest::header::ACCEPT;
use reqwest::{RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::Backend;
use super::config::{ApiConfig, ApiConventions};
use super::types::{
    AccessToken, ApiError, NewUser, PointsEnvelope, PointsMethod, TrackPoints, UpdateUserRequest, User, UserEnvelope,
    UserPointsEnvelope,
};

pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    conventions: ApiConventions,
}

impl ApiClient {
    /// Build a client for the configured backend.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is not a valid URL or the HTTP client
    /// fails to build.
    pub fn new(config: ApiConfig) -> Result<Self, ApiError> {
        Url::parse(&config.base_url).map_err(|e| ApiError::ClientBuild(format!("{}: {e}", config.base_url)))?;

        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let http = builder
            .build()
            .map_err(|e| ApiError::ClientBuild(e.to_string()))?;

        Ok(Self { http, base_url: config.base_url, conventions: config.conventions })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Build `{base}/{prefix}/{segments...}` with each segment percent-encoded.
    fn segmented_url(&self, prefix: &str, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = Url::parse(&self.url(prefix)).map_err(|e| ApiError::ClientBuild(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|()| ApiError::ClientBuild(format!("cannot-be-a-base url: {}", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn lookup_points(
        &self,
        category: &str,
        gender: &str,
        event: &str,
        mark: f64,
    ) -> Result<Option<TrackPoints>, ApiError> {
        let url = self.segmented_url("/api/world-aths/points", &[category, gender, event])?;
        let text = self
            .send(self.http.get(url).query(&[("mark", mark)]))
            .await?;
        Ok(decode::<PointsEnvelope>(&text)?.points)
    }

    /// Send the request and return the body of a 2xx response.
    async fn send(&self, request: RequestBuilder) -> Result<String, ApiError> {
        let response = request
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        if !status.is_success() {
            return Err(ApiError::Status { status: status.as_u16(), body });
        }
        Ok(body)
    }
}

fn decode<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    serde_json::from_str(body).map_err(|e| ApiError::Decode(e.to_string()))
}

fn log_failure(operation: &'static str) -> impl Fn(&ApiError) {
    move |e| match e {
        ApiError::Status { status, .. } => {
            tracing::warn!(operation, status, "backend rejected request");
        }
        _ => tracing::error!(operation, error = %e, "backend call failed"),
    }
}

#[async_trait::async_trait]
impl Backend for ApiClient {
    async fn login(&self, credential: &str, password: &str) -> Result<AccessToken, ApiError> {
        let mut body = serde_json::Map::new();
        body.insert(self.conventions.credential_field.key().to_owned(), Value::from(credential));
        body.insert("password".to_owned(), Value::from(password));

        let request = self.http.post(self.url("/api/auth/login")).json(&body);
        self.send(request)
            .await
            .and_then(|text| {
                let token: AccessToken = decode(&text)?;
                if token.access_token.is_empty() {
                    return Err(ApiError::MissingField("access_token"));
                }
                Ok(token)
            })
            .inspect_err(log_failure("login"))
    }

    async fn logout(&self, token: &str) -> Result<(), ApiError> {
        let request = self
            .http
            .get(self.url("/api/auth/logout"))
            .bearer_auth(token);
        self.send(request)
            .await
            .map(|_| ())
            .inspect_err(log_failure("logout"))
    }

    async fn get_my_details(&self, token: &str) -> Result<User, ApiError> {
        let request = self.http.get(self.url("/api/user/me")).bearer_auth(token);
        self.send(request)
            .await
            .and_then(|text| decode::<UserEnvelope>(&text)?.into_user())
            .inspect_err(log_failure("get_my_details"))
    }

    async fn update_my_details(&self, token: &str, details: &UpdateUserRequest, id: i64) -> Result<User, ApiError> {
        let request = self
            .http
            .put(self.url(&self.conventions.update_path_for(id)))
            .bearer_auth(token)
            .json(details);
        self.send(request)
            .await
            .and_then(|text| decode::<UserEnvelope>(&text)?.into_user())
            .inspect_err(log_failure("update_my_details"))
    }

    async fn create_new_user(&self, user: &NewUser) -> Result<Value, ApiError> {
        let request = self
            .http
            .post(self.url(&self.conventions.register_path))
            .json(user);
        self.send(request)
            .await
            .and_then(|text| decode(&text))
            .inspect_err(log_failure("create_new_user"))
    }

    async fn get_results(
        &self,
        category: &str,
        gender: &str,
        event: &str,
        mark: f64,
    ) -> Result<Option<TrackPoints>, ApiError> {
        self.lookup_points(category, gender, event, mark)
            .await
            .inspect_err(log_failure("get_results"))
    }

    async fn request_user_points(
        &self,
        token: &str,
        user_id: i64,
        points_id: i64,
        method: PointsMethod,
    ) -> Result<Value, ApiError> {
        let request = self
            .http
            .request(
                method.http_method(),
                self.url(&format!("/api/user/user_points/{user_id}/{points_id}")),
            )
            .bearer_auth(token);
        self.send(request)
            .await
            .and_then(|text| decode(&text))
            .inspect_err(log_failure("request_user_points"))
    }

    async fn get_my_points(&self, token: &str, user_id: i64) -> Result<Vec<TrackPoints>, ApiError> {
        let request = self
            .http
            .get(self.url(&format!("/api/user/user_points/{user_id}")))
            .bearer_auth(token);
        self.send(request)
            .await
            .and_then(|text| Ok(decode::<UserPointsEnvelope>(&text)?.user_points.unwrap_or_default()))
            .inspect_err(log_failure("get_my_points"))
    }

    async fn reload_points_table(&self) -> Result<Value, ApiError> {
        let request = self.http.get(self.url("/api/world-aths/read"));
        self.send(request)
            .await
            .and_then(|text| decode(&text))
            .inspect_err(log_failure("reload_points_table"))
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
