//! Form actions: one backend call per submission.
//!
//! Missing form fields read as empty strings; the backend decides whether
//! they are acceptable. Failures come back as [`ActionError`], which
//! re-renders the submitted form with a message instead of redirecting as
//! if nothing happened.

use axum::extract::{Form, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum_extra::extract::cookie::CookieJar;
use minijinja::context;
use serde::{Deserialize, Serialize};

use crate::api::{ApiError, NewUser, PointsMethod, UpdateUserRequest, User};
use crate::gate::{RequestContext, SignedIn};
use crate::render::{RenderError, render};
use crate::state::AppState;

// =============================================================================
// FORMS
// =============================================================================

/// Login form. The credential may arrive under any of the names older
/// login pages used; the first non-empty one wins.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginForm {
    pub credential: String,
    pub user_name: String,
    pub username: String,
    pub email: String,
    pub password: String,
}

impl LoginForm {
    #[must_use]
    pub fn credential(&self) -> &str {
        [&self.credential, &self.user_name, &self.username, &self.email]
            .into_iter()
            .map(String::as_str)
            .find(|v| !v.is_empty())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct RegisterForm {
    #[serde(alias = "username")]
    pub user_name: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    #[serde(skip_serializing)]
    pub password: String,
}

impl RegisterForm {
    fn to_new_user(&self) -> NewUser {
        NewUser {
            user_name: self.user_name.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            password: self.password.clone(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ProfileForm {
    pub user_name: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
}

impl From<ProfileForm> for UpdateUserRequest {
    fn from(form: ProfileForm) -> Self {
        Self {
            user_name: form.user_name,
            first_name: form.first_name,
            last_name: form.last_name,
            email: form.email,
            phone: Some(form.phone).filter(|p| !p.is_empty()),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PointsForm {
    pub points_id: String,
}

// =============================================================================
// ERRORS
// =============================================================================

/// A form submission the backend did not accept.
#[derive(Debug, thiserror::Error)]
pub enum ActionError {
    #[error("login failed: {source}")]
    Login { credential: String, source: ApiError },

    #[error("registration failed: {source}")]
    Register { form: RegisterForm, source: ApiError },

    #[error("profile update failed: {source}")]
    UpdateProfile { user: User, submitted: UpdateUserRequest, source: ApiError },

    #[error("points change failed: {source}")]
    Points { user: User, source: ApiError },

    #[error("points table reload failed: {source}")]
    Reload { user: User, source: ApiError },

    #[error("invalid points id: {raw:?}")]
    InvalidPointsId { user: User, raw: String },

    #[error(transparent)]
    Render(#[from] RenderError),
}

impl ActionError {
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Login { source, .. }
            | Self::Register { source, .. }
            | Self::UpdateProfile { source, .. }
            | Self::Points { source, .. }
            | Self::Reload { source, .. } => {
                if source.is_unauthorized() {
                    StatusCode::UNAUTHORIZED
                } else {
                    source.status()
                }
            }
            Self::InvalidPointsId { .. } => StatusCode::BAD_REQUEST,
            Self::Render(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn into_page(self) -> Result<(StatusCode, Html<String>), RenderError> {
        let status = self.status();
        let page = match self {
            Self::Login { credential, source } => {
                let error = match source {
                    ApiError::Status { .. } | ApiError::MissingField(_) => "Invalid username or password.",
                    _ => "Logging in is unavailable right now. Try again later.",
                };
                render("login.html", context! { credential, error })?
            }
            Self::Register { form, .. } => render(
                "register.html",
                context! { form, error => "Registration failed. Check your details and try again." },
            )?,
            Self::UpdateProfile { user, submitted, .. } => render(
                "user.html",
                context! { user, profile => submitted, error => "Your profile could not be saved." },
            )?,
            Self::Points { user, .. } => render(
                "error.html",
                context! { user, message => "Your saved points could not be changed.", back => "/my-points" },
            )?,
            Self::Reload { user, .. } => render(
                "error.html",
                context! { user, message => "Reloading the scoring table failed.", back => "/points" },
            )?,
            Self::InvalidPointsId { user, .. } => render(
                "error.html",
                context! { user, message => "That points record is not valid.", back => "/my-points" },
            )?,
            Self::Render(e) => return Err(e),
        };
        Ok((status, page))
    }
}

impl IntoResponse for ActionError {
    fn into_response(self) -> Response {
        tracing::warn!(error = %self, "form action failed");
        match self.into_page() {
            Ok(page) => page.into_response(),
            Err(e) => e.into_response(),
        }
    }
}

// =============================================================================
// HANDLERS
// =============================================================================

/// `POST /login`: on success set the `session` cookie and go home.
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Result<(CookieJar, Redirect), ActionError> {
    let credential = form.credential();
    let token = state
        .api
        .login(credential, &form.password)
        .await
        .map_err(|source| ActionError::Login { credential: credential.to_owned(), source })?;

    tracing::info!("login succeeded");
    Ok((state.session.set(jar, token.access_token), Redirect::to("/")))
}

/// `POST /register`
pub async fn register(State(state): State<AppState>, Form(form): Form<RegisterForm>) -> Result<Redirect, ActionError> {
    let new_user = form.to_new_user();
    match state.api.create_new_user(&new_user).await {
        Ok(_) => {
            tracing::info!(user_name = %new_user.user_name, "user registered");
            Ok(Redirect::to("/"))
        }
        Err(source) => Err(ActionError::Register { form, source }),
    }
}

/// `POST /user`: save profile, then show it with the updated user.
pub async fn update_profile(
    State(state): State<AppState>,
    SignedIn { user, token }: SignedIn,
    Form(form): Form<ProfileForm>,
) -> Result<Html<String>, ActionError> {
    let details = UpdateUserRequest::from(form);
    let updated = match state.api.update_my_details(&token, &details, user.id).await {
        Ok(updated) => updated,
        Err(source) => return Err(ActionError::UpdateProfile { user, submitted: details, source }),
    };

    tracing::info!(user_id = updated.id, "profile updated");
    Ok(render(
        "user.html",
        context! { user => &updated, profile => &updated, notice => "Profile saved." },
    )?)
}

/// `POST /logout`: tell the backend, then clear the cookie either way.
pub async fn logout(State(state): State<AppState>, context: RequestContext, jar: CookieJar) -> (CookieJar, Redirect) {
    let token = context
        .token
        .or_else(|| state.session.token(&jar).map(str::to_owned));
    if let Some(token) = token {
        if let Err(e) = state.api.logout(&token).await {
            tracing::debug!(error = %e, "backend logout failed; clearing cookie anyway");
        }
    }
    (state.session.clear(jar), Redirect::to("/"))
}

/// `POST /my-points/add`
pub async fn add_points(
    State(state): State<AppState>,
    signed_in: SignedIn,
    Form(form): Form<PointsForm>,
) -> Result<Redirect, ActionError> {
    change_points(&state, signed_in, form, PointsMethod::Add).await
}

/// `POST /my-points/remove`
pub async fn remove_points(
    State(state): State<AppState>,
    signed_in: SignedIn,
    Form(form): Form<PointsForm>,
) -> Result<Redirect, ActionError> {
    change_points(&state, signed_in, form, PointsMethod::Remove).await
}

async fn change_points(
    state: &AppState,
    SignedIn { user, token }: SignedIn,
    form: PointsForm,
    method: PointsMethod,
) -> Result<Redirect, ActionError> {
    let Ok(points_id) = form.points_id.trim().parse::<i64>() else {
        return Err(ActionError::InvalidPointsId { user, raw: form.points_id });
    };

    if let Err(source) = state
        .api
        .request_user_points(&token, user.id, points_id, method)
        .await
    {
        return Err(ActionError::Points { user, source });
    }
    Ok(Redirect::to("/my-points"))
}

/// `POST /points/reload`: ask the backend to load its scoring table.
pub async fn reload_points(State(state): State<AppState>, SignedIn { user, .. }: SignedIn) -> Result<Redirect, ActionError> {
    match state.api.reload_points_table().await {
        Ok(body) => {
            tracing::info!(%body, "scoring table reload requested");
            Ok(Redirect::to("/points"))
        }
        Err(source) => Err(ActionError::Reload { user, source }),
    }
}

#[cfg(test)]
#[path = "actions_test.rs"]
mod tests;
