//! Page routes: GET handlers that render what the gate resolved.

use axum::extract::{Query, State};
use axum::response::Html;
use minijinja::context;
use serde::{Deserialize, Serialize};

use crate::gate::{RequestContext, SignedIn};
use crate::render::{RenderError, render};
use crate::routes::actions::RegisterForm;
use crate::state::AppState;

/// `GET /`
pub async fn home(context: RequestContext) -> Result<Html<String>, RenderError> {
    render("home.html", context! { user => context.user })
}

/// `GET /login`
pub async fn login(context: RequestContext) -> Result<Html<String>, RenderError> {
    render("login.html", context! { user => context.user, credential => "" })
}

/// `GET /register`
pub async fn register(context: RequestContext) -> Result<Html<String>, RenderError> {
    render("register.html", context! { user => context.user, form => RegisterForm::default() })
}

/// `GET /user`: profile form pre-filled from the signed-in user.
pub async fn profile(signed_in: SignedIn) -> Result<Html<String>, RenderError> {
    render("user.html", context! { user => &signed_in.user, profile => &signed_in.user })
}

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct PointsQuery {
    pub category: Option<String>,
    pub gender: Option<String>,
    pub event: Option<String>,
    pub mark: Option<String>,
}

/// A complete points query, ready to send to the backend.
#[derive(Debug, PartialEq)]
pub(crate) struct PointsLookup<'a> {
    pub category: &'a str,
    pub gender: &'a str,
    pub event: &'a str,
    pub mark: f64,
}

impl PointsQuery {
    /// `None` until every field is filled in; `Some(Err(()))` when the mark
    /// is not a number.
    pub(crate) fn lookup(&self) -> Option<Result<PointsLookup<'_>, ()>> {
        let category = filled(self.category.as_deref())?;
        let gender = filled(self.gender.as_deref())?;
        let event = filled(self.event.as_deref())?;
        let mark = filled(self.mark.as_deref())?;
        Some(
            mark.parse::<f64>()
                .ok()
                .filter(|m| m.is_finite())
                .map(|mark| PointsLookup { category, gender, event, mark })
                .ok_or(()),
        )
    }
}

fn filled(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

/// `GET /points`: scoring lookup; runs only when the query is complete.
pub async fn points(
    State(state): State<AppState>,
    context: RequestContext,
    Query(query): Query<PointsQuery>,
) -> Result<Html<String>, RenderError> {
    let (result, error, searched) = match query.lookup() {
        None => (None, None, false),
        Some(Err(())) => (None, Some("Mark must be a number."), true),
        Some(Ok(lookup)) => match state
            .api
            .get_results(lookup.category, lookup.gender, lookup.event, lookup.mark)
            .await
        {
            Ok(points) => (points, None, true),
            Err(_) => (None, Some("The points lookup failed. Try again later."), true),
        },
    };

    render(
        "points.html",
        context! { user => context.user, query, result, searched, error },
    )
}

/// `GET /my-points`: saved points of the signed-in user. A failed fetch
/// shows an empty list.
pub async fn my_points(State(state): State<AppState>, signed_in: SignedIn) -> Result<Html<String>, RenderError> {
    let points = state
        .api
        .get_my_points(&signed_in.token, signed_in.user.id)
        .await
        .unwrap_or_default();
    render("my_points.html", context! { user => signed_in.user, points })
}

#[cfg(test)]
#[path = "pages_test.rs"]
mod tests;
