use super::*;
use crate::gate::GateMode;
use crate::routes::app;
use crate::state::test_helpers::{MockBackend, alice, test_app_state};
use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, header};
use tower::ServiceExt;

async fn post_form(router: Router, path: &str, cookie: Option<&str>, body: &'static str) -> Response {
    let mut request = Request::builder()
        .method(Method::POST)
        .uri(path)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(cookie) = cookie {
        request = request.header(header::COOKIE, cookie);
    }
    router
        .oneshot(request.body(Body::from(body)).unwrap())
        .await
        .unwrap()
}

async fn body_text(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn set_cookies(response: &Response) -> Vec<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .map(|v| v.to_str().unwrap().to_owned())
        .collect()
}

fn location(response: &Response) -> &str {
    response.headers()[header::LOCATION].to_str().unwrap()
}

fn signed_in_app() -> (Router, std::sync::Arc<MockBackend>) {
    let (state, mock) = test_app_state(MockBackend::new().with_user("abc123", alice()), GateMode::Open);
    (app(state), mock)
}

// =============================================================================
// FORMS
// =============================================================================

#[test]
fn login_credential_takes_first_non_empty_name() {
    let form = LoginForm { user_name: "alice".into(), email: "a@example.com".into(), ..LoginForm::default() };
    assert_eq!(form.credential(), "alice");

    let form = LoginForm { email: "a@example.com".into(), ..LoginForm::default() };
    assert_eq!(form.credential(), "a@example.com");

    assert_eq!(LoginForm::default().credential(), "");
}

#[test]
fn profile_form_drops_empty_phone() {
    let request = UpdateUserRequest::from(ProfileForm { user_name: "alice".into(), ..ProfileForm::default() });
    assert_eq!(request.phone, None);

    let request = UpdateUserRequest::from(ProfileForm { phone: "555".into(), ..ProfileForm::default() });
    assert_eq!(request.phone.as_deref(), Some("555"));
}

#[test]
fn unauthorized_backend_failure_maps_to_401() {
    let err = ActionError::Points {
        user: alice(),
        source: ApiError::Status { status: 401, body: String::new() },
    };
    assert_eq!(err.status(), StatusCode::UNAUTHORIZED);

    let err = ActionError::Points { user: alice(), source: ApiError::Transport("refused".into()) };
    assert_eq!(err.status(), StatusCode::BAD_REQUEST);
}

// =============================================================================
// LOGIN / LOGOUT
// =============================================================================

#[tokio::test]
async fn login_success_sets_session_cookie_and_redirects_home() {
    let (state, mock) = test_app_state(MockBackend::new().with_login("alice", "secret", "abc123"), GateMode::Open);
    let response = post_form(app(state), "/login", None, "user_name=alice&password=secret").await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");
    let cookies = set_cookies(&response);
    assert_eq!(cookies.len(), 1);
    assert!(cookies[0].contains("session=abc123"));
    assert!(cookies[0].contains("Max-Age=604800"));
    assert!(cookies[0].contains("Path=/"));
    assert_eq!(mock.calls(), vec!["login:alice".to_owned()]);
}

#[tokio::test]
async fn login_failure_rerenders_form_without_cookie() {
    let (state, _mock) = test_app_state(MockBackend::new(), GateMode::Open);
    let response = post_form(app(state), "/login", None, "credential=alice&password=wrong").await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(set_cookies(&response).is_empty());
    let body = body_text(response).await;
    assert!(body.contains("Invalid username or password."));
    assert!(body.contains(r#"value="alice""#));
}

#[tokio::test]
async fn login_with_empty_form_still_calls_backend() {
    let (state, mock) = test_app_state(MockBackend::new(), GateMode::Open);
    let response = post_form(app(state), "/login", None, "").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(mock.calls(), vec!["login:".to_owned()]);
}

#[tokio::test]
async fn logout_calls_backend_and_clears_cookie() {
    let (router, mock) = signed_in_app();
    let response = post_form(router, "/logout", Some("session=abc123"), "").await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");
    let cookies = set_cookies(&response);
    assert_eq!(cookies.len(), 1);
    assert!(cookies[0].starts_with("session=;"));
    assert!(cookies[0].contains("Max-Age=0"));
    assert_eq!(mock.calls(), vec!["me:abc123".to_owned(), "logout:abc123".to_owned()]);
}

#[tokio::test]
async fn logout_with_stale_cookie_still_clears_it() {
    let (router, mock) = signed_in_app();
    let response = post_form(router, "/logout", Some("session=expired"), "").await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(set_cookies(&response).len(), 1);
    assert!(mock.calls().contains(&"logout:expired".to_owned()));
}

#[tokio::test]
async fn logout_without_cookie_skips_backend() {
    let (router, mock) = signed_in_app();
    let response = post_form(router, "/logout", None, "").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert!(mock.calls().is_empty());
}

// =============================================================================
// REGISTER
// =============================================================================

#[tokio::test]
async fn register_success_redirects_home() {
    let (state, mock) = test_app_state(MockBackend::new(), GateMode::Open);
    let response = post_form(
        app(state),
        "/register",
        None,
        "username=bob&first_name=Bob&last_name=Beamon&email=bob%40example.com&phone=&password=pw",
    )
    .await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");
    assert_eq!(mock.calls(), vec!["register:bob".to_owned()]);
}

#[tokio::test]
async fn register_failure_keeps_input_but_not_password() {
    let (state, _mock) = test_app_state(MockBackend::new().failing_writes(), GateMode::Open);
    let response = post_form(app(state), "/register", None, "user_name=bob&email=bob%40example.com&password=hunter2").await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_text(response).await;
    assert!(body.contains("Registration failed."));
    assert!(body.contains(r#"value="bob""#));
    assert!(!body.contains("hunter2"));
}

// =============================================================================
// PROFILE
// =============================================================================

#[tokio::test]
async fn update_profile_rerenders_with_updated_user() {
    let (router, mock) = signed_in_app();
    let response = post_form(
        router,
        "/user",
        Some("session=abc123"),
        "user_name=alice2&first_name=Alice&last_name=Liddell&email=alice%40example.com&phone=",
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(mock.calls().contains(&"update:5".to_owned()));
    let body = body_text(response).await;
    assert!(body.contains("Profile saved."));
    assert!(body.contains(r#"value="alice2""#));
}

#[tokio::test]
async fn update_profile_failure_keeps_submitted_values() {
    let (state, _mock) = test_app_state(
        MockBackend::new().with_user("abc123", alice()).failing_writes(),
        GateMode::Open,
    );
    let response = post_form(app(state), "/user", Some("session=abc123"), "user_name=renamed").await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_text(response).await;
    assert!(body.contains("Your profile could not be saved."));
    assert!(body.contains(r#"value="renamed""#));
}

#[tokio::test]
async fn update_profile_requires_session() {
    let (router, mock) = signed_in_app();
    let response = post_form(router, "/user", None, "user_name=x").await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login");
    assert!(mock.calls().is_empty());
}

// =============================================================================
// POINTS
// =============================================================================

#[tokio::test]
async fn add_points_posts_and_redirects_to_list() {
    let (router, mock) = signed_in_app();
    let response = post_form(router, "/my-points/add", Some("session=abc123"), "points_id=12").await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/my-points");
    assert!(mock.calls().contains(&"points:POST:5:12".to_owned()));
}

#[tokio::test]
async fn remove_points_uses_delete() {
    let (router, mock) = signed_in_app();
    let response = post_form(router, "/my-points/remove", Some("session=abc123"), "points_id=12").await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(mock.calls(), vec!["me:abc123".to_owned(), "points:DELETE:5:12".to_owned()]);
}

#[tokio::test]
async fn non_numeric_points_id_is_rejected_before_backend() {
    let (router, mock) = signed_in_app();
    let response = post_form(router, "/my-points/add", Some("session=abc123"), "points_id=twelve").await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_text(response).await.contains("That points record is not valid."));
    assert_eq!(mock.calls(), vec!["me:abc123".to_owned()]);
}

#[tokio::test]
async fn points_change_failure_renders_error_page() {
    let (state, _mock) = test_app_state(
        MockBackend::new().with_user("abc123", alice()).failing_writes(),
        GateMode::Open,
    );
    let response = post_form(app(state), "/my-points/remove", Some("session=abc123"), "points_id=12").await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_text(response).await.contains("Your saved points could not be changed."));
}

#[tokio::test]
async fn points_change_requires_session() {
    let (router, mock) = signed_in_app();
    let response = post_form(router, "/my-points/add", Some("session=expired"), "points_id=12").await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login");
    assert_eq!(mock.calls(), vec!["me:expired".to_owned()]);
}

#[tokio::test]
async fn reload_points_redirects_to_calculator() {
    let (router, mock) = signed_in_app();
    let response = post_form(router, "/points/reload", Some("session=abc123"), "").await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/points");
    assert!(mock.calls().contains(&"reload".to_owned()));
}

#[tokio::test]
async fn reload_points_failure_renders_error_page() {
    let (state, _mock) = test_app_state(
        MockBackend::new().with_user("abc123", alice()).failing_writes(),
        GateMode::Open,
    );
    let response = post_form(app(state), "/points/reload", Some("session=abc123"), "").await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_text(response).await.contains("Reloading the scoring table failed."));
}
