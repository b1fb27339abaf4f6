//! Integration tests for the page guard in front of the dashboard pages.

mod helpers;

use http::StatusCode;

use helpers::{ACCESS_COOKIE, Cookies, TestApp};

#[tokio::test]
async fn test_dashboard_without_session_redirects_to_login() {
    let app = TestApp::new().await;

    let response = app.request("GET", "/dashboard/", None, None).await;

    assert_eq!(response.status, StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(response.location(), Some("/login"));
}

#[tokio::test]
async fn test_root_without_session_redirects_to_login() {
    let app = TestApp::new().await;

    let response = app.request("GET", "/", None, None).await;

    assert_eq!(response.status, StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(response.location(), Some("/login"));
}

#[tokio::test]
async fn test_dashboard_with_admin_session_is_served() {
    let app = TestApp::new().await;
    let cookies = app.login_admin().await;

    let response = app
        .request("GET", "/dashboard/", None, Some(&cookies))
        .await;

    assert_eq!(response.status, StatusCode::OK);
}

#[tokio::test]
async fn test_login_page_is_public() {
    let app = TestApp::new().await;

    let response = app.request("GET", "/login/", None, None).await;

    assert_eq!(response.status, StatusCode::OK);
}

#[tokio::test]
async fn test_login_page_with_session_redirects_home() {
    let app = TestApp::new().await;
    let cookies = app.login_admin().await;

    let response = app.request("GET", "/login", None, Some(&cookies)).await;

    assert_eq!(response.status, StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(response.location(), Some("/dashboard"));
}

#[tokio::test]
async fn test_garbage_token_redirects_and_clears_cookies() {
    let app = TestApp::new().await;
    let cookies = Cookies {
        access: Some("not-a-jwt".to_string()),
        refresh: None,
        identity: None,
    };

    let response = app
        .request("GET", "/dashboard/", None, Some(&cookies))
        .await;

    assert_eq!(response.status, StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(response.location(), Some("/login"));
    assert!(response.removes_cookie(ACCESS_COOKIE));
}

#[tokio::test]
async fn test_static_assets_skip_the_guard() {
    let app = TestApp::new().await;

    for path in ["/favicon.ico", "/_next/static/app.js"] {
        let response = app.request("GET", path, None, None).await;
        assert_eq!(response.status, StatusCode::OK, "{path}");
    }
}

#[tokio::test]
async fn test_api_routes_are_not_redirected() {
    let app = TestApp::new().await;

    let response = app.request("GET", "/api/auth/session", None, None).await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert!(response.location().is_none());
}

#[tokio::test]
async fn test_logged_out_session_is_redirected() {
    let app = TestApp::new().await;
    let cookies = app.login_admin().await;
    app.request("POST", "/api/auth/logout", None, Some(&cookies))
        .await;

    let response = app
        .request("GET", "/dashboard/", None, Some(&cookies))
        .await;

    assert_eq!(response.status, StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(response.location(), Some("/login"));
}
