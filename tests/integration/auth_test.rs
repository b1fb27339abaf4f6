//! Integration tests for the login, logout, session, refresh and me endpoints.

mod helpers;

use chrono::Utc;
use growthwatch_auth::IdentityProvider;
use http::StatusCode;

use helpers::{
    ACCESS_COOKIE, ADMIN_EMAIL, ADMIN_PASSWORD, Cookies, IDENTITY_COOKIE, ORPHAN_EMAIL,
    ORPHAN_PASSWORD, PARENT_EMAIL, PARENT_PASSWORD, REFRESH_COOKIE, TestApp,
};

fn now() -> i64 {
    Utc::now().timestamp()
}

fn login_body(email: &str, password: &str) -> Option<serde_json::Value> {
    Some(serde_json::json!({ "email": email, "password": password }))
}

#[tokio::test]
async fn test_login_success_sets_session_cookies() {
    let app = TestApp::new().await;

    let response = app
        .request(
            "POST",
            "/api/auth/login",
            login_body(ADMIN_EMAIL, ADMIN_PASSWORD),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["success"], true);
    assert_eq!(response.body["user"]["email"], ADMIN_EMAIL);
    assert_eq!(response.body["user"]["name"], "Clinic Admin");
    assert_eq!(response.body["user"]["role"], "Admin");

    assert!(response.set_cookie(ACCESS_COOKIE).is_some_and(|v| !v.is_empty()));
    assert!(response.set_cookie(REFRESH_COOKIE).is_some_and(|v| !v.is_empty()));
    assert_eq!(
        response.set_cookie(IDENTITY_COOKIE),
        Some(app.admin_id.to_string())
    );

    let raw = response
        .headers
        .get_all(http::header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find(|v| v.starts_with(ACCESS_COOKIE))
        .unwrap_or_default()
        .to_string();
    assert!(raw.contains("HttpOnly"));
    assert!(raw.contains("SameSite=Lax"));
    assert!(raw.contains("Max-Age=604800"));
}

#[tokio::test]
async fn test_login_email_is_case_insensitive() {
    let app = TestApp::new().await;

    let response = app
        .request(
            "POST",
            "/api/auth/login",
            login_body("  ADMIN@clinic.test ", ADMIN_PASSWORD),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
}

#[tokio::test]
async fn test_login_missing_fields() {
    let app = TestApp::new().await;

    let response = app
        .request(
            "POST",
            "/api/auth/login",
            Some(serde_json::json!({ "email": ADMIN_EMAIL })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["success"], false);
    assert_eq!(response.body["message"], "Email and password are required");
}

#[tokio::test]
async fn test_login_malformed_body() {
    let app = TestApp::new().await;

    let response = app
        .request(
            "POST",
            "/api/auth/login",
            Some(serde_json::json!(["not", "an", "object"])),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_login_invalid_password() {
    let app = TestApp::new().await;

    let response = app
        .request(
            "POST",
            "/api/auth/login",
            login_body(ADMIN_EMAIL, "wrong-password"),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["message"], "Invalid email or password");
    assert!(response.set_cookie(ACCESS_COOKIE).is_none());
}

#[tokio::test]
async fn test_login_unknown_user_matches_wrong_password() {
    let app = TestApp::new().await;

    let unknown = app
        .request(
            "POST",
            "/api/auth/login",
            login_body("nobody@clinic.test", "whatever"),
            None,
        )
        .await;

    assert_eq!(unknown.status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown.body["message"], "Invalid email or password");
}

#[tokio::test]
async fn test_login_parent_is_forbidden() {
    let app = TestApp::new().await;

    let response = app
        .request(
            "POST",
            "/api/auth/login",
            login_body(PARENT_EMAIL, PARENT_PASSWORD),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(
        response.body["message"],
        "Access denied. Admin privileges required."
    );
    assert!(response.set_cookie(ACCESS_COOKIE).is_none());

    let session = app.request("GET", "/api/auth/session", None, None).await;
    assert_eq!(session.status, StatusCode::UNAUTHORIZED);
    assert_eq!(session.body["valid"], false);
}

#[tokio::test]
async fn test_login_without_profile_is_not_found() {
    let app = TestApp::new().await;

    let response = app
        .request(
            "POST",
            "/api/auth/login",
            login_body(ORPHAN_EMAIL, ORPHAN_PASSWORD),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert!(response.set_cookie(ACCESS_COOKIE).is_none());
}

#[tokio::test]
async fn test_session_valid_for_admin() {
    let app = TestApp::new().await;
    let cookies = app.login_admin().await;

    let response = app
        .request("GET", "/api/auth/session", None, Some(&cookies))
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["valid"], true);
    assert_eq!(response.body["user"]["id"], app.admin_id.to_string());
    assert!(response.body["expiresAt"].as_i64().is_some_and(|exp| exp > now()));
    // Far from expiry: no new cookies.
    assert!(response.set_cookie(ACCESS_COOKIE).is_none());
}

#[tokio::test]
async fn test_session_without_cookies_is_invalid() {
    let app = TestApp::new().await;

    let response = app.request("GET", "/api/auth/session", None, None).await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["valid"], false);
    assert_eq!(response.body["message"], "Session expired or invalid");
}

#[tokio::test]
async fn test_session_for_parent_is_invalid_and_cleared() {
    let app = TestApp::new().await;
    let session = app
        .provider
        .sign_in(PARENT_EMAIL, PARENT_PASSWORD)
        .await
        .expect("parent sign-in");
    let cookies = Cookies {
        access: Some(session.access_token),
        refresh: Some(session.refresh_token),
        identity: Some(app.parent_id.to_string()),
    };

    let response = app
        .request("GET", "/api/auth/session", None, Some(&cookies))
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["valid"], false);
    assert!(response.removes_cookie(ACCESS_COOKIE));
    assert!(response.removes_cookie(REFRESH_COOKIE));
    assert!(response.removes_cookie(IDENTITY_COOKIE));
}

#[tokio::test]
async fn test_session_demoted_admin_is_denied() {
    let app = TestApp::new().await;
    let cookies = app.login_admin().await;

    app.profiles.upsert(growthwatch_entity::Profile {
        id: app.admin_id,
        name: "Clinic Admin".to_string(),
        role: growthwatch_entity::Role::Parent,
    });

    let response = app
        .request("GET", "/api/auth/session", None, Some(&cookies))
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert!(response.removes_cookie(ACCESS_COOKIE));
}

#[tokio::test]
async fn test_session_near_expiry_is_refreshed() {
    let app = TestApp::new().await;
    let session = app
        .provider
        .sign_in(ADMIN_EMAIL, ADMIN_PASSWORD)
        .await
        .expect("admin sign-in");
    let near_expiry = app
        .provider
        .mint_access_token(&session, now() + 180)
        .expect("mint token");
    let cookies = Cookies {
        access: Some(near_expiry.clone()),
        refresh: Some(session.refresh_token.clone()),
        identity: Some(app.admin_id.to_string()),
    };

    let response = app
        .request("GET", "/api/auth/session", None, Some(&cookies))
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["valid"], true);
    assert!(response.body["expiresAt"].as_i64().is_some_and(|exp| exp > now() + 600));

    let new_access = response.set_cookie(ACCESS_COOKIE).expect("access cookie rewritten");
    assert_ne!(new_access, near_expiry);
    assert!(response.set_cookie(REFRESH_COOKIE).is_some_and(|v| v != session.refresh_token));
}

#[tokio::test]
async fn test_session_expired_access_uses_refresh_token() {
    let app = TestApp::new().await;
    let session = app
        .provider
        .sign_in(ADMIN_EMAIL, ADMIN_PASSWORD)
        .await
        .expect("admin sign-in");
    let expired = app
        .provider
        .mint_access_token(&session, now() - 120)
        .expect("mint token");
    let cookies = Cookies {
        access: Some(expired),
        refresh: Some(session.refresh_token),
        identity: Some(app.admin_id.to_string()),
    };

    let response = app
        .request("GET", "/api/auth/session", None, Some(&cookies))
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.set_cookie(ACCESS_COOKIE).is_some());
}

#[tokio::test]
async fn test_session_expired_without_refresh_is_cleared() {
    let app = TestApp::new().await;
    let session = app
        .provider
        .sign_in(ADMIN_EMAIL, ADMIN_PASSWORD)
        .await
        .expect("admin sign-in");
    let expired = app
        .provider
        .mint_access_token(&session, now() - 120)
        .expect("mint token");
    let cookies = Cookies {
        access: Some(expired),
        refresh: None,
        identity: Some(app.admin_id.to_string()),
    };

    let response = app
        .request("GET", "/api/auth/session", None, Some(&cookies))
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert!(response.removes_cookie(ACCESS_COOKIE));
    assert!(response.removes_cookie(IDENTITY_COOKIE));
}

#[tokio::test]
async fn test_refresh_rotates_tokens() {
    let app = TestApp::new().await;
    let cookies = app.login_admin().await;

    let response = app
        .request("POST", "/api/auth/refresh", None, Some(&cookies))
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["valid"], true);
    assert!(response
        .set_cookie(ACCESS_COOKIE)
        .is_some_and(|v| Some(&v) != cookies.access.as_ref()));
    assert!(response
        .set_cookie(REFRESH_COOKIE)
        .is_some_and(|v| Some(&v) != cookies.refresh.as_ref()));

    // A replay inside the reuse interval lands on the same rotated pair.
    let replay = app
        .request(
            "POST",
            "/api/auth/refresh",
            None,
            Some(&Cookies {
                access: None,
                ..cookies
            }),
        )
        .await;
    assert_eq!(replay.status, StatusCode::OK);
    assert_eq!(
        replay.set_cookie(REFRESH_COOKIE),
        response.set_cookie(REFRESH_COOKIE)
    );
}

#[tokio::test]
async fn test_concurrent_session_checks_near_expiry_both_succeed() {
    let app = TestApp::new().await;
    let session = app
        .provider
        .sign_in(ADMIN_EMAIL, ADMIN_PASSWORD)
        .await
        .expect("admin sign-in");
    let near_expiry = app
        .provider
        .mint_access_token(&session, now() + 180)
        .expect("mint token");
    let cookies = Cookies {
        access: Some(near_expiry),
        refresh: Some(session.refresh_token.clone()),
        identity: Some(app.admin_id.to_string()),
    };

    let (first, second) = tokio::join!(
        app.request("GET", "/api/auth/session", None, Some(&cookies)),
        app.request("GET", "/api/auth/session", None, Some(&cookies)),
    );

    assert_eq!(first.status, StatusCode::OK);
    assert_eq!(second.status, StatusCode::OK);
    assert_eq!(first.body["valid"], true);
    assert_eq!(second.body["valid"], true);
    assert!(!first.removes_cookie(REFRESH_COOKIE));
    assert!(!second.removes_cookie(REFRESH_COOKIE));
    assert_eq!(
        first.set_cookie(REFRESH_COOKIE),
        second.set_cookie(REFRESH_COOKIE)
    );
}

#[tokio::test]
async fn test_refresh_after_logout_is_rejected() {
    let app = TestApp::new().await;
    let cookies = app.login_admin().await;

    let refreshed = app
        .request("POST", "/api/auth/refresh", None, Some(&cookies))
        .await;
    assert_eq!(refreshed.status, StatusCode::OK);

    let logout = app
        .request("POST", "/api/auth/logout", None, Some(&cookies))
        .await;
    assert_eq!(logout.status, StatusCode::OK);

    let replay = app
        .request(
            "POST",
            "/api/auth/refresh",
            None,
            Some(&Cookies {
                access: None,
                ..cookies
            }),
        )
        .await;
    assert_eq!(replay.status, StatusCode::UNAUTHORIZED);
    assert!(replay.removes_cookie(REFRESH_COOKIE));
}

#[tokio::test]
async fn test_refresh_without_cookies_is_invalid() {
    let app = TestApp::new().await;

    let response = app.request("POST", "/api/auth/refresh", None, None).await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["valid"], false);
}

#[tokio::test]
async fn test_logout_clears_cookies_and_revokes_session() {
    let app = TestApp::new().await;
    let cookies = app.login_admin().await;

    let response = app
        .request("POST", "/api/auth/logout", None, Some(&cookies))
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["success"], true);
    assert!(response.removes_cookie(ACCESS_COOKIE));
    assert!(response.removes_cookie(REFRESH_COOKIE));
    assert!(response.removes_cookie(IDENTITY_COOKIE));

    let after = app
        .request("GET", "/api/auth/session", None, Some(&cookies))
        .await;
    assert_eq!(after.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_logout_without_session_still_succeeds() {
    let app = TestApp::new().await;

    let response = app.request("POST", "/api/auth/logout", None, None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["success"], true);
}

#[tokio::test]
async fn test_me_returns_admin_profile() {
    let app = TestApp::new().await;
    let cookies = app.login_admin().await;

    let response = app
        .request("GET", "/api/auth/me", None, Some(&cookies))
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["user"]["id"], app.admin_id.to_string());
    assert_eq!(response.body["user"]["role"], "Admin");
}

#[tokio::test]
async fn test_me_requires_session() {
    let app = TestApp::new().await;

    let response = app.request("GET", "/api/auth/me", None, None).await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["success"], false);
    assert_eq!(response.body["message"], "Session expired or invalid");
}

#[tokio::test]
async fn test_health_is_public() {
    let app = TestApp::new().await;

    let response = app.request("GET", "/api/health", None, None).await;

    assert_eq!(response.status, StatusCode::OK);
}
