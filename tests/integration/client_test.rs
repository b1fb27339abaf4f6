//! Integration tests for the client library against a live server.

mod helpers;

use std::sync::Arc;
use std::time::Duration;

use growthwatch_client::{AuthClient, ClientError, SessionEvent, SessionMonitor};
use growthwatch_core::config::MonitorConfig;

use helpers::{ADMIN_EMAIL, ADMIN_PASSWORD, PARENT_EMAIL, PARENT_PASSWORD, TestApp};

fn monitor_config() -> MonitorConfig {
    MonitorConfig {
        retry_delay_ms: 10,
        ..MonitorConfig::default()
    }
}

/// Serves the test app on an ephemeral port and returns a client for it.
async fn spawn_client() -> (TestApp, AuthClient) {
    let app = TestApp::new().await;
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind test listener");
    let addr = listener.local_addr().expect("local addr");
    let router = app.router.clone();
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("test server");
    });

    let client =
        AuthClient::new(&format!("http://{addr}"), &monitor_config()).expect("build client");
    (app, client)
}

#[tokio::test]
async fn test_client_login_session_and_me() {
    let (app, client) = spawn_client().await;

    let user = client.login(ADMIN_EMAIL, ADMIN_PASSWORD).await.unwrap();
    assert_eq!(user.id, app.admin_id);
    assert_eq!(user.role, "Admin");

    let status = client.session().await.unwrap();
    assert!(status.valid);
    assert_eq!(status.user.map(|u| u.id), Some(app.admin_id));

    let me = client.me().await.unwrap();
    assert_eq!(me.name, "Clinic Admin");
}

#[tokio::test]
async fn test_client_parent_login_is_forbidden() {
    let (_app, client) = spawn_client().await;

    let err = client.login(PARENT_EMAIL, PARENT_PASSWORD).await.unwrap_err();
    assert_eq!(err.status(), Some(403));

    let status = client.session().await.unwrap();
    assert!(!status.valid);
}

#[tokio::test]
async fn test_client_after_logout_retries_once_then_expires() {
    let (_app, client) = spawn_client().await;
    client.login(ADMIN_EMAIL, ADMIN_PASSWORD).await.unwrap();
    client.logout().await.unwrap();

    let mut events = client.subscribe();
    let err = client.me().await.unwrap_err();
    assert!(matches!(err, ClientError::SessionExpired));

    assert_eq!(events.recv().await.unwrap(), SessionEvent::Unauthorized);
    assert_eq!(events.recv().await.unwrap(), SessionEvent::Unauthorized);
    assert!(events.try_recv().is_err());
}

#[tokio::test]
async fn test_client_refresh_extends_session() {
    let (_app, client) = spawn_client().await;
    client.login(ADMIN_EMAIL, ADMIN_PASSWORD).await.unwrap();

    let refreshed = client.refresh().await.unwrap();
    assert!(refreshed.valid);

    // The rotated cookies are in the client's store.
    assert!(client.session().await.unwrap().valid);
}

#[tokio::test]
async fn test_monitor_reports_healthy_session() {
    let (_app, client) = spawn_client().await;
    client.login(ADMIN_EMAIL, ADMIN_PASSWORD).await.unwrap();

    let client = Arc::new(client);
    let mut events = client.subscribe();
    let handle = SessionMonitor::new(Arc::clone(&client), &monitor_config()).start();

    let event = tokio::time::timeout(Duration::from_secs(5), events.recv())
        .await
        .expect("monitor checked on start")
        .unwrap();
    assert!(matches!(event, SessionEvent::Healthy { .. }));

    handle.shutdown().await;
}

#[tokio::test]
async fn test_monitor_refreshes_inside_lookahead() {
    let (_app, client) = spawn_client().await;
    client.login(ADMIN_EMAIL, ADMIN_PASSWORD).await.unwrap();

    // A lookahead longer than the access TTL puts every session inside the window.
    let config = MonitorConfig {
        refresh_lookahead_seconds: 2 * 60 * 60,
        ..monitor_config()
    };
    let monitor = SessionMonitor::new(Arc::new(client), &config);

    let event = monitor.check_once().await.unwrap();
    assert!(matches!(event, SessionEvent::Refreshed { .. }));
}

#[tokio::test]
async fn test_monitor_reports_expired_after_logout() {
    let (_app, client) = spawn_client().await;
    client.login(ADMIN_EMAIL, ADMIN_PASSWORD).await.unwrap();
    client.logout().await.unwrap();

    let monitor = SessionMonitor::new(Arc::new(client), &monitor_config());
    assert_eq!(monitor.check_once().await.unwrap(), SessionEvent::Expired);
}
