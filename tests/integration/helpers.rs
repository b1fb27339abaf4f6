//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use http::header::{CONTENT_TYPE, COOKIE, LOCATION, SET_COOKIE};
use http::{HeaderMap, Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use growthwatch_api::{AppState, build_app};
use growthwatch_auth::{LocalIdentityProvider, MemoryProfileStore, PasswordHasher};
use growthwatch_core::config::AppConfig;
use growthwatch_entity::{Profile, Role};

pub const ADMIN_EMAIL: &str = "admin@clinic.test";
pub const ADMIN_PASSWORD: &str = "admin-pass-1";
pub const PARENT_EMAIL: &str = "parent@clinic.test";
pub const PARENT_PASSWORD: &str = "parent-pass-1";
pub const ORPHAN_EMAIL: &str = "orphan@clinic.test";
pub const ORPHAN_PASSWORD: &str = "orphan-pass-1";

pub const ACCESS_COOKIE: &str = "sb-access-token";
pub const REFRESH_COOKIE: &str = "sb-refresh-token";
pub const IDENTITY_COOKIE: &str = "user-id";

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Application config
    pub config: AppConfig,
    /// Identity provider shared with the router
    pub provider: Arc<LocalIdentityProvider>,
    /// Profile store shared with the router
    pub profiles: Arc<MemoryProfileStore>,
    /// Seeded admin id
    pub admin_id: Uuid,
    /// Seeded parent id
    pub parent_id: Uuid,
    /// Directory of static pages served behind the guard
    pub pages_dir: PathBuf,
}

/// Captured response
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestResponse {
    /// Value of a `Set-Cookie` for `name`, if the response set one.
    pub fn set_cookie(&self, name: &str) -> Option<String> {
        self.headers
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .filter_map(|v| v.split(';').next())
            .filter_map(|pair| pair.split_once('='))
            .find(|(n, _)| n.trim() == name)
            .map(|(_, value)| value.trim().to_string())
    }

    /// True when the response removes the cookie `name`.
    pub fn removes_cookie(&self, name: &str) -> bool {
        self.headers
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .any(|v| v.starts_with(&format!("{name}=")) && v.contains("Max-Age=0"))
    }

    /// `Location` header of a redirect.
    pub fn location(&self) -> Option<&str> {
        self.headers.get(LOCATION).and_then(|v| v.to_str().ok())
    }
}

/// Session cookies captured from a login response.
#[derive(Debug, Clone, Default)]
pub struct Cookies {
    pub access: Option<String>,
    pub refresh: Option<String>,
    pub identity: Option<String>,
}

impl Cookies {
    /// Renders a `Cookie` request header.
    pub fn header(&self) -> String {
        [
            (ACCESS_COOKIE, &self.access),
            (REFRESH_COOKIE, &self.refresh),
            (IDENTITY_COOKIE, &self.identity),
        ]
        .iter()
        .filter_map(|(name, value)| value.as_ref().map(|v| format!("{name}={v}")))
        .collect::<Vec<_>>()
        .join("; ")
    }
}

impl TestApp {
    /// Create a new test application
    pub async fn new() -> Self {
        let mut config = AppConfig::default();
        config.auth.jwt_secret = "integration-test-secret-0123456789".to_string();
        config.logging.format = "pretty".to_string();

        let pages_dir = write_pages();
        config.server.pages_dir = pages_dir.to_string_lossy().into_owned();

        let hasher = PasswordHasher::new();
        let provider = Arc::new(LocalIdentityProvider::new(&config.auth));
        let profiles = Arc::new(MemoryProfileStore::new());

        let admin_id = Uuid::new_v4();
        let parent_id = Uuid::new_v4();
        let orphan_id = Uuid::new_v4();

        for (id, email, password) in [
            (admin_id, ADMIN_EMAIL, ADMIN_PASSWORD),
            (parent_id, PARENT_EMAIL, PARENT_PASSWORD),
            (orphan_id, ORPHAN_EMAIL, ORPHAN_PASSWORD),
        ] {
            let hash = hasher.hash_password(password).expect("hash password");
            provider.add_account(id, email, &hash);
        }

        profiles.upsert(Profile {
            id: admin_id,
            name: "Clinic Admin".to_string(),
            role: Role::Admin,
        });
        profiles.upsert(Profile {
            id: parent_id,
            name: "Parent".to_string(),
            role: Role::Parent,
        });

        let state = AppState::new(config.clone(), provider.clone(), profiles.clone());
        let router = build_app(state);

        Self {
            router,
            config,
            provider,
            profiles,
            admin_id,
            parent_id,
            pages_dir,
        }
    }

    /// Send a request through the router
    pub async fn request(
        &self,
        method: &str,
        uri: &str,
        body: Option<Value>,
        cookies: Option<&Cookies>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(cookies) = cookies {
            builder = builder.header(COOKIE, cookies.header());
        }

        let body = match body {
            Some(json) => {
                builder = builder.header(CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let response = self
            .router
            .clone()
            .oneshot(builder.body(body).expect("build request"))
            .await
            .expect("router is infallible");

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("read body");
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        TestResponse {
            status,
            headers,
            body,
        }
    }

    /// Log in and return the session cookies
    pub async fn login(&self, email: &str, password: &str) -> Cookies {
        let response = self
            .request(
                "POST",
                "/api/auth/login",
                Some(serde_json::json!({ "email": email, "password": password })),
                None,
            )
            .await;
        assert_eq!(response.status, StatusCode::OK, "login failed: {}", response.body);

        Cookies {
            access: response.set_cookie(ACCESS_COOKIE),
            refresh: response.set_cookie(REFRESH_COOKIE),
            identity: response.set_cookie(IDENTITY_COOKIE),
        }
    }

    /// Log in as the seeded admin
    pub async fn login_admin(&self) -> Cookies {
        self.login(ADMIN_EMAIL, ADMIN_PASSWORD).await
    }
}

/// Writes a throwaway page tree and returns its root.
fn write_pages() -> PathBuf {
    let root = std::env::temp_dir().join(format!("growthwatch-pages-{}", Uuid::new_v4()));
    for (path, contents) in [
        ("index.html", "<h1>home</h1>"),
        ("dashboard/index.html", "<h1>dashboard</h1>"),
        ("login/index.html", "<h1>sign in</h1>"),
        ("_next/static/app.js", "console.log('app')"),
        ("favicon.ico", "ico"),
    ] {
        let file = root.join(path);
        if let Some(parent) = file.parent() {
            std::fs::create_dir_all(parent).expect("create pages dir");
        }
        std::fs::write(&file, contents).expect("write page");
    }
    root
}
