//! Session cookies as a credential store.

use axum_extra::extract::CookieJar;
use axum_extra::extract::cookie::{Cookie, SameSite};

use growthwatch_auth::CredentialStore;
use growthwatch_core::config::CookieConfig;
use growthwatch_entity::session::{Session, SessionCredentials};

/// Names and attributes of the three session cookies.
#[derive(Debug, Clone)]
pub struct CookieSettings {
    /// Access token cookie name.
    pub access_token: String,
    /// Refresh token cookie name.
    pub refresh_token: String,
    /// Identity id cookie name.
    pub identity: String,
    /// Lifetime in seconds.
    pub max_age_seconds: i64,
    /// `Secure` attribute.
    pub secure: bool,
    /// `SameSite` attribute.
    pub same_site: SameSite,
    /// `Path` attribute.
    pub path: String,
}

impl CookieSettings {
    /// Builds settings from configuration. Unknown `same_site` values fall back to `Lax`.
    pub fn from_config(config: &CookieConfig) -> Self {
        let same_site = match config.same_site.to_lowercase().as_str() {
            "strict" => SameSite::Strict,
            "none" => SameSite::None,
            _ => SameSite::Lax,
        };

        Self {
            access_token: config.access_token_name.clone(),
            refresh_token: config.refresh_token_name.clone(),
            identity: config.identity_name.clone(),
            max_age_seconds: config.max_age_seconds,
            secure: config.secure,
            same_site,
            path: config.path.clone(),
        }
    }

    fn session_cookie(&self, name: &str, value: String) -> Cookie<'static> {
        Cookie::build((name.to_string(), value))
            .http_only(true)
            .secure(self.secure)
            .same_site(self.same_site)
            .path(self.path.clone())
            .max_age(time::Duration::seconds(self.max_age_seconds))
            .build()
    }

    fn removal_cookie(&self, name: &str) -> Cookie<'static> {
        Cookie::build((name.to_string(), String::new()))
            .path(self.path.clone())
            .build()
    }
}

/// The request's cookie jar viewed as a [`CredentialStore`].
///
/// Writes accumulate in the jar; return [`CookieCredentials::into_jar`]
/// alongside the response so the `Set-Cookie` headers are emitted.
#[derive(Debug)]
pub struct CookieCredentials<'a> {
    jar: CookieJar,
    settings: &'a CookieSettings,
}

impl<'a> CookieCredentials<'a> {
    /// Wraps a request's cookie jar.
    pub fn new(jar: CookieJar, settings: &'a CookieSettings) -> Self {
        Self { jar, settings }
    }

    /// The jar with every pending cookie change.
    pub fn into_jar(self) -> CookieJar {
        self.jar
    }

    fn value(&self, name: &str) -> Option<String> {
        self.jar
            .get(name)
            .map(|cookie| cookie.value().to_string())
            .filter(|value| !value.is_empty())
    }
}

impl CredentialStore for CookieCredentials<'_> {
    fn credentials(&self) -> SessionCredentials {
        SessionCredentials {
            access_token: self.value(&self.settings.access_token),
            refresh_token: self.value(&self.settings.refresh_token),
        }
    }

    fn set_credentials(&mut self, session: &Session) {
        let settings = self.settings;
        let jar = std::mem::take(&mut self.jar);
        self.jar = jar
            .add(settings.session_cookie(&settings.access_token, session.access_token.clone()))
            .add(settings.session_cookie(&settings.refresh_token, session.refresh_token.clone()))
            .add(settings.session_cookie(&settings.identity, session.user.id.to_string()));
    }

    fn clear(&mut self) {
        let settings = self.settings;
        let jar = std::mem::take(&mut self.jar);
        self.jar = jar
            .remove(settings.removal_cookie(&settings.access_token))
            .remove(settings.removal_cookie(&settings.refresh_token))
            .remove(settings.removal_cookie(&settings.identity));
    }
}
