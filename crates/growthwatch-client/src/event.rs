//! Session events broadcast to the owning view.

/// What the client learned about the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// A request was answered with `401`.
    Unauthorized,
    /// The server reports the session as invalid; navigate to sign-in.
    Expired,
    /// The session was refreshed and now expires at the given time.
    Refreshed {
        /// New expiry (seconds since epoch).
        expires_at: i64,
    },
    /// The session is valid and outside the refresh window.
    Healthy {
        /// Expiry (seconds since epoch).
        expires_at: i64,
    },
}
