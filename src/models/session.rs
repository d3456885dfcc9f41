use chrono::{DateTime, Duration, Utc};
use std::fmt;
use tower_cookies::Cookie;
use tower_cookies::cookie::SameSite;
use tower_cookies::cookie::time::OffsetDateTime;
use zeroize::Zeroizing;

/// Name of the cookie carrying the session credential.
pub const SESSION_COOKIE_NAME: &str = "session";

/// Separates the identity from the token inside a credential value.
pub const CREDENTIAL_SEPARATOR: char = ':';

/// Transport attributes attached to every session cookie.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CookieFlags {
    /// Whether scripts are denied access to the cookie.
    pub http_only: bool,
    /// Whether the cookie is only sent over secure transport.
    pub secure: bool,
    /// The cookie's `SameSite` policy.
    pub same_site: SameSite,
}

impl CookieFlags {
    /// The cookie path. Sessions are always scoped to the root.
    pub const PATH: &'static str = "/";
}

impl Default for CookieFlags {
    fn default() -> Self {
        Self {
            http_only: true,
            secure: true,
            same_site: SameSite::Lax,
        }
    }
}

/// Server-side state of an active session.
///
/// Records are never mutated once stored; a new login replaces the
/// record wholesale.
#[derive(Clone)]
pub struct SessionRecord {
    /// The principal this session belongs to.
    pub identity: String,
    /// The secret token. Wiped from memory when the record is dropped.
    pub token: Zeroizing<String>,
    /// The timestamp when the session was created.
    pub created_at: DateTime<Utc>,
    /// The timestamp when the session expires.
    pub expires_at: DateTime<Utc>,
    /// Cookie attributes the session was issued with.
    pub flags: CookieFlags,
}

impl SessionRecord {
    /// Whether the record is past its expiry at `now`. A record expiring
    /// exactly at `now` counts as expired.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    /// The credential handed back to the client for this record.
    pub fn credential(&self) -> Credential {
        Credential {
            identity: self.identity.clone(),
            token: self.token.clone(),
            expires_at: self.expires_at,
            flags: self.flags,
        }
    }
}

impl fmt::Debug for SessionRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionRecord")
            .field("identity", &self.identity)
            .field("token", &"<redacted>")
            .field("created_at", &self.created_at)
            .field("expires_at", &self.expires_at)
            .field("flags", &self.flags)
            .finish()
    }
}

/// The value exchanged with the client to assert a session.
#[derive(Clone)]
pub struct Credential {
    pub identity: String,
    pub token: Zeroizing<String>,
    pub expires_at: DateTime<Utc>,
    pub flags: CookieFlags,
}

impl Credential {
    /// Builds the credential that instructs the client to drop its session
    /// cookie: empty value, expiry one day in the past.
    pub fn clearing(now: DateTime<Utc>, flags: CookieFlags) -> Self {
        Self {
            identity: String::new(),
            token: Zeroizing::new(String::new()),
            expires_at: now - Duration::days(1),
            flags,
        }
    }

    /// Whether this credential clears the client's session.
    pub fn is_clearing(&self) -> bool {
        self.token.is_empty()
    }

    /// The cookie value, `identity:token`, or empty for a clearing credential.
    pub fn value(&self) -> String {
        if self.is_clearing() {
            return String::new();
        }
        format!("{}{}{}", self.identity, CREDENTIAL_SEPARATOR, self.token.as_str())
    }

    /// Converts the credential into a cookie ready to be attached to a response.
    pub fn to_cookie(&self) -> Cookie<'static> {
        let mut cookie = Cookie::new(SESSION_COOKIE_NAME, self.value());

        cookie.set_path(CookieFlags::PATH);
        cookie.set_http_only(self.flags.http_only);
        cookie.set_secure(self.flags.secure);
        cookie.set_same_site(self.flags.same_site);

        match OffsetDateTime::from_unix_timestamp(self.expires_at.timestamp()) {
            Ok(expires) => cookie.set_expires(expires),
            Err(e) => tracing::warn!("Session expiry out of cookie range: {}", e),
        }

        cookie
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("identity", &self.identity)
            .field("token", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .field("flags", &self.flags)
            .finish()
    }
}

/// Splits a presented credential value into `(identity, token)`.
///
/// Surrounding whitespace is ignored. The split happens at the first
/// separator; a value without one is malformed and yields `None`.
pub fn parse_credential(value: &str) -> Option<(&str, &str)> {
    value.trim().split_once(CREDENTIAL_SEPARATOR)
}
