use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::{
    config::{Config, DEFAULT_SESSION_DURATION_DAYS},
    crypto::token,
    error::{AppError, Result},
    models::session::{parse_credential, CookieFlags, Credential, SessionRecord},
    validation::identity::validate_identity,
};

/// Parameters applied to every issued session.
#[derive(Debug, Clone, Copy)]
pub struct SessionSettings {
    /// Lifetime of a session, fixed at issuance.
    pub ttl: Duration,
    /// Cookie attributes for issued and clearing credentials.
    pub flags: CookieFlags,
}

impl SessionSettings {
    /// Derives the session settings from the application configuration.
    pub fn from_config(config: &Config) -> Self {
        Self {
            ttl: Duration::days(config.session_duration_days),
            flags: CookieFlags {
                secure: config.cookie_secure,
                ..CookieFlags::default()
            },
        }
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            ttl: Duration::days(DEFAULT_SESSION_DURATION_DAYS),
            flags: CookieFlags::default(),
        }
    }
}

/// In-process registry of active sessions, one per identity.
///
/// All access goes through a single mutex; each operation, including the
/// purge of an expired record during validation, is one critical section.
pub struct SessionStore {
    sessions: Mutex<HashMap<String, SessionRecord>>,
    settings: SessionSettings,
}

impl SessionStore {
    /// Initializes an empty store.
    ///
    /// Fails if the secure random source is unusable, so a process that
    /// cannot mint tokens refuses to start.
    pub fn init(settings: SessionSettings) -> Result<Self> {
        tracing::info!("🔐 Initializing session store...");
        token::probe_random_source()?;

        Ok(Self {
            sessions: Mutex::new(HashMap::new()),
            settings,
        })
    }

    /// The settings sessions are issued with.
    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, SessionRecord>> {
        // Every critical section leaves the map consistent, so a panic in
        // another holder cannot have left a half-written entry.
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Issues a new session for `identity`, replacing any existing one.
    pub fn issue(&self, identity: &str) -> Result<Credential> {
        self.issue_at(identity, Utc::now())
    }

    /// Issues a session as if the current time were `now`.
    pub fn issue_at(&self, identity: &str, now: DateTime<Utc>) -> Result<Credential> {
        validate_identity(identity)?;
        let expires_at = now.checked_add_signed(self.settings.ttl).ok_or_else(|| {
            AppError::Internal(format!("Session lifetime {} overflows the clock", self.settings.ttl))
        })?;
        let token = token::generate_session_token()?;

        let record = SessionRecord {
            identity: identity.to_string(),
            token,
            created_at: now,
            expires_at,
            flags: self.settings.flags,
        };
        let credential = record.credential();

        let replaced = self.lock().insert(identity.to_string(), record);
        tracing::debug!(
            "🔑 Session issued for {} (replaced existing: {})",
            identity,
            replaced.is_some()
        );

        Ok(credential)
    }

    /// Checks a presented credential value against the stored session.
    ///
    /// A missing, malformed, unknown, expired or mismatching credential is
    /// simply invalid. An expired record is removed on the way.
    pub fn validate(&self, presented: Option<&str>) -> bool {
        self.validate_at(presented, Utc::now())
    }

    /// Validates a credential as if the current time were `now`.
    pub fn validate_at(&self, presented: Option<&str>, now: DateTime<Utc>) -> bool {
        let Some((identity, presented_token)) = presented.and_then(parse_credential) else {
            return false;
        };

        let mut sessions = self.lock();
        let Some(record) = sessions.get(identity) else {
            return false;
        };

        if record.is_expired_at(now) {
            sessions.remove(identity);
            tracing::debug!("⌛ Expired session purged for {}", identity);
            return false;
        }

        token::tokens_match(presented_token, &record.token)
    }

    /// Revokes the session of the identity named by the presented credential.
    ///
    /// Revocation is identity-scoped: the stored record is removed whether or
    /// not the presented token matches it. The returned credential clears the
    /// client's cookie.
    pub fn revoke(&self, presented: Option<&str>) -> Credential {
        self.revoke_at(presented, Utc::now())
    }

    /// Revokes a session as if the current time were `now`.
    pub fn revoke_at(&self, presented: Option<&str>, now: DateTime<Utc>) -> Credential {
        if let Some((identity, _)) = presented.and_then(parse_credential) {
            if self.lock().remove(identity).is_some() {
                tracing::info!("✅ Logout successful for {}", identity);
            } else {
                tracing::debug!("No session to revoke for {}", identity);
            }
        }

        Credential::clearing(now, self.settings.flags)
    }

    /// Removes every expired record and returns how many were dropped.
    pub fn sweep_expired(&self) -> usize {
        self.sweep_expired_at(Utc::now())
    }

    /// Sweeps expired records as if the current time were `now`.
    pub fn sweep_expired_at(&self, now: DateTime<Utc>) -> usize {
        let mut sessions = self.lock();
        let before = sessions.len();
        sessions.retain(|_, record| !record.is_expired_at(now));
        let removed = before - sessions.len();

        if removed > 0 {
            tracing::info!("🧹 Swept {} expired session(s)", removed);
        }
        removed
    }

    /// Number of records currently held, expired or not.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Whether a record, expired or not, is held for `identity`.
    pub fn contains(&self, identity: &str) -> bool {
        self.lock().contains_key(identity)
    }
}
