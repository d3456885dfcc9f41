use std::sync::Arc;
use crate::config::Config;
use crate::error::Result;
use crate::session::store::{SessionSettings, SessionStore};

/// The application's state.
#[derive(Clone)]
pub struct AppState {
    /// The application's configuration.
    pub config: Config,
    /// The session store shared by every request handler.
    pub sessions: Arc<SessionStore>,
}

impl AppState {
    /// Creates a new `AppState`.
    ///
    /// # Arguments
    ///
    /// * `config` - The application's configuration.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `AppState`.
    pub fn new(config: &Config) -> Result<Self> {
        let sessions = SessionStore::init(SessionSettings::from_config(config))?;
        tracing::info!(
            "✅ Session store initialized ({} day sessions, secure cookies: {})",
            config.session_duration_days,
            config.cookie_secure
        );

        Ok(AppState {
            config: config.clone(),
            sessions: Arc::new(sessions),
        })
    }
}
