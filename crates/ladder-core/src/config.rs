//! Session configuration
//!
//! Defaults match the hosted app; every field may be overridden from a
//! TOML file with the same keys.

use crate::error::{LadderError, LadderResult};
use chrono::Duration;
use ladder_history::DEFAULT_MAX_HISTORY;
use ladder_store::{validate_text, DEFAULT_KID};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Longest accepted invitation lifetime in hours
pub const MAX_INVITE_TTL_HOURS: i64 = 24 * 366;

/// Session configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// History bound; older entries are forgotten
    pub max_history: usize,
    /// Name of the profile created for new accounts
    pub default_kid: String,
    /// Lifetime of invitation codes in hours
    pub invite_ttl_hours: i64,
    /// Buffered notifications per subscriber
    pub notification_capacity: usize,
}

impl SessionConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With history bound
    #[inline]
    #[must_use]
    pub fn with_max_history(mut self, max: usize) -> Self {
        self.max_history = max;
        self
    }

    /// With default profile name
    #[inline]
    #[must_use]
    pub fn with_default_kid(mut self, name: impl Into<String>) -> Self {
        self.default_kid = name.into();
        self
    }

    /// With invitation lifetime
    #[inline]
    #[must_use]
    pub fn with_invite_ttl_hours(mut self, hours: i64) -> Self {
        self.invite_ttl_hours = hours;
        self
    }

    /// With notification buffer size
    #[inline]
    #[must_use]
    pub fn with_notification_capacity(mut self, capacity: usize) -> Self {
        self.notification_capacity = capacity;
        self
    }

    /// Parse and validate TOML
    ///
    /// # Errors
    /// Returns [`LadderError::Config`] on syntax errors or out-of-range values
    pub fn from_toml_str(source: &str) -> LadderResult<Self> {
        let mut config: Self = toml::from_str(source).map_err(|e| LadderError::config(e.to_string()))?;
        config.validate()?;
        config.default_kid = config.default_kid_name()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file
    ///
    /// # Errors
    /// Returns [`LadderError::Config`] when the file cannot be read or parsed
    pub async fn from_file(path: impl AsRef<Path>) -> LadderResult<Self> {
        let path = path.as_ref();
        let source = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| LadderError::config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&source)
    }

    /// Check value ranges
    ///
    /// # Errors
    /// Returns [`LadderError::Config`] naming the first bad field
    pub fn validate(&self) -> LadderResult<()> {
        if self.max_history == 0 {
            return Err(LadderError::config("max_history must be at least 1"));
        }
        self.invite_ttl()?;
        if self.notification_capacity == 0 {
            return Err(LadderError::config("notification_capacity must be at least 1"));
        }
        self.default_kid_name()?;
        Ok(())
    }

    /// Invitation lifetime
    ///
    /// # Errors
    /// [`LadderError::Config`] unless the hours are in `1..=MAX_INVITE_TTL_HOURS`
    pub fn invite_ttl(&self) -> LadderResult<Duration> {
        if !(1..=MAX_INVITE_TTL_HOURS).contains(&self.invite_ttl_hours) {
            return Err(LadderError::config(format!(
                "invite_ttl_hours must be between 1 and {MAX_INVITE_TTL_HOURS}"
            )));
        }
        Duration::try_hours(self.invite_ttl_hours)
            .ok_or_else(|| LadderError::config("invite_ttl_hours out of range"))
    }

    /// Default profile name, trimmed
    ///
    /// # Errors
    /// [`LadderError::Config`] if the name breaks the input rules
    pub fn default_kid_name(&self) -> LadderResult<String> {
        validate_text(&self.default_kid).map_err(|e| LadderError::config(format!("default_kid: {e}")))
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_history: DEFAULT_MAX_HISTORY,
            default_kid: DEFAULT_KID.to_string(),
            invite_ttl_hours: 24,
            notification_capacity: 64,
        }
    }
}
