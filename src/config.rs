//! Immutable per-run configuration for a verification run.

use std::{collections::BTreeSet, time::Duration};

use thiserror::Error;

/// Default bound on total polling time.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5 * 60);
/// Default delay between empty pulls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);
/// Upper bound on messages requested in a single pull.
pub const MAX_MESSAGES_IN_ONE_PULL: usize = 50;

/// Configuration errors rejected at matcher construction.
#[derive(Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConfigError {
    /// Project or subscription name was empty.
    #[error("project and subscription names must not be empty")]
    EmptyName,
    /// A zero poll interval would spin between empty pulls.
    #[error("poll interval must be non-zero")]
    ZeroPollInterval,
}

/// Settings for one polling and matching run.
///
/// Constructed once per assertion and never mutated afterwards. Setters
/// consume and return the config so options chain.
///
/// Listing keys in `strip_attributes` while attribute comparison is disabled
/// is a no-op, not an error: stripping only has meaning when attributes are
/// compared.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
///
/// use subcheck::MatcherConfig;
///
/// let config = MatcherConfig::new("ci-project", "events-sub")
///     .with_attributes(true)
///     .strip_attributes(["id", "timestamp"])
///     .timeout(Duration::from_secs(30));
/// assert_eq!(config.project(), "ci-project");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MatcherConfig {
    pub(crate) project: String,
    pub(crate) subscription: String,
    pub(crate) with_attributes: bool,
    pub(crate) strip_attributes: BTreeSet<String>,
    pub(crate) timeout: Duration,
    pub(crate) poll_interval: Duration,
}

impl MatcherConfig {
    /// Configuration with default timeout and poll interval.
    #[must_use]
    pub fn new(project: impl Into<String>, subscription: impl Into<String>) -> Self {
        Self {
            project: project.into(),
            subscription: subscription.into(),
            with_attributes: false,
            strip_attributes: BTreeSet::new(),
            timeout: DEFAULT_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Enable or disable attribute comparison.
    #[must_use]
    pub fn with_attributes(mut self, enabled: bool) -> Self {
        self.with_attributes = enabled;
        self
    }

    /// Attribute keys that must be present on every observed message and are
    /// removed before comparison.
    #[must_use]
    pub fn strip_attributes<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.strip_attributes = keys.into_iter().map(Into::into).collect();
        self
    }

    /// Bound on total polling time.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Delay between empty pulls. Constant, no exponential growth.
    #[must_use]
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Project the subscription lives in.
    #[must_use]
    pub fn project(&self) -> &str {
        &self.project
    }

    /// Name of the subscription to poll.
    #[must_use]
    pub fn subscription(&self) -> &str {
        &self.subscription
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.project.is_empty() || self.subscription.is_empty() {
            return Err(ConfigError::EmptyName);
        }
        if self.poll_interval.is_zero() {
            return Err(ConfigError::ZeroPollInterval);
        }
        Ok(())
    }
}
