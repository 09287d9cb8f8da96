//! Shared fixtures for matcher integration tests.

#![allow(
    dead_code,
    reason = "shared test utilities are not used by all test binaries"
)]

use std::time::Duration;

use rstest::fixture;
use subcheck::MatcherConfig;

/// Matcher configuration with a short timeout suitable for paused-clock
/// tests: empty polls advance the mock clock by the poll interval, so a run
/// that never completes still exits after a handful of iterations.
#[fixture]
pub fn config() -> MatcherConfig {
    MatcherConfig::new("test-project", "test-sub").timeout(Duration::from_secs(5))
}
