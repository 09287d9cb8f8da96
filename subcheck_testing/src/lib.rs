//! Utilities for driving a [`MessageMatcher`](subcheck::MessageMatcher)
//! against scripted in-memory subscriptions during tests.
//!
//! The fakes here implement the same pull/acknowledge capability set as a
//! real broker client, with per-pull scripted batches and instrumentation
//! for pull counts and acknowledged ids.
//!
//! ```rust
//! use subcheck::{ExpectedMessage, MatcherConfig, MessageMatcher};
//! use subcheck_testing::{ScriptedFactory, ScriptedSubscription, received};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> subcheck_testing::TestResult {
//! let subscription = ScriptedSubscription::new();
//! subscription.deliver(vec![received("a", &[], "ack-1")]);
//! let factory = ScriptedFactory::serving(subscription.clone());
//!
//! let matcher = MessageMatcher::new(
//!     MatcherConfig::new("test-project", "test-sub"),
//!     vec![ExpectedMessage::new("a")],
//! )?;
//! matcher.verify(&factory).await.expect("messages should match");
//! assert_eq!(subscription.pull_calls(), 1);
//! # Ok(())
//! # }
//! ```

pub mod logging;
pub mod macros;
pub mod scripted;

pub use logging::{LoggerHandle, logger};
pub use scripted::{ScriptedFactory, ScriptedSubscription, attributes, received};

/// Boxed-error result alias shared by test modules.
pub type TestResult<T = ()> = Result<T, Box<dyn std::error::Error + Send + Sync>>;
