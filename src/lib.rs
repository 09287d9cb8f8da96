#![doc(html_root_url = "https://docs.rs/subcheck/latest")]
//! Public API for the `subcheck` library.
//!
//! This crate provides test-support building blocks for verifying that a
//! pull-capable publish/subscribe subscription delivered an expected multiset
//! of messages: a bounded polling loop, unconditional acknowledgement of
//! everything pulled, and order-independent comparison with an optional
//! attribute policy.
//!
//! The broker client stays outside the crate: a [`SubscriptionFactory`] is
//! injected into the matcher, so integration tests run against the real
//! client while unit tests substitute an in-memory fake.
//!
//! ```rust
//! use subcheck::{ExpectedMessage, MatcherConfig, MessageMatcher};
//!
//! let config = MatcherConfig::new("ci-project", "events-sub").with_attributes(true);
//! let matcher = MessageMatcher::new(config, vec![ExpectedMessage::new("event-1")])?;
//! assert_eq!(matcher.describe_expected(), "Expected 1 messages.");
//! # Ok::<(), subcheck::ConfigError>(())
//! ```

pub mod config;
pub mod matcher;
pub mod message;
pub mod mismatch;
pub mod subscription;

pub use config::{
    ConfigError,
    DEFAULT_POLL_INTERVAL,
    DEFAULT_TIMEOUT,
    MAX_MESSAGES_IN_ONE_PULL,
    MatcherConfig,
};
pub use matcher::MessageMatcher;
pub use message::{AckId, Attributes, ExpectedMessage, ReceivedMessage};
pub use mismatch::{AttributeDiff, MatchResult, Mismatch, PayloadDiff};
pub use subscription::{PullSubscription, SubscriptionError, SubscriptionFactory};
