//! Capability traits for the external subscription collaborator.
//!
//! The real broker client never appears in this crate. A
//! [`SubscriptionFactory`] is injected into the matcher and produces
//! [`PullSubscription`] handles, so tests substitute an in-memory fake
//! exposing the same pull/acknowledge capability set.

use async_trait::async_trait;
use thiserror::Error;

use crate::message::{AckId, ReceivedMessage};

/// Errors surfaced by a subscription handle or its factory.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SubscriptionError {
    /// The transport failed while pulling or acknowledging.
    #[error("transport error: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),
    /// The named subscription could not be opened.
    #[error("subscription {subscription} not available in project {project}")]
    Unavailable {
        /// Project the subscription was looked up in.
        project: String,
        /// Name of the subscription that failed to open.
        subscription: String,
    },
}

impl SubscriptionError {
    /// Wrap an arbitrary transport failure.
    pub fn transport(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::Transport(err.into())
    }
}

/// A pull-capable consumption point bound to a topic.
///
/// Implementations wrap a broker client's batch pull and acknowledge calls.
/// `pull` must be non-blocking or short-blocking: an empty batch means
/// nothing was available right now, and the matcher decides whether to back
/// off or give up.
#[async_trait]
pub trait PullSubscription: Send {
    /// Pull up to `max_messages` currently available messages.
    ///
    /// # Errors
    ///
    /// Returns [`SubscriptionError`] when the transport fails. The matcher
    /// treats such failures like empty batches and keeps polling until its
    /// timeout.
    async fn pull(
        &mut self,
        max_messages: usize,
    ) -> Result<Vec<ReceivedMessage>, SubscriptionError>;

    /// Acknowledge the identified deliveries so they are not redelivered.
    ///
    /// # Errors
    ///
    /// Returns [`SubscriptionError`] when the transport fails.
    async fn acknowledge(&mut self, ack_ids: Vec<AckId>) -> Result<(), SubscriptionError>;
}

/// Produces subscription handles for a verification run.
///
/// The matcher opens exactly one handle per run. The subscription must
/// already exist and be bound to the topic publishing the messages under
/// test.
#[async_trait]
pub trait SubscriptionFactory: Send + Sync {
    /// Concrete handle type produced by this factory.
    type Subscription: PullSubscription;

    /// Open a handle to `subscription` within `project`.
    ///
    /// # Errors
    ///
    /// Returns [`SubscriptionError::Unavailable`] (or a transport error) when
    /// the handle cannot be obtained.
    async fn open(
        &self,
        project: &str,
        subscription: &str,
    ) -> Result<Self::Subscription, SubscriptionError>;
}
