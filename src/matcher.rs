//! Polling loop and multiset comparison for subscription verification.

use std::collections::BTreeMap;

use tokio::time::{Instant, sleep};
use tracing::{debug, warn};

use crate::{
    config::{ConfigError, MAX_MESSAGES_IN_ONE_PULL, MatcherConfig},
    message::{AckId, Attributes, ExpectedMessage, ReceivedMessage},
    mismatch::{AttributeDiff, MatchResult, Mismatch, PayloadDiff},
    subscription::{PullSubscription, SubscriptionFactory},
};

/// Verifies that a subscription delivers an expected multiset of messages.
///
/// A matcher runs exactly once: [`MessageMatcher::verify`] consumes the
/// instance, pulls from the subscription until the expected count is reached
/// or the timeout elapses, acknowledges every pulled message on receipt, and
/// compares the accumulated multiset against the expectation under the
/// configured attribute policy.
///
/// Delivery order never matters; duplicates do. Expected `["a", "a"]` is only
/// satisfied by exactly two deliveries of `"a"`.
///
/// # Examples
///
/// ```rust
/// use subcheck::{ExpectedMessage, MatcherConfig, MessageMatcher};
///
/// let config = MatcherConfig::new("ci-project", "events-sub");
/// let matcher = MessageMatcher::new(config, vec![ExpectedMessage::new("a")])?;
/// assert_eq!(matcher.describe_expected(), "Expected 1 messages.");
/// # Ok::<(), subcheck::ConfigError>(())
/// ```
pub struct MessageMatcher {
    config: MatcherConfig,
    expected: Vec<ExpectedMessage>,
}

impl MessageMatcher {
    /// Build a matcher for one verification run.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the configuration is rejected (empty
    /// project or subscription name, zero poll interval).
    pub fn new(
        config: MatcherConfig,
        expected: Vec<ExpectedMessage>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config, expected })
    }

    /// Expectation summary for assertion-framework output.
    #[must_use]
    pub fn describe_expected(&self) -> String {
        format!("Expected {} messages.", self.expected.len())
    }

    /// Execute the polling and matching run.
    ///
    /// Opens one subscription handle through `factory`, polls until the
    /// expected count is reached or the timeout elapses, and returns the
    /// comparison outcome. Transport failures while opening or pulling are
    /// logged and surface as a count mismatch once the timeout is spent; at
    /// this layer an unreachable broker is indistinguishable from a silent
    /// one.
    ///
    /// # Errors
    ///
    /// Returns the [`Mismatch`] describing how the observed messages diverged
    /// from the expectation.
    pub async fn verify<F>(self, factory: &F) -> MatchResult
    where
        F: SubscriptionFactory,
    {
        let mut subscription = match factory
            .open(self.config.project(), self.config.subscription())
            .await
        {
            Ok(subscription) => subscription,
            Err(error) => {
                warn!(
                    %error,
                    subscription = self.config.subscription(),
                    "failed to open subscription"
                );
                return self.compare(&[], Vec::new());
            }
        };
        let (observed, strip_missing) = self.poll(&mut subscription).await;
        self.compare(&observed, strip_missing)
    }

    /// Accumulate deliveries until the expected count is reached or the
    /// timeout elapses.
    ///
    /// The elapsed check runs at the top of each iteration, so even a zero
    /// timeout performs one pull. Every pulled batch is acknowledged
    /// immediately after accumulation, before any comparison.
    async fn poll<S>(&self, subscription: &mut S) -> (Vec<ReceivedMessage>, Vec<String>)
    where
        S: PullSubscription,
    {
        let expected_count = self.expected.len();
        let start = Instant::now();
        let mut observed: Vec<ReceivedMessage> = Vec::new();
        let mut strip_missing: Vec<String> = Vec::new();

        while start.elapsed() <= self.config.timeout {
            let batch = match subscription.pull(MAX_MESSAGES_IN_ONE_PULL).await {
                Ok(batch) => batch,
                Err(error) => {
                    warn!(%error, "pull failed; retrying until timeout");
                    sleep(self.config.poll_interval).await;
                    continue;
                }
            };
            if batch.is_empty() {
                if observed.len() >= expected_count {
                    break;
                }
                sleep(self.config.poll_interval).await;
                continue;
            }

            let ack_ids: Vec<AckId> = batch.iter().map(|m| m.ack_id().clone()).collect();
            for mut message in batch {
                self.strip(&mut message, &mut strip_missing);
                observed.push(message);
            }
            if let Err(error) = subscription.acknowledge(ack_ids).await {
                warn!(%error, "failed to acknowledge pulled messages");
            }
            debug!(
                observed = observed.len(),
                expected = expected_count,
                "accumulated pull batch"
            );
            if observed.len() >= expected_count {
                break;
            }
        }
        (observed, strip_missing)
    }

    /// Remove declared strip keys from a delivered message, recording keys
    /// that were absent. Stripping asserts presence, then removes.
    fn strip(&self, message: &mut ReceivedMessage, strip_missing: &mut Vec<String>) {
        if !self.config.with_attributes {
            return;
        }
        for key in &self.config.strip_attributes {
            if message.attributes_mut().remove(key).is_none() {
                strip_missing.push(key.clone());
            }
        }
    }

    /// Compare accumulated messages against the expectation.
    fn compare(&self, observed: &[ReceivedMessage], strip_missing: Vec<String>) -> MatchResult {
        let expected_count = self.expected.len();
        let observed_count = observed.len();

        if observed_count != expected_count {
            return Err(Mismatch::Count {
                expected: expected_count,
                observed: observed_count,
                diff: self.payload_diff(observed),
            });
        }
        if !strip_missing.is_empty() {
            return Err(Mismatch::StrippedAttributes {
                expected: expected_count,
                observed: observed_count,
                missing: strip_missing,
            });
        }
        if !self.config.with_attributes {
            let diff = self.payload_diff(observed);
            if diff.is_empty() {
                return Ok(());
            }
            return Err(Mismatch::Content {
                expected: expected_count,
                observed: observed_count,
                diff,
            });
        }

        let expected = counter(
            self.expected
                .iter()
                .map(|m| (m.payload().clone(), m.attributes().clone())),
        );
        let delivered = counter(
            observed
                .iter()
                .map(|m| (m.payload().clone(), m.attributes().clone())),
        );
        if expected == delivered {
            return Ok(());
        }

        let diff = self.payload_diff(observed);
        if diff.is_empty() {
            return Err(Mismatch::Attributes {
                expected: expected_count,
                observed: observed_count,
                diffs: attribute_diffs(&self.expected, observed),
            });
        }
        Err(Mismatch::Content {
            expected: expected_count,
            observed: observed_count,
            diff,
        })
    }

    /// Payload-only multiset difference between expectation and observation.
    fn payload_diff(&self, observed: &[ReceivedMessage]) -> PayloadDiff {
        let expected = counter(self.expected.iter().map(|m| m.payload().clone()));
        let delivered = counter(observed.iter().map(|m| m.payload().clone()));
        PayloadDiff {
            missing: counter_minus(&expected, &delivered),
            unexpected: counter_minus(&delivered, &expected),
        }
    }
}

/// Multiset counter over an item stream.
fn counter<K, I>(items: I) -> BTreeMap<K, usize>
where
    K: Ord,
    I: IntoIterator<Item = K>,
{
    let mut counts = BTreeMap::new();
    for item in items {
        *counts.entry(item).or_insert(0) += 1;
    }
    counts
}

/// Items of `a` exceeding their count in `b`, with the excess count.
fn counter_minus<K>(a: &BTreeMap<K, usize>, b: &BTreeMap<K, usize>) -> Vec<(K, usize)>
where
    K: Ord + Clone,
{
    a.iter()
        .filter_map(|(item, count)| {
            let excess = count.saturating_sub(b.get(item).copied().unwrap_or(0));
            (excess > 0).then(|| (item.clone(), excess))
        })
        .collect()
}

/// Key/value pairs of `a` not bound identically in `b`.
fn pairs_minus(a: &Attributes, b: &Attributes) -> Vec<(String, String)> {
    a.iter()
        .filter(|&(key, value)| b.get(key) != Some(value))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

/// Per-message attribute divergences, for runs where the payload multisets
/// agree but the attributed multisets do not.
///
/// Exact (payload, attributes) matches pair off first; each leftover observed
/// message then pairs with a leftover expectation of the same payload. The
/// payload multisets are equal by precondition, so every leftover finds a
/// partner.
fn attribute_diffs(
    expected: &[ExpectedMessage],
    observed: &[ReceivedMessage],
) -> Vec<AttributeDiff> {
    let mut remaining: Vec<&ExpectedMessage> = expected.iter().collect();
    let mut unmatched: Vec<&ReceivedMessage> = Vec::new();
    for message in observed {
        let exact = remaining.iter().position(|candidate| {
            candidate.payload() == message.payload()
                && candidate.attributes() == message.attributes()
        });
        match exact {
            Some(position) => {
                remaining.swap_remove(position);
            }
            None => unmatched.push(message),
        }
    }

    let mut diffs = Vec::new();
    for message in unmatched {
        if let Some(position) = remaining
            .iter()
            .position(|candidate| candidate.payload() == message.payload())
        {
            let partner = remaining.swap_remove(position);
            diffs.push(AttributeDiff {
                payload: message.payload().clone(),
                unexpected: pairs_minus(message.attributes(), partner.attributes()),
                missing: pairs_minus(partner.attributes(), message.attributes()),
            });
        }
    }
    diffs
}
