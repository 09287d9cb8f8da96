//! Scripted in-memory subscription and factory fakes.
//!
//! A [`ScriptedSubscription`] plays back a queue of per-pull steps: deliver a
//! batch, or fail with a transport error. Once the script is exhausted every
//! further pull delivers an empty batch, so a matcher polls an idle
//! subscription until its timeout. State is shared behind an `Arc`, letting
//! tests keep a handle for inspection after the factory has cloned the
//! subscription into a verification run.

use std::{
    collections::VecDeque,
    sync::{Arc, Mutex, MutexGuard},
};

use async_trait::async_trait;
use bytes::Bytes;
use subcheck::{
    AckId,
    Attributes,
    PullSubscription,
    ReceivedMessage,
    SubscriptionError,
    SubscriptionFactory,
};

/// One step of a scripted pull sequence.
enum ScriptStep {
    Deliver(Vec<ReceivedMessage>),
    Fail(String),
}

#[derive(Default)]
struct ScriptState {
    steps: VecDeque<ScriptStep>,
    pull_calls: usize,
    acked: Vec<AckId>,
    fail_acks: bool,
}

/// In-memory subscription whose pull results are scripted per call.
#[derive(Clone, Default)]
pub struct ScriptedSubscription {
    state: Arc<Mutex<ScriptState>>,
}

impl ScriptedSubscription {
    /// Subscription with an empty script: every pull delivers nothing.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, ScriptState> {
        self.state.lock().expect("script state poisoned")
    }

    /// Queue a batch to deliver on the next unscripted pull.
    pub fn deliver(&self, batch: Vec<ReceivedMessage>) {
        self.state().steps.push_back(ScriptStep::Deliver(batch));
    }

    /// Queue a transport failure for the next unscripted pull.
    pub fn fail_pull(&self, reason: impl Into<String>) {
        self.state().steps.push_back(ScriptStep::Fail(reason.into()));
    }

    /// Make every acknowledge call fail with a transport error.
    pub fn fail_acks(&self) {
        self.state().fail_acks = true;
    }

    /// Number of pull calls observed so far.
    #[must_use]
    pub fn pull_calls(&self) -> usize {
        self.state().pull_calls
    }

    /// Ack ids acknowledged so far, in acknowledgement order.
    #[must_use]
    pub fn acked(&self) -> Vec<AckId> {
        self.state().acked.clone()
    }
}

#[async_trait]
impl PullSubscription for ScriptedSubscription {
    async fn pull(
        &mut self,
        max_messages: usize,
    ) -> Result<Vec<ReceivedMessage>, SubscriptionError> {
        let mut state = self.state();
        state.pull_calls += 1;
        match state.steps.pop_front() {
            Some(ScriptStep::Deliver(mut batch)) => {
                if batch.len() > max_messages {
                    // Requeue the overflow so the batch-size contract holds.
                    let rest = batch.split_off(max_messages);
                    state.steps.push_front(ScriptStep::Deliver(rest));
                }
                Ok(batch)
            }
            Some(ScriptStep::Fail(reason)) => Err(SubscriptionError::transport(reason)),
            None => Ok(Vec::new()),
        }
    }

    async fn acknowledge(&mut self, ack_ids: Vec<AckId>) -> Result<(), SubscriptionError> {
        let mut state = self.state();
        if state.fail_acks {
            return Err(SubscriptionError::transport("acknowledge refused by script"));
        }
        state.acked.extend(ack_ids);
        Ok(())
    }
}

/// Factory yielding a scripted subscription, or refusing to open one.
pub struct ScriptedFactory {
    outcome: FactoryOutcome,
}

enum FactoryOutcome {
    Serve(ScriptedSubscription),
    Unavailable,
}

impl ScriptedFactory {
    /// Factory handing out clones of `subscription` (shared script state).
    #[must_use]
    pub fn serving(subscription: ScriptedSubscription) -> Self {
        Self {
            outcome: FactoryOutcome::Serve(subscription),
        }
    }

    /// Factory that fails every open, simulating an unreachable broker.
    #[must_use]
    pub fn unavailable() -> Self {
        Self {
            outcome: FactoryOutcome::Unavailable,
        }
    }
}

#[async_trait]
impl SubscriptionFactory for ScriptedFactory {
    type Subscription = ScriptedSubscription;

    async fn open(
        &self,
        project: &str,
        subscription: &str,
    ) -> Result<Self::Subscription, SubscriptionError> {
        match &self.outcome {
            FactoryOutcome::Serve(scripted) => Ok(scripted.clone()),
            FactoryOutcome::Unavailable => Err(SubscriptionError::Unavailable {
                project: project.to_owned(),
                subscription: subscription.to_owned(),
            }),
        }
    }
}

/// Attribute mapping from string pairs.
#[must_use]
pub fn attributes(pairs: &[(&str, &str)]) -> Attributes {
    pairs
        .iter()
        .map(|(key, value)| ((*key).to_owned(), (*value).to_owned()))
        .collect()
}

/// Delivered message with the given payload, attributes and ack id.
#[must_use]
pub fn received(
    payload: impl Into<Bytes>,
    pairs: &[(&str, &str)],
    ack_id: &str,
) -> ReceivedMessage {
    ReceivedMessage::new(AckId::new(ack_id), payload, attributes(pairs))
}
