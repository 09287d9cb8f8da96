//! Message types flowing through a verification run.
//!
//! A subscription delivers [`ReceivedMessage`]s; the caller describes what
//! should arrive as [`ExpectedMessage`]s. Payloads are opaque [`Bytes`] and
//! attributes are an unordered string mapping, matching what the broker
//! client exposes.

use std::collections::BTreeMap;

use bytes::Bytes;

/// Unordered string key/value pairs attached to a message.
///
/// A `BTreeMap` keeps failure descriptions deterministic without imposing any
/// semantic ordering on the attributes themselves.
pub type Attributes = BTreeMap<String, String>;

/// Opaque token identifying one delivered message for acknowledgement.
///
/// Ack ids are only ever handed back to the subscription; they take no part
/// in matching.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct AckId(String);

impl AckId {
    /// Wrap a broker-assigned acknowledgement token.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The raw token as handed out by the broker.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for AckId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A message the verification run expects the subscription to deliver.
///
/// The raw-payload form carries an empty attribute mapping; it only behaves
/// differently from the attributed form when attribute comparison is enabled
/// on the [`MatcherConfig`](crate::MatcherConfig).
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ExpectedMessage {
    payload: Bytes,
    attributes: Attributes,
}

impl ExpectedMessage {
    /// Expect a payload with no attribute requirements.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use subcheck::ExpectedMessage;
    ///
    /// let expected = ExpectedMessage::new("event-1");
    /// assert!(expected.attributes().is_empty());
    /// ```
    #[must_use]
    pub fn new(payload: impl Into<Bytes>) -> Self {
        Self {
            payload: payload.into(),
            attributes: Attributes::new(),
        }
    }

    /// Expect a payload together with its attribute mapping.
    #[must_use]
    pub fn with_attributes(payload: impl Into<Bytes>, attributes: Attributes) -> Self {
        Self {
            payload: payload.into(),
            attributes,
        }
    }

    /// The expected payload bytes.
    #[must_use]
    pub fn payload(&self) -> &Bytes {
        &self.payload
    }

    /// The expected attribute mapping.
    #[must_use]
    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }
}

/// A message delivered by the subscription, with its acknowledgement token.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReceivedMessage {
    ack_id: AckId,
    payload: Bytes,
    attributes: Attributes,
}

impl ReceivedMessage {
    /// Assemble a delivered message as handed over by the broker client.
    #[must_use]
    pub fn new(ack_id: AckId, payload: impl Into<Bytes>, attributes: Attributes) -> Self {
        Self {
            ack_id,
            payload: payload.into(),
            attributes,
        }
    }

    /// Token to acknowledge this delivery with.
    #[must_use]
    pub fn ack_id(&self) -> &AckId {
        &self.ack_id
    }

    /// The delivered payload bytes.
    #[must_use]
    pub fn payload(&self) -> &Bytes {
        &self.payload
    }

    /// The delivered attribute mapping.
    #[must_use]
    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    /// Mutable access for attribute stripping during accumulation.
    pub(crate) fn attributes_mut(&mut self) -> &mut Attributes {
        &mut self.attributes
    }
}
