//! Mismatch taxonomy produced by a verification run.
//!
//! Every variant renders through `Display` with the observed message count
//! first, so a generic assertion framework can pair it with
//! [`MessageMatcher::describe_expected`](crate::MessageMatcher::describe_expected)
//! to frame the failure as "Expected N messages" / "Got M messages".

use bytes::Bytes;

/// Outcome of one polling and matching run.
pub type MatchResult = Result<(), Mismatch>;

/// Multiset difference between expected and observed payloads.
///
/// Counts are multiset counts: a payload delivered twice but expected once
/// shows up as `(payload, 1)` under `unexpected`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PayloadDiff {
    /// (payload, count) pairs expected but not observed.
    pub missing: Vec<(Bytes, usize)>,
    /// (payload, count) pairs observed but not expected.
    pub unexpected: Vec<(Bytes, usize)>,
}

impl PayloadDiff {
    /// True when expected and observed payload multisets agree.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.missing.is_empty() && self.unexpected.is_empty()
    }
}

/// Attribute-level divergence on one observed message whose payload matched.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AttributeDiff {
    /// Payload of the diverging message.
    pub payload: Bytes,
    /// Key/value pairs present on the observed message but not expected.
    pub unexpected: Vec<(String, String)>,
    /// Key/value pairs the expectation requires but the message lacks.
    pub missing: Vec<(String, String)>,
}

/// Why a verification run failed.
///
/// When counts differ the count framing always wins, regardless of what else
/// diverged; the remaining variants all describe runs that accumulated
/// exactly the expected number of messages.
#[derive(Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum Mismatch {
    /// Observed message count differs from the expected count.
    Count {
        /// Number of messages the run expected.
        expected: usize,
        /// Number of messages accumulated before the run halted.
        observed: usize,
        /// Payload multiset difference for diagnosis.
        diff: PayloadDiff,
    },
    /// Counts agree but the payload multisets differ.
    Content {
        /// Number of messages the run expected.
        expected: usize,
        /// Number of messages accumulated, equal to `expected`.
        observed: usize,
        /// Symmetric payload multiset difference.
        diff: PayloadDiff,
    },
    /// Counts and payloads agree but attribute mappings diverge.
    Attributes {
        /// Number of messages the run expected.
        expected: usize,
        /// Number of messages accumulated, equal to `expected`.
        observed: usize,
        /// Per-message attribute divergences.
        diffs: Vec<AttributeDiff>,
    },
    /// A key declared for stripping was absent from an observed message.
    StrippedAttributes {
        /// Number of messages the run expected.
        expected: usize,
        /// Number of messages accumulated.
        observed: usize,
        /// Strip keys that were not present, in observation order.
        missing: Vec<String>,
    },
}

impl Mismatch {
    /// Number of messages the run expected.
    #[must_use]
    pub fn expected_count(&self) -> usize {
        match self {
            Self::Count { expected, .. }
            | Self::Content { expected, .. }
            | Self::Attributes { expected, .. }
            | Self::StrippedAttributes { expected, .. } => *expected,
        }
    }

    /// Number of messages the run accumulated before halting.
    #[must_use]
    pub fn observed_count(&self) -> usize {
        match self {
            Self::Count { observed, .. }
            | Self::Content { observed, .. }
            | Self::Attributes { observed, .. }
            | Self::StrippedAttributes { observed, .. } => *observed,
        }
    }
}

fn write_payload_counts(
    f: &mut std::fmt::Formatter<'_>,
    items: &[(Bytes, usize)],
) -> std::fmt::Result {
    f.write_str("[")?;
    for (i, (payload, count)) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "({:?}, {count})", String::from_utf8_lossy(payload))?;
    }
    f.write_str("]")
}

fn write_attribute_pairs(
    f: &mut std::fmt::Formatter<'_>,
    pairs: &[(String, String)],
) -> std::fmt::Result {
    f.write_str("[")?;
    for (i, (key, value)) in pairs.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{key}={value}")?;
    }
    f.write_str("]")
}

impl std::fmt::Display for Mismatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Got {} messages.", self.observed_count())?;
        match self {
            Self::Count { diff, .. } | Self::Content { diff, .. } => {
                f.write_str(" Diffs (item, count): expected but not in observed: ")?;
                write_payload_counts(f, &diff.missing)?;
                f.write_str(", unexpected: ")?;
                write_payload_counts(f, &diff.unexpected)?;
                f.write_str(".")
            }
            Self::Attributes { diffs, .. } => {
                f.write_str(" Unexpected or missing attributes:")?;
                for diff in diffs {
                    write!(f, " {:?}: unexpected ", String::from_utf8_lossy(&diff.payload))?;
                    write_attribute_pairs(f, &diff.unexpected)?;
                    f.write_str(", missing ")?;
                    write_attribute_pairs(f, &diff.missing)?;
                    f.write_str(";")?;
                }
                Ok(())
            }
            Self::StrippedAttributes { missing, .. } => {
                write!(
                    f,
                    " Stripped attributes that were not in message: [{}].",
                    missing.join(", ")
                )
            }
        }
    }
}
