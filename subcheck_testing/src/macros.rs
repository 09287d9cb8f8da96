//! Assertion macros integrating a matcher with the test harness.

/// Run `matcher` against `factory` and panic with assertion-framework
/// framing on mismatch.
///
/// The failure message pairs the matcher's expectation summary with the
/// mismatch description:
///
/// ```text
/// Expected: Expected 2 messages.
///      but: Got 0 messages. ...
/// ```
#[macro_export]
macro_rules! assert_delivered {
    ($matcher:expr, $factory:expr) => {{
        let matcher = $matcher;
        let expected = matcher.describe_expected();
        if let Err(mismatch) = matcher.verify($factory).await {
            panic!("\nExpected: {expected}\n     but: {mismatch}");
        }
    }};
}

/// Run `matcher` against `factory`, expecting a mismatch, and return it.
#[macro_export]
macro_rules! expect_mismatch {
    ($matcher:expr, $factory:expr) => {{
        match $matcher.verify($factory).await {
            Err(mismatch) => mismatch,
            Ok(()) => panic!(concat!("expected a mismatch at ", file!(), ":", line!())),
        }
    }};
}

pub use crate::{assert_delivered, expect_mismatch};
