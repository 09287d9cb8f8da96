//! Multiset-equality property for the matcher's public contract.
//!
//! For any expected and observed payload sequences, a run that sees every
//! observed message succeeds exactly when the two payload multisets are
//! equal, independent of delivery order.

use std::{collections::BTreeMap, time::Duration};

use proptest::prelude::*;
use subcheck::{ExpectedMessage, MatcherConfig, MessageMatcher};
use subcheck_testing::{ScriptedFactory, ScriptedSubscription, received};

/// Small alphabet so generated sequences collide and duplicate often.
fn payloads() -> impl Strategy<Value = Vec<String>> {
    proptest::collection::vec("[abc]{1,2}", 0..5)
}

fn multiset(payloads: &[String]) -> BTreeMap<&str, usize> {
    let mut counts = BTreeMap::new();
    for payload in payloads {
        *counts.entry(payload.as_str()).or_insert(0) += 1;
    }
    counts
}

proptest! {
    #[test]
    fn match_succeeds_iff_multisets_are_equal(
        expected in payloads(),
        observed in payloads(),
    ) {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .start_paused(true)
            .build()
            .expect("failed to build runtime");

        let equal = multiset(&expected) == multiset(&observed);
        let outcome = runtime.block_on(async {
            let subscription = ScriptedSubscription::new();
            if !observed.is_empty() {
                subscription.deliver(
                    observed
                        .iter()
                        .enumerate()
                        .map(|(i, payload)| {
                            received(payload.clone(), &[], &format!("ack-{i}"))
                        })
                        .collect(),
                );
            }
            let factory = ScriptedFactory::serving(subscription);
            let matcher = MessageMatcher::new(
                MatcherConfig::new("test-project", "test-sub")
                    .timeout(Duration::from_secs(3)),
                expected
                    .iter()
                    .map(|payload| ExpectedMessage::new(payload.clone()))
                    .collect(),
            )
            .expect("configuration is valid");
            matcher.verify(&factory).await
        });

        prop_assert_eq!(outcome.is_ok(), equal);
    }
}
