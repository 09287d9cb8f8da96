//! Polling-loop behaviour: termination, acknowledgement, and transport
//! failure handling.

mod common;

use common::config;
use rstest::rstest;
use subcheck::{AckId, ExpectedMessage, MessageMatcher, Mismatch};
use subcheck_testing::{
    LoggerHandle,
    ScriptedFactory,
    ScriptedSubscription,
    TestResult,
    assert_delivered,
    expect_mismatch,
    logger,
    received,
};

fn warning_logged(logger: &mut LoggerHandle, needle: &str) -> bool {
    let mut found = false;
    while let Some(record) = logger.pop() {
        if record.level() == log::Level::Warn && record.args().contains(needle) {
            found = true;
        }
    }
    found
}

#[tokio::test(start_paused = true)]
async fn no_pull_happens_past_the_matching_count() -> TestResult {
    let subscription = ScriptedSubscription::new();
    subscription.deliver(vec![received("a", &[], "ack-1")]);
    subscription.deliver(vec![received("b", &[], "ack-2")]);
    let factory = ScriptedFactory::serving(subscription.clone());

    let matcher = MessageMatcher::new(config(), vec![ExpectedMessage::new("a")])?;
    assert_delivered!(matcher, &factory);
    assert_eq!(subscription.pull_calls(), 1);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn every_pulled_message_is_acknowledged_on_success() -> TestResult {
    let subscription = ScriptedSubscription::new();
    subscription.deliver(vec![received("a", &[], "ack-1")]);
    subscription.deliver(vec![received("b", &[], "ack-2")]);
    let factory = ScriptedFactory::serving(subscription.clone());

    let matcher = MessageMatcher::new(
        config(),
        vec![ExpectedMessage::new("a"), ExpectedMessage::new("b")],
    )?;
    assert_delivered!(matcher, &factory);
    assert_eq!(
        subscription.acked(),
        vec![AckId::new("ack-1"), AckId::new("ack-2")]
    );
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn mismatched_messages_are_still_acknowledged() -> TestResult {
    let subscription = ScriptedSubscription::new();
    subscription.deliver(vec![
        received("c", &[], "ack-1"),
        received("d", &[], "ack-2"),
    ]);
    let factory = ScriptedFactory::serving(subscription.clone());

    let matcher = MessageMatcher::new(config(), vec![ExpectedMessage::new("a")])?;
    let _mismatch = expect_mismatch!(matcher, &factory);
    assert_eq!(
        subscription.acked(),
        vec![AckId::new("ack-1"), AckId::new("ack-2")]
    );
    Ok(())
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn pull_failures_are_retried_until_timeout(mut logger: LoggerHandle) -> TestResult {
    let subscription = ScriptedSubscription::new();
    subscription.fail_pull("connection reset");
    subscription.deliver(vec![received("a", &[], "ack-1")]);
    let factory = ScriptedFactory::serving(subscription.clone());

    let matcher = MessageMatcher::new(config(), vec![ExpectedMessage::new("a")])?;
    assert_delivered!(matcher, &factory);
    assert_eq!(subscription.pull_calls(), 2);
    assert!(warning_logged(&mut logger, "pull failed"));
    Ok(())
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn acknowledge_failure_does_not_abort_the_run(mut logger: LoggerHandle) -> TestResult {
    let subscription = ScriptedSubscription::new();
    subscription.deliver(vec![received("a", &[], "ack-1")]);
    subscription.fail_acks();
    let factory = ScriptedFactory::serving(subscription.clone());

    let matcher = MessageMatcher::new(config(), vec![ExpectedMessage::new("a")])?;
    assert_delivered!(matcher, &factory);
    assert!(subscription.acked().is_empty());
    assert!(warning_logged(&mut logger, "failed to acknowledge"));
    Ok(())
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn unreachable_broker_presents_as_a_count_mismatch(
    mut logger: LoggerHandle,
) -> TestResult {
    let factory = ScriptedFactory::unavailable();

    let matcher = MessageMatcher::new(config(), vec![ExpectedMessage::new("a")])?;
    let mismatch = expect_mismatch!(matcher, &factory);
    assert!(matches!(
        mismatch,
        Mismatch::Count {
            expected: 1,
            observed: 0,
            ..
        }
    ));
    assert!(warning_logged(&mut logger, "failed to open subscription"));
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn empty_expectation_still_observes_one_pull() -> TestResult {
    let subscription = ScriptedSubscription::new();
    let factory = ScriptedFactory::serving(subscription.clone());

    let matcher = MessageMatcher::new(config(), Vec::new())?;
    assert_delivered!(matcher, &factory);
    assert_eq!(subscription.pull_calls(), 1);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn empty_expectation_fails_when_something_arrives() -> TestResult {
    let subscription = ScriptedSubscription::new();
    subscription.deliver(vec![received("a", &[], "ack-1")]);
    let factory = ScriptedFactory::serving(subscription.clone());

    let matcher = MessageMatcher::new(config(), Vec::new())?;
    let mismatch = expect_mismatch!(matcher, &factory);
    assert!(matches!(
        mismatch,
        Mismatch::Count {
            expected: 0,
            observed: 1,
            ..
        }
    ));
    assert_eq!(subscription.acked(), vec![AckId::new("ack-1")]);
    Ok(())
}
