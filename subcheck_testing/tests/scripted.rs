//! Behavioural tests for the scripted subscription fakes.

use subcheck::{AckId, PullSubscription, SubscriptionError, SubscriptionFactory};
use subcheck_testing::{ScriptedFactory, ScriptedSubscription, TestResult, received};

#[tokio::test]
async fn exhausted_script_delivers_empty_batches() -> TestResult {
    let mut subscription = ScriptedSubscription::new();
    subscription.deliver(vec![received("a", &[], "ack-1")]);

    let first = subscription.pull(50).await?;
    assert_eq!(first.len(), 1);
    let second = subscription.pull(50).await?;
    assert!(second.is_empty());
    assert_eq!(subscription.pull_calls(), 2);
    Ok(())
}

#[tokio::test]
async fn oversize_batch_requeues_the_overflow() -> TestResult {
    let mut subscription = ScriptedSubscription::new();
    subscription.deliver(vec![
        received("a", &[], "ack-1"),
        received("b", &[], "ack-2"),
        received("c", &[], "ack-3"),
    ]);

    let first = subscription.pull(2).await?;
    assert_eq!(first.len(), 2);
    let second = subscription.pull(2).await?;
    assert_eq!(second.len(), 1);
    assert_eq!(second[0].payload(), "c");
    Ok(())
}

#[tokio::test]
async fn acknowledgements_are_recorded_in_order() -> TestResult {
    let mut subscription = ScriptedSubscription::new();
    subscription
        .acknowledge(vec![AckId::new("ack-2"), AckId::new("ack-1")])
        .await?;
    assert_eq!(
        subscription.acked(),
        vec![AckId::new("ack-2"), AckId::new("ack-1")]
    );
    Ok(())
}

#[tokio::test]
async fn scripted_pull_failure_is_a_transport_error() {
    let mut subscription = ScriptedSubscription::new();
    subscription.fail_pull("connection reset");

    let error = subscription
        .pull(50)
        .await
        .expect_err("scripted failure should surface");
    assert!(matches!(error, SubscriptionError::Transport(_)));
    assert!(error.to_string().contains("connection reset"));
}

#[tokio::test]
async fn unavailable_factory_refuses_to_open() {
    let factory = ScriptedFactory::unavailable();
    let error = factory
        .open("test-project", "test-sub")
        .await
        .err()
        .expect("open should fail");
    assert!(matches!(error, SubscriptionError::Unavailable { .. }));
    assert!(error.to_string().contains("test-sub"));
}
