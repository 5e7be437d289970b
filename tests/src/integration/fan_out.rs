//! # Fan-Out Tests
//!
//! Subscription lifecycle and delivery to many subscribers at once.
//!
//! ```text
//!                       ┌──▶ Subscription #1  (recv)
//!  publish("SomeEvent") ├──▶ Subscription #2  (recv)
//!                       └──▶ Subscription #N  (recv)
//! ```
//!
//! Every subscriber waiting in `recv()` receives the event exactly once;
//! subscribers that left before the publish receive nothing.

#[cfg(test)]
mod tests {
    use crate::support::{init_test_logging, some_event, TestEvent};
    use event_bus::{Event, EventBus, LoggingStrategy};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::Barrier;
    use tokio::time::{sleep, timeout};
    use tokio_stream::StreamExt;

    const DELIVERY_TIMEOUT: Duration = Duration::from_secs(1);
    const SILENCE_WINDOW: Duration = Duration::from_millis(200);

    fn strategy() -> Arc<LoggingStrategy> {
        Arc::new(LoggingStrategy::tracing(DELIVERY_TIMEOUT))
    }

    // =========================================================================
    // CONCURRENT SUBSCRIBERS
    // =========================================================================

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_each_concurrent_subscriber_receives_exactly_once() {
        init_test_logging();

        const SUBSCRIBERS: usize = 100;
        let bus: EventBus<String> = EventBus::new();
        let ready = Arc::new(Barrier::new(SUBSCRIBERS + 1));
        let received = Arc::new(AtomicUsize::new(0));
        let duplicates = Arc::new(AtomicUsize::new(0));

        let mut readers = Vec::with_capacity(SUBSCRIBERS);
        for _ in 0..SUBSCRIBERS {
            let bus = bus.clone();
            let ready = Arc::clone(&ready);
            let received = Arc::clone(&received);
            let duplicates = Arc::clone(&duplicates);

            readers.push(tokio::spawn(async move {
                let mut subscription = bus.subscribe("SomeEvent");
                ready.wait().await;

                if let Ok(Some(event)) = timeout(DELIVERY_TIMEOUT, subscription.recv()).await {
                    assert_eq!(event, some_event());
                    received.fetch_add(1, Ordering::SeqCst);
                }
                if timeout(SILENCE_WINDOW, subscription.recv()).await.is_ok() {
                    duplicates.fetch_add(1, Ordering::SeqCst);
                }
            }));
        }

        ready.wait().await;
        assert_eq!(bus.subscriber_count("SomeEvent"), SUBSCRIBERS);

        let report = bus.publish(some_event(), strategy()).wait().await;

        for reader in readers {
            reader.await.unwrap();
        }
        assert_eq!(report.delivered, SUBSCRIBERS);
        assert_eq!(report.failed, 0);
        assert_eq!(received.load(Ordering::SeqCst), SUBSCRIBERS);
        assert_eq!(duplicates.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_subscribe_and_unsubscribe_leaves_survivors() {
        let bus: EventBus<String> = EventBus::new();

        let mut tasks = Vec::new();
        for i in 0..50 {
            let bus = bus.clone();
            tasks.push(tokio::spawn(async move {
                let subscription = bus.subscribe("SomeEvent");
                if i % 2 == 0 {
                    bus.unsubscribe("SomeEvent", &subscription);
                    None
                } else {
                    Some(subscription)
                }
            }));
        }

        let mut survivors = Vec::new();
        for task in tasks {
            if let Some(subscription) = task.await.unwrap() {
                survivors.push(subscription);
            }
        }

        assert_eq!(survivors.len(), 25);
        assert_eq!(bus.subscriber_count("SomeEvent"), 25);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_subscriber_polling_with_short_timeouts_loses_nothing() {
        let bus: EventBus<String> = EventBus::new();
        let mut subscription = bus.subscribe("SomeEvent");

        let reader = tokio::spawn(async move {
            let mut polls = 0u32;
            loop {
                polls += 1;
                if let Ok(event) = timeout(Duration::from_millis(1), subscription.recv()).await {
                    return (event, polls);
                }
            }
        });

        sleep(Duration::from_millis(100)).await;
        let report = bus.publish(some_event(), strategy()).wait().await;
        let (received, polls) = timeout(DELIVERY_TIMEOUT, reader).await.unwrap().unwrap();

        assert_eq!(report.delivered, 1);
        assert_eq!(received, Some(some_event()));
        assert!(polls > 1);
    }

    // =========================================================================
    // UNSUBSCRIBE
    // =========================================================================

    #[tokio::test]
    async fn test_unsubscribed_subscriber_receives_nothing() {
        init_test_logging();

        let bus: EventBus<String> = EventBus::new();
        let mut subscription = bus.subscribe("SomeEvent");
        bus.unsubscribe("SomeEvent", &subscription);

        let dispatch = bus.publish(some_event(), strategy());
        assert!(dispatch.is_empty());

        let outcome = timeout(SILENCE_WINDOW, subscription.recv()).await;
        assert!(outcome.is_err(), "nothing is delivered after unsubscribe");
        assert_eq!(bus.metrics().snapshot().attempted, 0);
    }

    #[tokio::test]
    async fn test_unsubscribe_only_affects_that_subscription() {
        let bus: EventBus<String> = EventBus::new();
        let mut stays = bus.subscribe("SomeEvent");
        let mut leaves = bus.subscribe("SomeEvent");
        bus.unsubscribe("SomeEvent", &leaves);

        let reader = tokio::spawn(async move { stays.recv().await });
        let report = bus.publish(some_event(), strategy()).wait().await;

        assert_eq!(report.delivered, 1);
        assert_eq!(reader.await.unwrap(), Some(some_event()));
        assert!(timeout(SILENCE_WINDOW, leaves.recv()).await.is_err());
    }

    // =========================================================================
    // ROUTING AND ORDER
    // =========================================================================

    #[tokio::test]
    async fn test_events_routed_by_name_only() {
        let bus: EventBus<String> = EventBus::new();
        let mut some = bus.subscribe("SomeEvent");
        let mut other = bus.subscribe("OtherEvent");

        let reader = tokio::spawn(async move { some.recv().await });
        bus.publish(some_event(), strategy()).wait().await;

        assert_eq!(reader.await.unwrap(), Some(some_event()));
        assert!(timeout(SILENCE_WINDOW, other.recv()).await.is_err());
    }

    #[tokio::test]
    async fn test_stream_sees_sequential_publishes_in_order() {
        let bus: EventBus<String> = EventBus::new();
        let mut subscription = bus.subscribe("Tick");

        let reader = tokio::spawn(async move {
            subscription
                .stream()
                .take(3)
                .collect::<Vec<TestEvent>>()
                .await
        });

        for i in 0..3 {
            let report = bus
                .publish(Event::new("Tick", format!("tick-{i}")), strategy())
                .wait()
                .await;
            assert_eq!(report.delivered, 1);
        }

        let details: Vec<String> = reader
            .await
            .unwrap()
            .into_iter()
            .map(|event| event.details)
            .collect();
        assert_eq!(details, vec!["tick-0", "tick-1", "tick-2"]);

        let snapshot = bus.metrics().snapshot();
        assert_eq!(snapshot.published, 3);
        assert_eq!(snapshot.delivered, 3);
        assert_eq!(snapshot.in_flight(), 0);
    }
}
