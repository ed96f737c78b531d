// Broadcaster tests: delivery, topic isolation, ordering, no replay

use iotserver::broadcaster::Broadcaster;
use iotserver::models::Topic;
use serde_json::json;
use tokio::sync::broadcast::error::TryRecvError;

#[tokio::test]
async fn publish_without_subscribers_reaches_nobody() {
    let b = Broadcaster::new(8);
    assert_eq!(b.publish(Topic::Dashboard, json!({"n": 1})), 0);
    assert_eq!(b.subscriber_count(Topic::Dashboard), 0);
}

#[tokio::test]
async fn publish_reaches_every_subscriber_of_the_topic() {
    let b = Broadcaster::new(8);
    let mut rx1 = b.subscribe(Topic::Energy);
    let mut rx2 = b.subscribe(Topic::Energy);
    assert_eq!(b.subscriber_count(Topic::Energy), 2);

    assert_eq!(b.publish(Topic::Energy, json!({"n": 1})), 2);
    assert_eq!(*rx1.recv().await.unwrap(), json!({"n": 1}));
    assert_eq!(*rx2.recv().await.unwrap(), json!({"n": 1}));
}

#[tokio::test]
async fn other_topics_do_not_receive() {
    let b = Broadcaster::new(8);
    let mut scores_rx = b.subscribe(Topic::Scores);

    b.publish(Topic::Energy, json!({"n": 1}));
    b.publish(Topic::Network, json!({"n": 2}));

    assert!(matches!(scores_rx.try_recv(), Err(TryRecvError::Empty)));
}

#[tokio::test]
async fn late_subscriber_sees_no_prior_publishes() {
    let b = Broadcaster::new(8);
    for n in 0..5 {
        b.publish(Topic::Hardware, json!({"n": n}));
    }

    let mut rx = b.subscribe(Topic::Hardware);
    assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));

    b.publish(Topic::Hardware, json!({"n": 99}));
    assert_eq!(*rx.recv().await.unwrap(), json!({"n": 99}));
}

#[tokio::test]
async fn per_topic_publish_order_is_preserved() {
    let b = Broadcaster::new(8);
    let mut rx = b.subscribe(Topic::Dashboard);

    for n in 0..3 {
        b.publish(Topic::Dashboard, json!({"n": n}));
    }
    for n in 0..3 {
        assert_eq!(*rx.recv().await.unwrap(), json!({"n": n}));
    }
}

#[tokio::test]
async fn dropped_subscriber_does_not_affect_others() {
    let b = Broadcaster::new(8);
    let mut alive = b.subscribe(Topic::Network);
    let dead = b.subscribe(Topic::Network);
    drop(dead);

    assert_eq!(b.publish(Topic::Network, json!({"n": 7})), 1);
    assert_eq!(*alive.recv().await.unwrap(), json!({"n": 7}));
    assert_eq!(b.subscriber_count(Topic::Network), 1);
}
