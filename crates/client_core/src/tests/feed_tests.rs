use std::{collections::HashSet, sync::Arc};

use serde_json::json;
use tokio::sync::Notify;

use super::*;
use crate::test_support::{
    articles_from_json, ids, scenario_catalog, topic, FakeCatalog, FakeSubscriptions,
};

fn names(values: &[&str]) -> HashSet<String> {
    values.iter().map(|value| value.to_string()).collect()
}

#[tokio::test]
async fn resolves_subscribed_articles_in_catalog_order() {
    let subscriptions = FakeSubscriptions::ok(vec![topic(1, "tech")]);
    let catalog = FakeCatalog::ok(scenario_catalog());
    let resolver = FeedResolver::new(subscriptions.clone(), catalog.clone());

    let feed = resolver
        .resolve_feed(&CancelToken::new())
        .await
        .expect("feed");

    assert_eq!(ids(feed.articles()), vec![10, 12]);
    assert_eq!(subscriptions.calls(), 1);
    assert_eq!(catalog.calls(), 1);
}

#[tokio::test]
async fn no_subscriptions_yield_an_empty_feed() {
    let resolver = FeedResolver::new(
        FakeSubscriptions::ok(Vec::new()),
        FakeCatalog::ok(scenario_catalog()),
    );

    let feed = resolver
        .resolve_feed(&CancelToken::new())
        .await
        .expect("feed");

    assert!(feed.is_empty());
}

#[test]
fn feed_is_exactly_the_resolvable_subscribed_articles() {
    let catalog = articles_from_json(json!([
        { "id": 1, "topic": { "name": "tech" } },
        { "id": 2, "topicName": "music" },
        { "id": 3 },
        { "id": 4, "topic": "tech" },
        { "id": 5, "topic": { "id": 9 } },
        { "id": 6, "topic": { "name": "sports" } },
        { "id": 7, "topicName": "tech" }
    ]));

    let cases: [(&[&str], Vec<i64>); 5] = [
        (&[], vec![]),
        (&["tech"], vec![1, 7]),
        (&["music", "sports"], vec![2, 6]),
        (&["tech", "music", "sports"], vec![1, 2, 6, 7]),
        (&[""], vec![]),
    ];

    for (subscribed, expected) in cases {
        let feed = filter_subscribed(catalog.clone(), &names(subscribed));
        assert_eq!(ids(feed.articles()), expected, "subscribed = {subscribed:?}");
        assert!(feed
            .articles()
            .iter()
            .all(|article| article.topic.is_some()));
    }
}

#[test]
fn topic_matching_is_exact() {
    let catalog = articles_from_json(json!([
        { "id": 1, "topic": { "name": "Tech" } },
        { "id": 2, "topic": { "name": "tech " } },
        { "id": 3, "topic": { "name": "tech" } }
    ]));

    let feed = filter_subscribed(catalog, &names(&["tech"]));

    assert_eq!(ids(feed.articles()), vec![3]);
}

#[test]
fn duplicate_subscriptions_collapse_to_one_name() {
    let subscribed = subscribed_topic_names(&[topic(1, "tech"), topic(2, "tech")]);
    assert_eq!(subscribed, names(&["tech"]));
}

#[tokio::test]
async fn subscription_failure_skips_the_catalog() {
    let catalog = FakeCatalog::ok(scenario_catalog());
    let resolver = FeedResolver::new(FakeSubscriptions::failing("503 upstream"), catalog.clone());

    let err = resolver
        .resolve_feed(&CancelToken::new())
        .await
        .expect_err("subscription failure");

    assert!(matches!(err, FeedError::SubscriptionFetch(ref reason) if reason.contains("503")));
    assert_eq!(catalog.calls(), 0);
}

#[tokio::test]
async fn catalog_failure_yields_no_partial_feed() {
    let subscriptions = FakeSubscriptions::ok(vec![topic(1, "tech")]);
    let resolver = FeedResolver::new(subscriptions.clone(), FakeCatalog::failing("timeout"));

    let err = resolver
        .resolve_feed(&CancelToken::new())
        .await
        .expect_err("catalog failure");

    assert_eq!(err, FeedError::CatalogFetch("timeout".into()));
    assert_eq!(subscriptions.calls(), 1);
}

#[tokio::test]
async fn cancelled_token_stops_before_any_fetch() {
    let subscriptions = FakeSubscriptions::ok(vec![topic(1, "tech")]);
    let catalog = FakeCatalog::ok(scenario_catalog());
    let resolver = FeedResolver::new(subscriptions.clone(), catalog.clone());
    let cancel = CancelToken::new();
    cancel.cancel();

    let err = resolver.resolve_feed(&cancel).await.expect_err("cancelled");

    assert_eq!(err, FeedError::Cancelled);
    assert_eq!(subscriptions.calls(), 0);
    assert_eq!(catalog.calls(), 0);
}

#[tokio::test]
async fn cancel_during_subscription_fetch_never_requests_catalog() {
    let release = Arc::new(Notify::new());
    let subscriptions = FakeSubscriptions::held(vec![topic(1, "tech")], release.clone());
    let catalog = FakeCatalog::ok(scenario_catalog());
    let resolver = Arc::new(FeedResolver::new(subscriptions.clone(), catalog.clone()));
    let cancel = CancelToken::new();

    let task = {
        let resolver = Arc::clone(&resolver);
        let cancel = cancel.clone();
        tokio::spawn(async move { resolver.resolve_feed(&cancel).await })
    };
    while subscriptions.calls() == 0 {
        tokio::task::yield_now().await;
    }

    cancel.cancel();
    release.notify_one();
    let outcome = task.await.expect("join");

    assert_eq!(outcome, Err(FeedError::Cancelled));
    assert_eq!(catalog.calls(), 0);
}
