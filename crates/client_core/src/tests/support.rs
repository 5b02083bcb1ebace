//! Fakes shared by the unit test suites.

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex as StdMutex,
};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde_json::json;
use shared::{
    domain::{Article, TopicId},
    protocol::{ArticlePayload, TopicSummary},
};
use tokio::sync::Notify;

use crate::{CatalogSource, Navigator, Notifier, Route, SubscriptionSource};

pub(crate) fn topic(id: i64, name: &str) -> TopicSummary {
    TopicSummary {
        id: TopicId(id),
        name: name.to_string(),
        description: None,
    }
}

pub(crate) fn articles_from_json(value: serde_json::Value) -> Vec<Article> {
    let payloads: Vec<ArticlePayload> = serde_json::from_value(value).expect("catalog json");
    payloads.into_iter().map(Article::from).collect()
}

/// The three-article catalog used by the feed scenarios: 10 and 12 are
/// "tech" (embedded and flat), 11 is "sports".
pub(crate) fn scenario_catalog() -> Vec<Article> {
    articles_from_json(json!([
        { "id": 10, "title": "a", "topic": { "name": "tech" }, "createdAt": "2024-01-01" },
        { "id": 11, "title": "b", "topic": { "name": "sports" }, "createdAt": "2024-02-01" },
        { "id": 12, "title": "c", "topicName": "tech", "createdAt": "2023-12-01" }
    ]))
}

pub(crate) fn ids(articles: &[Article]) -> Vec<i64> {
    articles
        .iter()
        .map(|article| article.id.expect("article id").0)
        .collect()
}

pub(crate) struct FakeSubscriptions {
    result: Result<Vec<TopicSummary>, String>,
    release: Option<Arc<Notify>>,
    calls: AtomicUsize,
}

impl FakeSubscriptions {
    pub(crate) fn ok(topics: Vec<TopicSummary>) -> Arc<Self> {
        Arc::new(Self {
            result: Ok(topics),
            release: None,
            calls: AtomicUsize::new(0),
        })
    }

    pub(crate) fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self {
            result: Err(message.to_string()),
            release: None,
            calls: AtomicUsize::new(0),
        })
    }

    /// Answers only after `release` is notified.
    pub(crate) fn held(topics: Vec<TopicSummary>, release: Arc<Notify>) -> Arc<Self> {
        Arc::new(Self {
            result: Ok(topics),
            release: Some(release),
            calls: AtomicUsize::new(0),
        })
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SubscriptionSource for FakeSubscriptions {
    async fn subscribed_topics(&self) -> Result<Vec<TopicSummary>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(release) = &self.release {
            release.notified().await;
        }
        self.result.clone().map_err(|err| anyhow!(err))
    }
}

pub(crate) struct FakeCatalog {
    result: Result<Vec<Article>, String>,
    release: Option<Arc<Notify>>,
    calls: AtomicUsize,
}

impl FakeCatalog {
    pub(crate) fn ok(articles: Vec<Article>) -> Arc<Self> {
        Arc::new(Self {
            result: Ok(articles),
            release: None,
            calls: AtomicUsize::new(0),
        })
    }

    pub(crate) fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self {
            result: Err(message.to_string()),
            release: None,
            calls: AtomicUsize::new(0),
        })
    }

    pub(crate) fn held(articles: Vec<Article>, release: Arc<Notify>) -> Arc<Self> {
        Arc::new(Self {
            result: Ok(articles),
            release: Some(release),
            calls: AtomicUsize::new(0),
        })
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CatalogSource for FakeCatalog {
    async fn all_articles(&self) -> Result<Vec<Article>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(release) = &self.release {
            release.notified().await;
        }
        self.result.clone().map_err(|err| anyhow!(err))
    }
}

#[derive(Default)]
pub(crate) struct RecordingNavigator {
    routes: StdMutex<Vec<Route>>,
}

impl RecordingNavigator {
    pub(crate) fn routes(&self) -> Vec<Route> {
        self.routes.lock().expect("navigator lock").clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, route: Route) {
        self.routes.lock().expect("navigator lock").push(route);
    }
}

#[derive(Default)]
pub(crate) struct RecordingNotifier {
    messages: StdMutex<Vec<String>>,
}

impl RecordingNotifier {
    pub(crate) fn messages(&self) -> Vec<String> {
        self.messages.lock().expect("notifier lock").clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, message: &str) {
        self.messages
            .lock()
            .expect("notifier lock")
            .push(message.to_string());
    }
}
