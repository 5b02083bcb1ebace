//! Feed resolution: subscriptions first, then the catalog filtered by the
//! subscribed topic names.

use std::{collections::HashSet, sync::Arc};

use shared::{domain::Article, protocol::TopicSummary};
use tracing::{debug, error, info};

use crate::{CancelToken, CatalogSource, FeedError, SubscriptionSource};

/// Articles visible to the current user, in catalog order until sorted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Feed {
    articles: Vec<Article>,
}

impl Feed {
    pub fn new(articles: Vec<Article>) -> Self {
        Self { articles }
    }

    pub fn articles(&self) -> &[Article] {
        &self.articles
    }

    pub fn len(&self) -> usize {
        self.articles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.articles.is_empty()
    }

    pub(crate) fn articles_mut(&mut self) -> &mut [Article] {
        &mut self.articles
    }
}

pub fn subscribed_topic_names(topics: &[TopicSummary]) -> HashSet<String> {
    topics.iter().map(|topic| topic.name.clone()).collect()
}

/// Keeps articles whose topic name is in `subscribed`. Articles without a
/// topic are never shown, whatever the subscriptions are.
pub fn filter_subscribed(catalog: Vec<Article>, subscribed: &HashSet<String>) -> Feed {
    let articles = catalog
        .into_iter()
        .filter(|article| {
            let Some(topic) = article.topic_name() else {
                debug!(
                    article_id = ?article.id,
                    title = %article.title,
                    "excluding article without topic"
                );
                return false;
            };
            let matched = subscribed.contains(topic);
            debug!(article_id = ?article.id, topic, matched, "topic membership");
            matched
        })
        .collect();
    Feed::new(articles)
}

pub struct FeedResolver {
    subscriptions: Arc<dyn SubscriptionSource>,
    catalog: Arc<dyn CatalogSource>,
}

impl FeedResolver {
    pub fn new(
        subscriptions: Arc<dyn SubscriptionSource>,
        catalog: Arc<dyn CatalogSource>,
    ) -> Self {
        Self {
            subscriptions,
            catalog,
        }
    }

    /// One resolution cycle. The catalog is only requested after the
    /// subscriptions arrive; `cancel` is observed at both waits.
    pub async fn resolve_feed(&self, cancel: &CancelToken) -> Result<Feed, FeedError> {
        if cancel.is_cancelled() {
            return Err(FeedError::Cancelled);
        }

        let topics = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(FeedError::Cancelled),
            result = self.subscriptions.subscribed_topics() => result.map_err(|err| {
                error!(error = %format!("{err:#}"), "subscription fetch failed");
                FeedError::SubscriptionFetch(format!("{err:#}"))
            })?,
        };
        let subscribed = subscribed_topic_names(&topics);
        debug!(?subscribed, "subscribed topic names");

        let catalog = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(FeedError::Cancelled),
            result = self.catalog.all_articles() => result.map_err(|err| {
                error!(error = %format!("{err:#}"), "article catalog fetch failed");
                FeedError::CatalogFetch(format!("{err:#}"))
            })?,
        };
        let catalog_len = catalog.len();

        let feed = filter_subscribed(catalog, &subscribed);
        info!(
            subscriptions = subscribed.len(),
            catalog = catalog_len,
            count = feed.len(),
            "feed resolved"
        );
        Ok(feed)
    }
}

#[cfg(test)]
#[path = "tests/feed_tests.rs"]
mod tests;
