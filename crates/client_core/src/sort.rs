use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use shared::domain::Article;
use tracing::debug;

use crate::Feed;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Ascending,
    Descending,
}

/// Creation-date ordering for a feed. `ascending` starts out true and names
/// the direction the next toggle applies; every toggle sorts in that
/// direction and then flips it.
#[derive(Debug, Clone)]
pub struct SortController {
    ascending: bool,
}

impl Default for SortController {
    fn default() -> Self {
        Self { ascending: true }
    }
}

impl SortController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_order(&self) -> SortOrder {
        if self.ascending {
            SortOrder::Ascending
        } else {
            SortOrder::Descending
        }
    }

    /// Reorders `feed` in place and returns the direction applied.
    pub fn toggle(&mut self, feed: &mut Feed) -> SortOrder {
        let order = self.next_order();
        sort_by_created(feed.articles_mut(), order);
        self.ascending = !self.ascending;
        debug!(?order, count = feed.len(), "feed sorted by creation date");
        order
    }
}

/// Stable sort on creation instant. Articles without a timestamp go last in
/// both directions.
pub fn sort_by_created(articles: &mut [Article], order: SortOrder) {
    articles.sort_by(|a, b| compare_created(a, b, order));
}

fn compare_created(a: &Article, b: &Article, order: SortOrder) -> Ordering {
    match (a.created_at, b.created_at) {
        (Some(left), Some(right)) => match order {
            SortOrder::Ascending => left.cmp(&right),
            SortOrder::Descending => right.cmp(&left),
        },
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[cfg(test)]
#[path = "tests/sort_tests.rs"]
mod tests;
