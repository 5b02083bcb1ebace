use anyhow::Result;
use async_trait::async_trait;
use shared::{domain::Article, protocol::TopicSummary};

pub mod api;
pub mod cancel;
pub mod error;
pub mod feed;
pub mod gate;
pub mod routes;
mod session_store;
pub mod sort;
pub mod view;

pub use api::HttpApi;
pub use cancel::CancelToken;
pub use error::FeedError;
pub use feed::{Feed, FeedResolver};
pub use gate::{GateOutcome, NavigationGate};
pub use routes::Route;
pub use session_store::{DurableSessionStore, InMemorySessionStore, SESSION_TOKEN_KEY};
pub use sort::{SortController, SortOrder};
pub use view::{FeedSnapshot, FeedStatus, FeedView};

/// Read-only view of the persisted session token.
#[async_trait]
pub trait SessionAccessor: Send + Sync {
    async fn token(&self) -> Result<Option<String>>;
}

/// Topics the authenticated user is subscribed to.
#[async_trait]
pub trait SubscriptionSource: Send + Sync {
    async fn subscribed_topics(&self) -> Result<Vec<TopicSummary>>;
}

/// Every article known to the server, already normalized at ingest.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    async fn all_articles(&self) -> Result<Vec<Article>>;
}

pub trait Navigator: Send + Sync {
    fn navigate(&self, route: Route);
}

/// Blocking, user-facing notices.
pub trait Notifier: Send + Sync {
    fn notify(&self, message: &str);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedEvent {
    RedirectedToLogin { notice: String },
    FeedLoaded { count: usize },
    FeedUnavailable { reason: String },
    SortChanged { order: SortOrder },
}

#[cfg(test)]
#[path = "tests/support.rs"]
pub(crate) mod test_support;
