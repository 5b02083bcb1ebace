use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FeedError {
    #[error("no session token; sign in to see your feed")]
    Unauthenticated,
    #[error("failed to fetch subscriptions: {0}")]
    SubscriptionFetch(String),
    #[error("failed to fetch articles: {0}")]
    CatalogFetch(String),
    #[error("feed resolution cancelled")]
    Cancelled,
}
