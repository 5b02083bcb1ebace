use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use storage::Storage;
use tokio::sync::RwLock;
use tracing::info;

use crate::SessionAccessor;

/// Key the login flow writes the bearer token under.
pub const SESSION_TOKEN_KEY: &str = "token";

pub struct DurableSessionStore {
    store: Storage,
}

impl DurableSessionStore {
    pub async fn initialize(database_url: &str) -> Result<Arc<Self>> {
        let store = Storage::new(database_url)
            .await
            .with_context(|| format!("failed to initialize session storage at '{database_url}'"))?;
        Ok(Arc::new(Self { store }))
    }

    pub fn from_storage(store: Storage) -> Arc<Self> {
        Arc::new(Self { store })
    }

    pub async fn store_token(&self, token: &str) -> Result<()> {
        self.store.set_value(SESSION_TOKEN_KEY, token).await?;
        info!("session token stored");
        Ok(())
    }

    pub async fn clear_token(&self) -> Result<bool> {
        let removed = self.store.remove_value(SESSION_TOKEN_KEY).await?;
        if removed {
            info!("session token cleared");
        }
        Ok(removed)
    }
}

#[async_trait]
impl SessionAccessor for DurableSessionStore {
    async fn token(&self) -> Result<Option<String>> {
        self.store.get_value(SESSION_TOKEN_KEY).await
    }
}

/// Session holder for tests and hosts that do not persist credentials.
#[derive(Default)]
pub struct InMemorySessionStore {
    token: RwLock<Option<String>>,
}

impl InMemorySessionStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_token(token: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            token: RwLock::new(Some(token.into())),
        })
    }

    pub async fn set_token(&self, token: Option<String>) {
        *self.token.write().await = token;
    }
}

#[async_trait]
impl SessionAccessor for InMemorySessionStore {
    async fn token(&self) -> Result<Option<String>> {
        Ok(self.token.read().await.clone())
    }
}

#[cfg(test)]
#[path = "tests/session_store_tests.rs"]
mod tests;
