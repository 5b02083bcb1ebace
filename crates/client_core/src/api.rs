use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use shared::{
    domain::Article,
    error::ApiError,
    protocol::{ArticlePayload, LoginRequest, LoginResponse, TopicSummary},
};
use tracing::{debug, info};
use url::Url;

use crate::{CatalogSource, SessionAccessor, SubscriptionSource};

const SUBSCRIPTIONS_PATH: &str = "/users/me/subscriptions";
const ARTICLES_PATH: &str = "/articles";
const LOGIN_PATH: &str = "/auth/login";

/// HTTP access to the article API. Every authenticated call reads the
/// session token at request time and sends it as a bearer credential.
pub struct HttpApi {
    http: Client,
    base_url: String,
    session: Arc<dyn SessionAccessor>,
}

impl HttpApi {
    pub fn new(base_url: &str, session: Arc<dyn SessionAccessor>) -> Result<Self> {
        let parsed =
            Url::parse(base_url).with_context(|| format!("invalid API base url '{base_url}'"))?;
        Ok(Self {
            http: Client::new(),
            base_url: parsed.as_str().trim_end_matches('/').to_string(),
            session,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn bearer_token(&self) -> Result<String> {
        self.session
            .token()
            .await?
            .filter(|token| !token.is_empty())
            .ok_or_else(|| anyhow!("missing session token"))
    }

    async fn get_authorized<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let token = self.bearer_token().await?;
        let url = self.endpoint(path);
        debug!(%url, "GET");
        let response = self.http.get(&url).bearer_auth(token).send().await?;
        let response = ensure_success(response).await?;
        response
            .json()
            .await
            .with_context(|| format!("malformed response body from {url}"))
    }

    /// Exchanges credentials for a session token. The caller persists it.
    pub async fn login(&self, email: &str, password: &str) -> Result<String> {
        let response = self
            .http
            .post(self.endpoint(LOGIN_PATH))
            .json(&LoginRequest {
                email: email.to_string(),
                password: password.to_string(),
            })
            .send()
            .await?;
        let body: LoginResponse = ensure_success(response).await?.json().await?;
        if body.token.is_empty() {
            return Err(anyhow!("server returned an empty session token"));
        }
        info!(email, "login succeeded");
        Ok(body.token)
    }
}

async fn ensure_success(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ApiError::from_response(status.as_u16(), body).into())
}

#[async_trait]
impl SubscriptionSource for HttpApi {
    async fn subscribed_topics(&self) -> Result<Vec<TopicSummary>> {
        self.get_authorized(SUBSCRIPTIONS_PATH).await
    }
}

#[async_trait]
impl CatalogSource for HttpApi {
    async fn all_articles(&self) -> Result<Vec<Article>> {
        let payloads: Vec<ArticlePayload> = self.get_authorized(ARTICLES_PATH).await?;
        Ok(payloads.into_iter().map(Article::from).collect())
    }
}

#[cfg(test)]
#[path = "tests/api_tests.rs"]
mod tests;
