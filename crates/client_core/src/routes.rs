use std::fmt;

use shared::domain::ArticleId;

/// Client views reachable from the feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Login,
    Register,
    Articles,
    ArticleCreate,
    ArticleDetails(ArticleId),
    Me,
}

impl Route {
    pub fn path(&self) -> String {
        match self {
            Self::Login => "/login".to_string(),
            Self::Register => "/register".to_string(),
            Self::Articles => "/articles".to_string(),
            Self::ArticleCreate => "/articles/create".to_string(),
            Self::ArticleDetails(id) => format!("/articles/{id}"),
            Self::Me => "/me".to_string(),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}
