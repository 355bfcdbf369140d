//! Bearer credential sources.
//!
//! The service asks its `TokenProvider` for a token on every operation, so a
//! provider that refreshes is observed without rebuilding the service.
//! `CachedToken` gives the acquire-once behaviour a browser session expects.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::OnceCell;

use crate::error::ApiError;

#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn token(&self) -> Result<String, ApiError>;
}

#[async_trait]
impl<P: TokenProvider + ?Sized> TokenProvider for Arc<P> {
    async fn token(&self) -> Result<String, ApiError> {
        (**self).token().await
    }
}

/// A fixed credential.
#[derive(Debug, Clone)]
pub struct StaticToken(String);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

#[async_trait]
impl TokenProvider for StaticToken {
    async fn token(&self) -> Result<String, ApiError> {
        Ok(self.0.clone())
    }
}

/// Acquires a token from `source` once and reuses it. A failed acquisition
/// is not remembered; the next call tries again.
#[derive(Debug)]
pub struct CachedToken<P> {
    source: P,
    cell: OnceCell<String>,
}

impl<P: TokenProvider> CachedToken<P> {
    pub fn new(source: P) -> Self {
        Self {
            source,
            cell: OnceCell::new(),
        }
    }
}

#[async_trait]
impl<P: TokenProvider> TokenProvider for CachedToken<P> {
    async fn token(&self) -> Result<String, ApiError> {
        self.cell
            .get_or_try_init(|| self.source.token())
            .await
            .cloned()
    }
}
