use super::*;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Memoizes successful discovery results per query.
///
/// Failures are not cached so a flaky query can succeed on a later attempt.
pub struct CachedCatalog<C> {
    inner: C,
    cache: RwLock<HashMap<MovieQuery, Vec<CatalogMovie>>>,
}

impl<C: CatalogFetcher> CachedCatalog<C> {
    pub fn new(inner: C) -> Self {
        Self {
            inner,
            cache: RwLock::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl<C: CatalogFetcher> CatalogFetcher for CachedCatalog<C> {
    async fn discover(&self, query: &MovieQuery) -> CatalogResult<Vec<CatalogMovie>> {
        if let Some(hit) = self.cache.read().await.get(query) {
            return Ok(hit.clone());
        }

        let results = self.inner.discover(query).await?;
        self.cache.write().await.insert(*query, results.clone());
        Ok(results)
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}
