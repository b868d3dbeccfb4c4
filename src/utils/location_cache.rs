use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache;

use crate::error::AppResult;
use crate::model::work_location::{LocationType, WorkLocation};
use crate::store::WorkLocationDirectory;

/// Work locations rarely change but every punch reads them, so lookups by
/// type are cached for a configurable TTL.
pub struct CachedLocationDirectory {
    inner: Arc<dyn WorkLocationDirectory>,
    cache: Cache<LocationType, Arc<Vec<WorkLocation>>>,
}

impl CachedLocationDirectory {
    pub fn new(inner: Arc<dyn WorkLocationDirectory>, ttl: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(16) // one entry per location type
            .time_to_live(ttl)
            .build();

        Self { inner, cache }
    }

    /// Load every location type into the cache.
    pub async fn warmup(&self) -> AppResult<()> {
        let mut total = 0usize;
        for location_type in [LocationType::Office, LocationType::Client] {
            total += self.find_by_type(location_type).await?.len();
        }

        tracing::info!("Location cache warmup complete: {} locations", total);
        Ok(())
    }
}

#[async_trait]
impl WorkLocationDirectory for CachedLocationDirectory {
    async fn find_by_type(&self, location_type: LocationType) -> AppResult<Vec<WorkLocation>> {
        if let Some(cached) = self.cache.get(&location_type).await {
            return Ok(cached.as_ref().clone());
        }

        let locations = self.inner.find_by_type(location_type).await?;
        self.cache
            .insert(location_type, Arc::new(locations.clone()))
            .await;
        Ok(locations)
    }
}
