use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Duration, Utc};

use crate::models::BusinessConfig;
use crate::services::clock::Clock;
use crate::services::store::{Filter, Order, Record, RecordStore, StoreError, Table};

pub const DEFAULT_TTL_SECS: i64 = 30;

/// Row id of the singleton settings records.
pub const SINGLETON_ID: i64 = 1;

#[derive(Clone)]
struct CachedConfig {
    snapshot: Arc<BusinessConfig>,
    fetched_at: DateTime<Utc>,
}

/// Short-lived snapshot of the merged business settings.
///
/// Readers never see a half-built snapshot: a refill builds the whole
/// `BusinessConfig` off-lock and publishes it in one write. Concurrent misses
/// may each fetch; the last one to publish wins.
pub struct ConfigCache {
    store: Arc<dyn RecordStore>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
    cached: RwLock<Option<CachedConfig>>,
    generation: AtomicU64,
}

impl ConfigCache {
    pub fn new(store: Arc<dyn RecordStore>, clock: Arc<dyn Clock>, ttl: Duration) -> Self {
        Self {
            store,
            clock,
            ttl,
            cached: RwLock::new(None),
            generation: AtomicU64::new(0),
        }
    }

    pub async fn get(&self) -> Arc<BusinessConfig> {
        let now = self.clock.now();
        let previous = self.current();
        if let Some(cached) = &previous {
            if now - cached.fetched_at <= self.ttl {
                return Arc::clone(&cached.snapshot);
            }
        }

        let generation = self.generation.load(Ordering::SeqCst);
        match self.fetch().await {
            Ok(config) => {
                let snapshot = Arc::new(config);
                self.publish(generation, Arc::clone(&snapshot), now);
                snapshot
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to load business config, using fallback");
                previous
                    .map(|cached| cached.snapshot)
                    .unwrap_or_else(|| Arc::new(BusinessConfig::default()))
            }
        }
    }

    /// Drops the snapshot. Fetches already in flight will not publish.
    pub fn invalidate(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut cached) = self.cached.write() {
            *cached = None;
        }
    }

    fn current(&self) -> Option<CachedConfig> {
        self.cached.read().ok().and_then(|cached| cached.clone())
    }

    fn publish(&self, generation: u64, snapshot: Arc<BusinessConfig>, fetched_at: DateTime<Utc>) {
        let Ok(mut cached) = self.cached.write() else {
            return;
        };
        // checked under the write lock so it cannot interleave with invalidate()
        if self.generation.load(Ordering::SeqCst) == generation {
            *cached = Some(CachedConfig {
                snapshot,
                fetched_at,
            });
        }
    }

    async fn fetch(&self) -> Result<BusinessConfig, StoreError> {
        let business_info = self.singleton(Table::BusinessInfo).await?;
        let chatbot_config = self.singleton(Table::ChatbotConfig).await?;
        let catalog = self.catalog_titles().await?;
        Ok(BusinessConfig::merge_with_catalog(
            &business_info,
            &chatbot_config,
            &catalog,
        ))
    }

    async fn catalog_titles(&self) -> Result<Vec<String>, StoreError> {
        let rows = self
            .store
            .select(
                Table::AstrologicalServices,
                &[Filter::eq("active", true)],
                Some(&Order::asc("display_order")),
            )
            .await?;
        Ok(rows
            .iter()
            .filter_map(|row| row.get("title")?.as_str())
            .map(str::trim)
            .filter(|title| !title.is_empty())
            .map(str::to_string)
            .collect())
    }

    async fn singleton(&self, table: Table) -> Result<Record, StoreError> {
        match self.store.get(table, SINGLETON_ID).await {
            Ok(record) => Ok(record),
            Err(StoreError::NotFound) => Ok(Record::new()),
            Err(e) => Err(e),
        }
    }
}
