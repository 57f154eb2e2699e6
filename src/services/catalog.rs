use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;

use crate::services::clock::Clock;
use crate::services::config_cache::ConfigCache;
use crate::services::store::{Filter, Order, Record, RecordStore, StoreError, Table};

/// Admin-managed site content kept as ordered lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    AstrologicalServices,
    PoojaServices,
    Reviews,
    Announcements,
}

impl Collection {
    pub fn table(&self) -> Table {
        match self {
            Collection::AstrologicalServices => Table::AstrologicalServices,
            Collection::PoojaServices => Table::PoojaServices,
            Collection::Reviews => Table::Reviews,
            Collection::Announcements => Table::Announcements,
        }
    }

    /// Service listings are hidden on delete rather than removed, so old
    /// bookings keep a readable service name.
    fn soft_delete(&self) -> bool {
        matches!(
            self,
            Collection::AstrologicalServices | Collection::PoojaServices
        )
    }

    fn requires_title(&self) -> bool {
        self.soft_delete()
    }

    /// The chatbot's services answer reads the astrological listings.
    fn feeds_chatbot(&self) -> bool {
        *self == Collection::AstrologicalServices
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Title is required")]
    MissingTitle,
    #[error("item not found")]
    NotFound,
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReorderItem {
    pub id: i64,
    pub display_order: i64,
}

fn not_found(e: StoreError) -> CatalogError {
    match e {
        StoreError::NotFound => CatalogError::NotFound,
        e => CatalogError::Store(e),
    }
}

pub struct CatalogService {
    store: Arc<dyn RecordStore>,
    clock: Arc<dyn Clock>,
    config: Arc<ConfigCache>,
}

impl CatalogService {
    pub fn new(store: Arc<dyn RecordStore>, clock: Arc<dyn Clock>, config: Arc<ConfigCache>) -> Self {
        Self {
            store,
            clock,
            config,
        }
    }

    /// Items by `display_order`, ties broken by id.
    pub async fn list(&self, collection: Collection, active_only: bool) -> Result<Vec<Record>, CatalogError> {
        let filters = if active_only {
            vec![Filter::eq("active", true)]
        } else {
            vec![]
        };
        Ok(self
            .store
            .select(collection.table(), &filters, Some(&Order::asc("display_order")))
            .await?)
    }

    pub async fn get(&self, collection: Collection, id: i64) -> Result<Record, CatalogError> {
        self.store.get(collection.table(), id).await.map_err(not_found)
    }

    pub async fn create(&self, collection: Collection, mut item: Record) -> Result<Record, CatalogError> {
        item.remove("id");
        if collection.requires_title() {
            let title = item
                .get("title")
                .and_then(Value::as_str)
                .map(str::trim)
                .unwrap_or("");
            if title.is_empty() {
                return Err(CatalogError::MissingTitle);
            }
        }

        if !matches!(item.get("active"), Some(Value::Bool(_))) {
            item.insert("active".to_string(), Value::from(true));
        }
        if !item.contains_key("display_order") {
            item.insert("display_order".to_string(), Value::from(0));
        }
        item.insert(
            "created_at".to_string(),
            Value::from(self.clock.now().to_rfc3339()),
        );

        let saved = self.store.insert(collection.table(), item).await?;
        tracing::info!(table = collection.table().as_str(), "content item created");
        self.changed(collection);
        Ok(saved)
    }

    pub async fn update(&self, collection: Collection, id: i64, mut fields: Record) -> Result<Record, CatalogError> {
        fields.remove("id");
        fields.remove("created_at");
        fields.insert(
            "updated_at".to_string(),
            Value::from(self.clock.now().to_rfc3339()),
        );

        let saved = self
            .store
            .update(collection.table(), id, fields)
            .await
            .map_err(not_found)?;
        self.changed(collection);
        Ok(saved)
    }

    pub async fn delete(&self, collection: Collection, id: i64) -> Result<(), CatalogError> {
        if collection.soft_delete() {
            let mut fields = Record::new();
            fields.insert("active".to_string(), Value::from(false));
            self.update(collection, id, fields).await?;
        } else {
            self.store
                .delete(collection.table(), id)
                .await
                .map_err(not_found)?;
            self.changed(collection);
        }
        tracing::info!(table = collection.table().as_str(), item_id = id, "content item deleted");
        Ok(())
    }

    /// Applies new display positions. Stops at the first missing id; earlier
    /// items keep their new position.
    pub async fn reorder(&self, collection: Collection, items: &[ReorderItem]) -> Result<usize, CatalogError> {
        let now = self.clock.now().to_rfc3339();
        for item in items {
            let mut fields = Record::new();
            fields.insert("display_order".to_string(), Value::from(item.display_order));
            fields.insert("updated_at".to_string(), Value::from(now.clone()));
            self.store
                .update(collection.table(), item.id, fields)
                .await
                .map_err(not_found)?;
        }
        self.changed(collection);
        Ok(items.len())
    }

    fn changed(&self, collection: Collection) {
        if collection.feeds_chatbot() {
            self.config.invalidate();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use crate::models::ConfigKey;
    use crate::services::clock::ManualClock;
    use chrono::{Duration, Utc};
    use serde_json::json;

    fn service() -> (CatalogService, Arc<ConfigCache>) {
        let store: Arc<dyn RecordStore> = Arc::new(db::open_store(":memory:").unwrap());
        let clock: Arc<dyn Clock> = Arc::new(ManualClock::new(Utc::now()));
        let cache = Arc::new(ConfigCache::new(store.clone(), clock.clone(), Duration::seconds(30)));
        (CatalogService::new(store, clock, cache.clone()), cache)
    }

    fn item(value: Value) -> Record {
        serde_json::from_value(value).unwrap()
    }

    #[tokio::test]
    async fn test_create_defaults_active_and_order() {
        let (catalog, _) = service();
        let saved = catalog
            .create(Collection::PoojaServices, item(json!({"title": "Navagraha Pooja"})))
            .await
            .unwrap();
        assert_eq!(saved["active"], true);
        assert_eq!(saved["display_order"], 0);
        assert!(saved["created_at"].is_string());
    }

    #[tokio::test]
    async fn test_service_listing_needs_title() {
        let (catalog, _) = service();
        let result = catalog
            .create(Collection::AstrologicalServices, item(json!({"title": "  "})))
            .await;
        assert!(matches!(result, Err(CatalogError::MissingTitle)));

        // reviews carry a name and text instead
        catalog
            .create(Collection::Reviews, item(json!({"name": "Meera", "review": "Spot on"})))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_service_delete_hides_listing() {
        let (catalog, _) = service();
        let saved = catalog
            .create(Collection::AstrologicalServices, item(json!({"title": "Tarot"})))
            .await
            .unwrap();
        let id = saved["id"].as_i64().unwrap();

        catalog.delete(Collection::AstrologicalServices, id).await.unwrap();

        assert!(catalog.list(Collection::AstrologicalServices, true).await.unwrap().is_empty());
        let hidden = catalog.get(Collection::AstrologicalServices, id).await.unwrap();
        assert_eq!(hidden["active"], false);
    }

    #[tokio::test]
    async fn test_review_delete_removes_row() {
        let (catalog, _) = service();
        let saved = catalog
            .create(Collection::Reviews, item(json!({"name": "Meera"})))
            .await
            .unwrap();
        let id = saved["id"].as_i64().unwrap();

        catalog.delete(Collection::Reviews, id).await.unwrap();
        assert!(matches!(
            catalog.get(Collection::Reviews, id).await,
            Err(CatalogError::NotFound)
        ));
        assert!(matches!(
            catalog.delete(Collection::Reviews, id).await,
            Err(CatalogError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_reorder() {
        let (catalog, _) = service();
        for title in ["Kundali", "Tarot", "Vastu"] {
            catalog
                .create(Collection::AstrologicalServices, item(json!({"title": title})))
                .await
                .unwrap();
        }

        let moved = catalog
            .reorder(
                Collection::AstrologicalServices,
                &[
                    ReorderItem { id: 3, display_order: 1 },
                    ReorderItem { id: 1, display_order: 2 },
                    ReorderItem { id: 2, display_order: 3 },
                ],
            )
            .await
            .unwrap();
        assert_eq!(moved, 3);

        let titles: Vec<_> = catalog
            .list(Collection::AstrologicalServices, true)
            .await
            .unwrap()
            .iter()
            .map(|r| r["title"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(titles, vec!["Vastu", "Kundali", "Tarot"]);

        let missing = catalog
            .reorder(Collection::AstrologicalServices, &[ReorderItem { id: 99, display_order: 1 }])
            .await;
        assert!(matches!(missing, Err(CatalogError::NotFound)));
    }

    #[tokio::test]
    async fn test_listing_changes_refresh_chatbot_services() {
        let (catalog, cache) = service();
        let before = cache.get().await;
        assert_eq!(
            before.get(ConfigKey::Services),
            ConfigKey::Services.default_value()
        );

        catalog
            .create(Collection::AstrologicalServices, item(json!({"title": "Nadi Astrology"})))
            .await
            .unwrap();

        let after = cache.get().await;
        assert_eq!(after.services(), vec!["Nadi Astrology"]);
    }
}
