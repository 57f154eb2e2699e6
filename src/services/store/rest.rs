use async_trait::async_trait;
use serde_json::Value;

use super::{record_id, Filter, Order, Record, RecordStore, StoreError, Table};

/// Hosted Postgres exposed through a PostgREST endpoint (`/rest/v1/<table>`).
pub struct RestStore {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl RestStore {
    pub fn new(base_url: String, api_key: String) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            client: reqwest::Client::new(),
        }
    }

    fn url(&self, table: Table) -> String {
        format!("{}/rest/v1/{}", self.base_url, table.as_str())
    }

    fn request(&self, method: reqwest::Method, table: Table) -> reqwest::RequestBuilder {
        self.client
            .request(method, self.url(table))
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }

    async fn rows(&self, builder: reqwest::RequestBuilder) -> Result<Vec<Record>, StoreError> {
        let response = builder
            .send()
            .await
            .map_err(|e| StoreError::Backend(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Backend(format!("{status}: {body}")));
        }

        response
            .json::<Vec<Record>>()
            .await
            .map_err(|e| StoreError::Backend(format!("invalid response body: {e}")))
    }
}

fn filter_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn id_filter(id: i64) -> [(String, String); 1] {
    [("id".to_string(), format!("eq.{id}"))]
}

#[async_trait]
impl RecordStore for RestStore {
    async fn insert(&self, table: Table, record: Record) -> Result<Record, StoreError> {
        let builder = self
            .request(reqwest::Method::POST, table)
            .header("Prefer", "return=representation")
            .json(&record);
        self.rows(builder)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::Backend("insert returned no rows".to_string()))
    }

    async fn select(
        &self,
        table: Table,
        filters: &[Filter],
        order: Option<&Order>,
    ) -> Result<Vec<Record>, StoreError> {
        let mut query: Vec<(String, String)> = vec![("select".to_string(), "*".to_string())];
        for filter in filters {
            query.push((filter.field.clone(), format!("eq.{}", filter_value(&filter.value))));
        }
        if let Some(order) = order {
            let direction = if order.ascending { "asc" } else { "desc" };
            query.push(("order".to_string(), format!("{}.{direction}", order.field)));
        }

        self.rows(self.request(reqwest::Method::GET, table).query(&query))
            .await
    }

    async fn update(&self, table: Table, id: i64, mut fields: Record) -> Result<Record, StoreError> {
        fields.remove("id");
        let builder = self
            .request(reqwest::Method::PATCH, table)
            .query(&id_filter(id))
            .header("Prefer", "return=representation")
            .json(&fields);
        self.rows(builder)
            .await?
            .into_iter()
            .next()
            .ok_or(StoreError::NotFound)
    }

    async fn update_if(
        &self,
        table: Table,
        id: i64,
        expected: &[Filter],
        mut fields: Record,
    ) -> Result<Record, StoreError> {
        fields.remove("id");
        let mut query = id_filter(id).to_vec();
        for filter in expected {
            query.push((filter.field.clone(), format!("eq.{}", filter_value(&filter.value))));
        }
        let builder = self
            .request(reqwest::Method::PATCH, table)
            .query(&query)
            .header("Prefer", "return=representation")
            .json(&fields);

        match self.rows(builder).await?.into_iter().next() {
            Some(row) => Ok(row),
            // nothing matched: either the row is gone or it no longer fits
            None => match self.get(table, id).await {
                Ok(_) => Err(StoreError::Conflict),
                Err(e) => Err(e),
            },
        }
    }

    async fn delete(&self, table: Table, id: i64) -> Result<(), StoreError> {
        let builder = self
            .request(reqwest::Method::DELETE, table)
            .query(&id_filter(id))
            .header("Prefer", "return=representation");
        if self.rows(builder).await?.is_empty() {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn upsert(&self, table: Table, record: Record) -> Result<Record, StoreError> {
        if record_id(&record).is_none() {
            return Err(StoreError::Backend("upsert requires an id".to_string()));
        }
        let builder = self
            .request(reqwest::Method::POST, table)
            .header("Prefer", "return=representation,resolution=merge-duplicates")
            .json(&[&record]);
        self.rows(builder)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::Backend("upsert returned no rows".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_strips_trailing_slash() {
        let store = RestStore::new("https://db.example.co/".to_string(), "key".to_string());
        assert_eq!(store.url(Table::BusinessInfo), "https://db.example.co/rest/v1/business_info");
    }

    #[test]
    fn test_filter_values() {
        assert_eq!(filter_value(&Value::from("pending")), "pending");
        assert_eq!(filter_value(&Value::from(1)), "1");
        assert_eq!(filter_value(&Value::from(false)), "false");
    }
}
