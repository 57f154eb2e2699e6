pub mod rest;
pub mod sqlite;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

/// A row as the store sees it: a JSON object with an integer `id`.
pub type Record = serde_json::Map<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Table {
    Bookings,
    ContactMessages,
    BusinessInfo,
    ChatbotConfig,
    AstrologicalServices,
    PoojaServices,
    Reviews,
    Announcements,
    AdminCredentials,
}

impl Table {
    pub fn as_str(&self) -> &'static str {
        match self {
            Table::Bookings => "bookings",
            Table::ContactMessages => "contact_messages",
            Table::BusinessInfo => "business_info",
            Table::ChatbotConfig => "chatbot_config",
            Table::AstrologicalServices => "astrological_services",
            Table::PoojaServices => "pooja_services",
            Table::Reviews => "custom_reviews",
            Table::Announcements => "announcement_bar",
            Table::AdminCredentials => "admin_credentials",
        }
    }
}

/// Equality filter on one field.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub field: String,
    pub value: Value,
}

impl Filter {
    pub fn eq(field: &str, value: impl Into<Value>) -> Self {
        Self {
            field: field.to_string(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub field: String,
    pub ascending: bool,
}

impl Order {
    pub fn asc(field: &str) -> Self {
        Self {
            field: field.to_string(),
            ascending: true,
        }
    }

    pub fn desc(field: &str) -> Self {
        Self {
            field: field.to_string(),
            ascending: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,
    #[error("record changed concurrently")]
    Conflict,
    #[error("store backend error: {0}")]
    Backend(String),
}

#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Inserts a record and returns it with its assigned `id`.
    async fn insert(&self, table: Table, record: Record) -> Result<Record, StoreError>;

    async fn select(
        &self,
        table: Table,
        filters: &[Filter],
        order: Option<&Order>,
    ) -> Result<Vec<Record>, StoreError>;

    /// Merges `fields` into the record with `id`. `NotFound` if there is none.
    async fn update(&self, table: Table, id: i64, fields: Record) -> Result<Record, StoreError>;

    /// Compare-and-set form of `update`: the merge only happens if the stored
    /// record still matches every `expected` filter, checked in the same
    /// write. `Conflict` if the record exists but no longer matches.
    async fn update_if(
        &self,
        table: Table,
        id: i64,
        expected: &[Filter],
        fields: Record,
    ) -> Result<Record, StoreError>;

    async fn delete(&self, table: Table, id: i64) -> Result<(), StoreError>;

    /// Inserts or merges by the record's `id`, which must be present.
    async fn upsert(&self, table: Table, record: Record) -> Result<Record, StoreError>;

    async fn get(&self, table: Table, id: i64) -> Result<Record, StoreError> {
        self.select(table, &[Filter::eq("id", id)], None)
            .await?
            .into_iter()
            .next()
            .ok_or(StoreError::NotFound)
    }
}

pub fn to_record<T: Serialize>(value: &T) -> Result<Record, StoreError> {
    match serde_json::to_value(value) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(StoreError::Backend("record is not a JSON object".to_string())),
        Err(e) => Err(StoreError::Backend(e.to_string())),
    }
}

pub fn from_record<T: DeserializeOwned>(record: Record) -> Result<T, StoreError> {
    serde_json::from_value(Value::Object(record)).map_err(|e| StoreError::Backend(e.to_string()))
}

pub(crate) fn record_id(record: &Record) -> Option<i64> {
    match record.get("id")? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}
