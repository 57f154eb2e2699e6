use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use rusqlite::types::Value as SqlValue;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension};
use serde_json::Value;

use super::{record_id, Filter, Order, Record, RecordStore, StoreError, Table};

/// Embedded store: one SQLite table per record kind, each row holding its
/// fields as a JSON document next to the integer id.
#[derive(Clone)]
pub struct SqliteStore {
    db: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    pub fn new(db: Arc<Mutex<Connection>>) -> Self {
        Self { db }
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.db
            .lock()
            .map_err(|_| StoreError::Backend("database lock poisoned".to_string()))
    }
}

fn backend(e: impl std::fmt::Display) -> StoreError {
    StoreError::Backend(e.to_string())
}

fn json_path(field: &str) -> String {
    format!("$.{field}")
}

fn to_sql(value: &Value) -> SqlValue {
    match value {
        Value::Null => SqlValue::Null,
        Value::Bool(b) => SqlValue::Integer(i64::from(*b)),
        Value::Number(n) => match n.as_i64() {
            Some(i) => SqlValue::Integer(i),
            None => SqlValue::Real(n.as_f64().unwrap_or_default()),
        },
        Value::String(s) => SqlValue::Text(s.clone()),
        other => SqlValue::Text(other.to_string()),
    }
}

/// SQL conditions for `filters`, pushing their bound values onto `args`.
fn conditions(filters: &[Filter], args: &mut Vec<SqlValue>) -> Vec<&'static str> {
    filters
        .iter()
        .map(|filter| {
            if filter.field == "id" {
                args.push(to_sql(&filter.value));
                "id = ?"
            } else {
                args.push(SqlValue::Text(json_path(&filter.field)));
                args.push(to_sql(&filter.value));
                "json_extract(data, ?) = ?"
            }
        })
        .collect()
}

fn row_to_record(id: i64, data: &str) -> Result<Record, StoreError> {
    let mut record: Record = serde_json::from_str(data).map_err(backend)?;
    record.insert("id".to_string(), Value::from(id));
    Ok(record)
}

fn load(conn: &Connection, table: Table, id: i64) -> Result<Option<Record>, StoreError> {
    let data: Option<String> = conn
        .query_row(
            &format!("SELECT data FROM {} WHERE id = ?1", table.as_str()),
            [id],
            |row| row.get(0),
        )
        .optional()
        .map_err(backend)?;

    data.map(|d| row_to_record(id, &d)).transpose()
}

fn write(conn: &Connection, table: Table, id: i64, mut record: Record) -> Result<Record, StoreError> {
    record.remove("id");
    let data = serde_json::to_string(&record).map_err(backend)?;
    conn.execute(
        &format!("UPDATE {} SET data = ?1 WHERE id = ?2", table.as_str()),
        params![data, id],
    )
    .map_err(backend)?;
    record.insert("id".to_string(), Value::from(id));
    Ok(record)
}

fn insert_row(conn: &Connection, table: Table, mut record: Record) -> Result<Record, StoreError> {
    let explicit_id = record_id(&record);
    record.remove("id");
    let data = serde_json::to_string(&record).map_err(backend)?;

    let id = match explicit_id {
        Some(id) => {
            conn.execute(
                &format!("INSERT INTO {} (id, data) VALUES (?1, ?2)", table.as_str()),
                params![id, data],
            )
            .map_err(backend)?;
            id
        }
        None => {
            conn.execute(
                &format!("INSERT INTO {} (data) VALUES (?1)", table.as_str()),
                params![data],
            )
            .map_err(backend)?;
            conn.last_insert_rowid()
        }
    };

    record.insert("id".to_string(), Value::from(id));
    Ok(record)
}

fn merge(mut base: Record, fields: Record) -> Record {
    for (key, value) in fields {
        if key != "id" {
            base.insert(key, value);
        }
    }
    base
}

#[async_trait]
impl RecordStore for SqliteStore {
    async fn insert(&self, table: Table, record: Record) -> Result<Record, StoreError> {
        let conn = self.conn()?;
        insert_row(&conn, table, record)
    }

    async fn select(
        &self,
        table: Table,
        filters: &[Filter],
        order: Option<&Order>,
    ) -> Result<Vec<Record>, StoreError> {
        let mut sql = format!("SELECT id, data FROM {}", table.as_str());
        let mut args: Vec<SqlValue> = Vec::new();

        let conds = conditions(filters, &mut args);
        if !conds.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&conds.join(" AND "));
        }

        let direction = match order {
            Some(o) if o.ascending => "ASC",
            Some(_) => "DESC",
            None => "ASC",
        };
        match order {
            Some(o) if o.field != "id" => {
                sql.push_str(&format!(" ORDER BY json_extract(data, ?) {direction}, id {direction}"));
                args.push(SqlValue::Text(json_path(&o.field)));
            }
            _ => sql.push_str(&format!(" ORDER BY id {direction}")),
        }

        let conn = self.conn()?;
        let mut stmt = conn.prepare(&sql).map_err(backend)?;
        let rows = stmt
            .query_map(params_from_iter(args), |row| {
                Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?))
            })
            .map_err(backend)?;

        let mut records = Vec::new();
        for row in rows {
            let (id, data) = row.map_err(backend)?;
            records.push(row_to_record(id, &data)?);
        }
        Ok(records)
    }

    async fn update(&self, table: Table, id: i64, fields: Record) -> Result<Record, StoreError> {
        let conn = self.conn()?;
        let existing = load(&conn, table, id)?.ok_or(StoreError::NotFound)?;
        write(&conn, table, id, merge(existing, fields))
    }

    async fn update_if(
        &self,
        table: Table,
        id: i64,
        expected: &[Filter],
        fields: Record,
    ) -> Result<Record, StoreError> {
        let conn = self.conn()?;
        let existing = load(&conn, table, id)?.ok_or(StoreError::NotFound)?;
        let mut record = merge(existing, fields);
        record.remove("id");
        let data = serde_json::to_string(&record).map_err(backend)?;

        let mut sql = format!("UPDATE {} SET data = ? WHERE id = ?", table.as_str());
        let mut args = vec![SqlValue::Text(data), SqlValue::Integer(id)];
        for cond in conditions(expected, &mut args) {
            sql.push_str(" AND ");
            sql.push_str(cond);
        }

        let changed = conn
            .execute(&sql, params_from_iter(args))
            .map_err(backend)?;
        if changed == 0 {
            return Err(StoreError::Conflict);
        }

        record.insert("id".to_string(), Value::from(id));
        Ok(record)
    }

    async fn delete(&self, table: Table, id: i64) -> Result<(), StoreError> {
        let conn = self.conn()?;
        let deleted = conn
            .execute(&format!("DELETE FROM {} WHERE id = ?1", table.as_str()), [id])
            .map_err(backend)?;
        if deleted == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn upsert(&self, table: Table, record: Record) -> Result<Record, StoreError> {
        let id = record_id(&record)
            .ok_or_else(|| StoreError::Backend("upsert requires an id".to_string()))?;

        let conn = self.conn()?;
        match load(&conn, table, id)? {
            Some(existing) => write(&conn, table, id, merge(existing, record)),
            None => insert_row(&conn, table, record),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use serde_json::json;

    fn store() -> SqliteStore {
        db::open_store(":memory:").unwrap()
    }

    fn record(value: Value) -> Record {
        serde_json::from_value(value).unwrap()
    }

    #[tokio::test]
    async fn test_insert_assigns_ids() {
        let store = store();
        let a = store.insert(Table::Bookings, record(json!({"name": "Asha"}))).await.unwrap();
        let b = store.insert(Table::Bookings, record(json!({"name": "Ravi"}))).await.unwrap();
        assert_eq!(a["id"], 1);
        assert_eq!(b["id"], 2);
    }

    #[tokio::test]
    async fn test_select_filters_and_orders() {
        let store = store();
        for (name, status) in [("Asha", "pending"), ("Ravi", "confirmed"), ("Meera", "pending")] {
            store
                .insert(Table::Bookings, record(json!({"name": name, "status": status})))
                .await
                .unwrap();
        }

        let pending = store
            .select(Table::Bookings, &[Filter::eq("status", "pending")], Some(&Order::desc("id")))
            .await
            .unwrap();
        let names: Vec<_> = pending.iter().map(|r| r["name"].as_str().unwrap()).collect();
        assert_eq!(names, vec!["Meera", "Asha"]);
    }

    #[tokio::test]
    async fn test_filter_on_bool_field() {
        let store = store();
        store
            .insert(Table::ContactMessages, record(json!({"name": "A", "is_read": false})))
            .await
            .unwrap();
        store
            .insert(Table::ContactMessages, record(json!({"name": "B", "is_read": true})))
            .await
            .unwrap();

        let unread = store
            .select(Table::ContactMessages, &[Filter::eq("is_read", false)], None)
            .await
            .unwrap();
        assert_eq!(unread.len(), 1);
        assert_eq!(unread[0]["name"], "A");
    }

    #[tokio::test]
    async fn test_update_merges_and_reports_missing() {
        let store = store();
        store
            .insert(Table::Bookings, record(json!({"name": "Asha", "status": "pending"})))
            .await
            .unwrap();

        let updated = store
            .update(Table::Bookings, 1, record(json!({"status": "confirmed"})))
            .await
            .unwrap();
        assert_eq!(updated["name"], "Asha");
        assert_eq!(updated["status"], "confirmed");

        let missing = store.update(Table::Bookings, 99, Record::new()).await;
        assert_eq!(missing, Err(StoreError::NotFound));
    }

    #[tokio::test]
    async fn test_update_if_checks_expected_fields() {
        let store = store();
        store
            .insert(Table::Bookings, record(json!({"name": "Asha", "status": "pending"})))
            .await
            .unwrap();

        let confirmed = store
            .update_if(
                Table::Bookings,
                1,
                &[Filter::eq("status", "pending")],
                record(json!({"status": "confirmed"})),
            )
            .await
            .unwrap();
        assert_eq!(confirmed["status"], "confirmed");

        let stale = store
            .update_if(
                Table::Bookings,
                1,
                &[Filter::eq("status", "pending")],
                record(json!({"status": "cancelled"})),
            )
            .await;
        assert_eq!(stale, Err(StoreError::Conflict));

        let row = store.get(Table::Bookings, 1).await.unwrap();
        assert_eq!(row["status"], "confirmed");

        let missing = store
            .update_if(Table::Bookings, 9, &[], Record::new())
            .await;
        assert_eq!(missing, Err(StoreError::NotFound));
    }

    #[tokio::test]
    async fn test_ascending_order_breaks_ties_by_id() {
        let store = store();
        for (title, order) in [("Tarot", 2), ("Kundali", 1), ("Vastu", 1)] {
            store
                .insert(
                    Table::AstrologicalServices,
                    record(json!({"title": title, "display_order": order})),
                )
                .await
                .unwrap();
        }

        let rows = store
            .select(Table::AstrologicalServices, &[], Some(&Order::asc("display_order")))
            .await
            .unwrap();
        let titles: Vec<_> = rows.iter().map(|r| r["title"].as_str().unwrap()).collect();
        assert_eq!(titles, vec!["Kundali", "Vastu", "Tarot"]);
    }

    #[tokio::test]
    async fn test_delete() {
        let store = store();
        store.insert(Table::Bookings, record(json!({"name": "Asha"}))).await.unwrap();
        store.delete(Table::Bookings, 1).await.unwrap();
        assert_eq!(store.delete(Table::Bookings, 1).await, Err(StoreError::NotFound));
        assert_eq!(store.get(Table::Bookings, 1).await, Err(StoreError::NotFound));
    }

    #[tokio::test]
    async fn test_upsert_singleton() {
        let store = store();
        store
            .upsert(Table::BusinessInfo, record(json!({"id": 1, "address": "MG Road"})))
            .await
            .unwrap();
        store
            .upsert(Table::BusinessInfo, record(json!({"id": 1, "email": "a@b.in"})))
            .await
            .unwrap();

        let rows = store.select(Table::BusinessInfo, &[], None).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["address"], "MG Road");
        assert_eq!(rows[0]["email"], "a@b.in");
    }

    #[tokio::test]
    async fn test_upsert_requires_id() {
        let store = store();
        let result = store.upsert(Table::ChatbotConfig, Record::new()).await;
        assert!(matches!(result, Err(StoreError::Backend(_))));
    }
}
