//! Durable replica of the in-memory order store.
//!
//! The mirror is write-through and best-effort: the in-process store answers
//! all reads, and a failed or slow mirror write is logged and dropped rather
//! than failing the user-facing operation.

use {async_trait::async_trait, sqlx::SqlitePool, tracing::debug};

use crate::order::Order;

/// Durable sink for order saves and deletions.
#[async_trait]
pub trait OrderMirror: Send + Sync {
    async fn upsert(&self, order: &Order) -> anyhow::Result<()>;
    async fn delete(&self, order_id: &str) -> anyhow::Result<()>;
}

/// Replica backed by the gateway's SQLite database.
pub struct SqliteOrderMirror {
    pool: SqlitePool,
}

impl SqliteOrderMirror {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

/// Apply the schema migrations bundled with this crate.
pub async fn run_migrations(pool: &SqlitePool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    debug!("order mirror migrations applied");
    Ok(())
}

#[async_trait]
impl OrderMirror for SqliteOrderMirror {
    async fn upsert(&self, order: &Order) -> anyhow::Result<()> {
        let requester = order.requester.clone().unwrap_or_default();
        sqlx::query(
            r#"
            INSERT INTO orders
                (id, chat_id, status, service, subtype, description,
                 username, first_name, last_name, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            ON CONFLICT(id) DO UPDATE SET
                chat_id     = excluded.chat_id,
                status      = excluded.status,
                service     = excluded.service,
                subtype     = excluded.subtype,
                description = excluded.description,
                username    = excluded.username,
                first_name  = excluded.first_name,
                last_name   = excluded.last_name,
                created_at  = excluded.created_at,
                updated_at  = excluded.updated_at
            "#,
        )
        .bind(&order.id)
        .bind(order.chat_id)
        .bind(order.status.as_str())
        .bind(&order.service)
        .bind(&order.subtype)
        .bind(&order.description)
        .bind(&requester.username)
        .bind(&requester.first_name)
        .bind(&requester.last_name)
        .bind(order.created_at)
        .bind(order.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete(&self, order_id: &str) -> anyhow::Result<()> {
        sqlx::query("DELETE FROM orders WHERE id = ?1")
            .bind(order_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
