//! Cashiers and customer cards, the foreign-key targets of a receipt.
//!
//! Both are managed by other modules in production; only inserts are
//! provided here, for seed data and fixtures.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;

#[derive(Debug, Clone)]
pub struct DirectoryRepository {
    pool: SqlitePool,
}

impl DirectoryRepository {
    pub fn new(pool: SqlitePool) -> Self {
        DirectoryRepository { pool }
    }

    /// Registers a cashier.
    pub async fn insert_cashier(&self, employee_id: &str, full_name: &str) -> DbResult<()> {
        debug!(employee_id = %employee_id, "Inserting cashier");

        sqlx::query(
            "INSERT INTO employees (employee_id, full_name, created_at) VALUES (?1, ?2, ?3)",
        )
        .bind(employee_id)
        .bind(full_name)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Registers a customer card with its discount percent (0 to 100).
    pub async fn insert_card(&self, card_number: &str, holder_name: &str, percent: i64) -> DbResult<()> {
        debug!(card_number = %card_number, "Inserting customer card");

        sqlx::query(
            r#"
            INSERT INTO customer_cards (card_number, holder_name, percent, created_at)
            VALUES (?1, ?2, ?3, ?4)
            "#,
        )
        .bind(card_number)
        .bind(holder_name)
        .bind(percent)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::error::DbError;
    use crate::pool::{Database, DbConfig};

    #[tokio::test]
    async fn test_insert_directory_entries() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let directory = db.directory();

        directory.insert_cashier("EMP001", "Olena Koval").await.unwrap();
        directory.insert_card("1111222233334", "Taras Bondar", 5).await.unwrap();

        let dup = directory.insert_cashier("EMP001", "Someone Else").await.unwrap_err();
        assert!(matches!(dup, DbError::UniqueViolation { .. }));

        let bad_percent = directory.insert_card("9", "Nobody", 150).await.unwrap_err();
        assert!(matches!(bad_percent, DbError::CheckViolation { .. }));
    }
}
