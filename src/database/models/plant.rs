use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Sqlite};

use crate::utils::datetime::from_millis;

/// A tracked houseplant. Timestamps are epoch milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Plant {
    pub id: String,
    pub name: String,
    pub interval_days: i64,
    pub last_watered: i64,
    pub next_watering: i64,
    pub image_id: Option<String>,
    pub created_at: i64,
}

impl Plant {
    pub fn last_watered_at(&self) -> DateTime<Utc> {
        from_millis(self.last_watered)
    }

    pub fn next_watering_at(&self) -> DateTime<Utc> {
        from_millis(self.next_watering)
    }

    pub async fn insert<'e, E>(executor: E, plant: &Plant) -> Result<(), sqlx::Error>
    where
        E: sqlx::Executor<'e, Database = Sqlite>,
    {
        sqlx::query(
            r#"
            INSERT INTO plants (id, name, interval_days, last_watered, next_watering, image_id, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&plant.id)
        .bind(&plant.name)
        .bind(plant.interval_days)
        .bind(plant.last_watered)
        .bind(plant.next_watering)
        .bind(&plant.image_id)
        .bind(plant.created_at)
        .execute(executor)
        .await?;

        Ok(())
    }

    pub async fn find_by_id<'e, E>(executor: E, plant_id: &str) -> Result<Option<Self>, sqlx::Error>
    where
        E: sqlx::Executor<'e, Database = Sqlite>,
    {
        sqlx::query_as::<_, Plant>(
            "SELECT id, name, interval_days, last_watered, next_watering, image_id, created_at FROM plants WHERE id = ?"
        )
        .bind(plant_id)
        .fetch_optional(executor)
        .await
    }

    /// Plants visible to a user, in the order the user gained access to them.
    pub async fn find_by_user<'e, E>(executor: E, user_id: i64) -> Result<Vec<Self>, sqlx::Error>
    where
        E: sqlx::Executor<'e, Database = Sqlite>,
    {
        sqlx::query_as::<_, Plant>(
            r#"
            SELECT p.id, p.name, p.interval_days, p.last_watered, p.next_watering, p.image_id, p.created_at
            FROM plant_users pu
            JOIN plants p ON p.id = pu.plant_id
            WHERE pu.user_id = ?
            ORDER BY pu.created_at, pu.rowid
            "#,
        )
        .bind(user_id)
        .fetch_all(executor)
        .await
    }

    /// Plants whose next watering is at or before `now_ms`.
    pub async fn find_due<'e, E>(executor: E, now_ms: i64) -> Result<Vec<Self>, sqlx::Error>
    where
        E: sqlx::Executor<'e, Database = Sqlite>,
    {
        sqlx::query_as::<_, Plant>(
            r#"
            SELECT id, name, interval_days, last_watered, next_watering, image_id, created_at
            FROM plants
            WHERE next_watering <= ?
            ORDER BY next_watering
            "#,
        )
        .bind(now_ms)
        .fetch_all(executor)
        .await
    }

    /// Returns false if the plant no longer exists.
    pub async fn update_schedule<'e, E>(
        executor: E,
        plant_id: &str,
        last_watered: i64,
        next_watering: i64,
    ) -> Result<bool, sqlx::Error>
    where
        E: sqlx::Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query(
            "UPDATE plants SET last_watered = ?, next_watering = ? WHERE id = ?"
        )
        .bind(last_watered)
        .bind(next_watering)
        .bind(plant_id)
        .execute(executor)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn clear_image<'e, E>(executor: E, plant_id: &str) -> Result<bool, sqlx::Error>
    where
        E: sqlx::Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query("UPDATE plants SET image_id = NULL WHERE id = ?")
            .bind(plant_id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn delete<'e, E>(executor: E, plant_id: &str) -> Result<bool, sqlx::Error>
    where
        E: sqlx::Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query("DELETE FROM plants WHERE id = ?")
            .bind(plant_id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
