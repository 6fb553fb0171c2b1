use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Sqlite};
use uuid::Uuid;

/// Grants a user visibility of a plant and routes its reminders to `chat_id`.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct PlantUser {
    pub id: String,
    pub plant_id: String,
    pub user_id: i64,
    pub chat_id: i64,
    pub created_at: i64,
}

impl PlantUser {
    /// Inserts the relationship unless the (plant, user) pair already exists.
    ///
    /// Returns true when a row was written. The uniqueness check and the
    /// write are a single statement, so concurrent joins cannot duplicate it.
    pub async fn insert_if_absent<'e, E>(
        executor: E,
        plant_id: &str,
        user_id: i64,
        chat_id: i64,
        created_at: i64,
    ) -> Result<bool, sqlx::Error>
    where
        E: sqlx::Executor<'e, Database = Sqlite>,
    {
        let id = Uuid::new_v4().to_string();

        let result = sqlx::query(
            r#"
            INSERT INTO plant_users (id, plant_id, user_id, chat_id, created_at)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(plant_id, user_id) DO NOTHING
            "#,
        )
        .bind(&id)
        .bind(plant_id)
        .bind(user_id)
        .bind(chat_id)
        .bind(created_at)
        .execute(executor)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    pub async fn find_by_user<'e, E>(executor: E, user_id: i64) -> Result<Vec<Self>, sqlx::Error>
    where
        E: sqlx::Executor<'e, Database = Sqlite>,
    {
        sqlx::query_as::<_, PlantUser>(
            "SELECT id, plant_id, user_id, chat_id, created_at FROM plant_users WHERE user_id = ? ORDER BY created_at, rowid"
        )
        .bind(user_id)
        .fetch_all(executor)
        .await
    }

    pub async fn find_by_plant<'e, E>(executor: E, plant_id: &str) -> Result<Vec<Self>, sqlx::Error>
    where
        E: sqlx::Executor<'e, Database = Sqlite>,
    {
        sqlx::query_as::<_, PlantUser>(
            "SELECT id, plant_id, user_id, chat_id, created_at FROM plant_users WHERE plant_id = ? ORDER BY created_at, rowid"
        )
        .bind(plant_id)
        .fetch_all(executor)
        .await
    }

    pub async fn exists<'e, E>(executor: E, plant_id: &str, user_id: i64) -> Result<bool, sqlx::Error>
    where
        E: sqlx::Executor<'e, Database = Sqlite>,
    {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM plant_users WHERE plant_id = ? AND user_id = ?"
        )
        .bind(plant_id)
        .bind(user_id)
        .fetch_one(executor)
        .await?;

        Ok(count > 0)
    }

    pub async fn count_for_plant<'e, E>(executor: E, plant_id: &str) -> Result<i64, sqlx::Error>
    where
        E: sqlx::Executor<'e, Database = Sqlite>,
    {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM plant_users WHERE plant_id = ?")
            .bind(plant_id)
            .fetch_one(executor)
            .await
    }

    /// Returns true if the user had a relationship with the plant.
    pub async fn delete_for_user<'e, E>(executor: E, plant_id: &str, user_id: i64) -> Result<bool, sqlx::Error>
    where
        E: sqlx::Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query("DELETE FROM plant_users WHERE plant_id = ? AND user_id = ?")
            .bind(plant_id)
            .bind(user_id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
