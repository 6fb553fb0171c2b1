use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Sqlite, SqlitePool};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct InviteCode {
    pub id: String,
    pub code: String,
    pub created_by: i64,
    pub expires_at: i64,
    pub created_at: i64,
}

impl InviteCode {
    pub fn is_expired(&self, now_ms: i64) -> bool {
        self.expires_at < now_ms
    }

    /// Stores a code covering `plant_ids` unless `code` is already taken.
    ///
    /// Returns `None` on a collision so the caller can draw another code.
    pub async fn try_create(
        pool: &SqlitePool,
        code: &str,
        plant_ids: &[String],
        created_by: i64,
        expires_at: i64,
        created_at: i64,
    ) -> Result<Option<Self>, sqlx::Error> {
        let id = Uuid::new_v4().to_string();
        let mut tx = pool.begin().await?;

        let inserted = sqlx::query(
            r#"
            INSERT INTO invite_codes (id, code, created_by, expires_at, created_at)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(code) DO NOTHING
            "#,
        )
        .bind(&id)
        .bind(code)
        .bind(created_by)
        .bind(expires_at)
        .bind(created_at)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if inserted == 0 {
            tx.rollback().await?;
            return Ok(None);
        }

        for (position, plant_id) in plant_ids.iter().enumerate() {
            sqlx::query(
                "INSERT OR IGNORE INTO invite_code_plants (invite_code_id, plant_id, position) VALUES (?, ?, ?)"
            )
            .bind(&id)
            .bind(plant_id)
            .bind(position as i64)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(Some(InviteCode {
            id,
            code: code.to_string(),
            created_by,
            expires_at,
            created_at,
        }))
    }

    pub async fn find_by_code<'e, E>(executor: E, code: &str) -> Result<Option<Self>, sqlx::Error>
    where
        E: sqlx::Executor<'e, Database = Sqlite>,
    {
        sqlx::query_as::<_, InviteCode>(
            "SELECT id, code, created_by, expires_at, created_at FROM invite_codes WHERE code = ?"
        )
        .bind(code)
        .fetch_optional(executor)
        .await
    }

    /// Plant ids covered by the code, in the order they were shared.
    pub async fn plant_ids<'e, E>(executor: E, invite_code_id: &str) -> Result<Vec<String>, sqlx::Error>
    where
        E: sqlx::Executor<'e, Database = Sqlite>,
    {
        sqlx::query_scalar::<_, String>(
            "SELECT plant_id FROM invite_code_plants WHERE invite_code_id = ? ORDER BY position"
        )
        .bind(invite_code_id)
        .fetch_all(executor)
        .await
    }

    pub async fn delete(pool: &SqlitePool, invite_code_id: &str) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query("DELETE FROM invite_code_plants WHERE invite_code_id = ?")
            .bind(invite_code_id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM invite_codes WHERE id = ?")
            .bind(invite_code_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(result.rows_affected() > 0)
    }
}
