use sqlx::{FromRow, Sqlite};

/// A stored binary blob, referenced from plants by `id`.
#[derive(Debug, Clone, FromRow)]
pub struct Image {
    pub id: String,
    pub content_type: String,
    pub data: Vec<u8>,
    pub created_at: i64,
}

impl Image {
    pub async fn insert<'e, E>(executor: E, image: &Image) -> Result<(), sqlx::Error>
    where
        E: sqlx::Executor<'e, Database = Sqlite>,
    {
        sqlx::query(
            "INSERT INTO images (id, content_type, data, created_at) VALUES (?, ?, ?, ?)"
        )
        .bind(&image.id)
        .bind(&image.content_type)
        .bind(&image.data)
        .bind(image.created_at)
        .execute(executor)
        .await?;

        Ok(())
    }

    pub async fn find_by_id<'e, E>(executor: E, image_id: &str) -> Result<Option<Self>, sqlx::Error>
    where
        E: sqlx::Executor<'e, Database = Sqlite>,
    {
        sqlx::query_as::<_, Image>(
            "SELECT id, content_type, data, created_at FROM images WHERE id = ?"
        )
        .bind(image_id)
        .fetch_optional(executor)
        .await
    }

    pub async fn exists<'e, E>(executor: E, image_id: &str) -> Result<bool, sqlx::Error>
    where
        E: sqlx::Executor<'e, Database = Sqlite>,
    {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM images WHERE id = ?")
            .bind(image_id)
            .fetch_one(executor)
            .await?;

        Ok(count > 0)
    }

    pub async fn delete<'e, E>(executor: E, image_id: &str) -> Result<bool, sqlx::Error>
    where
        E: sqlx::Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query("DELETE FROM images WHERE id = ?")
            .bind(image_id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
