use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use std::sync::Arc;
use uuid::Uuid;

use crate::database::models::Image;
use crate::error::{ServiceError, ServiceResult};
use crate::services::clock::Clock;
use crate::utils::datetime::to_millis;

/// Body of a successful `POST /upload`.
#[derive(Debug, Serialize, Deserialize)]
pub struct UploadResponse {
    #[serde(rename = "storageId")]
    pub storage_id: String,
}

/// Binary storage for plant photos.
///
/// Blobs live in the `images` table. Other processes reach them over HTTP
/// through [`ImageStore::router`]; the derived URL for an image is
/// `{public_base_url}/images/{id}`.
#[derive(Clone)]
pub struct ImageStore {
    pool: SqlitePool,
    public_base_url: String,
    max_bytes: usize,
    clock: Arc<dyn Clock>,
}

impl ImageStore {
    pub fn new(pool: SqlitePool, public_base_url: &str, max_bytes: usize, clock: Arc<dyn Clock>) -> Self {
        Self {
            pool,
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
            max_bytes,
            clock,
        }
    }

    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    /// Stores a blob and returns its storage id.
    ///
    /// When `content_type` is `None` it is sniffed from the leading bytes.
    pub async fn store(&self, data: Vec<u8>, content_type: Option<&str>) -> ServiceResult<String> {
        if data.is_empty() {
            return Err(ServiceError::Storage("Empty image".to_string()));
        }
        if data.len() > self.max_bytes {
            return Err(ServiceError::Storage(format!(
                "Image too large: {} bytes (max {})",
                data.len(),
                self.max_bytes
            )));
        }

        let content_type = content_type
            .map(str::to_string)
            .unwrap_or_else(|| sniff_content_type(&data).to_string());

        let image = Image {
            id: Uuid::new_v4().to_string(),
            content_type,
            data,
            created_at: to_millis(self.clock.now()),
        };

        Image::insert(&self.pool, &image).await?;
        tracing::debug!("Stored image {} ({} bytes)", image.id, image.data.len());

        Ok(image.id)
    }

    pub async fn fetch(&self, image_id: &str) -> ServiceResult<Option<Image>> {
        Ok(Image::find_by_id(&self.pool, image_id).await?)
    }

    pub async fn delete(&self, image_id: &str) -> ServiceResult<bool> {
        Ok(Image::delete(&self.pool, image_id).await?)
    }

    /// Public URL of a stored image, or `None` if the id is unknown.
    pub async fn url(&self, image_id: &str) -> ServiceResult<Option<String>> {
        if Image::exists(&self.pool, image_id).await? {
            Ok(Some(self.url_for(image_id)))
        } else {
            Ok(None)
        }
    }

    pub fn url_for(&self, image_id: &str) -> String {
        format!("{}/images/{}", self.public_base_url, image_id)
    }

    /// `POST /upload` and `GET /images/:id`.
    pub fn router(&self) -> Router {
        let max_bytes = self.max_bytes;
        Router::new()
            .route("/upload", post(upload_image))
            .route("/images/:id", get(download_image))
            .layer(DefaultBodyLimit::max(max_bytes))
            .with_state(self.clone())
    }
}

/// Best-effort detection of common photo formats.
pub fn sniff_content_type(data: &[u8]) -> &'static str {
    if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
        "image/jpeg"
    } else if data.starts_with(&[0x89, b'P', b'N', b'G']) {
        "image/png"
    } else if data.starts_with(b"GIF8") {
        "image/gif"
    } else if data.len() >= 12 && &data[0..4] == b"RIFF" && &data[8..12] == b"WEBP" {
        "image/webp"
    } else {
        "application/octet-stream"
    }
}

async fn upload_image(
    State(store): State<ImageStore>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<UploadResponse>, (StatusCode, String)> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .filter(|value| value.starts_with("image/"));

    match store.store(body.to_vec(), content_type).await {
        Ok(storage_id) => Ok(Json(UploadResponse { storage_id })),
        Err(ServiceError::Storage(message)) => Err((StatusCode::BAD_REQUEST, message)),
        Err(e) => {
            tracing::error!("Failed to store uploaded image: {}", e);
            Err((StatusCode::INTERNAL_SERVER_ERROR, "Failed to store image".to_string()))
        }
    }
}

async fn download_image(State(store): State<ImageStore>, Path(id): Path<String>) -> Response {
    match store.fetch(&id).await {
        Ok(Some(image)) => ([(header::CONTENT_TYPE, image.content_type)], image.data).into_response(),
        Ok(None) => StatusCode::NOT_FOUND.into_response(),
        Err(e) => {
            tracing::error!("Failed to load image {}: {}", id, e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
