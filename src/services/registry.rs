use chrono::{DateTime, Utc};
use std::sync::Arc;
use uuid::Uuid;

use crate::database::connection::DatabaseManager;
use crate::database::models::{Image, Plant, PlantUser};
use crate::error::{ServiceError, ServiceResult};
use crate::services::clock::Clock;
use crate::services::images::ImageStore;
use crate::services::watering::WateringSchedule;
use crate::utils::datetime::to_millis;
use crate::utils::validation::MAX_INTERVAL_DAYS;

/// Input for [`PlantRegistry::add`].
#[derive(Debug, Clone)]
pub struct NewPlant {
    pub chat_id: i64,
    pub user_id: i64,
    pub name: String,
    pub interval_days: i64,
    pub image_id: Option<String>,
}

/// What [`PlantRegistry::remove`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemoveOutcome {
    /// The user had a relationship with the plant and it was deleted.
    pub relationship_removed: bool,
    /// No users were left, so the plant and its image were deleted.
    pub plant_deleted: bool,
}

/// Plants and their per-user visibility.
#[derive(Clone)]
pub struct PlantRegistry {
    db: DatabaseManager,
    images: ImageStore,
    schedule: WateringSchedule,
    clock: Arc<dyn Clock>,
}

impl PlantRegistry {
    pub fn new(
        db: DatabaseManager,
        images: ImageStore,
        schedule: WateringSchedule,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self { db, images, schedule, clock }
    }

    pub fn schedule(&self) -> WateringSchedule {
        self.schedule
    }

    pub fn images(&self) -> &ImageStore {
        &self.images
    }

    /// Creates a plant watered "now" and links it to the adding user.
    pub async fn add(&self, new_plant: NewPlant) -> ServiceResult<Plant> {
        if new_plant.interval_days <= 0 {
            return Err(ServiceError::Validation(
                "Interval must be a positive number".to_string(),
            ));
        }
        if new_plant.interval_days > MAX_INTERVAL_DAYS {
            return Err(ServiceError::Validation(format!(
                "Interval cannot be longer than {} days",
                MAX_INTERVAL_DAYS
            )));
        }
        let name = new_plant.name.trim();
        if name.is_empty() {
            return Err(ServiceError::Validation("Plant name cannot be empty".to_string()));
        }

        let now = self.clock.now();
        let next_watering = self.next_watering(now, new_plant.interval_days)?;
        let plant = Plant {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            interval_days: new_plant.interval_days,
            last_watered: to_millis(now),
            next_watering: to_millis(next_watering),
            image_id: new_plant.image_id,
            created_at: to_millis(now),
        };

        let mut tx = self.db.pool.begin().await?;
        Plant::insert(&mut *tx, &plant).await?;
        PlantUser::insert_if_absent(&mut *tx, &plant.id, new_plant.user_id, new_plant.chat_id, to_millis(now)).await?;
        tx.commit().await?;

        tracing::debug!(
            "Added plant {} ('{}') for user {} in chat {}",
            plant.id, plant.name, new_plant.user_id, new_plant.chat_id
        );

        Ok(plant)
    }

    pub async fn list(&self, user_id: i64) -> ServiceResult<Vec<Plant>> {
        Ok(Plant::find_by_user(&self.db.pool, user_id).await?)
    }

    pub async fn get_by_id(&self, plant_id: &str) -> ServiceResult<Option<Plant>> {
        Ok(Plant::find_by_id(&self.db.pool, plant_id).await?)
    }

    pub async fn has_access(&self, plant_id: &str, user_id: i64) -> ServiceResult<bool> {
        Ok(PlantUser::exists(&self.db.pool, plant_id, user_id).await?)
    }

    /// Everyone who should hear about this plant.
    pub async fn users(&self, plant_id: &str) -> ServiceResult<Vec<PlantUser>> {
        Ok(PlantUser::find_by_plant(&self.db.pool, plant_id).await?)
    }

    pub async fn image_url(&self, image_id: &str) -> ServiceResult<Option<String>> {
        self.images.url(image_id).await
    }

    /// Restarts the schedule from now. Returns the updated plant, or `None`
    /// if it was deleted in the meantime.
    pub async fn mark_watered(&self, plant_id: &str) -> ServiceResult<Option<Plant>> {
        let Some(mut plant) = Plant::find_by_id(&self.db.pool, plant_id).await? else {
            return Ok(None);
        };

        let now = self.clock.now();
        plant.last_watered = to_millis(now);
        plant.next_watering = to_millis(self.next_watering(now, plant.interval_days)?);

        let updated = Plant::update_schedule(
            &self.db.pool,
            plant_id,
            plant.last_watered,
            plant.next_watering,
        )
        .await?;

        Ok(updated.then_some(plant))
    }

    /// Drops the user's relationship; deletes the plant and its image once
    /// nobody else has it.
    pub async fn remove(&self, plant_id: &str, user_id: i64) -> ServiceResult<RemoveOutcome> {
        let mut tx = self.db.pool.begin().await?;

        let relationship_removed = PlantUser::delete_for_user(&mut *tx, plant_id, user_id).await?;
        let remaining = PlantUser::count_for_plant(&mut *tx, plant_id).await?;

        let mut plant_deleted = false;
        if remaining == 0 {
            if let Some(plant) = Plant::find_by_id(&mut *tx, plant_id).await? {
                if let Some(image_id) = &plant.image_id {
                    Image::delete(&mut *tx, image_id).await?;
                }
                plant_deleted = Plant::delete(&mut *tx, plant_id).await?;
            }
        }

        tx.commit().await?;

        Ok(RemoveOutcome {
            relationship_removed,
            plant_deleted,
        })
    }

    /// Removes every relationship of the user and returns how many there were.
    pub async fn clear_all(&self, user_id: i64) -> ServiceResult<u64> {
        let mut tx = self.db.pool.begin().await?;

        let relationships = PlantUser::find_by_user(&mut *tx, user_id).await?;
        let mut removed = 0u64;

        for relationship in relationships {
            if PlantUser::delete_for_user(&mut *tx, &relationship.plant_id, user_id).await? {
                removed += 1;
            }

            if PlantUser::count_for_plant(&mut *tx, &relationship.plant_id).await? > 0 {
                continue;
            }

            if let Some(plant) = Plant::find_by_id(&mut *tx, &relationship.plant_id).await? {
                if let Some(image_id) = &plant.image_id {
                    Image::delete(&mut *tx, image_id).await?;
                }
                Plant::delete(&mut *tx, &plant.id).await?;
            }
        }

        tx.commit().await?;

        Ok(removed)
    }

    fn next_watering(&self, now: DateTime<Utc>, interval_days: i64) -> ServiceResult<DateTime<Utc>> {
        self.schedule.next_watering(now, interval_days).ok_or_else(|| {
            ServiceError::Validation(format!("Interval of {} days is out of range", interval_days))
        })
    }

    /// Deletes the plant's photo. Only users with access may do this.
    pub async fn remove_image(&self, plant_id: &str, user_id: i64) -> ServiceResult<bool> {
        let plant = Plant::find_by_id(&self.db.pool, plant_id)
            .await?
            .ok_or(ServiceError::PlantNotFound)?;

        if !PlantUser::exists(&self.db.pool, plant_id, user_id).await? {
            return Err(ServiceError::NoAccess);
        }

        let Some(image_id) = plant.image_id else {
            return Ok(false);
        };

        let mut tx = self.db.pool.begin().await?;
        Plant::clear_image(&mut *tx, plant_id).await?;
        Image::delete(&mut *tx, &image_id).await?;
        tx.commit().await?;

        Ok(true)
    }
}
