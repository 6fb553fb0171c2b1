use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio_cron_scheduler::{Job, JobScheduler};

use crate::database::connection::DatabaseManager;
use crate::database::models::{Plant, PlantUser};
use crate::error::ServiceResult;
use crate::services::clock::Clock;
use crate::services::images::ImageStore;
use crate::services::notifier::Notifier;
use crate::services::registry::PlantRegistry;
use crate::utils::datetime::to_millis;
use crate::utils::logging::{log_database_error, log_delivery_failure};

pub const DEFAULT_CHECK_INTERVAL_SECS: u64 = 30;

/// Text of the reminder sent for a plant.
pub fn reminder_text(plant_name: &str) -> String {
    format!("🌱 Time to water \"{}\"!", plant_name)
}

/// Counters for one pass over the due plants.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReminderReport {
    pub plants: usize,
    pub delivered: usize,
    pub failed: usize,
}

/// One reminder pass: find due plants, notify their chats, advance schedules.
pub struct ReminderChecker {
    db: DatabaseManager,
    registry: PlantRegistry,
    images: ImageStore,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
}

impl ReminderChecker {
    pub fn new(
        db: DatabaseManager,
        registry: PlantRegistry,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let images = registry.images().clone();
        Self {
            db,
            registry,
            images,
            notifier,
            clock,
        }
    }

    /// Runs a single pass.
    ///
    /// Delivery failures are logged per chat and never stop the batch. Each
    /// due plant is marked watered after its notifications were attempted,
    /// whether or not any of them arrived. A plant whose recipients could not
    /// be loaded counts as one failure and stays due.
    pub async fn run_once(&self) -> ServiceResult<ReminderReport> {
        let now = self.clock.now();
        let due = Plant::find_due(&self.db.pool, to_millis(now)).await?;
        let mut report = ReminderReport::default();

        if due.is_empty() {
            return Ok(report);
        }

        tracing::info!("Found {} plant(s) to water", due.len());

        for plant in due {
            report.plants += 1;
            let Some((delivered, failed)) = self.notify_plant(&plant).await else {
                // Nothing was attempted, leave it due for the next pass
                report.failed += 1;
                continue;
            };
            report.delivered += delivered;
            report.failed += failed;

            match self.registry.mark_watered(&plant.id).await {
                Ok(Some(updated)) => tracing::debug!(
                    "Plant {} next watering at {}",
                    updated.id,
                    updated.next_watering_at()
                ),
                Ok(None) => tracing::debug!("Plant {} was deleted before it could be marked watered", plant.id),
                Err(e) => log_database_error(&format!("mark plant {} watered", plant.id), &e.to_string()),
            }
        }

        Ok(report)
    }

    /// Delivered and failed counts, or `None` if the recipients could not be loaded.
    async fn notify_plant(&self, plant: &Plant) -> Option<(usize, usize)> {
        let recipients = match PlantUser::find_by_plant(&self.db.pool, &plant.id).await {
            Ok(recipients) => recipients,
            Err(e) => {
                log_database_error(&format!("load users of plant {}", plant.id), &e.to_string());
                return None;
            }
        };

        let photo = match &plant.image_id {
            Some(image_id) => match self.images.fetch(image_id).await {
                Ok(image) => image.map(|image| image.data),
                Err(e) => {
                    tracing::warn!("Failed to load image {} for plant {}: {}", image_id, plant.id, e);
                    None
                }
            },
            None => None,
        };

        let text = reminder_text(&plant.name);
        let mut seen_chats = HashSet::new();
        let mut delivered = 0;
        let mut failed = 0;

        for recipient in recipients {
            // Several users can share one group chat
            if !seen_chats.insert(recipient.chat_id) {
                continue;
            }

            if self.deliver(plant, recipient.chat_id, photo.as_deref(), &text).await {
                delivered += 1;
            } else {
                failed += 1;
            }
        }

        Some((delivered, failed))
    }

    async fn deliver(&self, plant: &Plant, chat_id: i64, photo: Option<&[u8]>, text: &str) -> bool {
        if let Some(photo) = photo {
            match self.notifier.send_photo(chat_id, photo, text).await {
                Ok(()) => return true,
                Err(e) => {
                    tracing::warn!("Failed to send photo for plant {} to chat {}: {}", plant.id, chat_id, e);
                }
            }
        }

        match self.notifier.send_text(chat_id, text).await {
            Ok(()) => true,
            Err(e) => {
                log_delivery_failure(&plant.id, chat_id, &e.to_string());
                false
            }
        }
    }
}

/// Owns the periodic job that drives [`ReminderChecker`].
pub struct ReminderService {
    checker: Arc<ReminderChecker>,
    scheduler: JobScheduler,
    interval: Duration,
    running: Arc<Mutex<()>>,
}

impl ReminderService {
    pub async fn new(
        checker: ReminderChecker,
        interval: Duration,
    ) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let scheduler = JobScheduler::new().await?;

        Ok(Self {
            checker: Arc::new(checker),
            scheduler,
            interval,
            running: Arc::new(Mutex::new(())),
        })
    }

    pub async fn start(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let checker = self.checker.clone();
        let running = self.running.clone();

        let reminder_job = Job::new_repeated_async(self.interval, move |_uuid, _l| {
            let checker = checker.clone();
            let running = running.clone();
            Box::pin(async move {
                // Skip the tick if the previous pass is still sending
                let Ok(_guard) = running.try_lock() else {
                    tracing::debug!("Previous reminder check still running, skipping tick");
                    return;
                };

                match checker.run_once().await {
                    Ok(report) if report.plants > 0 => tracing::info!(
                        "Reminder check done: {} plant(s), {} delivered, {} failed",
                        report.plants,
                        report.delivered,
                        report.failed
                    ),
                    Ok(_) => {}
                    Err(e) => log_database_error("check plants to water", &e.to_string()),
                }
            })
        })?;

        self.scheduler.add(reminder_job).await?;
        self.scheduler.start().await?;

        tracing::info!(
            "Reminder service started - checking every {}s",
            self.interval.as_secs()
        );
        Ok(())
    }

    pub async fn stop(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.scheduler.shutdown().await?;
        Ok(())
    }

    /// Runs a pass immediately, outside the schedule.
    pub async fn check_now(&self) -> ServiceResult<ReminderReport> {
        let _guard = self.running.lock().await;
        self.checker.run_once().await
    }
}
