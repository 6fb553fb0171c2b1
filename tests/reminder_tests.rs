#![allow(clippy::unwrap_used)]

use async_trait::async_trait;
use chrono::{Duration, TimeZone, Utc};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use tempfile::{tempdir, TempDir};
use watering_reminder_bot::database::connection::DatabaseManager;
use watering_reminder_bot::database::models::{Plant, PlantUser};
use watering_reminder_bot::services::clock::{Clock, ManualClock};
use watering_reminder_bot::services::images::ImageStore;
use watering_reminder_bot::services::notifier::Notifier;
use watering_reminder_bot::services::registry::{NewPlant, PlantRegistry};
use watering_reminder_bot::services::reminder::{reminder_text, ReminderChecker, ReminderReport, ReminderService};
use watering_reminder_bot::services::watering::WateringSchedule;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Sent {
    Text { chat_id: i64, text: String },
    Photo { chat_id: i64, bytes: usize, caption: String },
}

/// Records deliveries and fails for selected chats.
#[derive(Default)]
struct RecordingNotifier {
    sent: Mutex<Vec<Sent>>,
    failing_chats: HashSet<i64>,
    photos_fail: bool,
}

impl RecordingNotifier {
    fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send_text(&self, chat_id: i64, text: &str) -> anyhow::Result<()> {
        if self.failing_chats.contains(&chat_id) {
            anyhow::bail!("Forbidden: bot was blocked by the user");
        }
        self.sent.lock().unwrap().push(Sent::Text {
            chat_id,
            text: text.to_string(),
        });
        Ok(())
    }

    async fn send_photo(&self, chat_id: i64, photo: &[u8], caption: &str) -> anyhow::Result<()> {
        if self.photos_fail || self.failing_chats.contains(&chat_id) {
            anyhow::bail!("Bad Request: failed to send photo");
        }
        self.sent.lock().unwrap().push(Sent::Photo {
            chat_id,
            bytes: photo.len(),
            caption: caption.to_string(),
        });
        Ok(())
    }
}

struct TestEnv {
    db: DatabaseManager,
    clock: Arc<ManualClock>,
    registry: PlantRegistry,
    _dir: TempDir,
}

async fn setup() -> TestEnv {
    let dir = tempdir().unwrap();
    let db_path = dir.path().join("test.db");
    let db = DatabaseManager::new(&format!("sqlite:{}", db_path.display())).await.unwrap();
    db.run_migrations().await.unwrap();

    let clock = Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2024, 6, 3, 8, 0, 0).unwrap()));
    let images = ImageStore::new(db.pool.clone(), "http://localhost:3000", 1024 * 1024, clock.clone());
    let registry = PlantRegistry::new(db.clone(), images, WateringSchedule::default(), clock.clone());

    TestEnv { db, clock, registry, _dir: dir }
}

fn checker(env: &TestEnv, notifier: Arc<RecordingNotifier>) -> ReminderChecker {
    ReminderChecker::new(env.db.clone(), env.registry.clone(), notifier, env.clock.clone())
}

async fn add_plant(env: &TestEnv, user_id: i64, chat_id: i64, name: &str, image_id: Option<String>) -> Plant {
    env.registry
        .add(NewPlant {
            chat_id,
            user_id,
            name: name.to_string(),
            interval_days: 2,
            image_id,
        })
        .await
        .unwrap()
}

#[tokio::test]
async fn test_nothing_sent_before_due() {
    let env = setup().await;
    let notifier = Arc::new(RecordingNotifier::default());
    let plant = add_plant(&env, 1, 100, "Ficus", None).await;

    env.clock.set(plant.next_watering_at() - Duration::seconds(1));
    let report = checker(&env, notifier.clone()).run_once().await.unwrap();

    assert_eq!(report, ReminderReport::default());
    assert!(notifier.sent().is_empty());
}

#[tokio::test]
async fn test_due_plant_is_reminded_and_rescheduled() {
    let env = setup().await;
    let notifier = Arc::new(RecordingNotifier::default());
    let plant = add_plant(&env, 1, 100, "Ficus", None).await;

    env.clock.set(plant.next_watering_at());
    let report = checker(&env, notifier.clone()).run_once().await.unwrap();

    assert_eq!(report.plants, 1);
    assert_eq!(report.delivered, 1);
    assert_eq!(
        notifier.sent(),
        vec![Sent::Text {
            chat_id: 100,
            text: "🌱 Time to water \"Ficus\"!".to_string()
        }]
    );

    let stored = Plant::find_by_id(&env.db.pool, &plant.id).await.unwrap().unwrap();
    assert_eq!(stored.last_watered_at(), env.clock.now());
    assert_eq!(stored.next_watering_at(), plant.next_watering_at() + Duration::days(2));

    // A second pass at the same instant finds nothing
    let report = checker(&env, notifier.clone()).run_once().await.unwrap();
    assert_eq!(report.plants, 0);
    assert_eq!(notifier.sent().len(), 1);
}

#[tokio::test]
async fn test_one_message_per_chat() {
    let env = setup().await;
    let notifier = Arc::new(RecordingNotifier::default());
    let plant = add_plant(&env, 1, 100, "Ficus", None).await;

    // Two users in the same group chat, and one in a private chat
    PlantUser::insert_if_absent(&env.db.pool, &plant.id, 2, 100, 0).await.unwrap();
    PlantUser::insert_if_absent(&env.db.pool, &plant.id, 3, 300, 0).await.unwrap();

    env.clock.set(plant.next_watering_at());
    let report = checker(&env, notifier.clone()).run_once().await.unwrap();

    assert_eq!(report.delivered, 2);
    let chats: Vec<i64> = notifier
        .sent()
        .into_iter()
        .map(|sent| match sent {
            Sent::Text { chat_id, .. } | Sent::Photo { chat_id, .. } => chat_id,
        })
        .collect();
    assert_eq!(chats.len(), 2);
    assert!(chats.contains(&100));
    assert!(chats.contains(&300));
}

#[tokio::test]
async fn test_failed_delivery_still_advances() {
    let env = setup().await;
    let notifier = Arc::new(RecordingNotifier {
        failing_chats: HashSet::from([100]),
        ..Default::default()
    });
    let plant = add_plant(&env, 1, 100, "Ficus", None).await;
    PlantUser::insert_if_absent(&env.db.pool, &plant.id, 2, 200, 0).await.unwrap();

    env.clock.set(plant.next_watering_at() + Duration::minutes(5));
    let report = checker(&env, notifier.clone()).run_once().await.unwrap();

    assert_eq!(report.plants, 1);
    assert_eq!(report.delivered, 1);
    assert_eq!(report.failed, 1);
    assert_eq!(
        notifier.sent(),
        vec![Sent::Text {
            chat_id: 200,
            text: reminder_text("Ficus")
        }]
    );

    let stored = Plant::find_by_id(&env.db.pool, &plant.id).await.unwrap().unwrap();
    assert!(stored.next_watering_at() > env.clock.now());
}

#[tokio::test]
async fn test_plant_without_users_is_still_rescheduled() {
    let env = setup().await;
    let notifier = Arc::new(RecordingNotifier::default());
    let plant = add_plant(&env, 1, 100, "Ficus", None).await;
    sqlx::query("DELETE FROM plant_users").execute(&env.db.pool).await.unwrap();

    env.clock.set(plant.next_watering_at());
    let report = checker(&env, notifier.clone()).run_once().await.unwrap();

    assert_eq!(report.plants, 1);
    assert_eq!(report.delivered, 0);
    let stored = Plant::find_by_id(&env.db.pool, &plant.id).await.unwrap().unwrap();
    assert!(stored.next_watering_at() > env.clock.now());
}

#[tokio::test]
async fn test_photo_reminder() {
    let env = setup().await;
    let notifier = Arc::new(RecordingNotifier::default());
    let image_id = env.registry.images().store(vec![0xFF, 0xD8, 0xFF, 0xE0, 1, 2], None).await.unwrap();
    let plant = add_plant(&env, 1, 100, "Ficus", Some(image_id)).await;

    env.clock.set(plant.next_watering_at());
    checker(&env, notifier.clone()).run_once().await.unwrap();

    assert_eq!(
        notifier.sent(),
        vec![Sent::Photo {
            chat_id: 100,
            bytes: 6,
            caption: reminder_text("Ficus")
        }]
    );
}

#[tokio::test]
async fn test_photo_failure_falls_back_to_text() {
    let env = setup().await;
    let notifier = Arc::new(RecordingNotifier {
        photos_fail: true,
        ..Default::default()
    });
    let image_id = env.registry.images().store(b"\x89PNG data".to_vec(), None).await.unwrap();
    let plant = add_plant(&env, 1, 100, "Ficus", Some(image_id)).await;

    env.clock.set(plant.next_watering_at());
    let report = checker(&env, notifier.clone()).run_once().await.unwrap();

    assert_eq!(report.delivered, 1);
    assert_eq!(
        notifier.sent(),
        vec![Sent::Text {
            chat_id: 100,
            text: reminder_text("Ficus")
        }]
    );
}

#[tokio::test]
async fn test_only_due_plants_are_processed() {
    let env = setup().await;
    let notifier = Arc::new(RecordingNotifier::default());
    let soon = add_plant(&env, 1, 100, "Ficus", None).await;
    let later = env
        .registry
        .add(NewPlant {
            chat_id: 100,
            user_id: 1,
            name: "Cactus".to_string(),
            interval_days: 10,
            image_id: None,
        })
        .await
        .unwrap();

    env.clock.set(soon.next_watering_at());
    let report = checker(&env, notifier.clone()).run_once().await.unwrap();
    assert_eq!(report.plants, 1);

    let untouched = Plant::find_by_id(&env.db.pool, &later.id).await.unwrap().unwrap();
    assert_eq!(untouched.next_watering, later.next_watering);
}

#[tokio::test]
async fn test_service_check_now() {
    let env = setup().await;
    let notifier = Arc::new(RecordingNotifier::default());
    let plant = add_plant(&env, 1, 100, "Ficus", None).await;

    let service = ReminderService::new(checker(&env, notifier.clone()), std::time::Duration::from_secs(30))
        .await
        .unwrap();

    env.clock.set(plant.next_watering_at());
    let report = service.check_now().await.unwrap();
    assert_eq!(report.plants, 1);
    assert_eq!(notifier.sent().len(), 1);
}

#[tokio::test]
async fn test_plant_stays_due_when_recipients_cannot_be_loaded() {
    let env = setup().await;
    let notifier = Arc::new(RecordingNotifier::default());
    let plant = add_plant(&env, 1, 100, "Ficus", None).await;
    sqlx::query("DROP TABLE plant_users").execute(&env.db.pool).await.unwrap();

    env.clock.set(plant.next_watering_at());
    let report = checker(&env, notifier.clone()).run_once().await.unwrap();

    assert_eq!(report.plants, 1);
    assert_eq!(report.delivered, 0);
    assert_eq!(report.failed, 1);
    assert!(notifier.sent().is_empty());

    let stored = Plant::find_by_id(&env.db.pool, &plant.id).await.unwrap().unwrap();
    assert_eq!(stored.next_watering, plant.next_watering);
    assert_eq!(stored.last_watered, plant.last_watered);
}
