#![allow(clippy::unwrap_used)]

use chrono::{Duration, TimeZone, Utc};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::{tempdir, TempDir};
use watering_reminder_bot::bot::messages;
use watering_reminder_bot::database::connection::DatabaseManager;
use watering_reminder_bot::database::models::{InviteCode, PlantUser};
use watering_reminder_bot::error::ServiceError;
use watering_reminder_bot::services::clock::{Clock, ManualClock};
use watering_reminder_bot::services::images::ImageStore;
use watering_reminder_bot::services::invites::{InviteService, CODE_ALPHABET, CODE_LENGTH};
use watering_reminder_bot::services::registry::{NewPlant, PlantRegistry};
use watering_reminder_bot::services::watering::WateringSchedule;

const ALICE: i64 = 1001;
const BOB: i64 = 1002;
const CAROL: i64 = 1003;
const ALICE_CHAT: i64 = 5001;
const BOB_CHAT: i64 = 5002;
const CAROL_CHAT: i64 = 5003;

struct TestEnv {
    db: DatabaseManager,
    clock: Arc<ManualClock>,
    registry: PlantRegistry,
    invites: InviteService,
    _dir: TempDir,
}

async fn setup() -> TestEnv {
    let dir = tempdir().unwrap();
    let db_path = dir.path().join("test.db");
    let db = DatabaseManager::new(&format!("sqlite:{}", db_path.display())).await.unwrap();
    db.run_migrations().await.unwrap();

    let clock = Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap()));
    let images = ImageStore::new(db.pool.clone(), "http://localhost:3000", 1024, clock.clone());
    let registry = PlantRegistry::new(db.clone(), images, WateringSchedule::default(), clock.clone());
    let invites = InviteService::new(db.clone(), clock.clone());

    TestEnv { db, clock, registry, invites, _dir: dir }
}

async fn add_plant(env: &TestEnv, user_id: i64, chat_id: i64, name: &str) -> String {
    let plant = env
        .registry
        .add(NewPlant {
            chat_id,
            user_id,
            name: name.to_string(),
            interval_days: 3,
            image_id: None,
        })
        .await
        .unwrap();
    plant.id
}

#[tokio::test]
async fn test_create_code_for_one_plant() {
    let env = setup().await;
    let plant_id = add_plant(&env, ALICE, ALICE_CHAT, "Ficus").await;

    let grant = env.invites.create(&plant_id, ALICE).await.unwrap();

    assert_eq!(grant.code.len(), CODE_LENGTH);
    assert!(grant.code.bytes().all(|b| CODE_ALPHABET.contains(&b)));
    assert_eq!(grant.created_at, env.clock.now());
    assert_eq!(grant.expires_at, env.clock.now() + Duration::hours(24));
    assert_eq!(grant.plant_count, 1);

    let stored = InviteCode::find_by_code(&env.db.pool, &grant.code).await.unwrap().unwrap();
    assert_eq!(stored.created_by, ALICE);
    assert_eq!(InviteCode::plant_ids(&env.db.pool, &stored.id).await.unwrap(), vec![plant_id]);
}

#[tokio::test]
async fn test_create_requires_access() {
    let env = setup().await;
    let plant_id = add_plant(&env, ALICE, ALICE_CHAT, "Ficus").await;

    let result = env.invites.create(&plant_id, BOB).await;
    assert!(matches!(result, Err(ServiceError::NoAccess)));
}

#[tokio::test]
async fn test_create_all_without_plants() {
    let env = setup().await;

    let result = env.invites.create_all(ALICE).await;
    assert!(matches!(result, Err(ServiceError::NothingToShare)));
}

#[tokio::test]
async fn test_join_grants_access_and_routes_reminders() {
    let env = setup().await;
    let plant_id = add_plant(&env, ALICE, ALICE_CHAT, "Ficus").await;
    let grant = env.invites.create(&plant_id, ALICE).await.unwrap();

    let outcome = env.invites.use_code(&grant.code.to_lowercase(), BOB, BOB_CHAT).await.unwrap();
    assert_eq!(outcome.added, vec!["Ficus".to_string()]);
    assert!(outcome.skipped.is_empty());

    let bob_plants = env.registry.list(BOB).await.unwrap();
    assert_eq!(bob_plants.len(), 1);
    assert_eq!(bob_plants[0].id, plant_id);

    let chats: Vec<i64> = env
        .registry
        .users(&plant_id)
        .await
        .unwrap()
        .into_iter()
        .map(|u| u.chat_id)
        .collect();
    assert_eq!(chats, vec![ALICE_CHAT, BOB_CHAT]);
}

#[tokio::test]
async fn test_code_is_reusable_until_expiry() {
    let env = setup().await;
    let plant_id = add_plant(&env, ALICE, ALICE_CHAT, "Ficus").await;
    let grant = env.invites.create(&plant_id, ALICE).await.unwrap();

    env.invites.use_code(&grant.code, BOB, BOB_CHAT).await.unwrap();

    let again = env.invites.use_code(&grant.code, BOB, BOB_CHAT).await;
    assert!(matches!(again, Err(ServiceError::AlreadyJoined)));

    // Exactly at the deadline the code still works
    env.clock.advance(Duration::hours(24));
    let outcome = env.invites.use_code(&grant.code, CAROL, CAROL_CHAT).await.unwrap();
    assert_eq!(outcome.added.len(), 1);
}

#[tokio::test]
async fn test_expired_code_is_deleted() {
    let env = setup().await;
    let plant_id = add_plant(&env, ALICE, ALICE_CHAT, "Ficus").await;
    let grant = env.invites.create(&plant_id, ALICE).await.unwrap();

    env.clock.advance(Duration::hours(24) + Duration::milliseconds(1));

    let expired = env.invites.use_code(&grant.code, BOB, BOB_CHAT).await;
    assert!(matches!(expired, Err(ServiceError::CodeExpired)));
    assert!(InviteCode::find_by_code(&env.db.pool, &grant.code).await.unwrap().is_none());

    let gone = env.invites.use_code(&grant.code, BOB, BOB_CHAT).await;
    assert!(matches!(gone, Err(ServiceError::CodeNotFound)));
    assert!(!PlantUser::exists(&env.db.pool, &plant_id, BOB).await.unwrap());
}

#[tokio::test]
async fn test_unknown_code() {
    let env = setup().await;

    let result = env.invites.use_code("ZZZZZZ", BOB, BOB_CHAT).await;
    assert!(matches!(result, Err(ServiceError::CodeNotFound)));
}

#[tokio::test]
async fn test_share_all_skips_plants_already_owned() {
    let env = setup().await;
    let ficus = add_plant(&env, ALICE, ALICE_CHAT, "Ficus").await;
    add_plant(&env, ALICE, ALICE_CHAT, "Cactus").await;
    add_plant(&env, ALICE, ALICE_CHAT, "Fern").await;

    // Bob already has the ficus
    let single = env.invites.create(&ficus, ALICE).await.unwrap();
    env.invites.use_code(&single.code, BOB, BOB_CHAT).await.unwrap();

    let grant = env.invites.create_all(ALICE).await.unwrap();
    assert_eq!(grant.plant_count, 3);

    let outcome = env.invites.use_code(&grant.code, BOB, BOB_CHAT).await.unwrap();
    assert_eq!(outcome.added, vec!["Cactus".to_string(), "Fern".to_string()]);
    assert_eq!(outcome.skipped, vec!["Ficus".to_string()]);
    assert_eq!(env.registry.list(BOB).await.unwrap().len(), 3);
}

#[tokio::test]
async fn test_deleted_plants_are_ignored() {
    let env = setup().await;
    let ficus = add_plant(&env, ALICE, ALICE_CHAT, "Ficus").await;
    let cactus = add_plant(&env, ALICE, ALICE_CHAT, "Cactus").await;
    let grant = env.invites.create_all(ALICE).await.unwrap();

    env.registry.remove(&ficus, ALICE).await.unwrap();

    let outcome = env.invites.use_code(&grant.code, BOB, BOB_CHAT).await.unwrap();
    assert_eq!(outcome.added, vec!["Cactus".to_string()]);
    assert!(outcome.skipped.is_empty());

    env.registry.remove(&cactus, ALICE).await.unwrap();
    env.registry.remove(&cactus, BOB).await.unwrap();

    let result = env.invites.use_code(&grant.code, CAROL, CAROL_CHAT).await;
    assert!(matches!(result, Err(ServiceError::PlantsNotFound)));
}

#[tokio::test]
async fn test_code_collisions_are_retried() {
    let env = setup().await;
    let plant_id = add_plant(&env, ALICE, ALICE_CHAT, "Ficus").await;

    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let invites = InviteService::new(env.db.clone(), env.clock.clone()).with_code_generator(Arc::new(move || {
        // First two draws repeat, then move on
        let n = counter.fetch_add(1, Ordering::SeqCst);
        if n < 2 {
            "AAAAAA".to_string()
        } else {
            "BBBBBB".to_string()
        }
    }));

    assert_eq!(invites.create(&plant_id, ALICE).await.unwrap().code, "AAAAAA");
    assert_eq!(invites.create(&plant_id, ALICE).await.unwrap().code, "BBBBBB");
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_code_generation_gives_up() {
    let env = setup().await;
    let plant_id = add_plant(&env, ALICE, ALICE_CHAT, "Ficus").await;

    let invites = InviteService::new(env.db.clone(), env.clock.clone())
        .with_code_generator(Arc::new(|| "AAAAAA".to_string()));

    invites.create(&plant_id, ALICE).await.unwrap();
    let result = invites.create(&plant_id, ALICE).await;
    assert!(matches!(result, Err(ServiceError::CodeGenerationFailed)));
}

#[tokio::test]
async fn test_share_reply_uses_service_clock() {
    let env = setup().await;
    let plant_id = add_plant(&env, ALICE, ALICE_CHAT, "Ficus").await;

    // Far from the wall clock
    env.clock.set(Utc.with_ymd_and_hms(2030, 1, 1, 12, 0, 0).unwrap());
    let grant = env.invites.create(&plant_id, ALICE).await.unwrap();

    let text = messages::invite_created(Some("Ficus"), &grant);
    assert!(text.contains("valid for 24 h"), "{text}");
}
