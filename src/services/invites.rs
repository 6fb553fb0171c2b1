use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use std::sync::Arc;

use crate::database::connection::DatabaseManager;
use crate::database::models::{InviteCode, Plant, PlantUser};
use crate::error::{ServiceError, ServiceResult};
use crate::services::clock::Clock;
use crate::utils::datetime::{from_millis, to_millis};

/// Uppercase letters and digits without the easily confused 0, O, 1 and I.
pub const CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";
pub const CODE_LENGTH: usize = 6;
pub const MAX_CODE_ATTEMPTS: usize = 10;
pub const CODE_TTL_HOURS: i64 = 24;

/// Draws a code uniformly from [`CODE_ALPHABET`].
pub fn generate_code<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..CODE_LENGTH)
        .map(|_| CODE_ALPHABET[rng.gen_range(0..CODE_ALPHABET.len())] as char)
        .collect()
}

pub fn normalize_code(raw: &str) -> String {
    raw.trim().to_uppercase()
}

pub type CodeGenerator = Arc<dyn Fn() -> String + Send + Sync>;

/// A freshly created invite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InviteGrant {
    pub code: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub plant_count: usize,
}

/// Result of redeeming a code: plant names that were added and those the
/// user already had.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JoinOutcome {
    pub added: Vec<String>,
    pub skipped: Vec<String>,
}

/// Time-boxed codes that grant access to one or all of a user's plants.
#[derive(Clone)]
pub struct InviteService {
    db: DatabaseManager,
    clock: Arc<dyn Clock>,
    code_generator: CodeGenerator,
}

impl InviteService {
    pub fn new(db: DatabaseManager, clock: Arc<dyn Clock>) -> Self {
        Self {
            db,
            clock,
            code_generator: Arc::new(|| generate_code(&mut rand::thread_rng())),
        }
    }

    /// Replaces the random code source.
    pub fn with_code_generator(mut self, code_generator: CodeGenerator) -> Self {
        self.code_generator = code_generator;
        self
    }

    /// Shares a single plant. The caller must already have access to it.
    pub async fn create(&self, plant_id: &str, user_id: i64) -> ServiceResult<InviteGrant> {
        if !PlantUser::exists(&self.db.pool, plant_id, user_id).await? {
            return Err(ServiceError::NoAccess);
        }

        self.store_code(&[plant_id.to_string()], user_id).await
    }

    /// Shares every plant the user currently has.
    pub async fn create_all(&self, user_id: i64) -> ServiceResult<InviteGrant> {
        let plant_ids: Vec<String> = PlantUser::find_by_user(&self.db.pool, user_id)
            .await?
            .into_iter()
            .map(|relationship| relationship.plant_id)
            .collect();

        if plant_ids.is_empty() {
            return Err(ServiceError::NothingToShare);
        }

        self.store_code(&plant_ids, user_id).await
    }

    /// Redeems a code for `user_id`, routing future reminders to `chat_id`.
    ///
    /// Expired codes are deleted on the spot. The code itself stays valid
    /// for other users until it expires.
    pub async fn use_code(&self, raw_code: &str, user_id: i64, chat_id: i64) -> ServiceResult<JoinOutcome> {
        let code = normalize_code(raw_code);
        let now = to_millis(self.clock.now());

        let invite = InviteCode::find_by_code(&self.db.pool, &code)
            .await?
            .ok_or(ServiceError::CodeNotFound)?;

        if invite.is_expired(now) {
            InviteCode::delete(&self.db.pool, &invite.id).await?;
            tracing::debug!("Deleted expired invite code {}", invite.code);
            return Err(ServiceError::CodeExpired);
        }

        let mut outcome = JoinOutcome::default();

        for plant_id in InviteCode::plant_ids(&self.db.pool, &invite.id).await? {
            let Some(plant) = Plant::find_by_id(&self.db.pool, &plant_id).await? else {
                continue;
            };

            if PlantUser::insert_if_absent(&self.db.pool, &plant.id, user_id, chat_id, now).await? {
                outcome.added.push(plant.name);
            } else {
                outcome.skipped.push(plant.name);
            }
        }

        if outcome.added.is_empty() {
            return Err(if outcome.skipped.is_empty() {
                ServiceError::PlantsNotFound
            } else {
                ServiceError::AlreadyJoined
            });
        }

        Ok(outcome)
    }

    async fn store_code(&self, plant_ids: &[String], user_id: i64) -> ServiceResult<InviteGrant> {
        let now = self.clock.now();
        let expires_at = now + Duration::hours(CODE_TTL_HOURS);

        for attempt in 1..=MAX_CODE_ATTEMPTS {
            let code = (self.code_generator)();

            let stored = InviteCode::try_create(
                &self.db.pool,
                &code,
                plant_ids,
                user_id,
                to_millis(expires_at),
                to_millis(now),
            )
            .await?;

            match stored {
                Some(invite) => {
                    return Ok(InviteGrant {
                        code: invite.code,
                        created_at: from_millis(invite.created_at),
                        expires_at: from_millis(invite.expires_at),
                        plant_count: plant_ids.len(),
                    });
                }
                None => tracing::debug!("Invite code collision on attempt {}", attempt),
            }
        }

        Err(ServiceError::CodeGenerationFailed)
    }
}
