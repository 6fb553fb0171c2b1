use thiserror::Error;

/// Failures surfaced by the plant registry, invite service and image store.
///
/// Everything except [`ServiceError::Database`] and [`ServiceError::Storage`]
/// is an expected outcome that the bot reports back to the chat as-is.
#[derive(Error, Debug)]
pub enum ServiceError {
    /// Bad user input (interval, name, plant number, code format).
    #[error("{0}")]
    Validation(String),

    /// The user is not in the plant's user set.
    #[error("You don't have access to this plant")]
    NoAccess,

    /// The referenced plant does not exist.
    #[error("Plant not found")]
    PlantNotFound,

    /// No invite code with that value exists.
    #[error("Code not found")]
    CodeNotFound,

    /// The invite code is past its deadline; the record has been removed.
    #[error("Code has expired")]
    CodeExpired,

    /// Every plant behind the code is already shared with the user.
    #[error("You already have access to all of these plants")]
    AlreadyJoined,

    /// None of the plants behind the code exist anymore.
    #[error("The shared plants no longer exist")]
    PlantsNotFound,

    /// `/shareall` by a user without plants.
    #[error("You have no plants to share")]
    NothingToShare,

    /// Every attempt to draw an unused invite code collided.
    #[error("Could not generate a unique code, please try again")]
    CodeGenerationFailed,

    /// Image store rejected or failed an operation.
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl ServiceError {
    /// Whether the error is an internal failure rather than a user-facing outcome.
    pub fn is_internal(&self) -> bool {
        matches!(self, ServiceError::Database(_) | ServiceError::Storage(_))
    }
}

/// Convenience alias used by the service layer.
pub type ServiceResult<T> = std::result::Result<T, ServiceError>;
