use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("{0}")]
    Validation(String),

    #[error("Invalid login credentials")]
    InvalidCredentials,

    #[error("Account login is disabled")]
    AccountDisabled,

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0}")]
    Conflict(String),

    #[error("Invalid customer status value")]
    InvalidStatus,

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl ServiceError {
    /// HTTP-equivalent status code for the boundary layer.
    pub fn status_code(&self) -> u16 {
        match self {
            ServiceError::Validation(_) | ServiceError::InvalidStatus => 400,
            ServiceError::InvalidCredentials => 401,
            ServiceError::AccountDisabled => 403,
            ServiceError::NotFound(_) => 404,
            ServiceError::Conflict(_) => 409,
            ServiceError::Database(_)
            | ServiceError::Serialization(_)
            | ServiceError::Other(_) => 500,
        }
    }

    /// Message safe to serialize to callers. Internal failures are
    /// collapsed to a generic string; everything else is client-facing
    /// already.
    pub fn public_message(&self) -> String {
        match self.status_code() {
            500 => "Internal server error".to_string(),
            _ => self.to_string(),
        }
    }
}
