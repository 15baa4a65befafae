use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invalid signature")]
    InvalidSignature,

    #[error("Forbidden")]
    Forbidden,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid plan: {0}")]
    InvalidPlan(String),

    #[error("Not found")]
    NotFound,

    #[error("Gateway error: {0}")]
    Gateway(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Failures talking to the gateway or the store may succeed on a later poll
    /// or webhook redelivery.
    pub fn is_retryable(&self) -> bool {
        matches!(self, AppError::Gateway(_) | AppError::Database(_))
    }
}

#[derive(Clone, Copy, Debug)]
pub enum ErrorCode {
    PersistenceError,
    InvalidCredentials,
    InvalidSignature,
    Forbidden,
    InvalidInput,
    InvalidPlan,
    NotFound,
    GatewayError,
    InternalError,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::PersistenceError => "PERSISTENCE_ERROR",
            ErrorCode::InvalidCredentials => "INVALID_CREDENTIALS",
            ErrorCode::InvalidSignature => "INVALID_SIGNATURE",
            ErrorCode::Forbidden => "FORBIDDEN",
            ErrorCode::InvalidInput => "INVALID_INPUT",
            ErrorCode::InvalidPlan => "INVALID_PLAN",
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::GatewayError => "GATEWAY_ERROR",
            ErrorCode::InternalError => "INTERNAL_ERROR",
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;
