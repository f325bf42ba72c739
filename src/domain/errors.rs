use thiserror::Error;

/// Failure of a backend call, as seen by the query cache and the use cases.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// No response at all (offline, DNS, CORS, aborted).
    #[error("Network error: {0}")]
    Transport(String),
    /// A response arrived but reported failure.
    #[error("{message}")]
    Application { status: u16, message: String },
    /// A dependent fetch ran before its input was resolved.
    #[error("Missing dependency: {0}")]
    MissingDependency(&'static str),
    /// A cache key was read with a different data type than it was filled with.
    #[error("Cached data for {0} has another type")]
    TypeMismatch(String),
}

impl FetchError {
    pub fn application(status: u16, message: impl Into<String>) -> Self {
        FetchError::Application { status, message: message.into() }
    }

    /// Text suitable for a user-facing notification.
    pub fn message(&self) -> String {
        match self {
            FetchError::Application { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::Application { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// A single rejected form field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Username is required.")]
    EmptyUsername,
    #[error("Ticker is required.")]
    EmptyTicker,
    #[error("Quantity must be greater than 0.")]
    NonPositiveQuantity,
    #[error("Buy price must be greater than 0.")]
    NonPositiveBuyPrice,
    #[error("{field} must be a number.")]
    NotANumber { field: &'static str },
}

impl ValidationError {
    /// Form field the error belongs to.
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::EmptyUsername => "username",
            ValidationError::EmptyTicker => "ticker",
            ValidationError::NonPositiveQuantity => "quantity",
            ValidationError::NonPositiveBuyPrice => "buyPrice",
            ValidationError::NotANumber { field } => *field,
        }
    }
}

/// Every field error found in one submission.
#[derive(Debug, Clone, PartialEq, Eq, Default, Error)]
#[error("{} invalid field(s)", .0.len())]
pub struct FormErrors(pub Vec<ValidationError>);

impl FormErrors {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn for_field(&self, field: &str) -> Option<&ValidationError> {
        self.0.iter().find(|e| e.field() == field)
    }

    pub fn push(&mut self, error: ValidationError) {
        self.0.push(error);
    }
}

impl From<ValidationError> for FormErrors {
    fn from(error: ValidationError) -> Self {
        FormErrors(vec![error])
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StatsError {
    #[error("statistics requested over an empty series")]
    EmptySeries,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    #[error("durable storage unavailable: {0}")]
    Unavailable(String),
    #[error("durable storage write failed: {0}")]
    Write(String),
    #[error("could not serialize record: {0}")]
    Serialize(String),
}

/// Aggregate returned by the application use cases.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AppError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Validation(#[from] FormErrors),
    #[error(transparent)]
    Stats(#[from] StatsError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("Please login to continue.")]
    NotAuthenticated,
}

impl From<ValidationError> for AppError {
    fn from(error: ValidationError) -> Self {
        AppError::Validation(error.into())
    }
}

pub type FetchResult<T> = Result<T, FetchError>;
pub type AppResult<T> = Result<T, AppError>;
