use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Persistence unavailable: {0}")]
    PersistenceUnavailable(String),

    #[error("Invalid recurrence state: {0}")]
    InvalidRecurrenceState(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Error: {0}")]
    Anyhow(#[from] anyhow::Error),
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => Self::NotFound("row not found".to_string()),
            other => Self::PersistenceUnavailable(other.to_string()),
        }
    }
}

impl AppError {
    pub fn not_found<S: Into<String>>(msg: S) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn persistence<S: Into<String>>(msg: S) -> Self {
        Self::PersistenceUnavailable(msg.into())
    }

    pub fn invalid_recurrence<S: Into<String>>(msg: S) -> Self {
        Self::InvalidRecurrenceState(msg.into())
    }

    pub fn invalid_input<S: Into<String>>(msg: S) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

    /// Whether a retry of the same call could plausibly succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::PersistenceUnavailable(_))
    }

    pub fn is_pii_safe(&self) -> bool {
        match self {
            Self::PersistenceUnavailable(_) | Self::Anyhow(_) => false,
            Self::NotFound(_)
            | Self::InvalidRecurrenceState(_)
            | Self::InvalidInput(_)
            | Self::Config(_) => true,
        }
    }

    pub fn to_safe_string(&self) -> String {
        if self.is_pii_safe() {
            self.to_string()
        } else {
            match self {
                Self::PersistenceUnavailable(_) => "Calendar storage is unavailable".to_string(),
                Self::Anyhow(_) => "Operation failed".to_string(),
                _ => self.to_string(),
            }
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_not_found_maps_to_not_found() {
        let err: AppError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, AppError::NotFound(_)));
        assert!(!err.is_transient());
    }

    #[test]
    fn test_pool_errors_are_transient() {
        let err: AppError = sqlx::Error::PoolTimedOut.into();
        assert!(matches!(err, AppError::PersistenceUnavailable(_)));
        assert!(err.is_transient());
    }

    #[test]
    fn test_safe_string_hides_storage_details() {
        let err = AppError::persistence("disk I/O error at /home/alice/weekplan.db");
        assert_eq!(err.to_safe_string(), "Calendar storage is unavailable");

        let err = AppError::not_found("event abc");
        assert_eq!(err.to_safe_string(), "Not found: event abc");
    }
}
