use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(anyhow::Error),

    #[error("Not found: {0}")]
    NotFound(anyhow::Error),

    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),

    #[error("Serialization error: {0}")]
    SerializationError(anyhow::Error),

    #[error("Configuration error: {0}")]
    ConfigError(anyhow::Error),
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::ConfigError(anyhow::Error::new(err))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::SerializationError(anyhow::Error::new(err))
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => AppError::NotFound(anyhow::Error::new(err)),
            _ => AppError::InternalError(anyhow::Error::new(err)),
        }
    }
}

impl AppError {
    /// Process exit code for command-line front ends (sysexits.h values).
    pub fn exit_code(&self) -> u8 {
        match self {
            AppError::BadRequest(_) => 65,
            AppError::NotFound(_) => 66,
            AppError::InternalError(_) => 70,
            AppError::SerializationError(_) => 65,
            AppError::ConfigError(_) => 78,
        }
    }
}
