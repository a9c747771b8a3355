use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid price pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("Invalid JSON in {path}: {source}")]
    FileFormat {
        path: String,
        source: serde_json::Error,
    },

    #[error("Logging setup failed: {0}")]
    Logging(String),

    #[error("Plugin error: {plugin_type}: {message}")]
    Plugin { plugin_type: String, message: String },

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<tracing_appender::rolling::InitError> for AppError {
    fn from(err: tracing_appender::rolling::InitError) -> Self {
        AppError::Logging(err.to_string())
    }
}

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, AppError>;
