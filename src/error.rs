use thiserror::Error;

/// Error type for contract violations
///
/// Degenerate statistical inputs (too few samples, zero variance) are not
/// errors: they produce neutral results. This type only covers inputs that
/// have no meaningful neutral result.
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error")]
    Io(#[source] std::io::Error),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("dimension mismatch: {0}")]
    DimensionMismatch(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Config(format!("JSON: {}", err))
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Self {
        Error::Config(format!("YAML: {}", err))
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Config(format!("TOML: {}", err))
    }
}
