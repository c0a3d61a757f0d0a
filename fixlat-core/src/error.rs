use std::fmt;

/// Result type alias for fixlat core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for fixlat core operations
#[derive(Debug)]
pub enum Error {
    /// Invalid configuration values (window size, timezone)
    Config(String),

    /// Window sequences that cannot be combined on one axis
    Alignment(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Config(msg) => write!(f, "Configuration error: {msg}"),
            Error::Alignment(msg) => write!(f, "Alignment error: {msg}"),
        }
    }
}

impl std::error::Error for Error {}
