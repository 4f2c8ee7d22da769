/// Result alias that carries the custom [`BarVizError`] type.
pub type Result<T> = std::result::Result<T, BarVizError>;

/// Common error type for the core crate.
#[derive(Debug, thiserror::Error)]
pub enum BarVizError {
    /// Free-form message for failures that have no dedicated variant.
    #[error("{0}")]
    Message(String),
    /// Wrapper around standard IO errors.
    #[error("{0}")]
    Io(#[from] std::io::Error),
    /// Configuration file could not be encoded or decoded.
    #[error("invalid configuration file: {0}")]
    Json(#[from] serde_json::Error),
    /// A configuration value was rejected during validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// A color string could not be parsed.
    #[error("invalid color {0:?}")]
    InvalidColor(String),
    /// A shared lock was poisoned by a panicking thread. The protected state
    /// can no longer be trusted, so callers should treat this as fatal.
    #[error("{0} has been poisoned")]
    Poisoned(&'static str),
}

impl BarVizError {
    /// Creates a new error that simply wraps the provided message.
    pub fn msg<T: Into<String>>(msg: T) -> Self {
        Self::Message(msg.into())
    }
}

impl From<&str> for BarVizError {
    fn from(value: &str) -> Self {
        Self::msg(value)
    }
}

impl From<String> for BarVizError {
    fn from(value: String) -> Self {
        Self::Message(value)
    }
}
