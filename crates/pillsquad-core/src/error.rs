//! Error types for PillSquad

/// Result type alias using PillSquad's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for PillSquad operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No usable input field was supplied
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Uploaded bytes could not be decoded as an image
    #[error("invalid image: {0}")]
    InvalidImage(String),

    /// Registry or model data could not be loaded
    #[error("data load error: {0}")]
    DataLoad(String),

    /// Outbound HTTP call (page fetch, remote prediction API) failed
    #[error("remote call failed: {0}")]
    RemoteCall(String),

    /// WebDriver session failures
    #[error("browser error: {0}")]
    Browser(String),

    /// Classifier execution errors
    #[error("classifier error: {0}")]
    Classifier(String),

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(String),

    /// Network/IO errors
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic internal errors
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a new invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create a new invalid image error
    pub fn invalid_image(msg: impl Into<String>) -> Self {
        Self::InvalidImage(msg.into())
    }

    /// Create a new data load error
    pub fn data_load(msg: impl Into<String>) -> Self {
        Self::DataLoad(msg.into())
    }

    /// Create a new remote call error
    pub fn remote_call(msg: impl Into<String>) -> Self {
        Self::RemoteCall(msg.into())
    }

    /// Create a new browser error
    pub fn browser(msg: impl Into<String>) -> Self {
        Self::Browser(msg.into())
    }

    /// Create a new classifier error
    pub fn classifier(msg: impl Into<String>) -> Self {
        Self::Classifier(msg.into())
    }

    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Whether the caller supplied bad input, as opposed to a server-side failure
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidInput(_) | Self::InvalidImage(_))
    }
}
