/// Application error type covering every failure the client surfaces.
///
/// The variants follow the session lifecycle: fetching connection details,
/// opening the connection, pushing participant metadata, and local media
/// device access. None of these are fatal to the process; they end up as
/// dismissible alerts or log lines and the user may retry.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// The connection-details endpoint was unreachable or returned non-2xx.
    /// The message carries the response body when one was returned.
    #[error("fetching connection details failed: {0}")]
    ConnectionDetails(String),

    /// The connect call failed after details were obtained.
    #[error("{message}")]
    Connect { kind: String, message: String },

    /// A local media device could not be opened or failed mid-stream.
    #[error("{message}")]
    MediaDevice { kind: String, message: String },

    /// A participant metadata push failed. Logged only, never surfaced.
    #[error("metadata push failed: {0}")]
    MetadataPush(String),

    /// An operation that requires a live session was attempted while idle.
    #[error("not connected to a session")]
    NotConnected,

    /// Invalid or malformed configuration.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl AppError {
    /// Short machine-ish name for the error category. Alerts are composed
    /// as `{kind}: {display}`, so the kind stays out of `Display` itself.
    pub fn kind(&self) -> &str {
        match self {
            AppError::ConnectionDetails(_) => "ConnectionDetailsError",
            AppError::Connect { kind, .. } => kind,
            AppError::MediaDevice { kind, .. } => kind,
            AppError::MetadataPush(_) => "MetadataPushError",
            AppError::NotConnected => "NotConnected",
            AppError::Config(_) => "ConfigError",
        }
    }
}

/// Result type alias for convenience
pub type AppResult<T> = Result<T, AppError>;
