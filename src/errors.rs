#[derive(Debug, thiserror::Error)]
pub enum CookieError {
    #[error("Cannot serialize cookie value: {0}")]
    Serialization(#[source] serde_json::Error),

    #[error("Cannot decode cookie '{key}': {reason}")]
    Deserialization { key: String, reason: String },

    #[error("Invalid cookie expiry: {0}")]
    InvalidExpiry(String),

    #[error("Invalid cookie key '{key}': {reason}")]
    InvalidKey { key: String, reason: String },

    #[error("Malformed cookie descriptor: {0}")]
    MalformedDescriptor(String),

    #[error("Cookie jar I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Cookie jar snapshot error: {0}")]
    Snapshot(#[source] serde_json::Error),

    #[error("Host rejected cookie access: {0}")]
    Host(String),
}
