/// Errors surfaced by the onboarding client.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The request never produced an HTTP response.
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The caller has no onboarding record yet.
    #[error("Onboarding record not found")]
    NotFound,

    /// The token was missing, expired or rejected.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// An operation that needs an identity ran while signed out.
    #[error("Not signed in")]
    NotSignedIn,

    /// Any other non-success response.
    #[error("Server returned {status} {code}: {message}")]
    Api {
        status: u16,
        code: String,
        message: String,
    },

    #[error("Session storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("Invalid session data: {0}")]
    Serialization(#[from] serde_json::Error),
}
