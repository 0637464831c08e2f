/// Core error type for the bot.
///
/// Adapter crates map their specific errors into this type so the poll loop
/// can handle failures consistently (fatal-exit vs log-and-relay).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("homework API request failed: {0}")]
    Transport(String),

    #[error("homework API endpoint unavailable: HTTP {status}")]
    EndpointUnavailable { status: u16 },

    #[error("homework API body is not valid JSON: {0}")]
    MalformedResponse(String),

    #[error("expected key `{field}` is missing from the API response")]
    MissingField { field: &'static str },

    #[error("key `{field}` has the wrong type, expected {expected}")]
    TypeMismatch {
        field: &'static str,
        expected: &'static str,
    },

    #[error("unknown homework status: {0:?}")]
    UnknownStatus(String),

    #[error("telegram send failed: {0}")]
    Notify(String),
}

pub type Result<T> = std::result::Result<T, Error>;
