use thiserror::Error;

#[derive(Error, Debug)]
pub enum GbotError {
    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    #[error("Handler error: {0}")]
    Handler(#[from] HandlerError),

    #[error("Dispatch error: {0}")]
    Dispatch(String),

    #[error("Navigation loop: back to {endpoint} after {hops} hop(s)")]
    NavigationLoop { endpoint: String, hops: usize },

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failures turning a raw inbound event into a [`crate::Message`].
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("Malformed event: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unknown message type: {0}")]
    UnknownType(String),

    #[error("Invalid chat_id string: {0}")]
    InvalidChatId(String),

    #[error("Malformed {kind} payload: {source}")]
    Payload {
        kind: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Error, Debug)]
pub enum HandlerError {
    #[error("Invalid command: {0}")]
    InvalidCommand(String),

    #[error("Unauthorized access")]
    Unauthorized,

    #[error("Missing parameter: {0}")]
    MissingParam(String),

    #[error("State error: {0}")]
    State(String),
}

pub type Result<T> = std::result::Result<T, GbotError>;
