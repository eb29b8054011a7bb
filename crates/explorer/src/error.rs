#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Request never produced a response (connection, timeout, body read).
    Transport(String),
    /// Non-2xx status. The body is not interpreted.
    Status { endpoint: String, status: u16 },
    Decode { endpoint: String, message: String },
    /// Neighborhood whose parallel lists disagree.
    InvalidNeighborhood(String),
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::Transport(msg) => write!(f, "request failed: {msg}"),
            ApiError::Status { endpoint, status } => {
                write!(f, "{endpoint} returned HTTP {status}")
            }
            ApiError::Decode { endpoint, message } => {
                write!(f, "failed to decode {endpoint} response: {message}")
            }
            ApiError::InvalidNeighborhood(msg) => write!(f, "invalid neighborhood: {msg}"),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::Transport(err.to_string())
    }
}
