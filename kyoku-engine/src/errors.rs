use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    /// The match is over; returned by the transition step, never a failure.
    GameEnd,
    /// A submitted call is not part of the offered menu
    InvalidCall { message: String },
    /// Inconsistent game or replay state (unmatched event, bad event order)
    InvalidState { message: String },
    /// Unknown tile / wind / call name
    Parse { input: String, message: String },
    Serialization { message: String },
}

impl GameError {
    pub fn invalid_call(message: impl Into<String>) -> Self {
        GameError::InvalidCall {
            message: message.into(),
        }
    }

    pub fn invalid_state(message: impl Into<String>) -> Self {
        GameError::InvalidState {
            message: message.into(),
        }
    }
}

impl fmt::Display for GameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameError::GameEnd => write!(f, "game is over"),
            GameError::InvalidCall { message } => {
                write!(f, "Invalid call: {}", message)
            }
            GameError::InvalidState { message } => {
                write!(f, "Invalid state: {}", message)
            }
            GameError::Parse { input, message } => {
                write!(f, "Parse error on '{}': {}", input, message)
            }
            GameError::Serialization { message } => {
                write!(f, "Serialization error: {}", message)
            }
        }
    }
}

impl std::error::Error for GameError {}

impl From<serde_json::Error> for GameError {
    fn from(err: serde_json::Error) -> Self {
        GameError::Serialization {
            message: err.to_string(),
        }
    }
}

pub type EngineResult<T> = Result<T, GameError>;
