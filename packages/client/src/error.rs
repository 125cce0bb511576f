use thiserror::Error;

use crate::models::player::Role;

/// Failure of a single backend call.
///
/// Cloneable so that a settled prefetch can sit in the request cache until its
/// one consumer takes it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    #[error("request to {endpoint} timed out")]
    Timeout { endpoint: &'static str },
    #[error("transport error on {endpoint}: {message}")]
    Transport {
        endpoint: &'static str,
        message: String,
    },
    #[error("protocol error on {endpoint}: {detail}")]
    Protocol {
        endpoint: &'static str,
        detail: String,
    },
    #[error("prefetch task did not complete: {0}")]
    PrefetchAborted(String),
}

impl ClientError {
    pub(crate) fn from_reqwest(endpoint: &'static str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ClientError::Timeout { endpoint }
        } else if err.is_decode() {
            ClientError::Protocol {
                endpoint,
                detail: err.to_string(),
            }
        } else {
            ClientError::Transport {
                endpoint,
                message: err.to_string(),
            }
        }
    }
}

/// Rejected human input. Never leaves the prompt loop.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InputError {
    #[error("'{0}' is not a number")]
    NotANumber(String),
    #[error("{0} is outside -1..=9")]
    OutOfRange(i32),
}

#[derive(Error, Debug)]
pub enum GameError {
    #[error(transparent)]
    Client(#[from] ClientError),
    #[error("no {0} on the roster")]
    MissingRole(Role),
    #[error("human input closed")]
    InputClosed,
    #[error("the action queue is empty")]
    EmptyQueue,
}
