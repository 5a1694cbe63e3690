// src/error.rs
use std::fmt;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, CatsError>;

/// Which mutation a `MembershipMutation` error came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    Add,
    Remove,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Add => f.write_str("add"),
            Action::Remove => f.write_str("remove"),
        }
    }
}

#[derive(Debug, Error)]
pub enum CatsError {
    #[error("couldn't log into CATS as user {netid}")]
    Authentication { netid: String },

    #[error("user does not have access to a group named '{name}'")]
    GroupNotFound { name: String },

    #[error("name '{last}, {first}' matched {matches} people in the directory")]
    AmbiguousName { last: String, first: String, matches: usize },

    #[error("could not {action} {netid} in group {gid} (HTTP {status})")]
    MembershipMutation { action: Action, gid: String, netid: String, status: u16 },

    #[error("login response did not set the '{name}' cookie")]
    MissingCookie { name: String },

    #[error("session is closed")]
    SessionClosed,

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("credentials: {0}")]
    Credentials(String),

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Header(#[from] reqwest::header::InvalidHeaderValue),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
