//! Error type shared by the SPINE core

use thiserror::Error;

use crate::model::{FunctionType, MsgCounter, RoleType};

/// Errors raised by feature operations and message handling
#[derive(Debug, Error)]
pub enum SpineError {
    #[error("no data cached for {0}")]
    NotFound(FunctionType),

    #[error("role mismatch: local {local} cannot talk to remote {remote}")]
    RoleMismatch { local: RoleType, remote: RoleType },

    #[error("feature not found: {0}")]
    FeatureNotFound(String),

    #[error("remote device not found: {0}")]
    DeviceNotFound(String),

    #[error("timeout waiting for reply to message {0}")]
    RequestTimeout(MsgCounter),

    #[error("request {0} cancelled")]
    Cancelled(MsgCounter),

    #[error("remote returned error {error_number}: {description}")]
    RemoteError {
        error_number: u32,
        description: String,
    },

    #[error("data for {actual} cannot be stored under {expected}")]
    FunctionTypeMismatch {
        expected: FunctionType,
        actual: FunctionType,
    },

    #[error("invalid message: {0}")]
    InvalidFormat(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SpineError>;
