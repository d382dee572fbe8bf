//! Service level errors

use spine_core::SpineError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Spine(#[from] SpineError),

    #[error("remote device not connected: {0}")]
    NotConnected(String),

    #[error("invalid configuration: {0}")]
    Config(String),
}
