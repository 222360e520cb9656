use thiserror::Error;

use crate::auth::JwtError;
use crate::store::StoreError;

/// Failures that stop the server from starting or running
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Store initialization failed: {0}")]
    Store(#[from] StoreError),

    #[error("Authentication setup failed: {0}")]
    Jwt(#[from] JwtError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, ServerError>;
