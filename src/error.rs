//! Result tiers shared by the renderer and the console shim
//!
//! Success and warnings travel in `Ok(Status)`, failures in `Err(RenderError)`.

use crate::config::ConfigError;

/// Non-failing outcome of a console operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Operation completed
    Done,
    /// Acquire requested while the console was already held
    AlreadyActive,
    /// Release requested while the console was not held
    NotActive,
}

impl Status {
    pub fn is_warning(self) -> bool {
        !matches!(self, Status::Done)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Console device failure: {0}")]
    Device(#[from] std::io::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl RenderError {
    pub fn invalid(message: impl Into<String>) -> Self {
        RenderError::InvalidParameter(message.into())
    }

    /// Process exit code for an unrecovered failure (always negative)
    pub fn exit_code(&self) -> i32 {
        match self {
            RenderError::InvalidParameter(_) | RenderError::Config(_) => -1,
            RenderError::Device(_) => -2,
        }
    }
}
