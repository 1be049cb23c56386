//! Error types for the control layer
use thiserror::Error;

/// Control layer errors
#[derive(Error, Debug)]
pub enum ControlError {
    /// DMX/Art-Net error
    #[error("DMX error: {0}")]
    DmxError(String),

    /// I/O error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Result type for control operations
pub type Result<T> = std::result::Result<T, ControlError>;
