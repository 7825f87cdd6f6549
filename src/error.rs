use thiserror::Error;

/// A native window-manager call failed.
#[derive(Debug, Error)]
pub enum PlatformError {
    #[error("{call} failed: {reason}")]
    Call { call: &'static str, reason: String },
    #[error("window handle is null")]
    NullHandle,
}

impl PlatformError {
    pub fn call(call: &'static str, reason: impl ToString) -> Self {
        PlatformError::Call {
            call,
            reason: reason.to_string(),
        }
    }
}

/// Attachment failures that stop startup. Everything else degrades.
#[derive(Debug, Error)]
pub enum AttachError {
    #[error("desktop host window `{class}` not found")]
    HostNotFound { class: &'static str },
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("cannot allocate a {width}x{height} frame buffer")]
    Surface { width: u32, height: u32 },
    #[error("font could not be parsed: {0}")]
    Font(String),
    #[error("present failed: {0}")]
    Present(#[from] PlatformError),
}
