use thiserror::Error;

/// Failures the camera screen reports to the user. None of them end the
/// process; each is shown as a notification and the screen recovers.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AppError {
    #[error("Camera permission denied")]
    PermissionDenied,

    #[error("Error while recording video: {0}")]
    Camera(String),

    #[error("Video upload failed: {0}")]
    Upload(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl AppError {
    pub fn camera(err: impl std::fmt::Display) -> Self {
        AppError::Camera(err.to_string())
    }

    pub fn upload(err: impl std::fmt::Display) -> Self {
        AppError::Upload(err.to_string())
    }

    pub fn title(&self) -> &'static str {
        match self {
            AppError::PermissionDenied => "Camera Unavailable",
            AppError::Camera(_) => "Recording Failed",
            AppError::Upload(_) => "Upload Failed",
            AppError::Config(_) => "Configuration Error",
        }
    }
}
