use std::time::Duration;
use thiserror::Error;

/// A call into the operating system's notification or windowing platform failed.
///
/// Recoverable: activation handling reports it and carries on.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlatformError {
    /// The platform returned a failure code
    #[error("platform call failed (0x{code:08X}): {message}")]
    Os { code: i32, message: String },

    /// The UI thread has stopped draining rendezvous requests
    #[error("UI thread is no longer accepting requests")]
    UiThreadUnavailable,

    /// The UI thread did not answer within the configured bound
    #[error("UI thread did not respond within {0:?}")]
    UiThreadTimeout(Duration),

    #[error("desktop notifications are not supported on this platform")]
    Unsupported,
}

impl PlatformError {
    pub fn os(code: i32, message: impl Into<String>) -> Self {
        Self::Os {
            code,
            message: message.into(),
        }
    }
}

/// The application identity or activation endpoint was not (or could not be) registered.
///
/// Fatal at the call site: every notification operation depends on registration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistrationError {
    #[error("the application identity must be registered first")]
    IdentityNotRegistered,

    #[error("the activation endpoint must be registered first")]
    ActivatorNotRegistered,

    #[error("invalid application identity: {0}")]
    InvalidIdentity(String),

    #[error("registration rejected by the platform: {0}")]
    Platform(#[from] PlatformError),
}

/// Error returned by notification operations that need registration and a platform call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ToastError {
    #[error(transparent)]
    Registration(#[from] RegistrationError),

    #[error(transparent)]
    Platform(#[from] PlatformError),
}

#[cfg(windows)]
impl From<windows::core::Error> for PlatformError {
    fn from(error: windows::core::Error) -> Self {
        Self::os(error.code().0, error.message())
    }
}
