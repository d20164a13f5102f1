use thiserror::Error;

/// Top-level error type used across the entire application.
///
/// None of these ever reach the display layer: the core converts every one
/// of them into an "unavailable" value at the lowest layer that sees it.
#[derive(Debug, Error)]
pub enum HudError {
    #[error("config error: {0}")]
    Config(String),

    /// No temperature backend could be resolved.
    #[error("no temperature provider available")]
    ProviderUnavailable,

    /// A resolved provider failed on a single read.
    #[error("sensor read failed on {provider}: {reason}")]
    SensorRead {
        provider: &'static str,
        reason:   String,
    },

    #[error("frame source error: {0}")]
    FrameSource(String),

    #[error("GPU unavailable: {0}")]
    GpuUnavailable(String),

    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl HudError {
    /// Shorthand for building a [`HudError::SensorRead`].
    pub fn sensor(provider: &'static str, reason: impl Into<String>) -> Self {
        Self::SensorRead {
            provider,
            reason: reason.into(),
        }
    }
}

pub type Result<T, E = HudError> = std::result::Result<T, E>;
