pub mod error;
pub mod state;

pub use error::{HudError, Result};
pub use state::{CaptureRegion, CpuSnapshot, FpsSnapshot, GpuSnapshot, PLACEHOLDER};
