pub mod config;
pub mod error;
pub mod types;

pub use config::SpoorConfig;
pub use error::{SpoorError, SpoorResult};
pub use types::{Context, Device, FunnelStepData, ParameterSnapshot, User};
