//! Spoor client — builds tracking-event parameters from inbound web requests.
//!
//! # Modules
//!
//! - [`builder`] — Parameter builder and the factory that shares configuration
//! - [`request`] — Request abstraction, cookie parsing and an in-memory request
//! - [`http`] — Request abstraction for `http::Request` / `http::request::Parts`

pub mod builder;
pub mod http;
pub mod request;

pub use builder::{ParameterBuilder, ParameterBuilderFactory};
pub use request::{Cookie, RawRequest, SpoorRequest};
pub use spoor_core::{
    Context, Device, FunnelStepData, ParameterSnapshot, SpoorConfig, SpoorError, SpoorResult, User,
};
