//! Starlight API layer
//!
//! This crate provides:
//! - A declarative descriptor registry mapping `module.operation`
//!   keys to URI templates, verbs, and fixed parameters
//! - A request executor with path templating, fixed/dynamic merging,
//!   and duplicate-request cancellation
//! - The response interceptor classifying envelope and transport
//!   failures and driving their side effects

pub mod descriptor;
pub mod error;
pub mod executor;
pub mod framework;
pub mod interceptor;
pub mod model;
pub mod request;

pub use descriptor::{ApiDescriptor, ApiModule, ApiRegistry};
pub use error::ApiError;
pub use executor::ApiClient;
pub use framework::{FrameworkOps, register_framework_modules};
pub use interceptor::{
    ApiEventHandler, FailureKind, NotifyOnlyHandler, classify, notify_envelope_failure,
    notify_transport_error,
};
pub use model::{ApiResponse, ParamValue, RequestMethod};
pub use request::{ApiRequest, MergedRequest, merge_request, resolve_uri};
