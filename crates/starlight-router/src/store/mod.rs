//! Session-scoped stores
//!
//! Explicit context objects, constructed once at startup and shared as
//! `Arc`s; there is no global state.

mod authentication;
mod dynamic_route;
mod user_info;

pub use authentication::{AUTHENTICATION_PREFIX, AuthenticationStore};
pub use dynamic_route::DynamicRouteStore;
pub use user_info::{UserInfo, UserInfoStore};
