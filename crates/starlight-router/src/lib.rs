//! Starlight navigation layer
//!
//! This crate provides:
//! - The route table with dynamic registration and removal
//! - The navigation guard pipeline (authentication, dynamic route
//!   loading, keep-alive bookkeeping)
//! - The session stores and the coordinator reacting to classified
//!   API failures
//! - `ConsoleApp`, the wired-together object graph

pub mod app;
pub mod builder;
pub mod error;
pub mod guards;
pub mod route;
pub mod router;
pub mod session;
pub mod store;

pub use app::ConsoleApp;
pub use builder::{Menu, build_routes};
pub use error::{Result, RouterError};
pub use guards::{
    AfterHook, AuthenticationGuard, GuardOutcome, KeepAliveHook, NavigationGuard,
    RoutesLoadingGuard, login_redirect_target,
};
pub use route::{ComponentRef, RouteMeta, RouteRecord, ViewRegistry, sentinel};
pub use router::{
    NavigationOutcome, ResolvedRoute, RouteRemover, RouteTable, Router, base_routes,
};
pub use session::SessionCoordinator;
pub use store::{
    AUTHENTICATION_PREFIX, AuthenticationStore, DynamicRouteStore, UserInfo, UserInfoStore,
};
