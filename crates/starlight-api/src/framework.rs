//! Framework operation namespaces
//!
//! The authentication and navigation stores call a handful of
//! well-known operations. Their namespace keys are configuration so a
//! deployment can remap them without touching store code.

use crate::descriptor::{ApiDescriptor, ApiModule, ApiRegistry};

/// Namespace keys for the operations the framework itself performs
#[derive(Clone, Debug)]
pub struct FrameworkOps {
    pub login: String,
    pub logout: String,
    pub fetch_user_info: String,
    pub fetch_user_menus: String,
}

impl Default for FrameworkOps {
    fn default() -> Self {
        Self {
            login: "auth.login".to_string(),
            logout: "auth.logout".to_string(),
            fetch_user_info: "aas.fetchUserInfo".to_string(),
            fetch_user_menus: "aas.fetchUserMenus".to_string(),
        }
    }
}

/// Register the default framework modules on a registry
pub fn register_framework_modules(registry: ApiRegistry) -> ApiRegistry {
    registry
        .register(
            ApiModule::new("auth")
                .operation("login", ApiDescriptor::post("/auth/login"))
                .operation("logout", ApiDescriptor::post("/auth/logout")),
        )
        .register(
            ApiModule::new("aas")
                .operation("fetchUserInfo", ApiDescriptor::get("/user/info"))
                .operation("fetchUserMenus", ApiDescriptor::get("/user/menus")),
        )
}
