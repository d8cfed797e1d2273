//! Keep-alive bookkeeping hook
//!
//! After every committed navigation the target's name is added to or
//! removed from the cached-view set depending on its `keep_alive`
//! flag. Both operations are idempotent. The hook also tracks which
//! menu entry is active, honoring `active_menu` for hidden routes.

use std::sync::Arc;

use crate::guards::AfterHook;
use crate::router::ResolvedRoute;
use crate::store::DynamicRouteStore;

pub struct KeepAliveHook {
    routes: Arc<DynamicRouteStore>,
}

impl KeepAliveHook {
    pub fn new(routes: Arc<DynamicRouteStore>) -> Self {
        Self { routes }
    }
}

impl AfterHook for KeepAliveHook {
    fn after(&self, to: &ResolvedRoute, _from: &ResolvedRoute) {
        if let Some(name) = &to.name {
            if to.meta.keep_alive {
                self.routes.cache_route(name);
            } else {
                self.routes.uncache_route(name);
            }
        }

        let active = to.meta.active_menu.clone().unwrap_or_else(|| to.path.clone());
        self.routes.set_active_route(Some(active));
    }
}
