//! Menu-driven dynamic route store
//!
//! Owns everything derived from the backend menu tree: the registered
//! dynamic routes and their removers, the keep-alive cache and the
//! active menu entry. `load_routes` is guarded by an async mutex so
//! concurrent first navigations fetch the menu tree only once.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::{Mutex, RwLock};
use starlight_api::{ApiClient, FrameworkOps};
use tracing::{debug, info};

use crate::builder::{Menu, build_routes};
use crate::error::Result;
use crate::route::{RouteRecord, ViewRegistry, sentinel};
use crate::router::{RouteRemover, RouteTable};

pub struct DynamicRouteStore {
    api: Arc<ApiClient>,
    ops: FrameworkOps,
    table: RouteTable,
    views: Arc<ViewRegistry>,
    fetched: AtomicBool,
    menus: RwLock<Vec<Menu>>,
    removers: Mutex<Vec<RouteRemover>>,
    cached_routes: RwLock<BTreeSet<String>>,
    active_route: RwLock<Option<String>>,
    fetch_lock: tokio::sync::Mutex<()>,
}

impl DynamicRouteStore {
    pub fn new(
        api: Arc<ApiClient>,
        ops: FrameworkOps,
        table: RouteTable,
        views: Arc<ViewRegistry>,
    ) -> Self {
        Self {
            api,
            ops,
            table,
            views,
            fetched: AtomicBool::new(false),
            menus: RwLock::new(Vec::new()),
            removers: Mutex::new(Vec::new()),
            cached_routes: RwLock::new(BTreeSet::new()),
            active_route: RwLock::new(None),
            fetch_lock: tokio::sync::Mutex::new(()),
        }
    }

    pub fn is_fetched(&self) -> bool {
        self.fetched.load(Ordering::SeqCst)
    }

    pub fn menus(&self) -> Vec<Menu> {
        self.menus.read().clone()
    }

    /// Fetch the menu tree and register its routes.
    ///
    /// Safe to call from concurrent navigations; only the first caller
    /// performs the fetch.
    pub async fn load_routes(&self) -> Result<()> {
        let _fetching = self.fetch_lock.lock().await;
        if self.is_fetched() {
            return Ok(());
        }

        let response = self
            .api
            .execute_op::<Vec<Menu>>(&self.ops.fetch_user_menus, None)
            .await?;
        let menus = response.data;
        let records = build_routes(&menus, "/", &self.views);

        let mut removers = Vec::with_capacity(records.len() + 1);
        if let Some(first) = records.first() {
            removers.push(self.table.add_route(
                &RouteRecord::new(sentinel::HOME_PATH)
                    .with_name(sentinel::HOME_NAME)
                    .with_redirect(&first.path),
            ));
        }
        for record in &records {
            removers.push(self.table.add_route(record));
        }

        info!("registered {} dynamic route trees", records.len());
        self.removers.lock().extend(removers);
        *self.menus.write() = menus;
        self.fetched.store(true, Ordering::SeqCst);
        Ok(())
    }

    /// Add a route name to the keep-alive cache; idempotent
    pub fn cache_route(&self, name: &str) {
        self.cached_routes.write().insert(name.to_string());
    }

    /// Remove a route name from the keep-alive cache; idempotent
    pub fn uncache_route(&self, name: &str) {
        self.cached_routes.write().remove(name);
    }

    pub fn cached_routes(&self) -> Vec<String> {
        self.cached_routes.read().iter().cloned().collect()
    }

    pub fn set_active_route(&self, route: Option<String>) {
        *self.active_route.write() = route;
    }

    pub fn active_route(&self) -> Option<String> {
        self.active_route.read().clone()
    }

    /// Take every dynamic route back out; each remover fires once
    pub fn remove_all_routes(&self) {
        let removers: Vec<RouteRemover> = std::mem::take(&mut *self.removers.lock());
        debug!("removing {} dynamic route registrations", removers.len());
        for remover in removers {
            remover.remove();
        }
    }

    /// Forget the menu tree, cache and fetch state
    pub fn clear_menus(&self) {
        *self.menus.write() = Vec::new();
        self.cached_routes.write().clear();
        *self.active_route.write() = None;
        self.fetched.store(false, Ordering::SeqCst);
    }

    /// Full teardown back to the static-only state
    pub fn reset(&self) {
        self.remove_all_routes();
        self.clear_menus();
    }
}
