//! Dynamic route construction from backend menu definitions
//!
//! The menu tree the backend returns is translated depth-first into
//! route records. Every branch renders the shared layout; a top-level
//! leaf keeps its own path as the wrapper's first child so the layout
//! renders around it. Output is deterministic for a given menu tree
//! and view registry.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::route::{
    ComponentRef, RouteMeta, RouteRecord, ViewRegistry, join_paths, normalize_path,
};

/// One menu entry as served by the backend
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Menu {
    pub id: i64,
    pub parent_id: Option<i64>,
    pub name: String,
    pub component_name: Option<String>,
    pub uri: String,
    pub redirect_uri: Option<String>,
    pub icon: Option<String>,
    pub top_level: bool,
    pub keep_alive: bool,
    pub hidden: bool,
    /// Path parameter names, appended to the route path in order
    pub params: Vec<String>,
    pub children: Vec<Menu>,
}

fn append_params(path: &str, params: &[String]) -> String {
    let mut result = path.to_string();
    for param in params {
        result.push_str("/:");
        result.push_str(param);
    }
    result
}

/// Build route records from a menu tree rooted under `base_path`
pub fn build_routes(menus: &[Menu], base_path: &str, views: &ViewRegistry) -> Vec<RouteRecord> {
    menus
        .iter()
        .map(|menu| build_route(menu, base_path, views))
        .collect()
}

fn build_route(menu: &Menu, base: &str, views: &ViewRegistry) -> RouteRecord {
    let path = join_paths(base, &menu.uri);

    if !menu.children.is_empty() {
        // Every branch renders the shared layout, nested or not
        let children = build_routes(&menu.children, &path, views);
        let mut record = RouteRecord::new(&path)
            .with_component(ComponentRef::layout())
            .with_children(children)
            .with_meta(RouteMeta {
                title: Some(menu.name.clone()),
                icon: menu.icon.clone(),
                top_level: menu.top_level,
                hidden: menu.hidden,
                ..RouteMeta::default()
            });
        if let Some(target) = &menu.redirect_uri {
            record = record.with_redirect(&join_paths(&path, target));
        }
        return record;
    }

    if menu.top_level {
        // A standalone top-level page still renders inside the layout
        let leaf = leaf_record(menu, base, views);
        let full = append_params(&path, &menu.params);
        return RouteRecord::new(&full)
            .with_component(ComponentRef::layout())
            .with_children(vec![leaf]);
    }

    leaf_record(menu, base, views)
}

fn leaf_record(menu: &Menu, base: &str, views: &ViewRegistry) -> RouteRecord {
    let path = append_params(&join_paths(base, &menu.uri), &menu.params);
    let view_path = if menu.uri.starts_with('/') {
        normalize_path(&menu.uri)
    } else {
        join_paths(base, &menu.uri)
    };

    let component = views.lookup(&view_path);
    if component.is_none() {
        warn!("no view registered for {view_path}, route {path} gets no component");
    }

    let mut record = RouteRecord::new(&path).with_meta(RouteMeta {
        title: Some(menu.name.clone()),
        icon: menu.icon.clone(),
        keep_alive: menu.keep_alive,
        top_level: menu.top_level,
        hidden: menu.hidden,
        ..RouteMeta::default()
    });
    if let Some(name) = menu.component_name.as_deref().filter(|n| !n.is_empty()) {
        record = record.with_name(name);
    }
    if let Some(component) = component {
        record = record.with_component(component);
    }
    record.with_props(!menu.params.is_empty())
}
