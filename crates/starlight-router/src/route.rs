//! Route records, metadata and the view registry
//!
//! Views are opaque handles: the router never renders anything, it
//! only resolves which view a path maps to. The registry is populated
//! by the embedding application with the view paths it actually ships.

use std::collections::HashSet;

use parking_lot::RwLock;

/// Well-known routes the navigation logic refers to by name or path
pub mod sentinel {
    pub const HOME_PATH: &str = "/home";
    pub const LOGIN_PATH: &str = "/login";
    pub const NOT_FOUND_PATH: &str = "/404";
    pub const FORBIDDEN_PATH: &str = "/403";
    pub const REDIRECT_PATH: &str = "/redirect";

    pub const HOME_NAME: &str = "home";
    pub const LOGIN_NAME: &str = "login";
    pub const NOT_FOUND_NAME: &str = "notFound";
    pub const FORBIDDEN_NAME: &str = "forbidden";
    pub const REDIRECT_NAME: &str = "redirect";
    pub const SSO_LOGIN_NAME: &str = "ssoLogin";

    /// Routes that never become a post-login redirect target,
    /// identified by name so the not-found fallback is covered no
    /// matter which path fell into it
    pub const NO_REDIRECT_NAMES: [&str; 3] = [FORBIDDEN_NAME, NOT_FOUND_NAME, HOME_NAME];
}

/// Per-route metadata driving guard and menu behavior
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RouteMeta {
    pub title: Option<String>,
    pub icon: Option<String>,
    pub keep_alive: bool,
    pub top_level: bool,
    pub hidden: bool,
    /// Menu entry to highlight when this route itself is hidden
    pub active_menu: Option<String>,
    pub ignore_authentication: bool,
}

/// Opaque handle to a registered view
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ComponentRef(String);

impl ComponentRef {
    pub fn new(path: &str) -> Self {
        Self(path.to_string())
    }

    /// The shared page layout wrapping top-level routes
    pub fn layout() -> Self {
        Self("layout".to_string())
    }

    pub fn path(&self) -> &str {
        &self.0
    }
}

/// One route definition, possibly nested
#[derive(Clone, Debug)]
pub struct RouteRecord {
    pub path: String,
    pub name: Option<String>,
    pub component: Option<ComponentRef>,
    pub redirect: Option<String>,
    pub meta: RouteMeta,
    pub children: Vec<RouteRecord>,
    /// Pass path parameters to the view
    pub props: bool,
}

impl RouteRecord {
    pub fn new(path: &str) -> Self {
        Self {
            path: path.to_string(),
            name: None,
            component: None,
            redirect: None,
            meta: RouteMeta::default(),
            children: Vec::new(),
            props: false,
        }
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    pub fn with_component(mut self, component: ComponentRef) -> Self {
        self.component = Some(component);
        self
    }

    pub fn with_redirect(mut self, target: &str) -> Self {
        self.redirect = Some(target.to_string());
        self
    }

    pub fn with_meta(mut self, meta: RouteMeta) -> Self {
        self.meta = meta;
        self
    }

    pub fn with_children(mut self, children: Vec<RouteRecord>) -> Self {
        self.children = children;
        self
    }

    pub fn with_props(mut self, props: bool) -> Self {
        self.props = props;
        self
    }
}

/// Normalize a view or route path: leading slash, no duplicate slashes
pub fn normalize_path(path: &str) -> String {
    let mut result = String::with_capacity(path.len() + 1);
    result.push('/');
    for segment in path.split('/').filter(|s| !s.is_empty()) {
        if !result.ends_with('/') {
            result.push('/');
        }
        result.push_str(segment);
    }
    if result.len() > 1 && result.ends_with('/') {
        result.pop();
    }
    result
}

/// Join a child path onto a base; an absolute child wins
pub fn join_paths(base: &str, child: &str) -> String {
    if child.starts_with('/') {
        normalize_path(child)
    } else {
        normalize_path(&format!("{base}/{child}"))
    }
}

/// Registry of the views the application ships
#[derive(Default)]
pub struct ViewRegistry {
    views: RwLock<HashSet<String>>,
}

impl ViewRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, path: &str) {
        self.views.write().insert(normalize_path(path));
    }

    pub fn register_all<'a>(&self, paths: impl IntoIterator<Item = &'a str>) {
        let mut views = self.views.write();
        for path in paths {
            views.insert(normalize_path(path));
        }
    }

    pub fn lookup(&self, path: &str) -> Option<ComponentRef> {
        let normalized = normalize_path(path);
        self.views
            .read()
            .contains(&normalized)
            .then(|| ComponentRef::new(&normalized))
    }
}
