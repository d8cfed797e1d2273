//! Route table and navigation entry points
//!
//! The table is flat: nested records are compiled into full-path
//! entries at registration time. Dynamic registrations return a
//! remover handle that takes the whole registered subtree back out in
//! one call. `push`/`replace` run the guard pipeline; a guard redirect
//! restarts the pipeline on the new target up to a bounded depth.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;
use starlight_common::Notifier;
use tracing::{debug, warn};

use crate::guards::{AfterHook, GuardOutcome, NavigationGuard};
use crate::route::{RouteMeta, RouteRecord, join_paths, normalize_path, sentinel};

/// Restarts of the guard pipeline allowed for one navigation
const MAX_REDIRECTS: usize = 8;

/// Internal redirect hops allowed while resolving one path
const MAX_RESOLVE_HOPS: usize = 8;

#[derive(Clone, Debug, PartialEq, Eq)]
enum Segment {
    Static(String),
    Param(String),
}

#[derive(Clone, Debug)]
struct CompiledRoute {
    segments: Vec<Segment>,
    name: Option<String>,
    redirect: Option<String>,
    meta: RouteMeta,
    dynamic_id: Option<u64>,
}

fn compile_segments(path: &str) -> Vec<Segment> {
    path.split('/')
        .filter(|s| !s.is_empty())
        .map(|s| match s.strip_prefix(':') {
            Some(name) => Segment::Param(name.to_string()),
            None => Segment::Static(s.to_string()),
        })
        .collect()
}

fn match_segments(
    pattern: &[Segment],
    path: &[&str],
) -> Option<(usize, BTreeMap<String, String>)> {
    if pattern.len() != path.len() {
        return None;
    }
    let mut statics = 0;
    let mut params = BTreeMap::new();
    for (segment, actual) in pattern.iter().zip(path) {
        match segment {
            Segment::Static(s) if s == actual => statics += 1,
            Segment::Static(_) => return None,
            Segment::Param(name) => {
                params.insert(name.clone(), (*actual).to_string());
            }
        }
    }
    Some((statics, params))
}

/// The route a navigation resolved to
#[derive(Clone, Debug)]
pub struct ResolvedRoute {
    /// Normalized path, without query
    pub path: String,
    /// Path plus query as requested
    pub full_path: String,
    pub name: Option<String>,
    pub params: BTreeMap<String, String>,
    pub query: BTreeMap<String, String>,
    pub meta: RouteMeta,
    /// Original target when this resolution came from a redirect or
    /// the not-found fallback
    pub redirected_from: Option<String>,
    /// False when this is the not-found fallback
    pub matched: bool,
}

impl ResolvedRoute {
    fn initial() -> Self {
        Self {
            path: "/".to_string(),
            full_path: "/".to_string(),
            name: None,
            params: BTreeMap::new(),
            query: BTreeMap::new(),
            meta: RouteMeta::default(),
            redirected_from: None,
            matched: false,
        }
    }
}

/// Removes one dynamic registration; consumed on use
pub struct RouteRemover {
    routes: Arc<RwLock<Vec<CompiledRoute>>>,
    id: u64,
}

impl RouteRemover {
    pub fn remove(self) {
        self.routes
            .write()
            .retain(|route| route.dynamic_id != Some(self.id));
    }
}

/// Shared flat route table
#[derive(Clone)]
pub struct RouteTable {
    routes: Arc<RwLock<Vec<CompiledRoute>>>,
    next_id: Arc<AtomicU64>,
}

impl RouteTable {
    fn new(static_routes: &[RouteRecord]) -> Self {
        let table = Self {
            routes: Arc::new(RwLock::new(Vec::new())),
            next_id: Arc::new(AtomicU64::new(1)),
        };
        let mut routes = table.routes.write();
        for record in static_routes {
            compile_into(&mut routes, record, "/", None);
        }
        drop(routes);
        table
    }

    /// Register a record (and its children); the remover takes the
    /// whole subtree back out
    pub fn add_route(&self, record: &RouteRecord) -> RouteRemover {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        compile_into(&mut self.routes.write(), record, "/", Some(id));
        debug!("registered route {} (id {})", record.path, id);
        RouteRemover {
            routes: self.routes.clone(),
            id,
        }
    }

    pub fn has_path(&self, path: &str) -> bool {
        self.resolve(path).matched
    }

    /// Resolve a target (path plus optional query) against the table
    pub fn resolve(&self, target: &str) -> ResolvedRoute {
        let (path_part, query_part) = match target.split_once('?') {
            Some((p, q)) => (p, Some(q)),
            None => (target, None),
        };
        let full_path = target.to_string();
        let query: BTreeMap<String, String> = query_part
            .map(|q| {
                url::form_urlencoded::parse(q.as_bytes())
                    .map(|(k, v)| (k.into_owned(), v.into_owned()))
                    .collect()
            })
            .unwrap_or_default();

        let mut path = normalize_path(path_part);
        let routes = self.routes.read();

        for _ in 0..MAX_RESOLVE_HOPS {
            let pieces: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
            let mut best: Option<(usize, &CompiledRoute, BTreeMap<String, String>)> = None;
            for route in routes.iter() {
                if let Some((statics, params)) = match_segments(&route.segments, &pieces) {
                    // Later registrations win ties so dynamic routes
                    // can shadow static ones
                    if best.as_ref().is_none_or(|(score, _, _)| statics >= *score) {
                        best = Some((statics, route, params));
                    }
                }
            }

            match best {
                Some((_, route, params)) => match &route.redirect {
                    Some(next) => path = normalize_path(next),
                    None => {
                        return ResolvedRoute {
                            path: path.clone(),
                            full_path: full_path.clone(),
                            name: route.name.clone(),
                            params,
                            query,
                            meta: route.meta.clone(),
                            redirected_from: (path != normalize_path(path_part))
                                .then(|| full_path.clone()),
                            matched: true,
                        };
                    }
                },
                None => break,
            }
        }

        ResolvedRoute {
            path,
            full_path: full_path.clone(),
            name: Some(sentinel::NOT_FOUND_NAME.to_string()),
            params: BTreeMap::new(),
            query,
            meta: RouteMeta::default(),
            redirected_from: Some(full_path),
            matched: false,
        }
    }
}

fn compile_into(
    routes: &mut Vec<CompiledRoute>,
    record: &RouteRecord,
    base: &str,
    dynamic_id: Option<u64>,
) {
    let path = join_paths(base, &record.path);
    routes.push(CompiledRoute {
        segments: compile_segments(&path),
        name: record.name.clone(),
        redirect: record.redirect.clone(),
        meta: record.meta.clone(),
        dynamic_id,
    });
    for child in &record.children {
        compile_into(routes, child, &path, dynamic_id);
    }
}

/// Result of running one navigation through the pipeline
#[derive(Clone, Debug)]
pub enum NavigationOutcome {
    /// Navigation committed; this is the new current route
    Done(ResolvedRoute),
    /// A guard denied or errored; the current route is unchanged
    Cancelled,
}

/// Static routes every deployment carries
pub fn base_routes() -> Vec<RouteRecord> {
    let hidden = RouteMeta {
        hidden: true,
        ..RouteMeta::default()
    };
    vec![
        RouteRecord::new("/").with_redirect(sentinel::HOME_PATH),
        RouteRecord::new(sentinel::LOGIN_PATH)
            .with_name(sentinel::LOGIN_NAME)
            .with_meta(hidden.clone()),
        RouteRecord::new("/ssoLogin")
            .with_name(sentinel::SSO_LOGIN_NAME)
            .with_meta(hidden.clone()),
        RouteRecord::new(sentinel::REDIRECT_PATH)
            .with_name(sentinel::REDIRECT_NAME)
            .with_meta(hidden.clone()),
        RouteRecord::new(sentinel::NOT_FOUND_PATH)
            .with_name(sentinel::NOT_FOUND_NAME)
            .with_meta(hidden.clone()),
        RouteRecord::new(sentinel::FORBIDDEN_PATH)
            .with_name(sentinel::FORBIDDEN_NAME)
            .with_meta(hidden),
    ]
}

/// Navigation entry point owning the guard pipeline
pub struct Router {
    table: RouteTable,
    notifier: Arc<dyn Notifier>,
    current: RwLock<ResolvedRoute>,
    guards: RwLock<Vec<Arc<dyn NavigationGuard>>>,
    after_hooks: RwLock<Vec<Arc<dyn AfterHook>>>,
}

impl Router {
    pub fn new(static_routes: Vec<RouteRecord>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            table: RouteTable::new(&static_routes),
            notifier,
            current: RwLock::new(ResolvedRoute::initial()),
            guards: RwLock::new(Vec::new()),
            after_hooks: RwLock::new(Vec::new()),
        }
    }

    /// Handle for registering and resolving routes without the router
    pub fn table(&self) -> RouteTable {
        self.table.clone()
    }

    /// Append a guard; guards run in registration order
    pub fn add_guard(&self, guard: Arc<dyn NavigationGuard>) {
        self.guards.write().push(guard);
    }

    pub fn add_after_hook(&self, hook: Arc<dyn AfterHook>) {
        self.after_hooks.write().push(hook);
    }

    /// Snapshot of the committed route
    pub fn current_route(&self) -> ResolvedRoute {
        self.current.read().clone()
    }

    pub fn resolve(&self, target: &str) -> ResolvedRoute {
        self.table.resolve(target)
    }

    pub async fn push(&self, target: &str) -> NavigationOutcome {
        self.navigate(target).await
    }

    /// Navigate without keeping the previous route in history
    pub async fn replace(&self, target: &str) -> NavigationOutcome {
        self.navigate(target).await
    }

    async fn navigate(&self, target: &str) -> NavigationOutcome {
        let from = self.current_route();
        let mut target = target.to_string();
        let mut redirected_from: Option<String> = None;

        'pipeline: for _ in 0..MAX_REDIRECTS {
            let mut to = self.table.resolve(&target);
            if to.redirected_from.is_none() {
                to.redirected_from = redirected_from.clone();
            }

            let guards = self.guards.read().clone();
            for guard in guards {
                match guard.before(&to, &from).await {
                    Ok(GuardOutcome::Allow) => {}
                    Ok(GuardOutcome::Redirect(next)) => {
                        debug!("guard {} redirected {} -> {}", guard.name(), target, next);
                        redirected_from = Some(to.full_path.clone());
                        target = next;
                        continue 'pipeline;
                    }
                    Ok(GuardOutcome::Deny) => {
                        debug!("guard {} denied navigation to {}", guard.name(), target);
                        return NavigationOutcome::Cancelled;
                    }
                    Err(e) => {
                        warn!("guard {} failed while navigating to {}: {}", guard.name(), target, e);
                        self.notifier
                            .error("Navigation", &format!("Navigation failed: {e}"));
                        return NavigationOutcome::Cancelled;
                    }
                }
            }

            *self.current.write() = to.clone();
            let hooks = self.after_hooks.read().clone();
            for hook in hooks {
                hook.after(&to, &from);
            }
            return NavigationOutcome::Done(to);
        }

        warn!("redirect limit exceeded while navigating to {}", target);
        self.notifier
            .error("Navigation", "Navigation aborted: too many redirects.");
        NavigationOutcome::Cancelled
    }
}
