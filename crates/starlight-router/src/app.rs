//! Console assembly
//!
//! Wires the configuration, API client, messaging client, stores,
//! guards and coordinator into one object graph. Construction order
//! matters: the event handler is installed on the API client last
//! because it needs the router and stores the client's calls feed.

use std::sync::Arc;

use starlight_api::{ApiClient, ApiRegistry, FrameworkOps, register_framework_modules};
use starlight_common::{AppConfig, Notifier, SessionTokens, StorageBackend};
use starlight_messaging::{MessagingClient, MessagingConfig};

use crate::error::Result;
use crate::guards::{AuthenticationGuard, KeepAliveHook, RoutesLoadingGuard};
use crate::route::ViewRegistry;
use crate::router::{Router, base_routes};
use crate::session::SessionCoordinator;
use crate::store::{AuthenticationStore, DynamicRouteStore, UserInfoStore};

/// The fully wired console client
pub struct ConsoleApp {
    pub config: Arc<AppConfig>,
    pub tokens: Arc<SessionTokens>,
    pub api: Arc<ApiClient>,
    pub messaging: Arc<MessagingClient>,
    pub views: Arc<ViewRegistry>,
    pub router: Arc<Router>,
    pub auth: Arc<AuthenticationStore>,
    pub user_info: Arc<UserInfoStore>,
    pub routes: Arc<DynamicRouteStore>,
}

impl ConsoleApp {
    pub fn new(config: AppConfig, notifier: Arc<dyn Notifier>) -> Result<Arc<Self>> {
        Self::with_registry(
            config,
            notifier,
            register_framework_modules(ApiRegistry::new()),
            FrameworkOps::default(),
        )
    }

    /// Assemble with a custom registry (framework modules plus the
    /// application's own) and remapped framework operation keys
    pub fn with_registry(
        config: AppConfig,
        notifier: Arc<dyn Notifier>,
        registry: ApiRegistry,
        ops: FrameworkOps,
    ) -> Result<Arc<Self>> {
        let config = Arc::new(config);
        let tokens = Arc::new(SessionTokens::new());
        let api = Arc::new(ApiClient::new(
            &config,
            tokens.clone(),
            notifier.clone(),
            Arc::new(registry),
        )?);
        let messaging = Arc::new(MessagingClient::new(
            MessagingConfig::new(&config.instant_message_server_url),
            notifier.clone(),
        ));
        let views = Arc::new(ViewRegistry::new());
        let router = Arc::new(Router::new(base_routes(), notifier.clone()));

        let routes = Arc::new(DynamicRouteStore::new(
            api.clone(),
            ops.clone(),
            router.table(),
            views.clone(),
        ));
        let user_info = Arc::new(UserInfoStore::new(
            api.clone(),
            ops.clone(),
            messaging.clone(),
            tokens.clone(),
        ));
        let auth = Arc::new(AuthenticationStore::new(
            StorageBackend::Session,
            tokens.clone(),
            api.clone(),
            ops,
            user_info.clone(),
            routes.clone(),
            messaging.clone(),
        ));

        router.add_guard(Arc::new(AuthenticationGuard::new(
            config.clone(),
            auth.clone(),
            user_info.clone(),
        )));
        router.add_guard(Arc::new(RoutesLoadingGuard::new(
            config.clone(),
            auth.clone(),
            routes.clone(),
        )));
        router.add_after_hook(Arc::new(KeepAliveHook::new(routes.clone())));

        api.set_event_handler(Arc::new(SessionCoordinator::new(
            auth.clone(),
            router.clone(),
            notifier,
        )));

        Ok(Arc::new(Self {
            config,
            tokens,
            api,
            messaging,
            views,
            router,
            auth,
            user_info,
            routes,
        }))
    }
}
