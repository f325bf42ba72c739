//! Explicit bundle of the stores a view needs, built once at start.

use crate::domain::logging::{LogComponent, get_logger};
use crate::domain::notifications::NotificationCenter;
use crate::domain::portfolio::PortfolioApi;
use crate::domain::query::QueryCache;
use crate::domain::runtime::{Scheduler, Spawner};
use crate::domain::session::{DurableStorage, SessionStore};
use crate::infrastructure::config::AppConfig;
use std::rc::Rc;

#[derive(Clone)]
pub struct AppContext {
    pub config: AppConfig,
    pub session: SessionStore,
    pub notifications: NotificationCenter,
    pub queries: QueryCache,
    pub api: Rc<dyn PortfolioApi>,
    spawner: Rc<dyn Spawner>,
}

impl AppContext {
    pub fn new(
        config: AppConfig,
        storage: Rc<dyn DurableStorage>,
        api: Rc<dyn PortfolioApi>,
        spawner: Rc<dyn Spawner>,
        scheduler: Rc<dyn Scheduler>,
    ) -> Self {
        Self {
            session: SessionStore::new(storage, config.session_storage_key.clone()),
            notifications: NotificationCenter::new(scheduler, config.notification_duration),
            queries: QueryCache::new(spawner.clone()),
            api,
            spawner,
            config,
        }
    }

    /// Wires the stores to `localStorage`, `setTimeout` and the REST backend.
    #[cfg(target_arch = "wasm32")]
    pub fn browser(config: AppConfig) -> Result<Self, crate::domain::errors::StorageError> {
        use crate::infrastructure::http::GlooPortfolioApi;
        use crate::infrastructure::runtime::{BrowserScheduler, BrowserSpawner};
        use crate::infrastructure::storage::LocalStorage;

        let api = GlooPortfolioApi::new(config.backend_url.clone());
        Ok(Self::new(
            config,
            Rc::new(LocalStorage::open()?),
            Rc::new(api),
            Rc::new(BrowserSpawner),
            Rc::new(BrowserScheduler),
        ))
    }

    pub fn spawner(&self) -> Rc<dyn Spawner> {
        self.spawner.clone()
    }

    /// Starts session hydration. Call once, before the first render.
    pub fn init(&self) {
        get_logger().info(
            LogComponent::Application("AppContext"),
            &format!("🚀 Starting against {}", self.config.backend_url),
        );
        self.session.init(self.spawner.as_ref());
    }

    /// Cancels pending timers and drops cached queries and listeners.
    pub fn dispose(&self) {
        self.notifications.dispose();
        self.queries.dispose();
        self.session.dispose();
        get_logger().info(LogComponent::Application("AppContext"), "🛑 Context disposed");
    }
}
