use std::sync::Arc;
use std::time::Instant;

use crate::analytics::AnalyticsService;
use crate::auth::{JwtConfig, JwtService};
use crate::groups::GroupManager;
use crate::messaging::{LogMessageSender, MessageSender};
use crate::notifications::NotificationManager;
use crate::orders::OrderManager;
use crate::prediction::{HistoryPredictor, Predictor};
use crate::profiles::ProfileManager;
use crate::surplus::SurplusManager;
use crate::store::{DocumentStore, MemoryStore, RedbStore, StoreError, TimeoutStore};

use super::{Config, Result};

/// Everything a handler needs, cheap to clone
///
/// | Field | Role |
/// |-------|------|
/// | store | shared document store (redb or demo memory, behind a timeout) |
/// | groups / orders / surplus / notifications / profiles | domain managers |
/// | analytics | dashboard rollups |
/// | predictor | purchase recommendations |
/// | jwt_service | identity token validation |
#[derive(Clone)]
pub struct ServerState {
    pub config: Config,
    pub store: Arc<dyn DocumentStore>,
    pub groups: GroupManager,
    pub orders: OrderManager,
    pub surplus: SurplusManager,
    pub notifications: NotificationManager,
    pub profiles: ProfileManager,
    pub analytics: AnalyticsService,
    pub predictor: Arc<dyn Predictor>,
    pub jwt_service: Arc<JwtService>,
    started_at: Instant,
}

impl std::fmt::Debug for ServerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerState")
            .field("backend", &self.store.backend())
            .field("environment", &self.config.environment)
            .finish()
    }
}

impl ServerState {
    /// Open the configured store and wire the managers onto it.
    ///
    /// Demo mode keeps everything in memory; otherwise the redb file lives
    /// at `DATA_DIR/market.redb`.
    pub async fn initialize(config: &Config) -> Result<Self> {
        config.validate()?;

        let backend: Arc<dyn DocumentStore> = if config.demo_mode {
            tracing::warn!("DEMO_MODE enabled, data is kept in memory only");
            Arc::new(MemoryStore::new())
        } else {
            std::fs::create_dir_all(&config.data_dir)?;
            let path = config.database_path();
            let store = tokio::task::spawn_blocking(move || RedbStore::open(path))
                .await
                .map_err(StoreError::Join)??;
            tracing::info!(path = %config.database_path().display(), "Opened redb store");
            Arc::new(store)
        };
        let store: Arc<dyn DocumentStore> =
            Arc::new(TimeoutStore::new(backend, config.store_timeout()));

        let jwt_config = match &config.jwt_secret {
            Some(secret) => JwtConfig::with_secret(secret.clone())?,
            None => JwtConfig::development()?,
        };

        Ok(Self::with_store(
            config.clone(),
            store,
            JwtService::with_config(jwt_config),
            Arc::new(LogMessageSender),
        ))
    }

    /// Wire the managers onto an existing store
    pub fn with_store(
        config: Config,
        store: Arc<dyn DocumentStore>,
        jwt_service: JwtService,
        messenger: Arc<dyn MessageSender>,
    ) -> Self {
        let groups = GroupManager::new(store.clone());
        let notifications =
            NotificationManager::new(store.clone(), config.notification_poll_interval());
        let orders = OrderManager::new(
            store.clone(),
            groups.clone(),
            notifications.clone(),
            messenger,
            config.order_poll_interval(),
        );
        let surplus = SurplusManager::new(store.clone(), config.reservation_hold());
        let profiles = ProfileManager::new(store.clone());
        let analytics = AnalyticsService::new(store.clone(), profiles.clone());

        Self {
            config,
            store,
            groups,
            orders,
            surplus,
            notifications,
            profiles,
            analytics,
            predictor: Arc::new(HistoryPredictor),
            jwt_service: Arc::new(jwt_service),
            started_at: Instant::now(),
        }
    }

    pub fn jwt_service(&self) -> &JwtService {
        &self.jwt_service
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}
