use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::{clock::Clock, config::AppConfig, payment::SimulatedGateway, storage::AssetStore};

#[derive(Clone)]
pub struct AppState {
    pub orm: DatabaseConnection,
    pub config: Arc<AppConfig>,
    pub clock: Clock,
    pub gateway: SimulatedGateway,
    pub assets: AssetStore,
}

impl AppState {
    pub fn new(orm: DatabaseConnection, config: AppConfig) -> Self {
        let gateway = SimulatedGateway::new(config.payment_gateway);
        let assets = AssetStore::new(config.storage_root.clone());
        Self {
            orm,
            config: Arc::new(config),
            clock: Clock::System,
            gateway,
            assets,
        }
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }
}
