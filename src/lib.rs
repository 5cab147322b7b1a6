pub mod auth;
pub mod config;
pub mod export;
pub mod fields;
pub mod generate;
pub mod observability;
pub mod rest;
pub mod storage;

use std::sync::Arc;

use config::SynthdConfig;
use generate::Generate;
use storage::Storage;

/// Shared application state passed to every route handler.
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<SynthdConfig>,
    pub storage: Arc<Storage>,
    /// The configured generation backend (local synthesizer or remote
    /// completion provider) behind one interface.
    pub generator: Arc<dyn Generate>,
    pub started_at: std::time::Instant,
}

impl AppContext {
    pub async fn new(config: SynthdConfig) -> anyhow::Result<Self> {
        let storage = Arc::new(Storage::new(&config.data_dir).await?);
        let generator = generate::backend_from_config(&config.provider, &config.generation);
        Ok(Self {
            config: Arc::new(config),
            storage,
            generator,
            started_at: std::time::Instant::now(),
        })
    }
}
