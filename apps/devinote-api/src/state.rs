use std::sync::Arc;

use devinote_config::Config;
use devinote_service::DevinoteService;
use devinote_storage::db::Db;

#[derive(Clone)]
pub struct AppState {
	pub service: Arc<DevinoteService>,
}
impl AppState {
	/// Connects to Postgres and brings the schema up to date.
	pub async fn new(config: Config) -> color_eyre::Result<Self> {
		let db = Db::connect(&config.storage.postgres).await?;

		db.ensure_schema().await?;

		Ok(Self::with_db(config, db))
	}

	pub fn with_db(config: Config, db: Db) -> Self {
		Self { service: Arc::new(DevinoteService::new(config, db)) }
	}
}
