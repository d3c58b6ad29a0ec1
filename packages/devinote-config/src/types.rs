use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Config {
	pub service: Service,
	pub storage: Storage,
	pub security: Security,
	#[serde(default)]
	pub pagination: Pagination,
}

#[derive(Debug, Deserialize)]
pub struct Service {
	pub http_bind: String,
	pub log_level: String,
	/// Origins allowed by CORS. Empty means any origin.
	#[serde(default)]
	pub cors_allow_origins: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct Storage {
	pub postgres: Postgres,
}

#[derive(Debug, Deserialize)]
pub struct Postgres {
	pub dsn: String,
	pub pool_max_conns: u32,
}

#[derive(Debug, Deserialize)]
pub struct Security {
	/// HS256 signing secret for access tokens.
	pub jwt_secret: String,
	pub jwt_expires_minutes: i64,
	#[serde(default = "default_bind_localhost_only")]
	pub bind_localhost_only: bool,
}

#[derive(Debug, Deserialize)]
pub struct Pagination {
	#[serde(default = "default_per_page")]
	pub default_per_page: u32,
	#[serde(default = "default_max_per_page")]
	pub max_per_page: u32,
}
impl Default for Pagination {
	fn default() -> Self {
		Self { default_per_page: default_per_page(), max_per_page: default_max_per_page() }
	}
}

fn default_bind_localhost_only() -> bool {
	true
}

fn default_per_page() -> u32 {
	10
}

fn default_max_per_page() -> u32 {
	100
}
