mod error;
mod types;

pub use error::{Error, Result};
pub use types::{Config, Pagination, Postgres, Security, Service, Storage};

use std::{fs, net::SocketAddr, path::Path};

pub const MIN_JWT_SECRET_BYTES: usize = 32;
pub const MAX_PER_PAGE_CEILING: u32 = 1_000;
/// One year.
pub const MAX_JWT_EXPIRES_MINUTES: i64 = 525_600;

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;
	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);
	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	let http_addr: SocketAddr = cfg.service.http_bind.parse().map_err(|_| Error::Validation {
		message: "service.http_bind must be a socket address.".to_string(),
	})?;

	if cfg.security.bind_localhost_only && !http_addr.ip().is_loopback() {
		return Err(Error::Validation {
			message: "service.http_bind must be a loopback address when security.bind_localhost_only is true."
				.to_string(),
		});
	}
	if cfg.storage.postgres.dsn.trim().is_empty() {
		return Err(Error::Validation {
			message: "storage.postgres.dsn must be non-empty.".to_string(),
		});
	}
	if cfg.storage.postgres.pool_max_conns == 0 {
		return Err(Error::Validation {
			message: "storage.postgres.pool_max_conns must be greater than zero.".to_string(),
		});
	}
	if cfg.security.jwt_secret.len() < MIN_JWT_SECRET_BYTES {
		return Err(Error::Validation {
			message: format!(
				"security.jwt_secret must be at least {MIN_JWT_SECRET_BYTES} bytes long."
			),
		});
	}
	if cfg.security.jwt_expires_minutes <= 0 {
		return Err(Error::Validation {
			message: "security.jwt_expires_minutes must be greater than zero.".to_string(),
		});
	}
	if cfg.security.jwt_expires_minutes > MAX_JWT_EXPIRES_MINUTES {
		return Err(Error::Validation {
			message: format!(
				"security.jwt_expires_minutes must be {MAX_JWT_EXPIRES_MINUTES} or less."
			),
		});
	}
	if cfg.pagination.default_per_page == 0 {
		return Err(Error::Validation {
			message: "pagination.default_per_page must be greater than zero.".to_string(),
		});
	}
	if cfg.pagination.max_per_page < cfg.pagination.default_per_page {
		return Err(Error::Validation {
			message: "pagination.max_per_page must be at least pagination.default_per_page."
				.to_string(),
		});
	}
	if cfg.pagination.max_per_page > MAX_PER_PAGE_CEILING {
		return Err(Error::Validation {
			message: format!("pagination.max_per_page must be {MAX_PER_PAGE_CEILING} or less."),
		});
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	cfg.service.log_level = cfg.service.log_level.trim().to_string();
	cfg.service.cors_allow_origins = cfg
		.service
		.cors_allow_origins
		.iter()
		.map(|origin| origin.trim())
		.filter(|origin| !origin.is_empty())
		.map(ToString::to_string)
		.collect();
}
