//! Argon2id password hashing and HS256 access tokens.

use argon2::{
	Argon2,
	password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{Error, Result};

pub const TOKEN_TYPE: &str = "bearer";

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Claims {
	/// User id, as a string.
	pub sub: String,
	pub username: String,
	pub iat: i64,
	pub exp: i64,
}
impl Claims {
	pub fn user_id(&self) -> Result<i64> {
		self.sub
			.parse()
			.map_err(|_| Error::Unauthorized { message: "Token subject is not a user id.".to_string() })
	}
}

pub fn hash_password(password: &str) -> Result<String> {
	let salt = SaltString::generate(&mut OsRng);
	let hash = Argon2::default()
		.hash_password(password.as_bytes(), &salt)
		.map_err(|err| Error::Auth { message: format!("Failed to hash password: {err}.") })?;

	Ok(hash.to_string())
}

/// A malformed stored hash counts as a mismatch.
pub fn verify_password(password: &str, hash: &str) -> bool {
	let Ok(parsed) = PasswordHash::new(hash) else {
		tracing::warn!("Stored password hash is not a valid PHC string.");

		return false;
	};

	Argon2::default().verify_password(password.as_bytes(), &parsed).is_ok()
}

pub fn issue_token(
	secret: &str,
	expires_minutes: i64,
	user_id: i64,
	username: &str,
	now: OffsetDateTime,
) -> Result<String> {
	let iat = now.unix_timestamp();
	let exp = expires_minutes
		.checked_mul(60)
		.and_then(|seconds| iat.checked_add(seconds))
		.ok_or_else(|| Error::Auth {
			message: format!("Token expiry of {expires_minutes} minutes is out of range."),
		})?;
	let claims = Claims { sub: user_id.to_string(), username: username.to_string(), iat, exp };

	jsonwebtoken::encode(
		&Header::new(Algorithm::HS256),
		&claims,
		&EncodingKey::from_secret(secret.as_bytes()),
	)
	.map_err(|err| Error::Auth { message: format!("Failed to sign token: {err}.") })
}

/// Checks signature and expiry. Every failure is reported as `Unauthorized`.
pub fn decode_token(secret: &str, token: &str) -> Result<Claims> {
	let mut validation = Validation::new(Algorithm::HS256);

	validation.leeway = 0;

	jsonwebtoken::decode::<Claims>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation)
		.map(|data| data.claims)
		.map_err(|err| Error::Unauthorized { message: format!("Invalid token: {err}.") })
}
