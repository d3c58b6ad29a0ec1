use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{DevinoteService, Error, Result, auth};
use devinote_domain::{roles::UserRole, validation};
use devinote_storage::{models::User, queries};

const BAD_CREDENTIALS: &str = "Incorrect username or password.";
const USER_COLUMNS: &str =
	"id, email, username, name, surname, password_hash, role, is_active, created_at";

#[derive(Clone, Debug, Deserialize)]
pub struct RegisterRequest {
	pub email: String,
	pub username: String,
	pub password: String,
	#[serde(default)]
	pub name: Option<String>,
	#[serde(default)]
	pub surname: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct LoginRequest {
	/// Username or email.
	#[serde(alias = "username", alias = "email")]
	pub identifier: String,
	pub password: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct UserProfile {
	pub id: i64,
	pub email: String,
	pub username: String,
	pub name: Option<String>,
	pub surname: Option<String>,
	pub role: UserRole,
	pub is_active: bool,
	#[serde(serialize_with = "crate::time_serde::serialize")]
	pub created_at: OffsetDateTime,
}
impl From<User> for UserProfile {
	fn from(user: User) -> Self {
		Self {
			role: parse_role(&user.role),
			id: user.id,
			email: user.email,
			username: user.username,
			name: user.name,
			surname: user.surname,
			is_active: user.is_active,
			created_at: user.created_at,
		}
	}
}

#[derive(Clone, Debug, Serialize)]
pub struct LoginResponse {
	pub access_token: String,
	pub token_type: String,
	pub user: UserProfile,
}

/// The authenticated principal of a request.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CurrentUser {
	pub id: i64,
	pub username: String,
	pub role: UserRole,
}

impl DevinoteService {
	pub async fn register(&self, req: RegisterRequest) -> Result<UserProfile> {
		let email = validation::email(&req.email)?;
		let username = validation::username(&req.username)?;
		let password = validation::password(&req.password)?;
		let name = validation::person_name("name", req.name.as_deref())?;
		let surname = validation::person_name("surname", req.surname.as_deref())?;
		let password_hash = auth::hash_password(password)?;
		let user = sqlx::query_as::<_, User>(&format!(
			"\
INSERT INTO users (email, username, name, surname, password_hash, role, is_active)
VALUES ($1, $2, $3, $4, $5, $6, true)
RETURNING {USER_COLUMNS}"
		))
		.bind(email.as_str())
		.bind(username.as_str())
		.bind(name.as_deref())
		.bind(surname.as_deref())
		.bind(password_hash.as_str())
		.bind(UserRole::User.as_str())
		.fetch_one(&self.db.pool)
		.await?;

		tracing::info!(user_id = user.id, username = %user.username, "User registered.");

		Ok(user.into())
	}

	pub async fn login(&self, req: LoginRequest) -> Result<LoginResponse> {
		let identifier = req.identifier.trim();
		let user = sqlx::query_as::<_, User>(&format!(
			"SELECT {USER_COLUMNS} FROM users WHERE username = $1 OR email = lower($1)"
		))
		.bind(identifier)
		.fetch_optional(&self.db.pool)
		.await?;
		let Some(user) = user.filter(|user| user.is_active) else {
			return Err(bad_credentials());
		};

		if !auth::verify_password(&req.password, &user.password_hash) {
			return Err(bad_credentials());
		}

		let access_token = auth::issue_token(
			&self.cfg.security.jwt_secret,
			self.cfg.security.jwt_expires_minutes,
			user.id,
			&user.username,
			OffsetDateTime::now_utc(),
		)?;

		tracing::debug!(user_id = user.id, "Issued access token.");

		Ok(LoginResponse {
			access_token,
			token_type: auth::TOKEN_TYPE.to_string(),
			user: user.into(),
		})
	}

	/// Resolves a bearer token to an active user.
	pub async fn authenticate(&self, token: &str) -> Result<CurrentUser> {
		let claims = auth::decode_token(&self.cfg.security.jwt_secret, token)?;
		let user_id = claims.user_id()?;
		let user = queries::user_by_id(&self.db.pool, user_id)
			.await?
			.filter(|user| user.is_active)
			.ok_or_else(|| Error::Unauthorized {
				message: "Token user does not exist or is inactive.".to_string(),
			})?;

		Ok(CurrentUser { id: user.id, role: parse_role(&user.role), username: user.username })
	}

	pub async fn me(&self, actor: &CurrentUser) -> Result<UserProfile> {
		let user = queries::user_by_id(&self.db.pool, actor.id)
			.await?
			.ok_or_else(|| Error::not_found("user", actor.id))?;

		Ok(user.into())
	}
}

fn bad_credentials() -> Error {
	Error::Unauthorized { message: BAD_CREDENTIALS.to_string() }
}

/// Unknown stored roles degrade to the least privileged one.
fn parse_role(raw: &str) -> UserRole {
	UserRole::parse(raw).unwrap_or_default()
}
