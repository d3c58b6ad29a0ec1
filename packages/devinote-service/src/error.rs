use devinote_domain::{access::Denied, validation::Invalid};

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	/// `field` names the offending input when one field is to blame.
	#[error("Invalid request: {message}")]
	InvalidRequest { message: String, field: Option<String> },
	#[error("Unauthorized: {message}")]
	Unauthorized { message: String },
	#[error("Forbidden: {message}")]
	Forbidden { message: String },
	#[error("Not found: {message}")]
	NotFound { message: String },
	#[error("Conflict: {message}")]
	Conflict { message: String },
	#[error("Storage error: {message}")]
	Storage { message: String },
	/// Hashing or token signing failed. Never caused by caller input.
	#[error("Auth error: {message}")]
	Auth { message: String },
}
impl Error {
	pub(crate) fn not_found(resource: &str, id: i64) -> Self {
		Self::NotFound { message: format!("{resource} {id} does not exist.") }
	}

	pub(crate) fn forbidden(message: impl Into<String>) -> Self {
		Self::Forbidden { message: message.into() }
	}

	pub(crate) fn invalid(message: impl Into<String>) -> Self {
		Self::InvalidRequest { message: message.into(), field: None }
	}

	pub(crate) fn denied(resource: &'static str, id: i64) -> impl FnOnce(Denied) -> Self {
		move |denied| match denied {
			Denied::NotFound => Self::not_found(resource, id),
			Denied::Forbidden =>
				Self::forbidden(format!("Not enough permissions on {resource} {id}.")),
		}
	}
}
impl From<sqlx::Error> for Error {
	fn from(err: sqlx::Error) -> Self {
		devinote_storage::Error::from(err).into()
	}
}
impl From<devinote_storage::Error> for Error {
	fn from(err: devinote_storage::Error) -> Self {
		match err {
			devinote_storage::Error::Sqlx(inner) => Self::Storage { message: inner.to_string() },
			devinote_storage::Error::InvalidArgument(message) =>
				Self::InvalidRequest { message, field: None },
			devinote_storage::Error::NotFound(message) => Self::NotFound { message },
			devinote_storage::Error::Conflict(constraint) =>
				Self::Conflict { message: conflict_message(&constraint).to_string() },
		}
	}
}
impl From<Invalid> for Error {
	fn from(err: Invalid) -> Self {
		Self::InvalidRequest { message: err.to_string(), field: Some(err.field.to_string()) }
	}
}

fn conflict_message(constraint: &str) -> &'static str {
	match constraint {
		"users_email_key" => "Email is already registered.",
		"users_username_key" => "Username is already taken.",
		"posts_title_key" => "A post with this title already exists.",
		"tags_name_key" => "A tag with this name already exists.",
		"categories_name_key" => "A category with this name already exists.",
		"categories_slug_key" => "A category with this slug already exists.",
		"uq_labels_owner_name" => "You already have a label with this name.",
		"uq_note_share" | "uq_label_share" => "The share already exists.",
		_ => "The resource already exists.",
	}
}
