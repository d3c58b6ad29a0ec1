//! Field rules for user input. Every function returns the normalized value on success.

use std::{collections::BTreeSet, sync::LazyLock};

use regex::Regex;

pub const POST_TAGS_MIN: usize = 1;
pub const POST_TAGS_MAX: usize = 5;
pub const PASSWORD_MIN_CHARS: usize = 8;

static EMAIL_RE: LazyLock<Option<Regex>> =
	LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").ok());
static USERNAME_RE: LazyLock<Option<Regex>> =
	LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_.-]{3,50}$").ok());
static SLUG_RE: LazyLock<Option<Regex>> =
	LazyLock::new(|| Regex::new(r"^[a-z0-9]+(-[a-z0-9]+)*$").ok());

pub type Result<T, E = Invalid> = std::result::Result<T, E>;

#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
#[error("{field}: {message}")]
pub struct Invalid {
	pub field: &'static str,
	pub message: String,
}
impl Invalid {
	fn new(field: &'static str, message: impl Into<String>) -> Self {
		Self { field, message: message.into() }
	}
}

pub fn email(raw: &str) -> Result<String> {
	let value = raw.trim().to_lowercase();

	if !matches(&EMAIL_RE, &value) {
		return Err(Invalid::new("email", "must be a valid email address."));
	}

	Ok(value)
}

pub fn username(raw: &str) -> Result<String> {
	let value = raw.trim();

	if !matches(&USERNAME_RE, value) {
		return Err(Invalid::new(
			"username",
			"must be 3 to 50 characters of letters, digits, '_', '.' or '-'.",
		));
	}

	Ok(value.to_string())
}

/// Passwords are taken verbatim. Leading and trailing spaces are significant.
pub fn password(raw: &str) -> Result<&str> {
	if raw.chars().count() < PASSWORD_MIN_CHARS {
		return Err(Invalid::new(
			"password",
			format!("must be at least {PASSWORD_MIN_CHARS} characters long."),
		));
	}

	Ok(raw)
}

pub fn person_name(field: &'static str, raw: Option<&str>) -> Result<Option<String>> {
	let Some(value) = raw.map(str::trim).filter(|value| !value.is_empty()) else {
		return Ok(None);
	};

	bounded(field, value, 1, 100).map(Some)
}

pub fn post_title(raw: &str) -> Result<String> {
	bounded("title", raw.trim(), 3, 100)
}

pub fn post_content(raw: &str) -> Result<String> {
	let value = raw.trim();

	if value.chars().count() < 10 {
		return Err(Invalid::new("content", "must be at least 10 characters long."));
	}

	Ok(value.to_string())
}

/// Tag names are trimmed and lowercased before the length check.
pub fn tag_name(raw: &str) -> Result<String> {
	bounded("name", &raw.trim().to_lowercase(), 2, 30)
}

/// Normalizes and deduplicates the tags of a post, keeping first-seen order.
pub fn post_tags(raw: &[String]) -> Result<Vec<String>> {
	let mut seen = BTreeSet::new();
	let mut tags = Vec::new();

	for name in raw {
		let name = tag_name(name).map_err(|err| Invalid::new("tags", err.message))?;

		if seen.insert(name.clone()) {
			tags.push(name);
		}
	}

	if !(POST_TAGS_MIN..=POST_TAGS_MAX).contains(&tags.len()) {
		return Err(Invalid::new(
			"tags",
			format!("must contain between {POST_TAGS_MIN} and {POST_TAGS_MAX} distinct tags."),
		));
	}

	Ok(tags)
}

/// Splits a comma-separated tag filter. Blank entries are dropped; an empty result is allowed.
pub fn tag_filter(raw: &str) -> Vec<String> {
	let mut seen = BTreeSet::new();

	raw.split(',')
		.map(|name| name.trim().to_lowercase())
		.filter(|name| !name.is_empty())
		.filter(|name| seen.insert(name.clone()))
		.collect()
}

pub fn category_name(raw: &str) -> Result<String> {
	bounded("name", raw.trim(), 2, 60)
}

pub fn category_slug(raw: &str) -> Result<String> {
	let value = bounded("slug", raw.trim(), 2, 60)?;

	if !matches(&SLUG_RE, &value) {
		return Err(Invalid::new(
			"slug",
			"must be lowercase letters and digits separated by single hyphens.",
		));
	}

	Ok(value)
}

pub fn note_title(raw: &str) -> Result<String> {
	bounded("title", raw.trim(), 1, 200)
}

pub fn label_name(raw: &str) -> Result<String> {
	bounded("name", raw.trim(), 1, 50)
}

fn bounded(field: &'static str, value: &str, min: usize, max: usize) -> Result<String> {
	let len = value.chars().count();

	if len < min || len > max {
		return Err(Invalid::new(field, format!("must be {min} to {max} characters long.")));
	}

	Ok(value.to_string())
}

fn matches(re: &LazyLock<Option<Regex>>, value: &str) -> bool {
	Option::as_ref(re).is_some_and(|re| re.is_match(value))
}
