use std::fmt;

use serde::{Deserialize, Serialize};

/// Account role. Ordered so that `Admin > Editor > User`.
#[derive(
	Clone, Copy, Debug, Default, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
	#[default]
	User,
	Editor,
	Admin,
}
impl UserRole {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::User => "user",
			Self::Editor => "editor",
			Self::Admin => "admin",
		}
	}

	pub fn parse(raw: &str) -> Option<Self> {
		match raw.trim() {
			"user" => Some(Self::User),
			"editor" => Some(Self::Editor),
			"admin" => Some(Self::Admin),
			_ => None,
		}
	}

	pub fn at_least(self, required: Self) -> bool {
		self >= required
	}
}
impl fmt::Display for UserRole {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}
