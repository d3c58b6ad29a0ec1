//! Owner, direct-share and label-share authorization for notes and labels.

use std::{collections::BTreeMap, fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Role carried by a share row. Variants are declared in ascending order of power.
#[derive(
	Clone, Copy, Debug, Default, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ShareRole {
	#[default]
	Read,
	Edit,
	Delete,
}
impl ShareRole {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Read => "read",
			Self::Edit => "edit",
			Self::Delete => "delete",
		}
	}

	pub fn parse(raw: &str) -> Option<Self> {
		match raw.trim() {
			"read" => Some(Self::Read),
			"edit" => Some(Self::Edit),
			"delete" => Some(Self::Delete),
			_ => None,
		}
	}

	pub fn permits(self, action: Action) -> bool {
		self >= action.required_role()
	}
}
impl fmt::Display for ShareRole {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}
impl FromStr for ShareRole {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::parse(s).ok_or_else(|| format!("Unknown share role {s:?}."))
	}
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Action {
	Read,
	Edit,
	Delete,
}
impl Action {
	pub fn required_role(self) -> ShareRole {
		match self {
			Self::Read => ShareRole::Read,
			Self::Edit => ShareRole::Edit,
			Self::Delete => ShareRole::Delete,
		}
	}
}

/// Everything the resolver needs to know about one resource and one principal.
///
/// `direct` is the principal's share row on the resource itself. `via_labels` holds the roles of
/// the principal's shares on labels attached to the resource; it is always empty for labels.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Grants {
	pub owner_id: i64,
	pub direct: Option<ShareRole>,
	pub via_labels: Vec<ShareRole>,
}
impl Grants {
	pub fn owned_by(owner_id: i64) -> Self {
		Self { owner_id, ..Default::default() }
	}

	pub fn with_direct(mut self, role: ShareRole) -> Self {
		self.direct = Some(role);

		self
	}

	pub fn with_label(mut self, role: ShareRole) -> Self {
		self.via_labels.push(role);

		self
	}

	/// Highest role `user_id` holds on the resource. Owners always hold `delete`.
	pub fn effective_role(&self, user_id: i64) -> Option<ShareRole> {
		if user_id == self.owner_id {
			return Some(ShareRole::Delete);
		}

		self.direct.into_iter().chain(self.via_labels.iter().copied()).max()
	}

	pub fn can(&self, user_id: i64, action: Action) -> bool {
		self.effective_role(user_id).is_some_and(|role| role.permits(action))
	}

	pub fn is_owner(&self, user_id: i64) -> bool {
		self.owner_id == user_id
	}
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Denied {
	NotFound,
	Forbidden,
}

/// `grants` is `None` when the resource does not exist, which always wins over a permission check.
pub fn authorize(grants: Option<&Grants>, user_id: i64, action: Action) -> Result<(), Denied> {
	let Some(grants) = grants else {
		return Err(Denied::NotFound);
	};

	if grants.can(user_id, action) { Ok(()) } else { Err(Denied::Forbidden) }
}

/// Owner-only operations: sharing, unsharing, listing shares and replacing a note's labels.
///
/// A caller who cannot even read the resource learns nothing about its existence.
pub fn authorize_owner(grants: Option<&Grants>, user_id: i64) -> Result<(), Denied> {
	let Some(grants) = grants else {
		return Err(Denied::NotFound);
	};

	if grants.is_owner(user_id) {
		return Ok(());
	}
	if grants.can(user_id, Action::Read) {
		return Err(Denied::Forbidden);
	}

	Err(Denied::NotFound)
}

/// Unions several visibility sources, keeping the first row seen per id, newest id first.
pub fn merge_visible<T, I>(sources: I, id: fn(&T) -> i64) -> Vec<T>
where
	I: IntoIterator<Item = T>,
{
	let mut by_id = BTreeMap::new();

	for item in sources {
		by_id.entry(id(&item)).or_insert(item);
	}

	by_id.into_values().rev().collect()
}
