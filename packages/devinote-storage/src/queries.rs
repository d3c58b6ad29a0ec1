//! Queries shared by more than one use case: share rows, note-label links and user lookups.

use sqlx::{PgExecutor, Postgres, Transaction};

use crate::{
	Result,
	models::{Share, User},
};

/// Which share table a query targets. Table and column names are compile-time constants.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ShareTarget {
	Note,
	Label,
}
impl ShareTarget {
	pub fn table(self) -> &'static str {
		match self {
			Self::Note => "note_shares",
			Self::Label => "label_shares",
		}
	}

	pub fn column(self) -> &'static str {
		match self {
			Self::Note => "note_id",
			Self::Label => "label_id",
		}
	}

	pub fn resource(self) -> &'static str {
		match self {
			Self::Note => "note",
			Self::Label => "label",
		}
	}
}

/// Inserts or replaces the role of the (resource, user) share. Exactly one row remains.
pub async fn upsert_share<'e, E>(
	executor: E,
	target: ShareTarget,
	resource_id: i64,
	user_id: i64,
	role: &str,
) -> Result<Share>
where
	E: PgExecutor<'e>,
{
	let sql = format!(
		"\
INSERT INTO {table} ({column}, user_id, role)
VALUES ($1, $2, $3)
ON CONFLICT ({column}, user_id)
DO UPDATE SET role = EXCLUDED.role
RETURNING id, {column} AS resource_id, user_id, role, created_at",
		table = target.table(),
		column = target.column(),
	);
	let share = sqlx::query_as::<_, Share>(&sql)
		.bind(resource_id)
		.bind(user_id)
		.bind(role)
		.fetch_one(executor)
		.await?;

	Ok(share)
}

/// Returns whether a row was removed. Removing a missing share is not an error.
pub async fn remove_share<'e, E>(
	executor: E,
	target: ShareTarget,
	resource_id: i64,
	user_id: i64,
) -> Result<bool>
where
	E: PgExecutor<'e>,
{
	let sql = format!(
		"DELETE FROM {table} WHERE {column} = $1 AND user_id = $2",
		table = target.table(),
		column = target.column(),
	);
	let result = sqlx::query(&sql).bind(resource_id).bind(user_id).execute(executor).await?;

	Ok(result.rows_affected() > 0)
}

pub async fn list_shares<'e, E>(
	executor: E,
	target: ShareTarget,
	resource_id: i64,
) -> Result<Vec<Share>>
where
	E: PgExecutor<'e>,
{
	let sql = format!(
		"\
SELECT id, {column} AS resource_id, user_id, role, created_at
FROM {table}
WHERE {column} = $1
ORDER BY created_at ASC, id ASC",
		table = target.table(),
		column = target.column(),
	);
	let shares = sqlx::query_as::<_, Share>(&sql).bind(resource_id).fetch_all(executor).await?;

	Ok(shares)
}

pub async fn direct_share_role<'e, E>(
	executor: E,
	target: ShareTarget,
	resource_id: i64,
	user_id: i64,
) -> Result<Option<String>>
where
	E: PgExecutor<'e>,
{
	let sql = format!(
		"SELECT role FROM {table} WHERE {column} = $1 AND user_id = $2",
		table = target.table(),
		column = target.column(),
	);
	let role = sqlx::query_scalar::<_, String>(&sql)
		.bind(resource_id)
		.bind(user_id)
		.fetch_optional(executor)
		.await?;

	Ok(role)
}

/// Roles `user_id` holds on labels attached to `note_id`.
pub async fn label_share_roles_for_note<'e, E>(
	executor: E,
	note_id: i64,
	user_id: i64,
) -> Result<Vec<String>>
where
	E: PgExecutor<'e>,
{
	let roles = sqlx::query_scalar::<_, String>(
		"\
SELECT ls.role
FROM note_labels nl
JOIN label_shares ls ON ls.label_id = nl.label_id
WHERE nl.note_id = $1 AND ls.user_id = $2",
	)
	.bind(note_id)
	.bind(user_id)
	.fetch_all(executor)
	.await?;

	Ok(roles)
}

pub async fn note_label_ids<'e, E>(executor: E, note_id: i64) -> Result<Vec<i64>>
where
	E: PgExecutor<'e>,
{
	let ids = sqlx::query_scalar::<_, i64>(
		"SELECT label_id FROM note_labels WHERE note_id = $1 ORDER BY label_id ASC",
	)
	.bind(note_id)
	.fetch_all(executor)
	.await?;

	Ok(ids)
}

/// `(note_id, label_id)` pairs for many notes at once, ordered by note then label.
pub async fn note_label_pairs<'e, E>(executor: E, note_ids: &[i64]) -> Result<Vec<(i64, i64)>>
where
	E: PgExecutor<'e>,
{
	if note_ids.is_empty() {
		return Ok(Vec::new());
	}

	let pairs = sqlx::query_as::<_, (i64, i64)>(
		"\
SELECT note_id, label_id
FROM note_labels
WHERE note_id = ANY($1)
ORDER BY note_id ASC, label_id ASC",
	)
	.bind(note_ids)
	.fetch_all(executor)
	.await?;

	Ok(pairs)
}

/// Replaces the label set of a note with the subset of `label_ids` that `owner_id` owns.
///
/// Returns the resulting label ids in ascending order.
pub async fn replace_note_labels(
	tx: &mut Transaction<'_, Postgres>,
	note_id: i64,
	owner_id: i64,
	label_ids: &[i64],
) -> Result<Vec<i64>> {
	sqlx::query("DELETE FROM note_labels WHERE note_id = $1")
		.bind(note_id)
		.execute(&mut **tx)
		.await?;

	if label_ids.is_empty() {
		return Ok(Vec::new());
	}

	let mut kept = sqlx::query_scalar::<_, i64>(
		"\
INSERT INTO note_labels (note_id, label_id)
SELECT $1, l.id
FROM labels l
WHERE l.owner_id = $2 AND l.id = ANY($3)
ON CONFLICT DO NOTHING
RETURNING label_id",
	)
	.bind(note_id)
	.bind(owner_id)
	.bind(label_ids)
	.fetch_all(&mut **tx)
	.await?;

	kept.sort_unstable();

	Ok(kept)
}

pub async fn user_by_id<'e, E>(executor: E, user_id: i64) -> Result<Option<User>>
where
	E: PgExecutor<'e>,
{
	let user = sqlx::query_as::<_, User>(
		"\
SELECT id, email, username, name, surname, password_hash, role, is_active, created_at
FROM users
WHERE id = $1",
	)
	.bind(user_id)
	.fetch_optional(executor)
	.await?;

	Ok(user)
}

pub async fn user_exists<'e, E>(executor: E, user_id: i64) -> Result<bool>
where
	E: PgExecutor<'e>,
{
	let exists = sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM users WHERE id = $1)")
		.bind(user_id)
		.fetch_one(executor)
		.await?;

	Ok(exists)
}
