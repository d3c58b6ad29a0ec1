use sqlx::PgExecutor;

use crate::Result;
use devinote_domain::access::{Grants, ShareRole};
use devinote_storage::queries::{self, ShareTarget};

/// Grants of `user_id` on a note, or `None` when the note does not exist.
pub(crate) async fn note_grants<'c, E>(
	executor: E,
	note_id: i64,
	user_id: i64,
) -> Result<Option<Grants>>
where
	E: PgExecutor<'c> + Copy,
{
	let owner_id = sqlx::query_scalar::<_, i64>("SELECT owner_id FROM notes WHERE id = $1")
		.bind(note_id)
		.fetch_optional(executor)
		.await?;
	let Some(owner_id) = owner_id else {
		return Ok(None);
	};
	let mut grants = Grants::owned_by(owner_id);

	if owner_id == user_id {
		return Ok(Some(grants));
	}

	grants.direct = queries::direct_share_role(executor, ShareTarget::Note, note_id, user_id)
		.await?
		.as_deref()
		.and_then(ShareRole::parse);
	grants.via_labels = queries::label_share_roles_for_note(executor, note_id, user_id)
		.await?
		.iter()
		.filter_map(|role| ShareRole::parse(role))
		.collect();

	Ok(Some(grants))
}

/// Grants of `user_id` on a label. Labels are never reachable through other labels.
pub(crate) async fn label_grants<'c, E>(
	executor: E,
	label_id: i64,
	user_id: i64,
) -> Result<Option<Grants>>
where
	E: PgExecutor<'c> + Copy,
{
	let owner_id = sqlx::query_scalar::<_, i64>("SELECT owner_id FROM labels WHERE id = $1")
		.bind(label_id)
		.fetch_optional(executor)
		.await?;
	let Some(owner_id) = owner_id else {
		return Ok(None);
	};
	let mut grants = Grants::owned_by(owner_id);

	if owner_id != user_id {
		grants.direct = queries::direct_share_role(executor, ShareTarget::Label, label_id, user_id)
			.await?
			.as_deref()
			.and_then(ShareRole::parse);
	}

	Ok(Some(grants))
}
