use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{CurrentUser, DevinoteService, Error, Result, access, listing::SqlListing};
use devinote_domain::{
	access::{self as rules, Action},
	pagination::{OrderKeys, Page, PageRequest},
	validation,
};
use devinote_storage::models::Label;

const LABEL_COLUMNS: &str = "id, name, owner_id, created_at";

#[derive(Clone, Debug, Deserialize)]
pub struct CreateLabelRequest {
	pub name: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct UpdateLabelRequest {
	pub name: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct LabelResponse {
	pub id: i64,
	pub name: String,
	pub owner_id: i64,
	#[serde(serialize_with = "crate::time_serde::serialize")]
	pub created_at: OffsetDateTime,
}
impl From<Label> for LabelResponse {
	fn from(label: Label) -> Self {
		Self { id: label.id, name: label.name, owner_id: label.owner_id, created_at: label.created_at }
	}
}

impl DevinoteService {
	pub async fn create_label(
		&self,
		actor: &CurrentUser,
		req: CreateLabelRequest,
	) -> Result<LabelResponse> {
		let name = validation::label_name(&req.name)?;
		let label = sqlx::query_as::<_, Label>(&format!(
			"INSERT INTO labels (name, owner_id) VALUES ($1, $2) RETURNING {LABEL_COLUMNS}"
		))
		.bind(name.as_str())
		.bind(actor.id)
		.fetch_one(&self.db.pool)
		.await?;

		tracing::info!(label_id = label.id, owner_id = actor.id, "Label created.");

		Ok(label.into())
	}

	/// Labels owned by `actor`. Labels shared with them are reached by id.
	pub async fn list_labels(
		&self,
		actor: &CurrentUser,
		request: &PageRequest,
	) -> Result<Page<LabelResponse>> {
		let listing = SqlListing::new(
			"labels",
			LABEL_COLUMNS,
			"name",
			OrderKeys::new("id").with("name", "lower(name)").with("created_at", "created_at"),
		)
		.scoped("owner_id", actor.id);
		let page = listing.fetch::<Label>(&self.db.pool, request, self.limits()).await?;

		Ok(page.map(LabelResponse::from))
	}

	pub async fn get_label(&self, actor: &CurrentUser, label_id: i64) -> Result<LabelResponse> {
		let grants = access::label_grants(&self.db.pool, label_id, actor.id).await?;

		rules::authorize(grants.as_ref(), actor.id, Action::Read)
			.map_err(Error::denied("label", label_id))?;

		let label = sqlx::query_as::<_, Label>(&format!(
			"SELECT {LABEL_COLUMNS} FROM labels WHERE id = $1"
		))
		.bind(label_id)
		.fetch_optional(&self.db.pool)
		.await?
		.ok_or_else(|| Error::not_found("label", label_id))?;

		Ok(label.into())
	}

	/// Names stay unique per owner, so a collision is reported against the label's owner.
	pub async fn rename_label(
		&self,
		actor: &CurrentUser,
		label_id: i64,
		req: UpdateLabelRequest,
	) -> Result<LabelResponse> {
		let grants = access::label_grants(&self.db.pool, label_id, actor.id).await?;

		rules::authorize(grants.as_ref(), actor.id, Action::Edit)
			.map_err(Error::denied("label", label_id))?;

		let name = validation::label_name(&req.name)?;
		let label = sqlx::query_as::<_, Label>(&format!(
			"UPDATE labels SET name = $1 WHERE id = $2 RETURNING {LABEL_COLUMNS}"
		))
		.bind(name.as_str())
		.bind(label_id)
		.fetch_optional(&self.db.pool)
		.await?
		.ok_or_else(|| Error::not_found("label", label_id))?;

		tracing::info!(label_id, actor = actor.id, "Label renamed.");

		Ok(label.into())
	}

	/// Removes the label, its note links and its shares.
	pub async fn delete_label(&self, actor: &CurrentUser, label_id: i64) -> Result<()> {
		let grants = access::label_grants(&self.db.pool, label_id, actor.id).await?;

		rules::authorize(grants.as_ref(), actor.id, Action::Delete)
			.map_err(Error::denied("label", label_id))?;

		sqlx::query("DELETE FROM labels WHERE id = $1")
			.bind(label_id)
			.execute(&self.db.pool)
			.await?;

		tracing::info!(label_id, actor = actor.id, "Label deleted.");

		Ok(())
	}
}
