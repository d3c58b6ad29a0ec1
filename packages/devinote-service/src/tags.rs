use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{DevinoteService, Error, Result, listing::SqlListing};
use devinote_domain::{
	pagination::{OrderKeys, Page, PageRequest},
	validation,
};
use devinote_storage::models::{PopularTag, Tag};

const TAG_COLUMNS: &str = "id, name, created_at";

#[derive(Clone, Debug, Deserialize)]
pub struct TagRequest {
	pub name: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct TagResponse {
	pub id: i64,
	pub name: String,
	#[serde(serialize_with = "crate::time_serde::serialize")]
	pub created_at: OffsetDateTime,
}
impl From<Tag> for TagResponse {
	fn from(tag: Tag) -> Self {
		Self { id: tag.id, name: tag.name, created_at: tag.created_at }
	}
}

#[derive(Clone, Debug, Serialize)]
pub struct PopularTagResponse {
	pub id: i64,
	pub name: String,
	pub uses: i64,
}

impl DevinoteService {
	pub async fn create_tag(&self, req: TagRequest) -> Result<TagResponse> {
		let name = validation::tag_name(&req.name)?;
		let tag = sqlx::query_as::<_, Tag>(&format!(
			"INSERT INTO tags (name) VALUES ($1) RETURNING {TAG_COLUMNS}"
		))
		.bind(name.as_str())
		.fetch_one(&self.db.pool)
		.await?;

		tracing::info!(tag_id = tag.id, name = %tag.name, "Tag created.");

		Ok(tag.into())
	}

	pub async fn get_tag(&self, tag_id: i64) -> Result<TagResponse> {
		let tag = sqlx::query_as::<_, Tag>(&format!("SELECT {TAG_COLUMNS} FROM tags WHERE id = $1"))
			.bind(tag_id)
			.fetch_optional(&self.db.pool)
			.await?
			.ok_or_else(|| Error::not_found("tag", tag_id))?;

		Ok(tag.into())
	}

	pub async fn list_tags(&self, request: &PageRequest) -> Result<Page<TagResponse>> {
		let listing = SqlListing::new(
			"tags",
			TAG_COLUMNS,
			"name",
			OrderKeys::new("id").with("name", "lower(name)"),
		);
		let page = listing.fetch::<Tag>(&self.db.pool, request, self.limits()).await?;

		Ok(page.map(TagResponse::from))
	}

	pub async fn rename_tag(&self, tag_id: i64, req: TagRequest) -> Result<TagResponse> {
		let name = validation::tag_name(&req.name)?;
		let tag = sqlx::query_as::<_, Tag>(&format!(
			"UPDATE tags SET name = $1 WHERE id = $2 RETURNING {TAG_COLUMNS}"
		))
		.bind(name.as_str())
		.bind(tag_id)
		.fetch_optional(&self.db.pool)
		.await?
		.ok_or_else(|| Error::not_found("tag", tag_id))?;

		tracing::info!(tag_id, name = %tag.name, "Tag renamed.");

		Ok(tag.into())
	}

	pub async fn delete_tag(&self, tag_id: i64) -> Result<()> {
		let result = sqlx::query("DELETE FROM tags WHERE id = $1")
			.bind(tag_id)
			.execute(&self.db.pool)
			.await?;

		if result.rows_affected() == 0 {
			return Err(Error::not_found("tag", tag_id));
		}

		tracing::info!(tag_id, "Tag deleted.");

		Ok(())
	}

	/// The tag attached to the most posts. Ties go to the alphabetically first name.
	pub async fn most_popular_tag(&self) -> Result<PopularTagResponse> {
		let tag = sqlx::query_as::<_, PopularTag>(
			"\
SELECT t.id, t.name, count(pt.post_id) AS uses
FROM tags t
JOIN post_tags pt ON pt.tag_id = t.id
GROUP BY t.id, t.name
ORDER BY uses DESC, lower(t.name) ASC
LIMIT 1",
		)
		.fetch_optional(&self.db.pool)
		.await?
		.ok_or_else(|| Error::NotFound { message: "No tag is in use yet.".to_string() })?;

		Ok(PopularTagResponse { id: tag.id, name: tag.name, uses: tag.uses })
	}
}
