use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{CurrentUser, DevinoteService, Error, Result, listing::SqlListing};
use devinote_domain::{
	pagination::{OrderKeys, Page, PageRequest},
	roles::UserRole,
	validation,
};
use devinote_storage::models::Category;

const CATEGORY_COLUMNS: &str = "id, name, slug, created_at";

#[derive(Clone, Debug, Deserialize)]
pub struct CreateCategoryRequest {
	pub name: String,
	pub slug: String,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct UpdateCategoryRequest {
	#[serde(default)]
	pub name: Option<String>,
	#[serde(default)]
	pub slug: Option<String>,
}

#[derive(Clone, Debug, Serialize)]
pub struct CategoryResponse {
	pub id: i64,
	pub name: String,
	pub slug: String,
	#[serde(serialize_with = "crate::time_serde::serialize")]
	pub created_at: OffsetDateTime,
}
impl From<Category> for CategoryResponse {
	fn from(category: Category) -> Self {
		Self {
			id: category.id,
			name: category.name,
			slug: category.slug,
			created_at: category.created_at,
		}
	}
}

impl DevinoteService {
	pub async fn create_category(
		&self,
		actor: &CurrentUser,
		req: CreateCategoryRequest,
	) -> Result<CategoryResponse> {
		self.require_role(actor, UserRole::Editor)?;

		let name = validation::category_name(&req.name)?;
		let slug = validation::category_slug(&req.slug)?;
		let category = sqlx::query_as::<_, Category>(&format!(
			"INSERT INTO categories (name, slug) VALUES ($1, $2) RETURNING {CATEGORY_COLUMNS}"
		))
		.bind(name.as_str())
		.bind(slug.as_str())
		.fetch_one(&self.db.pool)
		.await?;

		tracing::info!(
			category_id = category.id,
			slug = %category.slug,
			actor = actor.id,
			"Category created."
		);

		Ok(category.into())
	}

	pub async fn get_category(&self, category_id: i64) -> Result<CategoryResponse> {
		let category = self.find_category(category_id).await?;

		Ok(category.into())
	}

	pub async fn list_categories(&self, request: &PageRequest) -> Result<Page<CategoryResponse>> {
		let listing = SqlListing::new(
			"categories",
			CATEGORY_COLUMNS,
			"name",
			OrderKeys::new("id").with("name", "lower(name)").with("slug", "lower(slug)"),
		);
		let page = listing.fetch::<Category>(&self.db.pool, request, self.limits()).await?;

		Ok(page.map(CategoryResponse::from))
	}

	/// Partial update. Absent fields keep their current value.
	pub async fn update_category(
		&self,
		actor: &CurrentUser,
		category_id: i64,
		req: UpdateCategoryRequest,
	) -> Result<CategoryResponse> {
		self.require_role(actor, UserRole::Editor)?;

		let name = req.name.as_deref().map(validation::category_name).transpose()?;
		let slug = req.slug.as_deref().map(validation::category_slug).transpose()?;
		let category = sqlx::query_as::<_, Category>(&format!(
			"\
UPDATE categories
SET name = COALESCE($1, name), slug = COALESCE($2, slug)
WHERE id = $3
RETURNING {CATEGORY_COLUMNS}"
		))
		.bind(name.as_deref())
		.bind(slug.as_deref())
		.bind(category_id)
		.fetch_optional(&self.db.pool)
		.await?
		.ok_or_else(|| Error::not_found("category", category_id))?;

		tracing::info!(category_id, actor = actor.id, "Category updated.");

		Ok(category.into())
	}

	/// Posts in the category survive with no category.
	pub async fn delete_category(&self, actor: &CurrentUser, category_id: i64) -> Result<()> {
		self.require_role(actor, UserRole::Editor)?;

		let result = sqlx::query("DELETE FROM categories WHERE id = $1")
			.bind(category_id)
			.execute(&self.db.pool)
			.await?;

		if result.rows_affected() == 0 {
			return Err(Error::not_found("category", category_id));
		}

		tracing::info!(category_id, actor = actor.id, "Category deleted.");

		Ok(())
	}

	pub(crate) async fn find_category(&self, category_id: i64) -> Result<Category> {
		sqlx::query_as::<_, Category>(&format!(
			"SELECT {CATEGORY_COLUMNS} FROM categories WHERE id = $1"
		))
		.bind(category_id)
		.fetch_optional(&self.db.pool)
		.await?
		.ok_or_else(|| Error::not_found("category", category_id))
	}
}
