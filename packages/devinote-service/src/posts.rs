use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use sqlx::{Postgres, Transaction};
use time::OffsetDateTime;

use crate::{
	CategoryResponse, CurrentUser, DevinoteService, Error, Result, TagResponse,
	listing::SqlListing,
};
use devinote_domain::{
	pagination::{OrderKeys, Page, PageRequest},
	roles::UserRole,
	validation,
};
use devinote_storage::models::{Category, Post};

const POST_COLUMNS: &str = "id, title, content, user_id, category_id, created_at";

#[derive(Clone, Debug, Deserialize)]
pub struct CreatePostRequest {
	pub title: String,
	pub content: String,
	#[serde(default)]
	pub category_id: Option<i64>,
	pub tags: Vec<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct UpdatePostRequest {
	#[serde(default)]
	pub title: Option<String>,
	#[serde(default)]
	pub content: Option<String>,
}

#[derive(Clone, Debug, Serialize)]
pub struct PostResponse {
	pub id: i64,
	pub title: String,
	pub content: String,
	pub user_id: Option<i64>,
	pub category: Option<CategoryResponse>,
	pub tags: Vec<TagResponse>,
	#[serde(serialize_with = "crate::time_serde::serialize")]
	pub created_at: OffsetDateTime,
}

#[derive(Debug, sqlx::FromRow)]
struct PostTagRow {
	post_id: i64,
	id: i64,
	name: String,
	created_at: OffsetDateTime,
}

impl DevinoteService {
	pub async fn create_post(
		&self,
		actor: &CurrentUser,
		req: CreatePostRequest,
	) -> Result<PostResponse> {
		let title = validation::post_title(&req.title)?;
		let content = validation::post_content(&req.content)?;
		let tags = validation::post_tags(&req.tags)?;

		if let Some(category_id) = req.category_id {
			self.find_category(category_id).await?;
		}

		let mut tx = self.db.pool.begin().await?;
		let post = sqlx::query_as::<_, Post>(&format!(
			"\
INSERT INTO posts (title, content, user_id, category_id)
VALUES ($1, $2, $3, $4)
RETURNING {POST_COLUMNS}"
		))
		.bind(title.as_str())
		.bind(content.as_str())
		.bind(actor.id)
		.bind(req.category_id)
		.fetch_one(&mut *tx)
		.await?;

		attach_tags(&mut tx, post.id, &tags).await?;

		tx.commit().await?;

		tracing::info!(post_id = post.id, actor = actor.id, tags = tags.len(), "Post created.");

		self.hydrate_one(post).await
	}

	pub async fn get_post(&self, post_id: i64) -> Result<PostResponse> {
		let post = self.find_post(post_id).await?;

		self.hydrate_one(post).await
	}

	pub async fn list_posts(&self, request: &PageRequest) -> Result<Page<PostResponse>> {
		let listing = SqlListing::new(
			"posts",
			POST_COLUMNS,
			"title",
			OrderKeys::new("id").with("title", "lower(title)").with("created_at", "created_at"),
		);
		let mut page = listing.fetch::<Post>(&self.db.pool, request, self.limits()).await?;
		let rows = std::mem::take(&mut page.items);
		let items = self.hydrate(rows).await?;

		Ok(page.with_items(items))
	}

	/// Posts carrying any of the comma-separated tag names, oldest first.
	pub async fn posts_by_tags(&self, raw_tags: &str) -> Result<Vec<PostResponse>> {
		let names = validation::tag_filter(raw_tags);

		if names.is_empty() {
			return Ok(Vec::new());
		}

		let rows = sqlx::query_as::<_, Post>(
			"\
SELECT DISTINCT p.id, p.title, p.content, p.user_id, p.category_id, p.created_at
FROM posts p
JOIN post_tags pt ON pt.post_id = p.id
JOIN tags t ON t.id = pt.tag_id
WHERE t.name = ANY($1)
ORDER BY p.id ASC",
		)
		.bind(names.as_slice())
		.fetch_all(&self.db.pool)
		.await?;

		self.hydrate(rows).await
	}

	pub async fn update_post(
		&self,
		actor: &CurrentUser,
		post_id: i64,
		req: UpdatePostRequest,
	) -> Result<PostResponse> {
		let post = self.find_post(post_id).await?;

		ensure_can_modify(actor, &post)?;

		let title = req.title.as_deref().map(validation::post_title).transpose()?;
		let content = req.content.as_deref().map(validation::post_content).transpose()?;
		let post = sqlx::query_as::<_, Post>(&format!(
			"\
UPDATE posts
SET title = COALESCE($1, title), content = COALESCE($2, content)
WHERE id = $3
RETURNING {POST_COLUMNS}"
		))
		.bind(title.as_deref())
		.bind(content.as_deref())
		.bind(post_id)
		.fetch_optional(&self.db.pool)
		.await?
		.ok_or_else(|| Error::not_found("post", post_id))?;

		tracing::info!(post_id, actor = actor.id, "Post updated.");

		self.hydrate_one(post).await
	}

	pub async fn delete_post(&self, actor: &CurrentUser, post_id: i64) -> Result<()> {
		let post = self.find_post(post_id).await?;

		ensure_can_modify(actor, &post)?;

		sqlx::query("DELETE FROM posts WHERE id = $1").bind(post_id).execute(&self.db.pool).await?;

		tracing::info!(post_id, actor = actor.id, "Post deleted.");

		Ok(())
	}

	async fn find_post(&self, post_id: i64) -> Result<Post> {
		sqlx::query_as::<_, Post>(&format!("SELECT {POST_COLUMNS} FROM posts WHERE id = $1"))
			.bind(post_id)
			.fetch_optional(&self.db.pool)
			.await?
			.ok_or_else(|| Error::not_found("post", post_id))
	}

	async fn hydrate_one(&self, post: Post) -> Result<PostResponse> {
		let mut hydrated = self.hydrate(vec![post]).await?;

		hydrated.pop().ok_or_else(|| Error::Storage { message: "Post vanished.".to_string() })
	}

	/// Attaches tags and categories, preserving the order of `posts`.
	async fn hydrate(&self, posts: Vec<Post>) -> Result<Vec<PostResponse>> {
		if posts.is_empty() {
			return Ok(Vec::new());
		}

		let post_ids = posts.iter().map(|post| post.id).collect::<Vec<_>>();
		let category_ids = posts.iter().filter_map(|post| post.category_id).collect::<Vec<_>>();
		let tag_rows = sqlx::query_as::<_, PostTagRow>(
			"\
SELECT pt.post_id, t.id, t.name, t.created_at
FROM post_tags pt
JOIN tags t ON t.id = pt.tag_id
WHERE pt.post_id = ANY($1)
ORDER BY t.name ASC",
		)
		.bind(post_ids.as_slice())
		.fetch_all(&self.db.pool)
		.await?;
		let categories = sqlx::query_as::<_, Category>(
			"SELECT id, name, slug, created_at FROM categories WHERE id = ANY($1)",
		)
		.bind(category_ids.as_slice())
		.fetch_all(&self.db.pool)
		.await?
		.into_iter()
		.map(|category| (category.id, category))
		.collect::<HashMap<_, _>>();
		let mut tags_by_post: HashMap<i64, Vec<TagResponse>> = HashMap::new();

		for row in tag_rows {
			tags_by_post.entry(row.post_id).or_default().push(TagResponse {
				id: row.id,
				name: row.name,
				created_at: row.created_at,
			});
		}

		let responses = posts
			.into_iter()
			.map(|post| PostResponse {
				category: post
					.category_id
					.and_then(|id| categories.get(&id).cloned())
					.map(CategoryResponse::from),
				tags: tags_by_post.remove(&post.id).unwrap_or_default(),
				id: post.id,
				title: post.title,
				content: post.content,
				user_id: post.user_id,
				created_at: post.created_at,
			})
			.collect();

		Ok(responses)
	}
}

/// Links `names` to the post, creating tags that do not exist yet.
async fn attach_tags(
	tx: &mut Transaction<'_, Postgres>,
	post_id: i64,
	names: &[String],
) -> Result<()> {
	for name in names {
		let tag_id = sqlx::query_scalar::<_, i64>(
			"\
INSERT INTO tags (name)
VALUES ($1)
ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name
RETURNING id",
		)
		.bind(name.as_str())
		.fetch_one(&mut **tx)
		.await?;

		sqlx::query("INSERT INTO post_tags (post_id, tag_id) VALUES ($1, $2) ON CONFLICT DO NOTHING")
			.bind(post_id)
			.bind(tag_id)
			.execute(&mut **tx)
			.await?;
	}

	Ok(())
}

/// Authors manage their own posts. Orphaned posts fall to editors.
fn ensure_can_modify(actor: &CurrentUser, post: &Post) -> Result<()> {
	let allowed = match post.user_id {
		Some(author_id) => author_id == actor.id,
		None => actor.role.at_least(UserRole::Editor),
	};

	if allowed {
		return Ok(());
	}

	Err(Error::forbidden(format!("Only the author may change post {}.", post.id)))
}
