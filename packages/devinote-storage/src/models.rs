use time::OffsetDateTime;

#[derive(Clone, Debug, sqlx::FromRow)]
pub struct User {
	pub id: i64,
	pub email: String,
	pub username: String,
	pub name: Option<String>,
	pub surname: Option<String>,
	pub password_hash: String,
	pub role: String,
	pub is_active: bool,
	pub created_at: OffsetDateTime,
}

#[derive(Clone, Debug, sqlx::FromRow)]
pub struct Category {
	pub id: i64,
	pub name: String,
	pub slug: String,
	pub created_at: OffsetDateTime,
}

#[derive(Clone, Debug, sqlx::FromRow)]
pub struct Tag {
	pub id: i64,
	pub name: String,
	pub created_at: OffsetDateTime,
}

#[derive(Clone, Debug, sqlx::FromRow)]
pub struct PopularTag {
	pub id: i64,
	pub name: String,
	pub uses: i64,
}

#[derive(Clone, Debug, sqlx::FromRow)]
pub struct Post {
	pub id: i64,
	pub title: String,
	pub content: String,
	pub user_id: Option<i64>,
	pub category_id: Option<i64>,
	pub created_at: OffsetDateTime,
}

#[derive(Clone, Debug, sqlx::FromRow)]
pub struct Note {
	pub id: i64,
	pub title: String,
	pub content: String,
	pub color: Option<String>,
	pub owner_id: i64,
	pub created_at: OffsetDateTime,
}

#[derive(Clone, Debug, sqlx::FromRow)]
pub struct Label {
	pub id: i64,
	pub name: String,
	pub owner_id: i64,
	pub created_at: OffsetDateTime,
}

/// A row of `note_shares` or `label_shares`. `resource_id` is the note or label id.
#[derive(Clone, Debug, sqlx::FromRow)]
pub struct Share {
	pub id: i64,
	pub resource_id: i64,
	pub user_id: i64,
	pub role: String,
	pub created_at: OffsetDateTime,
}
