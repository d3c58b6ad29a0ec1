use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{CurrentUser, DevinoteService, Error, Result, access};
use devinote_domain::{
	access::{self as rules, Action},
	pagination::{self, OrderKeys, Page, PageRequest, Projection, SortDirection, SortKey},
	validation,
};
use devinote_storage::{models::Note, queries};

const NOTE_COLUMNS: &str = "n.id, n.title, n.content, n.color, n.owner_id, n.created_at";

#[derive(Clone, Debug, Deserialize)]
pub struct CreateNoteRequest {
	pub title: String,
	#[serde(default)]
	pub content: String,
	#[serde(default)]
	pub color: Option<String>,
	#[serde(default)]
	pub label_ids: Vec<i64>,
}

/// Partial update. `label_ids`, when present, replaces the whole label set and is owner-only.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct UpdateNoteRequest {
	#[serde(default)]
	pub title: Option<String>,
	#[serde(default)]
	pub content: Option<String>,
	#[serde(default)]
	pub color: Option<String>,
	#[serde(default)]
	pub label_ids: Option<Vec<i64>>,
}

#[derive(Clone, Debug, Serialize)]
pub struct NoteResponse {
	pub id: i64,
	pub title: String,
	pub content: String,
	pub color: Option<String>,
	pub owner_id: i64,
	pub label_ids: Vec<i64>,
	#[serde(serialize_with = "crate::time_serde::serialize")]
	pub created_at: OffsetDateTime,
}
impl NoteResponse {
	fn new(note: Note, label_ids: Vec<i64>) -> Self {
		Self {
			id: note.id,
			title: note.title,
			content: note.content,
			color: note.color,
			owner_id: note.owner_id,
			label_ids,
			created_at: note.created_at,
		}
	}
}

impl DevinoteService {
	pub async fn create_note(
		&self,
		actor: &CurrentUser,
		req: CreateNoteRequest,
	) -> Result<NoteResponse> {
		let title = validation::note_title(&req.title)?;
		let mut tx = self.db.pool.begin().await?;
		let note = sqlx::query_as::<_, Note>(
			"\
INSERT INTO notes (title, content, color, owner_id)
VALUES ($1, $2, $3, $4)
RETURNING id, title, content, color, owner_id, created_at",
		)
		.bind(title.as_str())
		.bind(req.content.as_str())
		.bind(req.color.as_deref())
		.bind(actor.id)
		.fetch_one(&mut *tx)
		.await?;
		let label_ids =
			queries::replace_note_labels(&mut tx, note.id, actor.id, &req.label_ids).await?;

		tx.commit().await?;

		tracing::info!(
			note_id = note.id,
			owner_id = actor.id,
			labels = label_ids.len(),
			"Note created."
		);

		Ok(NoteResponse::new(note, label_ids))
	}

	pub async fn get_note(&self, actor: &CurrentUser, note_id: i64) -> Result<NoteResponse> {
		let grants = access::note_grants(&self.db.pool, note_id, actor.id).await?;

		rules::authorize(grants.as_ref(), actor.id, Action::Read)
			.map_err(Error::denied("note", note_id))?;

		let note = self.find_note(note_id).await?;
		let label_ids = queries::note_label_ids(&self.db.pool, note_id).await?;

		Ok(NoteResponse::new(note, label_ids))
	}

	pub async fn update_note(
		&self,
		actor: &CurrentUser,
		note_id: i64,
		req: UpdateNoteRequest,
	) -> Result<NoteResponse> {
		let grants = access::note_grants(&self.db.pool, note_id, actor.id).await?;

		rules::authorize(grants.as_ref(), actor.id, Action::Edit)
			.map_err(Error::denied("note", note_id))?;

		if req.label_ids.is_some() && !grants.as_ref().is_some_and(|grants| grants.is_owner(actor.id))
		{
			return Err(Error::forbidden(format!("Only the owner may relabel note {note_id}.")));
		}

		let title = req.title.as_deref().map(validation::note_title).transpose()?;
		let mut tx = self.db.pool.begin().await?;
		let note = sqlx::query_as::<_, Note>(
			"\
UPDATE notes
SET
	title = COALESCE($1, title),
	content = COALESCE($2, content),
	color = COALESCE($3, color)
WHERE id = $4
RETURNING id, title, content, color, owner_id, created_at",
		)
		.bind(title.as_deref())
		.bind(req.content.as_deref())
		.bind(req.color.as_deref())
		.bind(note_id)
		.fetch_optional(&mut *tx)
		.await?
		.ok_or_else(|| Error::not_found("note", note_id))?;
		let label_ids = match req.label_ids.as_deref() {
			Some(requested) =>
				queries::replace_note_labels(&mut tx, note_id, note.owner_id, requested).await?,
			None => queries::note_label_ids(&mut *tx, note_id).await?,
		};

		tx.commit().await?;

		tracing::info!(note_id, actor = actor.id, "Note updated.");

		Ok(NoteResponse::new(note, label_ids))
	}

	pub async fn delete_note(&self, actor: &CurrentUser, note_id: i64) -> Result<()> {
		let grants = access::note_grants(&self.db.pool, note_id, actor.id).await?;

		rules::authorize(grants.as_ref(), actor.id, Action::Delete)
			.map_err(Error::denied("note", note_id))?;

		sqlx::query("DELETE FROM notes WHERE id = $1").bind(note_id).execute(&self.db.pool).await?;

		tracing::info!(note_id, actor = actor.id, "Note deleted.");

		Ok(())
	}

	/// Owned notes, directly shared notes and notes reachable through shared labels, paginated in
	/// memory. Without an explicit ordering the newest note comes first.
	pub async fn list_visible_notes(
		&self,
		actor: &CurrentUser,
		request: &PageRequest,
	) -> Result<Page<NoteResponse>> {
		let owned = sqlx::query_as::<_, Note>(&format!(
			"SELECT {NOTE_COLUMNS} FROM notes n WHERE n.owner_id = $1"
		))
		.bind(actor.id)
		.fetch_all(&self.db.pool)
		.await?;
		let direct = sqlx::query_as::<_, Note>(&format!(
			"\
SELECT {NOTE_COLUMNS}
FROM notes n
JOIN note_shares ns ON ns.note_id = n.id
WHERE ns.user_id = $1"
		))
		.bind(actor.id)
		.fetch_all(&self.db.pool)
		.await?;
		let via_labels = sqlx::query_as::<_, Note>(&format!(
			"\
SELECT DISTINCT {NOTE_COLUMNS}
FROM notes n
JOIN note_labels nl ON nl.note_id = n.id
JOIN label_shares ls ON ls.label_id = nl.label_id
WHERE ls.user_id = $1"
		))
		.bind(actor.id)
		.fetch_all(&self.db.pool)
		.await?;
		let visible =
			rules::merge_visible(owned.into_iter().chain(direct).chain(via_labels), |note| note.id);
		let mut request = request.clone();

		if request.order_by.is_none() && request.direction.is_none() {
			request.direction = Some(SortDirection::Desc);
		}

		let mut page = pagination::paginate(
			visible,
			&request,
			self.limits(),
			|note| note.title.as_str(),
			&visible_note_order(),
		);
		let notes = std::mem::take(&mut page.items);
		let note_ids = notes.iter().map(|note| note.id).collect::<Vec<_>>();
		let mut labels: HashMap<i64, Vec<i64>> = HashMap::new();

		for (note_id, label_id) in queries::note_label_pairs(&self.db.pool, &note_ids).await? {
			labels.entry(note_id).or_default().push(label_id);
		}

		let items = notes
			.into_iter()
			.map(|note| {
				let label_ids = labels.remove(&note.id).unwrap_or_default();

				NoteResponse::new(note, label_ids)
			})
			.collect();

		Ok(page.with_items(items))
	}

	async fn find_note(&self, note_id: i64) -> Result<Note> {
		sqlx::query_as::<_, Note>(&format!("SELECT {NOTE_COLUMNS} FROM notes n WHERE n.id = $1"))
			.bind(note_id)
			.fetch_optional(&self.db.pool)
			.await?
			.ok_or_else(|| Error::not_found("note", note_id))
	}
}

fn visible_note_order() -> OrderKeys<Projection<Note>> {
	OrderKeys::new(by_id as Projection<Note>)
		.with("title", by_title)
		.with("created_at", by_created_at)
}

fn by_id(note: &Note) -> SortKey {
	SortKey::Int(note.id)
}

fn by_title(note: &Note) -> SortKey {
	SortKey::Text(note.title.to_lowercase())
}

fn by_created_at(note: &Note) -> SortKey {
	SortKey::Time(note.created_at)
}
