pub mod auth;
pub mod categories;
pub mod labels;
pub mod notes;
pub mod posts;
pub mod sharing;
pub mod tags;
pub mod time_serde;
pub mod users;

mod access;
mod error;
mod listing;

pub use categories::{CategoryResponse, CreateCategoryRequest, UpdateCategoryRequest};
pub use error::{Error, Result};
pub use labels::{CreateLabelRequest, LabelResponse, UpdateLabelRequest};
pub use notes::{CreateNoteRequest, NoteResponse, UpdateNoteRequest};
pub use posts::{CreatePostRequest, PostResponse, UpdatePostRequest};
pub use sharing::{ShareRequest, ShareResponse};
pub use tags::{PopularTagResponse, TagRequest, TagResponse};
pub use users::{CurrentUser, LoginRequest, LoginResponse, RegisterRequest, UserProfile};

use devinote_config::{Config, Pagination};
use devinote_domain::roles::UserRole;
use devinote_storage::db::Db;

pub struct DevinoteService {
	pub cfg: Config,
	pub db: Db,
}
impl DevinoteService {
	pub fn new(cfg: Config, db: Db) -> Self {
		Self { cfg, db }
	}

	pub(crate) fn limits(&self) -> &Pagination {
		&self.cfg.pagination
	}

	pub(crate) fn require_role(&self, actor: &CurrentUser, required: UserRole) -> Result<()> {
		if actor.role.at_least(required) {
			return Ok(());
		}

		Err(Error::forbidden(format!("This action requires the {required} role.")))
	}
}
