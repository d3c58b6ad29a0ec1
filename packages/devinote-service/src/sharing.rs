//! Owner-managed shares on notes and labels.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{CurrentUser, DevinoteService, Error, Result, access};
use devinote_domain::access::{self as rules, Grants, ShareRole};
use devinote_storage::{
	models::Share,
	queries::{self, ShareTarget},
};

#[derive(Clone, Debug, Deserialize)]
pub struct ShareRequest {
	pub target_user_id: i64,
	#[serde(default)]
	pub role: ShareRole,
}

#[derive(Clone, Debug, Serialize)]
pub struct ShareResponse {
	pub id: i64,
	pub resource: &'static str,
	pub resource_id: i64,
	pub user_id: i64,
	pub role: ShareRole,
	#[serde(serialize_with = "crate::time_serde::serialize")]
	pub created_at: OffsetDateTime,
}
impl ShareResponse {
	fn new(target: ShareTarget, share: Share) -> Result<Self> {
		let role = ShareRole::parse(&share.role).ok_or_else(|| Error::Storage {
			message: format!("Share {} carries unknown role {:?}.", share.id, share.role),
		})?;

		Ok(Self {
			id: share.id,
			resource: target.resource(),
			resource_id: share.resource_id,
			user_id: share.user_id,
			role,
			created_at: share.created_at,
		})
	}
}

impl DevinoteService {
	pub async fn share_note(
		&self,
		actor: &CurrentUser,
		note_id: i64,
		req: ShareRequest,
	) -> Result<ShareResponse> {
		self.upsert_share(actor, ShareTarget::Note, note_id, req).await
	}

	pub async fn unshare_note(
		&self,
		actor: &CurrentUser,
		note_id: i64,
		target_user_id: i64,
	) -> Result<()> {
		self.remove_share(actor, ShareTarget::Note, note_id, target_user_id).await
	}

	pub async fn list_note_shares(
		&self,
		actor: &CurrentUser,
		note_id: i64,
	) -> Result<Vec<ShareResponse>> {
		self.list_shares(actor, ShareTarget::Note, note_id).await
	}

	pub async fn share_label(
		&self,
		actor: &CurrentUser,
		label_id: i64,
		req: ShareRequest,
	) -> Result<ShareResponse> {
		self.upsert_share(actor, ShareTarget::Label, label_id, req).await
	}

	pub async fn unshare_label(
		&self,
		actor: &CurrentUser,
		label_id: i64,
		target_user_id: i64,
	) -> Result<()> {
		self.remove_share(actor, ShareTarget::Label, label_id, target_user_id).await
	}

	pub async fn list_label_shares(
		&self,
		actor: &CurrentUser,
		label_id: i64,
	) -> Result<Vec<ShareResponse>> {
		self.list_shares(actor, ShareTarget::Label, label_id).await
	}

	async fn upsert_share(
		&self,
		actor: &CurrentUser,
		target: ShareTarget,
		resource_id: i64,
		req: ShareRequest,
	) -> Result<ShareResponse> {
		self.ensure_owner(actor, target, resource_id).await?;

		if req.target_user_id == actor.id {
			return Err(Error::invalid(format!(
				"Cannot share a {} with yourself.",
				target.resource()
			)));
		}
		if !queries::user_exists(&self.db.pool, req.target_user_id).await? {
			return Err(Error::not_found("user", req.target_user_id));
		}

		let share = queries::upsert_share(
			&self.db.pool,
			target,
			resource_id,
			req.target_user_id,
			req.role.as_str(),
		)
		.await?;

		tracing::info!(
			resource = target.resource(),
			resource_id,
			target_user_id = req.target_user_id,
			role = %req.role,
			actor = actor.id,
			"Share upserted."
		);

		ShareResponse::new(target, share)
	}

	async fn remove_share(
		&self,
		actor: &CurrentUser,
		target: ShareTarget,
		resource_id: i64,
		target_user_id: i64,
	) -> Result<()> {
		self.ensure_owner(actor, target, resource_id).await?;

		let removed =
			queries::remove_share(&self.db.pool, target, resource_id, target_user_id).await?;

		tracing::info!(
			resource = target.resource(),
			resource_id,
			target_user_id,
			removed,
			actor = actor.id,
			"Share removed."
		);

		Ok(())
	}

	async fn list_shares(
		&self,
		actor: &CurrentUser,
		target: ShareTarget,
		resource_id: i64,
	) -> Result<Vec<ShareResponse>> {
		self.ensure_owner(actor, target, resource_id).await?;

		queries::list_shares(&self.db.pool, target, resource_id)
			.await?
			.into_iter()
			.map(|share| ShareResponse::new(target, share))
			.collect()
	}

	async fn ensure_owner(
		&self,
		actor: &CurrentUser,
		target: ShareTarget,
		resource_id: i64,
	) -> Result<()> {
		let grants: Option<Grants> = match target {
			ShareTarget::Note => access::note_grants(&self.db.pool, resource_id, actor.id).await?,
			ShareTarget::Label => access::label_grants(&self.db.pool, resource_id, actor.id).await?,
		};

		rules::authorize_owner(grants.as_ref(), actor.id)
			.map_err(Error::denied(target.resource(), resource_id))
	}
}
