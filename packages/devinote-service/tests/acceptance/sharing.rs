use devinote_domain::access::ShareRole;
use devinote_service::{CreateLabelRequest, CreateNoteRequest, Error, ShareRequest};

#[tokio::test]
#[ignore = "Requires external Postgres. Set DEVINOTE_PG_DSN to run."]
async fn resharing_updates_the_existing_grant() {
	let Some(test_db) = super::test_db().await else {
		eprintln!("Skipping resharing_updates_the_existing_grant; set DEVINOTE_PG_DSN to run.");

		return;
	};
	let service = super::build_service(&test_db).await.expect("Failed to build service.");
	let owner = super::sign_up(&service, "owner").await;
	let peer = super::sign_up(&service, "peer").await;
	let note = service
		.create_note(
			&owner,
			CreateNoteRequest {
				title: "Budget".to_string(),
				content: String::new(),
				color: None,
				label_ids: Vec::new(),
			},
		)
		.await
		.expect("Failed to create note.");
	let first = service
		.share_note(&owner, note.id, ShareRequest { target_user_id: peer.id, role: ShareRole::Read })
		.await
		.expect("Failed to share note.");
	let second = service
		.share_note(
			&owner,
			note.id,
			ShareRequest { target_user_id: peer.id, role: ShareRole::Delete },
		)
		.await
		.expect("Failed to reshare note.");

	assert_eq!(first.id, second.id);
	assert_eq!(second.role, ShareRole::Delete);
	assert_eq!(second.resource, "note");

	let shares = service.list_note_shares(&owner, note.id).await.expect("Failed to list shares.");

	assert_eq!(shares.len(), 1);
	assert_eq!(shares[0].user_id, peer.id);
	assert_eq!(shares[0].role, ShareRole::Delete);

	service.delete_note(&peer, note.id).await.expect("Delete share must allow deletion.");

	let gone = service.get_note(&owner, note.id).await.expect_err("Note was deleted.");

	assert!(matches!(gone, Error::NotFound { .. }), "Unexpected error: {gone:?}");

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set DEVINOTE_PG_DSN to run."]
async fn only_owners_manage_shares() {
	let Some(test_db) = super::test_db().await else {
		eprintln!("Skipping only_owners_manage_shares; set DEVINOTE_PG_DSN to run.");

		return;
	};
	let service = super::build_service(&test_db).await.expect("Failed to build service.");
	let owner = super::sign_up(&service, "owner").await;
	let editor = super::sign_up(&service, "editor").await;
	let stranger = super::sign_up(&service, "stranger").await;
	let label = service
		.create_label(&owner, CreateLabelRequest { name: "work".to_string() })
		.await
		.expect("Failed to create label.");

	service
		.share_label(&owner, label.id, ShareRequest { target_user_id: editor.id, role: ShareRole::Edit })
		.await
		.expect("Failed to share label.");

	let reshare = service
		.share_label(
			&editor,
			label.id,
			ShareRequest { target_user_id: stranger.id, role: ShareRole::Read },
		)
		.await
		.expect_err("Shared users must not reshare.");

	assert!(matches!(reshare, Error::Forbidden { .. }), "Unexpected error: {reshare:?}");

	let listing = service
		.list_label_shares(&stranger, label.id)
		.await
		.expect_err("Strangers must not see the label.");

	assert!(matches!(listing, Error::NotFound { .. }), "Unexpected error: {listing:?}");

	let to_self = service
		.share_label(&owner, label.id, ShareRequest { target_user_id: owner.id, role: ShareRole::Read })
		.await
		.expect_err("Owners cannot share with themselves.");

	assert!(matches!(to_self, Error::InvalidRequest { .. }), "Unexpected error: {to_self:?}");

	let to_nobody = service
		.share_label(&owner, label.id, ShareRequest { target_user_id: 999_999, role: ShareRole::Read })
		.await
		.expect_err("Unknown users cannot receive shares.");

	assert!(matches!(to_nobody, Error::NotFound { .. }), "Unexpected error: {to_nobody:?}");

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set DEVINOTE_PG_DSN to run."]
async fn unsharing_is_idempotent() {
	let Some(test_db) = super::test_db().await else {
		eprintln!("Skipping unsharing_is_idempotent; set DEVINOTE_PG_DSN to run.");

		return;
	};
	let service = super::build_service(&test_db).await.expect("Failed to build service.");
	let owner = super::sign_up(&service, "owner").await;
	let peer = super::sign_up(&service, "peer").await;
	let label = service
		.create_label(&owner, CreateLabelRequest { name: "family".to_string() })
		.await
		.expect("Failed to create label.");

	service
		.share_label(&owner, label.id, ShareRequest { target_user_id: peer.id, role: ShareRole::Read })
		.await
		.expect("Failed to share label.");

	assert!(service.get_label(&peer, label.id).await.is_ok());

	service.unshare_label(&owner, label.id, peer.id).await.expect("Failed to unshare label.");
	service.unshare_label(&owner, label.id, peer.id).await.expect("Second unshare must succeed.");

	let hidden = service.get_label(&peer, label.id).await.expect_err("Share was revoked.");

	assert!(matches!(hidden, Error::NotFound { .. }), "Unexpected error: {hidden:?}");
	assert!(
		service.list_label_shares(&owner, label.id).await.expect("Failed to list shares.").is_empty()
	);

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}
