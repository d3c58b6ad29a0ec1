use devinote_domain::{
	access::ShareRole,
	pagination::{PageRequest, SortDirection},
};
use devinote_service::{
	CreateLabelRequest, CreateNoteRequest, CurrentUser, DevinoteService, Error, NoteResponse,
	ShareRequest, UpdateNoteRequest,
};

fn share(target: &CurrentUser, role: ShareRole) -> ShareRequest {
	ShareRequest { target_user_id: target.id, role }
}

async fn note(service: &DevinoteService, owner: &CurrentUser, title: &str) -> NoteResponse {
	service
		.create_note(
			owner,
			CreateNoteRequest {
				title: title.to_string(),
				content: String::new(),
				color: None,
				label_ids: Vec::new(),
			},
		)
		.await
		.expect("Failed to create note.")
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set DEVINOTE_PG_DSN to run."]
async fn strangers_get_not_found_and_readers_get_forbidden() {
	let Some(test_db) = super::test_db().await else {
		eprintln!(
			"Skipping strangers_get_not_found_and_readers_get_forbidden; set DEVINOTE_PG_DSN to run."
		);

		return;
	};
	let service = super::build_service(&test_db).await.expect("Failed to build service.");
	let owner = super::sign_up(&service, "owner").await;
	let reader = super::sign_up(&service, "reader").await;
	let stranger = super::sign_up(&service, "stranger").await;
	let created = note(&service, &owner, "Groceries").await;

	service
		.share_note(&owner, created.id, share(&reader, ShareRole::Read))
		.await
		.expect("Failed to share note.");

	let hidden = service.get_note(&stranger, created.id).await.expect_err("Stranger must not see.");

	assert!(matches!(hidden, Error::NotFound { .. }), "Unexpected error: {hidden:?}");

	let seen = service.get_note(&reader, created.id).await.expect("Reader must see the note.");

	assert_eq!(seen.title, "Groceries");

	let edit = service
		.update_note(
			&reader,
			created.id,
			UpdateNoteRequest { title: Some("Mine now".to_string()), ..Default::default() },
		)
		.await
		.expect_err("Read share must not allow edits.");

	assert!(matches!(edit, Error::Forbidden { .. }), "Unexpected error: {edit:?}");

	let delete =
		service.delete_note(&reader, created.id).await.expect_err("Read share must not delete.");

	assert!(matches!(delete, Error::Forbidden { .. }), "Unexpected error: {delete:?}");

	let missing = service.get_note(&owner, created.id + 1_000).await.expect_err("No such note.");

	assert!(matches!(missing, Error::NotFound { .. }), "Unexpected error: {missing:?}");

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set DEVINOTE_PG_DSN to run."]
async fn label_share_reaches_labelled_notes() {
	let Some(test_db) = super::test_db().await else {
		eprintln!("Skipping label_share_reaches_labelled_notes; set DEVINOTE_PG_DSN to run.");

		return;
	};
	let service = super::build_service(&test_db).await.expect("Failed to build service.");
	let owner = super::sign_up(&service, "owner").await;
	let friend = super::sign_up(&service, "friend").await;
	let label = service
		.create_label(&owner, CreateLabelRequest { name: "travel".to_string() })
		.await
		.expect("Failed to create label.");
	let created = service
		.create_note(
			&owner,
			CreateNoteRequest {
				title: "Packing list".to_string(),
				content: "Passport".to_string(),
				color: Some("#ffcc00".to_string()),
				label_ids: vec![label.id],
			},
		)
		.await
		.expect("Failed to create note.");

	assert_eq!(created.label_ids, vec![label.id]);

	service
		.share_label(&owner, label.id, share(&friend, ShareRole::Edit))
		.await
		.expect("Failed to share label.");

	let updated = service
		.update_note(
			&friend,
			created.id,
			UpdateNoteRequest {
				content: Some("Passport, charger".to_string()),
				..Default::default()
			},
		)
		.await
		.expect("Edit share on the label must allow edits.");

	assert_eq!(updated.content, "Passport, charger");
	assert_eq!(updated.title, "Packing list");
	assert_eq!(updated.label_ids, vec![label.id]);

	let relabel = service
		.update_note(
			&friend,
			created.id,
			UpdateNoteRequest { label_ids: Some(Vec::new()), ..Default::default() },
		)
		.await
		.expect_err("Only the owner may relabel.");

	assert!(matches!(relabel, Error::Forbidden { .. }), "Unexpected error: {relabel:?}");

	let delete = service.delete_note(&friend, created.id).await.expect_err("Edit must not delete.");

	assert!(matches!(delete, Error::Forbidden { .. }), "Unexpected error: {delete:?}");

	service.delete_label(&owner, label.id).await.expect("Failed to delete label.");

	let gone = service.get_note(&friend, created.id).await.expect_err("Share went with the label.");

	assert!(matches!(gone, Error::NotFound { .. }), "Unexpected error: {gone:?}");

	let kept = service.get_note(&owner, created.id).await.expect("Owner keeps the note.");

	assert!(kept.label_ids.is_empty());

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set DEVINOTE_PG_DSN to run."]
async fn foreign_labels_are_not_attached() {
	let Some(test_db) = super::test_db().await else {
		eprintln!("Skipping foreign_labels_are_not_attached; set DEVINOTE_PG_DSN to run.");

		return;
	};
	let service = super::build_service(&test_db).await.expect("Failed to build service.");
	let owner = super::sign_up(&service, "owner").await;
	let other = super::sign_up(&service, "other").await;
	let foreign = service
		.create_label(&other, CreateLabelRequest { name: "secret".to_string() })
		.await
		.expect("Failed to create label.");
	let created = service
		.create_note(
			&owner,
			CreateNoteRequest {
				title: "Plain".to_string(),
				content: String::new(),
				color: None,
				label_ids: vec![foreign.id],
			},
		)
		.await
		.expect("Failed to create note.");

	assert!(created.label_ids.is_empty());

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set DEVINOTE_PG_DSN to run."]
async fn visible_notes_are_deduplicated_newest_first() {
	let Some(test_db) = super::test_db().await else {
		eprintln!("Skipping visible_notes_are_deduplicated_newest_first; set DEVINOTE_PG_DSN to run.");

		return;
	};
	let service = super::build_service(&test_db).await.expect("Failed to build service.");
	let owner = super::sign_up(&service, "owner").await;
	let viewer = super::sign_up(&service, "viewer").await;
	let label = service
		.create_label(&owner, CreateLabelRequest { name: "shared".to_string() })
		.await
		.expect("Failed to create label.");
	let own = note(&service, &viewer, "Own note").await;
	let direct = note(&service, &owner, "Direct").await;
	let both = service
		.create_note(
			&owner,
			CreateNoteRequest {
				title: "Both paths".to_string(),
				content: String::new(),
				color: None,
				label_ids: vec![label.id],
			},
		)
		.await
		.expect("Failed to create note.");
	let private = note(&service, &owner, "Private").await;

	for note_id in [direct.id, both.id] {
		service
			.share_note(&owner, note_id, share(&viewer, ShareRole::Read))
			.await
			.expect("Failed to share note.");
	}

	service
		.share_label(&owner, label.id, share(&viewer, ShareRole::Read))
		.await
		.expect("Failed to share label.");

	let page = service
		.list_visible_notes(&viewer, &PageRequest::default())
		.await
		.expect("Failed to list notes.");
	let ids = page.items.iter().map(|note| note.id).collect::<Vec<_>>();

	assert_eq!(page.total, 3);
	assert_eq!(ids, vec![both.id, direct.id, own.id]);
	assert!(!ids.contains(&private.id));
	assert_eq!(page.items[0].label_ids, vec![label.id]);

	let by_title = service
		.list_visible_notes(
			&viewer,
			&PageRequest {
				order_by: Some("title".to_string()),
				direction: Some(SortDirection::Asc),
				per_page: Some(2),
				..Default::default()
			},
		)
		.await
		.expect("Failed to list notes.");
	let titles = by_title.items.iter().map(|note| note.title.as_str()).collect::<Vec<_>>();

	assert_eq!(titles, vec!["Both paths", "Direct"]);
	assert_eq!(by_title.pages, 2);
	assert!(by_title.has_next);

	let searched = service
		.list_visible_notes(
			&viewer,
			&PageRequest { search: Some("own".to_string()), ..Default::default() },
		)
		.await
		.expect("Failed to search notes.");

	assert_eq!(searched.total, 1);
	assert_eq!(searched.items[0].id, own.id);

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}
