use devinote_domain::pagination::{PageRequest, SortDirection};
use devinote_service::{DevinoteService, TagRequest};

async fn seed_tags(service: &DevinoteService, count: usize) -> Vec<i64> {
	let mut ids = Vec::with_capacity(count);

	for n in 0..count {
		let tag = service
			.create_tag(TagRequest { name: format!("tag-{n:02}") })
			.await
			.expect("Failed to create tag.");

		ids.push(tag.id);
	}

	ids
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set DEVINOTE_PG_DSN to run."]
async fn sql_listing_windows_and_clamps() {
	let Some(test_db) = super::test_db().await else {
		eprintln!("Skipping sql_listing_windows_and_clamps; set DEVINOTE_PG_DSN to run.");

		return;
	};
	let service = super::build_service(&test_db).await.expect("Failed to build service.");
	let ids = seed_tags(&service, 25).await;
	let last = service
		.list_tags(&PageRequest { page: Some(3), per_page: Some(10), ..Default::default() })
		.await
		.expect("Failed to list tags.");

	assert_eq!(last.total, 25);
	assert_eq!(last.pages, 3);
	assert_eq!(last.items.len(), 5);
	assert!(last.has_prev);
	assert!(!last.has_next);
	assert_eq!(last.items.iter().map(|tag| tag.id).collect::<Vec<_>>(), ids[20..].to_vec());

	let past_end = service
		.list_tags(&PageRequest { page: Some(9), per_page: Some(10), ..Default::default() })
		.await
		.expect("Failed to list tags.");

	assert!(past_end.items.is_empty());
	assert_eq!(past_end.total, 25);

	let tiny = service
		.list_tags(&PageRequest { page: Some(0), per_page: Some(0), ..Default::default() })
		.await
		.expect("Failed to list tags.");

	assert_eq!(tiny.page, 1);
	assert_eq!(tiny.per_page, 1);
	assert_eq!(tiny.pages, 25);

	let huge = service
		.list_tags(&PageRequest { per_page: Some(5_000), ..Default::default() })
		.await
		.expect("Failed to list tags.");

	assert_eq!(huge.per_page, 100);
	assert_eq!(huge.items.len(), 25);

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set DEVINOTE_PG_DSN to run."]
async fn sql_listing_orders_and_searches() {
	let Some(test_db) = super::test_db().await else {
		eprintln!("Skipping sql_listing_orders_and_searches; set DEVINOTE_PG_DSN to run.");

		return;
	};
	let service = super::build_service(&test_db).await.expect("Failed to build service.");

	for name in ["gamma", "alpha", "beta", "x%ray"] {
		service.create_tag(TagRequest { name: name.to_string() }).await.expect("Failed to create tag.");
	}

	let by_name = service
		.list_tags(&PageRequest {
			order_by: Some("name".to_string()),
			direction: Some(SortDirection::Desc),
			..Default::default()
		})
		.await
		.expect("Failed to list tags.");

	assert_eq!(
		by_name.items.iter().map(|tag| tag.name.as_str()).collect::<Vec<_>>(),
		vec!["x%ray", "gamma", "beta", "alpha"]
	);

	let unknown_key = service
		.list_tags(&PageRequest {
			order_by: Some("password_hash".to_string()),
			..Default::default()
		})
		.await
		.expect("Unknown sort keys must fall back.");

	assert_eq!(
		unknown_key.items.iter().map(|tag| tag.name.as_str()).collect::<Vec<_>>(),
		vec!["gamma", "alpha", "beta", "x%ray"]
	);

	let literal = service
		.list_tags(&PageRequest { search: Some("%".to_string()), ..Default::default() })
		.await
		.expect("Failed to search tags.");

	assert_eq!(literal.total, 1);
	assert_eq!(literal.items[0].name, "x%ray");

	let case_blind = service
		.list_tags(&PageRequest { search: Some("  ALP ".to_string()), ..Default::default() })
		.await
		.expect("Failed to search tags.");

	assert_eq!(case_blind.total, 1);
	assert_eq!(case_blind.items[0].name, "alpha");

	let nothing = service
		.list_tags(&PageRequest { search: Some("zzz".to_string()), ..Default::default() })
		.await
		.expect("Failed to search tags.");

	assert_eq!(nothing.total, 0);
	assert_eq!(nothing.pages, 0);
	assert!(nothing.items.is_empty());

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}
