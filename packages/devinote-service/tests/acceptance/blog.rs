use devinote_service::{
	CreateCategoryRequest, CreatePostRequest, CurrentUser, DevinoteService, Error, PostResponse,
	TagRequest, UpdateCategoryRequest, UpdatePostRequest,
};

async fn post(
	service: &DevinoteService,
	author: &CurrentUser,
	title: &str,
	tags: &[&str],
) -> PostResponse {
	service
		.create_post(
			author,
			CreatePostRequest {
				title: title.to_string(),
				content: "Long enough content for a post.".to_string(),
				category_id: None,
				tags: tags.iter().map(|tag| tag.to_string()).collect(),
			},
		)
		.await
		.expect("Failed to create post.")
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set DEVINOTE_PG_DSN to run."]
async fn category_writes_require_editor() {
	let Some(test_db) = super::test_db().await else {
		eprintln!("Skipping category_writes_require_editor; set DEVINOTE_PG_DSN to run.");

		return;
	};
	let service = super::build_service(&test_db).await.expect("Failed to build service.");
	let user = super::sign_up(&service, "writer").await;
	let request =
		CreateCategoryRequest { name: "Rust".to_string(), slug: "rust".to_string() };
	let err = service
		.create_category(&user, request.clone())
		.await
		.expect_err("Plain users must not create categories.");

	assert!(matches!(err, Error::Forbidden { .. }), "Unexpected error: {err:?}");

	let editor = super::promote(&service, &user, "editor").await;
	let category =
		service.create_category(&editor, request.clone()).await.expect("Failed to create category.");
	let duplicate = service
		.create_category(&editor, request)
		.await
		.expect_err("Duplicate category must conflict.");

	assert!(matches!(duplicate, Error::Conflict { .. }), "Unexpected error: {duplicate:?}");

	let renamed = service
		.update_category(
			&editor,
			category.id,
			UpdateCategoryRequest { name: Some("Rust lang".to_string()), slug: None },
		)
		.await
		.expect("Failed to update category.");

	assert_eq!(renamed.name, "Rust lang");
	assert_eq!(renamed.slug, "rust");

	let created = service
		.create_post(
			&editor,
			CreatePostRequest {
				title: "Ownership".to_string(),
				content: "Borrowing rules explained.".to_string(),
				category_id: Some(category.id),
				tags: vec!["rust".to_string()],
			},
		)
		.await
		.expect("Failed to create post.");

	assert_eq!(created.category.as_ref().map(|category| category.id), Some(category.id));

	service.delete_category(&editor, category.id).await.expect("Failed to delete category.");

	let orphaned = service.get_post(created.id).await.expect("Post must survive.");

	assert!(orphaned.category.is_none());

	let missing = service
		.delete_category(&editor, category.id)
		.await
		.expect_err("Category is already gone.");

	assert!(matches!(missing, Error::NotFound { .. }), "Unexpected error: {missing:?}");

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set DEVINOTE_PG_DSN to run."]
async fn posts_link_tags_and_filter_by_them() {
	let Some(test_db) = super::test_db().await else {
		eprintln!("Skipping posts_link_tags_and_filter_by_them; set DEVINOTE_PG_DSN to run.");

		return;
	};
	let service = super::build_service(&test_db).await.expect("Failed to build service.");
	let author = super::sign_up(&service, "author").await;
	let first = post(&service, &author, "First post", &["rust", "web"]).await;
	let second = post(&service, &author, "Second post", &["web"]).await;
	let third = post(&service, &author, "Third post", &["db", "Rust"]).await;

	assert_eq!(
		first.tags.iter().map(|tag| tag.name.as_str()).collect::<Vec<_>>(),
		vec!["rust", "web"]
	);
	assert_eq!(first.user_id, Some(author.id));

	let matched = service.posts_by_tags(" rust , db,rust ").await.expect("Failed to filter posts.");

	assert_eq!(matched.iter().map(|post| post.id).collect::<Vec<_>>(), vec![first.id, third.id]);

	let none = service.posts_by_tags(" , ").await.expect("Blank filter must succeed.");

	assert!(none.is_empty());

	let popular = service.most_popular_tag().await.expect("Failed to find popular tag.");

	assert_eq!(popular.name, "rust");
	assert_eq!(popular.uses, 2);

	service
		.update_post(
			&author,
			second.id,
			UpdatePostRequest { title: Some("Second post, revised".to_string()), content: None },
		)
		.await
		.expect("Failed to update post.");

	let duplicate = service
		.create_post(
			&author,
			CreatePostRequest {
				title: "First post".to_string(),
				content: "Long enough content for a post.".to_string(),
				category_id: None,
				tags: vec!["rust".to_string()],
			},
		)
		.await
		.expect_err("Duplicate title must conflict.");

	assert!(matches!(duplicate, Error::Conflict { .. }), "Unexpected error: {duplicate:?}");

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set DEVINOTE_PG_DSN to run."]
async fn most_popular_tag_breaks_ties_by_name() {
	let Some(test_db) = super::test_db().await else {
		eprintln!("Skipping most_popular_tag_breaks_ties_by_name; set DEVINOTE_PG_DSN to run.");

		return;
	};
	let service = super::build_service(&test_db).await.expect("Failed to build service.");
	let author = super::sign_up(&service, "author").await;
	let none = service.most_popular_tag().await.expect_err("No tag is used yet.");

	assert!(matches!(none, Error::NotFound { .. }), "Unexpected error: {none:?}");

	service.create_tag(TagRequest { name: "zzz".to_string() }).await.expect("Failed to create tag.");
	post(&service, &author, "Alpha post", &["zig", "ada"]).await;
	post(&service, &author, "Beta post", &["zig", "ada"]).await;

	let popular = service.most_popular_tag().await.expect("Failed to find popular tag.");

	assert_eq!(popular.name, "ada");
	assert_eq!(popular.uses, 2);

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set DEVINOTE_PG_DSN to run."]
async fn only_authors_change_their_posts() {
	let Some(test_db) = super::test_db().await else {
		eprintln!("Skipping only_authors_change_their_posts; set DEVINOTE_PG_DSN to run.");

		return;
	};
	let service = super::build_service(&test_db).await.expect("Failed to build service.");
	let author = super::sign_up(&service, "author").await;
	let other = super::sign_up(&service, "other").await;
	let created = post(&service, &author, "Mine", &["rust"]).await;
	let err = service
		.update_post(
			&other,
			created.id,
			UpdatePostRequest { title: None, content: Some("Hijacked content here.".to_string()) },
		)
		.await
		.expect_err("Non-authors must not edit.");

	assert!(matches!(err, Error::Forbidden { .. }), "Unexpected error: {err:?}");

	let err = service.delete_post(&other, created.id).await.expect_err("Non-authors must not delete.");

	assert!(matches!(err, Error::Forbidden { .. }), "Unexpected error: {err:?}");

	service.delete_post(&author, created.id).await.expect("Author may delete.");

	let gone = service.get_post(created.id).await.expect_err("Post was deleted.");

	assert!(matches!(gone, Error::NotFound { .. }), "Unexpected error: {gone:?}");

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}
