use devinote_domain::roles::UserRole;
use devinote_service::{Error, LoginRequest, RegisterRequest};

#[tokio::test]
#[ignore = "Requires external Postgres. Set DEVINOTE_PG_DSN to run."]
async fn register_login_and_authenticate() {
	let Some(test_db) = super::test_db().await else {
		eprintln!("Skipping register_login_and_authenticate; set DEVINOTE_PG_DSN to run.");

		return;
	};
	let service = super::build_service(&test_db).await.expect("Failed to build service.");
	let profile = service
		.register(RegisterRequest {
			email: "Ada@Example.com".to_string(),
			username: "ada".to_string(),
			password: super::PASSWORD.to_string(),
			name: Some("Ada".to_string()),
			surname: None,
		})
		.await
		.expect("Failed to register.");

	assert_eq!(profile.email, "ada@example.com");
	assert_eq!(profile.role, UserRole::User);
	assert!(profile.is_active);

	let by_email = service
		.login(LoginRequest {
			identifier: "ada@example.com".to_string(),
			password: super::PASSWORD.to_string(),
		})
		.await
		.expect("Login by email failed.");

	assert_eq!(by_email.token_type, "bearer");
	assert_eq!(by_email.user.id, profile.id);

	let actor =
		service.authenticate(&by_email.access_token).await.expect("Failed to authenticate.");

	assert_eq!(actor.id, profile.id);
	assert_eq!(actor.username, "ada");

	let me = service.me(&actor).await.expect("Failed to load profile.");

	assert_eq!(me.name.as_deref(), Some("Ada"));

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set DEVINOTE_PG_DSN to run."]
async fn login_failures_share_one_message() {
	let Some(test_db) = super::test_db().await else {
		eprintln!("Skipping login_failures_share_one_message; set DEVINOTE_PG_DSN to run.");

		return;
	};
	let service = super::build_service(&test_db).await.expect("Failed to build service.");

	super::sign_up(&service, "grace").await;

	let wrong_password = service
		.login(LoginRequest { identifier: "grace".to_string(), password: "nope".to_string() })
		.await
		.expect_err("Wrong password must fail.");
	let unknown_user = service
		.login(LoginRequest {
			identifier: "nobody".to_string(),
			password: super::PASSWORD.to_string(),
		})
		.await
		.expect_err("Unknown user must fail.");

	assert!(matches!(wrong_password, Error::Unauthorized { .. }));
	assert_eq!(wrong_password.to_string(), unknown_user.to_string());

	sqlx::query("UPDATE users SET is_active = false WHERE username = 'grace'")
		.execute(&service.db.pool)
		.await
		.expect("Failed to deactivate user.");

	let inactive = service
		.login(LoginRequest {
			identifier: "grace".to_string(),
			password: super::PASSWORD.to_string(),
		})
		.await
		.expect_err("Inactive user must not log in.");

	assert!(matches!(inactive, Error::Unauthorized { .. }));

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set DEVINOTE_PG_DSN to run."]
async fn duplicate_registration_conflicts() {
	let Some(test_db) = super::test_db().await else {
		eprintln!("Skipping duplicate_registration_conflicts; set DEVINOTE_PG_DSN to run.");

		return;
	};
	let service = super::build_service(&test_db).await.expect("Failed to build service.");

	super::sign_up(&service, "linus").await;

	let err = service
		.register(RegisterRequest {
			email: "other@example.com".to_string(),
			username: "linus".to_string(),
			password: super::PASSWORD.to_string(),
			name: None,
			surname: None,
		})
		.await
		.expect_err("Duplicate username must fail.");

	assert!(matches!(err, Error::Conflict { .. }), "Unexpected error: {err:?}");

	let err = service
		.register(RegisterRequest {
			email: "LINUS@example.com".to_string(),
			username: "linus2".to_string(),
			password: super::PASSWORD.to_string(),
			name: None,
			surname: None,
		})
		.await
		.expect_err("Duplicate email must fail.");

	assert!(matches!(err, Error::Conflict { .. }), "Unexpected error: {err:?}");

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}
