#![cfg(feature = "reqwest")]

// std
use std::{env, fs, process, sync::Arc};
// crates.io
use httpmock::prelude::*;
use time::{Duration, OffsetDateTime};
// self
use gitlab_token_engine::{
	auth::{RevokeRequest, RoleFields, Secret, TokenFields},
	config::ConfigFields,
	engine::Engine,
	error::{ConfigError, Error},
	storage::{FileStorage, MemoryStorage},
	upstream::UpstreamError,
};

fn configure_fields(server: &MockServer) -> ConfigFields {
	ConfigFields {
		base_url: Some(server.base_url()),
		token: Some(Secret::new("glpat-admin")),
		max_token_lifetime: Some(Duration::days(7)),
	}
}

fn role_fields() -> RoleFields {
	serde_json::from_value(serde_json::json!({
		"id": 42,
		"name": "deploy-bot",
		"scopes": ["read_repository", "read_registry"],
		"access_level": 20,
		"token_type": "project",
		"token_ttl": 172_800,
	}))
	.expect("Role fields should decode from the host document.")
}

#[tokio::test]
async fn role_token_lifecycle_against_gitlab() {
	let server = MockServer::start_async().await;
	let create = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/api/v4/projects/42/access_tokens")
				.header("PRIVATE-TOKEN", "glpat-admin");
			then.status(201).header("content-type", "application/json").body(
				"{\"id\":501,\"name\":\"deploy-bot\",\"scopes\":[\"read_repository\",\"read_registry\"],\"access_level\":20,\"expires_at\":\"2030-01-03\",\"active\":true,\"revoked\":false,\"token\":\"glpat-role\"}",
			);
		})
		.await;
	let revoke = server
		.mock_async(|when, then| {
			when.method(DELETE).path("/api/v4/projects/42/access_tokens/501");
			then.status(204);
		})
		.await;
	let engine = Engine::gitlab(Arc::new(MemoryStorage::default()));
	let configured =
		engine.configure(configure_fields(&server)).await.expect("Configure should succeed.");

	assert!(configured.warnings.is_empty());
	assert_eq!(configured.data.max_token_lifetime, 604_800);

	let role = engine.define_role("deploy", role_fields()).await.expect("Define should succeed.");

	assert_eq!(role.data.token_ttl, 172_800);
	assert_eq!(engine.list_roles().await.expect("List should succeed."), vec!["deploy"]);

	let issued = engine.issue_role_token("deploy").await.expect("Role issuance should succeed.");

	create.assert_calls_async(1).await;

	assert_eq!(issued.id, 501);
	assert_eq!(issued.token.expose(), "glpat-role");

	let document = serde_json::to_value(&issued).expect("Issued token should serialize.");

	assert_eq!(document["expires_at"], "2030-01-03T00:00:00Z");

	engine.revoke(RevokeRequest::new(42, issued.id)).await.expect("Revoke should succeed.");
	revoke.assert_calls_async(1).await;

	assert_eq!(engine.client_builds(), 1);
}

#[tokio::test]
async fn rejected_requests_never_reach_gitlab() {
	let server = MockServer::start_async().await;
	let create = server
		.mock_async(|when, then| {
			when.method(POST);
			then.status(500);
		})
		.await;
	let engine = Engine::gitlab(Arc::new(MemoryStorage::default()));

	engine.configure(configure_fields(&server)).await.expect("Configure should succeed.");

	let mut fields: TokenFields = serde_json::from_value(serde_json::json!({
		"id": 42,
		"name": "too-long",
		"scopes": ["api", "sudo"],
		"token_type": "project",
	}))
	.expect("Token fields should decode.");

	fields.expires_at = Some(OffsetDateTime::now_utc() + Duration::days(30));

	let err = engine.issue_token(fields).await.expect_err("Invalid request must be rejected.");

	assert!(err.is_lifetime_ceiling_exceeded());
	assert_eq!(err.defects().map(|defects| defects.len()), Some(2));

	create.assert_calls_async(0).await;
}

#[tokio::test]
async fn gitlab_errors_keep_provider_message() {
	let server = MockServer::start_async().await;

	server
		.mock_async(|when, then| {
			when.method(POST).path("/api/v4/groups/5/access_tokens");
			then.status(400)
				.header("content-type", "application/json")
				.body("{\"message\":\"400 Bad request - Access level is not valid\"}");
		})
		.await;

	let engine = Engine::gitlab(Arc::new(MemoryStorage::default()));

	engine.configure(configure_fields(&server)).await.expect("Configure should succeed.");

	let fields: TokenFields = serde_json::from_value(serde_json::json!({
		"id": 5,
		"name": "group-bot",
		"scopes": ["read_api"],
		"access_level": 40,
		"token_type": "group",
	}))
	.expect("Token fields should decode.");
	let err = engine.issue_token(fields).await.expect_err("GitLab rejection must surface.");

	assert!(matches!(&err, Error::Upstream(UpstreamError::Api { status: 400, .. })));
	assert!(err.to_string().contains("Access level is not valid"));
	assert_eq!(engine.metrics().failures(), 1);
}

#[tokio::test]
async fn missing_credential_is_a_configuration_error() {
	let engine = Engine::gitlab(Arc::new(MemoryStorage::default()));

	engine
		.configure(ConfigFields::default())
		.await
		.expect("Configuration without a credential is accepted.");

	let err = engine
		.revoke(RevokeRequest::new(1, 1))
		.await
		.expect_err("Revocation needs a credential.");

	assert!(matches!(err, Error::Config(ConfigError::MissingCredential)));
}

#[tokio::test]
async fn file_storage_keeps_configuration_and_roles_across_restarts() {
	let server = MockServer::start_async().await;
	let path = env::temp_dir().join(format!(
		"gitlab_token_engine_it_{}_{}.json",
		process::id(),
		OffsetDateTime::now_utc().unix_timestamp_nanos(),
	));

	{
		let storage = FileStorage::open(&path).expect("File storage should open.");
		let engine = Engine::gitlab(Arc::new(storage));

		engine.configure(configure_fields(&server)).await.expect("Configure should succeed.");
		engine.define_role("deploy", role_fields()).await.expect("Define should succeed.");
	}

	let storage = FileStorage::open(&path).expect("File storage should reopen.");
	let engine = Engine::gitlab(Arc::new(storage));
	let config = engine
		.read_config()
		.await
		.expect("Read should succeed.")
		.expect("Configuration should survive a restart.");

	assert_eq!(config.base_url, server.base_url());
	assert_eq!(
		engine.read_role("deploy").await.expect("Read should succeed.").map(|role| role.id),
		Some(42)
	);

	fs::remove_file(&path).expect("Temporary snapshot should be removable.");
}
