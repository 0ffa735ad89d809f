#![cfg(feature = "reqwest")]

// crates.io
use httpmock::prelude::*;
use time::macros;
// self
use gitlab_token_engine::{
	auth::{BaseTokenRequest, RevokeRequest, Secret},
	config::ConfigEntry,
	upstream::{AccessTokenApi, GitLabClient, UpstreamError, UpstreamOperation},
};

const ADMIN_TOKEN: &str = "glpat-admin-secret";

fn build_client(server: &MockServer) -> GitLabClient {
	let config = ConfigEntry {
		base_url: server.base_url(),
		token: Secret::new(ADMIN_TOKEN),
		..ConfigEntry::default()
	};

	GitLabClient::new(&config).expect("GitLab client should build for the mock server.")
}

fn base(target_id: i64, token_type: &str) -> BaseTokenRequest {
	BaseTokenRequest {
		target_id,
		name: "ci-deploy".into(),
		scopes: vec!["read_api".into(), "read_repository".into()],
		access_level: 30,
		token_type: token_type.into(),
	}
}

#[tokio::test]
async fn create_project_token_posts_request_and_decodes_record() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/api/v4/projects/42/access_tokens")
				.header("PRIVATE-TOKEN", ADMIN_TOKEN)
				.json_body(serde_json::json!({
					"name": "ci-deploy",
					"scopes": ["read_api", "read_repository"],
					"expires_at": "2025-12-01",
					"access_level": 30,
				}));
			then.status(201).header("content-type", "application/json").body(
				"{\"id\":7,\"name\":\"ci-deploy\",\"revoked\":false,\"scopes\":[\"read_api\",\"read_repository\"],\"active\":true,\"expires_at\":\"2025-12-01\",\"access_level\":30,\"token\":\"glpat-issued\"}",
			);
		})
		.await;
	let client = build_client(&server);
	let record = client
		.create_project_token(&base(42, "project"), Some(macros::datetime!(2025-12-01 8:30 UTC)))
		.await
		.expect("Project token creation should succeed.");

	mock.assert_calls_async(1).await;

	assert_eq!(record.id, 7);
	assert_eq!(record.token.expose(), "glpat-issued");
	assert_eq!(record.expires_at, Some(macros::date!(2025 - 12 - 01)));
	assert!(record.active);
}

#[tokio::test]
async fn create_group_token_uses_group_endpoint_without_expiry() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/api/v4/groups/9/access_tokens").json_body(serde_json::json!({
				"name": "ci-deploy",
				"scopes": ["read_api", "read_repository"],
				"access_level": 30,
			}));
			then.status(201).header("content-type", "application/json").body(
				"{\"id\":8,\"name\":\"ci-deploy\",\"scopes\":[\"read_api\"],\"expires_at\":null,\"access_level\":30,\"token\":\"glpat-group\"}",
			);
		})
		.await;
	let client = build_client(&server);
	let record = client
		.create_group_token(&base(9, "group"), None)
		.await
		.expect("Group token creation should succeed.");

	mock.assert_calls_async(1).await;

	assert_eq!(record.expires_at, None);
	assert_eq!(record.token.expose(), "glpat-group");
}

#[tokio::test]
async fn revoke_surfaces_not_found() {
	let server = MockServer::start_async().await;
	let ok = server
		.mock_async(|when, then| {
			when.method(DELETE)
				.path("/api/v4/projects/42/access_tokens/7")
				.header("PRIVATE-TOKEN", ADMIN_TOKEN);
			then.status(204);
		})
		.await;
	let missing = server
		.mock_async(|when, then| {
			when.method(DELETE).path("/api/v4/projects/42/access_tokens/8");
			then.status(404)
				.header("content-type", "application/json")
				.body("{\"message\":\"404 Not Found\"}");
		})
		.await;
	let client = build_client(&server);

	client
		.revoke_project_token(&RevokeRequest::new(42, 7))
		.await
		.expect("Revoking an existing token should succeed.");

	let err = client
		.revoke_project_token(&RevokeRequest::new(42, 8))
		.await
		.expect_err("Revoking an unknown token must fail.");

	ok.assert_calls_async(1).await;
	missing.assert_calls_async(1).await;

	match err {
		UpstreamError::Api { operation, status, message } => {
			assert_eq!(operation, UpstreamOperation::RevokeProjectToken);
			assert_eq!(status, 404);
			assert_eq!(message, "404 Not Found");
		},
		other => panic!("Expected an API error, got {other:?}."),
	}
}

#[tokio::test]
async fn malformed_response_reports_the_field() {
	let server = MockServer::start_async().await;

	server
		.mock_async(|when, then| {
			when.method(POST).path("/api/v4/projects/1/access_tokens");
			then.status(201)
				.header("content-type", "application/json")
				.body("{\"id\":\"seven\",\"name\":\"ci-deploy\"}");
		})
		.await;

	let err = build_client(&server)
		.create_project_token(&base(1, "project"), None)
		.await
		.expect_err("A malformed body must fail to decode.");

	assert!(matches!(&err, UpstreamError::ResponseParse { .. }));
	assert_eq!(err.operation(), UpstreamOperation::CreateProjectToken);
	assert!(err.to_string().contains("id"));
}

#[tokio::test]
async fn redirects_are_not_followed() {
	let server = MockServer::start_async().await;
	let redirect = server
		.mock_async(|when, then| {
			when.method(POST).path("/api/v4/projects/1/access_tokens");
			then.status(302).header("location", "https://elsewhere.example.com/steal");
		})
		.await;
	let err = build_client(&server)
		.create_project_token(&base(1, "project"), None)
		.await
		.expect_err("Redirect responses must not be treated as success.");

	redirect.assert_calls_async(1).await;

	assert_eq!(err.status(), Some(302));
}
