//! Configures the engine against a mock GitLab instance, defines a role, issues a token from it,
//! and revokes the token again.

// std
use std::sync::Arc;
// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
use time::Duration;
// self
use gitlab_token_engine::{
	auth::{BaseFields, RevokeRequest, RoleFields, Secret},
	config::ConfigFields,
	engine::Engine,
	reqwest::{Client, redirect::Policy},
	storage::MemoryStorage,
	upstream::GitLabClientFactory,
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let create_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/api/v4/projects/1234/access_tokens");
			then.status(201).header("content-type", "application/json").body(
				"{\"id\":77,\"name\":\"release-bot\",\"scopes\":[\"read_repository\"],\"access_level\":30,\"expires_at\":\"2030-01-01\",\"token\":\"glpat-demo\"}",
			);
		})
		.await;
	let revoke_mock = server
		.mock_async(|when, then| {
			when.method(DELETE).path("/api/v4/projects/1234/access_tokens/77");
			then.status(204);
		})
		.await;
	let http = Client::builder().redirect(Policy::none()).build()?;
	let engine = Engine::new(
		Arc::new(MemoryStorage::default()),
		Arc::new(GitLabClientFactory::with_client(http)),
	);
	let config = engine
		.configure(ConfigFields {
			base_url: Some(server.base_url()),
			token: Some(Secret::new("glpat-admin")),
			max_token_lifetime: Some(Duration::days(30)),
		})
		.await?;

	println!("Configured {} with warnings {:?}.", config.data.base_url, config.warnings);

	let role = engine
		.define_role(
			"release",
			RoleFields {
				base: BaseFields {
					id: Some(1234),
					name: Some("release-bot".into()),
					scopes: Some(vec!["read_repository".into()]),
					access_level: Some(30),
					token_type: Some("project".into()),
				},
				token_ttl: Some(Duration::days(7)),
			},
		)
		.await?;

	println!("Role `{}` issues tokens valid for {}s.", role.data.role_name, role.data.token_ttl);

	let issued = engine.issue_role_token("release").await?;

	println!("Issued token {} expiring {:?}.", issued.id, issued.expires_at);

	engine.revoke(RevokeRequest::new(1234, issued.id)).await?;

	create_mock.assert_async().await;
	revoke_mock.assert_async().await;

	Ok(())
}
