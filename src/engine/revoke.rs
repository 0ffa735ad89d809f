// self
use crate::{
	_prelude::*,
	auth::RevokeRequest,
	engine::Engine,
	obs::{self, OperationKind},
};

impl Engine {
	/// Revokes a project access token.
	///
	/// Identifiers are checked before any client is built. GitLab's answer for an unknown or
	/// already revoked token is returned as an error.
	pub async fn revoke(&self, request: RevokeRequest) -> Result<()> {
		obs::observe(OperationKind::Revoke, "revoke", async {
			request.assert_valid()?;

			obs::record_target(request.target_id);

			let client = self.client().await?;

			client.revoke_project_token(&request).await?;

			obs::debug_event!(
				target_id = request.target_id,
				token_id = request.token_id,
				"token revoked"
			);

			Ok(())
		})
		.await
	}
}

#[cfg(test)]
mod tests {
	// self
	use crate::{
		_preludet::*,
		auth::{BaseFields, RevokeRequest, Secret, TokenFields},
		config::ConfigFields,
		upstream::UpstreamError,
	};

	#[tokio::test]
	async fn second_revoke_of_the_same_pair_fails() {
		let (engine, factory, _) = build_test_engine();

		engine
			.configure(ConfigFields { token: Some(Secret::new("glpat-admin")), ..ConfigFields::default() })
			.await
			.expect("Configure should succeed.");

		let issued = engine
			.issue_token(TokenFields {
				base: BaseFields {
					id: Some(3),
					name: Some("short-lived".into()),
					scopes: Some(vec!["api".into()]),
					access_level: None,
					token_type: Some("project".into()),
				},
				expires_at: None,
			})
			.await
			.expect("Issuance should succeed.");
		let target = RevokeRequest::new(3, issued.id);

		assert!(factory.ledger().is_issued(3, issued.id));

		engine.revoke(target).await.expect("First revoke should succeed.");

		assert!(!factory.ledger().is_issued(3, issued.id));

		let err = engine.revoke(target).await.expect_err("Second revoke must fail.");

		assert!(matches!(err, Error::Upstream(UpstreamError::Api { status: 404, .. })));

		let err = engine
			.revoke(RevokeRequest::new(3, 999))
			.await
			.expect_err("Unknown tokens cannot be revoked.");

		assert!(err.to_string().contains("404 Not Found"));
	}

	#[tokio::test]
	async fn invalid_ids_fail_before_the_client_is_built() {
		let (engine, factory, _) = build_test_engine();
		let err = engine
			.revoke(RevokeRequest::new(0, 0))
			.await
			.expect_err("Invalid identifiers must be rejected.");

		assert_eq!(err.defects().map(|defects| defects.len()), Some(2));
		assert_eq!(factory.builds(), 0);
	}
}
