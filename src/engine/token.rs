// self
use crate::{
	_prelude::*,
	auth::{BaseTokenRequest, Defects, IssuedToken, RoleName, TokenFields, TokenRequest, TokenType},
	engine::Engine,
	obs::{self, OperationKind},
	upstream::AccessTokenApi,
};

impl Engine {
	/// Issues a token from ad hoc fields.
	///
	/// Every defect is reported at once and nothing reaches GitLab unless the request is fully
	/// valid. Upstream failures are returned as-is without retrying.
	pub async fn issue_token(&self, fields: TokenFields) -> Result<IssuedToken> {
		self.metrics.record_attempt();

		let result = obs::observe(OperationKind::IssueToken, "issue_token", async {
			let client = self.client().await?;
			let config = self.config.require().await?;
			let request = TokenRequest::from_fields(&fields);

			request.assert_valid(config.max_token_lifetime)?;

			dispatch(client.as_ref(), &request.base, request.expires_at).await
		})
		.await;

		self.metrics.record_result(&result);

		result
	}

	/// Issues a token from the stored role `name`, expiring `token_ttl` from now.
	///
	/// The ceiling was enforced when the role was defined and is not checked again here.
	pub async fn issue_role_token(&self, name: &str) -> Result<IssuedToken> {
		self.metrics.record_attempt();

		let result = obs::observe(OperationKind::IssueRoleToken, "issue_role_token", async {
			let name = RoleName::new(name)?;

			obs::record_role(&name);

			let role = self
				.roles
				.get(&name)
				.await?
				.ok_or_else(|| Error::RoleNotFound { role: name.to_string() })?;

			role.base.assert_valid()?;

			let expires_at = role.expires_at(OffsetDateTime::now_utc()).map_err(Defects::from)?;
			let client = self.client().await?;

			dispatch(client.as_ref(), &role.base, expires_at).await
		})
		.await;

		self.metrics.record_result(&result);

		result
	}
}

async fn dispatch(
	client: &dyn AccessTokenApi,
	base: &BaseTokenRequest,
	expires_at: Option<OffsetDateTime>,
) -> Result<IssuedToken> {
	obs::record_target(base.target_id);

	let token_type = base.token_type().map_err(Defects::from)?;
	let record = match token_type {
		TokenType::Project => client.create_project_token(base, expires_at).await?,
		TokenType::Group => client.create_group_token(base, expires_at).await?,
	};

	obs::debug_event!(
		token_type = token_type.as_str(),
		target_id = base.target_id,
		token_id = record.id,
		"token issued"
	);

	Ok(record.into())
}
