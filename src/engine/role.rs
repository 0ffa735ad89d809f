// self
use crate::{
	_prelude::*,
	auth::{RoleEntry, RoleFields, RoleName, RoleView},
	engine::{Engine, Response},
	obs::{self, OperationKind},
};

impl Engine {
	/// Creates or updates the role `name`, validating the merged result against the configured
	/// lifetime ceiling before persisting it.
	///
	/// The role's lock is held from the initial read until the write completes, so concurrent
	/// writers to the same name observe each other's persisted state.
	pub async fn define_role(&self, name: &str, fields: RoleFields) -> Result<Response<RoleView>> {
		obs::observe(OperationKind::DefineRole, "define_role", async {
			let name = RoleName::new(name)?;

			obs::record_role(&name);

			let _guard = self.roles.lock(&name).await;
			let mut role =
				self.roles.get(&name).await?.unwrap_or_else(|| RoleEntry::new(name.clone()));

			role.merge(&fields);

			let config = self.config.require().await?;

			role.assert_valid(config.max_token_lifetime)?;

			let mut warnings = Vec::new();

			if role.never_expires() {
				warnings.push(format!(
					"token_ttl is 0; tokens issued from role `{name}` will never expire."
				));
			}

			self.roles.put(&role).await?;

			obs::debug_event!(role = %name, token_ttl = role.token_ttl.whole_seconds(), "role written");

			Ok(Response::with_warnings(role.view(), warnings))
		})
		.await
	}

	/// Returns the role `name`, or `None` when it is not defined.
	pub async fn read_role(&self, name: &str) -> Result<Option<RoleView>> {
		let name = RoleName::new(name)?;

		Ok(self.roles.get(&name).await?.map(|role| role.view()))
	}

	/// Deletes the role `name`, returning what was removed; `None` when it was not defined.
	pub async fn delete_role(&self, name: &str) -> Result<Option<RoleView>> {
		obs::observe(OperationKind::DeleteRole, "delete_role", async {
			let name = RoleName::new(name)?;

			obs::record_role(&name);

			let _guard = self.roles.lock(&name).await;
			let Some(role) = self.roles.get(&name).await? else {
				return Ok(None);
			};

			self.roles.delete(&name).await?;

			obs::debug_event!(role = %name, "role deleted");

			Ok(Some(role.view()))
		})
		.await
	}

	/// Lists every defined role name in lexicographic order.
	pub async fn list_roles(&self) -> Result<Vec<String>> {
		Ok(self.roles.list().await?)
	}
}
