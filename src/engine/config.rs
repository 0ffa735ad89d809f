// self
use crate::{
	_prelude::*,
	config::{ConfigFields, ConfigView},
	engine::{Engine, Response},
	obs::{self, OperationKind},
};

impl Engine {
	/// Merges `fields` into the stored configuration and drops the cached client.
	///
	/// A base URL that cannot produce a client is stored anyway and reported as a warning;
	/// issuance fails until it is corrected.
	pub async fn configure(&self, fields: ConfigFields) -> Result<Response<ConfigView>> {
		obs::observe(OperationKind::Configure, "configure", async {
			let (entry, mut warnings) = self.config.write(&fields).await?;

			self.clients.invalidate().await;

			if let Err(e) = entry.api_root() {
				warnings.push(e.to_string());
			}

			obs::debug_event!(
				base_url = %entry.base_url,
				max_token_lifetime = entry.max_token_lifetime.whole_seconds(),
				"configuration written"
			);

			Ok(Response::with_warnings(entry.view(), warnings))
		})
		.await
	}

	/// Returns the stored configuration without the credential.
	pub async fn read_config(&self) -> Result<Option<ConfigView>> {
		Ok(self.config.read().await?.map(|entry| entry.view()))
	}
}
