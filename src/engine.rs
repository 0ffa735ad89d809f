//! Orchestrates configuration, roles, issuance, and revocation over host storage.
//!
//! [`Engine`] owns the three stateful pieces: the [`ConfigStore`], the [`RoleStore`] with its
//! lock table, and the [`ClientCache`] holding the shared upstream handle. Operations live in
//! the submodules, one file per endpoint family.

pub mod metrics;

mod config;
mod revoke;
mod role;
mod token;

pub use metrics::IssuanceMetrics;

// self
use crate::{
	_prelude::*,
	client::{ClientCache, ClientFactory},
	config::ConfigStore,
	error::ConfigError,
	roles::RoleStore,
	storage::Storage,
	upstream::AccessTokenApi,
};
#[cfg(feature = "reqwest")] use crate::upstream::GitLabClientFactory;

/// Successful result plus non-fatal warnings for the host.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Response<T> {
	/// Response document.
	pub data: T,
	/// Human-readable warnings; empty when there is nothing to report.
	pub warnings: Vec<String>,
}
impl<T> Response<T> {
	/// Wraps `data` without warnings.
	pub fn new(data: T) -> Self {
		Self { data, warnings: Vec::new() }
	}

	/// Wraps `data` with the provided warnings.
	pub fn with_warnings(data: T, warnings: Vec<String>) -> Self {
		Self { data, warnings }
	}
}

/// Credential-issuance engine bound to one storage backend and one client factory.
pub struct Engine {
	storage: Arc<dyn Storage>,
	factory: Arc<dyn ClientFactory>,
	config: ConfigStore,
	roles: RoleStore,
	clients: ClientCache,
	metrics: Arc<IssuanceMetrics>,
}
impl Engine {
	/// Creates an engine with the default client TTL and lock table size.
	pub fn new(storage: Arc<dyn Storage>, factory: Arc<dyn ClientFactory>) -> Self {
		Self {
			config: ConfigStore::new(storage.clone()),
			roles: RoleStore::new(storage.clone()),
			clients: ClientCache::default(),
			metrics: Default::default(),
			storage,
			factory,
		}
	}

	/// Replaces the lifetime of cached client handles.
	pub fn with_client_ttl(mut self, ttl: Duration) -> Self {
		self.clients = ClientCache::new(ttl);

		self
	}

	/// Replaces the role lock table with one of `shards` locks.
	pub fn with_lock_shards(mut self, shards: usize) -> Self {
		self.roles = RoleStore::with_shards(self.storage.clone(), shards);

		self
	}

	/// Shared issuance counters.
	pub fn metrics(&self) -> &Arc<IssuanceMetrics> {
		&self.metrics
	}

	/// Number of upstream handles built by the client cache.
	pub fn client_builds(&self) -> u64 {
		self.clients.builds()
	}

	/// Returns the shared upstream handle, building it from the stored configuration when the
	/// cache is empty or expired.
	pub async fn client(&self) -> Result<Arc<dyn AccessTokenApi>> {
		self.clients
			.get_or_build(|| async {
				let config = self.config.require().await?;

				if config.token.is_empty() {
					return Err(ConfigError::MissingCredential.into());
				}

				Ok(self.factory.build(&config)?)
			})
			.await
	}
}
#[cfg(feature = "reqwest")]
impl Engine {
	/// Creates an engine that talks to GitLab over reqwest.
	pub fn gitlab(storage: Arc<dyn Storage>) -> Self {
		Self::new(storage, Arc::new(GitLabClientFactory::new()))
	}
}
impl Debug for Engine {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Engine")
			.field("roles", &self.roles)
			.field("client_ttl", &self.clients.ttl())
			.field("client_builds", &self.clients.builds())
			.finish()
	}
}
