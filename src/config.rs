//! Persisted administrator configuration: endpoint, credential, and token lifetime ceiling.

// crates.io
use url::Url;
// self
use crate::{
	_prelude::*,
	auth::{Secret, seconds},
	error::ConfigError,
	storage::{self, Storage, StorageError},
};

/// Storage key of the configuration document.
pub const CONFIG_KEY: &str = "config";
/// Endpoint used when none has ever been supplied.
pub const DEFAULT_BASE_URL: &str = "https://gitlab.com";
/// Smallest non-zero lifetime ceiling accepted by [`ConfigEntry::apply`].
pub const MIN_TOKEN_LIFETIME: Duration = Duration::hours(24);

/// Stored configuration entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigEntry {
	/// GitLab instance root, e.g. `https://gitlab.example.com`.
	pub base_url: String,
	/// Administrative credential sent as `PRIVATE-TOKEN`.
	#[serde(default)]
	pub token: Secret,
	/// Upper bound on issued token lifetimes; zero disables the ceiling.
	#[serde(default, with = "seconds")]
	pub max_token_lifetime: Duration,
}
impl ConfigEntry {
	/// Merges `fields` into the entry, returning the warnings raised along the way.
	///
	/// A non-zero ceiling below [`MIN_TOKEN_LIFETIME`] is ignored and the previous one kept. An
	/// explicit zero clears the ceiling.
	pub fn apply(&mut self, fields: &ConfigFields) -> Vec<String> {
		let mut warnings = Vec::new();

		match &fields.base_url {
			Some(base_url) => self.base_url = base_url.trim().to_owned(),
			None if self.base_url.is_empty() => self.base_url = DEFAULT_BASE_URL.into(),
			None => (),
		}

		if let Some(token) = &fields.token {
			self.token = token.clone();
		}

		match fields.max_token_lifetime {
			Some(lifetime) if lifetime.is_zero() => self.max_token_lifetime = Duration::ZERO,
			Some(lifetime) if lifetime < MIN_TOKEN_LIFETIME => warnings.push(format!(
				"max_token_lifetime of {}s is below the minimum of {}s and was ignored.",
				lifetime.whole_seconds(),
				MIN_TOKEN_LIFETIME.whole_seconds(),
			)),
			Some(lifetime) => self.max_token_lifetime = lifetime,
			None => (),
		}

		if self.max_token_lifetime.is_zero() {
			warnings.push(
				"max_token_lifetime is not set; issued tokens may never expire.".to_owned(),
			);
		}

		warnings
	}

	/// Returns the REST API root (`{base_url}/api/v4/`).
	pub fn api_root(&self) -> Result<Url, ConfigError> {
		let mut url = Url::parse(&self.base_url).map_err(|source| ConfigError::InvalidBaseUrl {
			base_url: self.base_url.clone(),
			source,
		})?;

		if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
			return Err(ConfigError::UnsupportedScheme {
				base_url: self.base_url.clone(),
				scheme: url.scheme().to_owned(),
			});
		}

		let path = format!("{}/api/v4/", url.path().trim_end_matches('/'));

		url.set_path(&path);
		url.set_query(None);
		url.set_fragment(None);

		Ok(url)
	}

	/// Document returned to the host; never includes the credential.
	pub fn view(&self) -> ConfigView {
		ConfigView {
			base_url: self.base_url.clone(),
			max_token_lifetime: self.max_token_lifetime.whole_seconds(),
		}
	}
}
impl Default for ConfigEntry {
	fn default() -> Self {
		Self {
			base_url: DEFAULT_BASE_URL.into(),
			token: Secret::default(),
			max_token_lifetime: Duration::ZERO,
		}
	}
}

/// Host-supplied partial configuration.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct ConfigFields {
	/// GitLab instance root.
	#[serde(default)]
	pub base_url: Option<String>,
	/// Administrative credential.
	#[serde(default)]
	pub token: Option<Secret>,
	/// Lifetime ceiling in seconds.
	#[serde(default, with = "seconds::option")]
	pub max_token_lifetime: Option<Duration>,
}

/// Configuration document returned to the host.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ConfigView {
	/// GitLab instance root.
	pub base_url: String,
	/// Lifetime ceiling in seconds; zero means no ceiling.
	pub max_token_lifetime: i64,
}

/// Reads and merges the configuration document.
///
/// Writes are read-modify-write without a lock: concurrent writers interleave at the document
/// level and the last `put` wins.
#[derive(Clone)]
pub struct ConfigStore {
	storage: Arc<dyn Storage>,
}
impl ConfigStore {
	/// Binds the store to host storage.
	pub fn new(storage: Arc<dyn Storage>) -> Self {
		Self { storage }
	}

	/// Loads the entry, if one has been written.
	pub async fn read(&self) -> Result<Option<ConfigEntry>, StorageError> {
		storage::get_json(self.storage.as_ref(), CONFIG_KEY).await
	}

	/// Loads the entry, failing when none has been written.
	pub async fn require(&self) -> Result<ConfigEntry> {
		self.read().await?.ok_or_else(|| ConfigError::Missing.into())
	}

	/// Merges `fields` onto the stored (or a fresh) entry and persists the result.
	pub async fn write(&self, fields: &ConfigFields) -> Result<(ConfigEntry, Vec<String>)> {
		let mut entry = self.read().await?.unwrap_or_default();
		let warnings = entry.apply(fields);

		storage::put_json(self.storage.as_ref(), CONFIG_KEY, &entry).await?;

		Ok((entry, warnings))
	}
}
impl Debug for ConfigStore {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("ConfigStore(..)")
	}
}
