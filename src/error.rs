//! Engine-level error types shared across configuration, role, and issuance paths.

// self
use crate::{
	_prelude::*,
	auth::{Defects, RoleNameError},
	storage::StorageError,
	upstream::UpstreamError,
};

/// Engine-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

pub(crate) type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical engine error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Storage-layer failure.
	#[error("{0}")]
	Storage(
		#[from]
		#[source]
		StorageError,
	),
	/// No usable credential or endpoint; fatal for any issuance until corrected.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// One or more request fields are malformed; every defect is listed.
	#[error("Failed to validate: {0}")]
	Validation(#[from] Defects),
	/// Issuance was attempted against an undefined role name.
	#[error("Role name `{role}` is not recognised.")]
	RoleNotFound {
		/// Requested role name.
		role: String,
	},
	/// The supplied role name cannot be used as a storage key.
	#[error(transparent)]
	InvalidRoleName(#[from] RoleNameError),
	/// The upstream access-token API rejected or failed the call.
	#[error(transparent)]
	Upstream(#[from] UpstreamError),
}
impl Error {
	/// Returns the accumulated defects when this is a validation failure.
	pub fn defects(&self) -> Option<&Defects> {
		match self {
			Self::Validation(defects) => Some(defects),
			_ => None,
		}
	}

	/// Returns `true` when a requested expiry or TTL exceeded the configured ceiling.
	pub fn is_lifetime_ceiling_exceeded(&self) -> bool {
		self.defects().is_some_and(|defects| defects.iter().any(|d| d.is_lifetime_ceiling_exceeded()))
	}
}

/// Configuration failures: the entry is missing or cannot produce a client.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// No configuration document has been written yet.
	#[error("GitLab backend configuration has not been set up.")]
	Missing,
	/// The administrative credential is empty.
	#[error("GitLab token isn't configured.")]
	MissingCredential,
	/// The configured base URL cannot be parsed.
	#[error("Base URL `{base_url}` is invalid.")]
	InvalidBaseUrl {
		/// Offending base URL.
		base_url: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// The configured base URL is not an `http` or `https` URL.
	#[error("Base URL `{base_url}` uses unsupported scheme `{scheme}`.")]
	UnsupportedScheme {
		/// Offending base URL.
		base_url: String,
		/// Parsed scheme.
		scheme: String,
	},
	/// The upstream client could not be constructed.
	#[error("Failed to create GitLab client with endpoint {base_url}.")]
	ClientBuild {
		/// Endpoint the client was built for.
		base_url: String,
		/// Underlying builder failure.
		#[source]
		source: BoxError,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn client_build(
		base_url: impl Into<String>,
		src: impl 'static + Send + Sync + std::error::Error,
	) -> Self {
		Self::ClientBuild { base_url: base_url.into(), source: Box::new(src) }
	}

	/// Returns `true` for the "configuration missing" half of the taxonomy.
	pub fn is_missing(&self) -> bool {
		matches!(self, Self::Missing)
	}
}
