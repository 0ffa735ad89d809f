//! Capability contract for the upstream access-token API.
//!
//! The engine only ever talks to GitLab through [`AccessTokenApi`]. Handles are built by a
//! [`ClientFactory`](crate::client::ClientFactory) from the stored configuration and shared
//! through the client cache, so implementations must be cheap to call concurrently.

#[cfg(feature = "reqwest")] pub mod gitlab;
#[cfg(feature = "reqwest")] pub use gitlab::{GitLabClient, GitLabClientFactory};

// crates.io
use time::Date;
// self
use crate::{
	_prelude::*,
	auth::{BaseTokenRequest, RevokeRequest, Secret},
	error::BoxError,
};

time::serde::format_description!(gitlab_date, Date, "[year]-[month]-[day]");

/// Boxed future returned by [`AccessTokenApi`] calls.
pub type UpstreamFuture<'a, T> =
	Pin<Box<dyn Future<Output = Result<T, UpstreamError>> + 'a + Send>>;

/// Operations the engine performs against the upstream API.
pub trait AccessTokenApi
where
	Self: Debug + Send + Sync,
{
	/// Creates a project access token.
	fn create_project_token<'a>(
		&'a self,
		base: &'a BaseTokenRequest,
		expires_at: Option<OffsetDateTime>,
	) -> UpstreamFuture<'a, AccessToken>;

	/// Creates a group access token.
	fn create_group_token<'a>(
		&'a self,
		base: &'a BaseTokenRequest,
		expires_at: Option<OffsetDateTime>,
	) -> UpstreamFuture<'a, AccessToken>;

	/// Revokes a project access token.
	fn revoke_project_token<'a>(&'a self, target: &'a RevokeRequest) -> UpstreamFuture<'a, ()>;

	/// Returns `false` once the handle can no longer serve requests.
	fn is_live(&self) -> bool;
}

/// Upstream call that produced an [`UpstreamError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UpstreamOperation {
	/// `POST /projects/:id/access_tokens`.
	CreateProjectToken,
	/// `POST /groups/:id/access_tokens`.
	CreateGroupToken,
	/// `DELETE /projects/:id/access_tokens/:token_id`.
	RevokeProjectToken,
}
impl UpstreamOperation {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			UpstreamOperation::CreateProjectToken => "create project access token",
			UpstreamOperation::CreateGroupToken => "create group access token",
			UpstreamOperation::RevokeProjectToken => "revoke project access token",
		}
	}
}
impl Display for UpstreamOperation {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Failure reported by (or while reaching) the upstream API.
#[derive(Debug, ThisError)]
pub enum UpstreamError {
	/// The API answered with a non-success status.
	#[error("Failed to {operation}: {message} (HTTP {status}).")]
	Api {
		/// Attempted operation.
		operation: UpstreamOperation,
		/// HTTP status code.
		status: u16,
		/// Provider message, or the status reason when the body carries none.
		message: String,
	},
	/// The request never produced a response.
	#[error("Failed to {operation}: transport error.")]
	Transport {
		/// Attempted operation.
		operation: UpstreamOperation,
		/// Underlying transport failure.
		#[source]
		source: BoxError,
	},
	/// The response body did not match the expected shape.
	#[error("Failed to {operation}: malformed response at {source}.")]
	ResponseParse {
		/// Attempted operation.
		operation: UpstreamOperation,
		/// Decoding failure with the offending JSON path.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
}
impl UpstreamError {
	/// Wraps a transport failure.
	pub fn transport(
		operation: UpstreamOperation,
		src: impl 'static + Send + Sync + StdError,
	) -> Self {
		Self::Transport { operation, source: Box::new(src) }
	}

	/// Attempted operation.
	pub fn operation(&self) -> UpstreamOperation {
		match self {
			Self::Api { operation, .. }
			| Self::Transport { operation, .. }
			| Self::ResponseParse { operation, .. } => *operation,
		}
	}

	/// HTTP status, when the API answered.
	pub fn status(&self) -> Option<u16> {
		match self {
			Self::Api { status, .. } => Some(*status),
			_ => None,
		}
	}
}

/// Access token record returned by the upstream API.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct AccessToken {
	/// Token identifier.
	pub id: i64,
	/// Token name.
	pub name: String,
	/// Token value; GitLab only returns it on creation.
	#[serde(default)]
	pub token: Secret,
	/// Granted scopes.
	#[serde(default)]
	pub scopes: Vec<String>,
	/// Granted access level.
	#[serde(default)]
	pub access_level: i64,
	/// Expiry date, if any.
	#[serde(default, with = "gitlab_date::option")]
	pub expires_at: Option<Date>,
	/// Whether the token is currently usable.
	#[serde(default)]
	pub active: bool,
	/// Whether the token has been revoked.
	#[serde(default)]
	pub revoked: bool,
}
