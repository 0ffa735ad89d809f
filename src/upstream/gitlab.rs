//! reqwest-backed [`AccessTokenApi`] for GitLab's REST API (v4).

// crates.io
use reqwest::{
	Method, RequestBuilder, StatusCode,
	header::{CONTENT_TYPE, HeaderValue},
	redirect::Policy,
};
use time::{Date, UtcOffset};
use url::Url;
// self
use crate::{
	_prelude::*,
	auth::{BaseTokenRequest, RevokeRequest, Secret},
	client::ClientFactory,
	config::ConfigEntry,
	error::ConfigError,
	upstream::{
		AccessToken, AccessTokenApi, UpstreamError, UpstreamFuture, UpstreamOperation, gitlab_date,
	},
};

const PRIVATE_TOKEN: &str = "PRIVATE-TOKEN";

#[derive(Serialize)]
struct CreateTokenBody<'a> {
	name: &'a str,
	scopes: &'a [String],
	#[serde(skip_serializing_if = "Option::is_none", with = "gitlab_date::option")]
	expires_at: Option<Date>,
	#[serde(skip_serializing_if = "is_unset")]
	access_level: i64,
}
impl<'a> CreateTokenBody<'a> {
	fn new(base: &'a BaseTokenRequest, expires_at: Option<OffsetDateTime>) -> Self {
		Self {
			name: &base.name,
			scopes: &base.scopes,
			expires_at: expires_at.map(|instant| instant.to_offset(UtcOffset::UTC).date()),
			access_level: base.access_level,
		}
	}
}

fn is_unset(access_level: &i64) -> bool {
	*access_level == 0
}

/// GitLab access-token client authenticated with an administrative `PRIVATE-TOKEN`.
///
/// Requests never follow redirects; a redirect is reported as an API error instead of being
/// replayed with the credential attached.
#[derive(Clone, Debug)]
pub struct GitLabClient {
	http: ReqwestClient,
	api_root: Url,
	token: Secret,
}
impl GitLabClient {
	/// Builds a client for the provided configuration with a fresh HTTP stack.
	pub fn new(config: &ConfigEntry) -> Result<Self, ConfigError> {
		let http = ReqwestClient::builder()
			.redirect(Policy::none())
			.build()
			.map_err(|e| ConfigError::client_build(&config.base_url, e))?;

		Self::with_client(config, http)
	}

	/// Builds a client that reuses an existing reqwest [`ReqwestClient`].
	///
	/// Configure the client to disable redirect following.
	pub fn with_client(config: &ConfigEntry, http: ReqwestClient) -> Result<Self, ConfigError> {
		if config.token.is_empty() {
			return Err(ConfigError::MissingCredential);
		}

		Ok(Self { http, api_root: config.api_root()?, token: config.token.clone() })
	}

	/// Root of the REST API (`{base_url}/api/v4/`).
	pub fn api_root(&self) -> &Url {
		&self.api_root
	}

	fn request(
		&self,
		operation: UpstreamOperation,
		method: Method,
		path: &str,
	) -> Result<RequestBuilder, UpstreamError> {
		let url = self.api_root.join(path).map_err(|e| UpstreamError::transport(operation, e))?;

		Ok(self.http.request(method, url).header(PRIVATE_TOKEN, self.token.expose()))
	}

	async fn send(
		&self,
		operation: UpstreamOperation,
		request: RequestBuilder,
	) -> Result<Vec<u8>, UpstreamError> {
		let response =
			request.send().await.map_err(|e| UpstreamError::transport(operation, e))?;
		let status = response.status();
		let body = response.bytes().await.map_err(|e| UpstreamError::transport(operation, e))?;

		if !status.is_success() {
			return Err(UpstreamError::Api {
				operation,
				status: status.as_u16(),
				message: error_message(status, &body),
			});
		}

		Ok(body.to_vec())
	}

	async fn create(
		&self,
		operation: UpstreamOperation,
		path: String,
		base: &BaseTokenRequest,
		expires_at: Option<OffsetDateTime>,
	) -> Result<AccessToken, UpstreamError> {
		let payload = serde_json::to_vec(&CreateTokenBody::new(base, expires_at))
			.map_err(|e| UpstreamError::transport(operation, e))?;
		let request = self
			.request(operation, Method::POST, &path)?
			.header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
			.body(payload);
		let body = self.send(operation, request).await?;
		let deserializer = &mut serde_json::Deserializer::from_slice(&body);

		serde_path_to_error::deserialize(deserializer)
			.map_err(|source| UpstreamError::ResponseParse { operation, source })
	}
}
impl AccessTokenApi for GitLabClient {
	fn create_project_token<'a>(
		&'a self,
		base: &'a BaseTokenRequest,
		expires_at: Option<OffsetDateTime>,
	) -> UpstreamFuture<'a, AccessToken> {
		Box::pin(async move {
			let path = format!("projects/{}/access_tokens", base.target_id);

			self.create(UpstreamOperation::CreateProjectToken, path, base, expires_at).await
		})
	}

	fn create_group_token<'a>(
		&'a self,
		base: &'a BaseTokenRequest,
		expires_at: Option<OffsetDateTime>,
	) -> UpstreamFuture<'a, AccessToken> {
		Box::pin(async move {
			let path = format!("groups/{}/access_tokens", base.target_id);

			self.create(UpstreamOperation::CreateGroupToken, path, base, expires_at).await
		})
	}

	fn revoke_project_token<'a>(&'a self, target: &'a RevokeRequest) -> UpstreamFuture<'a, ()> {
		Box::pin(async move {
			let operation = UpstreamOperation::RevokeProjectToken;
			let path = format!("projects/{}/access_tokens/{}", target.target_id, target.token_id);
			let request = self.request(operation, Method::DELETE, &path)?;

			self.send(operation, request).await.map(|_| ())
		})
	}

	fn is_live(&self) -> bool {
		true
	}
}

/// [`ClientFactory`] producing [`GitLabClient`] handles.
#[derive(Clone, Debug, Default)]
pub struct GitLabClientFactory {
	http: Option<ReqwestClient>,
}
impl GitLabClientFactory {
	/// Factory that builds a fresh HTTP stack for every client.
	pub fn new() -> Self {
		Self::default()
	}

	/// Factory that shares the provided reqwest client across every handle.
	pub fn with_client(http: ReqwestClient) -> Self {
		Self { http: Some(http) }
	}
}
impl ClientFactory for GitLabClientFactory {
	fn build(&self, config: &ConfigEntry) -> Result<Arc<dyn AccessTokenApi>, ConfigError> {
		let client = match &self.http {
			Some(http) => GitLabClient::with_client(config, http.clone())?,
			None => GitLabClient::new(config)?,
		};

		Ok(Arc::new(client))
	}
}

fn error_message(status: StatusCode, body: &[u8]) -> String {
	let fallback = || match status.canonical_reason() {
		Some(reason) => format!("{} {reason}", status.as_u16()),
		None => status.as_u16().to_string(),
	};
	let Ok(document) = serde_json::from_slice::<serde_json::Value>(body) else {
		return fallback();
	};

	match document.get("message").or_else(|| document.get("error")) {
		Some(serde_json::Value::String(message)) => message.clone(),
		Some(serde_json::Value::Null) | None => fallback(),
		Some(other) => other.to_string(),
	}
}
