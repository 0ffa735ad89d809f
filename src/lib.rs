//! Issue and revoke scoped GitLab project and group access tokens from ad hoc requests or stored
//! roles, sharing one time-boxed upstream client and serializing conflicting role writes.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod client;
pub mod config;
pub mod engine;
pub mod error;
pub mod obs;
pub mod roles;
pub mod storage;
pub mod upstream;
#[cfg(any(test, feature = "test"))]
pub mod _preludet {
	//! Convenience re-exports and upstream test doubles; enabled via `cfg(test)` or the `test`
	//! crate feature.

	pub use crate::_prelude::*;

	// std
	use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
	// self
	use crate::{
		auth::{BaseTokenRequest, RevokeRequest, Secret, TokenType},
		client::ClientFactory,
		config::ConfigEntry,
		engine::Engine,
		error::ConfigError,
		storage::{MemoryStorage, Storage},
		upstream::{AccessToken, AccessTokenApi, UpstreamError, UpstreamFuture, UpstreamOperation},
	};

	/// Upstream call captured by a [`RecordingApi`].
	#[derive(Clone, Debug, PartialEq, Eq)]
	pub enum RecordedCall {
		/// A project or group token was requested.
		Create {
			/// Token family the call was dispatched to.
			token_type: TokenType,
			/// Project or group identifier.
			target_id: i64,
			/// Requested token name.
			name: String,
			/// Requested expiry, if any.
			expires_at: Option<OffsetDateTime>,
			/// Credential of the client handle that served the call.
			credential: String,
		},
		/// A project token revocation was requested.
		Revoke {
			/// Project identifier.
			target_id: i64,
			/// Token identifier.
			token_id: i64,
		},
	}

	/// Shared state behind every handle produced by one [`CountingFactory`].
	#[derive(Debug, Default)]
	pub struct ApiLedger {
		next_id: AtomicI64,
		issued: Mutex<BTreeMap<(i64, i64), TokenType>>,
		calls: Mutex<Vec<RecordedCall>>,
		failure: Mutex<Option<(u16, String)>>,
	}
	impl ApiLedger {
		/// Returns every call recorded so far.
		pub fn calls(&self) -> Vec<RecordedCall> {
			self.calls.lock().clone()
		}

		/// Makes every following upstream call fail with the provided status and message.
		pub fn fail_with(&self, status: u16, message: impl Into<String>) {
			*self.failure.lock() = Some((status, message.into()));
		}

		/// Returns `true` while the `(target, token)` pair is issued and not revoked.
		pub fn is_issued(&self, target_id: i64, token_id: i64) -> bool {
			self.issued.lock().contains_key(&(target_id, token_id))
		}

		fn injected_failure(&self, operation: UpstreamOperation) -> Option<UpstreamError> {
			self.failure.lock().as_ref().map(|(status, message)| UpstreamError::Api {
				operation,
				status: *status,
				message: message.clone(),
			})
		}
	}

	/// [`AccessTokenApi`] double that records calls and tracks issued tokens in memory.
	#[derive(Debug)]
	pub struct RecordingApi {
		ledger: Arc<ApiLedger>,
		credential: String,
	}
	impl RecordingApi {
		/// Creates a handle bound to the provided ledger and credential.
		pub fn new(ledger: Arc<ApiLedger>, credential: impl Into<String>) -> Self {
			Self { ledger, credential: credential.into() }
		}

		/// Credential the handle was built with.
		pub fn credential(&self) -> &str {
			&self.credential
		}

		fn create(
			&self,
			token_type: TokenType,
			base: &BaseTokenRequest,
			expires_at: Option<OffsetDateTime>,
		) -> Result<AccessToken, UpstreamError> {
			let operation = match token_type {
				TokenType::Project => UpstreamOperation::CreateProjectToken,
				TokenType::Group => UpstreamOperation::CreateGroupToken,
			};

			self.ledger.calls.lock().push(RecordedCall::Create {
				token_type,
				target_id: base.target_id,
				name: base.name.clone(),
				expires_at,
				credential: self.credential.clone(),
			});

			if let Some(err) = self.ledger.injected_failure(operation) {
				return Err(err);
			}

			let id = self.ledger.next_id.fetch_add(1, Ordering::Relaxed) + 1;

			self.ledger.issued.lock().insert((base.target_id, id), token_type);

			Ok(AccessToken {
				id,
				name: base.name.clone(),
				token: Secret::new(format!("glpat-test-{id}")),
				scopes: base.scopes.clone(),
				access_level: base.access_level,
				expires_at: expires_at.map(|instant| instant.date()),
				active: true,
				revoked: false,
			})
		}
	}
	impl AccessTokenApi for RecordingApi {
		fn create_project_token<'a>(
			&'a self,
			base: &'a BaseTokenRequest,
			expires_at: Option<OffsetDateTime>,
		) -> UpstreamFuture<'a, AccessToken> {
			Box::pin(async move { self.create(TokenType::Project, base, expires_at) })
		}

		fn create_group_token<'a>(
			&'a self,
			base: &'a BaseTokenRequest,
			expires_at: Option<OffsetDateTime>,
		) -> UpstreamFuture<'a, AccessToken> {
			Box::pin(async move { self.create(TokenType::Group, base, expires_at) })
		}

		fn revoke_project_token<'a>(&'a self, target: &'a RevokeRequest) -> UpstreamFuture<'a, ()> {
			Box::pin(async move {
				let operation = UpstreamOperation::RevokeProjectToken;

				self.ledger.calls.lock().push(RecordedCall::Revoke {
					target_id: target.target_id,
					token_id: target.token_id,
				});

				if let Some(err) = self.ledger.injected_failure(operation) {
					return Err(err);
				}

				match self.ledger.issued.lock().remove(&(target.target_id, target.token_id)) {
					Some(_) => Ok(()),
					None => Err(UpstreamError::Api {
						operation,
						status: 404,
						message: "404 Not Found".into(),
					}),
				}
			})
		}

		fn is_live(&self) -> bool {
			true
		}
	}

	/// [`ClientFactory`] double that counts constructions and hands out fresh handles.
	#[derive(Debug, Default)]
	pub struct CountingFactory {
		ledger: Arc<ApiLedger>,
		builds: AtomicU64,
		credentials: Mutex<Vec<String>>,
	}
	impl CountingFactory {
		/// Ledger shared by every handle this factory produced.
		pub fn ledger(&self) -> &Arc<ApiLedger> {
			&self.ledger
		}

		/// Number of handles constructed so far.
		pub fn builds(&self) -> u64 {
			self.builds.load(Ordering::SeqCst)
		}

		/// Credentials observed by each construction, in order.
		pub fn credentials(&self) -> Vec<String> {
			self.credentials.lock().clone()
		}
	}
	impl ClientFactory for CountingFactory {
		fn build(&self, config: &ConfigEntry) -> Result<Arc<dyn AccessTokenApi>, ConfigError> {
			self.builds.fetch_add(1, Ordering::SeqCst);
			self.credentials.lock().push(config.token.expose().to_owned());

			Ok(Arc::new(RecordingApi::new(self.ledger.clone(), config.token.expose())))
		}
	}

	/// Builds an engine over in-memory storage and a [`CountingFactory`].
	pub fn build_test_engine() -> (Engine, Arc<CountingFactory>, Arc<MemoryStorage>) {
		let storage = Arc::new(MemoryStorage::default());
		let factory = Arc::new(CountingFactory::default());
		let engine = Engine::new(storage.clone() as Arc<dyn Storage>, factory.clone());

		(engine, factory, storage)
	}
}

mod _prelude {
	pub use std::{
		collections::BTreeMap,
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use async_lock::{Mutex as AsyncMutex, RwLock as AsyncRwLock};
	pub use parking_lot::{Mutex, RwLock};
	#[cfg(feature = "reqwest")]
	pub use reqwest::Client as ReqwestClient;
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(test)] use {color_eyre as _, httpmock as _};
