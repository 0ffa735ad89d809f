//! Role persistence plus the lock table that serializes writes per role name.
//!
//! Locks are a fixed table of async mutexes indexed by a hash of the role name. Operations on
//! the same name always share a lock; distinct names usually do not, but two names may collide
//! on a shard and then wait on each other. That only costs concurrency, never correctness.

// crates.io
use async_lock::MutexGuard;
use sha2::{Digest, Sha256};
// self
use crate::{
	_prelude::*,
	auth::{RoleEntry, RoleName},
	storage::{self, Storage, StorageError},
};

/// Storage prefix for role documents.
pub const ROLE_PREFIX: &str = "roles/";
/// Default number of lock shards.
pub const DEFAULT_LOCK_SHARDS: usize = 256;

/// Role documents keyed by name, with per-name write locks.
pub struct RoleStore {
	storage: Arc<dyn Storage>,
	locks: Box<[AsyncMutex<()>]>,
}
impl RoleStore {
	/// Binds the store to host storage with [`DEFAULT_LOCK_SHARDS`] locks.
	pub fn new(storage: Arc<dyn Storage>) -> Self {
		Self::with_shards(storage, DEFAULT_LOCK_SHARDS)
	}

	/// Binds the store to host storage with `shards` locks (at least one).
	pub fn with_shards(storage: Arc<dyn Storage>, shards: usize) -> Self {
		let locks = (0..shards.max(1)).map(|_| AsyncMutex::new(())).collect();

		Self { storage, locks }
	}

	/// Number of lock shards.
	pub fn shards(&self) -> usize {
		self.locks.len()
	}

	/// Shard index guarding `name`.
	pub fn shard_of(&self, name: &RoleName) -> usize {
		let digest = Sha256::digest(name.as_bytes());
		let mut prefix = [0_u8; 8];

		prefix.copy_from_slice(&digest[..8]);

		(u64::from_be_bytes(prefix) % self.locks.len() as u64) as usize
	}

	/// Waits for exclusive access to `name`.
	pub async fn lock(&self, name: &RoleName) -> MutexGuard<'_, ()> {
		self.locks[self.shard_of(name)].lock().await
	}

	/// Loads the role, if defined.
	pub async fn get(&self, name: &RoleName) -> Result<Option<RoleEntry>, StorageError> {
		storage::get_json(self.storage.as_ref(), &Self::key(name)).await
	}

	/// Persists the role under its name.
	pub async fn put(&self, role: &RoleEntry) -> Result<(), StorageError> {
		storage::put_json(self.storage.as_ref(), &Self::key(&role.role_name), role).await
	}

	/// Removes the role; removing an undefined role succeeds.
	pub async fn delete(&self, name: &RoleName) -> Result<(), StorageError> {
		self.storage.delete(&Self::key(name)).await
	}

	/// Lists every defined role name in lexicographic order.
	pub async fn list(&self) -> Result<Vec<String>, StorageError> {
		self.storage.list(ROLE_PREFIX).await
	}

	fn key(name: &RoleName) -> String {
		format!("{ROLE_PREFIX}{name}")
	}
}
impl Debug for RoleStore {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("RoleStore").field("shards", &self.locks.len()).finish()
	}
}
