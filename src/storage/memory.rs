//! Thread-safe in-memory [`Storage`] implementation for local development and tests.

// self
use crate::{
	_prelude::*,
	storage::{self, Storage, StorageError, StorageFuture},
};

type StorageMap = Arc<RwLock<BTreeMap<String, Vec<u8>>>>;

/// Thread-safe storage backend that keeps documents in-process.
#[derive(Clone, Debug, Default)]
pub struct MemoryStorage(StorageMap);
impl MemoryStorage {
	/// Number of stored keys.
	pub fn len(&self) -> usize {
		self.0.read().len()
	}

	/// Returns `true` when nothing is stored.
	pub fn is_empty(&self) -> bool {
		self.0.read().is_empty()
	}

	fn get_now(map: StorageMap, key: &str) -> Option<Vec<u8>> {
		map.read().get(key).cloned()
	}

	fn put_now(map: StorageMap, key: &str, value: Vec<u8>) {
		map.write().insert(key.to_owned(), value);
	}

	fn delete_now(map: StorageMap, key: &str) {
		map.write().remove(key);
	}

	fn list_now(map: StorageMap, prefix: &str) -> Vec<String> {
		let guard = map.read();

		storage::suffixes(
			guard.range(prefix.to_owned()..).map(|(key, _)| key).take_while(|key| key.starts_with(prefix)),
			prefix,
		)
	}
}
impl Storage for MemoryStorage {
	fn get<'a>(&'a self, key: &'a str) -> StorageFuture<'a, Option<Vec<u8>>> {
		let map = self.0.clone();

		Box::pin(async move { Ok(Self::get_now(map, key)) })
	}

	fn put<'a>(&'a self, key: &'a str, value: Vec<u8>) -> StorageFuture<'a, ()> {
		let map = self.0.clone();

		Box::pin(async move {
			Self::put_now(map, key, value);

			Ok(())
		})
	}

	fn delete<'a>(&'a self, key: &'a str) -> StorageFuture<'a, ()> {
		let map = self.0.clone();

		Box::pin(async move {
			Self::delete_now(map, key);

			Ok(())
		})
	}

	fn list<'a>(&'a self, prefix: &'a str) -> StorageFuture<'a, Vec<String>> {
		let map = self.0.clone();

		Box::pin(async move { Ok(Self::list_now(map, prefix)) })
	}
}
