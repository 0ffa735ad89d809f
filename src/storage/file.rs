//! File-backed [`Storage`] for single-node deployments.

// std
use std::{
	fs::{self, File},
	io::Write,
	path::{Path, PathBuf},
};
// crates.io
use base64::{Engine as _, engine::general_purpose::STANDARD};
// self
use crate::{
	_prelude::*,
	storage::{self, Storage, StorageError, StorageFuture},
};

type Snapshot = BTreeMap<String, Vec<u8>>;

/// Persists every document to a JSON snapshot after each mutation.
///
/// Values are arbitrary bytes, so the snapshot stores them base64-encoded.
#[derive(Clone, Debug)]
pub struct FileStorage {
	path: PathBuf,
	inner: Arc<RwLock<Snapshot>>,
}
impl FileStorage {
	/// Opens (or creates) a snapshot at the provided path, eagerly loading existing data.
	pub fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
		let path = path.into();

		Self::ensure_parent_exists(&path)?;

		let snapshot = Self::load_snapshot(&path)?;

		Ok(Self { path, inner: Arc::new(RwLock::new(snapshot)) })
	}

	/// Location of the snapshot file.
	pub fn path(&self) -> &Path {
		&self.path
	}

	fn load_snapshot(path: &Path) -> Result<Snapshot, StorageError> {
		if !path.exists() {
			return Ok(Snapshot::new());
		}

		let bytes = fs::read(path).map_err(|e| StorageError::Backend {
			message: format!("Failed to read {}: {e}", path.display()),
		})?;

		if bytes.is_empty() {
			return Ok(Snapshot::new());
		}

		let encoded: BTreeMap<String, String> =
			serde_json::from_slice(&bytes).map_err(|e| StorageError::Serialization {
				message: format!("Failed to parse {}: {e}", path.display()),
			})?;

		encoded
			.into_iter()
			.map(|(key, value)| {
				STANDARD.decode(value.as_bytes()).map(|decoded| (key.clone(), decoded)).map_err(|e| {
					StorageError::Serialization {
						message: format!("Failed to decode `{key}` in {}: {e}", path.display()),
					}
				})
			})
			.collect()
	}

	fn ensure_parent_exists(path: &Path) -> Result<(), StorageError> {
		if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
			fs::create_dir_all(parent).map_err(|e| StorageError::Backend {
				message: format!("Failed to create storage directory {}: {e}", parent.display()),
			})?;
		}

		Ok(())
	}

	fn persist_locked(&self, contents: &Snapshot) -> Result<(), StorageError> {
		let encoded = contents
			.iter()
			.map(|(key, value)| (key.as_str(), STANDARD.encode(value)))
			.collect::<BTreeMap<_, _>>();
		let serialized =
			serde_json::to_vec_pretty(&encoded).map_err(|e| StorageError::Serialization {
				message: format!("Failed to serialize storage snapshot: {e}"),
			})?;
		let mut tmp_path = self.path.clone();

		tmp_path.set_extension("tmp");

		{
			let mut file = File::create(&tmp_path).map_err(|e| StorageError::Backend {
				message: format!("Failed to create {}: {e}", tmp_path.display()),
			})?;

			file.write_all(&serialized).map_err(|e| StorageError::Backend {
				message: format!("Failed to write {}: {e}", tmp_path.display()),
			})?;
			file.sync_all().map_err(|e| StorageError::Backend {
				message: format!("Failed to sync {}: {e}", tmp_path.display()),
			})?;
		}

		fs::rename(&tmp_path, &self.path).map_err(|e| StorageError::Backend {
			message: format!("Failed to replace {}: {e}", self.path.display()),
		})
	}
}
impl Storage for FileStorage {
	fn get<'a>(&'a self, key: &'a str) -> StorageFuture<'a, Option<Vec<u8>>> {
		Box::pin(async move { Ok(self.inner.read().get(key).cloned()) })
	}

	fn put<'a>(&'a self, key: &'a str, value: Vec<u8>) -> StorageFuture<'a, ()> {
		Box::pin(async move {
			let mut guard = self.inner.write();

			guard.insert(key.to_owned(), value);
			self.persist_locked(&guard)
		})
	}

	fn delete<'a>(&'a self, key: &'a str) -> StorageFuture<'a, ()> {
		Box::pin(async move {
			let mut guard = self.inner.write();

			if guard.remove(key).is_some() {
				self.persist_locked(&guard)?;
			}

			Ok(())
		})
	}

	fn list<'a>(&'a self, prefix: &'a str) -> StorageFuture<'a, Vec<String>> {
		Box::pin(async move {
			let guard = self.inner.read();

			Ok(storage::suffixes(guard.keys().filter(|key| key.starts_with(prefix)), prefix))
		})
	}
}

#[cfg(test)]
mod tests {
	// std
	use std::{env, process};
	// crates.io
	use tokio::runtime::Runtime;
	// self
	use super::*;

	fn temp_path() -> PathBuf {
		let unique = format!(
			"gitlab_token_engine_file_storage_{}_{}.json",
			process::id(),
			OffsetDateTime::now_utc().unix_timestamp_nanos(),
		);

		env::temp_dir().join(unique)
	}

	#[test]
	fn documents_survive_reopen() {
		let path = temp_path();
		let storage = FileStorage::open(&path).expect("Failed to open file storage snapshot.");
		let rt = Runtime::new().expect("Failed to build Tokio runtime for file storage test.");

		rt.block_on(storage.put("config", b"{\"base_url\":\"https://gitlab.com\"}".to_vec()))
			.expect("Failed to put config document.");
		rt.block_on(storage.put("roles/deploy", vec![0, 159, 146, 150]))
			.expect("Failed to put a binary document.");
		drop(storage);

		let reopened = FileStorage::open(&path).expect("Failed to reopen file storage snapshot.");

		assert_eq!(
			rt.block_on(reopened.get("roles/deploy")).expect("Failed to read binary document."),
			Some(vec![0, 159, 146, 150])
		);
		assert_eq!(
			rt.block_on(reopened.list("roles/")).expect("Failed to list roles."),
			vec!["deploy".to_string()]
		);

		rt.block_on(reopened.delete("roles/deploy")).expect("Failed to delete role document.");

		let reopened = FileStorage::open(&path).expect("Failed to reopen after delete.");

		assert_eq!(rt.block_on(reopened.get("roles/deploy")), Ok(None));

		fs::remove_file(&path).unwrap_or_else(|e| {
			panic!("Failed to remove temporary storage snapshot {}: {e}", path.display())
		});
	}
}
