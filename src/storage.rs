//! Host key-value storage contract plus built-in in-memory and file adapters.
//!
//! The engine persists JSON documents under string keys. Hosts bring their own backend by
//! implementing [`Storage`]; [`get_json`] and [`put_json`] handle the encoding so backends only
//! move bytes.

pub mod file;
pub mod memory;

pub use file::FileStorage;
pub use memory::MemoryStorage;

// crates.io
use serde::de::DeserializeOwned;
// self
use crate::_prelude::*;

/// Boxed future returned by [`Storage`] operations.
pub type StorageFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StorageError>> + 'a + Send>>;

/// Persistent key-value storage provided by the host.
pub trait Storage
where
	Self: Send + Sync,
{
	/// Fetches the value stored at `key`, if present.
	fn get<'a>(&'a self, key: &'a str) -> StorageFuture<'a, Option<Vec<u8>>>;

	/// Stores or replaces the value at `key`.
	fn put<'a>(&'a self, key: &'a str, value: Vec<u8>) -> StorageFuture<'a, ()>;

	/// Removes `key`; removing a missing key succeeds.
	fn delete<'a>(&'a self, key: &'a str) -> StorageFuture<'a, ()>;

	/// Lists the suffixes of every key starting with `prefix`, in lexicographic order.
	fn list<'a>(&'a self, prefix: &'a str) -> StorageFuture<'a, Vec<String>>;
}

/// Error type produced by [`Storage`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum StorageError {
	/// Document encoding or decoding failed.
	#[error("Serialization error: {message}.")]
	Serialization {
		/// Human-readable error payload.
		message: String,
	},
	/// Backend-level failure for the storage engine.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}

/// Reads and decodes the JSON document stored at `key`.
pub async fn get_json<T>(storage: &dyn Storage, key: &str) -> Result<Option<T>, StorageError>
where
	T: DeserializeOwned,
{
	let Some(bytes) = storage.get(key).await? else {
		return Ok(None);
	};
	let deserializer = &mut serde_json::Deserializer::from_slice(&bytes);

	serde_path_to_error::deserialize(deserializer).map(Some).map_err(|e| {
		StorageError::Serialization { message: format!("Failed to decode `{key}` at {e}") }
	})
}

/// Encodes `value` as JSON and stores it at `key`.
pub async fn put_json<T>(storage: &dyn Storage, key: &str, value: &T) -> Result<(), StorageError>
where
	T: ?Sized + Serialize + Sync,
{
	let bytes = serde_json::to_vec(value).map_err(|e| StorageError::Serialization {
		message: format!("Failed to encode `{key}`: {e}"),
	})?;

	storage.put(key, bytes).await
}

/// Returns the suffixes of `keys` that start with `prefix`, keeping their order.
pub(crate) fn suffixes<'a, I>(keys: I, prefix: &str) -> Vec<String>
where
	I: IntoIterator<Item = &'a String>,
{
	keys.into_iter()
		.filter_map(|key| key.strip_prefix(prefix))
		.filter(|suffix| !suffix.is_empty())
		.map(str::to_owned)
		.collect()
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[derive(Debug, PartialEq, Serialize, Deserialize)]
	struct Document {
		base_url: String,
		max_token_lifetime: i64,
	}

	#[tokio::test]
	async fn json_helpers_round_trip_and_report_paths() {
		let storage = MemoryStorage::default();
		let document = Document { base_url: "https://gitlab.com".into(), max_token_lifetime: 0 };

		put_json(&storage, "config", &document).await.expect("Encoding should succeed.");

		let decoded: Option<Document> =
			get_json(&storage, "config").await.expect("Decoding should succeed.");

		assert_eq!(decoded, Some(document));

		storage
			.put("config", b"{\"base_url\":\"x\",\"max_token_lifetime\":\"soon\"}".to_vec())
			.await
			.expect("Raw put should succeed.");

		let err = get_json::<Document>(&storage, "config")
			.await
			.expect_err("Malformed documents must fail to decode.");

		assert!(matches!(&err, StorageError::Serialization { message } if message.contains("max_token_lifetime")));
		assert_eq!(get_json::<Document>(&storage, "missing").await, Ok(None));
	}

	#[test]
	fn suffixes_strip_prefix_and_skip_bare_prefix() {
		let keys = ["config".to_string(), "roles/".to_string(), "roles/a".to_string()];

		assert_eq!(suffixes(&keys, "roles/"), vec!["a".to_string()]);
	}
}
