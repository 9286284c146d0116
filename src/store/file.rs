//! Simple file-backed [`CredentialStore`] for CLI tools that resume the handshake across runs.

// std
use std::{
	fs::{self, File},
	io::Write,
	path::Path,
};
// self
use crate::{
	_prelude::*,
	auth::{TokenPair, TokenSlot},
	store::{CredentialStore, StoreError, StoreFuture},
};

/// Persists token pairs to a JSON file after each mutation.
///
/// A mutation only becomes visible once its snapshot has been written; a failed write leaves
/// both the file and the in-memory view unchanged.
#[derive(Clone, Debug)]
pub struct FileStore {
	path: PathBuf,
	inner: Arc<RwLock<BTreeMap<TokenSlot, TokenPair>>>,
}
impl FileStore {
	/// Opens (or creates) a store at the provided path, eagerly loading existing data.
	pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
		let path = path.into();

		Self::ensure_parent_exists(&path)?;

		let snapshot = Self::load_snapshot(&path)?;

		Ok(Self { path, inner: Arc::new(RwLock::new(snapshot)) })
	}

	/// Location of the backing file.
	pub fn path(&self) -> &Path {
		&self.path
	}

	fn load_snapshot(path: &Path) -> Result<BTreeMap<TokenSlot, TokenPair>, StoreError> {
		if !path.exists() {
			return Ok(BTreeMap::new());
		}

		let bytes = fs::read(path).map_err(|e| StoreError::Backend {
			message: format!("Failed to read {}: {e}", path.display()),
		})?;

		if bytes.is_empty() {
			return Ok(BTreeMap::new());
		}

		let entries: Vec<(TokenSlot, TokenPair)> =
			serde_json::from_slice(&bytes).map_err(|e| StoreError::Serialization {
				message: format!("Failed to parse {}: {e}", path.display()),
			})?;

		Ok(entries.into_iter().collect())
	}

	fn ensure_parent_exists(path: &Path) -> Result<(), StoreError> {
		if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
			fs::create_dir_all(parent).map_err(|e| StoreError::Backend {
				message: format!("Failed to create store directory {}: {e}", parent.display()),
			})?;
		}

		Ok(())
	}

	fn persist_locked(&self, contents: &BTreeMap<TokenSlot, TokenPair>) -> Result<(), StoreError> {
		Self::ensure_parent_exists(&self.path)?;

		let snapshot: Vec<_> = contents.iter().collect();
		let serialized =
			serde_json::to_vec_pretty(&snapshot).map_err(|e| StoreError::Serialization {
				message: format!("Failed to serialize store snapshot: {e}"),
			})?;
		let mut tmp_path = self.path.clone();

		tmp_path.set_extension("tmp");

		{
			let mut file = File::create(&tmp_path).map_err(|e| StoreError::Backend {
				message: format!("Failed to create {}: {e}", tmp_path.display()),
			})?;

			file.write_all(&serialized).map_err(|e| StoreError::Backend {
				message: format!("Failed to write {}: {e}", tmp_path.display()),
			})?;
			file.sync_all().map_err(|e| StoreError::Backend {
				message: format!("Failed to sync {}: {e}", tmp_path.display()),
			})?;
		}

		fs::rename(&tmp_path, &self.path).map_err(|e| StoreError::Backend {
			message: format!("Failed to replace {}: {e}", self.path.display()),
		})
	}
}
impl CredentialStore for FileStore {
	fn get(&self, slot: TokenSlot) -> StoreFuture<'_, Option<TokenPair>> {
		Box::pin(async move { Ok(self.inner.read().get(&slot).cloned()) })
	}

	fn set(&self, slot: TokenSlot, pair: TokenPair) -> StoreFuture<'_, ()> {
		Box::pin(async move {
			let mut guard = self.inner.write();
			let mut next = guard.clone();

			next.insert(slot, pair);
			self.persist_locked(&next)?;

			*guard = next;

			Ok(())
		})
	}

	fn delete(&self, slot: TokenSlot) -> StoreFuture<'_, Option<TokenPair>> {
		Box::pin(async move {
			let mut guard = self.inner.write();

			if !guard.contains_key(&slot) {
				return Ok(None);
			}

			let mut next = guard.clone();
			let removed = next.remove(&slot);

			self.persist_locked(&next)?;

			*guard = next;

			Ok(removed)
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
			"jira_oauth_file_store_{}_{}.json",
			process::id(),
			OffsetDateTime::now_utc().unix_timestamp_nanos(),
		);

		env::temp_dir().join(unique)
	}

	#[test]
	fn save_and_reload_round_trip() {
		let path = temp_path();
		let store = FileStore::open(&path).expect("Failed to open file store snapshot.");
		let rt = Runtime::new().expect("Failed to build Tokio runtime for file store test.");

		rt.block_on(store.set(TokenSlot::AccessToken, TokenPair::new("acc", "sec")))
			.expect("Failed to save access token to file store.");
		rt.block_on(store.set(TokenSlot::RequestToken, TokenPair::new("req", "tmp")))
			.expect("Failed to save request token to file store.");
		rt.block_on(store.delete(TokenSlot::RequestToken))
			.expect("Failed to delete request token from file store.");
		drop(store);

		let reopened = FileStore::open(&path).expect("Failed to reopen file store snapshot.");
		let access = rt
			.block_on(reopened.get(TokenSlot::AccessToken))
			.expect("Failed to read access token from file store.")
			.expect("File store lost the access token after reopen.");
		let request = rt
			.block_on(reopened.get(TokenSlot::RequestToken))
			.expect("Failed to read request token from file store.");

		assert_eq!(access, TokenPair::new("acc", "sec"));
		assert!(request.is_none());

		fs::remove_file(&path).unwrap_or_else(|e| {
			panic!("Failed to remove temporary file store snapshot {}: {e}", path.display())
		});
	}

	#[test]
	fn failed_write_keeps_memory_and_disk_in_sync() {
		let dir = temp_path().with_extension("d");
		let path = dir.join("session.json");
		let store = FileStore::open(&path).expect("Failed to open file store snapshot.");
		let rt = Runtime::new().expect("Failed to build Tokio runtime for file store test.");

		rt.block_on(store.set(TokenSlot::AccessToken, TokenPair::new("acc", "sec")))
			.expect("Failed to save access token to file store.");
		// A plain file where the directory was makes every later write fail.
		fs::remove_dir_all(&dir).expect("Failed to remove store directory fixture.");
		fs::write(&dir, b"").expect("Failed to block store directory fixture.");

		let set_err = rt
			.block_on(store.set(TokenSlot::RequestToken, TokenPair::new("req", "tmp")))
			.expect_err("Write into a blocked directory should fail.");
		let delete_err = rt
			.block_on(store.delete(TokenSlot::AccessToken))
			.expect_err("Delete with a blocked directory should fail.");

		assert!(matches!(set_err, StoreError::Backend { .. }));
		assert!(matches!(delete_err, StoreError::Backend { .. }));
		assert!(
			rt.block_on(store.get(TokenSlot::RequestToken))
				.expect("Failed to read request token from file store.")
				.is_none()
		);
		assert_eq!(
			rt.block_on(store.get(TokenSlot::AccessToken))
				.expect("Failed to read access token from file store."),
			Some(TokenPair::new("acc", "sec"))
		);

		fs::remove_file(&dir).unwrap_or_else(|e| {
			panic!("Failed to remove store directory fixture {}: {e}", dir.display())
		});
	}

	#[test]
	fn corrupt_snapshot_is_a_serialization_error() {
		let path = temp_path();

		fs::write(&path, b"not json").expect("Failed to write corrupt snapshot fixture.");

		let err = FileStore::open(&path).expect_err("Corrupt snapshot should be rejected.");

		assert!(matches!(err, StoreError::Serialization { .. }));

		fs::remove_file(&path).unwrap_or_else(|e| {
			panic!("Failed to remove temporary file store snapshot {}: {e}", path.display())
		});
	}
}
