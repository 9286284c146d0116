//! Thread-safe in-memory [`CredentialStore`] implementation for local development and tests.

// self
use crate::{
	_prelude::*,
	auth::{TokenPair, TokenSlot},
	store::{CredentialStore, StoreError, StoreFuture},
};

type SlotMap = Arc<RwLock<HashMap<TokenSlot, TokenPair>>>;

/// Storage backend that keeps token pairs in-process for tests and demos.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore(SlotMap);
impl MemoryStore {
	/// Returns the number of filled slots.
	pub fn len(&self) -> usize {
		self.0.read().len()
	}

	/// Returns `true` when no slot is filled.
	pub fn is_empty(&self) -> bool {
		self.0.read().is_empty()
	}

	fn set_now(map: SlotMap, slot: TokenSlot, pair: TokenPair) -> Result<(), StoreError> {
		map.write().insert(slot, pair);

		Ok(())
	}
}
impl CredentialStore for MemoryStore {
	fn get(&self, slot: TokenSlot) -> StoreFuture<'_, Option<TokenPair>> {
		let map = self.0.clone();

		Box::pin(async move { Ok(map.read().get(&slot).cloned()) })
	}

	fn set(&self, slot: TokenSlot, pair: TokenPair) -> StoreFuture<'_, ()> {
		let map = self.0.clone();

		Box::pin(async move { Self::set_now(map, slot, pair) })
	}

	fn delete(&self, slot: TokenSlot) -> StoreFuture<'_, Option<TokenPair>> {
		let map = self.0.clone();

		Box::pin(async move { Ok(map.write().remove(&slot)) })
	}
}
