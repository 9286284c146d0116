//! Credential storage contract and built-in store implementations.
//!
//! The handshake persists exactly two values, addressed by [`TokenSlot`]: the temporary
//! request token and the access token. Stores are expected to be session-scoped (one store
//! per user session); concurrent writers racing on the same slot are not coordinated here.

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

// self
use crate::{
	_prelude::*,
	auth::{AuthorizationState, TokenPair, TokenSlot},
};

/// Boxed future returned by [`CredentialStore`] operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + 'a + Send>>;

/// Session-scoped storage for the handshake's token pairs.
pub trait CredentialStore
where
	Self: Send + Sync,
{
	/// Fetches the pair stored in `slot`, if present.
	fn get(&self, slot: TokenSlot) -> StoreFuture<'_, Option<TokenPair>>;

	/// Persists or replaces the pair stored in `slot`.
	fn set(&self, slot: TokenSlot, pair: TokenPair) -> StoreFuture<'_, ()>;

	/// Removes the pair stored in `slot`, returning the previous value.
	fn delete(&self, slot: TokenSlot) -> StoreFuture<'_, Option<TokenPair>>;
}
impl dyn CredentialStore {
	/// Derives the handshake state from slot presence.
	pub async fn state(&self) -> Result<AuthorizationState, StoreError> {
		let request = self.get(TokenSlot::RequestToken).await?;
		let access = self.get(TokenSlot::AccessToken).await?;

		Ok(AuthorizationState::from_slots(request.is_some(), access.is_some()))
	}
}

/// Error type produced by [`CredentialStore`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum StoreError {
	/// Serialization failures surfaced by the backend.
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
