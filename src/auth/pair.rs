//! OAuth 1.0a token pairs and the store slots that hold them.

// self
use crate::{_prelude::*, auth::TokenSecret};

/// Token + token secret issued by the provider during the handshake.
///
/// The same shape carries both the temporary request token (pre-authorization) and the
/// long-lived access token; [`TokenSlot`] tells them apart.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TokenPair {
	/// Public token identifier (`oauth_token`).
	pub token: String,
	/// Token secret (`oauth_token_secret`); callers must avoid logging it.
	pub token_secret: TokenSecret,
}
impl TokenPair {
	/// Builds a pair from raw values.
	pub fn new(token: impl Into<String>, token_secret: impl Into<String>) -> Self {
		Self { token: token.into(), token_secret: TokenSecret::new(token_secret) }
	}
}
impl Debug for TokenPair {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenPair")
			.field("token", &self.token)
			.field("token_secret", &"<redacted>")
			.finish()
	}
}

/// Logical credential-store slots used by the handshake.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenSlot {
	/// Temporary credentials awaiting user authorization.
	RequestToken,
	/// Access credentials used to sign API requests.
	AccessToken,
}
impl TokenSlot {
	/// Every slot, in handshake order.
	pub const ALL: [TokenSlot; 2] = [TokenSlot::RequestToken, TokenSlot::AccessToken];

	/// Returns the fixed store key for the slot.
	pub const fn as_str(self) -> &'static str {
		match self {
			TokenSlot::RequestToken => "request_token",
			TokenSlot::AccessToken => "access_token",
		}
	}
}
impl Display for TokenSlot {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
