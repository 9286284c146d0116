//! Handshake state derived from store contents, and the redirect-aware result type.

// self
use crate::_prelude::*;

/// Where the three-legged handshake currently stands.
///
/// Never persisted; recomputed from which [`TokenSlot`](crate::auth::TokenSlot)s are filled.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AuthorizationState {
	/// Neither a request token nor an access token is stored.
	NoToken,
	/// A request token awaits the user's authorization and the provider's verifier.
	HaveRequestToken,
	/// An access token is available for signing API requests.
	HaveAccessToken,
}
impl AuthorizationState {
	/// Derives the state from slot presence. An access token wins over a stale request token.
	pub const fn from_slots(has_request_token: bool, has_access_token: bool) -> Self {
		match (has_request_token, has_access_token) {
			(_, true) => AuthorizationState::HaveAccessToken,
			(true, false) => AuthorizationState::HaveRequestToken,
			(false, false) => AuthorizationState::NoToken,
		}
	}

	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			AuthorizationState::NoToken => "no_token",
			AuthorizationState::HaveRequestToken => "request_token_obtained",
			AuthorizationState::HaveAccessToken => "access_token_obtained",
		}
	}
}
impl Display for AuthorizationState {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome of an operation that may need the user to authorize the application first.
///
/// `AuthorizationRequired` carries the provider's consent page; the surrounding layer
/// delivers it (HTTP 302, CLI prompt, ...) and resumes on a later invocation carrying the
/// `oauth_verifier`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Authorization<T> {
	/// Credentials were available and the operation completed.
	Authorized(T),
	/// The user-agent must be sent to this URL before the operation can proceed.
	AuthorizationRequired(Url),
}
impl<T> Authorization<T> {
	/// Returns `true` when a redirect is required.
	pub fn is_authorization_required(&self) -> bool {
		matches!(self, Authorization::AuthorizationRequired(_))
	}

	/// Returns the authorized value, if any.
	pub fn authorized(self) -> Option<T> {
		match self {
			Authorization::Authorized(value) => Some(value),
			Authorization::AuthorizationRequired(_) => None,
		}
	}

	/// Returns the redirect URL, if any.
	pub fn redirect_url(&self) -> Option<&Url> {
		match self {
			Authorization::Authorized(_) => None,
			Authorization::AuthorizationRequired(url) => Some(url),
		}
	}

	/// Maps the authorized value, leaving a redirect untouched.
	pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Authorization<U> {
		match self {
			Authorization::Authorized(value) => Authorization::Authorized(f(value)),
			Authorization::AuthorizationRequired(url) => Authorization::AuthorizationRequired(url),
		}
	}
}
