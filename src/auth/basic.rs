//! HTTP basic credentials for JIRA instances reached without OAuth.

// crates.io
use base64::{Engine as _, engine::general_purpose::STANDARD};
// self
use crate::{_prelude::*, auth::TokenSecret};

/// JIRA user name and password sent with HTTP basic authentication.
#[derive(Clone, PartialEq, Eq)]
pub struct BasicCredentials {
	user_id: String,
	password: TokenSecret,
}
impl BasicCredentials {
	/// Builds credentials from raw values.
	pub fn new(user_id: impl Into<String>, password: impl Into<String>) -> Self {
		Self { user_id: user_id.into(), password: TokenSecret::new(password) }
	}

	/// JIRA user name.
	pub fn user_id(&self) -> &str {
		&self.user_id
	}

	/// JIRA password; callers must avoid logging it.
	pub fn password(&self) -> &TokenSecret {
		&self.password
	}

	/// Renders the `Authorization` header value (`Basic base64(user_id:password)`).
	pub fn header_value(&self) -> String {
		format!("Basic {}", STANDARD.encode(format!("{}:{}", self.user_id, self.password.expose())))
	}
}
impl Debug for BasicCredentials {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("BasicCredentials")
			.field("user_id", &self.user_id)
			.field("password", &"<redacted>")
			.finish()
	}
}
