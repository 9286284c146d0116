//! JIRA REST client authenticated with three-legged OAuth 1.0a and RSA-SHA1 signatures.
//!
//! [`agent::OAuthAgent`] runs the handshake, [`client::AuthorizingClient`] drives it on demand
//! from a pluggable [`store::CredentialStore`], and [`http::HttpClient`] keeps the transport
//! swappable. Instances reached with a user name and password, or anonymously, use
//! [`basic::BasicClient`] instead.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod agent;
pub mod auth;
pub mod basic;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod oauth;
pub mod obs;
pub mod sign;
pub mod store;

mod json;
mod rest;

#[cfg(all(any(test, feature = "test"), feature = "reqwest"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// std
	use std::path::Path;
	// self
	use crate::{
		agent::OAuthAgent,
		client::{AuthorizingClient, ReqwestAuthorizingClient},
		config::OAuthConfig,
		http::ReqwestHttpClient,
		store::{CredentialStore, MemoryStore},
	};

	/// Consumer key used by the test helpers.
	pub const TEST_CONSUMER_KEY: &str = "jira-oauth-tests";

	/// Path of the PKCS#8 RSA key shipped under `tests/fixtures/`.
	pub fn fixture_private_key() -> PathBuf {
		Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/consumer_key.pem")
	}

	/// Builds a reqwest HTTP client that accepts the self-signed certificates produced by
	/// `httpmock` during tests.
	pub fn test_reqwest_http_client() -> ReqwestHttpClient {
		let client = ReqwestClient::builder()
			.danger_accept_invalid_certs(true)
			.danger_accept_invalid_hostnames(true)
			.build()
			.expect("Failed to build insecure Reqwest client for tests.");

		ReqwestHttpClient::with_client(client)
	}

	/// Builds a configuration pointing at `base_url` and signing with the fixture key.
	pub fn test_config(base_url: &str) -> OAuthConfig {
		OAuthConfig::builder(base_url)
			.consumer_key(TEST_CONSUMER_KEY)
			.private_key(fixture_private_key())
			.callback_url("https://app.example.com/jira/callback")
			.build()
			.expect("Failed to build test OAuth configuration.")
	}

	/// Constructs an [`AuthorizingClient`] backed by an in-memory store and the reqwest
	/// transport used across integration tests.
	pub fn build_reqwest_test_client(base_url: &str) -> (ReqwestAuthorizingClient, Arc<MemoryStore>) {
		let store_backend = Arc::new(MemoryStore::default());
		let store: Arc<dyn CredentialStore> = store_backend.clone();
		let agent = OAuthAgent::with_http_client(test_config(base_url), test_reqwest_http_client());

		(AuthorizingClient::new(agent, store), store_backend)
	}
}

mod _prelude {
	pub use std::{
		collections::{BTreeMap, HashMap},
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		path::PathBuf,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use parking_lot::{Mutex, RwLock};
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::OffsetDateTime;
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use serde_json;
pub use url;
#[cfg(all(test, feature = "reqwest"))] use {color_eyre as _, httpmock as _};
