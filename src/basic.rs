//! JIRA REST client authenticated with HTTP basic credentials, or anonymously.
//!
//! [`BasicClient`] needs no handshake or credential store. A 401 answer surfaces as
//! [`Error::AccessDenied`].

// crates.io
use serde_json::{Map, Value};
// self
use crate::{
	_prelude::*,
	config::BasicConfig,
	http::{BasicAuthClient, HttpClient, HttpMethod},
	obs::{FlowKind, FlowSpan},
	rest,
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestHttpClient;

const UNAUTHORIZED: u16 = 401;

#[cfg(feature = "reqwest")]
/// Basic client specialized for the crate's default reqwest transport.
pub type ReqwestBasicClient = BasicClient<ReqwestHttpClient>;

/// JIRA REST client that sends basic credentials when configured and nothing otherwise.
pub struct BasicClient<C>
where
	C: ?Sized + HttpClient,
{
	config: BasicConfig,
	http_client: BasicAuthClient<C>,
}
impl<C> BasicClient<C>
where
	C: ?Sized + HttpClient,
{
	/// Creates a client over the caller-provided transport.
	pub fn with_http_client(config: BasicConfig, http_client: impl Into<Arc<C>>) -> Self {
		let http_client = BasicAuthClient::new(http_client, config.credentials().cloned());

		Self { config, http_client }
	}

	/// Configuration the client was built with.
	pub fn config(&self) -> &BasicConfig {
		&self.config
	}

	/// Whether requests go out without credentials.
	pub fn is_anonymous(&self) -> bool {
		self.http_client.credentials().is_none()
	}

	/// Issues a JSON call against `url`.
	///
	/// `payload` is sent as the body of POST requests. An empty success body decodes to
	/// [`Value::Null`].
	pub async fn call(&self, method: HttpMethod, url: Url, payload: Option<&Value>) -> Result<Value> {
		let span = FlowSpan::new(FlowKind::ApiCall, "basic_call");
		let result = span.instrument(self.send_json(method, url, payload)).await;

		span.record_result(&result);

		result
	}

	/// Fetches `issue/{issue_id}`.
	pub async fn get_issue(&self, issue_id: &str) -> Result<Value> {
		let url = rest::issue_url(&self.config.api_base()?, issue_id)?;

		self.call(HttpMethod::Get, url, None).await
	}

	/// Creates an issue by posting `params` to `issue/`.
	pub async fn create_issue(&self, params: Map<String, Value>) -> Result<Value> {
		let url = rest::create_issue_url(&self.config.api_base()?)?;

		self.call(HttpMethod::Post, url, Some(&Value::Object(params))).await
	}

	async fn send_json(&self, method: HttpMethod, url: Url, payload: Option<&Value>) -> Result<Value> {
		let response = self.http_client.send(rest::json_request(method, url, payload)).await?;

		if response.status == UNAUTHORIZED {
			return Err(Error::AccessDenied);
		}
		if !response.is_success() {
			return Err(Error::Request { status: response.status, reason: response.reason });
		}

		rest::decode_json(&response)
	}
}
#[cfg(feature = "reqwest")]
impl BasicClient<ReqwestHttpClient> {
	/// Creates a client that provisions its own reqwest transport.
	pub fn new(config: BasicConfig) -> Self {
		Self::with_http_client(config, ReqwestHttpClient::default())
	}
}
impl<C> Debug for BasicClient<C>
where
	C: ?Sized + HttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("BasicClient").field("config", &self.config).finish()
	}
}
