//! Three-legged OAuth 1.0a handshake against a JIRA application link.
//!
//! [`OAuthAgent`] owns the consumer configuration, the shared transport, and the request
//! signer. It performs the two credential exchanges (temporary credentials, then access
//! credentials) and hands out [`SigningClient`]s for API calls. The agent never touches a
//! credential store; persisting the pairs it returns is the caller's job.

// self
use crate::{
	_prelude::*,
	auth::TokenPair,
	config::OAuthConfig,
	error::ProtocolError,
	http::{HttpClient, HttpMethod, HttpRequest, HttpResponse, SigningClient},
	oauth,
	obs::{FlowKind, FlowSpan},
	sign::{RequestSigner, RsaSha1Signer},
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestHttpClient;

const TEMP_CREDENTIALS_STAGE: &str = "temp credentials";
const ACCESS_CREDENTIALS_STAGE: &str = "access credentials";

#[cfg(feature = "reqwest")]
/// Agent specialized for the crate's default reqwest transport.
pub type ReqwestAgent = OAuthAgent<ReqwestHttpClient>;

/// Drives the OAuth 1.0a handshake and produces signing clients.
///
/// The agent remembers the last access pair it obtained so [`OAuthAgent::signing_client`]
/// can be called without arguments afterwards. The signing client is memoized and reused
/// until the resolved token pair changes; [`OAuthAgent::reset`] forgets both.
pub struct OAuthAgent<C>
where
	C: ?Sized + HttpClient,
{
	config: OAuthConfig,
	http_client: Arc<C>,
	signer: Arc<dyn RequestSigner>,
	last_access: Mutex<Option<TokenPair>>,
	signing_client: Mutex<Option<Arc<SigningClient<C>>>>,
}
impl<C> OAuthAgent<C>
where
	C: ?Sized + HttpClient,
{
	/// Creates an agent over the caller-provided transport.
	///
	/// Requests are signed with an [`RsaSha1Signer`] reading the configured private key; use
	/// [`OAuthAgent::with_signer`] to substitute another signer.
	pub fn with_http_client(config: OAuthConfig, http_client: impl Into<Arc<C>>) -> Self {
		let signer = Arc::new(RsaSha1Signer::new(config.private_key()));

		Self {
			config,
			http_client: http_client.into(),
			signer,
			last_access: Mutex::new(None),
			signing_client: Mutex::new(None),
		}
	}

	/// Replaces the request signer and drops any memoized signing client.
	pub fn with_signer(mut self, signer: Arc<dyn RequestSigner>) -> Self {
		self.signer = signer;
		*self.signing_client.get_mut() = None;

		self
	}

	/// Configuration the agent was built with.
	pub fn config(&self) -> &OAuthConfig {
		&self.config
	}

	/// Access pair obtained by the last successful exchange, if any.
	pub fn last_access_token(&self) -> Option<TokenPair> {
		self.last_access.lock().clone()
	}

	/// Obtains temporary credentials (the request token).
	///
	/// The request is signed with consumer credentials only and carries `oauth_callback`.
	pub async fn request_temp_credentials(&self) -> Result<TokenPair> {
		const KIND: FlowKind = FlowKind::TempCredentials;

		let span = FlowSpan::new(KIND, "request_temp_credentials");
		let result = span
			.instrument(async {
				let mut url = self.config.request_token_url()?;

				url.query_pairs_mut()
					.append_pair("oauth_callback", self.config.callback_url().as_str());

				let response =
					self.client_for(None).send(HttpRequest::new(HttpMethod::Post, url)).await?;

				read_credentials(TEMP_CREDENTIALS_STAGE, response)
			})
			.await;

		span.record_result(&result);

		result
	}

	/// Builds the URL the user must visit to authorize `request_token`.
	pub fn build_authorization_url(&self, request_token: &str) -> Result<Url> {
		Ok(self.config.authorization_url(request_token)?)
	}

	/// Exchanges an authorized request token and its verifier for access credentials.
	///
	/// An empty verifier is rejected before any request is made. On success the pair becomes
	/// the agent's last-known access token.
	pub async fn request_access_credentials(
		&self,
		request_token: &TokenPair,
		verifier: &str,
	) -> Result<TokenPair> {
		const KIND: FlowKind = FlowKind::AccessCredentials;

		let span = FlowSpan::new(KIND, "request_access_credentials");
		let result = span
			.instrument(async {
				if verifier.is_empty() {
					return Err(Error::invalid_argument("an OAuth verifier is required"));
				}

				let mut url = self.config.access_token_url()?;

				url.query_pairs_mut()
					.append_pair("oauth_verifier", verifier)
					.append_pair("oauth_callback", self.config.callback_url().as_str());

				let response = self
					.client_for(Some(request_token.clone()))
					.send(HttpRequest::new(HttpMethod::Post, url))
					.await?;
				let access = read_credentials(ACCESS_CREDENTIALS_STAGE, response)?;

				*self.last_access.lock() = Some(access.clone());

				Ok(access)
			})
			.await;

		span.record_result(&result);

		result
	}

	/// Returns a client that signs with `token`, falling back to the last-known access pair.
	///
	/// The client is reused while the resolved pair stays the same and rebuilt when it
	/// changes. Without any pair the client signs with consumer credentials only.
	pub fn signing_client(&self, token: Option<&TokenPair>) -> Arc<SigningClient<C>> {
		let resolved = token.cloned().or_else(|| self.last_access.lock().clone());
		let mut memo = self.signing_client.lock();

		if let Some(client) = memo.as_ref().filter(|client| client.token() == resolved.as_ref()) {
			return client.clone();
		}

		let client = Arc::new(self.client_for(resolved));

		*memo = Some(client.clone());

		client
	}

	/// Forgets the last-known access pair and the memoized signing client.
	pub fn reset(&self) {
		*self.last_access.lock() = None;
		*self.signing_client.lock() = None;
	}

	fn client_for(&self, token: Option<TokenPair>) -> SigningClient<C> {
		SigningClient::new(
			self.http_client.clone(),
			self.signer.clone(),
			self.config.consumer_key(),
			token,
		)
	}
}
#[cfg(feature = "reqwest")]
impl OAuthAgent<ReqwestHttpClient> {
	/// Creates an agent that provisions its own reqwest transport.
	pub fn new(config: OAuthConfig) -> Self {
		Self::with_http_client(config, ReqwestHttpClient::default())
	}
}
impl<C> Debug for OAuthAgent<C>
where
	C: ?Sized + HttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("OAuthAgent")
			.field("config", &self.config)
			.field("signature_method", &self.signer.method())
			.field("has_access_token", &self.last_access.lock().is_some())
			.finish()
	}
}

fn read_credentials(stage: &'static str, response: HttpResponse) -> Result<TokenPair> {
	if response.is_success() {
		return Ok(oauth::parse_credentials(stage, &response.body)?);
	}

	match oauth::parse_credentials(stage, &response.body) {
		Err(problem @ ProtocolError::ProviderProblem { .. }) => Err(problem.into()),
		_ => Err(Error::Request { status: response.status, reason: response.reason }),
	}
}
