//! Store-backed JIRA REST client that drives the handshake on demand.
//!
//! [`AuthorizingClient`] pairs an [`OAuthAgent`] with a session-scoped [`CredentialStore`].
//! Every call first makes sure an access token exists; when the user still has to approve
//! the application the call returns [`Authorization::AuthorizationRequired`] instead of
//! touching the REST API. A 401 from JIRA either restarts the handshake or surfaces
//! [`Error::SessionExpired`], depending on [`AuthorizingClient::with_automatic_reauthorization`].

// crates.io
use serde_json::{Map, Value};
// self
use crate::{
	_prelude::*,
	agent::OAuthAgent,
	auth::{Authorization, AuthorizationState, TokenPair, TokenSlot},
	http::{HttpClient, HttpMethod},
	obs::{FlowKind, FlowOutcome, FlowSpan},
	rest,
	store::CredentialStore,
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestHttpClient;

const UNAUTHORIZED: u16 = 401;

#[cfg(feature = "reqwest")]
/// Authorizing client specialized for the crate's default reqwest transport.
pub type ReqwestAuthorizingClient = AuthorizingClient<ReqwestHttpClient>;

/// JIRA REST client that obtains, stores, and refreshes OAuth credentials as needed.
///
/// Operations are sequential: each one awaits its store and HTTP round-trips to completion
/// and nothing runs in the background. Callers sharing one store between concurrent
/// sessions must coordinate themselves.
pub struct AuthorizingClient<C>
where
	C: ?Sized + HttpClient,
{
	agent: OAuthAgent<C>,
	store: Arc<dyn CredentialStore>,
	automatic_reauthorization: bool,
	verifier: Mutex<Option<String>>,
}
impl<C> AuthorizingClient<C>
where
	C: ?Sized + HttpClient,
{
	/// Creates a client with automatic re-authorization enabled.
	pub fn new(agent: OAuthAgent<C>, store: Arc<dyn CredentialStore>) -> Self {
		Self { agent, store, automatic_reauthorization: true, verifier: Mutex::new(None) }
	}

	/// Chooses whether a 401 restarts the handshake (`true`) or fails with
	/// [`Error::SessionExpired`] (`false`).
	pub fn with_automatic_reauthorization(mut self, enabled: bool) -> Self {
		self.automatic_reauthorization = enabled;

		self
	}

	/// Supplies the verifier JIRA appended to the callback URL.
	pub fn with_verifier(self, verifier: impl Into<String>) -> Self {
		self.set_verifier(verifier);

		self
	}

	/// Supplies the verifier JIRA appended to the callback URL.
	///
	/// The verifier is consumed by the next access-token exchange.
	pub fn set_verifier(&self, verifier: impl Into<String>) {
		*self.verifier.lock() = Some(verifier.into());
	}

	/// Extracts `oauth_verifier` from the callback URL JIRA redirected the user to.
	pub fn accept_callback(&self, callback: &Url) -> Result<()> {
		let verifier = callback
			.query_pairs()
			.find(|(key, _)| key == "oauth_verifier")
			.map(|(_, value)| value.into_owned())
			.filter(|value| !value.is_empty())
			.ok_or_else(|| Error::invalid_argument("the callback URL carries no oauth_verifier"))?;

		self.set_verifier(verifier);

		Ok(())
	}

	/// Underlying agent.
	pub fn agent(&self) -> &OAuthAgent<C> {
		&self.agent
	}

	/// Whether a 401 restarts the handshake.
	pub fn automatic_reauthorization(&self) -> bool {
		self.automatic_reauthorization
	}

	/// Current handshake state, derived from the store.
	pub async fn state(&self) -> Result<AuthorizationState> {
		Ok(<dyn CredentialStore>::state(self.store.as_ref()).await?)
	}

	/// Returns the stored access token, completing or starting the handshake if needed.
	///
	/// - An access token in the store is returned as is.
	/// - A request token is exchanged using the supplied verifier; a missing verifier is an
	///   [`Error::InvalidArgument`]. The access token replaces the request token in the store.
	/// - Otherwise fresh temporary credentials are stored and the authorization URL returned.
	pub async fn ensure_token(&self) -> Result<Authorization<TokenPair>> {
		if let Some(access) = self.store.get(TokenSlot::AccessToken).await? {
			return Ok(Authorization::Authorized(access));
		}

		let Some(request) = self.store.get(TokenSlot::RequestToken).await? else {
			return self.begin_authorization().await;
		};
		let verifier = self
			.verifier
			.lock()
			.take()
			.filter(|verifier| !verifier.is_empty())
			.ok_or_else(|| {
				Error::invalid_argument("an OAuth verifier is required to complete authorization")
			})?;
		let access = self.agent.request_access_credentials(&request, &verifier).await?;

		self.store.set(TokenSlot::AccessToken, access.clone()).await?;
		self.store.delete(TokenSlot::RequestToken).await?;

		Ok(Authorization::Authorized(access))
	}

	/// Clears both stored tokens and the agent's cached credentials.
	pub async fn invalidate(&self) -> Result<()> {
		for slot in TokenSlot::ALL {
			self.store.delete(slot).await?;
		}

		self.agent.reset();

		Ok(())
	}

	/// Issues a signed JSON call against `url`.
	///
	/// `payload` is sent as the body of POST requests. A successful response is decoded as
	/// JSON; an empty body decodes to [`Value::Null`].
	pub async fn call(
		&self,
		method: HttpMethod,
		url: Url,
		payload: Option<&Value>,
	) -> Result<Authorization<Value>> {
		const KIND: FlowKind = FlowKind::ApiCall;

		let span = FlowSpan::new(KIND, "call");
		let result = span.instrument(self.call_authorized(method, url, payload)).await;

		match &result {
			Ok(Authorization::AuthorizationRequired(_)) =>
				span.record(FlowOutcome::AuthorizationRequired),
			_ => span.record_result(&result),
		}

		result
	}

	/// Fetches `issue/{issue_id}`.
	pub async fn get_issue(&self, issue_id: &str) -> Result<Authorization<Value>> {
		let url = rest::issue_url(&self.agent.config().api_base()?, issue_id)?;

		self.call(HttpMethod::Get, url, None).await
	}

	/// Creates an issue by posting `params` to `issue/`.
	pub async fn create_issue(&self, params: Map<String, Value>) -> Result<Authorization<Value>> {
		let url = rest::create_issue_url(&self.agent.config().api_base()?)?;

		self.call(HttpMethod::Post, url, Some(&Value::Object(params))).await
	}

	async fn call_authorized(
		&self,
		method: HttpMethod,
		url: Url,
		payload: Option<&Value>,
	) -> Result<Authorization<Value>> {
		let access = match self.ensure_token().await? {
			Authorization::Authorized(access) => access,
			Authorization::AuthorizationRequired(url) =>
				return Ok(Authorization::AuthorizationRequired(url)),
		};
		let request = rest::json_request(method, url, payload);
		let response = self.agent.signing_client(Some(&access)).send(request).await?;

		if response.status == UNAUTHORIZED {
			if !self.automatic_reauthorization {
				return Err(Error::SessionExpired);
			}

			self.invalidate().await?;

			return self.begin_authorization().await;
		}
		if !response.is_success() {
			return Err(Error::Request { status: response.status, reason: response.reason });
		}

		Ok(Authorization::Authorized(rest::decode_json(&response)?))
	}

	async fn begin_authorization<T>(&self) -> Result<Authorization<T>> {
		let request = self.agent.request_temp_credentials().await?;
		let url = self.agent.build_authorization_url(&request.token)?;

		self.store.set(TokenSlot::RequestToken, request).await?;

		Ok(Authorization::AuthorizationRequired(url))
	}
}
impl<C> Debug for AuthorizingClient<C>
where
	C: ?Sized + HttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AuthorizingClient")
			.field("agent", &self.agent)
			.field("automatic_reauthorization", &self.automatic_reauthorization)
			.field("verifier_set", &self.verifier.lock().is_some())
			.finish()
	}
}
