//! Transport primitives for signed JIRA calls.
//!
//! The module exposes [`HttpClient`], the crate's only dependency on an HTTP stack, together
//! with the plain [`HttpRequest`]/[`HttpResponse`] values it exchanges. [`SigningClient`]
//! wraps any transport and attaches an OAuth 1.0a `Authorization` header to every request
//! before dispatching it, so transports never need to know about OAuth. [`BasicAuthClient`]
//! does the same for basic credentials, or sends requests anonymously.

// std
#[cfg(feature = "reqwest")] use std::ops::Deref;
// self
use crate::{
	_prelude::*,
	auth::{BasicCredentials, TokenPair},
	oauth::{self, ProtocolParams},
	sign::RequestSigner,
};

#[cfg(feature = "reqwest")]
const UNKNOWN_REASON: &str = "Unknown Status";

/// Boxed future returned by [`HttpClient::send`].
pub type HttpFuture<'a, T> =
	Pin<Box<dyn Future<Output = Result<T, crate::error::TransportError>> + 'a + Send>>;

/// Abstraction over HTTP transports.
///
/// Implementations must be `Send + Sync + 'static` so one transport can be shared between
/// the agent, its signing clients, and any number of authorizing clients. Timeouts, TLS,
/// and connection reuse are the transport's concern.
pub trait HttpClient
where
	Self: 'static + Send + Sync,
{
	/// Dispatches `request` and resolves once the full response body is available.
	fn send(&self, request: HttpRequest) -> HttpFuture<'_, HttpResponse>;
}

/// HTTP methods issued by the crate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HttpMethod {
	/// `GET`, sent without a body.
	Get,
	/// `POST`.
	Post,
}
impl HttpMethod {
	/// Returns the method token.
	pub const fn as_str(self) -> &'static str {
		match self {
			HttpMethod::Get => "GET",
			HttpMethod::Post => "POST",
		}
	}
}

/// Outgoing request handed to an [`HttpClient`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpRequest {
	/// Request method.
	pub method: HttpMethod,
	/// Absolute request URL, including any query string.
	pub url: Url,
	/// Header name/value pairs, in insertion order.
	pub headers: Vec<(String, String)>,
	/// Optional request body.
	pub body: Option<Vec<u8>>,
}
impl HttpRequest {
	/// Creates a request without headers or body.
	pub fn new(method: HttpMethod, url: Url) -> Self {
		Self { method, url, headers: Vec::new(), body: None }
	}

	/// Appends a header.
	pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.headers.push((name.into(), value.into()));

		self
	}

	/// Sets the body.
	pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
		self.body = Some(body.into());

		self
	}

	/// Returns the first header named `name`, compared case-insensitively.
	pub fn header(&self, name: &str) -> Option<&str> {
		self.headers
			.iter()
			.find(|(key, _)| key.eq_ignore_ascii_case(name))
			.map(|(_, value)| value.as_str())
	}

	/// Replaces every header named `name` with a single value.
	pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
		let name = name.into();

		self.headers.retain(|(key, _)| !key.eq_ignore_ascii_case(&name));
		self.headers.push((name, value.into()));
	}
}

/// Response returned by an [`HttpClient`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpResponse {
	/// HTTP status code.
	pub status: u16,
	/// Reason phrase.
	///
	/// [`ReqwestHttpClient`] reports the canonical phrase for the status code, or
	/// `Unknown Status` for codes without one; a custom phrase sent by the server is not
	/// preserved.
	pub reason: String,
	/// Raw response body.
	pub body: Vec<u8>,
}
impl HttpResponse {
	/// Returns `true` for 2xx statuses.
	pub fn is_success(&self) -> bool {
		(200..300).contains(&self.status)
	}
}

/// Transport wrapper that OAuth-signs every request it sends.
///
/// Holds the consumer key, the token pair used as `oauth_token` (absent for the
/// unauthenticated temp-credential request) and the [`RequestSigner`] callback. RSA-SHA1
/// does not mix the consumer or token secrets into the signature.
pub struct SigningClient<C>
where
	C: ?Sized + HttpClient,
{
	http_client: Arc<C>,
	signer: Arc<dyn RequestSigner>,
	consumer_key: String,
	token: Option<TokenPair>,
}
impl<C> SigningClient<C>
where
	C: ?Sized + HttpClient,
{
	/// Creates a signing client over `http_client`.
	pub fn new(
		http_client: impl Into<Arc<C>>,
		signer: Arc<dyn RequestSigner>,
		consumer_key: impl Into<String>,
		token: Option<TokenPair>,
	) -> Self {
		Self { http_client: http_client.into(), signer, consumer_key: consumer_key.into(), token }
	}

	/// Token pair this client signs with, if any.
	pub fn token(&self) -> Option<&TokenPair> {
		self.token.as_ref()
	}

	/// Attaches a freshly generated `Authorization` header to `request`.
	pub fn sign(&self, request: &mut HttpRequest) -> Result<()> {
		let params = ProtocolParams::generate(
			self.consumer_key.as_str(),
			self.token.as_ref(),
			self.signer.method(),
		);

		self.sign_with(request, &params)
	}

	/// Signs `request` with caller-supplied protocol parameters.
	pub fn sign_with(&self, request: &mut HttpRequest, params: &ProtocolParams) -> Result<()> {
		let header = oauth::authorize(request, params, self.signer.as_ref())?;

		request.set_header("Authorization", header);

		Ok(())
	}

	/// Signs and dispatches `request`.
	pub async fn send(&self, mut request: HttpRequest) -> Result<HttpResponse> {
		self.sign(&mut request)?;

		Ok(self.http_client.send(request).await?)
	}
}
impl<C> Debug for SigningClient<C>
where
	C: ?Sized + HttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("SigningClient")
			.field("consumer_key", &self.consumer_key)
			.field("signature_method", &self.signer.method())
			.field("token", &self.token)
			.finish()
	}
}

/// Transport wrapper that sends basic credentials, or nothing at all for anonymous access.
pub struct BasicAuthClient<C>
where
	C: ?Sized + HttpClient,
{
	http_client: Arc<C>,
	credentials: Option<BasicCredentials>,
}
impl<C> BasicAuthClient<C>
where
	C: ?Sized + HttpClient,
{
	/// Creates a client over `http_client`; `None` sends requests anonymously.
	pub fn new(http_client: impl Into<Arc<C>>, credentials: Option<BasicCredentials>) -> Self {
		Self { http_client: http_client.into(), credentials }
	}

	/// Credentials attached to every request, if any.
	pub fn credentials(&self) -> Option<&BasicCredentials> {
		self.credentials.as_ref()
	}
}
impl<C> HttpClient for BasicAuthClient<C>
where
	C: ?Sized + HttpClient,
{
	fn send(&self, mut request: HttpRequest) -> HttpFuture<'_, HttpResponse> {
		match &self.credentials {
			Some(credentials) => request.set_header("Authorization", credentials.header_value()),
			None => request.headers.retain(|(name, _)| !name.eq_ignore_ascii_case("authorization")),
		}

		self.http_client.send(request)
	}
}
impl<C> Debug for BasicAuthClient<C>
where
	C: ?Sized + HttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("BasicAuthClient").field("credentials", &self.credentials).finish()
	}
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
///
/// The default client follows redirects; pass a client built with
/// `redirect::Policy::none()` to [`ReqwestHttpClient::with_client`] when the JIRA instance
/// sits behind a login proxy that should not be followed silently.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug, Default)]
pub struct ReqwestHttpClient(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestHttpClient {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestHttpClient {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl Deref for ReqwestHttpClient {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl HttpClient for ReqwestHttpClient {
	fn send(&self, request: HttpRequest) -> HttpFuture<'_, HttpResponse> {
		let client = self.0.clone();

		Box::pin(async move {
			let HttpRequest { method, url, headers, body } = request;
			let mut builder = match method {
				HttpMethod::Get => client.get(url),
				HttpMethod::Post => client.post(url),
			};

			for (name, value) in headers {
				builder = builder.header(name, value);
			}
			if let Some(body) = body {
				builder = builder.body(body);
			}

			let response = builder.send().await?;
			let status = response.status();
			let reason = status.canonical_reason().unwrap_or(UNKNOWN_REASON).to_owned();
			let body = response.bytes().await?.to_vec();

			Ok(HttpResponse { status: status.as_u16(), reason, body })
		})
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::sign::SignatureMethod;

	struct FixedSigner;
	impl RequestSigner for FixedSigner {
		fn method(&self) -> SignatureMethod {
			SignatureMethod::RsaSha1
		}

		fn sign(&self, _base_string: &[u8]) -> Result<Vec<u8>> {
			Ok(vec![0xde, 0xad])
		}
	}

	#[derive(Default)]
	struct CapturingClient(Mutex<Vec<HttpRequest>>);
	impl HttpClient for CapturingClient {
		fn send(&self, request: HttpRequest) -> HttpFuture<'_, HttpResponse> {
			self.0.lock().push(request);

			Box::pin(async {
				Ok(HttpResponse { status: 204, reason: "No Content".into(), body: Vec::new() })
			})
		}
	}

	fn url() -> Url {
		Url::parse("https://jira.example.com/rest/api/2/issue/JIRA-1")
			.expect("Issue URL fixture should parse.")
	}

	#[test]
	fn header_lookup_is_case_insensitive_and_replaceable() {
		let mut request =
			HttpRequest::new(HttpMethod::Get, url()).with_header("content-type", "text/plain");

		assert_eq!(request.header("Content-Type"), Some("text/plain"));

		request.set_header("Content-Type", "application/json");

		assert_eq!(request.headers.len(), 1);
		assert_eq!(request.header("CONTENT-TYPE"), Some("application/json"));
	}

	#[test]
	fn response_success_covers_2xx_only() {
		let ok = HttpResponse { status: 201, reason: "Created".into(), body: Vec::new() };
		let unauthorized = HttpResponse { status: 401, reason: "Unauthorized".into(), body: Vec::new() };

		assert!(ok.is_success());
		assert!(!unauthorized.is_success());
	}

	#[tokio::test]
	async fn signing_client_attaches_authorization_header() {
		let transport = Arc::new(CapturingClient::default());
		let client: SigningClient<CapturingClient> = SigningClient::new(
			transport.clone(),
			Arc::new(FixedSigner),
			"jira-consumer",
			Some(TokenPair::new("access", "secret")),
		);
		let response = client
			.send(HttpRequest::new(HttpMethod::Get, url()))
			.await
			.expect("Signed request should be dispatched.");
		let sent = transport.0.lock().pop().expect("Transport should have received the request.");
		let header = sent.header("authorization").expect("Authorization header should be set.");

		assert_eq!(response.status, 204);
		assert!(header.starts_with("OAuth oauth_consumer_key=\"jira-consumer\""));
		assert!(header.contains("oauth_token=\"access\""));
		assert!(header.contains("oauth_signature_method=\"RSA-SHA1\""));
		assert!(header.ends_with("oauth_signature=\"3q0%3D\""));
		assert!(!format!("{client:?}").contains("secret\""));
	}

	#[tokio::test]
	async fn basic_auth_client_sets_or_strips_the_header() {
		let transport = Arc::new(CapturingClient::default());
		let basic: BasicAuthClient<CapturingClient> =
			BasicAuthClient::new(transport.clone(), Some(BasicCredentials::new("jdoe", "hunter2")));
		let anonymous: BasicAuthClient<CapturingClient> =
			BasicAuthClient::new(transport.clone(), None);

		basic
			.send(HttpRequest::new(HttpMethod::Get, url()).with_header("authorization", "stale"))
			.await
			.expect("Basic request should be dispatched.");
		anonymous
			.send(HttpRequest::new(HttpMethod::Get, url()).with_header("Authorization", "stale"))
			.await
			.expect("Anonymous request should be dispatched.");

		let sent = transport.0.lock().drain(..).collect::<Vec<_>>();

		assert_eq!(sent[0].header("Authorization"), Some("Basic amRvZTpodW50ZXIy"));
		assert_eq!(sent[0].headers.len(), 1);
		assert_eq!(sent[1].header("Authorization"), None);
		assert!(!format!("{basic:?}").contains("hunter2"));
	}
}
