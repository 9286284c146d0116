//! OAuth 1.0a protocol primitives (RFC 5849).
//!
//! Covers the pieces a transport needs to sign a request: RFC 3986 percent-encoding,
//! protocol parameter generation, the signature base string, the `Authorization` header,
//! and parsing of the form-encoded credential responses returned by the token endpoints.

// crates.io
use base64::{Engine as _, engine::general_purpose::STANDARD};
use rand::{Rng, distr::Alphanumeric};
use url::form_urlencoded;
// self
use crate::{
	_prelude::*,
	auth::TokenPair,
	error::ProtocolError,
	http::HttpRequest,
	sign::{RequestSigner, SignatureMethod},
};

/// Value advertised in `oauth_version`.
pub const OAUTH_VERSION: &str = "1.0";

const NONCE_LEN: usize = 32;
const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Percent-encodes `value`, leaving only ALPHA / DIGIT / `-` / `.` / `_` / `~` intact.
pub fn percent_encode(value: &str) -> String {
	urlencoding::encode(value).into_owned()
}

/// Per-request OAuth protocol parameters (everything except `oauth_signature`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProtocolParams {
	/// `oauth_consumer_key`.
	pub consumer_key: String,
	/// `oauth_token`; omitted for unauthenticated (temp credential) requests.
	pub token: Option<String>,
	/// `oauth_signature_method`.
	pub signature_method: SignatureMethod,
	/// `oauth_timestamp`, in Unix seconds.
	pub timestamp: i64,
	/// `oauth_nonce`.
	pub nonce: String,
}
impl ProtocolParams {
	/// Builds parameters stamped with the current clock and a fresh random nonce.
	pub fn generate(
		consumer_key: impl Into<String>,
		token: Option<&TokenPair>,
		signature_method: SignatureMethod,
	) -> Self {
		Self {
			consumer_key: consumer_key.into(),
			token: token.map(|pair| pair.token.clone()),
			signature_method,
			timestamp: OffsetDateTime::now_utc().unix_timestamp(),
			nonce: random_nonce(),
		}
	}

	/// Returns the `oauth_*` pairs in lexicographic order.
	pub fn pairs(&self) -> Vec<(&'static str, String)> {
		let mut pairs = vec![
			("oauth_consumer_key", self.consumer_key.clone()),
			("oauth_nonce", self.nonce.clone()),
			("oauth_signature_method", self.signature_method.as_str().to_owned()),
			("oauth_timestamp", self.timestamp.to_string()),
		];

		if let Some(token) = &self.token {
			pairs.push(("oauth_token", token.clone()));
		}

		pairs.push(("oauth_version", OAUTH_VERSION.to_owned()));

		pairs
	}
}

/// Builds the signature base string for `method` + `url`.
///
/// Query parameters are read from `url`; `params` carries the remaining inputs (protocol
/// parameters and form-body parameters). The base URI drops query and fragment, and `Url`
/// already lower-cases scheme/host and strips default ports.
pub fn signature_base_string<'a, I>(method: &str, url: &Url, params: I) -> String
where
	I: IntoIterator<Item = (&'a str, &'a str)>,
{
	let mut base_uri = format!("{}://{}", url.scheme(), url.host_str().unwrap_or_default());

	if let Some(port) = url.port() {
		base_uri.push_str(&format!(":{port}"));
	}

	base_uri.push_str(url.path());

	let mut encoded: Vec<(String, String)> = url
		.query_pairs()
		.map(|(key, value)| (percent_encode(&key), percent_encode(&value)))
		.chain(params.into_iter().map(|(key, value)| (percent_encode(key), percent_encode(value))))
		.collect();

	encoded.sort();

	let normalized =
		encoded.iter().map(|(key, value)| format!("{key}={value}")).collect::<Vec<_>>().join("&");

	format!(
		"{}&{}&{}",
		method.to_ascii_uppercase(),
		percent_encode(&base_uri),
		percent_encode(&normalized)
	)
}

/// Renders the `Authorization` header value for `params` + raw `signature` bytes.
pub fn authorization_header(params: &ProtocolParams, signature: &[u8]) -> String {
	let signature = STANDARD.encode(signature);
	let fields = params
		.pairs()
		.into_iter()
		.map(|(key, value)| format!("{key}=\"{}\"", percent_encode(&value)))
		.chain([format!("oauth_signature=\"{}\"", percent_encode(&signature))])
		.collect::<Vec<_>>()
		.join(", ");

	format!("OAuth {fields}")
}

/// Computes the `Authorization` header value for `request`.
///
/// Form-encoded bodies contribute their parameters to the base string; other bodies do not.
pub fn authorize(
	request: &HttpRequest,
	params: &ProtocolParams,
	signer: &dyn RequestSigner,
) -> Result<String> {
	let body_params: Vec<(String, String)> = match (&request.body, request.header("content-type")) {
		(Some(body), Some(content_type))
			if content_type.to_ascii_lowercase().starts_with(FORM_CONTENT_TYPE) =>
			form_urlencoded::parse(body).into_owned().collect(),
		_ => Vec::new(),
	};
	let protocol_pairs = params.pairs();
	let base_string = signature_base_string(
		request.method.as_str(),
		&request.url,
		protocol_pairs
			.iter()
			.map(|(key, value)| (*key, value.as_str()))
			.chain(body_params.iter().map(|(key, value)| (key.as_str(), value.as_str()))),
	);
	let signature = signer.sign(base_string.as_bytes())?;

	Ok(authorization_header(params, &signature))
}

/// Parses a form-encoded credential response into a [`TokenPair`].
///
/// `stage` names the handshake leg for error messages (e.g. `"temp credentials"`).
pub fn parse_credentials(stage: &'static str, body: &[u8]) -> Result<TokenPair, ProtocolError> {
	let fields: HashMap<String, String> = form_urlencoded::parse(body).into_owned().collect();

	if fields.is_empty() {
		return Err(ProtocolError::EmptyCredentials { stage });
	}
	if let Some(problem) = fields.get("oauth_problem") {
		return Err(ProtocolError::ProviderProblem { stage, problem: problem.clone() });
	}

	let token = fields
		.get("oauth_token")
		.filter(|value| !value.is_empty())
		.ok_or(ProtocolError::MissingField { stage, field: "oauth_token" })?;
	let token_secret = fields
		.get("oauth_token_secret")
		.ok_or(ProtocolError::MissingField { stage, field: "oauth_token_secret" })?;

	Ok(TokenPair::new(token.as_str(), token_secret.as_str()))
}

fn random_nonce() -> String {
	rand::rng().sample_iter(Alphanumeric).take(NONCE_LEN).map(char::from).collect()
}
