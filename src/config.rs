//! Validated client configuration for a JIRA instance.
//!
//! [`OAuthConfig`] describes an OAuth 1.0a application link; [`BasicConfig`] describes basic
//! or anonymous access. Both are immutable once built. Construct them with their builders or
//! load them from JSON; both paths share the same validation.

// std
use std::path::Path;
// self
use crate::{
	_prelude::*,
	auth::{BasicCredentials, TokenSecret},
	error::ConfigError,
	json,
	sign::SignatureMethod,
};

/// Default request-token endpoint, relative to the base URL.
pub const DEFAULT_REQUEST_TOKEN_PATH: &str = "plugins/servlet/oauth/request-token";
/// Default access-token endpoint, relative to the base URL.
pub const DEFAULT_ACCESS_TOKEN_PATH: &str = "plugins/servlet/oauth/access-token";
/// Default user authorization page; `%s` receives the request token.
pub const DEFAULT_AUTHORIZATION_PATH_TEMPLATE: &str =
	"plugins/servlet/oauth/authorize?oauth_token=%s";
/// Default REST API root, relative to the base URL.
pub const DEFAULT_REST_API_PATH: &str = "rest/api/2";

const TOKEN_PLACEHOLDER: &str = "%s";

/// Immutable consumer configuration owned by the agent.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OAuthConfig {
	base_url: Url,
	consumer_key: String,
	consumer_secret: TokenSecret,
	private_key: PathBuf,
	callback_url: Url,
	request_token_path: String,
	access_token_path: String,
	authorization_path_template: String,
	signature_method: SignatureMethod,
	rest_api_path: String,
}
impl OAuthConfig {
	/// Creates a builder seeded with the JIRA base URL and default endpoint paths.
	pub fn builder(base_url: impl Into<String>) -> OAuthConfigBuilder {
		OAuthConfigBuilder::new(base_url)
	}

	/// Parses and validates a JSON configuration document.
	pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
		Self::from_json_slice(json.as_bytes())
	}

	/// Parses and validates a JSON configuration document from raw bytes.
	pub fn from_json_slice(json: &[u8]) -> Result<Self, ConfigError> {
		parse_document::<RawConfig>(json)?.into_builder().build()
	}

	/// JIRA base URL, always ending with `/`.
	pub fn base_url(&self) -> &Url {
		&self.base_url
	}

	/// Consumer key registered in the JIRA application link.
	pub fn consumer_key(&self) -> &str {
		&self.consumer_key
	}

	/// Consumer secret (unused by RSA-SHA1 but carried for completeness).
	pub fn consumer_secret(&self) -> &TokenSecret {
		&self.consumer_secret
	}

	/// Location of the PEM private key matching the link's public key.
	pub fn private_key(&self) -> &Path {
		&self.private_key
	}

	/// URL JIRA redirects the user to after authorization.
	pub fn callback_url(&self) -> &Url {
		&self.callback_url
	}

	/// Signature method advertised in every request.
	pub fn signature_method(&self) -> SignatureMethod {
		self.signature_method
	}

	/// Authorization page template containing a single `%s`.
	pub fn authorization_path_template(&self) -> &str {
		&self.authorization_path_template
	}

	/// Absolute request-token endpoint.
	pub fn request_token_url(&self) -> Result<Url, ConfigError> {
		self.join("request_token_path", &self.request_token_path)
	}

	/// Absolute access-token endpoint.
	pub fn access_token_url(&self) -> Result<Url, ConfigError> {
		self.join("access_token_path", &self.access_token_path)
	}

	/// Absolute REST API root, always ending with `/`.
	pub fn api_base(&self) -> Result<Url, ConfigError> {
		api_base(&self.base_url, &self.rest_api_path)
	}

	/// Builds the user authorization URL for `request_token`.
	///
	/// The token is percent-encoded before substitution so the result is always a valid
	/// query value.
	pub fn authorization_url(&self, request_token: &str) -> Result<Url, ConfigError> {
		let path = self
			.authorization_path_template
			.replacen(TOKEN_PLACEHOLDER, &crate::oauth::percent_encode(request_token), 1);

		self.join("authorization_path_template", &path)
	}

	fn join(&self, field: &'static str, path: &str) -> Result<Url, ConfigError> {
		join_base(&self.base_url, field, path)
	}
}

/// Builder for [`OAuthConfig`] values.
#[derive(Clone, Debug)]
pub struct OAuthConfigBuilder {
	base_url: String,
	consumer_key: String,
	consumer_secret: String,
	private_key: PathBuf,
	callback_url: String,
	request_token_path: String,
	access_token_path: String,
	authorization_path_template: String,
	signature_method: String,
	rest_api_path: String,
}
impl OAuthConfigBuilder {
	/// Creates a builder for the JIRA instance at `base_url`.
	pub fn new(base_url: impl Into<String>) -> Self {
		Self {
			base_url: base_url.into(),
			consumer_key: String::new(),
			consumer_secret: String::new(),
			private_key: PathBuf::new(),
			callback_url: String::new(),
			request_token_path: DEFAULT_REQUEST_TOKEN_PATH.into(),
			access_token_path: DEFAULT_ACCESS_TOKEN_PATH.into(),
			authorization_path_template: DEFAULT_AUTHORIZATION_PATH_TEMPLATE.into(),
			signature_method: SignatureMethod::RsaSha1.as_str().into(),
			rest_api_path: DEFAULT_REST_API_PATH.into(),
		}
	}

	/// Sets the consumer key.
	pub fn consumer_key(mut self, consumer_key: impl Into<String>) -> Self {
		self.consumer_key = consumer_key.into();

		self
	}

	/// Sets the consumer secret.
	pub fn consumer_secret(mut self, consumer_secret: impl Into<String>) -> Self {
		self.consumer_secret = consumer_secret.into();

		self
	}

	/// Sets the PEM private key location.
	pub fn private_key(mut self, path: impl Into<PathBuf>) -> Self {
		self.private_key = path.into();

		self
	}

	/// Sets the OAuth callback URL.
	pub fn callback_url(mut self, url: impl Into<String>) -> Self {
		self.callback_url = url.into();

		self
	}

	/// Overrides the request-token endpoint path.
	pub fn request_token_path(mut self, path: impl Into<String>) -> Self {
		self.request_token_path = path.into();

		self
	}

	/// Overrides the access-token endpoint path.
	pub fn access_token_path(mut self, path: impl Into<String>) -> Self {
		self.access_token_path = path.into();

		self
	}

	/// Overrides the authorization page template.
	pub fn authorization_path_template(mut self, template: impl Into<String>) -> Self {
		self.authorization_path_template = template.into();

		self
	}

	/// Overrides the signature method label.
	pub fn signature_method(mut self, method: impl Into<String>) -> Self {
		self.signature_method = method.into();

		self
	}

	/// Overrides the REST API root.
	pub fn rest_api_path(mut self, path: impl Into<String>) -> Self {
		self.rest_api_path = path.into();

		self
	}

	/// Consumes the builder and validates the resulting configuration.
	pub fn build(self) -> Result<OAuthConfig, ConfigError> {
		let base_url = parse_base_url(&self.base_url)?;
		let callback_url = parse_http_url("callback_url", &self.callback_url)?;

		if self.consumer_key.trim().is_empty() {
			return Err(ConfigError::MissingField { field: "consumer_key" });
		}
		if self.private_key.as_os_str().is_empty() {
			return Err(ConfigError::MissingField { field: "private_key" });
		}
		if self.authorization_path_template.matches(TOKEN_PLACEHOLDER).count() != 1 {
			return Err(ConfigError::InvalidAuthorizationTemplate {
				template: self.authorization_path_template,
			});
		}

		let signature_method = self.signature_method.parse()?;

		Ok(OAuthConfig {
			base_url,
			consumer_key: self.consumer_key,
			consumer_secret: TokenSecret::new(self.consumer_secret),
			private_key: self.private_key,
			callback_url,
			request_token_path: self.request_token_path,
			access_token_path: self.access_token_path,
			authorization_path_template: self.authorization_path_template,
			signature_method,
			rest_api_path: self.rest_api_path,
		})
	}
}

/// Configuration for basic-auth or anonymous REST access.
///
/// Basic authentication is used only when both `user_id` and `password` are non-empty;
/// otherwise requests are sent anonymously.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BasicConfig {
	base_url: Url,
	credentials: Option<BasicCredentials>,
	rest_api_path: String,
}
impl BasicConfig {
	/// Creates a builder seeded with the JIRA base URL.
	pub fn builder(base_url: impl Into<String>) -> BasicConfigBuilder {
		BasicConfigBuilder::new(base_url)
	}

	/// Parses and validates a JSON configuration document.
	pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
		Self::from_json_slice(json.as_bytes())
	}

	/// Parses and validates a JSON configuration document from raw bytes.
	pub fn from_json_slice(json: &[u8]) -> Result<Self, ConfigError> {
		let raw = parse_document::<RawBasicConfig>(json)?;

		BasicConfigBuilder::new(raw.base_url)
			.user_id(raw.user_id)
			.password(raw.password)
			.rest_api_path(raw.rest_api_path)
			.build()
	}

	/// JIRA base URL, always ending with `/`.
	pub fn base_url(&self) -> &Url {
		&self.base_url
	}

	/// Basic credentials; `None` means anonymous access.
	pub fn credentials(&self) -> Option<&BasicCredentials> {
		self.credentials.as_ref()
	}

	/// Absolute REST API root, always ending with `/`.
	pub fn api_base(&self) -> Result<Url, ConfigError> {
		api_base(&self.base_url, &self.rest_api_path)
	}
}

/// Builder for [`BasicConfig`] values.
#[derive(Clone, Debug)]
pub struct BasicConfigBuilder {
	base_url: String,
	user_id: String,
	password: TokenSecret,
	rest_api_path: String,
}
impl BasicConfigBuilder {
	/// Creates a builder for the JIRA instance at `base_url`.
	pub fn new(base_url: impl Into<String>) -> Self {
		Self {
			base_url: base_url.into(),
			user_id: String::new(),
			password: TokenSecret::new(""),
			rest_api_path: DEFAULT_REST_API_PATH.into(),
		}
	}

	/// Sets the JIRA user name.
	pub fn user_id(mut self, user_id: impl Into<String>) -> Self {
		self.user_id = user_id.into();

		self
	}

	/// Sets the JIRA password.
	pub fn password(mut self, password: impl Into<String>) -> Self {
		self.password = TokenSecret::new(password);

		self
	}

	/// Overrides the REST API root.
	pub fn rest_api_path(mut self, path: impl Into<String>) -> Self {
		self.rest_api_path = path.into();

		self
	}

	/// Consumes the builder and validates the resulting configuration.
	pub fn build(self) -> Result<BasicConfig, ConfigError> {
		let base_url = parse_base_url(&self.base_url)?;
		let credentials = (!self.user_id.is_empty() && !self.password.expose().is_empty())
			.then(|| BasicCredentials::new(self.user_id, self.password.expose()));

		Ok(BasicConfig { base_url, credentials, rest_api_path: self.rest_api_path })
	}
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawBasicConfig {
	base_url: String,
	#[serde(default)]
	user_id: String,
	#[serde(default)]
	password: String,
	#[serde(default = "default_rest_api_path")]
	rest_api_path: String,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
	base_url: String,
	consumer_key: String,
	#[serde(default)]
	consumer_secret: String,
	private_key: PathBuf,
	callback_url: String,
	#[serde(default = "default_request_token_path")]
	request_token_path: String,
	#[serde(default = "default_access_token_path")]
	access_token_path: String,
	#[serde(default = "default_authorization_path_template")]
	authorization_path_template: String,
	#[serde(default = "default_signature_method")]
	signature_method: String,
	#[serde(default = "default_rest_api_path")]
	rest_api_path: String,
}
impl RawConfig {
	fn into_builder(self) -> OAuthConfigBuilder {
		OAuthConfigBuilder::new(self.base_url)
			.consumer_key(self.consumer_key)
			.consumer_secret(self.consumer_secret)
			.private_key(self.private_key)
			.callback_url(self.callback_url)
			.request_token_path(self.request_token_path)
			.access_token_path(self.access_token_path)
			.authorization_path_template(self.authorization_path_template)
			.signature_method(self.signature_method)
			.rest_api_path(self.rest_api_path)
	}
}

fn default_request_token_path() -> String {
	DEFAULT_REQUEST_TOKEN_PATH.into()
}

fn default_access_token_path() -> String {
	DEFAULT_ACCESS_TOKEN_PATH.into()
}

fn default_authorization_path_template() -> String {
	DEFAULT_AUTHORIZATION_PATH_TEMPLATE.into()
}

fn default_signature_method() -> String {
	SignatureMethod::RsaSha1.as_str().into()
}

fn default_rest_api_path() -> String {
	DEFAULT_REST_API_PATH.into()
}

fn parse_document<'de, T>(json: &'de [u8]) -> Result<T, ConfigError>
where
	T: Deserialize<'de>,
{
	json::from_slice(json).map_err(|e| ConfigError::Parse { path: e.path, source: e.source })
}

fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
	let mut base_url = parse_http_url("base_url", raw)?;

	if !base_url.path().ends_with('/') {
		let path = format!("{}/", base_url.path());

		base_url.set_path(&path);
	}

	Ok(base_url)
}

fn api_base(base_url: &Url, rest_api_path: &str) -> Result<Url, ConfigError> {
	let mut path = rest_api_path.trim_matches('/').to_owned();

	path.push('/');

	join_base(base_url, "rest_api_path", &path)
}

fn join_base(base_url: &Url, field: &'static str, path: &str) -> Result<Url, ConfigError> {
	base_url
		.join(path.trim_start_matches('/'))
		.map_err(|source| ConfigError::InvalidUrl { field, source })
}

fn parse_http_url(field: &'static str, raw: &str) -> Result<Url, ConfigError> {
	if raw.trim().is_empty() {
		return Err(ConfigError::MissingField { field });
	}

	let url = Url::parse(raw).map_err(|source| ConfigError::InvalidUrl { field, source })?;

	match url.scheme() {
		"http" | "https" => Ok(url),
		_ => Err(ConfigError::UnsupportedScheme { field, url: raw.to_owned() }),
	}
}
