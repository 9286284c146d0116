//! Crate-level error types shared by the signer, agent, client, and stores.

// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Credential store failure.
	#[error("{0}")]
	Storage(
		#[from]
		#[source]
		crate::store::StoreError,
	),
	/// Local configuration problem, including private key loading.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Signing operation failed.
	#[error(transparent)]
	Crypto(#[from] CryptoError),
	/// Provider returned a malformed or empty response.
	#[error(transparent)]
	Protocol(#[from] ProtocolError),
	/// Transport failure (DNS, TCP, TLS).
	#[error(transparent)]
	Transport(#[from] TransportError),

	/// Caller supplied an unusable argument (missing verifier, missing URL).
	#[error("Invalid argument: {reason}.")]
	InvalidArgument {
		/// Human-readable description of the rejected argument.
		reason: String,
	},
	/// Provider answered 401 and automatic re-authorization is disabled.
	#[error("Your user session has expired.")]
	SessionExpired,
	/// Provider answered 401 to a basic-auth or anonymous call.
	#[error("Access allowed only for registered users.")]
	AccessDenied,
	/// Provider answered with a non-success status other than 401.
	#[error("Bad request (HTTP {status}). Response reason: {reason}.")]
	Request {
		/// HTTP status code.
		status: u16,
		/// Reason phrase reported alongside the status.
		reason: String,
	},
}
impl Error {
	pub(crate) fn invalid_argument(reason: impl Into<String>) -> Self {
		Self::InvalidArgument { reason: reason.into() }
	}
}

/// Configuration and validation failures.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// A required option was empty.
	#[error("Configuration option `{field}` is required.")]
	MissingField {
		/// Option name.
		field: &'static str,
	},
	/// A URL option could not be parsed.
	#[error("Configuration option `{field}` is not a valid URL.")]
	InvalidUrl {
		/// Option name.
		field: &'static str,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// A URL option uses a scheme other than http/https.
	#[error("Configuration option `{field}` must use http or https: {url}.")]
	UnsupportedScheme {
		/// Option name.
		field: &'static str,
		/// Offending URL.
		url: String,
	},
	/// Authorization path template does not contain exactly one `%s`.
	#[error("Authorization path template must contain exactly one `%s`: {template}.")]
	InvalidAuthorizationTemplate {
		/// Offending template.
		template: String,
	},
	/// Signature method other than RSA-SHA1.
	#[error("Signature method `{method}` is not supported.")]
	UnsupportedSignatureMethod {
		/// Requested method label.
		method: String,
	},
	/// Configuration document could not be parsed.
	#[error("Configuration could not be parsed at `{path}`.")]
	Parse {
		/// Path of the offending value; `.` for the document root.
		path: String,
		/// Underlying JSON failure.
		#[source]
		source: serde_json::Error,
	},
	/// Private key file does not exist.
	#[error("Private key {} does not exist.", path.display())]
	PrivateKeyNotFound {
		/// Configured key path.
		path: PathBuf,
	},
	/// Private key file exists but could not be read.
	#[error("Private key {} could not be read.", path.display())]
	PrivateKeyUnreadable {
		/// Configured key path.
		path: PathBuf,
		/// Underlying IO failure.
		#[source]
		source: std::io::Error,
	},
	/// Private key file is not a PKCS#1 or PKCS#8 RSA key in PEM form.
	#[error("Private key {} is not a valid RSA PEM key.", path.display())]
	InvalidPrivateKey {
		/// Configured key path.
		path: PathBuf,
	},
	/// A URL could not be extended with path segments.
	#[error("URL `{url}` cannot be used as a base.")]
	CannotBeABase {
		/// Offending URL.
		url: String,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Signing failures raised by the RSA backend.
#[derive(Debug, ThisError)]
pub enum CryptoError {
	/// RSA-SHA1 signature could not be produced.
	#[error("RSA-SHA1 signing failed.")]
	Signing {
		/// Underlying RSA failure.
		#[source]
		source: rsa::Error,
	},
}

/// Malformed or rejected provider responses.
#[derive(Debug, ThisError)]
pub enum ProtocolError {
	/// Credential exchange returned no parameters.
	#[error("The {stage} request failed: provider returned no credentials.")]
	EmptyCredentials {
		/// Handshake stage label.
		stage: &'static str,
	},
	/// Credential exchange omitted a mandatory parameter.
	#[error("The {stage} request failed: response is missing `{field}`.")]
	MissingField {
		/// Handshake stage label.
		stage: &'static str,
		/// Missing parameter name.
		field: &'static str,
	},
	/// Provider reported an `oauth_problem`.
	#[error("The {stage} request failed: provider reported `{problem}`.")]
	ProviderProblem {
		/// Handshake stage label.
		stage: &'static str,
		/// Value of `oauth_problem`.
		problem: String,
	},
	/// API response body is not valid JSON.
	#[error("API returned malformed JSON at `{path}`.")]
	ResponseParse {
		/// Path of the offending value; `.` for the document root.
		path: String,
		/// Underlying JSON failure.
		#[source]
		source: serde_json::Error,
		/// HTTP status code of the response.
		status: u16,
	},
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the provider.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the provider.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}
