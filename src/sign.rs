//! RSA-SHA1 signing of OAuth signature base strings.
//!
//! [`sign`] is a pure function of its inputs: the key is re-read from disk on every call and
//! no handle is retained. Neither the signed bytes nor the key contents ever reach logs or
//! error messages; errors only name the key path.

// std
use std::{fs, io::ErrorKind, path::Path};
// crates.io
use rsa::{Pkcs1v15Sign, RsaPrivateKey, pkcs1::DecodeRsaPrivateKey, pkcs8::DecodePrivateKey};
use sha1::{Digest, Sha1};
// self
use crate::{
	_prelude::*,
	error::{ConfigError, CryptoError},
};

/// OAuth 1.0a signature methods understood by the crate.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SignatureMethod {
	#[default]
	/// RSASSA-PKCS1-v1_5 over SHA-1, the only method JIRA application links accept.
	#[serde(rename = "RSA-SHA1")]
	RsaSha1,
}
impl SignatureMethod {
	/// Returns the `oauth_signature_method` wire label.
	pub const fn as_str(self) -> &'static str {
		match self {
			SignatureMethod::RsaSha1 => "RSA-SHA1",
		}
	}
}
impl Display for SignatureMethod {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
impl FromStr for SignatureMethod {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		if s.eq_ignore_ascii_case("RSA-SHA1") {
			Ok(SignatureMethod::RsaSha1)
		} else {
			Err(ConfigError::UnsupportedSignatureMethod { method: s.to_owned() })
		}
	}
}

/// Signature callback applied to every outgoing OAuth request.
pub trait RequestSigner
where
	Self: Send + Sync,
{
	/// Method advertised in `oauth_signature_method`.
	fn method(&self) -> SignatureMethod;

	/// Signs the signature base string, returning raw signature bytes.
	fn sign(&self, base_string: &[u8]) -> Result<Vec<u8>>;
}

/// [`RequestSigner`] reading an RSA private key from disk for each signature.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RsaSha1Signer {
	private_key_path: PathBuf,
}
impl RsaSha1Signer {
	/// Creates a signer bound to the PEM key at `private_key_path`.
	pub fn new(private_key_path: impl Into<PathBuf>) -> Self {
		Self { private_key_path: private_key_path.into() }
	}

	/// Configured key location.
	pub fn private_key_path(&self) -> &Path {
		&self.private_key_path
	}
}
impl RequestSigner for RsaSha1Signer {
	fn method(&self) -> SignatureMethod {
		SignatureMethod::RsaSha1
	}

	fn sign(&self, base_string: &[u8]) -> Result<Vec<u8>> {
		sign(base_string, &self.private_key_path)
	}
}

/// Computes the RSA-SHA1 signature of `string_to_sign` with the PEM key at
/// `private_key_path`.
///
/// Accepts PKCS#8 (`BEGIN PRIVATE KEY`) and PKCS#1 (`BEGIN RSA PRIVATE KEY`) encodings.
/// PKCS#1 v1.5 padding is deterministic, so identical inputs yield identical bytes.
pub fn sign(string_to_sign: &[u8], private_key_path: &Path) -> Result<Vec<u8>> {
	let key = load_private_key(private_key_path)?;
	let digest = Sha1::digest(string_to_sign);

	key.sign(Pkcs1v15Sign::new::<Sha1>(), &digest)
		.map_err(|source| CryptoError::Signing { source }.into())
}

fn load_private_key(path: &Path) -> Result<RsaPrivateKey, ConfigError> {
	let pem = fs::read_to_string(path).map_err(|source| match source.kind() {
		ErrorKind::NotFound => ConfigError::PrivateKeyNotFound { path: path.to_owned() },
		_ => ConfigError::PrivateKeyUnreadable { path: path.to_owned(), source },
	})?;

	RsaPrivateKey::from_pkcs8_pem(&pem)
		.or_else(|_| RsaPrivateKey::from_pkcs1_pem(&pem))
		.map_err(|_| ConfigError::InvalidPrivateKey { path: path.to_owned() })
}
