//! Strict JSON decoding shared by configuration loading and REST responses.

// self
use crate::_prelude::*;

/// Decoding failure with the path of the offending value.
#[derive(Debug)]
pub(crate) struct JsonError {
	pub(crate) path: String,
	pub(crate) source: serde_json::Error,
}

/// Decodes exactly one JSON document from `bytes`; trailing non-whitespace is an error.
pub(crate) fn from_slice<'de, T>(bytes: &'de [u8]) -> Result<T, JsonError>
where
	T: Deserialize<'de>,
{
	let mut de = serde_json::Deserializer::from_slice(bytes);
	let value = serde_path_to_error::deserialize(&mut de)
		.map_err(|e| JsonError { path: e.path().to_string(), source: e.into_inner() })?;

	de.end().map_err(|source| JsonError { path: ".".into(), source })?;

	Ok(value)
}

#[cfg(test)]
mod tests {
	// crates.io
	use serde_json::Value;
	// self
	use super::*;

	#[test]
	fn nested_errors_report_their_path() {
		#[derive(Debug, Deserialize)]
		struct Issue {
			#[allow(dead_code)]
			key: String,
		}

		let err = from_slice::<Issue>(br#"{"key": 7}"#).expect_err("Numeric key should fail.");

		assert_eq!(err.path, "key");
	}

	#[test]
	fn trailing_data_is_rejected() {
		let err = from_slice::<Value>(br#"{"key":1}garbage"#)
			.expect_err("Trailing characters should fail.");

		assert_eq!(err.path, ".");
		assert!(from_slice::<Value>(b"{\"key\":1}\n  ").is_ok());
	}
}
