//! JIRA REST request building and response decoding shared by the clients.

// crates.io
use serde_json::Value;
// self
use crate::{
	_prelude::*,
	error::{ConfigError, ProtocolError},
	http::{HttpMethod, HttpRequest, HttpResponse},
	json,
};

const JSON_CONTENT_TYPE: &str = "application/json";

/// Returns `{api_base}issue/{issue_id}` with the id percent-encoded as one path segment.
pub(crate) fn issue_url(api_base: &Url, issue_id: &str) -> Result<Url> {
	if issue_id.is_empty() {
		return Err(Error::invalid_argument("issue id must not be empty"));
	}

	let mut url = api_base.clone();

	url.path_segments_mut()
		.map_err(|_| ConfigError::CannotBeABase { url: api_base.to_string() })?
		.pop_if_empty()
		.push("issue")
		.push(issue_id);

	Ok(url)
}

/// Returns the issue creation endpoint `{api_base}issue/`.
pub(crate) fn create_issue_url(api_base: &Url) -> Result<Url> {
	Ok(api_base
		.join("issue/")
		.map_err(|source| ConfigError::InvalidUrl { field: "rest_api_path", source })?)
}

/// Builds a JSON request; `payload` is only sent with POST.
pub(crate) fn json_request(method: HttpMethod, url: Url, payload: Option<&Value>) -> HttpRequest {
	let request = HttpRequest::new(method, url)
		.with_header("Content-Type", JSON_CONTENT_TYPE)
		.with_header("Accept", JSON_CONTENT_TYPE);

	match (method, payload) {
		(HttpMethod::Post, Some(payload)) => request.with_body(payload.to_string()),
		_ => request,
	}
}

/// Decodes a successful response body; an empty body decodes to [`Value::Null`].
pub(crate) fn decode_json(response: &HttpResponse) -> Result<Value> {
	if response.body.iter().all(u8::is_ascii_whitespace) {
		return Ok(Value::Null);
	}

	json::from_slice(&response.body).map_err(|e| {
		ProtocolError::ResponseParse { path: e.path, source: e.source, status: response.status }
			.into()
	})
}
