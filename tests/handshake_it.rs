// crates.io
use httpmock::prelude::*;
// self
use jira_oauth::{
	_preludet::*,
	agent::{OAuthAgent, ReqwestAgent},
	auth::{Authorization, AuthorizationState, TokenPair, TokenSlot},
	error::ProtocolError,
	store::CredentialStore,
};

const REQUEST_TOKEN_PATH: &str = "/plugins/servlet/oauth/request-token";
const ACCESS_TOKEN_PATH: &str = "/plugins/servlet/oauth/access-token";
const CALLBACK: &str = "https://app.example.com/jira/callback";

fn agent(server: &MockServer) -> ReqwestAgent {
	OAuthAgent::with_http_client(test_config(&server.base_url()), test_reqwest_http_client())
}

#[tokio::test]
async fn temp_credentials_are_parsed_from_form_body() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path(REQUEST_TOKEN_PATH)
				.query_param("oauth_callback", CALLBACK)
				.header_exists("authorization");
			then.status(200).body("oauth_token=abc&oauth_token_secret=xyz");
		})
		.await;
	let pair = agent(&server)
		.request_temp_credentials()
		.await
		.expect("Temp credentials request should succeed against the stub.");

	assert_eq!(pair, TokenPair::new("abc", "xyz"));

	mock.assert_async().await;
}

#[tokio::test]
async fn empty_and_partial_credentials_are_protocol_errors() {
	let server = MockServer::start_async().await;
	let mut empty = server
		.mock_async(|when, then| {
			when.method(POST).path(REQUEST_TOKEN_PATH);
			then.status(200).body("");
		})
		.await;
	let agent = agent(&server);
	let err = agent.request_temp_credentials().await.expect_err("Empty body should fail.");

	assert!(matches!(err, Error::Protocol(ProtocolError::EmptyCredentials { .. })));
	assert!(err.to_string().contains("temp credentials request failed"));

	empty.delete_async().await;

	server
		.mock_async(|when, then| {
			when.method(POST).path(REQUEST_TOKEN_PATH);
			then.status(200).body("oauth_token=abc");
		})
		.await;

	let err = agent.request_temp_credentials().await.expect_err("Partial body should fail.");

	assert!(matches!(
		err,
		Error::Protocol(ProtocolError::MissingField { field: "oauth_token_secret", .. })
	));
}

#[tokio::test]
async fn empty_store_starts_the_handshake_without_calling_the_api() {
	let server = MockServer::start_async().await;
	let temp = server
		.mock_async(|when, then| {
			when.method(POST).path(REQUEST_TOKEN_PATH);
			then.status(200).body("oauth_token=abc&oauth_token_secret=xyz");
		})
		.await;
	let issue = server
		.mock_async(|when, then| {
			when.method(GET).path("/rest/api/2/issue/JIRA-1");
			then.status(200).body("{}");
		})
		.await;
	let (client, store) = build_reqwest_test_client(&server.base_url());
	let outcome = client.get_issue("JIRA-1").await.expect("Handshake start should succeed.");
	let expected = format!("{}/plugins/servlet/oauth/authorize?oauth_token=abc", server.base_url());

	assert_eq!(outcome.redirect_url().map(Url::as_str), Some(expected.as_str()));
	assert_eq!(
		store
			.get(TokenSlot::RequestToken)
			.await
			.expect("Store read should succeed.")
			.expect("Request token should be stored."),
		TokenPair::new("abc", "xyz")
	);
	assert_eq!(
		client.state().await.expect("State should be readable."),
		AuthorizationState::HaveRequestToken
	);

	temp.assert_calls_async(1).await;
	issue.assert_calls_async(0).await;
}

#[tokio::test]
async fn verifier_exchange_replaces_request_token_with_access_token() {
	let server = MockServer::start_async().await;
	let access = server
		.mock_async(|when, then| {
			when.method(POST)
				.path(ACCESS_TOKEN_PATH)
				.query_param("oauth_verifier", "v1")
				.header_exists("authorization");
			then.status(200).body("oauth_token=acc&oauth_token_secret=sec");
		})
		.await;
	let (client, store) = build_reqwest_test_client(&server.base_url());

	store
		.set(TokenSlot::RequestToken, TokenPair::new("abc", "xyz"))
		.await
		.expect("Seeding the request token should succeed.");
	client
		.accept_callback(
			&Url::parse(&format!("{CALLBACK}?oauth_token=abc&oauth_verifier=v1"))
				.expect("Callback URL should parse."),
		)
		.expect("Callback should carry a verifier.");

	let token = client.ensure_token().await.expect("Verifier exchange should succeed.");

	assert_eq!(token, Authorization::Authorized(TokenPair::new("acc", "sec")));
	assert_eq!(
		store
			.get(TokenSlot::AccessToken)
			.await
			.expect("Store read should succeed.")
			.expect("Access token should be stored."),
		TokenPair::new("acc", "sec")
	);
	assert!(
		store
			.get(TokenSlot::RequestToken)
			.await
			.expect("Store read should succeed.")
			.is_none()
	);
	assert_eq!(client.agent().last_access_token(), Some(TokenPair::new("acc", "sec")));

	// The verifier is single-use; the stored access token is now served without I/O.
	client.ensure_token().await.expect("Stored access token should be returned.");

	access.assert_calls_async(1).await;
}

#[tokio::test]
async fn rejected_exchange_leaves_the_store_untouched() {
	let server = MockServer::start_async().await;

	server
		.mock_async(|when, then| {
			when.method(POST).path(ACCESS_TOKEN_PATH);
			then.status(401).body("oauth_problem=token_rejected");
		})
		.await;

	let (client, store) = build_reqwest_test_client(&server.base_url());

	store
		.set(TokenSlot::RequestToken, TokenPair::new("abc", "xyz"))
		.await
		.expect("Seeding the request token should succeed.");

	let err = client
		.with_verifier("v1")
		.ensure_token()
		.await
		.expect_err("Rejected exchange should fail.");

	assert!(matches!(
		err,
		Error::Protocol(ProtocolError::ProviderProblem { ref problem, .. }) if problem == "token_rejected"
	));
	assert_eq!(store.len(), 1);
	assert!(
		store
			.get(TokenSlot::AccessToken)
			.await
			.expect("Store read should succeed.")
			.is_none()
	);
}
