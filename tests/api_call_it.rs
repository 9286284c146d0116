// crates.io
use httpmock::prelude::*;
use serde_json::{Map, Value, json};
// self
use jira_oauth::{
	_preludet::*,
	auth::{Authorization, AuthorizationState, TokenPair, TokenSlot},
	error::ProtocolError,
	http::HttpMethod,
	store::{CredentialStore, MemoryStore},
};

const ISSUE_PATH: &str = "/rest/api/2/issue/JIRA-1";

async fn seed_access_token(store: &MemoryStore) {
	store
		.set(TokenSlot::AccessToken, TokenPair::new("acc", "sec"))
		.await
		.expect("Seeding the access token should succeed.");
}

#[tokio::test]
async fn get_issue_hits_the_rest_api_once() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(GET)
				.path(ISSUE_PATH)
				.header("content-type", "application/json")
				.header_exists("authorization");
			then.status(200)
				.header("content-type", "application/json")
				.body(r#"{"key":"JIRA-1","fields":{"summary":"Broken build"}}"#);
		})
		.await;
	let (client, store) = build_reqwest_test_client(&server.base_url());

	seed_access_token(&store).await;

	let issue = client
		.get_issue("JIRA-1")
		.await
		.expect("Issue fetch should succeed.")
		.authorized()
		.expect("Stored access token should authorize the call.");

	assert_eq!(issue["key"], "JIRA-1");
	assert_eq!(issue["fields"]["summary"], "Broken build");

	mock.assert_calls_async(1).await;
}

#[tokio::test]
async fn create_issue_posts_json_fields() {
	let server = MockServer::start_async().await;
	let fields = json!({
		"fields": {
			"project": { "key": "JIRA" },
			"summary": "Created over OAuth",
			"issuetype": { "name": "Task" }
		}
	});
	let expected_body = fields.clone();
	let mock = server
		.mock_async(move |when, then| {
			when.method(POST)
				.path("/rest/api/2/issue/")
				.header("content-type", "application/json")
				.json_body(expected_body);
			then.status(201).body(r#"{"id":"10000","key":"JIRA-2"}"#);
		})
		.await;
	let (client, store) = build_reqwest_test_client(&server.base_url());

	seed_access_token(&store).await;

	let params: Map<String, Value> = match fields {
		Value::Object(map) => map,
		_ => unreachable!("Fixture is a JSON object."),
	};
	let created = client
		.create_issue(params)
		.await
		.expect("Issue creation should succeed.")
		.authorized()
		.expect("Stored access token should authorize the call.");

	assert_eq!(created["key"], "JIRA-2");

	mock.assert_async().await;
}

#[tokio::test]
async fn unauthorized_response_restarts_the_handshake() {
	let server = MockServer::start_async().await;
	let issue = server
		.mock_async(|when, then| {
			when.method(GET).path(ISSUE_PATH);
			then.status(401).body("oauth_problem=token_expired");
		})
		.await;
	let temp = server
		.mock_async(|when, then| {
			when.method(POST).path("/plugins/servlet/oauth/request-token");
			then.status(200).body("oauth_token=fresh&oauth_token_secret=tmp");
		})
		.await;
	let (client, store) = build_reqwest_test_client(&server.base_url());

	seed_access_token(&store).await;

	let outcome = client.get_issue("JIRA-1").await.expect("401 should restart the handshake.");
	let expected =
		format!("{}/plugins/servlet/oauth/authorize?oauth_token=fresh", server.base_url());

	assert_eq!(
		outcome,
		Authorization::AuthorizationRequired(
			Url::parse(&expected).expect("Expected authorization URL should parse.")
		)
	);
	assert!(
		store
			.get(TokenSlot::AccessToken)
			.await
			.expect("Store read should succeed.")
			.is_none()
	);
	assert_eq!(
		client.state().await.expect("State should be readable."),
		AuthorizationState::HaveRequestToken
	);
	assert!(client.agent().last_access_token().is_none());

	issue.assert_calls_async(1).await;
	temp.assert_calls_async(1).await;
}

#[tokio::test]
async fn unauthorized_response_without_reauthorization_expires_the_session() {
	let server = MockServer::start_async().await;

	server
		.mock_async(|when, then| {
			when.method(GET).path(ISSUE_PATH);
			then.status(401);
		})
		.await;

	let (client, store) = build_reqwest_test_client(&server.base_url());
	let client = client.with_automatic_reauthorization(false);

	seed_access_token(&store).await;

	let err = client.get_issue("JIRA-1").await.expect_err("401 should expire the session.");

	assert!(matches!(err, Error::SessionExpired));
	assert_eq!(err.to_string(), "Your user session has expired.");
	assert_eq!(
		client.state().await.expect("State should be readable."),
		AuthorizationState::HaveAccessToken
	);
}

#[tokio::test]
async fn other_failures_carry_the_reason_phrase() {
	let server = MockServer::start_async().await;

	server
		.mock_async(|when, then| {
			when.method(GET).path(ISSUE_PATH);
			then.status(404).body(r#"{"errorMessages":["Issue does not exist"]}"#);
		})
		.await;

	let (client, store) = build_reqwest_test_client(&server.base_url());

	seed_access_token(&store).await;

	let err = client.get_issue("JIRA-1").await.expect_err("404 should fail.");

	assert!(matches!(err, Error::Request { status: 404, ref reason } if reason == "Not Found"));
}

#[tokio::test]
async fn empty_and_malformed_bodies_are_handled() {
	let server = MockServer::start_async().await;

	server
		.mock_async(|when, then| {
			when.method(GET).path("/rest/api/2/myself");
			then.status(204);
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(GET).path(ISSUE_PATH);
			then.status(200).body("{\"key\":");
		})
		.await;

	let (client, store) = build_reqwest_test_client(&server.base_url());

	seed_access_token(&store).await;

	let myself = Url::parse(&format!("{}/rest/api/2/myself", server.base_url()))
		.expect("API URL should parse.");
	let empty = client
		.call(HttpMethod::Get, myself, None)
		.await
		.expect("Empty body should decode to null.");
	let err = client.get_issue("JIRA-1").await.expect_err("Malformed JSON should fail.");

	assert_eq!(empty, Authorization::Authorized(Value::Null));
	assert!(matches!(err, Error::Protocol(ProtocolError::ResponseParse { status: 200, .. })));
}

#[tokio::test]
async fn trailing_data_after_json_is_rejected() {
	let server = MockServer::start_async().await;

	server
		.mock_async(|when, then| {
			when.method(GET).path(ISSUE_PATH);
			then.status(200).body(r#"{"key":1}garbage"#);
		})
		.await;

	let (client, store) = build_reqwest_test_client(&server.base_url());

	seed_access_token(&store).await;

	let err = client.get_issue("JIRA-1").await.expect_err("Trailing characters should fail.");

	assert!(matches!(
		err,
		Error::Protocol(ProtocolError::ResponseParse { status: 200, ref path, .. }) if path == "."
	));
}

#[tokio::test]
async fn non_standard_status_gets_a_fallback_reason() {
	let server = MockServer::start_async().await;

	server
		.mock_async(|when, then| {
			when.method(GET).path(ISSUE_PATH);
			then.status(599);
		})
		.await;

	let (client, store) = build_reqwest_test_client(&server.base_url());

	seed_access_token(&store).await;

	let err = client.get_issue("JIRA-1").await.expect_err("599 should fail.");

	assert!(matches!(err, Error::Request { status: 599, ref reason } if reason == "Unknown Status"));
}
