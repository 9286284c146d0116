//! Walks through the three-legged handshake from a terminal and fetches one issue.
//!
//! Usage: `cargo run --example authorize -- <config.json> <ISSUE-KEY> [session.json]`. The
//! session file keeps the request/access tokens between runs, so the authorization step only
//! happens once.

// std
use std::{env, io, sync::Arc};
// crates.io
use color_eyre::{Result, eyre::eyre};
use url::Url;
// self
use jira_oauth::{
	agent::OAuthAgent,
	auth::Authorization,
	client::AuthorizingClient,
	config::OAuthConfig,
	store::{CredentialStore, FileStore},
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let mut args = env::args().skip(1);
	let config_path = args.next().ok_or_else(|| eyre!("Missing configuration path."))?;
	let issue_key = args.next().ok_or_else(|| eyre!("Missing issue key."))?;
	let session_path = args.next().unwrap_or_else(|| "jira-oauth-session.json".into());
	let config = OAuthConfig::from_json_slice(&std::fs::read(&config_path)?)?;
	let store: Arc<dyn CredentialStore> = Arc::new(FileStore::open(&session_path)?);
	let client = AuthorizingClient::new(OAuthAgent::new(config), store);

	println!("Handshake state: {}.", client.state().await?);

	let issue = match client.get_issue(&issue_key).await? {
		Authorization::Authorized(issue) => issue,
		Authorization::AuthorizationRequired(url) => {
			println!("Open {url} in a browser and approve the application.");
			println!("Then paste the URL JIRA redirected you to:");

			let mut line = String::new();

			io::stdin().read_line(&mut line)?;
			client.accept_callback(&Url::parse(line.trim())?)?;
			client
				.get_issue(&issue_key)
				.await?
				.authorized()
				.ok_or_else(|| eyre!("JIRA asked for authorization again."))?
		},
	};

	println!("{}", serde_json::to_string_pretty(&issue)?);

	Ok(())
}
