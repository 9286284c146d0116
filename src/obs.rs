//! Optional observability helpers for the OAuth handshake and signed API calls.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `jira_oauth.flow` with the `flow`
//!   (handshake leg or API call), `stage` (call site), and final `outcome` fields.
//! - Enable `metrics` to increment the `jira_oauth_flow_total` counter for every
//!   attempt/success/failure/redirect, labeled by `flow` + `outcome`.
//!
//! Token secrets, verifiers, and signatures are never recorded.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Operations observed by the crate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowKind {
	/// Temporary (request token) credential exchange.
	TempCredentials,
	/// Verifier-for-access-token exchange.
	AccessCredentials,
	/// Signed REST call issued by the authorizing client.
	ApiCall,
}
impl FlowKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FlowKind::TempCredentials => "temp_credentials",
			FlowKind::AccessCredentials => "access_credentials",
			FlowKind::ApiCall => "api_call",
		}
	}
}
impl Display for FlowKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowOutcome {
	/// Entry to an instrumented operation.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
	/// The caller must send the user to JIRA before the operation can complete.
	AuthorizationRequired,
}
impl FlowOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FlowOutcome::Attempt => "attempt",
			FlowOutcome::Success => "success",
			FlowOutcome::Failure => "failure",
			FlowOutcome::AuthorizationRequired => "authorization_required",
		}
	}
}
impl Display for FlowOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn labels_are_stable() {
		assert_eq!(FlowKind::TempCredentials.to_string(), "temp_credentials");
		assert_eq!(FlowKind::ApiCall.as_str(), "api_call");
		assert_eq!(FlowOutcome::AuthorizationRequired.to_string(), "authorization_required");
	}
}
