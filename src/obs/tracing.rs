// self
use crate::{
	_prelude::*,
	obs::{self, FlowKind, FlowOutcome},
};

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedFlow<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedFlow<F> = F;

/// Span wrapping one handshake leg or API call.
///
/// Creating the span counts an attempt; [`FlowSpan::record`] stores the final outcome on the
/// span's `outcome` field and counts it as well.
#[derive(Clone, Debug)]
pub struct FlowSpan {
	kind: FlowKind,
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl FlowSpan {
	/// Opens a span tagged with the flow kind + stage and counts the attempt.
	pub fn new(kind: FlowKind, stage: &'static str) -> Self {
		obs::record_flow_outcome(kind, FlowOutcome::Attempt);

		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!(
				"jira_oauth.flow",
				flow = kind.as_str(),
				stage,
				outcome = tracing::field::Empty
			);

			Self { kind, span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = stage;

			Self { kind }
		}
	}

	/// Flow kind the span was opened for.
	pub fn kind(&self) -> FlowKind {
		self.kind
	}

	/// Records the final outcome.
	pub fn record(&self, outcome: FlowOutcome) {
		#[cfg(feature = "tracing")]
		self.span.record("outcome", outcome.as_str());

		obs::record_flow_outcome(self.kind, outcome);
	}

	/// Records success or failure from `result`.
	pub fn record_result<T, E>(&self, result: &Result<T, E>) {
		self.record(if result.is_ok() { FlowOutcome::Success } else { FlowOutcome::Failure });
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedFlow<Fut>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			use tracing::Instrument;

			fut.instrument(self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}
}
