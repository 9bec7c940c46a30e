// self
use crate::{_prelude::*, obs::Stage};

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedStage<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedStage<F> = F;

/// A span builder used by task stages.
#[derive(Clone, Debug)]
pub struct StageSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl StageSpan {
	/// Creates a new span tagged with the provided stage + call site.
	pub fn new(stage: Stage, call: &'static str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!("aigc_image_task.stage", stage = stage.as_str(), call);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (stage, call);

			Self {}
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedStage<Fut>
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

/// Emits the timestamp/signature pair attached to a signed request.
pub fn record_signature(stage: Stage, timestamp: &str, signature: &str) {
	#[cfg(feature = "tracing")]
	tracing::debug!(stage = stage.as_str(), timestamp, signature, "signed request");
	#[cfg(not(feature = "tracing"))]
	let _ = (stage, timestamp, signature);
}

/// Emits the outbound JSON body of a stage.
pub fn record_request_body(stage: Stage, body: &str) {
	#[cfg(feature = "tracing")]
	tracing::debug!(stage = stage.as_str(), body, "request body");
	#[cfg(not(feature = "tracing"))]
	let _ = (stage, body);
}

/// Emits the raw response of a stage. Bodies are logged verbatim for operability.
pub fn record_response(stage: Stage, status: u16, body: &str) {
	#[cfg(feature = "tracing")]
	tracing::debug!(stage = stage.as_str(), status, body, "response received");
	#[cfg(not(feature = "tracing"))]
	let _ = (stage, status, body);
}

/// Emits a notice that polling gave up after `elapsed`.
pub fn record_poll_timeout(elapsed: Duration, timeout: Duration) {
	#[cfg(feature = "tracing")]
	tracing::warn!(
		elapsed_ms = elapsed.as_millis() as u64,
		timeout_ms = timeout.as_millis() as u64,
		"task polling timed out"
	);
	#[cfg(not(feature = "tracing"))]
	let _ = (elapsed, timeout);
}

/// Emits the final classification of an invocation.
pub fn record_invocation_outcome(label: &'static str, detail: &dyn Display) {
	#[cfg(feature = "tracing")]
	tracing::info!(outcome = label, %detail, "image generation finished");
	#[cfg(not(feature = "tracing"))]
	let _ = (label, detail);
}
