// self
use crate::{_prelude::*, obs::OperationKind};

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedOperation<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedOperation<F> = F;

/// A span builder used by engine operations.
///
/// The span declares empty `role` and `target_id` fields; operations fill them in through
/// [`record_role`] and [`record_target`] once the request has been parsed.
#[derive(Clone, Debug)]
pub struct OperationSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl OperationSpan {
	/// Creates a new span tagged with the provided operation kind + stage.
	pub fn new(kind: OperationKind, stage: &'static str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!(
				"gitlab_token_engine.operation",
				operation = kind.as_str(),
				stage,
				role = tracing::field::Empty,
				target_id = tracing::field::Empty,
			);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (kind, stage);

			Self {}
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedOperation<Fut>
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

/// Tags the enclosing operation span with the role being written, read, or issued from.
pub fn record_role(role: &str) {
	#[cfg(feature = "tracing")]
	tracing::Span::current().record("role", role);
	#[cfg(not(feature = "tracing"))]
	let _ = role;
}

/// Tags the enclosing operation span with the GitLab project or group id.
pub fn record_target(target_id: i64) {
	#[cfg(feature = "tracing")]
	tracing::Span::current().record("target_id", target_id);
	#[cfg(not(feature = "tracing"))]
	let _ = target_id;
}
