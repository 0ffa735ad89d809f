//! Optional observability helpers for engine operations.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `gitlab_token_engine.operation` with the
//!   `operation` and `stage` fields, filled in with `role` and `target_id` as each request is
//!   parsed, plus debug events for role writes, issuance, and revocation.
//! - Enable `metrics` to increment the `gitlab_token_engine_operation_total` counter for every
//!   attempt/success/failure, labeled by `operation` + `outcome`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Emits a `tracing` debug event when the feature is enabled; expands to nothing otherwise.
macro_rules! debug_event {
	($($arg:tt)*) => {
		#[cfg(feature = "tracing")]
		::tracing::debug!($($arg)*);
	};
}
pub(crate) use debug_event;

/// Engine operations observed by spans and counters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OperationKind {
	/// Configuration write.
	Configure,
	/// Role create or update.
	DefineRole,
	/// Role delete.
	DeleteRole,
	/// Ad hoc token issuance.
	IssueToken,
	/// Role-based token issuance.
	IssueRoleToken,
	/// Token revocation.
	Revoke,
}
impl OperationKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			OperationKind::Configure => "configure",
			OperationKind::DefineRole => "define_role",
			OperationKind::DeleteRole => "delete_role",
			OperationKind::IssueToken => "issue_token",
			OperationKind::IssueRoleToken => "issue_role_token",
			OperationKind::Revoke => "revoke",
		}
	}
}
impl Display for OperationKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OperationOutcome {
	/// Entry to an engine operation.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl OperationOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			OperationOutcome::Attempt => "attempt",
			OperationOutcome::Success => "success",
			OperationOutcome::Failure => "failure",
		}
	}
}
impl Display for OperationOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Runs `fut` inside an operation span, recording attempt and outcome counters around it.
pub(crate) async fn observe<T, Fut>(kind: OperationKind, stage: &'static str, fut: Fut) -> Result<T>
where
	Fut: Future<Output = Result<T>>,
{
	let span = OperationSpan::new(kind, stage);

	record_operation_outcome(kind, OperationOutcome::Attempt);

	let result = span.instrument(fut).await;

	match &result {
		Ok(_) => record_operation_outcome(kind, OperationOutcome::Success),
		Err(_) => record_operation_outcome(kind, OperationOutcome::Failure),
	}

	result
}
