//! In-process issuance counters.

// std
use std::sync::atomic::{AtomicU64, Ordering};
// self
use crate::_prelude::*;

/// Thread-safe counters for token issuance.
#[derive(Debug, Default)]
pub struct IssuanceMetrics {
	attempts: AtomicU64,
	success: AtomicU64,
	failure: AtomicU64,
	rejected: AtomicU64,
}
impl IssuanceMetrics {
	/// Returns the total number of issuance attempts.
	pub fn attempts(&self) -> u64 {
		self.attempts.load(Ordering::Relaxed)
	}

	/// Returns the number of tokens issued.
	pub fn successes(&self) -> u64 {
		self.success.load(Ordering::Relaxed)
	}

	/// Returns the number of attempts that failed outside validation.
	pub fn failures(&self) -> u64 {
		self.failure.load(Ordering::Relaxed)
	}

	/// Returns the number of attempts rejected by validation before any upstream call.
	pub fn rejections(&self) -> u64 {
		self.rejected.load(Ordering::Relaxed)
	}

	pub(crate) fn record_attempt(&self) {
		self.attempts.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_result<T>(&self, result: &Result<T>) {
		let counter = match result {
			Ok(_) => &self.success,
			Err(Error::Validation(_)) => &self.rejected,
			Err(_) => &self.failure,
		};

		counter.fetch_add(1, Ordering::Relaxed);
	}
}
