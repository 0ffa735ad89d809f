//! Validation defects and the accumulator that reports every one of them at once.
//!
//! Validation never stops at the first problem. Each check appends to a [`Defects`] list and the
//! caller converts the list into a single error (or nothing) with [`Defects::into_result`].

// std
use std::{slice::Iter, vec::IntoIter};
// self
use crate::_prelude::*;

/// A single malformed field discovered while validating a request.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum Defect {
	/// Project/group identifier is missing or not positive.
	#[error("id is empty or invalid (got {value}).")]
	InvalidTargetId {
		/// Rejected identifier.
		value: i64,
	},
	/// Token name is empty.
	#[error("name is empty.")]
	EmptyName,
	/// No scopes were requested.
	#[error("scopes are empty.")]
	EmptyScopes,
	/// A requested scope is outside the allowed set.
	#[error("scope '{scope}' is not allowed.")]
	ScopeNotAllowed {
		/// Rejected scope.
		scope: String,
	},
	/// Access level is not a multiple of 10 within `[0, 40]`.
	#[error("invalid access level {value}; expected one of 0, 10, 20, 30, 40.")]
	InvalidAccessLevel {
		/// Rejected access level.
		value: i64,
	},
	/// Token type was not supplied.
	#[error("token_type must be either 'project' or 'group', but none was supplied.")]
	MissingTokenType,
	/// Token type is not one of the known families.
	#[error("token_type must be either 'project' or 'group', got '{value}'.")]
	UnknownTokenType {
		/// Rejected token type.
		value: String,
	},
	/// Requested expiry lies beyond `now + ceiling`.
	#[error(
		"Requested expires_at '{requested}' exceeds configured maximum ttl of '{max_seconds}'s. Expires at or before '{latest}'."
	)]
	ExpiryExceedsCeiling {
		/// Requested expiry instant.
		requested: OffsetDateTime,
		/// Configured ceiling in seconds.
		max_seconds: i64,
		/// Latest acceptable expiry at validation time.
		latest: OffsetDateTime,
	},
	/// Requested role TTL is longer than the ceiling.
	#[error(
		"Requested token ttl '{requested_seconds}s' exceeds configured maximum ttl of '{max_seconds}'s."
	)]
	TtlExceedsCeiling {
		/// Requested TTL in seconds.
		requested_seconds: i64,
		/// Configured ceiling in seconds.
		max_seconds: i64,
	},
	/// Role TTL pushes the expiry past the representable calendar.
	#[error("token_ttl of '{requested_seconds}s' is too large to compute an expiry.")]
	TtlOutOfRange {
		/// Requested TTL in seconds.
		requested_seconds: i64,
	},
	/// Token identifier is missing or not positive.
	#[error("token_id is empty or invalid (got {value}).")]
	InvalidTokenId {
		/// Rejected identifier.
		value: i64,
	},
}
impl Defect {
	/// Returns `true` for the lifetime-ceiling family of defects.
	pub fn is_lifetime_ceiling_exceeded(&self) -> bool {
		matches!(self, Self::ExpiryExceedsCeiling { .. } | Self::TtlExceedsCeiling { .. })
	}
}

/// Ordered list of [`Defect`]s collected across every check of a request.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Defects(Vec<Defect>);
impl Defects {
	/// Creates an empty accumulator.
	pub fn new() -> Self {
		Self::default()
	}

	/// Appends a defect.
	pub fn push(&mut self, defect: Defect) {
		self.0.push(defect);
	}

	/// Appends the defect when present.
	pub fn push_if(&mut self, defect: Option<Defect>) {
		if let Some(defect) = defect {
			self.0.push(defect);
		}
	}

	/// Appends the error side of `result` and returns the success side.
	pub fn check<T>(&mut self, result: Result<T, Defect>) -> Option<T> {
		match result {
			Ok(value) => Some(value),
			Err(defect) => {
				self.0.push(defect);

				None
			},
		}
	}

	/// Number of collected defects.
	pub fn len(&self) -> usize {
		self.0.len()
	}

	/// Returns `true` when every check passed.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// Iterator over the collected defects in discovery order.
	pub fn iter(&self) -> Iter<'_, Defect> {
		self.0.iter()
	}

	/// Collapses the accumulator into a single error, or `Ok(())` when nothing was collected.
	pub fn into_result(self) -> Result<(), Defects> {
		if self.0.is_empty() { Ok(()) } else { Err(self) }
	}
}
impl Display for Defects {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		match self.0.as_slice() {
			[] => f.write_str("no defects"),
			[only] => write!(f, "1 error occurred: {only}"),
			defects => {
				write!(f, "{} errors occurred:", defects.len())?;

				for defect in defects {
					write!(f, "\n\t* {defect}")?;
				}

				Ok(())
			},
		}
	}
}
impl StdError for Defects {}
impl From<Defect> for Defects {
	fn from(defect: Defect) -> Self {
		Self(vec![defect])
	}
}
impl Extend<Defect> for Defects {
	fn extend<I>(&mut self, iter: I)
	where
		I: IntoIterator<Item = Defect>,
	{
		self.0.extend(iter);
	}
}
impl FromIterator<Defect> for Defects {
	fn from_iter<I>(iter: I) -> Self
	where
		I: IntoIterator<Item = Defect>,
	{
		Self(iter.into_iter().collect())
	}
}
impl IntoIterator for Defects {
	type IntoIter = IntoIter<Defect>;
	type Item = Defect;

	fn into_iter(self) -> Self::IntoIter {
		self.0.into_iter()
	}
}
impl<'a> IntoIterator for &'a Defects {
	type IntoIter = Iter<'a, Defect>;
	type Item = &'a Defect;

	fn into_iter(self) -> Self::IntoIter {
		self.0.iter()
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn empty_accumulator_converts_to_ok() {
		let mut defects = Defects::new();

		defects.push_if(None);

		assert_eq!(defects.check::<u8>(Ok(7)), Some(7));
		assert!(defects.into_result().is_ok());
	}

	#[test]
	fn accumulator_keeps_every_defect_in_order() {
		let mut defects = Defects::new();

		defects.push(Defect::EmptyName);
		defects.push_if(Some(Defect::EmptyScopes));
		assert_eq!(defects.check::<u8>(Err(Defect::MissingTokenType)), None);

		let err = defects.into_result().expect_err("Collected defects must surface as an error.");

		assert_eq!(
			err.iter().cloned().collect::<Vec<_>>(),
			vec![Defect::EmptyName, Defect::EmptyScopes, Defect::MissingTokenType]
		);

		let rendered = err.to_string();

		assert!(rendered.starts_with("3 errors occurred:"));
		assert!(rendered.contains("name is empty"));
		assert!(rendered.contains("scopes are empty"));
		assert!(rendered.contains("token_type must be either"));
	}

	#[test]
	fn single_defect_renders_inline() {
		let defects = Defects::from(Defect::InvalidTokenId { value: 0 });

		assert_eq!(defects.to_string(), "1 error occurred: token_id is empty or invalid (got 0).");
	}
}
