//! GitLab role quantization for access tokens.

// self
use crate::{_prelude::*, auth::Defect};

/// Access level attached to a project or group token.
///
/// `NoAccess` is the "unset" value: the engine omits the field and lets GitLab apply its own
/// default.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AccessLevel {
	/// Unset; GitLab chooses.
	#[default]
	NoAccess,
	/// Guest (10).
	Guest,
	/// Reporter (20).
	Reporter,
	/// Developer (30).
	Developer,
	/// Maintainer (40).
	Maintainer,
}
impl AccessLevel {
	/// Returns GitLab's numeric representation.
	pub const fn value(self) -> i64 {
		match self {
			AccessLevel::NoAccess => 0,
			AccessLevel::Guest => 10,
			AccessLevel::Reporter => 20,
			AccessLevel::Developer => 30,
			AccessLevel::Maintainer => 40,
		}
	}

	/// Returns a stable label.
	pub const fn as_str(self) -> &'static str {
		match self {
			AccessLevel::NoAccess => "no_access",
			AccessLevel::Guest => "guest",
			AccessLevel::Reporter => "reporter",
			AccessLevel::Developer => "developer",
			AccessLevel::Maintainer => "maintainer",
		}
	}

	/// Returns `true` when the level should be left to GitLab's default.
	pub const fn is_unset(self) -> bool {
		matches!(self, AccessLevel::NoAccess)
	}
}
impl TryFrom<i64> for AccessLevel {
	type Error = Defect;

	fn try_from(value: i64) -> Result<Self, Self::Error> {
		match value {
			0 => Ok(AccessLevel::NoAccess),
			10 => Ok(AccessLevel::Guest),
			20 => Ok(AccessLevel::Reporter),
			30 => Ok(AccessLevel::Developer),
			40 => Ok(AccessLevel::Maintainer),
			_ => Err(Defect::InvalidAccessLevel { value }),
		}
	}
}
impl Display for AccessLevel {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Returns the defect for a level that is not a multiple of 10 within `[0, 40]`.
pub fn validate_access_level(value: i64) -> Option<Defect> {
	AccessLevel::try_from(value).err()
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn quantized_levels_round_trip() {
		for value in [0, 10, 20, 30, 40] {
			let level = AccessLevel::try_from(value).expect("Quantized level should be accepted.");

			assert_eq!(level.value(), value);
		}

		assert!(AccessLevel::default().is_unset());
	}

	#[test]
	fn off_grid_levels_are_rejected() {
		for value in [-10, 5, 31, 50] {
			assert_eq!(validate_access_level(value), Some(Defect::InvalidAccessLevel { value }));
		}
	}
}
