//! Validated role-name identifier used as the role storage key suffix.

// std
use std::{borrow::Borrow, ops::Deref};
// self
use crate::_prelude::*;

const ROLE_NAME_MAX_LEN: usize = 128;

/// Error returned when a role name cannot be used as a storage key.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum RoleNameError {
	/// The name was empty.
	#[error("Role name not supplied.")]
	Empty,
	/// The name contains a character outside `[A-Za-z0-9_.-]`.
	#[error("Role name contains invalid character {character:?}.")]
	InvalidCharacter {
		/// First offending character.
		character: char,
	},
	/// The name exceeded the allowed character count.
	#[error("Role name exceeds {max} characters.")]
	TooLong {
		/// Maximum permitted character count.
		max: usize,
	},
}

/// Unique name of a stored role.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RoleName(String);
impl RoleName {
	/// Creates a new role name after validation.
	pub fn new(value: impl AsRef<str>) -> Result<Self, RoleNameError> {
		let view = value.as_ref();

		validate_view(view)?;

		Ok(Self(view.to_owned()))
	}
}
impl Deref for RoleName {
	type Target = str;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
impl AsRef<str> for RoleName {
	fn as_ref(&self) -> &str {
		&self.0
	}
}
impl Borrow<str> for RoleName {
	fn borrow(&self) -> &str {
		&self.0
	}
}
impl From<RoleName> for String {
	fn from(value: RoleName) -> Self {
		value.0
	}
}
impl TryFrom<String> for RoleName {
	type Error = RoleNameError;

	fn try_from(value: String) -> Result<Self, Self::Error> {
		validate_view(&value)?;

		Ok(Self(value))
	}
}
impl Debug for RoleName {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "Role({})", self.0)
	}
}
impl Display for RoleName {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.0)
	}
}
impl FromStr for RoleName {
	type Err = RoleNameError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::new(s)
	}
}

fn validate_view(view: &str) -> Result<(), RoleNameError> {
	if view.is_empty() {
		return Err(RoleNameError::Empty);
	}
	if let Some(character) =
		view.chars().find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.')))
	{
		return Err(RoleNameError::InvalidCharacter { character });
	}
	if view.len() > ROLE_NAME_MAX_LEN {
		return Err(RoleNameError::TooLong { max: ROLE_NAME_MAX_LEN });
	}

	Ok(())
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn names_reject_namespace_escapes() {
		assert_eq!(RoleName::new(""), Err(RoleNameError::Empty));
		assert_eq!(
			RoleName::new("../config"),
			Err(RoleNameError::InvalidCharacter { character: '/' })
		);
		assert!(RoleName::new("with space").is_err());

		let name = RoleName::new("MyProject1.read-role_x").expect("Role fixture should be valid.");

		assert_eq!(name.as_ref(), "MyProject1.read-role_x");
	}

	#[test]
	fn length_limit_is_enforced() {
		RoleName::new("a".repeat(ROLE_NAME_MAX_LEN)).expect("Exact length should succeed.");

		assert_eq!(
			RoleName::new("a".repeat(ROLE_NAME_MAX_LEN + 1)),
			Err(RoleNameError::TooLong { max: ROLE_NAME_MAX_LEN })
		);
	}

	#[test]
	fn serde_enforces_validation() {
		let name: RoleName =
			serde_json::from_str("\"deploy\"").expect("Role name should deserialize.");

		assert_eq!(&*name, "deploy");
		assert!(serde_json::from_str::<RoleName>("\"a/b\"").is_err());
	}
}
