//! Token families the engine can mint.

// self
use crate::{_prelude::*, auth::Defect};

/// Which GitLab resource an access token is scoped to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TokenType {
	/// Project access token.
	Project,
	/// Group access token.
	Group,
}
impl TokenType {
	/// Returns the field value used in requests and persisted roles.
	pub const fn as_str(self) -> &'static str {
		match self {
			TokenType::Project => "project",
			TokenType::Group => "group",
		}
	}

	/// Parses a raw `token_type` field; there is no default, so blank input is a defect.
	pub fn parse_field(raw: &str) -> Result<Self, Defect> {
		match raw.trim() {
			"" => Err(Defect::MissingTokenType),
			"project" => Ok(TokenType::Project),
			"group" => Ok(TokenType::Group),
			other => Err(Defect::UnknownTokenType { value: other.to_owned() }),
		}
	}
}
impl Display for TokenType {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
impl FromStr for TokenType {
	type Err = Defect;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::parse_field(s)
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn known_types_parse() {
		assert_eq!(TokenType::from_str("project"), Ok(TokenType::Project));
		assert_eq!(TokenType::from_str(" group "), Ok(TokenType::Group));
	}

	#[test]
	fn blank_type_has_no_default() {
		assert_eq!(TokenType::parse_field(""), Err(Defect::MissingTokenType));
		assert_eq!(
			TokenType::parse_field("user"),
			Err(Defect::UnknownTokenType { value: "user".into() })
		);
	}
}
