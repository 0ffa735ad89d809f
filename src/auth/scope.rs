//! Access-token scope names accepted by GitLab and the helpers that check them.

// self
use crate::{
	_prelude::*,
	auth::{Defect, Defects},
};

/// Scope that may be granted to a project or group access token.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Scope {
	/// Full API access.
	Api,
	/// Read-only API access.
	ReadApi,
	/// Pull from the container registry.
	ReadRegistry,
	/// Push to the container registry.
	WriteRegistry,
	/// Clone/pull repositories.
	ReadRepository,
	/// Push to repositories.
	WriteRepository,
}
impl Scope {
	/// Every scope the engine will request, in GitLab's documentation order.
	pub const ALL: [Scope; 6] = [
		Scope::Api,
		Scope::ReadApi,
		Scope::ReadRegistry,
		Scope::WriteRegistry,
		Scope::ReadRepository,
		Scope::WriteRepository,
	];

	/// Returns the wire name GitLab expects.
	pub const fn as_str(self) -> &'static str {
		match self {
			Scope::Api => "api",
			Scope::ReadApi => "read_api",
			Scope::ReadRegistry => "read_registry",
			Scope::WriteRegistry => "write_registry",
			Scope::ReadRepository => "read_repository",
			Scope::WriteRepository => "write_repository",
		}
	}
}
impl Display for Scope {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
impl FromStr for Scope {
	type Err = Defect;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Scope::ALL
			.into_iter()
			.find(|scope| scope.as_str() == s)
			.ok_or_else(|| Defect::ScopeNotAllowed { scope: s.to_owned() })
	}
}

/// Checks a requested scope list, reporting emptiness or every disallowed member.
pub fn validate_scopes<S>(scopes: &[S]) -> Defects
where
	S: AsRef<str>,
{
	if scopes.is_empty() {
		return Defect::EmptyScopes.into();
	}

	scopes.iter().filter_map(|scope| Scope::from_str(scope.as_ref()).err()).collect()
}

/// Trims entries, drops blanks, and removes duplicates while keeping first-seen order.
pub fn normalize_scopes<I, S>(scopes: I) -> Vec<String>
where
	I: IntoIterator<Item = S>,
	S: AsRef<str>,
{
	let mut normalized = Vec::<String>::new();

	for scope in scopes {
		let trimmed = scope.as_ref().trim();

		if trimmed.is_empty() || normalized.iter().any(|seen| seen == trimmed) {
			continue;
		}

		normalized.push(trimmed.to_owned());
	}

	normalized
}
