//! Named, reusable token policies.

// self
use crate::{
	_prelude::*,
	auth::{BaseFields, BaseTokenRequest, Defect, Defects, RoleName, seconds, validate_base},
};

/// TTL assigned to roles created without one.
pub const DEFAULT_ROLE_TTL: Duration = Duration::hours(24);

/// Persisted role: a name, a token TTL, and the shared request fields.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleEntry {
	/// Unique role name; also the storage key suffix.
	pub role_name: RoleName,
	/// Lifetime of tokens issued from this role; zero means they never expire.
	#[serde(with = "seconds")]
	pub token_ttl: Duration,
	/// Shared request fields.
	pub base: BaseTokenRequest,
}
impl RoleEntry {
	/// Starts an empty role with the default TTL.
	pub fn new(role_name: RoleName) -> Self {
		Self { role_name, token_ttl: DEFAULT_ROLE_TTL, base: BaseTokenRequest::default() }
	}

	/// Applies the supplied fields, leaving absent ones untouched.
	pub fn merge(&mut self, fields: &RoleFields) {
		self.base.merge(&fields.base);

		if let Some(ttl) = fields.token_ttl {
			self.token_ttl = ttl;
		}
	}

	/// Collects every defect, including a TTL above a non-zero ceiling or one whose expiry
	/// cannot be computed from `now`.
	pub fn defects_at(&self, ceiling: Duration, now: OffsetDateTime) -> Defects {
		let mut defects = validate_base(&self.base);

		if ceiling.is_positive() && self.token_ttl > ceiling {
			defects.push(Defect::TtlExceedsCeiling {
				requested_seconds: self.token_ttl.whole_seconds(),
				max_seconds: ceiling.whole_seconds(),
			});
		}

		defects.check(self.expires_at(now));

		defects
	}

	/// Fails with every defect relative to the current UTC instant.
	pub fn assert_valid(&self, ceiling: Duration) -> Result<(), Defects> {
		self.defects_at(ceiling, OffsetDateTime::now_utc()).into_result()
	}

	/// Expiry of a token issued at `now`; `None` when the role never expires.
	pub fn expires_at(&self, now: OffsetDateTime) -> Result<Option<OffsetDateTime>, Defect> {
		if self.never_expires() {
			return Ok(None);
		}

		now.checked_add(self.token_ttl)
			.map(Some)
			.ok_or(Defect::TtlOutOfRange { requested_seconds: self.token_ttl.whole_seconds() })
	}

	/// Returns `true` when tokens issued from this role never expire.
	pub fn never_expires(&self) -> bool {
		self.token_ttl.is_zero()
	}

	/// Flat document returned to the host.
	pub fn view(&self) -> RoleView {
		RoleView {
			role_name: self.role_name.to_string(),
			id: self.base.target_id,
			name: self.base.name.clone(),
			scopes: self.base.scopes.clone(),
			access_level: self.base.access_level,
			token_ttl: self.token_ttl.whole_seconds(),
			token_type: self.base.token_type.clone(),
		}
	}
}

/// Host-supplied fields for creating or updating a role.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct RoleFields {
	/// Shared request fields.
	#[serde(flatten)]
	pub base: BaseFields,
	/// Token TTL in seconds.
	#[serde(default, with = "seconds::option")]
	pub token_ttl: Option<Duration>,
}

/// Flat role document returned to the host.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RoleView {
	/// Role name.
	pub role_name: String,
	/// Project or group identifier.
	pub id: i64,
	/// Token name.
	pub name: String,
	/// Requested scopes.
	pub scopes: Vec<String>,
	/// Requested access level.
	pub access_level: i64,
	/// Token TTL in seconds.
	pub token_ttl: i64,
	/// `project` or `group`.
	pub token_type: String,
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn role() -> RoleEntry {
		let mut role = RoleEntry::new(RoleName::new("deploy").expect("Role fixture should be valid."));

		role.merge(&RoleFields {
			base: BaseFields {
				id: Some(1),
				name: Some("role-test".into()),
				scopes: Some(vec!["api".into(), "read_repository".into()]),
				access_level: Some(30),
				token_type: Some("project".into()),
			},
			token_ttl: None,
		});

		role
	}

	#[test]
	fn new_roles_default_to_a_day() {
		let role = role();

		assert_eq!(role.token_ttl, DEFAULT_ROLE_TTL);
		assert!(role.assert_valid(Duration::ZERO).is_ok());
		assert_eq!(role.view().token_ttl, 86_400);
	}

	#[test]
	fn ttl_above_ceiling_joins_base_defects() {
		let mut role = role();

		role.merge(&RoleFields {
			base: BaseFields { id: Some(-1), ..BaseFields::default() },
			token_ttl: Some(Duration::days(30)),
		});

		let err = role.assert_valid(Duration::days(7)).expect_err("Role must fail validation.");

		assert_eq!(err.len(), 2);
		assert!(err.iter().any(Defect::is_lifetime_ceiling_exceeded));
		assert!(err.to_string().contains("id is empty or invalid"));
	}

	#[test]
	fn ttl_past_the_calendar_is_a_defect() {
		let mut role = role();
		let fields: RoleFields = serde_json::from_str("{\"token_ttl\":9223372036854775807}")
			.expect("Largest seconds value should decode.");

		role.merge(&fields);

		assert_eq!(role.token_ttl, Duration::seconds(i64::MAX));

		let err = role.assert_valid(Duration::ZERO).expect_err("Unrepresentable expiry must fail.");

		assert_eq!(
			err.iter().cloned().collect::<Vec<_>>(),
			vec![Defect::TtlOutOfRange { requested_seconds: i64::MAX }]
		);

		role.token_ttl = Duration::days(1_000_000_000);

		assert!(role.expires_at(OffsetDateTime::now_utc()).is_err());

		let err = role.assert_valid(Duration::days(7)).expect_err("Both limits must be reported.");

		assert_eq!(err.len(), 2);
	}

	#[test]
	fn expiry_follows_ttl() {
		let mut role = role();
		let now = OffsetDateTime::UNIX_EPOCH;

		assert_eq!(role.expires_at(now), Ok(Some(now + DEFAULT_ROLE_TTL)));

		role.token_ttl = Duration::ZERO;

		assert_eq!(role.expires_at(now), Ok(None));
	}

	#[test]
	fn explicit_zero_ttl_never_expires() {
		let mut role = role();
		let fields: RoleFields = serde_json::from_str("{\"token_ttl\":0}")
			.expect("Role fields should decode from the host document.");

		role.merge(&fields);

		assert!(role.never_expires());
	}

	#[test]
	fn persisted_shape_round_trips() {
		let role = role();
		let json = serde_json::to_value(&role).expect("Role should serialize.");

		assert_eq!(json["token_ttl"], 86_400);
		assert_eq!(json["base"]["id"], 1);

		let decoded: RoleEntry = serde_json::from_value(json).expect("Role should deserialize.");

		assert_eq!(decoded, role);
	}
}
