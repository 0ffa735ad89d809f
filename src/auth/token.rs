//! Token request structures, their validity predicates, and the normalized issuance response.
//!
//! [`BaseTokenRequest`] carries the fields shared by ad hoc and role-based issuance. Both
//! [`TokenRequest`] and [`RoleEntry`](crate::auth::RoleEntry) embed it by value and reuse
//! [`validate_base`] instead of duplicating the checks.

// self
use crate::{
	_prelude::*,
	auth::{
		AccessLevel, Defect, Defects, Secret, TokenType, normalize_scopes, validate_access_level,
		validate_scopes,
	},
	upstream::AccessToken,
};

/// Fields shared by every token request.
///
/// Values are kept as supplied so validation can report every defect at once; use the typed
/// accessors after validation.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseTokenRequest {
	/// Project or group identifier.
	#[serde(rename = "id")]
	pub target_id: i64,
	/// Token name shown in GitLab.
	pub name: String,
	/// Requested scopes.
	pub scopes: Vec<String>,
	/// Requested access level (`0` leaves it to GitLab).
	#[serde(default)]
	pub access_level: i64,
	/// `project` or `group`; blank means unset.
	#[serde(default)]
	pub token_type: String,
}
impl BaseTokenRequest {
	/// Applies the supplied fields, leaving absent ones untouched.
	pub fn merge(&mut self, fields: &BaseFields) {
		if let Some(id) = fields.id {
			self.target_id = id;
		}
		if let Some(name) = &fields.name {
			self.name = name.clone();
		}
		if let Some(scopes) = &fields.scopes {
			self.scopes = normalize_scopes(scopes);
		}
		if let Some(access_level) = fields.access_level {
			self.access_level = access_level;
		}
		if let Some(token_type) = &fields.token_type {
			self.token_type = token_type.trim().to_owned();
		}
	}

	/// Parsed token type.
	pub fn token_type(&self) -> Result<TokenType, Defect> {
		TokenType::parse_field(&self.token_type)
	}

	/// Parsed access level.
	pub fn access_level(&self) -> Result<AccessLevel, Defect> {
		AccessLevel::try_from(self.access_level)
	}

	/// Collects every defect in the shared fields.
	pub fn defects(&self) -> Defects {
		validate_base(self)
	}

	/// Fails with every defect in the shared fields.
	pub fn assert_valid(&self) -> Result<(), Defects> {
		self.defects().into_result()
	}
}

/// Validates the fields shared by ad hoc requests and roles.
pub fn validate_base(base: &BaseTokenRequest) -> Defects {
	let mut defects = Defects::new();

	if base.target_id <= 0 {
		defects.push(Defect::InvalidTargetId { value: base.target_id });
	}
	if base.name.trim().is_empty() {
		defects.push(Defect::EmptyName);
	}

	defects.extend(validate_scopes(&base.scopes));
	defects.push_if(validate_access_level(base.access_level));
	defects.check(base.token_type());

	defects
}

/// Partial update for [`BaseTokenRequest`] as received from the host.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BaseFields {
	/// Project or group identifier.
	pub id: Option<i64>,
	/// Token name.
	pub name: Option<String>,
	/// Requested scopes.
	pub scopes: Option<Vec<String>>,
	/// Requested access level.
	pub access_level: Option<i64>,
	/// `project` or `group`.
	pub token_type: Option<String>,
}

/// Ad hoc token request: the shared fields plus an optional absolute expiry.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TokenRequest {
	/// Shared request fields.
	pub base: BaseTokenRequest,
	/// Absolute expiry; `None` asks for a token that never expires.
	pub expires_at: Option<OffsetDateTime>,
}
impl TokenRequest {
	/// Builds a request from host-supplied fields.
	pub fn from_fields(fields: &TokenFields) -> Self {
		let mut base = BaseTokenRequest::default();

		base.merge(&fields.base);

		Self { base, expires_at: fields.expires_at }
	}

	/// Collects every defect, checking the expiry against `now + ceiling` when a ceiling is set.
	///
	/// A ceiling that reaches past the representable calendar imposes no limit.
	pub fn defects_at(&self, ceiling: Duration, now: OffsetDateTime) -> Defects {
		let mut defects = validate_base(&self.base);

		if !ceiling.is_positive() {
			return defects;
		}

		let (Some(requested), Some(latest)) = (self.expires_at, now.checked_add(ceiling)) else {
			return defects;
		};

		if requested > latest {
			defects.push(Defect::ExpiryExceedsCeiling {
				requested,
				max_seconds: ceiling.whole_seconds(),
				latest,
			});
		}

		defects
	}

	/// Fails with every defect relative to the current UTC instant.
	pub fn assert_valid(&self, ceiling: Duration) -> Result<(), Defects> {
		self.defects_at(ceiling, OffsetDateTime::now_utc()).into_result()
	}
}

/// Host-supplied fields for an ad hoc token request.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct TokenFields {
	/// Shared request fields.
	#[serde(flatten)]
	pub base: BaseFields,
	/// Absolute expiry (RFC 3339).
	#[serde(default, with = "time::serde::rfc3339::option")]
	pub expires_at: Option<OffsetDateTime>,
}

/// Identifies a project access token to revoke.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevokeRequest {
	/// Project identifier.
	#[serde(rename = "id", default)]
	pub target_id: i64,
	/// Token identifier.
	#[serde(default)]
	pub token_id: i64,
}
impl RevokeRequest {
	/// Creates a revoke request.
	pub fn new(target_id: i64, token_id: i64) -> Self {
		Self { target_id, token_id }
	}

	/// Fails when either identifier is not positive, reporting both.
	pub fn assert_valid(&self) -> Result<(), Defects> {
		let mut defects = Defects::new();

		if self.target_id <= 0 {
			defects.push(Defect::InvalidTargetId { value: self.target_id });
		}
		if self.token_id <= 0 {
			defects.push(Defect::InvalidTokenId { value: self.token_id });
		}

		defects.into_result()
	}
}

/// Normalized response returned for every issued token.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct IssuedToken {
	/// Token value; only available at creation time.
	pub token: Secret,
	/// Token identifier, needed for revocation.
	pub id: i64,
	/// Token name.
	pub name: String,
	/// Granted scopes.
	pub scopes: Vec<String>,
	/// Granted access level.
	pub access_level: i64,
	/// Expiry (midnight UTC of GitLab's expiry date); omitted when the token never expires.
	#[serde(skip_serializing_if = "Option::is_none", with = "time::serde::rfc3339::option")]
	pub expires_at: Option<OffsetDateTime>,
}
impl From<AccessToken> for IssuedToken {
	fn from(record: AccessToken) -> Self {
		Self {
			token: record.token,
			id: record.id,
			name: record.name,
			scopes: record.scopes,
			access_level: record.access_level,
			expires_at: record.expires_at.map(|date| date.midnight().assume_utc()),
		}
	}
}
