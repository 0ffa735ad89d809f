//! Serde adapters that carry [`Duration`] values as whole seconds.

// crates.io
use serde::{Deserializer, Serializer, de::Error as DeError};
// self
use crate::_prelude::*;

pub(crate) fn serialize<S>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
	S: Serializer,
{
	serializer.serialize_i64(value.whole_seconds())
}

pub(crate) fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
	D: Deserializer<'de>,
{
	let secs = i64::deserialize(deserializer)?;

	if secs < 0 {
		return Err(DeError::custom(format!("duration must not be negative, got {secs}s")));
	}

	Ok(Duration::seconds(secs))
}

pub(crate) mod option {
	// crates.io
	use serde::{Deserializer, Serializer};
	// self
	use crate::_prelude::*;

	pub(crate) fn serialize<S>(value: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		match value {
			Some(duration) => super::serialize(duration, serializer),
			None => serializer.serialize_none(),
		}
	}

	pub(crate) fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
	where
		D: Deserializer<'de>,
	{
		#[derive(Deserialize)]
		struct Wrapper(#[serde(with = "super")] Duration);

		Ok(<Option<Wrapper>>::deserialize(deserializer)?.map(|Wrapper(duration)| duration))
	}
}
