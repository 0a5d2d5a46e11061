use serde::{Deserialize, Deserializer};
use validator::{Validate, ValidationError};

/// The length of a canonical UUID, the shortest identifier accepted for
/// posts and configs.
pub const IDENTIFIER_MIN_LENGTH: usize = 36;

/// Checks that a caller-supplied identifier is at least
/// [`IDENTIFIER_MIN_LENGTH`] characters of `[a-zA-Z0-9-]`.
pub fn validate_identifier(id: &str) -> Result<(), ValidationError> {
	if id.len() < IDENTIFIER_MIN_LENGTH {
		return Err(ValidationError::new("identifier_too_short"));
	}

	if !id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
		return Err(ValidationError::new("identifier_invalid_character"));
	}

	Ok(())
}

/// Treats an empty form field the same as a missing one.
pub fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
	D: Deserializer<'de>,
{
	Ok(Option::<String>::deserialize(deserializer)?.filter(|value| !value.is_empty()))
}

/// Whether an HTML checkbox was ticked.
pub fn is_checked(value: Option<&str>) -> bool {
	matches!(value, Some("on" | "true"))
}

/// These can be removed when [`serde`] supports
/// literal defaults: <https://github.com/serde-rs/serde/issues/368>
#[inline]
fn one() -> i64 {
	1
}

#[inline]
fn ten() -> i64 {
	10
}

#[derive(Deserialize, Validate)]
pub struct Paginate {
	/// The page number to return (1-indexed).
	#[validate(range(min = 1, max = 100))]
	#[serde(default = "one")]
	pub page: i64,
	/// The number of items to return per page.
	#[validate(range(min = 1, max = 100))]
	#[serde(default = "ten")]
	pub size: i64,
}

impl Paginate {
	pub fn offset(&self) -> i64 {
		(self.page - 1) * self.size
	}

	pub fn limit(&self) -> i64 {
		self.size
	}
}

#[derive(Deserialize, Validate)]
pub struct IdInput {
	#[validate(custom(function = "validate_identifier"))]
	pub id: String,
}
