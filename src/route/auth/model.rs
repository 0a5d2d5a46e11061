use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::route::model::empty_as_none;

fn validate_username(username: &str) -> Result<(), ValidationError> {
	if username.chars().any(|c| !c.is_alphanumeric()) {
		return Err(ValidationError::new("username must be alphanumeric"));
	}

	Ok(())
}

/// A single user.
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct User {
	/// The unique identifier of the user.
	pub id: String,
	/// The username that is displayed to the public.
	pub username: String,
	/// The user's email address, never shown to the public.
	#[serde(skip_serializing)]
	pub email: Option<String>,
	/// The Argon2 PHC string of the user's password.
	#[serde(skip)]
	pub password_hash: String,
	/// The creation time of the user.
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
}

#[derive(Deserialize, Validate)]
pub struct LoginInput {
	#[validate(length(min = 1))]
	pub username: String,
	#[validate(length(min = 1))]
	pub password: String,
}

#[derive(Deserialize, Validate)]
pub struct SignupInput {
	/// The username that is displayed to the public.
	#[validate(length(min = 3, max = 32), custom(function = "validate_username"))]
	pub username: String,
	#[validate(length(min = 8, max = 128))]
	pub password: String,
	#[serde(default, deserialize_with = "empty_as_none")]
	#[validate(length(min = 3, max = 254))]
	pub email: Option<String>,
}
