use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::route::model::{empty_as_none, validate_identifier};

/// A revision of a site configuration. Only one revision per admin is active.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Config {
	pub id: String,
	pub active: bool,
	/// The software version the config was first published with.
	pub version: String,
	pub title: String,
	pub description: String,
	pub image_url: String,
	pub favicon_url: String,
	pub footer_html: String,
	pub admin_user_id: String,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
}

/// The config form, along with the id to publish the next revision under.
#[derive(Debug, Serialize)]
pub struct ConfigPage {
	pub next_id: Uuid,
	pub config: Option<Config>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ConfigForm {
	#[validate(length(min = 1, max = 256))]
	pub title: String,
	#[serde(default)]
	#[validate(length(max = 4096))]
	pub description: String,
	/// Kept from the previous revision when omitted.
	#[serde(default, deserialize_with = "empty_as_none")]
	pub image_url: Option<String>,
	#[serde(default, deserialize_with = "empty_as_none")]
	pub favicon_url: Option<String>,
	#[serde(default, deserialize_with = "empty_as_none")]
	pub footer_html: Option<String>,
}

/// A new config revision, combining the path and the form.
#[derive(Debug, Validate)]
pub struct PublishConfig {
	#[validate(custom(function = "validate_identifier"))]
	pub id: String,
	#[validate(nested)]
	pub form: ConfigForm,
}

/// The fields carried forward from the revision being replaced.
#[derive(Debug, Default, sqlx::FromRow)]
pub struct Carried {
	pub version: String,
	pub image_url: String,
	pub favicon_url: String,
	pub footer_html: String,
}
