use chrono::{DateTime, Utc};
use validator::Validate;

use crate::{
	access::{self, Caller},
	error::is_unique_violation,
	Database,
};

use super::{model, Error, RouteError};

pub async fn fetch_active_config(
	database: &Database,
	admin_user_id: &str,
) -> Result<Option<model::Config>, sqlx::Error> {
	sqlx::query_as::<_, model::Config>(
		r#"
			SELECT * FROM config
			WHERE admin_user_id = ? AND active = 1
			ORDER BY updated_at DESC
			LIMIT 1
		"#,
	)
	.bind(admin_user_id)
	.fetch_optional(database)
	.await
}

/// Publishes a new config revision for the caller and makes it the active one.
///
/// The previous revision is deactivated and the new one inserted in a single
/// transaction, so readers always see exactly one active revision once the
/// first has been published. `version` is only used when there is no previous
/// revision to carry it from.
pub async fn publish_config(
	database: &Database,
	caller: &Caller,
	input: &model::PublishConfig,
	version: &str,
	now: DateTime<Utc>,
) -> Result<model::Config, RouteError> {
	input.validate()?;
	let admin_user_id = access::authorize_config_write(caller).map_err(Error::Denied)?;

	let mut tx = database.begin().await?;

	// Writing first takes the write lock, so concurrent publishers for the
	// same admin are serialized here.
	let previous = sqlx::query_as::<_, model::Carried>(
		r#"
			UPDATE config SET active = 0, updated_at = ?
			WHERE admin_user_id = ? AND active = 1
			RETURNING version, image_url, favicon_url, footer_html
		"#,
	)
	.bind(now)
	.bind(admin_user_id)
	.fetch_all(&mut *tx)
	.await?
	.into_iter()
	.next();

	let carried = previous.unwrap_or_else(|| model::Carried {
		version: version.to_owned(),
		..Default::default()
	});
	let form = &input.form;

	let config = sqlx::query_as::<_, model::Config>(
		r#"
			INSERT INTO config (
				id, active, version, title, description, image_url, favicon_url,
				footer_html, admin_user_id, created_at, updated_at
			)
			VALUES (?, 1, ?, ?, ?, ?, ?, ?, ?, ?, ?)
			RETURNING *
		"#,
	)
	.bind(&input.id)
	.bind(carried.version)
	.bind(&form.title)
	.bind(&form.description)
	.bind(form.image_url.as_ref().unwrap_or(&carried.image_url))
	.bind(form.favicon_url.as_ref().unwrap_or(&carried.favicon_url))
	.bind(form.footer_html.as_ref().unwrap_or(&carried.footer_html))
	.bind(admin_user_id)
	.bind(now)
	.bind(now)
	.fetch_one(&mut *tx)
	.await
	.map_err(|e| {
		if is_unique_violation(&e) {
			Error::ConfigExists(input.id.clone()).into()
		} else {
			RouteError::from(e)
		}
	})?;

	tx.commit().await?;

	Ok(config)
}
