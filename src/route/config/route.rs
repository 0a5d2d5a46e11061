use axum::{extract::State, response::Redirect, Json};
use chrono::Utc;
use uuid::Uuid;

use crate::{
	access::Caller,
	extract::{Form, Path, Session},
	route::model::IdInput,
	AppState, Database, VERSION,
};

use super::{model, query, RouteError};

/// Returns the caller's active config, and a fresh id to publish the next
/// revision under.
pub async fn get_config(
	State(database): State<Database>,
	session: Session,
) -> Result<Json<model::ConfigPage>, RouteError> {
	let config = query::fetch_active_config(&database, &session.user_id).await?;

	Ok(Json(model::ConfigPage {
		next_id: Uuid::new_v4(),
		config,
	}))
}

/// Publishes a new revision of the caller's config.
pub async fn publish_config(
	State(state): State<AppState>,
	caller: Caller,
	Path(IdInput { id }): Path<IdInput>,
	Form(form): Form<model::ConfigForm>,
) -> Result<Redirect, RouteError> {
	let input = model::PublishConfig { id, form };
	let config = query::publish_config(&state.database, &caller, &input, VERSION, Utc::now()).await?;

	tracing::info!(config_id = %config.id, admin_user_id = %config.admin_user_id, "config published");

	Ok(Redirect::to("/config"))
}
