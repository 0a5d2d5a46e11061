use axum::{extract::State, response::Redirect, Json};
use chrono::Utc;

use crate::{
	access::{self, Caller},
	extract::{Form, Path, Query},
	route::model::IdInput,
	AppState,
};

use super::{model, query, Error, RouteError};

/// Lists posts, most recently updated first.
///
/// Drafts are only listed for signed-in callers.
pub async fn get_posts(
	State(state): State<AppState>,
	caller: Caller,
	Query(paginate): Query<model::Paginate>,
) -> Result<Json<Vec<model::PostView>>, RouteError> {
	let posts = query::list_posts(&state.database, caller.is_identified(), &paginate).await?;

	Ok(Json(
		posts
			.into_iter()
			.map(|post| model::PostView::render(post, &state.renderer))
			.collect(),
	))
}

/// Returns a single rendered post.
pub async fn get_post(
	State(state): State<AppState>,
	caller: Caller,
	Path(IdInput { id }): Path<IdInput>,
) -> Result<Json<model::PostView>, RouteError> {
	let post = query::fetch_post(&state.database, &id)
		.await?
		.filter(|post| !post.draft || caller.is_identified())
		.ok_or_else(|| Error::UnknownPost(id))?;

	Ok(Json(model::PostView::render(post, &state.renderer)))
}

/// Returns the raw title and Markdown of a post to its author.
pub async fn get_edit_post(
	State(state): State<AppState>,
	caller: Caller,
	Path(IdInput { id }): Path<IdInput>,
) -> Result<Json<model::EditablePost>, RouteError> {
	let post = query::fetch_post(&state.database, &id).await?;
	let relations = post
		.as_ref()
		.and_then(|post| post.relation.clone())
		.into_iter()
		.collect::<Vec<_>>();

	access::authorize_edit(&caller, &relations).map_err(Error::Denied)?;

	let post = post.ok_or(Error::UnknownPost(id))?;

	Ok(Json(post.into()))
}

/// Creates a post authored by the caller and redirects to it.
pub async fn create_post(
	State(state): State<AppState>,
	caller: Caller,
	Form(input): Form<model::CreatePostInput>,
) -> Result<Redirect, RouteError> {
	query::create_post(&state.database, &caller, &input, Utc::now()).await?;

	tracing::info!(post_id = %input.id, user_id = ?caller.user_id(), "post created");

	Ok(Redirect::to(&format!("/posts/{}", input.id)))
}

/// Edits a post and redirects to it. Only its author may do so.
pub async fn update_post(
	State(state): State<AppState>,
	caller: Caller,
	Path(IdInput { id }): Path<IdInput>,
	Form(input): Form<model::UpdatePostInput>,
) -> Result<Redirect, RouteError> {
	let edit = model::EditPost::new(id, input);

	query::edit_post(&state.database, &caller, &edit, Utc::now()).await?;

	tracing::info!(post_id = %edit.id, "post edited");

	Ok(Redirect::to(&format!("/posts/{}", edit.id)))
}
