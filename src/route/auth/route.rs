use axum::{
	extract::State,
	http::{header, StatusCode},
	response::IntoResponse,
	Json,
};
use chrono::Utc;
use uuid::Uuid;

use crate::{extract::Form, password, session, AppState};

use super::{model, query, Error, RouteError};

/// Logs in to an account, returning an associated session cookie.
///
/// Unknown usernames and wrong passwords are reported identically, and both
/// pay for one password verification.
pub async fn login(
	State(state): State<AppState>,
	Form(auth): Form<model::LoginInput>,
) -> Result<impl IntoResponse, RouteError> {
	let user = query::find_by_username(&state.database, &auth.username).await?;
	let stored = user.as_ref().map(|user| user.password_hash.as_str());

	if !password::verify_login(&state.hasher, &auth.password, stored, &state.decoy_hash) {
		return Err(Error::InvalidUsernameOrPassword.into());
	}

	let Some(user) = user else {
		return Err(Error::InvalidUsernameOrPassword.into());
	};

	let token = state.codec.issue(&user.id, Utc::now()).map_err(Error::Token)?;
	let cookie = session::create_cookie(token, state.site.secure_cookies);

	tracing::info!(user_id = %user.id, "user logged in");

	Ok(([(header::SET_COOKIE, cookie.to_string())], Json(user)))
}

/// Logs out by clearing the session cookie.
///
/// The token itself stays valid until it expires.
pub async fn logout() -> impl IntoResponse {
	(
		[(header::SET_COOKIE, session::clear_cookie().to_string())],
		StatusCode::NO_CONTENT,
	)
}

/// Registers a new account, returning an associated session cookie.
pub async fn signup(
	State(state): State<AppState>,
	Form(auth): Form<model::SignupInput>,
) -> Result<impl IntoResponse, RouteError> {
	if !state.site.signup_enabled {
		return Err(Error::SignupDisabled.into());
	}

	if query::username_taken(&state.database, &auth.username).await? {
		return Err(Error::UsernameTaken.into());
	}

	let password_hash =
		password::hash_password(&state.hasher, &auth.password).map_err(Error::Hash)?;
	let now = Utc::now();
	let user = model::User {
		id: Uuid::new_v4().to_string(),
		username: auth.username,
		email: auth.email,
		password_hash,
		created_at: now,
		updated_at: now,
	};

	query::create_user(&state.database, &user).await?;

	let token = state.codec.issue(&user.id, now).map_err(Error::Token)?;
	let cookie = session::create_cookie(token, state.site.secure_cookies);

	tracing::info!(user_id = %user.id, "user signed up");

	Ok(([(header::SET_COOKIE, cookie.to_string())], Json(user)))
}
