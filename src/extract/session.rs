use std::{convert::Infallible, sync::Arc};

use axum::{
	extract::{FromRef, FromRequestParts},
	http::{header, request, HeaderMap},
};
use chrono::Utc;

use crate::{
	access::{self, Caller},
	error::AppError,
	session::{self, TokenCodec},
};

/// Finds the session token among the request's cookies.
fn session_token(headers: &HeaderMap) -> Option<String> {
	headers
		.get_all(header::COOKIE)
		.into_iter()
		.filter_map(|value| value.to_str().ok())
		.flat_map(cookie::Cookie::split_parse)
		.filter_map(Result::ok)
		.find(|cookie| cookie.name() == session::COOKIE_NAME)
		.map(|cookie| cookie.value().to_owned())
}

/// Resolves the caller from the session cookie.
///
/// This never rejects: a request without a valid session is made by
/// [`Caller::Anonymous`], and handlers decide what that caller may do.
///
/// ```rust
/// async fn route(caller: Caller) {
///   println!("{:?}", caller.user_id());
/// }
/// ```
#[axum::async_trait]
impl<S> FromRequestParts<S> for Caller
where
	Arc<TokenCodec>: FromRef<S>,
	S: Sync + Send,
{
	type Rejection = Infallible;

	async fn from_request_parts(
		parts: &mut request::Parts,
		state: &S,
	) -> Result<Self, Self::Rejection> {
		let codec = Arc::<TokenCodec>::from_ref(state);
		let token = session_token(&parts.headers);

		Ok(access::identify_caller(&codec, token.as_deref(), Utc::now()))
	}
}

/// A signed-in user. Requests without a valid session are rejected.
///
/// ```rust
/// async fn route(session: Session) {
///   println!("{}", session.user_id);
/// }
/// ```
#[derive(Debug)]
pub struct Session {
	pub user_id: String,
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for Session
where
	Arc<TokenCodec>: FromRef<S>,
	S: Sync + Send,
{
	type Rejection = AppError;

	async fn from_request_parts(
		parts: &mut request::Parts,
		state: &S,
	) -> Result<Self, Self::Rejection> {
		match Caller::from_request_parts(parts, state).await {
			Ok(Caller::User(user_id)) => Ok(Self { user_id }),
			_ => Err(AppError::Unauthenticated),
		}
	}
}
