use axum::{
	http::StatusCode,
	routing::{get, post},
	Router,
};

use crate::{error, session::TokenError, AppState};

pub mod model;
pub mod query;
pub mod route;

/// An error that can occur during authentication.
///
/// Note that the messages are presented to the client, so they should not contain
/// sensitive information.
#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("invalid username or password")]
	InvalidUsernameOrPassword,
	#[error("password hashing failed: {0}")]
	Hash(argon2::password_hash::Error),
	#[error("token error: {0}")]
	Token(#[from] TokenError),
	#[error("username already taken")]
	UsernameTaken,
	#[error("sign up has been disabled")]
	SignupDisabled,
}

pub type RouteError = error::RouteError<Error>;

impl From<Error> for RouteError {
	fn from(error: Error) -> Self {
		Self::Route(error)
	}
}

pub fn routes() -> Router<AppState> {
	use route::*;

	Router::new()
		.route("/login", post(login))
		.route("/logout", get(logout))
		.route("/signup", post(signup))
}

impl error::ErrorShape for Error {
	fn status(&self) -> StatusCode {
		match self {
			Self::InvalidUsernameOrPassword => StatusCode::UNAUTHORIZED,
			Self::Hash(..) | Self::Token(..) => StatusCode::INTERNAL_SERVER_ERROR,
			Self::UsernameTaken => StatusCode::CONFLICT,
			Self::SignupDisabled => StatusCode::FORBIDDEN,
		}
	}

	fn errors(&self) -> Vec<error::Message<'_>> {
		match self {
			Self::Hash(..) | Self::Token(..) => Vec::new(),
			_ => vec![error::Message::new(self.to_string())],
		}
	}
}
