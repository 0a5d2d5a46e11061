use std::borrow::Cow;

use axum::{
	body::Body,
	extract::rejection,
	http::{Response, StatusCode},
	response::IntoResponse,
	Json,
};
use serde::Serialize;

pub type Map = serde_json::Map<String, serde_json::Value>;

/// A single message presented to the client.
#[derive(Debug, Serialize)]
pub struct Message<'a> {
	pub content: Cow<'a, str>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub field: Option<Cow<'a, str>>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub details: Option<Cow<'a, Map>>,
}

impl<'a> Message<'a> {
	pub fn new(content: impl Into<Cow<'a, str>>) -> Self {
		Self {
			content: content.into(),
			field: None,
			details: None,
		}
	}
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse<'a> {
	pub success: bool,
	pub errors: Vec<Message<'a>>,
}

/// Describes how an error is presented to the client.
///
/// The [`std::fmt::Display`] implementation is only logged, so it may
/// contain sensitive information. Anything returned from [`ErrorShape::errors`]
/// is sent to the client.
pub trait ErrorShape: std::error::Error {
	fn status(&self) -> StatusCode;
	fn errors(&self) -> Vec<Message<'_>>;
}

/// Errors shared by every route.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
	#[error("validation error: {0}")]
	Validation(#[from] validator::ValidationErrors),
	#[error("form error: {0}")]
	Form(#[from] rejection::FormRejection),
	#[error("path error: {0}")]
	Path(#[from] rejection::PathRejection),
	#[error("query error: {0}")]
	Query(#[from] rejection::QueryRejection),
	#[error("database error: {0}")]
	Database(#[from] sqlx::Error),
	#[error("not authenticated")]
	Unauthenticated,
}

impl ErrorShape for AppError {
	fn status(&self) -> StatusCode {
		match self {
			Self::Validation(..) | Self::Form(..) | Self::Path(..) | Self::Query(..) => {
				StatusCode::BAD_REQUEST
			}
			Self::Database(..) => StatusCode::INTERNAL_SERVER_ERROR,
			Self::Unauthenticated => StatusCode::UNAUTHORIZED,
		}
	}

	fn errors(&self) -> Vec<Message<'_>> {
		match self {
			Self::Validation(errors) => errors
				.field_errors()
				.into_iter()
				.flat_map(|(field, errors)| {
					errors.iter().map(move |error| Message {
						content: error.message.clone().unwrap_or_else(|| error.code.clone()),
						field: Some(Cow::Owned(field.to_string())),
						details: None,
					})
				})
				.collect(),
			Self::Form(rejection) => vec![Message::new(rejection.body_text())],
			Self::Path(rejection) => vec![Message::new(rejection.body_text())],
			Self::Query(rejection) => vec![Message::new(rejection.body_text())],
			// Store failures never leak their details.
			Self::Database(..) => Vec::new(),
			Self::Unauthenticated => vec![Message::new(self.to_string())],
		}
	}
}

impl IntoResponse for AppError {
	fn into_response(self) -> Response<Body> {
		respond(&self)
	}
}

/// An error returned from a route, either shared or specific to that route.
#[derive(Debug, thiserror::Error)]
pub enum RouteError<T> {
	#[error(transparent)]
	App(#[from] AppError),
	#[error(transparent)]
	Route(T),
}

impl<T> From<sqlx::Error> for RouteError<T> {
	fn from(error: sqlx::Error) -> Self {
		Self::App(AppError::Database(error))
	}
}

impl<T> From<validator::ValidationErrors> for RouteError<T> {
	fn from(errors: validator::ValidationErrors) -> Self {
		Self::App(AppError::Validation(errors))
	}
}

impl<T: ErrorShape> IntoResponse for RouteError<T> {
	fn into_response(self) -> Response<Body> {
		match &self {
			Self::App(error) => respond(error),
			Self::Route(error) => respond(error),
		}
	}
}

fn respond(error: &dyn ErrorShape) -> Response<Body> {
	let status = error.status();

	if status.is_server_error() {
		tracing::error!(%error, "request failed");
	}

	(
		status,
		Json(ErrorResponse {
			success: false,
			errors: error.errors(),
		}),
	)
		.into_response()
}

/// Returns `true` if the error is a violated uniqueness constraint,
/// such as a duplicate primary key.
pub fn is_unique_violation(error: &sqlx::Error) -> bool {
	matches!(error, sqlx::Error::Database(error) if error.is_unique_violation())
}
