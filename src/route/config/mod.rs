use std::borrow::Cow;

use axum::{
	http::StatusCode,
	routing::{get, post},
	Router,
};
use serde_json::json;

use crate::{access::Denied, error, AppState};

pub mod model;
pub mod query;
pub mod route;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("config {0} already exists")]
	ConfigExists(String),
	#[error(transparent)]
	Denied(Denied),
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
		.route("/", get(get_config))
		.route("/:id", post(publish_config))
}

impl error::ErrorShape for Error {
	fn status(&self) -> StatusCode {
		match self {
			Self::ConfigExists(..) => StatusCode::CONFLICT,
			Self::Denied(Denied::Anonymous) => StatusCode::UNAUTHORIZED,
			Self::Denied(Denied::NotAuthor) => StatusCode::FORBIDDEN,
		}
	}

	fn errors(&self) -> Vec<error::Message<'_>> {
		match self {
			Self::ConfigExists(config) => vec![error::Message {
				content: "config_exists".into(),
				field: None,
				details: Some(Cow::Owned({
					let mut map = error::Map::new();
					map.insert("config".into(), json!(config));
					map
				})),
			}],
			Self::Denied(denied) => vec![error::Message::new(denied.to_string())],
		}
	}
}

#[cfg(test)]
mod test {
	use crate::test::*;

	#[sqlx::test]
	async fn test_publish_and_read_config(database: Database) {
		let app = server(database);
		let cookie = app
			.post("/signup")
			.form(&json!({ "username": "admin", "password": "hunter2hunter" }))
			.await
			.cookie(session::COOKIE_NAME);

		let page = app
			.get("/config")
			.add_cookie(cookie.clone())
			.await
			.json::<Value>();

		assert_eq!(page["config"], Value::Null);

		let next_id = page["next_id"].as_str().unwrap().to_owned();
		let response = app
			.post(&format!("/config/{next_id}"))
			.add_cookie(cookie.clone())
			.form(&json!({ "title": "My blog", "description": "Words" }))
			.await;

		assert_eq!(response.status_code(), 303);

		let page = app.get("/config").add_cookie(cookie).await.json::<Value>();

		assert_eq!(page["config"]["id"], next_id);
		assert_eq!(page["config"]["title"], "My blog");
		assert_eq!(page["config"]["version"], crate::VERSION);
		assert_ne!(page["next_id"], next_id);
	}

	#[sqlx::test]
	async fn test_config_requires_session(database: Database) {
		let app = server(database);

		assert_eq!(app.get("/config").await.status_code(), 401);

		let response = app
			.post(&format!("/config/{}", post_id()))
			.form(&json!({ "title": "My blog" }))
			.await;

		assert_eq!(response.status_code(), 401);
	}
}
