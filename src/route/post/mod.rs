use std::borrow::Cow;

use axum::{http::StatusCode, routing::get, Router};
use serde_json::json;

use crate::{access::Denied, error, AppState};

pub mod model;
pub mod query;
pub mod route;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("unknown post {0}")]
	UnknownPost(String),
	#[error("post {0} already exists")]
	PostExists(String),
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
		.route("/", get(get_posts))
		.route("/post", axum::routing::post(create_post))
		.route("/posts/:id", get(get_post).post(update_post))
		.route("/posts/:id/edit", get(get_edit_post))
}

impl error::ErrorShape for Error {
	fn status(&self) -> StatusCode {
		match self {
			Self::UnknownPost(..) => StatusCode::NOT_FOUND,
			Self::PostExists(..) => StatusCode::CONFLICT,
			Self::Denied(Denied::Anonymous) => StatusCode::UNAUTHORIZED,
			Self::Denied(Denied::NotAuthor) => StatusCode::FORBIDDEN,
		}
	}

	fn errors(&self) -> Vec<error::Message<'_>> {
		match self {
			Self::UnknownPost(post) => vec![post_message("unknown_post", post)],
			Self::PostExists(post) => vec![post_message("post_exists", post)],
			Self::Denied(denied) => vec![error::Message::new(denied.to_string())],
		}
	}
}

fn post_message<'a>(content: &'a str, post: &str) -> error::Message<'a> {
	error::Message {
		content: content.into(),
		field: None,
		details: Some(Cow::Owned({
			let mut map = error::Map::new();
			map.insert("post".into(), json!(post));
			map
		})),
	}
}

#[cfg(test)]
mod test {
	use crate::test::*;

	async fn signup(app: &TestServer, username: &str) -> cookie::Cookie<'static> {
		app.post("/signup")
			.form(&json!({ "username": username, "password": "hunter2hunter" }))
			.await
			.cookie(session::COOKIE_NAME)
	}

	#[sqlx::test]
	async fn test_create_and_read_post(database: Database) {
		let app = server(database);
		let cookie = signup(&app, "john").await;
		let id = post_id();

		let response = app
			.post("/post")
			.add_cookie(cookie)
			.form(&json!({
				"id": id,
				"title": "<i>Hello</i>",
				"content": "# Heading\n\n<script>alert(1)</script>\n\n[link](https://example.com)",
			}))
			.await;

		assert_eq!(response.status_code(), 303);

		let post = app.get(&format!("/posts/{id}")).await.json::<Value>();

		assert_eq!(post["title"], "Hello");
		assert_eq!(post["author"], "john");

		let content = post["content"].as_str().unwrap();

		assert!(content.contains("<h1 id=\"heading\">"));
		assert!(!content.contains("<script"));
		assert!(content.contains("target=\"_blank\""));

		let posts = app.get("/").await.json::<Value>();

		assert_eq!(posts.as_array().unwrap().len(), 1);
	}

	#[sqlx::test]
	async fn test_create_post_anonymous(database: Database) {
		let app = server(database);

		let response = app
			.post("/post")
			.form(&json!({ "id": post_id(), "title": "Hi", "content": "There" }))
			.await;

		assert_eq!(response.status_code(), 401);
	}

	#[sqlx::test]
	async fn test_create_post_short_id(database: Database) {
		let app = server(database);
		let cookie = signup(&app, "john").await;

		let response = app
			.post("/post")
			.add_cookie(cookie)
			.form(&json!({ "id": "abc", "title": "Hi", "content": "There" }))
			.await;

		assert_eq!(response.status_code(), 400);
		assert_eq!(app.get("/").await.json::<Value>(), json!([]));
	}

	#[sqlx::test]
	async fn test_edit_post_by_other_user(database: Database) {
		let app = server(database);
		let author = signup(&app, "john").await;
		let other = signup(&app, "jane").await;
		let id = post_id();

		app.post("/post")
			.add_cookie(author.clone())
			.form(&json!({ "id": id, "title": "Original", "content": "Body" }))
			.await;

		let response = app
			.post(&format!("/posts/{id}"))
			.add_cookie(other.clone())
			.form(&json!({ "title": "Hijacked", "content": "Body" }))
			.await;

		assert_eq!(response.status_code(), 403);

		let response = app
			.get(&format!("/posts/{id}/edit"))
			.add_cookie(other)
			.await;

		assert_eq!(response.status_code(), 403);

		let response = app
			.post(&format!("/posts/{id}"))
			.add_cookie(author.clone())
			.form(&json!({ "title": "Updated", "content": "Body", "draft": "on" }))
			.await;

		assert_eq!(response.status_code(), 303);

		let post = app
			.get(&format!("/posts/{id}/edit"))
			.add_cookie(author)
			.await
			.json::<Value>();

		assert_eq!(post["title"], "Updated");
		assert_eq!(post["draft"], true);
	}

	#[sqlx::test]
	async fn test_drafts_hidden_from_anonymous(database: Database) {
		let app = server(database);
		let cookie = signup(&app, "john").await;
		let id = post_id();

		app.post("/post")
			.add_cookie(cookie.clone())
			.form(&json!({ "id": id, "title": "Draft", "content": "Body", "draft": "on" }))
			.await;

		assert_eq!(app.get("/").await.json::<Value>(), json!([]));
		assert_eq!(
			app.get(&format!("/posts/{id}")).await.status_code(),
			404
		);

		let posts = app.get("/").add_cookie(cookie).await.json::<Value>();

		assert_eq!(posts.as_array().unwrap().len(), 1);
	}

	#[sqlx::test]
	async fn test_unknown_post(database: Database) {
		let app = server(database);

		let response = app.get(&format!("/posts/{}", post_id())).await;

		assert_eq!(response.status_code(), 404);
		assert_eq!(response.json::<Value>()["errors"][0]["content"], "unknown_post");
	}
}
