//! Helpers shared by the tests.
//!
//! Databases come from `#[sqlx::test]`, which creates a fresh SQLite file per
//! test and runs the migrations on it.

use std::sync::Arc;

use argon2::{Algorithm, Argon2, Params, Version};
use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use uuid::Uuid;

pub(crate) use axum_test::TestServer;
pub(crate) use serde_json::{json, Value};

pub(crate) use crate::{access::Caller, session, Database};
use crate::{password, render::Renderer, session::TokenCodec, Site, State};

pub const SECRET: &[u8] = b"a-test-secret-that-is-comfortably-longer-than-sixty-four-characters";

/// Connects to a `#[sqlx::test]` database in WAL mode, as the server does,
/// for tests that run readers and writers side by side.
pub async fn wal_database(options: SqlitePoolOptions, connect: SqliteConnectOptions) -> Database {
	options
		.connect_with(connect.journal_mode(SqliteJournalMode::Wal))
		.await
		.unwrap()
}

/// A hasher with the cheapest parameters argon2 accepts.
pub fn hasher() -> Argon2<'static> {
	Argon2::new(
		Algorithm::Argon2id,
		Version::V0x13,
		Params::new(8, 1, 1, None).unwrap(),
	)
}

pub fn state(database: Database) -> State {
	let hasher = hasher();
	let decoy_hash = password::decoy_hash(&hasher).unwrap();

	State {
		database,
		hasher,
		decoy_hash: decoy_hash.into(),
		codec: Arc::new(TokenCodec::new(SECRET).unwrap()),
		renderer: Arc::new(Renderer::new()),
		site: Site {
			signup_enabled: true,
			secure_cookies: false,
		},
	}
}

pub fn server(database: Database) -> TestServer {
	TestServer::new(crate::app(state(database))).unwrap()
}

/// A fresh identifier that passes validation.
pub fn post_id() -> String {
	Uuid::new_v4().to_string()
}

/// Inserts a user with the password `hunter2hunter`, returning its id.
pub async fn user(database: &Database, username: &str) -> String {
	let id = Uuid::new_v4().to_string();
	let now = Utc::now();
	let hash = password::hash_password(&hasher(), "hunter2hunter").unwrap();

	sqlx::query(
		r#"
			INSERT INTO users (id, username, email, password_hash, created_at, updated_at)
			VALUES (?, ?, NULL, ?, ?, ?)
		"#,
	)
	.bind(&id)
	.bind(username)
	.bind(hash)
	.bind(now)
	.bind(now)
	.execute(database)
	.await
	.unwrap();

	id
}
