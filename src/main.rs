#![warn(clippy::pedantic)]

mod access;
mod error;
mod extract;
mod model;
mod password;
mod render;
mod route;
mod session;
mod settings;
#[cfg(test)]
mod test;
mod trace;

use std::{str::FromStr, sync::Arc};

use argon2::Argon2;
use axum::{extract::Request, Router, ServiceExt};
use clap::Parser;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use tower::Layer;
use tower_http::{normalize_path::NormalizePathLayer, trace::TraceLayer};

use crate::{
	render::Renderer,
	session::{TokenCodec, TokenError},
	settings::{Settings, SettingsError},
};

pub type Database = sqlx::Pool<sqlx::Sqlite>;
pub type AppState = State;

/// The version recorded on the first config an admin publishes.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// The shared application state.
///
/// Everything in here is immutable once the server starts, apart from the
/// connection pool.
#[derive(Clone, axum::extract::FromRef)]
pub struct State {
	pub database: Database,
	pub hasher: Argon2<'static>,
	/// Verified against when a login names an unknown user.
	pub decoy_hash: Arc<str>,
	pub codec: Arc<TokenCodec>,
	pub renderer: Arc<Renderer>,
	pub site: Site,
}

/// Site-wide switches taken from the settings.
#[derive(Debug, Clone, Copy)]
pub struct Site {
	pub signup_enabled: bool,
	/// Marks session cookies as `Secure`.
	pub secure_cookies: bool,
}

#[derive(Debug, thiserror::Error)]
enum StartupError {
	#[error(transparent)]
	Settings(#[from] SettingsError),
	#[error(transparent)]
	Token(#[from] TokenError),
	#[error("database error: {0}")]
	Database(#[from] sqlx::Error),
	#[error("migration error: {0}")]
	Migrate(#[from] sqlx::migrate::MigrateError),
	#[error("password hashing failed: {0}")]
	Hash(argon2::password_hash::Error),
	#[error("io error: {0}")]
	Io(#[from] std::io::Error),
}

pub fn app(state: State) -> Router {
	Router::new()
		.merge(route::post::routes())
		.merge(route::auth::routes())
		.nest("/config", route::config::routes())
		.layer(TraceLayer::new_for_http())
		.with_state(state)
}

#[tokio::main]
async fn main() -> Result<(), StartupError> {
	dotenvy::dotenv().ok();

	let settings = Settings::parse();

	trace::init_tracing_subscriber();

	let codec = TokenCodec::new(settings.signing_secret()?.as_bytes())?;

	let options = SqliteConnectOptions::from_str(&settings.database_url)?
		.create_if_missing(true)
		.journal_mode(SqliteJournalMode::Wal);
	let database = SqlitePoolOptions::new().connect_with(options).await?;

	sqlx::migrate!().run(&database).await?;

	let hasher = Argon2::default();
	let decoy_hash = password::decoy_hash(&hasher).map_err(StartupError::Hash)?;

	let state = State {
		database,
		hasher,
		decoy_hash: decoy_hash.into(),
		codec: Arc::new(codec),
		renderer: Arc::new(Renderer::new()),
		site: Site {
			signup_enabled: settings.signup_enabled(),
			secure_cookies: settings.behind_tls,
		},
	};

	let service = NormalizePathLayer::trim_trailing_slash().layer(app(state));
	let listener = tokio::net::TcpListener::bind((settings.address.as_str(), settings.port)).await?;

	tracing::info!(
		address = %settings.address,
		port = settings.port,
		env = ?settings.env,
		signup = settings.signup_enabled(),
		"listening"
	);

	axum::serve(listener, ServiceExt::<Request>::into_make_service(service)).await?;

	Ok(())
}
