use std::borrow::Cow;

use clap::{Parser, ValueEnum};

/// Signing secret used in development when none is supplied.
const INSECURE_DEV_SECRET: &str = "unsecure";

pub const SECRET_MIN_LENGTH: usize = 64;
pub const SECRET_MAX_LENGTH: usize = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Environment {
	/// Development: allows signups and an insecure default secret.
	Dev,
	/// Staging.
	Stg,
	/// Production.
	Pro,
}

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
	#[error("no jwt secret defined")]
	MissingSecret,
	#[error("jwt secret must be between 64 and 1024 characters long, got {0}")]
	SecretLength(usize),
}

/// Command-line and environment configuration.
#[derive(Debug, Parser)]
#[command(name = "backyard", about = "A small Markdown blog", long_about = None)]
pub struct Settings {
	/// The environment the server runs in.
	#[arg(long, env = "BACKYARD_ENV", value_enum, default_value_t = Environment::Pro)]
	pub env: Environment,
	/// Allows new users to sign up. Always enabled in development.
	#[arg(long, env = "BACKYARD_ENABLE_SIGNUP")]
	pub enable_signup: bool,
	/// The database to connect to.
	#[arg(long = "db-url", env = "DATABASE_URL", default_value = "sqlite://backyard.db")]
	pub database_url: String,
	/// The secret used to sign session tokens, between 64 and 1024 characters.
	#[arg(long, env = "BACKYARD_JWT_SECRET", hide_env_values = true)]
	pub jwt_secret: Option<String>,
	/// The address to listen on.
	#[arg(long, env = "BACKYARD_ADDRESS", default_value = "127.0.0.1")]
	pub address: String,
	/// The port to listen on.
	#[arg(long, env = "PORT", default_value_t = 8080)]
	pub port: u16,
	/// Declares that TLS is terminated in front of the server, marking cookies
	/// as secure. The server itself only speaks plain HTTP.
	#[arg(long, env = "BACKYARD_BEHIND_TLS")]
	pub behind_tls: bool,
}

impl Settings {
	pub fn signup_enabled(&self) -> bool {
		self.enable_signup || self.env == Environment::Dev
	}

	/// Returns the secret to sign session tokens with.
	///
	/// A supplied secret must have an acceptable length. Without one, only
	/// the development environment starts, using a well-known secret.
	pub fn signing_secret(&self) -> Result<Cow<'_, str>, SettingsError> {
		match self.jwt_secret.as_deref() {
			Some(secret) if !(SECRET_MIN_LENGTH..=SECRET_MAX_LENGTH).contains(&secret.len()) => {
				Err(SettingsError::SecretLength(secret.len()))
			}
			Some(secret) => Ok(Cow::Borrowed(secret)),
			None if self.env == Environment::Dev => {
				tracing::warn!("no jwt secret defined, using an insecure development secret");
				Ok(Cow::Borrowed(INSECURE_DEV_SECRET))
			}
			None => Err(SettingsError::MissingSecret),
		}
	}
}
