//! Stateless session tokens.
//!
//! A session is an HS256-signed JWT carried in the [`COOKIE_NAME`] cookie.
//! Nothing is stored on the server: a token is valid as long as its signature
//! verifies and its expiration has not passed. There is no revocation, so
//! logging out only clears the cookie on the client and a copied token stays
//! usable until it expires.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const COOKIE_NAME: &str = "Authorization";

/// How long an issued token stays valid. Tokens are never refreshed.
pub const TOKEN_LIFETIME_DAYS: i64 = 7;

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
	#[error("the signing secret is empty")]
	EmptySecret,
	#[error("failed to sign token: {0}")]
	Signing(#[source] jsonwebtoken::errors::Error),
	#[error("rejected token: {0}")]
	Rejected(#[from] jsonwebtoken::errors::Error),
	#[error("token expired")]
	Expired,
}

/// The claims carried by a session token.
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
	/// The id of the user the token was issued to.
	sub: String,
	/// Expiration as a unix timestamp in seconds.
	exp: i64,
	/// Makes every issued token unique, even for the same user and instant.
	jti: Uuid,
}

#[derive(Debug, Clone)]
pub struct IssuedToken {
	pub token: String,
	pub expires_at: DateTime<Utc>,
}

/// Signs and validates session tokens with a symmetric secret.
///
/// The secret lives only in this value; construct one per secret.
pub struct TokenCodec {
	encoding: EncodingKey,
	decoding: DecodingKey,
	validation: Validation,
}

impl TokenCodec {
	pub fn new(secret: &[u8]) -> Result<Self, TokenError> {
		if secret.is_empty() {
			return Err(TokenError::EmptySecret);
		}

		// Expiration is checked against the caller's clock in `validate`.
		let mut validation = Validation::new(Algorithm::HS256);
		validation.validate_exp = false;
		validation.set_required_spec_claims(&["exp", "sub"]);

		Ok(Self {
			encoding: EncodingKey::from_secret(secret),
			decoding: DecodingKey::from_secret(secret),
			validation,
		})
	}

	/// Issues a token for `user_id`, valid for [`TOKEN_LIFETIME_DAYS`] from `now`.
	pub fn issue(&self, user_id: &str, now: DateTime<Utc>) -> Result<IssuedToken, TokenError> {
		let expires_at = now + Duration::days(TOKEN_LIFETIME_DAYS);
		let claims = Claims {
			sub: user_id.to_owned(),
			exp: expires_at.timestamp(),
			jti: Uuid::new_v4(),
		};

		let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
			.map_err(TokenError::Signing)?;

		Ok(IssuedToken { token, expires_at })
	}

	/// Validates a token, returning the id of the user it was issued to.
	///
	/// The token is rejected if its signature does not match, its claims are
	/// malformed or missing, or `now` is at or after its expiration.
	pub fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<String, TokenError> {
		let data = decode::<Claims>(token, &self.decoding, &self.validation)?;

		if now.timestamp() >= data.claims.exp {
			return Err(TokenError::Expired);
		}

		Ok(data.claims.sub)
	}
}

/// Creates the session cookie for an issued token.
pub fn create_cookie(token: IssuedToken, secure: bool) -> cookie::Cookie<'static> {
	cookie::Cookie::build((COOKIE_NAME, token.token))
		.secure(secure)
		.http_only(true)
		.same_site(cookie::SameSite::Lax)
		.path("/")
		.max_age(cookie::time::Duration::days(TOKEN_LIFETIME_DAYS))
		.into()
}

/// Creates an empty session cookie used to invalidate a previous one
pub fn clear_cookie() -> cookie::Cookie<'static> {
	cookie::Cookie::build(COOKIE_NAME)
		.http_only(true)
		.path("/")
		.max_age(cookie::time::Duration::ZERO)
		.into()
}
