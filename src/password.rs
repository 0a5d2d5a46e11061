use argon2::{
	password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
	Argon2,
};
use rand_core::OsRng;

/// Hashes a password with Argon2 and a fresh random salt, returning
/// the PHC string to store.
///
/// The cost parameters are those of the `hasher` and are encoded in the
/// returned string, so verification does not depend on them.
pub fn hash_password(
	hasher: &Argon2,
	password: &str,
) -> Result<String, argon2::password_hash::Error> {
	let salt = SaltString::generate(&mut OsRng);

	Ok(hasher.hash_password(password.as_bytes(), &salt)?.to_string())
}

/// Verifies a password against a stored PHC string.
///
/// Any failure, including a malformed hash, is reported as a mismatch.
pub fn verify_password(hasher: &Argon2, password: &str, hash: &str) -> bool {
	PasswordHash::new(hash)
		.is_ok_and(|parsed| hasher.verify_password(password.as_bytes(), &parsed).is_ok())
}

/// Hashes a random password that no one knows, to stand in for users that
/// do not exist in [`verify_login`].
pub fn decoy_hash(hasher: &Argon2) -> Result<String, argon2::password_hash::Error> {
	hash_password(hasher, SaltString::generate(&mut OsRng).as_str())
}

/// Checks a login attempt against the stored hash of the named user.
///
/// When there is no such user, the password is verified against `decoy`
/// instead and the attempt always fails, so both cases cost one full
/// verification.
pub fn verify_login(hasher: &Argon2, password: &str, stored: Option<&str>, decoy: &str) -> bool {
	let matched = verify_password(hasher, password, stored.unwrap_or(decoy));

	matched && stored.is_some()
}
