//! Decisions about who is calling and what they may change.
//!
//! Nothing in here touches the store; the caller fetches whatever the
//! decision needs beforehand.

use chrono::{DateTime, Utc};

use crate::{
	model::{AuthorRelation, RelationKind},
	session::TokenCodec,
};

/// The identity behind a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Caller {
	/// No valid session; read-only public access.
	Anonymous,
	User(String),
}

impl Caller {
	pub fn user_id(&self) -> Option<&str> {
		match self {
			Self::Anonymous => None,
			Self::User(id) => Some(id),
		}
	}

	pub const fn is_identified(&self) -> bool {
		matches!(self, Self::User(..))
	}
}

/// Why an action was refused. The messages are shown to clients as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Denied {
	#[error("not authenticated")]
	Anonymous,
	#[error("not authorized")]
	NotAuthor,
}

/// Resolves the caller from an optional session token.
///
/// A missing, invalid or expired token makes the caller anonymous.
pub fn identify_caller(codec: &TokenCodec, token: Option<&str>, now: DateTime<Utc>) -> Caller {
	let Some(token) = token else {
		return Caller::Anonymous;
	};

	match codec.validate(token, now) {
		Ok(user_id) => Caller::User(user_id),
		Err(error) => {
			tracing::debug!(%error, "ignoring session token");
			Caller::Anonymous
		}
	}
}

/// Any identified caller may create posts, which they then author.
pub fn authorize_create(caller: &Caller) -> Result<&str, Denied> {
	caller.user_id().ok_or(Denied::Anonymous)
}

/// Any identified caller may publish a config. Configs are always selected
/// by the caller's own id, so this returns the admin id to scope them by.
pub fn authorize_config_write(caller: &Caller) -> Result<&str, Denied> {
	caller.user_id().ok_or(Denied::Anonymous)
}

/// Allows an edit only if `relations`, the relations recorded for the post,
/// name the caller as its author.
///
/// A missing post has no relations, so it is refused the same way as a post
/// written by someone else.
pub fn authorize_edit(caller: &Caller, relations: &[AuthorRelation]) -> Result<(), Denied> {
	let Some(user_id) = caller.user_id() else {
		return Err(Denied::NotAuthor);
	};

	if relations
		.iter()
		.any(|relation| relation.kind == RelationKind::Author && relation.user_id == user_id)
	{
		Ok(())
	} else {
		Err(Denied::NotAuthor)
	}
}

#[cfg(test)]
mod test {
	use chrono::{Duration, Utc};

	use super::*;
	use crate::test::SECRET;

	fn author(user_id: &str) -> AuthorRelation {
		AuthorRelation {
			user_id: user_id.into(),
			kind: RelationKind::Author,
			username: None,
		}
	}

	#[test]
	fn test_identify_caller() {
		let codec = TokenCodec::new(SECRET).unwrap();
		let now = Utc::now();
		let issued = codec.issue("user-1", now).unwrap();

		assert_eq!(
			identify_caller(&codec, Some(&issued.token), now),
			Caller::User("user-1".into())
		);
		assert_eq!(identify_caller(&codec, None, now), Caller::Anonymous);
		assert_eq!(
			identify_caller(&codec, Some("garbage"), now),
			Caller::Anonymous
		);
		assert_eq!(
			identify_caller(&codec, Some(&issued.token), now + Duration::days(8)),
			Caller::Anonymous
		);
	}

	#[test]
	fn test_authorize_edit() {
		let relations = [author("user-1")];

		assert_eq!(
			authorize_edit(&Caller::User("user-1".into()), &relations),
			Ok(())
		);
		assert_eq!(
			authorize_edit(&Caller::User("user-2".into()), &relations),
			Err(Denied::NotAuthor)
		);
		assert_eq!(
			authorize_edit(&Caller::Anonymous, &relations),
			Err(Denied::NotAuthor)
		);
		assert_eq!(
			authorize_edit(&Caller::User("user-1".into()), &[]),
			Err(Denied::NotAuthor)
		);
	}

	#[test]
	fn test_authorize_writes() {
		let caller = Caller::User("admin".into());

		assert_eq!(authorize_config_write(&caller), Ok("admin"));
		assert_eq!(authorize_create(&caller), Ok("admin"));
		assert_eq!(
			authorize_config_write(&Caller::Anonymous),
			Err(Denied::Anonymous)
		);
		assert_eq!(authorize_create(&Caller::Anonymous), Err(Denied::Anonymous));
		assert!(caller.is_identified());
		assert!(!Caller::Anonymous.is_identified());
	}
}
