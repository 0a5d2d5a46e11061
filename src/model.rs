use serde::Serialize;

/// The kind of relation between a user and a post.
///
/// Only [`RelationKind::Author`] exists today; the join table leaves room
/// for more.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RelationKind {
	Author,
}

impl RelationKind {
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Author => "AUTHOR",
		}
	}

	pub fn parse(value: &str) -> Option<Self> {
		match value {
			"AUTHOR" => Some(Self::Author),
			_ => None,
		}
	}
}

/// A row of `users_posts`, linking a user to a post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthorRelation {
	pub user_id: String,
	pub kind: RelationKind,
	/// The username of the related user, when it was joined in.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub username: Option<String>,
}
