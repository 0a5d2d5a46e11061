pub use crate::route::model::Paginate;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{
	model::{AuthorRelation, RelationKind},
	render::Renderer,
	route::model::{is_checked, validate_identifier},
};

/// A single post as stored, with its authorship joined in.
#[derive(Debug, Clone)]
pub struct Post {
	pub id: String,
	pub title: String,
	/// The raw Markdown source.
	pub content: String,
	pub draft: bool,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
	pub relation: Option<AuthorRelation>,
}

/// A row of `posts` left-joined with its relation and the related user.
#[derive(sqlx::FromRow)]
pub struct PostRow {
	pub id: String,
	pub title: String,
	pub content: String,
	pub draft: bool,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
	pub user_id: Option<String>,
	pub relation_type: Option<String>,
	pub username: Option<String>,
}

impl From<PostRow> for Post {
	fn from(row: PostRow) -> Self {
		let relation = row.user_id.zip(row.relation_type).and_then(|(user_id, kind)| {
			Some(AuthorRelation {
				user_id,
				kind: RelationKind::parse(&kind)?,
				username: row.username,
			})
		});

		Self {
			id: row.id,
			title: row.title,
			content: row.content,
			draft: row.draft,
			created_at: row.created_at,
			updated_at: row.updated_at,
			relation,
		}
	}
}

/// A post ready to be shown to visitors.
///
/// The title is plain text and the content is sanitized HTML.
#[derive(Debug, Serialize, Deserialize)]
pub struct PostView {
	pub id: String,
	pub title: String,
	pub content: String,
	pub draft: bool,
	pub author: Option<String>,
	/// The creation date, as `YYYY-MM-DD`.
	pub created_at: String,
}

impl PostView {
	pub fn render(post: Post, renderer: &Renderer) -> Self {
		let author = post
			.relation
			.filter(|relation| relation.kind == RelationKind::Author)
			.and_then(|relation| relation.username);

		Self {
			title: renderer.plain_text(&post.title),
			content: renderer.post_body(&post.content),
			id: post.id,
			draft: post.draft,
			author,
			created_at: post.created_at.format("%Y-%m-%d").to_string(),
		}
	}
}

/// A post as its author edits it, with the raw title and Markdown.
#[derive(Debug, Serialize, Deserialize)]
pub struct EditablePost {
	pub id: String,
	pub title: String,
	pub content: String,
	pub draft: bool,
}

impl From<Post> for EditablePost {
	fn from(post: Post) -> Self {
		Self {
			id: post.id,
			title: post.title,
			content: post.content,
			draft: post.draft,
		}
	}
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreatePostInput {
	/// The identifier of the new post, chosen by the client.
	#[validate(custom(function = "validate_identifier"))]
	pub id: String,
	#[validate(length(min = 1))]
	pub title: String,
	/// The content of the post in Markdown format.
	#[validate(length(min = 1))]
	pub content: String,
	/// The draft checkbox.
	#[serde(default)]
	pub draft: Option<String>,
}

impl CreatePostInput {
	pub fn is_draft(&self) -> bool {
		is_checked(self.draft.as_deref())
	}
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdatePostInput {
	#[validate(length(min = 1))]
	pub title: String,
	#[validate(length(min = 1))]
	pub content: String,
	#[serde(default)]
	pub draft: Option<String>,
}

/// An edit of an existing post, combining the path and the form.
#[derive(Debug, Validate)]
pub struct EditPost {
	#[validate(custom(function = "validate_identifier"))]
	pub id: String,
	#[validate(length(min = 1))]
	pub title: String,
	#[validate(length(min = 1))]
	pub content: String,
	pub draft: bool,
}

impl EditPost {
	pub fn new(id: String, input: UpdatePostInput) -> Self {
		Self {
			draft: is_checked(input.draft.as_deref()),
			id,
			title: input.title,
			content: input.content,
		}
	}
}
