use chrono::{DateTime, Utc};
use sqlx::SqliteConnection;
use validator::Validate;

use crate::{
	access::{self, Caller},
	error::is_unique_violation,
	model::{AuthorRelation, RelationKind},
	Database,
};

use super::{model, Error, RouteError};

const SELECT_POST: &str = r#"
	SELECT
		posts.id, posts.title, posts.content, posts.draft, posts.created_at, posts.updated_at,
		users_posts.user_id, users_posts.relation_type, users.username
	FROM posts
	LEFT JOIN users_posts ON users_posts.post_id = posts.id
	LEFT JOIN users ON users.id = users_posts.user_id
"#;

/// Returns posts, most recently updated first. Drafts are only included
/// when `include_drafts` is set.
pub async fn list_posts(
	database: &Database,
	include_drafts: bool,
	paginate: &model::Paginate,
) -> Result<Vec<model::Post>, sqlx::Error> {
	let posts = sqlx::query_as::<_, model::PostRow>(&format!(
		"{SELECT_POST} WHERE (? OR posts.draft = 0) ORDER BY posts.updated_at DESC LIMIT ? OFFSET ?"
	))
	.bind(include_drafts)
	.bind(paginate.limit())
	.bind(paginate.offset())
	.fetch_all(database)
	.await?;

	Ok(posts.into_iter().map(Into::into).collect())
}

pub async fn fetch_post(database: &Database, id: &str) -> Result<Option<model::Post>, sqlx::Error> {
	let post = sqlx::query_as::<_, model::PostRow>(&format!("{SELECT_POST} WHERE posts.id = ?"))
		.bind(id)
		.fetch_optional(database)
		.await?;

	Ok(post.map(Into::into))
}

/// Returns the relations recorded for a post. A missing post has none.
pub async fn fetch_relations(
	connection: &mut SqliteConnection,
	post_id: &str,
) -> Result<Vec<AuthorRelation>, sqlx::Error> {
	let rows = sqlx::query_as::<_, (String, String)>(
		"SELECT user_id, relation_type FROM users_posts WHERE post_id = ?",
	)
	.bind(post_id)
	.fetch_all(connection)
	.await?;

	Ok(rows
		.into_iter()
		.filter_map(|(user_id, kind)| {
			Some(AuthorRelation {
				user_id,
				kind: RelationKind::parse(&kind)?,
				username: None,
			})
		})
		.collect())
}

/// Creates a post authored by the caller.
///
/// The post and its authorship relation are written in one transaction,
/// so a post never exists without its author.
pub async fn create_post(
	database: &Database,
	caller: &Caller,
	input: &model::CreatePostInput,
	now: DateTime<Utc>,
) -> Result<(), RouteError> {
	input.validate()?;
	let user_id = access::authorize_create(caller).map_err(Error::Denied)?;

	let mut tx = database.begin().await?;

	sqlx::query(
		r#"
			INSERT INTO posts (id, title, content, draft, created_at, updated_at)
			VALUES (?, ?, ?, ?, ?, ?)
		"#,
	)
	.bind(&input.id)
	.bind(&input.title)
	.bind(&input.content)
	.bind(input.is_draft())
	.bind(now)
	.bind(now)
	.execute(&mut *tx)
	.await
	.map_err(|e| {
		if is_unique_violation(&e) {
			Error::PostExists(input.id.clone()).into()
		} else {
			RouteError::from(e)
		}
	})?;

	sqlx::query(
		r#"
			INSERT INTO users_posts (user_id, post_id, relation_type, created_at, updated_at)
			VALUES (?, ?, ?, ?, ?)
		"#,
	)
	.bind(user_id)
	.bind(&input.id)
	.bind(RelationKind::Author.as_str())
	.bind(now)
	.bind(now)
	.execute(&mut *tx)
	.await?;

	tx.commit().await?;

	Ok(())
}

/// Edits a post on behalf of its author.
///
/// Anyone else, including for a post that does not exist, is refused and the
/// transaction is rolled back without changing the post.
pub async fn edit_post(
	database: &Database,
	caller: &Caller,
	input: &model::EditPost,
	now: DateTime<Utc>,
) -> Result<(), RouteError> {
	input.validate()?;

	let mut tx = database.begin().await?;

	// Writing first takes the write lock, so the relations read below cannot
	// be outdated by a concurrent commit. A read first would pin a snapshot
	// that SQLite refuses to upgrade once another writer commits.
	sqlx::query("UPDATE posts SET updated_at = updated_at WHERE id = ?")
		.bind(&input.id)
		.execute(&mut *tx)
		.await?;

	let relations = fetch_relations(&mut tx, &input.id).await?;
	access::authorize_edit(caller, &relations).map_err(Error::Denied)?;

	sqlx::query("UPDATE posts SET title = ?, content = ?, draft = ?, updated_at = ? WHERE id = ?")
		.bind(&input.title)
		.bind(&input.content)
		.bind(input.draft)
		.bind(now)
		.bind(&input.id)
		.execute(&mut *tx)
		.await?;

	tx.commit().await?;

	Ok(())
}
