use crate::{error::is_unique_violation, Database};

use super::{model, Error, RouteError};

/// Fast path for a friendly error. The unique constraint on `users.username`
/// is what actually decides, see [`create_user`].
pub async fn username_taken(database: &Database, username: &str) -> Result<bool, sqlx::Error> {
	let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE username = ?")
		.bind(username)
		.fetch_one(database)
		.await?;

	Ok(count != 0)
}

pub async fn find_by_username(
	database: &Database,
	username: &str,
) -> Result<Option<model::User>, sqlx::Error> {
	sqlx::query_as::<_, model::User>(
		r#"
			SELECT id, username, email, password_hash, created_at, updated_at
			FROM users WHERE username = ?
		"#,
	)
	.bind(username)
	.fetch_optional(database)
	.await
}

/// Inserts a user, reporting a duplicate username as [`Error::UsernameTaken`]
/// even when a concurrent signup slipped past [`username_taken`].
pub async fn create_user(database: &Database, user: &model::User) -> Result<(), RouteError> {
	sqlx::query(
		r#"
			INSERT INTO users (id, username, email, password_hash, created_at, updated_at)
			VALUES (?, ?, ?, ?, ?, ?)
		"#,
	)
	.bind(&user.id)
	.bind(&user.username)
	.bind(&user.email)
	.bind(&user.password_hash)
	.bind(user.created_at)
	.bind(user.updated_at)
	.execute(database)
	.await
	.map_err(|e| {
		if is_unique_violation(&e) {
			Error::UsernameTaken.into()
		} else {
			RouteError::from(e)
		}
	})?;

	Ok(())
}

#[cfg(test)]
mod test {
	use chrono::Utc;

	use super::*;
	use crate::test::*;

	fn user(username: &str) -> model::User {
		let now = Utc::now();

		model::User {
			id: uuid::Uuid::new_v4().to_string(),
			username: username.into(),
			email: Some("john@smith.com".into()),
			password_hash: "$argon2id$v=19$m=8,t=1,p=1$c2FsdHNhbHQ$aGFzaA".into(),
			created_at: now,
			updated_at: now,
		}
	}

	#[sqlx::test]
	async fn test_create_and_find_user(database: Database) {
		let john = user("john");

		assert!(!username_taken(&database, "john").await.unwrap());

		create_user(&database, &john).await.unwrap();

		assert!(username_taken(&database, "john").await.unwrap());
		assert!(!username_taken(&database, "John").await.unwrap());

		let found = find_by_username(&database, "john").await.unwrap().unwrap();

		assert_eq!(found.id, john.id);
		assert_eq!(found.email.as_deref(), Some("john@smith.com"));
		assert!(find_by_username(&database, "jane").await.unwrap().is_none());
	}

	#[sqlx::test]
	async fn test_unique_username_is_enforced_by_store(database: Database) {
		create_user(&database, &user("john")).await.unwrap();

		let result = create_user(&database, &user("john")).await;

		assert!(matches!(
			result,
			Err(RouteError::Route(Error::UsernameTaken))
		));
	}
}
