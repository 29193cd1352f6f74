//! PostgreSQL store backed by an sqlx connection pool
//!
//! Bulk reads use `= ANY($1)` so one batch of keys is always one round trip.
//! Referential rules (cascading deletes, one profile per user, unique edges)
//! are enforced by the schema in `migrations/`; constraint violations are
//! mapped onto [`StoreError`] variants here.

use async_trait::async_trait;
use sqlx::error::ErrorKind;
use sqlx::PgPool;
use uuid::Uuid;

use super::{Store, StoreError, StoreResult};
use crate::models::{
    ChangePost, ChangeProfile, ChangeUser, CreatePost, CreateProfile, CreateUser, MemberType,
    MemberTypeId, Post, Profile, Subscription, User,
};

const USER_COLUMNS: &str = "id, name, balance";
const POST_COLUMNS: &str = "id, title, content, author_id";
const PROFILE_COLUMNS: &str = "id, is_male, year_of_birth, user_id, member_type_id";
const MEMBER_TYPE_COLUMNS: &str = "id, discount, posts_limit_per_month";
const SUBSCRIPTION_COLUMNS: &str = "subscriber_id, author_id";

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// A row a write points at, named by the foreign key guarding it
struct Reference {
    constraint: &'static str,
    entity: &'static str,
    id: String,
}

impl Reference {
    fn new(constraint: &'static str, entity: &'static str, id: impl ToString) -> Self {
        Self {
            constraint,
            entity,
            id: id.to_string(),
        }
    }
}

/// Translate constraint violations into domain errors
///
/// A unique violation is a conflict on `entity`. A foreign-key violation
/// names the referenced row whose constraint failed.
fn write_error(
    err: sqlx::Error,
    entity: &'static str,
    id: impl ToString,
    references: &[Reference],
) -> StoreError {
    let mapped = err.as_database_error().and_then(|db_err| {
        constraint_error(
            db_err.kind(),
            db_err.constraint(),
            entity,
            id.to_string(),
            references,
        )
    });
    mapped.unwrap_or_else(|| StoreError::Database(err))
}

fn constraint_error(
    kind: ErrorKind,
    constraint: Option<&str>,
    entity: &'static str,
    id: String,
    references: &[Reference],
) -> Option<StoreError> {
    match kind {
        ErrorKind::UniqueViolation => Some(StoreError::conflict(entity, id)),
        ErrorKind::ForeignKeyViolation => {
            let reference = references
                .iter()
                .find(|r| constraint == Some(r.constraint))
                .or_else(|| references.first())?;
            Some(StoreError::invalid_reference(reference.entity, &reference.id))
        }
        _ => None,
    }
}

fn member_type_keys(ids: &[MemberTypeId]) -> Vec<String> {
    ids.iter().map(|id| id.as_str().to_string()).collect()
}

#[async_trait]
impl Store for PgStore {
    async fn users_by_ids(&self, ids: &[Uuid]) -> StoreResult<Vec<User>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let sql = format!("SELECT {} FROM users WHERE id = ANY($1)", USER_COLUMNS);
        Ok(sqlx::query_as::<_, User>(&sql)
            .bind(ids)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn all_users(&self) -> StoreResult<Vec<User>> {
        let sql = format!("SELECT {} FROM users ORDER BY name ASC", USER_COLUMNS);
        Ok(sqlx::query_as::<_, User>(&sql).fetch_all(&self.pool).await?)
    }

    async fn posts_by_ids(&self, ids: &[Uuid]) -> StoreResult<Vec<Post>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let sql = format!("SELECT {} FROM posts WHERE id = ANY($1)", POST_COLUMNS);
        Ok(sqlx::query_as::<_, Post>(&sql)
            .bind(ids)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn posts_by_authors(&self, author_ids: &[Uuid]) -> StoreResult<Vec<Post>> {
        if author_ids.is_empty() {
            return Ok(Vec::new());
        }
        let sql = format!(
            "SELECT {} FROM posts WHERE author_id = ANY($1) ORDER BY title ASC",
            POST_COLUMNS
        );
        Ok(sqlx::query_as::<_, Post>(&sql)
            .bind(author_ids)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn all_posts(&self) -> StoreResult<Vec<Post>> {
        let sql = format!("SELECT {} FROM posts ORDER BY title ASC", POST_COLUMNS);
        Ok(sqlx::query_as::<_, Post>(&sql).fetch_all(&self.pool).await?)
    }

    async fn profiles_by_ids(&self, ids: &[Uuid]) -> StoreResult<Vec<Profile>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let sql = format!("SELECT {} FROM profiles WHERE id = ANY($1)", PROFILE_COLUMNS);
        Ok(sqlx::query_as::<_, Profile>(&sql)
            .bind(ids)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn profiles_by_users(&self, user_ids: &[Uuid]) -> StoreResult<Vec<Profile>> {
        if user_ids.is_empty() {
            return Ok(Vec::new());
        }
        let sql = format!(
            "SELECT {} FROM profiles WHERE user_id = ANY($1)",
            PROFILE_COLUMNS
        );
        Ok(sqlx::query_as::<_, Profile>(&sql)
            .bind(user_ids)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn all_profiles(&self) -> StoreResult<Vec<Profile>> {
        let sql = format!("SELECT {} FROM profiles", PROFILE_COLUMNS);
        Ok(sqlx::query_as::<_, Profile>(&sql)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn member_types_by_ids(&self, ids: &[MemberTypeId]) -> StoreResult<Vec<MemberType>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let sql = format!(
            "SELECT {} FROM member_types WHERE id = ANY($1)",
            MEMBER_TYPE_COLUMNS
        );
        Ok(sqlx::query_as::<_, MemberType>(&sql)
            .bind(member_type_keys(ids))
            .fetch_all(&self.pool)
            .await?)
    }

    async fn all_member_types(&self) -> StoreResult<Vec<MemberType>> {
        let sql = format!(
            "SELECT {} FROM member_types ORDER BY id ASC",
            MEMBER_TYPE_COLUMNS
        );
        Ok(sqlx::query_as::<_, MemberType>(&sql)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn subscriptions_by_subscribers(
        &self,
        subscriber_ids: &[Uuid],
    ) -> StoreResult<Vec<Subscription>> {
        if subscriber_ids.is_empty() {
            return Ok(Vec::new());
        }
        let sql = format!(
            "SELECT {} FROM subscribers_on_authors WHERE subscriber_id = ANY($1)",
            SUBSCRIPTION_COLUMNS
        );
        Ok(sqlx::query_as::<_, Subscription>(&sql)
            .bind(subscriber_ids)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn subscriptions_by_authors(
        &self,
        author_ids: &[Uuid],
    ) -> StoreResult<Vec<Subscription>> {
        if author_ids.is_empty() {
            return Ok(Vec::new());
        }
        let sql = format!(
            "SELECT {} FROM subscribers_on_authors WHERE author_id = ANY($1)",
            SUBSCRIPTION_COLUMNS
        );
        Ok(sqlx::query_as::<_, Subscription>(&sql)
            .bind(author_ids)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn create_user(&self, input: CreateUser) -> StoreResult<User> {
        let id = Uuid::new_v4();
        let sql = format!(
            "INSERT INTO users (id, name, balance) VALUES ($1, $2, $3) RETURNING {}",
            USER_COLUMNS
        );
        Ok(sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .bind(&input.name)
            .bind(input.balance)
            .fetch_one(&self.pool)
            .await?)
    }

    async fn update_user(&self, id: Uuid, change: ChangeUser) -> StoreResult<User> {
        let sql = format!(
            r#"UPDATE users
            SET name = COALESCE($2, name), balance = COALESCE($3, balance)
            WHERE id = $1
            RETURNING {}"#,
            USER_COLUMNS
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .bind(change.name)
            .bind(change.balance)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::not_found("user", id))
    }

    async fn delete_user(&self, id: Uuid) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("user", id));
        }
        Ok(())
    }

    async fn create_post(&self, input: CreatePost) -> StoreResult<Post> {
        let id = Uuid::new_v4();
        let sql = format!(
            "INSERT INTO posts (id, title, content, author_id) VALUES ($1, $2, $3, $4) RETURNING {}",
            POST_COLUMNS
        );
        sqlx::query_as::<_, Post>(&sql)
            .bind(id)
            .bind(&input.title)
            .bind(&input.content)
            .bind(input.author_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                write_error(
                    e,
                    "post",
                    id,
                    &[Reference::new("posts_author_id_fkey", "user", input.author_id)],
                )
            })
    }

    async fn update_post(&self, id: Uuid, change: ChangePost) -> StoreResult<Post> {
        let sql = format!(
            r#"UPDATE posts
            SET title = COALESCE($2, title), content = COALESCE($3, content)
            WHERE id = $1
            RETURNING {}"#,
            POST_COLUMNS
        );
        sqlx::query_as::<_, Post>(&sql)
            .bind(id)
            .bind(change.title)
            .bind(change.content)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::not_found("post", id))
    }

    async fn delete_post(&self, id: Uuid) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("post", id));
        }
        Ok(())
    }

    async fn create_profile(&self, input: CreateProfile) -> StoreResult<Profile> {
        let id = Uuid::new_v4();
        let sql = format!(
            r#"INSERT INTO profiles (id, is_male, year_of_birth, user_id, member_type_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}"#,
            PROFILE_COLUMNS
        );
        sqlx::query_as::<_, Profile>(&sql)
            .bind(id)
            .bind(input.is_male)
            .bind(input.year_of_birth)
            .bind(input.user_id)
            .bind(input.member_type_id.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                write_error(
                    e,
                    "profile",
                    input.user_id,
                    &[
                        Reference::new("profiles_user_id_fkey", "user", input.user_id),
                        Reference::new(
                            "profiles_member_type_id_fkey",
                            "member type",
                            input.member_type_id,
                        ),
                    ],
                )
            })
    }

    async fn update_profile(&self, id: Uuid, change: ChangeProfile) -> StoreResult<Profile> {
        let member_type_id = change.member_type_id;
        let sql = format!(
            r#"UPDATE profiles
            SET is_male = COALESCE($2, is_male),
                year_of_birth = COALESCE($3, year_of_birth),
                member_type_id = COALESCE($4, member_type_id)
            WHERE id = $1
            RETURNING {}"#,
            PROFILE_COLUMNS
        );
        sqlx::query_as::<_, Profile>(&sql)
            .bind(id)
            .bind(change.is_male)
            .bind(change.year_of_birth)
            .bind(member_type_id.map(|m| m.as_str()))
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                let member_type = member_type_id.map(|m| m.to_string()).unwrap_or_default();
                write_error(
                    e,
                    "profile",
                    id,
                    &[Reference::new(
                        "profiles_member_type_id_fkey",
                        "member type",
                        member_type,
                    )],
                )
            })?
            .ok_or_else(|| StoreError::not_found("profile", id))
    }

    async fn delete_profile(&self, id: Uuid) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM profiles WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("profile", id));
        }
        Ok(())
    }

    async fn subscribe(&self, subscriber_id: Uuid, author_id: Uuid) -> StoreResult<()> {
        sqlx::query("INSERT INTO subscribers_on_authors (subscriber_id, author_id) VALUES ($1, $2)")
            .bind(subscriber_id)
            .bind(author_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                write_error(
                    e,
                    "subscription",
                    format!("{}->{}", subscriber_id, author_id),
                    &[
                        Reference::new(
                            "subscribers_on_authors_subscriber_id_fkey",
                            "user",
                            subscriber_id,
                        ),
                        Reference::new("subscribers_on_authors_author_id_fkey", "user", author_id),
                    ],
                )
            })?;
        Ok(())
    }

    async fn unsubscribe(&self, subscriber_id: Uuid, author_id: Uuid) -> StoreResult<()> {
        let result = sqlx::query(
            "DELETE FROM subscribers_on_authors WHERE subscriber_id = $1 AND author_id = $2",
        )
        .bind(subscriber_id)
        .bind(author_id)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::not_found(
                "subscription",
                format!("{}->{}", subscriber_id, author_id),
            ));
        }
        Ok(())
    }

    async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn subscription_references(subscriber: &str, author: &str) -> [Reference; 2] {
        [
            Reference::new("subscribers_on_authors_subscriber_id_fkey", "user", subscriber),
            Reference::new("subscribers_on_authors_author_id_fkey", "user", author),
        ]
    }

    #[test]
    fn test_unique_violation_is_a_conflict_on_the_written_row() {
        let err = constraint_error(
            ErrorKind::UniqueViolation,
            Some("profiles_user_id_key"),
            "profile",
            "u1".to_string(),
            &[Reference::new("profiles_user_id_fkey", "user", "u1")],
        );

        assert_matches!(
            err,
            Some(StoreError::Conflict { entity: "profile", ref id }) if id == "u1"
        );
    }

    #[test]
    fn test_foreign_key_violation_names_the_referenced_row() {
        let references = [
            Reference::new("profiles_user_id_fkey", "user", "u1"),
            Reference::new("profiles_member_type_id_fkey", "member type", "BASIC"),
        ];

        let missing_user = constraint_error(
            ErrorKind::ForeignKeyViolation,
            Some("profiles_user_id_fkey"),
            "profile",
            "u1".to_string(),
            &references,
        );
        let missing_tier = constraint_error(
            ErrorKind::ForeignKeyViolation,
            Some("profiles_member_type_id_fkey"),
            "profile",
            "p1".to_string(),
            &references,
        );

        assert_matches!(
            missing_user,
            Some(StoreError::InvalidReference { entity: "user", ref id }) if id == "u1"
        );
        assert_matches!(
            missing_tier,
            Some(StoreError::InvalidReference { entity: "member type", ref id }) if id == "BASIC"
        );
    }

    #[test]
    fn test_subscription_names_the_missing_user() {
        let err = constraint_error(
            ErrorKind::ForeignKeyViolation,
            Some("subscribers_on_authors_author_id_fkey"),
            "subscription",
            "s->a".to_string(),
            &subscription_references("s", "a"),
        );

        assert_eq!(
            err.map(|e| e.to_string()).as_deref(),
            Some("user does not exist: a")
        );
    }

    #[test]
    fn test_unknown_constraint_falls_back_to_first_reference() {
        let err = constraint_error(
            ErrorKind::ForeignKeyViolation,
            None,
            "subscription",
            "s->a".to_string(),
            &subscription_references("s", "a"),
        );

        assert_matches!(err, Some(StoreError::InvalidReference { ref id, .. }) if id == "s");
    }

    #[test]
    fn test_other_failures_are_left_alone() {
        let err = constraint_error(
            ErrorKind::CheckViolation,
            None,
            "user",
            "u1".to_string(),
            &[],
        );

        assert!(err.is_none());
    }
}
