use super::{MembershipChange, PostStore};
use crate::error::Result;
use crate::models::{AuthorSummary, NewPost, Post, PostView};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

const POST_COLUMNS: &str = "id, text, file_url, likes, liked_by, author_id, created_at";

/// PostgreSQL-backed post store
#[derive(Clone)]
pub struct PgPostStore {
    pool: PgPool,
}

impl PgPostStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn exists(&self, post_id: Uuid) -> Result<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM posts WHERE id = $1)")
            .bind(post_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(exists)
    }

    /// Map the result of a conditional UPDATE, probing for existence when no row matched
    async fn membership_result(
        &self,
        post_id: Uuid,
        updated: Option<Post>,
    ) -> Result<MembershipChange> {
        match updated {
            Some(post) => Ok(MembershipChange::Applied(post)),
            None if self.exists(post_id).await? => Ok(MembershipChange::Unchanged),
            None => Ok(MembershipChange::PostMissing),
        }
    }
}

/// Feed row: post columns plus the LEFT JOINed author
#[derive(FromRow)]
struct FeedRow {
    id: Uuid,
    text: Option<String>,
    file_url: String,
    likes: i32,
    liked_by: Vec<Uuid>,
    author_id: Option<Uuid>,
    created_at: DateTime<Utc>,
    author_user_id: Option<Uuid>,
    author_display_name: Option<String>,
}

impl FeedRow {
    fn into_view(self, with_author: bool) -> PostView {
        let author = match (with_author, self.author_user_id) {
            (true, Some(id)) => Some(AuthorSummary {
                id,
                display_name: self.author_display_name,
            }),
            _ => None,
        };

        PostView {
            post: Post {
                id: self.id,
                text: self.text,
                file_url: self.file_url,
                likes: self.likes,
                liked_by: self.liked_by,
                author_id: self.author_id,
                created_at: self.created_at,
            },
            author,
        }
    }
}

#[async_trait]
impl PostStore for PgPostStore {
    async fn insert(&self, new_post: NewPost) -> Result<Post> {
        let post = sqlx::query_as::<_, Post>(&format!(
            r#"
            INSERT INTO posts (id, text, file_url, likes, liked_by, author_id, created_at)
            VALUES ($1, $2, $3, 0, '{{}}', $4, NOW())
            RETURNING {POST_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(new_post.text)
        .bind(new_post.file_url)
        .bind(new_post.author_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(post)
    }

    async fn find_by_id(&self, post_id: Uuid) -> Result<Option<Post>> {
        let post = sqlx::query_as::<_, Post>(&format!(
            "SELECT {POST_COLUMNS} FROM posts WHERE id = $1"
        ))
        .bind(post_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(post)
    }

    async fn find_page(&self, skip: i64, limit: i64, with_author: bool) -> Result<Vec<PostView>> {
        let rows = sqlx::query_as::<_, FeedRow>(
            r#"
            SELECT p.id, p.text, p.file_url, p.likes, p.liked_by, p.author_id, p.created_at,
                   u.id AS author_user_id, u.display_name AS author_display_name
            FROM posts p
            LEFT JOIN users u ON u.id = p.author_id
            ORDER BY p.created_at DESC, p.id DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(skip)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|row| row.into_view(with_author)).collect())
    }

    async fn count(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM posts")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    async fn delete(&self, post_id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(post_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn add_like(&self, post_id: Uuid, user_id: Uuid) -> Result<MembershipChange> {
        // Single conditional statement: membership test, set insert and counter
        // increment happen atomically under the row lock.
        let updated = sqlx::query_as::<_, Post>(&format!(
            r#"
            UPDATE posts
            SET liked_by = array_append(liked_by, $2),
                likes = likes + 1
            WHERE id = $1 AND NOT ($2 = ANY(liked_by))
            RETURNING {POST_COLUMNS}
            "#
        ))
        .bind(post_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        self.membership_result(post_id, updated).await
    }

    async fn remove_like(&self, post_id: Uuid, user_id: Uuid) -> Result<MembershipChange> {
        let updated = sqlx::query_as::<_, Post>(&format!(
            r#"
            UPDATE posts
            SET liked_by = array_remove(liked_by, $2),
                likes = likes - 1
            WHERE id = $1 AND $2 = ANY(liked_by)
            RETURNING {POST_COLUMNS}
            "#
        ))
        .bind(post_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        self.membership_result(post_id, updated).await
    }

    async fn health_check(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
