use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use std::collections::{HashMap, HashSet};
use tokio::sync::RwLock;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use super::{
    models::UserModel,
    types::{EditUserInput, UserSortField},
};
use crate::pagination::{like_pattern, matches_query, paged_sql, paginate, PageRequest};
use crate::session::MarkerKind;
use crate::shared::AppError;

/// Trait for user (credential store) operations
#[async_trait]
pub trait UserRepository {
    async fn create_user(&self, user: &UserModel) -> Result<(), AppError>;
    async fn get_user(&self, user_id: Uuid) -> Result<Option<UserModel>, AppError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<UserModel>, AppError>;
    async fn find_by_username(&self, username: &str) -> Result<Option<UserModel>, AppError>;
    async fn update_profile(
        &self,
        user_id: Uuid,
        changes: &EditUserInput,
    ) -> Result<Option<UserModel>, AppError>;
    async fn mark_email_verified(&self, user_id: Uuid) -> Result<bool, AppError>;
    async fn delete_user(&self, user_id: Uuid) -> Result<bool, AppError>;

    /// Current invalidation marker, `None` when the user does not exist
    async fn read_marker(&self, user_id: Uuid) -> Result<Option<i64>, AppError>;

    /// Moves the marker forward and returns the new value
    async fn advance_marker(&self, user_id: Uuid, kind: MarkerKind) -> Result<Option<i64>, AppError>;

    async fn follow(&self, follower_id: Uuid, followed_id: Uuid) -> Result<(), AppError>;
    async fn unfollow(&self, follower_id: Uuid, followed_id: Uuid) -> Result<(), AppError>;
    async fn list_followers(
        &self,
        user_id: Uuid,
        page: &PageRequest<UserSortField>,
    ) -> Result<Vec<UserModel>, AppError>;
    async fn list_following(
        &self,
        user_id: Uuid,
        page: &PageRequest<UserSortField>,
    ) -> Result<Vec<UserModel>, AppError>;
    async fn count_followers(&self, user_id: Uuid) -> Result<i64, AppError>;
    async fn count_following(&self, user_id: Uuid) -> Result<i64, AppError>;
    async fn following_ids(&self, user_id: Uuid) -> Result<Vec<Uuid>, AppError>;

    async fn list_users_by_ids(
        &self,
        ids: &[Uuid],
        page: &PageRequest<UserSortField>,
    ) -> Result<Vec<UserModel>, AppError>;
    async fn search_users(
        &self,
        query: Option<&str>,
        page: &PageRequest<UserSortField>,
    ) -> Result<Vec<UserModel>, AppError>;
}

#[derive(Default)]
struct UserTables {
    users: HashMap<Uuid, UserModel>,
    follows: HashSet<(Uuid, Uuid)>, // (follower, followed)
}

/// In-memory implementation of UserRepository for development and testing
///
/// Data is stored in memory and will be lost when the application restarts.
#[derive(Default)]
pub struct InMemoryUserRepository {
    tables: RwLock<UserTables>,
}

impl InMemoryUserRepository {
    /// Creates a new empty in-memory repository
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current number of users in the repository
    pub async fn user_count(&self) -> usize {
        self.tables.read().await.users.len()
    }

    fn page_of(
        users: Vec<UserModel>,
        page: &PageRequest<UserSortField>,
    ) -> Vec<UserModel> {
        let field = page.sort;
        paginate(users, page, |a, b| field.compare(a, b), |u| u.id)
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    #[instrument(skip(self, user))]
    async fn create_user(&self, user: &UserModel) -> Result<(), AppError> {
        debug!(user_id = %user.id, username = %user.username, "Creating user in memory");

        let mut tables = self.tables.write().await;
        if tables.users.values().any(|u| u.email == user.email) {
            warn!(user_id = %user.id, "Email already exists in memory");
            return Err(AppError::Validation("Email already exists".to_string()));
        }
        if tables.users.values().any(|u| u.username == user.username) {
            warn!(user_id = %user.id, "Username already exists in memory");
            return Err(AppError::Validation("Username already exists".to_string()));
        }
        tables.users.insert(user.id, user.clone());

        Ok(())
    }

    async fn get_user(&self, user_id: Uuid) -> Result<Option<UserModel>, AppError> {
        Ok(self.tables.read().await.users.get(&user_id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserModel>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<UserModel>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| u.username == username).cloned())
    }

    #[instrument(skip(self, changes))]
    async fn update_profile(
        &self,
        user_id: Uuid,
        changes: &EditUserInput,
    ) -> Result<Option<UserModel>, AppError> {
        let mut tables = self.tables.write().await;

        if let Some(username) = &changes.username {
            if tables
                .users
                .values()
                .any(|u| u.id != user_id && &u.username == username)
            {
                return Err(AppError::Validation("Username is taken".to_string()));
            }
        }

        let Some(user) = tables.users.get_mut(&user_id) else {
            return Ok(None);
        };
        if let Some(name) = &changes.name {
            user.name = Some(name.clone());
        }
        if let Some(username) = &changes.username {
            user.username = username.clone();
        }
        user.updated_at = Utc::now();

        Ok(Some(user.clone()))
    }

    async fn mark_email_verified(&self, user_id: Uuid) -> Result<bool, AppError> {
        let mut tables = self.tables.write().await;
        match tables.users.get_mut(&user_id) {
            Some(user) => {
                user.email_verified = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    #[instrument(skip(self))]
    async fn delete_user(&self, user_id: Uuid) -> Result<bool, AppError> {
        let mut tables = self.tables.write().await;
        tables
            .follows
            .retain(|(follower, followed)| *follower != user_id && *followed != user_id);
        Ok(tables.users.remove(&user_id).is_some())
    }

    async fn read_marker(&self, user_id: Uuid) -> Result<Option<i64>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables.users.get(&user_id).map(|u| u.session_marker))
    }

    #[instrument(skip(self))]
    async fn advance_marker(&self, user_id: Uuid, kind: MarkerKind) -> Result<Option<i64>, AppError> {
        let mut tables = self.tables.write().await;
        let Some(user) = tables.users.get_mut(&user_id) else {
            return Ok(None);
        };

        user.session_marker = kind.advance(user.session_marker, Utc::now().timestamp_millis());
        debug!(user_id = %user_id, marker = user.session_marker, "Advanced session marker in memory");
        Ok(Some(user.session_marker))
    }

    async fn follow(&self, follower_id: Uuid, followed_id: Uuid) -> Result<(), AppError> {
        self.tables
            .write()
            .await
            .follows
            .insert((follower_id, followed_id));
        Ok(())
    }

    async fn unfollow(&self, follower_id: Uuid, followed_id: Uuid) -> Result<(), AppError> {
        self.tables
            .write()
            .await
            .follows
            .remove(&(follower_id, followed_id));
        Ok(())
    }

    async fn list_followers(
        &self,
        user_id: Uuid,
        page: &PageRequest<UserSortField>,
    ) -> Result<Vec<UserModel>, AppError> {
        let tables = self.tables.read().await;
        let users = tables
            .follows
            .iter()
            .filter(|(_, followed)| *followed == user_id)
            .filter_map(|(follower, _)| tables.users.get(follower).cloned())
            .collect();
        Ok(Self::page_of(users, page))
    }

    async fn list_following(
        &self,
        user_id: Uuid,
        page: &PageRequest<UserSortField>,
    ) -> Result<Vec<UserModel>, AppError> {
        let tables = self.tables.read().await;
        let users = tables
            .follows
            .iter()
            .filter(|(follower, _)| *follower == user_id)
            .filter_map(|(_, followed)| tables.users.get(followed).cloned())
            .collect();
        Ok(Self::page_of(users, page))
    }

    async fn count_followers(&self, user_id: Uuid) -> Result<i64, AppError> {
        let tables = self.tables.read().await;
        Ok(tables.follows.iter().filter(|(_, f)| *f == user_id).count() as i64)
    }

    async fn count_following(&self, user_id: Uuid) -> Result<i64, AppError> {
        let tables = self.tables.read().await;
        Ok(tables.follows.iter().filter(|(f, _)| *f == user_id).count() as i64)
    }

    async fn following_ids(&self, user_id: Uuid) -> Result<Vec<Uuid>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables
            .follows
            .iter()
            .filter(|(follower, _)| *follower == user_id)
            .map(|(_, followed)| *followed)
            .collect())
    }

    async fn list_users_by_ids(
        &self,
        ids: &[Uuid],
        page: &PageRequest<UserSortField>,
    ) -> Result<Vec<UserModel>, AppError> {
        let tables = self.tables.read().await;
        let users = ids
            .iter()
            .collect::<HashSet<_>>()
            .into_iter()
            .filter_map(|id| tables.users.get(id).cloned())
            .collect();
        Ok(Self::page_of(users, page))
    }

    async fn search_users(
        &self,
        query: Option<&str>,
        page: &PageRequest<UserSortField>,
    ) -> Result<Vec<UserModel>, AppError> {
        let tables = self.tables.read().await;
        let users = tables
            .users
            .values()
            .filter(|u| matches_query(query, &[Some(u.username.as_str()), u.name.as_deref()]))
            .cloned()
            .collect();
        Ok(Self::page_of(users, page))
    }
}

/// PostgreSQL implementation of user repository
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_page(
        &self,
        base: &str,
        user_id: Option<Uuid>,
        page: &PageRequest<UserSortField>,
    ) -> Result<Vec<UserModel>, AppError> {
        let params = usize::from(user_id.is_some());
        let sql = paged_sql(base, params, page.sort.column(), page.direction);

        let mut query = sqlx::query_as::<_, UserModel>(&sql);
        if let Some(user_id) = user_id {
            query = query.bind(user_id);
        }
        let users = query
            .bind(page.from)
            .bind(page.take)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                warn!(error = %e, "Failed to fetch user page from database");
                AppError::from(e)
            })?;
        Ok(users)
    }
}

/// Turns unique-constraint violations into the user-facing duplicate message
fn map_insert_error(error: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db) = &error {
        if db.is_unique_violation() {
            let message = match db.constraint() {
                Some(constraint) if constraint.contains("email") => "Email already exists",
                _ => "Username already exists",
            };
            return AppError::Validation(message.to_string());
        }
    }
    warn!(error = %error, "Failed to write user to database");
    AppError::from(error)
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    #[instrument(skip(self, user))]
    async fn create_user(&self, user: &UserModel) -> Result<(), AppError> {
        debug!(user_id = %user.id, username = %user.username, "Creating user in database");

        sqlx::query(
            "INSERT INTO users (id, username, email, name, password_hash, email_verified, session_marker, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        )
        .bind(user.id)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.name)
        .bind(&user.password_hash)
        .bind(user.email_verified)
        .bind(user.session_marker)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_insert_error)?;

        debug!(user_id = %user.id, "User created successfully in database");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn get_user(&self, user_id: Uuid) -> Result<Option<UserModel>, AppError> {
        let user = sqlx::query_as::<_, UserModel>("SELECT * FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserModel>, AppError> {
        let user = sqlx::query_as::<_, UserModel>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<UserModel>, AppError> {
        let user = sqlx::query_as::<_, UserModel>("SELECT * FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    #[instrument(skip(self, changes))]
    async fn update_profile(
        &self,
        user_id: Uuid,
        changes: &EditUserInput,
    ) -> Result<Option<UserModel>, AppError> {
        let user = sqlx::query_as::<_, UserModel>(
            "UPDATE users SET name = COALESCE($2, name), username = COALESCE($3, username), updated_at = now() \
             WHERE id = $1 RETURNING *",
        )
        .bind(user_id)
        .bind(&changes.name)
        .bind(&changes.username)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| match map_insert_error(e) {
            AppError::Validation(_) => AppError::Validation("Username is taken".to_string()),
            other => other,
        })?;
        Ok(user)
    }

    async fn mark_email_verified(&self, user_id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("UPDATE users SET email_verified = TRUE WHERE id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self))]
    async fn delete_user(&self, user_id: Uuid) -> Result<bool, AppError> {
        // follows, recipes and saves cascade
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                warn!(error = %e, user_id = %user_id, "Failed to delete user from database");
                AppError::from(e)
            })?;
        Ok(result.rows_affected() > 0)
    }

    async fn read_marker(&self, user_id: Uuid) -> Result<Option<i64>, AppError> {
        let marker = sqlx::query_scalar::<_, i64>("SELECT session_marker FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(marker)
    }

    #[instrument(skip(self))]
    async fn advance_marker(&self, user_id: Uuid, kind: MarkerKind) -> Result<Option<i64>, AppError> {
        let query = match kind {
            MarkerKind::Counter => sqlx::query_scalar::<_, i64>(
                "UPDATE users SET session_marker = session_marker + 1 WHERE id = $1 RETURNING session_marker",
            )
            .bind(user_id),
            MarkerKind::Timestamp => sqlx::query_scalar::<_, i64>(
                "UPDATE users SET session_marker = GREATEST($2, session_marker + 1) WHERE id = $1 RETURNING session_marker",
            )
            .bind(user_id)
            .bind(Utc::now().timestamp_millis()),
        };

        let marker = query.fetch_optional(&self.pool).await.map_err(|e| {
            warn!(error = %e, user_id = %user_id, "Failed to advance session marker");
            AppError::from(e)
        })?;
        Ok(marker)
    }

    async fn follow(&self, follower_id: Uuid, followed_id: Uuid) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO follows (follower_id, followed_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(follower_id)
        .bind(followed_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn unfollow(&self, follower_id: Uuid, followed_id: Uuid) -> Result<(), AppError> {
        sqlx::query("DELETE FROM follows WHERE follower_id = $1 AND followed_id = $2")
            .bind(follower_id)
            .bind(followed_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn list_followers(
        &self,
        user_id: Uuid,
        page: &PageRequest<UserSortField>,
    ) -> Result<Vec<UserModel>, AppError> {
        self.fetch_page(
            "SELECT u.* FROM users u JOIN follows f ON f.follower_id = u.id WHERE f.followed_id = $1",
            Some(user_id),
            page,
        )
        .await
    }

    async fn list_following(
        &self,
        user_id: Uuid,
        page: &PageRequest<UserSortField>,
    ) -> Result<Vec<UserModel>, AppError> {
        self.fetch_page(
            "SELECT u.* FROM users u JOIN follows f ON f.followed_id = u.id WHERE f.follower_id = $1",
            Some(user_id),
            page,
        )
        .await
    }

    async fn count_followers(&self, user_id: Uuid) -> Result<i64, AppError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM follows WHERE followed_id = $1")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn count_following(&self, user_id: Uuid) -> Result<i64, AppError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM follows WHERE follower_id = $1")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn following_ids(&self, user_id: Uuid) -> Result<Vec<Uuid>, AppError> {
        let ids = sqlx::query_scalar::<_, Uuid>("SELECT followed_id FROM follows WHERE follower_id = $1")
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(ids)
    }

    async fn list_users_by_ids(
        &self,
        ids: &[Uuid],
        page: &PageRequest<UserSortField>,
    ) -> Result<Vec<UserModel>, AppError> {
        let sql = paged_sql(
            "SELECT * FROM users WHERE id = ANY($1)",
            1,
            page.sort.column(),
            page.direction,
        );
        let users = sqlx::query_as::<_, UserModel>(&sql)
            .bind(ids.to_vec())
            .bind(page.from)
            .bind(page.take)
            .fetch_all(&self.pool)
            .await?;
        Ok(users)
    }

    async fn search_users(
        &self,
        query: Option<&str>,
        page: &PageRequest<UserSortField>,
    ) -> Result<Vec<UserModel>, AppError> {
        let pattern = query
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .map(like_pattern);
        let sql = paged_sql(
            "SELECT * FROM users WHERE ($1::text IS NULL OR username ILIKE $1 OR name ILIKE $1)",
            1,
            page.sort.column(),
            page.direction,
        );
        let users = sqlx::query_as::<_, UserModel>(&sql)
            .bind(pattern)
            .bind(page.from)
            .bind(page.take)
            .fetch_all(&self.pool)
            .await?;
        Ok(users)
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use crate::pagination::Direction;

    /// Test helper functions for creating test data
    mod helpers {
        use super::*;

        pub fn create_test_user(username: &str) -> UserModel {
            UserModel::new(
                username.to_string(),
                format!("{}@example.com", username),
                None,
                "hash".to_string(),
            )
        }
    }

    use helpers::*;

    #[tokio::test]
    async fn test_create_and_get_user() {
        let repo = InMemoryUserRepository::new();
        let user = create_test_user("hiluw");

        repo.create_user(&user).await.unwrap();

        let retrieved = repo.get_user(user.id).await.unwrap().unwrap();
        assert_eq!(retrieved, user);
        assert_eq!(
            repo.find_by_email("hiluw@example.com").await.unwrap().unwrap().id,
            user.id
        );
        assert_eq!(
            repo.find_by_username("hiluw").await.unwrap().unwrap().id,
            user.id
        );
        assert_eq!(repo.user_count().await, 1);
    }

    #[tokio::test]
    async fn test_create_duplicate_user() {
        let repo = InMemoryUserRepository::new();
        let user = create_test_user("hiluw");
        repo.create_user(&user).await.unwrap();

        let mut same_email = create_test_user("other");
        same_email.email = user.email.clone();
        assert!(matches!(
            repo.create_user(&same_email).await,
            Err(AppError::Validation(msg)) if msg == "Email already exists"
        ));

        let same_username = UserModel::new(
            "hiluw".to_string(),
            "else@example.com".to_string(),
            None,
            "hash".to_string(),
        );
        assert!(matches!(
            repo.create_user(&same_username).await,
            Err(AppError::Validation(msg)) if msg == "Username already exists"
        ));
    }

    #[tokio::test]
    async fn test_marker_lifecycle() {
        let repo = InMemoryUserRepository::new();
        let user = create_test_user("dee");
        repo.create_user(&user).await.unwrap();

        assert_eq!(repo.read_marker(user.id).await.unwrap(), Some(0));
        assert_eq!(
            repo.advance_marker(user.id, MarkerKind::Counter).await.unwrap(),
            Some(1)
        );
        assert_eq!(repo.read_marker(user.id).await.unwrap(), Some(1));

        let floor = repo
            .advance_marker(user.id, MarkerKind::Timestamp)
            .await
            .unwrap()
            .unwrap();
        assert!(floor > 1);

        assert_eq!(repo.read_marker(Uuid::new_v4()).await.unwrap(), None);
        assert_eq!(
            repo.advance_marker(Uuid::new_v4(), MarkerKind::Counter)
                .await
                .unwrap(),
            None
        );
    }

    #[tokio::test]
    async fn test_update_profile() {
        let repo = InMemoryUserRepository::new();
        let user = create_test_user("dee");
        let other = create_test_user("lu");
        repo.create_user(&user).await.unwrap();
        repo.create_user(&other).await.unwrap();

        let updated = repo
            .update_profile(
                user.id,
                &EditUserInput {
                    name: Some("Heidi".to_string()),
                    username: None,
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.name.as_deref(), Some("Heidi"));
        assert_eq!(updated.username, "dee");

        let taken = repo
            .update_profile(
                user.id,
                &EditUserInput {
                    name: None,
                    username: Some("lu".to_string()),
                },
            )
            .await;
        assert!(matches!(taken, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_follows_and_delete() {
        let repo = InMemoryUserRepository::new();
        let a = create_test_user("alice");
        let b = create_test_user("bob");
        let c = create_test_user("carol");
        for user in [&a, &b, &c] {
            repo.create_user(user).await.unwrap();
        }

        repo.follow(a.id, b.id).await.unwrap();
        repo.follow(a.id, c.id).await.unwrap();
        repo.follow(c.id, b.id).await.unwrap();
        repo.follow(a.id, b.id).await.unwrap(); // duplicate is a no-op

        assert_eq!(repo.count_following(a.id).await.unwrap(), 2);
        assert_eq!(repo.count_followers(b.id).await.unwrap(), 2);

        let page = PageRequest::new(None, None, UserSortField::Username, Direction::Asc);
        let followers = repo.list_followers(b.id, &page).await.unwrap();
        let names: Vec<&str> = followers.iter().map(|u| u.username.as_str()).collect();
        assert_eq!(names, vec!["alice", "carol"]);

        repo.unfollow(a.id, c.id).await.unwrap();
        assert_eq!(repo.following_ids(a.id).await.unwrap(), vec![b.id]);

        assert!(repo.delete_user(a.id).await.unwrap());
        assert_eq!(repo.count_followers(b.id).await.unwrap(), 1);
        assert!(!repo.delete_user(a.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_search_users() {
        let repo = InMemoryUserRepository::new();
        let mut lu = create_test_user("hiluw");
        lu.name = Some("Lu".to_string());
        let dee = create_test_user("dee");
        repo.create_user(&lu).await.unwrap();
        repo.create_user(&dee).await.unwrap();

        let page = PageRequest::default();
        let found = repo.search_users(Some("LU"), &page).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, lu.id);

        let everyone = repo.search_users(None, &page).await.unwrap();
        assert_eq!(everyone.len(), 2);
    }
}
