/// User model and database operations
///
/// An identity is created at signup, by an admin, by federated sign-in or by
/// seeding, and is never deleted. Username and email are unique
/// (case-insensitive).
///
/// # Schema
///
/// ```sql
/// CREATE TABLE users (
///     id BLOB PRIMARY KEY NOT NULL,
///     username TEXT NOT NULL UNIQUE COLLATE NOCASE,
///     email TEXT NOT NULL UNIQUE COLLATE NOCASE,
///     password_hash TEXT NOT NULL,
///     role TEXT NOT NULL CHECK (role IN ('admin', 'analyst')),
///     name TEXT NOT NULL,
///     avatar_url TEXT,
///     created_at TEXT NOT NULL
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use dqwatch_shared::models::user::{CreateUser, Role, User};
/// use dqwatch_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::in_memory()).await?;
///
/// let user = User::create(&pool, CreateUser {
///     username: "jdoe".to_string(),
///     email: "jdoe@example.com".to_string(),
///     password_hash: "$argon2id$...".to_string(),
///     role: Role::Analyst,
///     name: "John Doe".to_string(),
///     avatar_url: None,
/// }).await?;
///
/// // Login accepts either the username or the email
/// let found = User::find_by_identifier(&pool, "jdoe@example.com").await?;
/// assert_eq!(found.map(|u| u.id), Some(user.id));
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::db::pool::DbPool;

/// Privilege tag carried by every identity
///
/// Variants are declared in ascending privilege order, so the derived `Ord`
/// is the privilege order: `Analyst < Admin`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Reads every dashboard collection and the report export
    Analyst,

    /// Everything an analyst can do, plus user management and system settings
    Admin,
}

impl Role {
    /// Converts role to its wire/database string
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Analyst => "analyst",
            Role::Admin => "admin",
        }
    }

    /// Whether this role grants at least the privileges of `required`
    pub fn satisfies(&self, required: Role) -> bool {
        *self >= required
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stored identity, including the password hash
///
/// Never serialize this type into a response; use [`PublicUser`].
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    /// Unique user ID (UUID v4)
    pub id: Uuid,

    /// Login name, unique (case-insensitive)
    pub username: String,

    /// Email address, unique (case-insensitive)
    pub email: String,

    /// Argon2id password hash in PHC string format
    pub password_hash: String,

    /// Privilege tag
    pub role: Role,

    /// Display name
    pub name: String,

    /// Optional avatar/profile picture URL
    pub avatar_url: Option<String>,

    /// When the identity was created
    pub created_at: DateTime<Utc>,
}

/// Public identity fields returned by the API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub role: Role,
    pub name: String,
    pub avatar_url: Option<String>,
}

impl From<&User> for PublicUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            role: user.role,
            name: user.name.clone(),
            avatar_url: user.avatar_url.clone(),
        }
    }
}

impl From<User> for PublicUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            role: user.role,
            name: user.name,
            avatar_url: user.avatar_url,
        }
    }
}

/// Input for creating a new user
#[derive(Debug, Clone)]
pub struct CreateUser {
    pub username: String,
    pub email: String,

    /// Argon2id password hash (NOT plaintext password!)
    pub password_hash: String,

    pub role: Role,
    pub name: String,
    pub avatar_url: Option<String>,
}

/// Identity asserted by a federated provider, used for upserts
#[derive(Debug, Clone)]
pub struct FederatedProfile {
    pub email: String,
    pub name: String,
    pub avatar_url: Option<String>,
    pub role: Role,

    /// Hash of an unusable random password, used only if a record is created
    pub password_hash: String,
}

const USER_COLUMNS: &str =
    "id, username, email, password_hash, role, name, avatar_url, created_at";

impl User {
    /// Creates a new user in the database
    ///
    /// # Errors
    ///
    /// Returns a database error with a unique violation if the username or
    /// email already exists.
    pub async fn create(pool: &DbPool, data: CreateUser) -> Result<Self, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (id, username, email, password_hash, role, name, avatar_url, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(data.username)
        .bind(data.email)
        .bind(data.password_hash)
        .bind(data.role)
        .bind(data.name)
        .bind(data.avatar_url)
        .bind(Utc::now())
        .fetch_one(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by ID
    pub async fn find_by_id(pool: &DbPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"))
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Finds a user by email address (case-insensitive)
    pub async fn find_by_email(pool: &DbPool, email: &str) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = ?1"
        ))
        .bind(email)
        .fetch_optional(pool)
        .await
    }

    /// Finds a user whose username or email equals `identifier`
    ///
    /// Usernames and emails share one namespace for login purposes; a
    /// username match wins if both exist.
    pub async fn find_by_identifier(
        pool: &DbPool,
        identifier: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            r#"
            SELECT {USER_COLUMNS} FROM users
            WHERE username = ?1 OR email = ?1
            ORDER BY CASE WHEN username = ?1 THEN 0 ELSE 1 END
            LIMIT 1
            "#
        ))
        .bind(identifier)
        .fetch_optional(pool)
        .await
    }

    /// Checks whether a username or email is already registered
    pub async fn exists(pool: &DbPool, username: &str, email: &str) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM users WHERE username = ?1 OR email = ?2)",
        )
        .bind(username)
        .bind(email)
        .fetch_one(pool)
        .await
    }

    /// Checks whether a username is taken
    pub async fn username_taken(pool: &DbPool, username: &str) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM users WHERE username = ?1)")
            .bind(username)
            .fetch_one(pool)
            .await
    }

    /// Lists all users, oldest first
    pub async fn list(pool: &DbPool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY created_at ASC, username ASC"
        ))
        .fetch_all(pool)
        .await
    }

    /// Counts total number of users
    pub async fn count(pool: &DbPool) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(pool)
            .await?;

        Ok(count)
    }

    /// Creates or updates the identity keyed by the provider-asserted email
    ///
    /// An existing record keeps its id, username and password hash; its name,
    /// avatar and role are replaced by the provider profile. A new record gets
    /// a username derived from the email's local part, suffixed when taken.
    pub async fn upsert_federated(
        pool: &DbPool,
        profile: FederatedProfile,
    ) -> Result<Self, sqlx::Error> {
        if let Some(existing) = Self::find_by_email(pool, &profile.email).await? {
            let user = sqlx::query_as::<_, User>(&format!(
                r#"
                UPDATE users SET name = ?2, avatar_url = COALESCE(?3, avatar_url), role = ?4
                WHERE id = ?1
                RETURNING {USER_COLUMNS}
                "#
            ))
            .bind(existing.id)
            .bind(&profile.name)
            .bind(&profile.avatar_url)
            .bind(profile.role)
            .fetch_one(pool)
            .await?;

            return Ok(user);
        }

        let base = username_from_email(&profile.email);
        let mut username = base.clone();
        while Self::username_taken(pool, &username).await? {
            let suffix = Uuid::new_v4().simple().to_string();
            username = format!("{}-{}", base, &suffix[..6]);
        }

        Self::create(
            pool,
            CreateUser {
                username,
                email: profile.email,
                password_hash: profile.password_hash,
                role: profile.role,
                name: profile.name,
                avatar_url: profile.avatar_url,
            },
        )
        .await
    }
}

/// Derives a username candidate from an email address
fn username_from_email(email: &str) -> String {
    let local = email.split('@').next().unwrap_or_default();
    let cleaned: String = local
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        .collect();

    if cleaned.is_empty() {
        "user".to_string()
    } else {
        cleaned.to_lowercase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{
        migrations::run_migrations,
        pool::{create_pool, DatabaseConfig},
    };

    async fn test_pool() -> DbPool {
        let pool = create_pool(DatabaseConfig::in_memory()).await.unwrap();
        run_migrations(&pool).await.unwrap();
        pool
    }

    fn new_user(username: &str, email: &str, role: Role) -> CreateUser {
        CreateUser {
            username: username.to_string(),
            email: email.to_string(),
            password_hash: "hash".to_string(),
            role,
            name: "Test User".to_string(),
            avatar_url: None,
        }
    }

    #[test]
    fn test_role_privilege_order() {
        assert!(Role::Admin > Role::Analyst);
        assert!(Role::Admin.satisfies(Role::Analyst));
        assert!(Role::Admin.satisfies(Role::Admin));
        assert!(Role::Analyst.satisfies(Role::Analyst));
        assert!(!Role::Analyst.satisfies(Role::Admin));
    }

    #[test]
    fn test_role_serde() {
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"admin\"");
        assert_eq!(
            serde_json::from_str::<Role>("\"analyst\"").unwrap(),
            Role::Analyst
        );
        assert!(serde_json::from_str::<Role>("\"superuser\"").is_err());
        assert!(serde_json::from_str::<Role>("\"Admin\"").is_err());
    }

    #[test]
    fn test_username_from_email() {
        assert_eq!(username_from_email("Jane.Doe@example.com"), "jane.doe");
        assert_eq!(username_from_email("a+b@example.com"), "ab");
        assert_eq!(username_from_email("+++@example.com"), "user");
    }

    #[test]
    fn test_public_user_omits_password_hash() {
        let user = User {
            id: Uuid::new_v4(),
            username: "jdoe".to_string(),
            email: "jdoe@example.com".to_string(),
            password_hash: "$argon2id$secret".to_string(),
            role: Role::Analyst,
            name: "John".to_string(),
            avatar_url: None,
            created_at: Utc::now(),
        };

        let json = serde_json::to_value(PublicUser::from(&user)).unwrap();
        assert_eq!(json["username"], "jdoe");
        assert_eq!(json["role"], "analyst");
        assert!(json.get("avatarUrl").is_some());
        assert!(json.get("passwordHash").is_none());
        assert!(json.get("password_hash").is_none());
    }

    #[tokio::test]
    async fn test_create_and_find() {
        let pool = test_pool().await;

        let user = User::create(&pool, new_user("jdoe", "jdoe@example.com", Role::Analyst))
            .await
            .unwrap();

        let by_id = User::find_by_id(&pool, user.id).await.unwrap().unwrap();
        assert_eq!(by_id.username, "jdoe");
        assert_eq!(by_id.role, Role::Analyst);

        let by_name = User::find_by_identifier(&pool, "jdoe").await.unwrap().unwrap();
        assert_eq!(by_name.id, user.id);

        let by_email = User::find_by_identifier(&pool, "JDOE@example.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(by_email.id, user.id);

        assert!(User::find_by_identifier(&pool, "nobody").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_unique_username_and_email() {
        let pool = test_pool().await;

        User::create(&pool, new_user("jdoe", "jdoe@example.com", Role::Analyst))
            .await
            .unwrap();

        let dup_name = User::create(&pool, new_user("JDoe", "other@example.com", Role::Analyst))
            .await
            .unwrap_err();
        assert!(matches!(dup_name, sqlx::Error::Database(ref e) if e.is_unique_violation()));

        let dup_email = User::create(&pool, new_user("other", "jdoe@example.com", Role::Analyst))
            .await
            .unwrap_err();
        assert!(matches!(dup_email, sqlx::Error::Database(ref e) if e.is_unique_violation()));

        assert!(User::exists(&pool, "jdoe", "new@example.com").await.unwrap());
        assert!(User::exists(&pool, "new", "jdoe@example.com").await.unwrap());
        assert!(!User::exists(&pool, "new", "new@example.com").await.unwrap());
        assert_eq!(User::count(&pool).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_upsert_federated_creates_then_updates() {
        let pool = test_pool().await;

        // Occupy the natural username so the upsert has to suffix it
        User::create(&pool, new_user("jane", "jane@other.org", Role::Analyst))
            .await
            .unwrap();

        let profile = FederatedProfile {
            email: "jane@example.com".to_string(),
            name: "Jane".to_string(),
            avatar_url: Some("https://example.com/jane.png".to_string()),
            role: Role::Analyst,
            password_hash: "unusable".to_string(),
        };

        let created = User::upsert_federated(&pool, profile.clone()).await.unwrap();
        assert!(created.username.starts_with("jane-"));
        assert_eq!(created.role, Role::Analyst);

        let updated = User::upsert_federated(
            &pool,
            FederatedProfile {
                name: "Jane Doe".to_string(),
                avatar_url: None,
                role: Role::Admin,
                ..profile
            },
        )
        .await
        .unwrap();

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.username, created.username);
        assert_eq!(updated.name, "Jane Doe");
        assert_eq!(updated.role, Role::Admin);
        assert_eq!(
            updated.avatar_url.as_deref(),
            Some("https://example.com/jane.png")
        );
        assert_eq!(User::count(&pool).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_list_returns_all_users() {
        let pool = test_pool().await;

        User::create(&pool, new_user("a", "a@example.com", Role::Admin))
            .await
            .unwrap();
        User::create(&pool, new_user("b", "b@example.com", Role::Analyst))
            .await
            .unwrap();

        let users = User::list(&pool).await.unwrap();
        assert_eq!(users.len(), 2);
    }
}
