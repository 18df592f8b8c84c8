use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::identity::errors::StoreError;
use crate::domain::identity::models::DisplayName;
use crate::domain::identity::models::EmailAddress;
use crate::domain::identity::models::Identity;
use crate::domain::identity::models::UserId;
use crate::domain::identity::ports::CredentialRepository;

#[derive(Debug, sqlx::FromRow)]
struct IdentityRow {
    id: Uuid,
    email: String,
    password_hash: String,
    role: String,
    display_name: String,
    active: bool,
    verified: bool,
    created_at: DateTime<Utc>,
}

impl TryFrom<IdentityRow> for Identity {
    type Error = StoreError;

    fn try_from(row: IdentityRow) -> Result<Self, Self::Error> {
        let corrupt = |field: &str, e: String| {
            StoreError::Backend(format!("Corrupt {} for user {}: {}", field, row.id, e))
        };

        Ok(Identity {
            id: UserId(row.id),
            email: EmailAddress::new(row.email.clone())
                .map_err(|e| corrupt("email", e.to_string()))?,
            password_hash: row.password_hash.clone(),
            role: row.role.parse().map_err(|e| corrupt("role", format!("{}", e)))?,
            display_name: DisplayName::new(row.display_name.clone())
                .map_err(|e| corrupt("display name", e.to_string()))?,
            active: row.active,
            verified: row.verified,
            created_at: row.created_at,
        })
    }
}

pub struct PostgresCredentialRepository {
    pool: PgPool,
}

impl PostgresCredentialRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CredentialRepository for PostgresCredentialRepository {
    async fn find_by_email(&self, email: &EmailAddress) -> Result<Option<Identity>, StoreError> {
        let row = sqlx::query_as::<_, IdentityRow>(
            r#"
            SELECT id, email, password_hash, role, display_name, active, verified, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::Backend(e.to_string()))?;

        row.map(Identity::try_from).transpose()
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<Identity>, StoreError> {
        let row = sqlx::query_as::<_, IdentityRow>(
            r#"
            SELECT id, email, password_hash, role, display_name, active, verified, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::Backend(e.to_string()))?;

        row.map(Identity::try_from).transpose()
    }

    async fn insert(&self, identity: Identity) -> Result<Identity, StoreError> {
        sqlx::query(
            r#"
            INSERT INTO users (id, email, password_hash, role, display_name, active, verified, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(identity.id.0)
        .bind(identity.email.as_str())
        .bind(&identity.password_hash)
        .bind(identity.role.as_str())
        .bind(identity.display_name.as_str())
        .bind(identity.active)
        .bind(identity.verified)
        .bind(identity.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_unique_violation() {
                    return StoreError::Duplicate(identity.email.as_str().to_string());
                }
            }
            StoreError::Backend(e.to_string())
        })?;

        Ok(identity)
    }

    async fn update_password_hash(
        &self,
        id: &UserId,
        password_hash: &str,
    ) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET password_hash = $2
            WHERE id = $1
            "#,
        )
        .bind(id.0)
        .bind(password_hash)
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Backend(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::Missing(id.to_string()));
        }

        Ok(())
    }

    async fn update_active_flag(&self, id: &UserId, active: bool) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET active = $2
            WHERE id = $1
            "#,
        )
        .bind(id.0)
        .bind(active)
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Backend(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::Missing(id.to_string()));
        }

        Ok(())
    }
}
