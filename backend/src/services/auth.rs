//! Authentication service for sign-up, login, token management and
//! account provisioning

use base64::{engine::general_purpose::STANDARD, Engine as _};
use bcrypt::{hash, verify, DEFAULT_COST};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use shared::{validate_email, validate_password, Profile, Role};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::config::{Config, SetupConfig};
use crate::error::{map_unique_violation, AppError, AppResult};
use crate::services::profile::ProfileRow;

/// Authentication service
#[derive(Clone)]
pub struct AuthService {
    db: PgPool,
    jwt_secret: String,
    access_token_expiry: i64,
    refresh_token_expiry: i64,
}

/// Input for self-service sign-up
#[derive(Debug, Deserialize)]
pub struct SignUpInput {
    pub email: String,
    pub password: String,
    pub full_name: Option<String>,
    /// Only `customer` is accepted; omitted means customer
    pub role: Option<Role>,
}

/// Input for admin-created supplier accounts
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSupplierInput {
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub company_name: String,
}

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // User ID
    pub email: String,
    pub role: String,
    pub exp: i64,
    pub iat: i64,
}

/// Authentication tokens
#[derive(Debug, Serialize)]
pub struct AuthTokens {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub role: Role,
}

/// Identity row from the users table
#[derive(Debug, sqlx::FromRow)]
pub struct UserRow {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub full_name: Option<String>,
    pub metadata_role: Option<String>,
    pub is_active: bool,
}

/// Sign an access token for `user_id`
pub fn encode_claims(
    user_id: Uuid,
    email: &str,
    role: Role,
    expires_in: i64,
    secret: &str,
) -> AppResult<String> {
    let now = Utc::now();
    let claims = Claims {
        sub: user_id.to_string(),
        email: email.to_string(),
        role: role.as_str().to_string(),
        exp: (now + Duration::seconds(expires_in)).timestamp(),
        iat: now.timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(format!("Token generation failed: {}", e)))
}

/// Validate an access token and return its claims
pub fn decode_claims(token: &str, secret: &str) -> AppResult<Claims> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| AppError::InvalidToken)
}

/// Advisory lock key held while the admin account is provisioned
const ADMIN_SETUP_LOCK_KEY: i64 = 0x5354_4b4c_4144_4d4e;

fn admin_exists() -> AppError {
    AppError::ValidationError("Admin user already exists".to_string())
}

/// A unique violation while provisioning means another admin won the race
fn map_admin_conflict(err: AppError) -> AppError {
    match err {
        AppError::DatabaseError(db_err) => match map_unique_violation(db_err, "admin") {
            AppError::DuplicateEntry(_) => admin_exists(),
            other => other,
        },
        other => other,
    }
}

/// Self-service sign-up only creates customers; suppliers are created by the admin
fn sign_up_role(requested: Option<Role>) -> AppResult<Role> {
    match requested.unwrap_or(Role::Customer) {
        Role::Customer => Ok(Role::Customer),
        Role::Supplier => Err(AppError::validation(
            "role",
            "Supplier accounts are created by the admin",
        )),
        Role::Admin => Err(AppError::validation(
            "role",
            "Admin accounts cannot be created through sign-up",
        )),
    }
}

/// SHA-256 digest of a refresh token, base64 encoded for storage
pub fn hash_token(token: &str) -> String {
    let digest = Sha256::digest(token.as_bytes());
    STANDARD.encode(digest)
}

impl AuthService {
    /// Create a new AuthService instance
    pub fn new(db: PgPool, config: &Config) -> Self {
        Self {
            db,
            jwt_secret: config.jwt.secret.clone(),
            access_token_expiry: config.jwt.access_token_expiry,
            refresh_token_expiry: config.jwt.refresh_token_expiry,
        }
    }

    /// Register a customer account and sign it in
    pub async fn sign_up(&self, input: SignUpInput) -> AppResult<AuthTokens> {
        let role = sign_up_role(input.role)?;
        Self::validate_credentials(&input.email, &input.password)?;

        let mut tx = self.db.begin().await?;
        let profile = Self::insert_account(
            &mut tx,
            &input.email,
            &input.password,
            input.full_name.as_deref(),
            None,
            role,
        )
        .await
        .map_err(Self::map_duplicate_email)?;
        tx.commit().await?;

        tracing::info!(user_id = %profile.id, role = %role, "Account registered");

        self.issue_tokens(profile.id, &profile.email, role).await
    }

    /// Authenticate user with email and password
    pub async fn login(&self, email: &str, password: &str) -> AppResult<AuthTokens> {
        let user = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, email, password_hash, full_name, metadata_role, is_active
            FROM users
            WHERE lower(email) = lower($1)
            "#,
        )
        .bind(email)
        .fetch_optional(&self.db)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

        if !user.is_active {
            return Err(AppError::Unauthorized("Account is disabled".to_string()));
        }

        let valid = verify(password, &user.password_hash)
            .map_err(|e| AppError::Internal(format!("Password verification failed: {}", e)))?;

        if !valid {
            return Err(AppError::InvalidCredentials);
        }

        sqlx::query("UPDATE users SET last_login_at = NOW() WHERE id = $1")
            .bind(user.id)
            .execute(&self.db)
            .await?;

        let role = self.resolve_role(&user).await?;

        self.issue_tokens(user.id, &user.email, role).await
    }

    /// Refresh access token using refresh token
    pub async fn refresh_token(&self, refresh_token: &str) -> AppResult<AuthTokens> {
        let token_hash = hash_token(refresh_token);

        let user = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT u.id, u.email, u.password_hash, u.full_name, u.metadata_role, u.is_active
            FROM refresh_tokens rt
            JOIN users u ON u.id = rt.user_id
            WHERE rt.token_hash = $1
              AND rt.expires_at > NOW()
              AND rt.revoked_at IS NULL
              AND u.is_active = true
            "#,
        )
        .bind(&token_hash)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Invalid or expired refresh token".to_string()))?;

        self.revoke_refresh_token(refresh_token).await?;

        let role = self.resolve_role(&user).await?;

        self.issue_tokens(user.id, &user.email, role).await
    }

    /// Revoke a refresh token; unknown tokens are ignored
    pub async fn revoke_refresh_token(&self, refresh_token: &str) -> AppResult<()> {
        sqlx::query(
            "UPDATE refresh_tokens SET revoked_at = NOW() WHERE token_hash = $1 AND revoked_at IS NULL",
        )
        .bind(hash_token(refresh_token))
        .execute(&self.db)
        .await?;

        Ok(())
    }

    /// Create a supplier identity and profile on behalf of the admin
    pub async fn create_supplier(&self, input: CreateSupplierInput) -> AppResult<Profile> {
        if input.full_name.trim().is_empty() {
            return Err(AppError::validation("fullName", "Full name is required"));
        }
        if input.company_name.trim().is_empty() {
            return Err(AppError::validation("companyName", "Company name is required"));
        }
        Self::validate_credentials(&input.email, &input.password)?;

        let mut tx = self.db.begin().await?;
        let profile = Self::insert_account(
            &mut tx,
            &input.email,
            &input.password,
            Some(&input.full_name),
            Some(&input.company_name),
            Role::Supplier,
        )
        .await
        .map_err(Self::map_duplicate_email)?;
        tx.commit().await?;

        tracing::info!(user_id = %profile.id, "Supplier account created");

        Ok(profile)
    }

    /// Provision the single admin account from the setup configuration.
    ///
    /// The identity and the profile are written in one transaction, so a
    /// failed profile insert leaves no orphaned identity behind.
    pub async fn create_admin(&self, setup: &SetupConfig) -> AppResult<Profile> {
        let (email, password) = match (&setup.admin_email, &setup.admin_password) {
            (Some(email), Some(password)) if !email.is_empty() && !password.is_empty() => {
                (email, password)
            }
            _ => {
                return Err(AppError::Configuration(
                    "Admin setup credentials are not configured".to_string(),
                ))
            }
        };

        let mut tx = self.db.begin().await?;

        // Serialize concurrent setup calls; the partial unique index on
        // profiles backs this up
        sqlx::query("SELECT pg_advisory_xact_lock($1)")
            .bind(ADMIN_SETUP_LOCK_KEY)
            .execute(&mut *tx)
            .await?;

        let existing = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM profiles WHERE role = 'admin'",
        )
        .fetch_one(&mut *tx)
        .await?;

        if existing > 0 {
            return Err(admin_exists());
        }

        let profile = Self::insert_account(
            &mut tx,
            email,
            password,
            Some(&setup.admin_full_name),
            None,
            Role::Admin,
        )
        .await
        .map_err(|e| {
            tracing::error!("Admin provisioning failed, rolling back identity: {:?}", e);
            map_admin_conflict(e)
        })?;
        tx.commit().await.map_err(|e| map_admin_conflict(e.into()))?;

        tracing::info!(user_id = %profile.id, "Admin account provisioned");

        Ok(profile)
    }

    async fn insert_account(
        tx: &mut Transaction<'_, Postgres>,
        email: &str,
        password: &str,
        full_name: Option<&str>,
        company_name: Option<&str>,
        role: Role,
    ) -> AppResult<Profile> {
        let password_hash = hash(password, DEFAULT_COST)
            .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))?;

        let user_id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO users (email, password_hash, full_name, metadata_role)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(email)
        .bind(&password_hash)
        .bind(full_name)
        .bind(role.as_str())
        .fetch_one(&mut **tx)
        .await?;

        let row = sqlx::query_as::<_, ProfileRow>(
            r#"
            INSERT INTO profiles (id, email, full_name, company_name, role)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, email, full_name, company_name, role, phone, address,
                      city, state, zip_code, created_at
            "#,
        )
        .bind(user_id)
        .bind(email)
        .bind(full_name)
        .bind(company_name)
        .bind(role.as_str())
        .fetch_one(&mut **tx)
        .await?;

        row.into_profile()
    }

    /// Role carried in tokens: the profile role, else the one recorded at sign-up
    async fn resolve_role(&self, user: &UserRow) -> AppResult<Role> {
        let profile_role =
            sqlx::query_scalar::<_, String>("SELECT role FROM profiles WHERE id = $1")
                .bind(user.id)
                .fetch_optional(&self.db)
                .await?;

        let role = profile_role
            .or_else(|| user.metadata_role.clone())
            .and_then(|r| r.parse::<Role>().ok())
            .unwrap_or(Role::Customer);

        Ok(role)
    }

    async fn issue_tokens(&self, user_id: Uuid, email: &str, role: Role) -> AppResult<AuthTokens> {
        let access_token = encode_claims(
            user_id,
            email,
            role,
            self.access_token_expiry,
            &self.jwt_secret,
        )?;

        // Refresh token (simple random token)
        let refresh_token = Uuid::new_v4().to_string();
        self.store_refresh_token(user_id, &refresh_token).await?;

        Ok(AuthTokens {
            access_token,
            refresh_token,
            token_type: "Bearer".to_string(),
            expires_in: self.access_token_expiry,
            role,
        })
    }

    /// Store refresh token in database
    async fn store_refresh_token(&self, user_id: Uuid, token: &str) -> AppResult<()> {
        let expires_at = Utc::now() + Duration::seconds(self.refresh_token_expiry);

        sqlx::query(
            r#"
            INSERT INTO refresh_tokens (user_id, token_hash, expires_at)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(user_id)
        .bind(hash_token(token))
        .bind(expires_at)
        .execute(&self.db)
        .await?;

        Ok(())
    }

    fn validate_credentials(email: &str, password: &str) -> AppResult<()> {
        validate_email(email).map_err(|m| AppError::validation("email", m))?;
        validate_password(password).map_err(|m| AppError::validation("password", m))?;
        Ok(())
    }

    /// Account endpoints report a taken email as a 400 on the email field
    fn map_duplicate_email(err: AppError) -> AppError {
        match err {
            AppError::DatabaseError(sqlx::Error::Database(db_err))
                if db_err.code().as_deref() == Some("23505") =>
            {
                AppError::validation("email", "A user with this email already exists")
            }
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_up_only_creates_customers() {
        assert_eq!(sign_up_role(None).unwrap(), Role::Customer);
        assert_eq!(sign_up_role(Some(Role::Customer)).unwrap(), Role::Customer);

        for role in [Role::Supplier, Role::Admin] {
            match sign_up_role(Some(role)) {
                Err(AppError::Validation { field, .. }) => assert_eq!(field, "role"),
                other => panic!("expected role validation error, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_claims_round_trip() {
        let id = Uuid::new_v4();
        let token = encode_claims(id, "admin@example.com", Role::Admin, 3600, "s3cret").unwrap();
        let claims = decode_claims(&token, "s3cret").unwrap();

        assert_eq!(claims.sub, id.to_string());
        assert_eq!(claims.role, "admin");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_expired_token_rejected() {
        let token =
            encode_claims(Uuid::new_v4(), "a@example.com", Role::Customer, -3600, "k").unwrap();
        assert!(matches!(
            decode_claims(&token, "k"),
            Err(AppError::InvalidToken)
        ));
    }

    #[test]
    fn test_token_hash_is_stable_and_opaque() {
        let token = "4f1c2d9e-0000-4000-8000-000000000000";
        assert_eq!(hash_token(token), hash_token(token));
        assert_ne!(hash_token(token), token);
        // 32-byte digest, base64 encoded
        assert_eq!(hash_token(token).len(), 44);
    }

    #[derive(Debug)]
    struct UniqueViolation;

    impl std::fmt::Display for UniqueViolation {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str("duplicate key value violates unique constraint \"profiles_single_admin\"")
        }
    }

    impl std::error::Error for UniqueViolation {}

    impl sqlx::error::DatabaseError for UniqueViolation {
        fn message(&self) -> &str {
            "duplicate key value violates unique constraint"
        }

        fn code(&self) -> Option<std::borrow::Cow<'_, str>> {
            Some(std::borrow::Cow::Borrowed("23505"))
        }

        fn as_error(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
            self
        }

        fn as_error_mut(&mut self) -> &mut (dyn std::error::Error + Send + Sync + 'static) {
            self
        }

        fn into_error(self: Box<Self>) -> Box<dyn std::error::Error + Send + Sync + 'static> {
            self
        }

        fn kind(&self) -> sqlx::error::ErrorKind {
            sqlx::error::ErrorKind::UniqueViolation
        }
    }

    #[test]
    fn test_concurrent_admin_insert_reports_existing_admin() {
        let err = AppError::DatabaseError(sqlx::Error::Database(Box::new(UniqueViolation)));
        match map_admin_conflict(err) {
            AppError::ValidationError(message) => {
                assert_eq!(message, "Admin user already exists")
            }
            other => panic!("unexpected error: {:?}", other),
        }

        let passthrough = map_admin_conflict(AppError::DatabaseError(sqlx::Error::RowNotFound));
        assert!(matches!(passthrough, AppError::DatabaseError(_)));
    }

    #[test]
    fn test_single_admin_index_migration() {
        let sql = include_str!("../../migrations/0003_single_admin.sql");
        assert!(sql.contains("CREATE UNIQUE INDEX profiles_single_admin"));
        assert!(sql.contains("WHERE role = 'admin'"));
    }

    #[test]
    fn test_validate_credentials() {
        assert!(AuthService::validate_credentials("user@example.com", "password1").is_ok());
        assert!(AuthService::validate_credentials("user", "password1").is_err());
        assert!(AuthService::validate_credentials("user@example.com", "short").is_err());
    }
}
