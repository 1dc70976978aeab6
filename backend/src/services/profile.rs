//! Profile service: the application-level user record

use chrono::{DateTime, Utc};
use serde::Deserialize;
use shared::{Profile, Role};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};

#[derive(Clone)]
pub struct ProfileService {
    db: PgPool,
}

/// Row from the profiles table
#[derive(Debug, FromRow)]
pub struct ProfileRow {
    pub id: Uuid,
    pub email: String,
    pub full_name: Option<String>,
    pub company_name: Option<String>,
    pub role: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl ProfileRow {
    pub fn into_profile(self) -> AppResult<Profile> {
        let role = self
            .role
            .parse::<Role>()
            .map_err(|e| AppError::Internal(e.to_string()))?;

        Ok(Profile {
            id: self.id,
            email: self.email,
            full_name: self.full_name,
            company_name: self.company_name,
            role,
            phone: self.phone,
            address: self.address,
            city: self.city,
            state: self.state,
            zip_code: self.zip_code,
            persisted: true,
            created_at: Some(self.created_at),
        })
    }
}

#[derive(Debug, FromRow)]
struct IdentityRow {
    email: String,
    full_name: Option<String>,
    metadata_role: Option<String>,
}

/// Contact fields a user may change on their own profile
#[derive(Debug, Deserialize)]
pub struct UpdateProfileInput {
    pub full_name: Option<String>,
    pub company_name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
}

const PROFILE_COLUMNS: &str =
    "id, email, full_name, company_name, role, phone, address, city, state, zip_code, created_at";

impl ProfileService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Load a profile, falling back to the identity record when no profile
    /// row exists yet
    pub async fn get_profile(&self, user_id: Uuid) -> AppResult<Profile> {
        let row = sqlx::query_as::<_, ProfileRow>(&format!(
            "SELECT {} FROM profiles WHERE id = $1",
            PROFILE_COLUMNS
        ))
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?;

        if let Some(row) = row {
            return row.into_profile();
        }

        let identity = sqlx::query_as::<_, IdentityRow>(
            "SELECT email, full_name, metadata_role FROM users WHERE id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("User".to_string()))?;

        tracing::debug!(user_id = %user_id, "No profile row, using identity data");

        Ok(Profile::from_identity(
            user_id,
            &identity.email,
            identity.full_name.as_deref(),
            identity
                .metadata_role
                .as_deref()
                .and_then(|r| r.parse::<Role>().ok()),
        ))
    }

    /// Update own contact fields; creates the profile row if it is missing
    pub async fn update_profile(
        &self,
        user_id: Uuid,
        input: UpdateProfileInput,
    ) -> AppResult<Profile> {
        let current = self.get_profile(user_id).await?;

        let row = sqlx::query_as::<_, ProfileRow>(&format!(
            r#"
            INSERT INTO profiles (id, email, full_name, company_name, role, phone, address, city, state, zip_code)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ON CONFLICT (id) DO UPDATE SET
                full_name = COALESCE(EXCLUDED.full_name, profiles.full_name),
                company_name = COALESCE(EXCLUDED.company_name, profiles.company_name),
                phone = COALESCE(EXCLUDED.phone, profiles.phone),
                address = COALESCE(EXCLUDED.address, profiles.address),
                city = COALESCE(EXCLUDED.city, profiles.city),
                state = COALESCE(EXCLUDED.state, profiles.state),
                zip_code = COALESCE(EXCLUDED.zip_code, profiles.zip_code),
                updated_at = NOW()
            RETURNING {}
            "#,
            PROFILE_COLUMNS
        ))
        .bind(user_id)
        .bind(&current.email)
        .bind(input.full_name.or(current.full_name))
        .bind(input.company_name)
        .bind(current.role.as_str())
        .bind(input.phone)
        .bind(input.address)
        .bind(input.city)
        .bind(input.state)
        .bind(input.zip_code)
        .fetch_one(&self.db)
        .await?;

        row.into_profile()
    }

    /// All supplier profiles, for the admin's procurement form
    pub async fn list_suppliers(&self) -> AppResult<Vec<Profile>> {
        let rows = sqlx::query_as::<_, ProfileRow>(&format!(
            "SELECT {} FROM profiles WHERE role = 'supplier' ORDER BY full_name NULLS LAST, email",
            PROFILE_COLUMNS
        ))
        .fetch_all(&self.db)
        .await?;

        rows.into_iter().map(ProfileRow::into_profile).collect()
    }
}
