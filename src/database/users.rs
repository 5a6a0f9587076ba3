use chrono::{DateTime, Utc};
use sqlx::SqliteExecutor;

use crate::models::{DoctorID, DoctorListing, DoctorProfile, Role, User, UserID};

const USER_COLUMNS: &str = "id, email, name, role, created_at";

#[derive(sqlx::FromRow)]
struct CredentialsRow {
    #[sqlx(flatten)]
    user: User,
    password: String,
}

#[derive(sqlx::FromRow)]
struct DoctorListingRow {
    id: UserID,
    name: String,
    email: String,
    profile_id: Option<DoctorID>,
    specialization: Option<String>,
    experience: Option<i64>,
    bio: Option<String>,
    consultation_fee: Option<f64>,
    is_available: Option<bool>,
}

impl From<DoctorListingRow> for DoctorListing {
    fn from(row: DoctorListingRow) -> Self {
        let doctor_profile = row.profile_id.map(|profile_id| DoctorProfile {
            id: profile_id,
            user_id: row.id,
            specialization: row.specialization,
            experience: row.experience,
            bio: row.bio,
            consultation_fee: row.consultation_fee,
            is_available: row.is_available.unwrap_or(true),
        });

        DoctorListing {
            id: row.id,
            name: row.name,
            email: row.email,
            doctor_profile,
        }
    }
}

pub async fn insert(
    executor: impl SqliteExecutor<'_>,
    email: &str,
    password_hash: &str,
    name: &str,
    role: Role,
    created_at: DateTime<Utc>,
) -> Result<User, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!(
        "INSERT INTO users (email, password, name, role, created_at)
         VALUES (?, ?, ?, ?, ?)
         RETURNING {USER_COLUMNS}"
    ))
    .bind(email)
    .bind(password_hash)
    .bind(name)
    .bind(role)
    .bind(created_at)
    .fetch_one(executor)
    .await
}

pub async fn find(
    executor: impl SqliteExecutor<'_>,
    id: UserID,
) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?"))
        .bind(id)
        .fetch_optional(executor)
        .await
}

pub async fn email_exists(
    executor: impl SqliteExecutor<'_>,
    email: &str,
) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM users WHERE email = ?)")
        .bind(email)
        .fetch_one(executor)
        .await
}

/// The user and its stored password hash, for login only
pub async fn find_credentials(
    executor: impl SqliteExecutor<'_>,
    email: &str,
) -> Result<Option<(User, String)>, sqlx::Error> {
    let row = sqlx::query_as::<_, CredentialsRow>(&format!(
        "SELECT {USER_COLUMNS}, password FROM users WHERE email = ?"
    ))
    .bind(email)
    .fetch_optional(executor)
    .await?;

    Ok(row.map(|row| (row.user, row.password)))
}

pub async fn update_name(
    executor: impl SqliteExecutor<'_>,
    id: UserID,
    name: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE users SET name = ? WHERE id = ?")
        .bind(name)
        .bind(id)
        .execute(executor)
        .await?;
    Ok(())
}

/// Every doctor with its public profile. Passwords are never selected.
pub async fn list_doctors(
    executor: impl SqliteExecutor<'_>,
) -> Result<Vec<DoctorListing>, sqlx::Error> {
    let rows = sqlx::query_as::<_, DoctorListingRow>(
        "SELECT u.id, u.name, u.email,
                dp.id AS profile_id, dp.specialization, dp.experience, dp.bio,
                dp.consultation_fee, dp.is_available
         FROM users u
         LEFT JOIN doctor_profiles dp ON dp.user_id = u.id
         WHERE u.role = ?
         ORDER BY u.name, u.id",
    )
    .bind(Role::Doctor)
    .fetch_all(executor)
    .await?;

    Ok(rows.into_iter().map(DoctorListing::from).collect())
}
