//! Role-specific profiles. Appointments, prescriptions, schedules and
//! records reference profile ids, while the API and the tokens speak in
//! user ids: the `*_by_user` lookups bridge the two.

use sqlx::SqliteExecutor;

use crate::models::{
    DoctorProfile, DoctorProfileChanges, PatientProfile, PatientProfileChanges, UserID,
};

const DOCTOR_COLUMNS: &str =
    "id, user_id, specialization, experience, bio, consultation_fee, is_available";
const PATIENT_COLUMNS: &str = "id, user_id, age, gender, address";

pub async fn insert_doctor(
    executor: impl SqliteExecutor<'_>,
    user_id: UserID,
) -> Result<DoctorProfile, sqlx::Error> {
    sqlx::query_as::<_, DoctorProfile>(&format!(
        "INSERT INTO doctor_profiles (user_id) VALUES (?) RETURNING {DOCTOR_COLUMNS}"
    ))
    .bind(user_id)
    .fetch_one(executor)
    .await
}

pub async fn insert_patient(
    executor: impl SqliteExecutor<'_>,
    user_id: UserID,
) -> Result<PatientProfile, sqlx::Error> {
    sqlx::query_as::<_, PatientProfile>(&format!(
        "INSERT INTO patient_profiles (user_id) VALUES (?) RETURNING {PATIENT_COLUMNS}"
    ))
    .bind(user_id)
    .fetch_one(executor)
    .await
}

pub async fn find_doctor_by_user(
    executor: impl SqliteExecutor<'_>,
    user_id: UserID,
) -> Result<Option<DoctorProfile>, sqlx::Error> {
    sqlx::query_as::<_, DoctorProfile>(&format!(
        "SELECT {DOCTOR_COLUMNS} FROM doctor_profiles WHERE user_id = ?"
    ))
    .bind(user_id)
    .fetch_optional(executor)
    .await
}

pub async fn find_patient_by_user(
    executor: impl SqliteExecutor<'_>,
    user_id: UserID,
) -> Result<Option<PatientProfile>, sqlx::Error> {
    sqlx::query_as::<_, PatientProfile>(&format!(
        "SELECT {PATIENT_COLUMNS} FROM patient_profiles WHERE user_id = ?"
    ))
    .bind(user_id)
    .fetch_optional(executor)
    .await
}

/// Overwrites the given fields and returns the profile, if the user has one
pub async fn update_doctor(
    executor: impl SqliteExecutor<'_>,
    user_id: UserID,
    changes: &DoctorProfileChanges,
) -> Result<Option<DoctorProfile>, sqlx::Error> {
    sqlx::query_as::<_, DoctorProfile>(&format!(
        "UPDATE doctor_profiles SET
             specialization   = COALESCE(?, specialization),
             experience       = COALESCE(?, experience),
             bio              = COALESCE(?, bio),
             consultation_fee = COALESCE(?, consultation_fee),
             is_available     = COALESCE(?, is_available)
         WHERE user_id = ?
         RETURNING {DOCTOR_COLUMNS}"
    ))
    .bind(changes.specialization.as_deref())
    .bind(changes.experience)
    .bind(changes.bio.as_deref())
    .bind(changes.consultation_fee)
    .bind(changes.is_available)
    .bind(user_id)
    .fetch_optional(executor)
    .await
}

pub async fn update_patient(
    executor: impl SqliteExecutor<'_>,
    user_id: UserID,
    changes: &PatientProfileChanges,
) -> Result<Option<PatientProfile>, sqlx::Error> {
    sqlx::query_as::<_, PatientProfile>(&format!(
        "UPDATE patient_profiles SET
             age     = COALESCE(?, age),
             gender  = COALESCE(?, gender),
             address = COALESCE(?, address)
         WHERE user_id = ?
         RETURNING {PATIENT_COLUMNS}"
    ))
    .bind(changes.age)
    .bind(changes.gender.as_deref())
    .bind(changes.address.as_deref())
    .bind(user_id)
    .fetch_optional(executor)
    .await
}
