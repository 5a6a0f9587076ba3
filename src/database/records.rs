use chrono::{DateTime, Utc};
use sqlx::SqliteExecutor;

use crate::models::{MedicalRecord, PatientID, UserID};

const RECORD_COLUMNS: &str = "id, patient_id, title, description, date, file_url, created_at";

pub async fn insert(
    executor: impl SqliteExecutor<'_>,
    patient_id: PatientID,
    title: &str,
    description: Option<&str>,
    date: DateTime<Utc>,
    file_url: Option<&str>,
    created_at: DateTime<Utc>,
) -> Result<MedicalRecord, sqlx::Error> {
    sqlx::query_as::<_, MedicalRecord>(&format!(
        "INSERT INTO medical_records (patient_id, title, description, date, file_url, created_at)
         VALUES (?, ?, ?, ?, ?, ?)
         RETURNING {RECORD_COLUMNS}"
    ))
    .bind(patient_id)
    .bind(title)
    .bind(description)
    .bind(date)
    .bind(file_url)
    .bind(created_at)
    .fetch_one(executor)
    .await
}

/// Most recent records first
pub async fn list_for_patient(
    executor: impl SqliteExecutor<'_>,
    patient_id: PatientID,
) -> Result<Vec<MedicalRecord>, sqlx::Error> {
    sqlx::query_as::<_, MedicalRecord>(&format!(
        "SELECT {RECORD_COLUMNS} FROM medical_records
         WHERE patient_id = ?
         ORDER BY date DESC, id DESC"
    ))
    .bind(patient_id)
    .fetch_all(executor)
    .await
}

/// User id of the patient whose record points at this file
pub async fn find_file_owner(
    executor: impl SqliteExecutor<'_>,
    file_url: &str,
) -> Result<Option<UserID>, sqlx::Error> {
    sqlx::query_scalar::<_, UserID>(
        "SELECT pp.user_id FROM medical_records r
         JOIN patient_profiles pp ON pp.id = r.patient_id
         WHERE r.file_url = ?
         LIMIT 1",
    )
    .bind(file_url)
    .fetch_optional(executor)
    .await
}
