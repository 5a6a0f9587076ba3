use chrono::{DateTime, Utc};
use sqlx::SqliteExecutor;

use super::Scope;
use crate::models::{
    Appointment, AppointmentDetails, AppointmentID, AppointmentStatus, DoctorID, Party, PatientID,
    UserID,
};

const APPOINTMENT_COLUMNS: &str = "id, doctor_id, patient_id, date_time, notes, status, created_at";

const DETAILS_SELECT: &str = "SELECT a.id, a.doctor_id, a.patient_id, a.date_time, a.notes,
        a.status, a.created_at,
        du.id AS doctor_user_id, du.name AS doctor_name, du.email AS doctor_email,
        pu.id AS patient_user_id, pu.name AS patient_name, pu.email AS patient_email
    FROM appointments a
    JOIN doctor_profiles dp ON dp.id = a.doctor_id
    JOIN users du ON du.id = dp.user_id
    JOIN patient_profiles pp ON pp.id = a.patient_id
    JOIN users pu ON pu.id = pp.user_id";

#[derive(sqlx::FromRow)]
struct DetailsRow {
    #[sqlx(flatten)]
    appointment: Appointment,
    doctor_user_id: UserID,
    doctor_name: String,
    doctor_email: String,
    patient_user_id: UserID,
    patient_name: String,
    patient_email: String,
}

impl From<DetailsRow> for AppointmentDetails {
    fn from(row: DetailsRow) -> Self {
        AppointmentDetails {
            appointment: row.appointment,
            doctor: Party {
                user_id: row.doctor_user_id,
                name: row.doctor_name,
                email: row.doctor_email,
            },
            patient: Party {
                user_id: row.patient_user_id,
                name: row.patient_name,
                email: row.patient_email,
            },
        }
    }
}

pub async fn insert(
    executor: impl SqliteExecutor<'_>,
    doctor_id: DoctorID,
    patient_id: PatientID,
    date_time: DateTime<Utc>,
    notes: Option<&str>,
    created_at: DateTime<Utc>,
) -> Result<Appointment, sqlx::Error> {
    sqlx::query_as::<_, Appointment>(&format!(
        "INSERT INTO appointments (doctor_id, patient_id, date_time, notes, status, created_at)
         VALUES (?, ?, ?, ?, ?, ?)
         RETURNING {APPOINTMENT_COLUMNS}"
    ))
    .bind(doctor_id)
    .bind(patient_id)
    .bind(date_time)
    .bind(notes)
    .bind(AppointmentStatus::Pending)
    .bind(created_at)
    .fetch_one(executor)
    .await
}

/// The appointment with both parties, as listed
pub async fn find_details(
    executor: impl SqliteExecutor<'_>,
    id: AppointmentID,
) -> Result<Option<AppointmentDetails>, sqlx::Error> {
    let row = sqlx::query_as::<_, DetailsRow>(&format!("{DETAILS_SELECT} WHERE a.id = ?"))
        .bind(id)
        .fetch_optional(executor)
        .await?;

    Ok(row.map(AppointmentDetails::from))
}

/// Appointments in scope, soonest first
pub async fn list(
    executor: impl SqliteExecutor<'_>,
    scope: Scope,
) -> Result<Vec<AppointmentDetails>, sqlx::Error> {
    let (filter, value) = scope.filter("a");
    let sql = format!("{DETAILS_SELECT} {filter} ORDER BY a.date_time ASC, a.id ASC");

    let mut query = sqlx::query_as::<_, DetailsRow>(&sql);
    if let Some(value) = value {
        query = query.bind(value);
    }

    let rows = query.fetch_all(executor).await?;
    Ok(rows.into_iter().map(AppointmentDetails::from).collect())
}

pub async fn update_status(
    executor: impl SqliteExecutor<'_>,
    id: AppointmentID,
    status: AppointmentStatus,
) -> Result<Option<Appointment>, sqlx::Error> {
    sqlx::query_as::<_, Appointment>(&format!(
        "UPDATE appointments SET status = ? WHERE id = ? RETURNING {APPOINTMENT_COLUMNS}"
    ))
    .bind(status)
    .bind(id)
    .fetch_optional(executor)
    .await
}
