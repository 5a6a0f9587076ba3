use chrono::{DateTime, Utc};
use sqlx::SqliteExecutor;

use crate::models::{
    DoseStatus, MedicineLog, MedicineSchedule, MedicineType, PatientID, ScheduleID, UserID,
};

const SCHEDULE_COLUMNS: &str = "id, patient_id, medicine_name, type, dosage, is_morning, \
    is_afternoon, is_evening, is_night, is_after_food, is_active, created_at";
const LOG_COLUMNS: &str = "id, schedule_id, status, taken_at, scheduled_for, created_at";

/// A schedule with every default already applied
#[derive(Debug, Clone)]
pub struct NewSchedule {
    pub medicine_name: String,
    pub medicine_type: MedicineType,
    pub dosage: Option<String>,
    pub is_morning: bool,
    pub is_afternoon: bool,
    pub is_evening: bool,
    pub is_night: bool,
    pub is_after_food: bool,
}

pub async fn insert_schedule(
    executor: impl SqliteExecutor<'_>,
    patient_id: PatientID,
    schedule: &NewSchedule,
    created_at: DateTime<Utc>,
) -> Result<MedicineSchedule, sqlx::Error> {
    sqlx::query_as::<_, MedicineSchedule>(&format!(
        "INSERT INTO medicine_schedules (patient_id, medicine_name, type, dosage, is_morning,
             is_afternoon, is_evening, is_night, is_after_food, is_active, created_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, 1, ?)
         RETURNING {SCHEDULE_COLUMNS}"
    ))
    .bind(patient_id)
    .bind(&schedule.medicine_name)
    .bind(schedule.medicine_type)
    .bind(schedule.dosage.as_deref())
    .bind(schedule.is_morning)
    .bind(schedule.is_afternoon)
    .bind(schedule.is_evening)
    .bind(schedule.is_night)
    .bind(schedule.is_after_food)
    .bind(created_at)
    .fetch_one(executor)
    .await
}

pub async fn active_schedules(
    executor: impl SqliteExecutor<'_>,
    patient_id: PatientID,
) -> Result<Vec<MedicineSchedule>, sqlx::Error> {
    sqlx::query_as::<_, MedicineSchedule>(&format!(
        "SELECT {SCHEDULE_COLUMNS} FROM medicine_schedules
         WHERE patient_id = ? AND is_active = 1
         ORDER BY created_at ASC, id ASC"
    ))
    .bind(patient_id)
    .fetch_all(executor)
    .await
}

/// User id of the patient the schedule belongs to
pub async fn find_schedule_owner(
    executor: impl SqliteExecutor<'_>,
    id: ScheduleID,
) -> Result<Option<UserID>, sqlx::Error> {
    sqlx::query_scalar::<_, UserID>(
        "SELECT pp.user_id FROM medicine_schedules s
         JOIN patient_profiles pp ON pp.id = s.patient_id
         WHERE s.id = ?",
    )
    .bind(id)
    .fetch_optional(executor)
    .await
}

pub async fn deactivate_schedule(
    executor: impl SqliteExecutor<'_>,
    id: ScheduleID,
) -> Result<Option<MedicineSchedule>, sqlx::Error> {
    sqlx::query_as::<_, MedicineSchedule>(&format!(
        "UPDATE medicine_schedules SET is_active = 0 WHERE id = ? RETURNING {SCHEDULE_COLUMNS}"
    ))
    .bind(id)
    .fetch_optional(executor)
    .await
}

pub async fn insert_log(
    executor: impl SqliteExecutor<'_>,
    schedule_id: ScheduleID,
    status: DoseStatus,
    taken_at: Option<DateTime<Utc>>,
    scheduled_for: DateTime<Utc>,
    created_at: DateTime<Utc>,
) -> Result<MedicineLog, sqlx::Error> {
    sqlx::query_as::<_, MedicineLog>(&format!(
        "INSERT INTO medicine_logs (schedule_id, status, taken_at, scheduled_for, created_at)
         VALUES (?, ?, ?, ?, ?)
         RETURNING {LOG_COLUMNS}"
    ))
    .bind(schedule_id)
    .bind(status)
    .bind(taken_at)
    .bind(scheduled_for)
    .bind(created_at)
    .fetch_one(executor)
    .await
}

pub async fn logs_for_schedule(
    executor: impl SqliteExecutor<'_>,
    schedule_id: ScheduleID,
) -> Result<Vec<MedicineLog>, sqlx::Error> {
    sqlx::query_as::<_, MedicineLog>(&format!(
        "SELECT {LOG_COLUMNS} FROM medicine_logs
         WHERE schedule_id = ?
         ORDER BY scheduled_for DESC, id DESC"
    ))
    .bind(schedule_id)
    .fetch_all(executor)
    .await
}
