//! Data model shared by the database layer, the services and the handlers.

use chrono::{DateTime, Utc};
use derive_more::Display;
use serde::{Deserialize, Serialize};
use strum_macros::{EnumIter, EnumString};

/// Role of a user: Patient, Doctor or Admin
#[derive(
    Debug,
    Serialize,
    Deserialize,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    EnumIter,
    EnumString,
    Display,
    sqlx::Type,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    #[display("PATIENT")]
    Patient,
    #[display("DOCTOR")]
    Doctor,
    #[display("ADMIN")]
    Admin,
}

/// Lifecycle of an appointment. Transitions are gated by the caller's
/// role in the access-control policy, not by the database.
#[derive(
    Debug,
    Serialize,
    Deserialize,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    EnumIter,
    EnumString,
    Display,
    sqlx::Type,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum AppointmentStatus {
    #[display("PENDING")]
    Pending,
    #[display("CONFIRMED")]
    Confirmed,
    #[display("COMPLETED")]
    Completed,
    #[display("CANCELLED")]
    Cancelled,
}

/// Outcome of a single scheduled dose
#[derive(
    Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, EnumString, Display, sqlx::Type,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum DoseStatus {
    #[display("TAKEN")]
    Taken,
    #[display("MISSED")]
    Missed,
    #[display("SKIPPED")]
    Skipped,
}

#[derive(
    Debug,
    Default,
    Serialize,
    Deserialize,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    EnumString,
    Display,
    sqlx::Type,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum MedicineType {
    #[default]
    #[display("PILL")]
    Pill,
    #[display("SYRUP")]
    Syrup,
    #[display("INJECTION")]
    Injection,
    #[display("DROPS")]
    Drops,
    #[display("INHALER")]
    Inhaler,
    #[display("CREAM")]
    Cream,
}

/// A unique user identifier.
#[derive(
    Debug, Serialize, Deserialize, Clone, Copy, Eq, PartialEq, Hash, PartialOrd, Ord, Display,
    sqlx::Type,
)]
#[serde(transparent)]
#[sqlx(transparent)]
pub struct UserID(pub i64);

/// Identifier of a doctor profile (not of the doctor's user row)
#[derive(
    Debug, Serialize, Deserialize, Clone, Copy, Eq, PartialEq, Hash, PartialOrd, Ord, Display,
    sqlx::Type,
)]
#[serde(transparent)]
#[sqlx(transparent)]
pub struct DoctorID(pub i64);

/// Identifier of a patient profile (not of the patient's user row)
#[derive(
    Debug, Serialize, Deserialize, Clone, Copy, Eq, PartialEq, Hash, PartialOrd, Ord, Display,
    sqlx::Type,
)]
#[serde(transparent)]
#[sqlx(transparent)]
pub struct PatientID(pub i64);

#[derive(
    Debug, Serialize, Deserialize, Clone, Copy, Eq, PartialEq, Hash, PartialOrd, Ord, Display,
    sqlx::Type,
)]
#[serde(transparent)]
#[sqlx(transparent)]
pub struct AppointmentID(pub i64);

#[derive(
    Debug, Serialize, Deserialize, Clone, Copy, Eq, PartialEq, Hash, PartialOrd, Ord, Display,
    sqlx::Type,
)]
#[serde(transparent)]
#[sqlx(transparent)]
pub struct PrescriptionID(pub i64);

#[derive(
    Debug, Serialize, Deserialize, Clone, Copy, Eq, PartialEq, Hash, PartialOrd, Ord, Display,
    sqlx::Type,
)]
#[serde(transparent)]
#[sqlx(transparent)]
pub struct ScheduleID(pub i64);

#[derive(
    Debug, Serialize, Deserialize, Clone, Copy, Eq, PartialEq, Hash, PartialOrd, Ord, Display,
    sqlx::Type,
)]
#[serde(transparent)]
#[sqlx(transparent)]
pub struct NotificationID(pub i64);

/// The authenticated identity attached to a request
#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Caller {
    pub id: UserID,
    pub role: Role,
}

/// A user as exposed by the API. The password hash never lives here.
#[derive(Debug, Serialize, Clone, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserID,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Clone, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct DoctorProfile {
    pub id: DoctorID,
    pub user_id: UserID,
    pub specialization: Option<String>,
    pub experience: Option<i64>,
    pub bio: Option<String>,
    pub consultation_fee: Option<f64>,
    pub is_available: bool,
}

#[derive(Debug, Serialize, Clone, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PatientProfile {
    pub id: PatientID,
    pub user_id: UserID,
    pub age: Option<i64>,
    pub gender: Option<String>,
    pub address: Option<String>,
}

/// Either kind of profile, serialized as the profile itself
#[derive(Debug, Serialize, Clone)]
#[serde(untagged)]
pub enum Profile {
    Doctor(DoctorProfile),
    Patient(PatientProfile),
}

/// A user together with its role-specific profile
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserWithProfile {
    #[serde(flatten)]
    pub user: User,
    pub doctor_profile: Option<DoctorProfile>,
    pub patient_profile: Option<PatientProfile>,
}

/// Public listing entry of a doctor
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DoctorListing {
    pub id: UserID,
    pub name: String,
    pub email: String,
    pub doctor_profile: Option<DoctorProfile>,
}

#[derive(Debug, Serialize, Clone, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub id: AppointmentID,
    pub doctor_id: DoctorID,
    pub patient_id: PatientID,
    pub date_time: DateTime<Utc>,
    pub notes: Option<String>,
    pub status: AppointmentStatus,
    pub created_at: DateTime<Utc>,
}

/// Who sits on one side of an appointment or prescription
#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Party {
    pub user_id: UserID,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentDetails {
    #[serde(flatten)]
    pub appointment: Appointment,
    pub doctor: Party,
    pub patient: Party,
}

#[derive(Debug, Serialize, Clone, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Prescription {
    pub id: PrescriptionID,
    pub doctor_id: DoctorID,
    pub patient_id: PatientID,
    pub diagnosis: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Clone, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PrescribedMedicine {
    pub id: i64,
    pub prescription_id: PrescriptionID,
    pub medicine_name: String,
    pub dosage: String,
    pub frequency: String,
    pub duration_days: Option<i64>,
}

#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PrescriptionDetails {
    #[serde(flatten)]
    pub prescription: Prescription,
    pub doctor_name: String,
    pub patient_name: String,
    pub medicines: Vec<PrescribedMedicine>,
}

#[derive(Debug, Serialize, Clone, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct MedicineSchedule {
    pub id: ScheduleID,
    pub patient_id: PatientID,
    pub medicine_name: String,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub medicine_type: MedicineType,
    pub dosage: Option<String>,
    pub is_morning: bool,
    pub is_afternoon: bool,
    pub is_evening: bool,
    pub is_night: bool,
    pub is_after_food: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Clone, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct MedicineLog {
    pub id: i64,
    pub schedule_id: ScheduleID,
    pub status: DoseStatus,
    pub taken_at: Option<DateTime<Utc>>,
    pub scheduled_for: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Clone, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct MedicalRecord {
    pub id: i64,
    pub patient_id: PatientID,
    pub title: String,
    pub description: Option<String>,
    pub date: DateTime<Utc>,
    pub file_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Clone, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: NotificationID,
    pub user_id: UserID,
    pub title: String,
    pub message: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

/// Fields of a doctor profile to overwrite; `None` keeps the stored value
#[derive(Debug, Default, Clone)]
pub struct DoctorProfileChanges {
    pub specialization: Option<String>,
    pub experience: Option<i64>,
    pub bio: Option<String>,
    pub consultation_fee: Option<f64>,
    pub is_available: Option<bool>,
}

#[derive(Debug, Default, Clone)]
pub struct PatientProfileChanges {
    pub age: Option<i64>,
    pub gender: Option<String>,
    pub address: Option<String>,
}
