//! Request bodies and their conversion into validated service inputs.
//!
//! Every field is optional at the JSON level so that a missing field gives
//! a clear 400 message instead of a deserialization error.

use std::str::FromStr;

use axum::extract::{FromRequest, FromRequestParts};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::models::{
    AppointmentStatus, DoctorProfileChanges, DoseStatus, MedicineType, PatientProfileChanges,
    ScheduleID, UserID,
};
use crate::services::{
    NewAppointment, NewDoseLog, NewMedicine, NewPrescription, NewRecord, NewSchedule,
    ProfileUpdate, ServiceError,
};
use crate::utils::validation::{FileInput, TextInput};

/// `axum::Json` whose rejection is rendered like every other error
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ServiceError))]
pub struct JsonBody<T>(pub T);

/// `axum::extract::Path` with the same JSON error body
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ServiceError))]
pub struct PathParam<T>(pub T);

/// Accepts a JSON number, a numeric string or a boolean. Anything that
/// does not parse is treated as absent.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Number(number)) => number.to_string().parse().ok(),
        Some(Value::String(string)) => string.trim().parse().ok(),
        Some(Value::Bool(boolean)) => boolean.to_string().parse().ok(),
        _ => None,
    })
}

/// RFC 3339, or a local date-time / date as sent by HTML inputs (read as UTC)
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(raw) {
        return Some(timestamp.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()?
        .and_hms_opt(0, 0, 0)
        .map(|naive| naive.and_utc())
}

fn optional_timestamp(
    raw: Option<&str>,
    field: &str,
) -> Result<Option<DateTime<Utc>>, ServiceError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(raw) => parse_timestamp(raw)
            .map(Some)
            .ok_or_else(|| ServiceError::invalid(format!("Invalid {field}"))),
    }
}

/// A present, non-blank string
fn required<'a>(value: &'a Option<String>) -> Option<&'a str> {
    value.as_deref().map(str::trim).filter(|value| !value.is_empty())
}

fn short_text(raw: &str) -> Result<TextInput, ServiceError> {
    TextInput::new_short_form(raw).map_err(ServiceError::invalid)
}

fn optional_short_text(raw: Option<&str>) -> Result<Option<TextInput>, ServiceError> {
    TextInput::optional_short_form(raw).map_err(ServiceError::invalid)
}

fn optional_long_text(raw: Option<&str>) -> Result<Option<TextInput>, ServiceError> {
    TextInput::optional_long_form(raw).map_err(ServiceError::invalid)
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub name: Option<String>,
    pub role: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    name: Option<String>,
    specialization: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    experience: Option<i64>,
    bio: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    consultation_fee: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    is_available: Option<bool>,
    #[serde(default, deserialize_with = "lenient")]
    age: Option<i64>,
    gender: Option<String>,
    address: Option<String>,
}

impl TryFrom<UpdateProfileRequest> for ProfileUpdate {
    type Error = ServiceError;

    fn try_from(request: UpdateProfileRequest) -> Result<Self, Self::Error> {
        let text = |raw: &Option<String>| optional_short_text(raw.as_deref());

        Ok(ProfileUpdate {
            name: text(&request.name)?,
            doctor: DoctorProfileChanges {
                specialization: text(&request.specialization)?.map(TextInput::into_string),
                experience: request.experience.filter(|years| *years >= 0),
                bio: optional_long_text(request.bio.as_deref())?.map(TextInput::into_string),
                consultation_fee: request
                    .consultation_fee
                    .filter(|fee| fee.is_finite() && *fee >= 0.0),
                is_available: request.is_available,
            },
            patient: PatientProfileChanges {
                age: request.age.filter(|age| (0..=150).contains(age)),
                gender: text(&request.gender)?.map(TextInput::into_string),
                address: optional_long_text(request.address.as_deref())?
                    .map(TextInput::into_string),
            },
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookAppointmentRequest {
    #[serde(default, deserialize_with = "lenient")]
    doctor_id: Option<i64>,
    date_time: Option<String>,
    notes: Option<String>,
}

impl TryFrom<BookAppointmentRequest> for NewAppointment {
    type Error = ServiceError;

    fn try_from(request: BookAppointmentRequest) -> Result<Self, Self::Error> {
        let (Some(doctor), Some(date_time)) = (request.doctor_id, required(&request.date_time))
        else {
            return Err(ServiceError::invalid("Doctor ID and Date/Time are required"));
        };

        Ok(NewAppointment {
            doctor: UserID(doctor),
            date_time: parse_timestamp(date_time)
                .ok_or_else(|| ServiceError::invalid("Invalid Date/Time"))?,
            notes: optional_long_text(request.notes.as_deref())?,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    status: Option<String>,
}

impl TryFrom<UpdateStatusRequest> for AppointmentStatus {
    type Error = ServiceError;

    fn try_from(request: UpdateStatusRequest) -> Result<Self, Self::Error> {
        required(&request.status)
            .and_then(|status| status.parse().ok())
            .ok_or_else(|| {
                ServiceError::invalid(
                    "Status must be one of PENDING, CONFIRMED, COMPLETED, CANCELLED",
                )
            })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicineRequest {
    medicine_name: Option<String>,
    dosage: Option<String>,
    frequency: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    duration_days: Option<i64>,
}

impl TryFrom<MedicineRequest> for NewMedicine {
    type Error = ServiceError;

    fn try_from(request: MedicineRequest) -> Result<Self, Self::Error> {
        let (Some(name), Some(dosage), Some(frequency)) = (
            required(&request.medicine_name),
            required(&request.dosage),
            required(&request.frequency),
        ) else {
            return Err(ServiceError::invalid(
                "Each medicine needs a name, a dosage and a frequency",
            ));
        };

        Ok(NewMedicine {
            medicine_name: short_text(name)?.into_string(),
            dosage: short_text(dosage)?.into_string(),
            frequency: short_text(frequency)?.into_string(),
            duration_days: request.duration_days.filter(|days| *days > 0),
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrescriptionRequest {
    #[serde(default, deserialize_with = "lenient")]
    patient_id: Option<i64>,
    diagnosis: Option<String>,
    notes: Option<String>,
    medicines: Option<Vec<MedicineRequest>>,
}

impl TryFrom<PrescriptionRequest> for NewPrescription {
    type Error = ServiceError;

    fn try_from(request: PrescriptionRequest) -> Result<Self, Self::Error> {
        let (Some(patient), Some(medicines)) = (request.patient_id, request.medicines) else {
            return Err(ServiceError::invalid("Patient ID and medicines are required"));
        };
        if medicines.is_empty() {
            return Err(ServiceError::invalid("Patient ID and medicines are required"));
        }

        Ok(NewPrescription {
            patient: UserID(patient),
            diagnosis: optional_long_text(request.diagnosis.as_deref())?,
            notes: optional_long_text(request.notes.as_deref())?,
            medicines: medicines
                .into_iter()
                .map(NewMedicine::try_from)
                .collect::<Result<_, _>>()?,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleRequest {
    medicine_name: Option<String>,
    #[serde(rename = "type")]
    medicine_type: Option<String>,
    dosage: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    is_morning: Option<bool>,
    #[serde(default, deserialize_with = "lenient")]
    is_afternoon: Option<bool>,
    #[serde(default, deserialize_with = "lenient")]
    is_evening: Option<bool>,
    #[serde(default, deserialize_with = "lenient")]
    is_night: Option<bool>,
    #[serde(default, deserialize_with = "lenient")]
    is_after_food: Option<bool>,
}

impl TryFrom<ScheduleRequest> for NewSchedule {
    type Error = ServiceError;

    fn try_from(request: ScheduleRequest) -> Result<Self, Self::Error> {
        let name = required(&request.medicine_name)
            .ok_or_else(|| ServiceError::invalid("Medicine name is required"))?;

        let medicine_type = match required(&request.medicine_type) {
            None => MedicineType::default(),
            Some(raw) => raw.parse().map_err(|_| {
                ServiceError::invalid(
                    "Type must be one of PILL, SYRUP, INJECTION, DROPS, INHALER, CREAM",
                )
            })?,
        };

        Ok(NewSchedule {
            medicine_name: short_text(name)?.into_string(),
            medicine_type,
            dosage: optional_short_text(request.dosage.as_deref())?.map(TextInput::into_string),
            is_morning: request.is_morning.unwrap_or(true),
            is_afternoon: request.is_afternoon.unwrap_or(false),
            is_evening: request.is_evening.unwrap_or(true),
            is_night: request.is_night.unwrap_or(false),
            is_after_food: request.is_after_food.unwrap_or(true),
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DoseLogRequest {
    #[serde(default, deserialize_with = "lenient")]
    schedule_id: Option<i64>,
    status: Option<String>,
    taken_at: Option<String>,
    scheduled_for: Option<String>,
}

impl TryFrom<DoseLogRequest> for NewDoseLog {
    type Error = ServiceError;

    fn try_from(request: DoseLogRequest) -> Result<Self, Self::Error> {
        let schedule = request
            .schedule_id
            .ok_or_else(|| ServiceError::invalid("Schedule ID is required"))?;

        let status: DoseStatus = required(&request.status)
            .and_then(|status| status.parse().ok())
            .ok_or_else(|| ServiceError::invalid("Status must be one of TAKEN, MISSED, SKIPPED"))?;

        Ok(NewDoseLog {
            schedule: ScheduleID(schedule),
            status,
            taken_at: optional_timestamp(request.taken_at.as_deref(), "takenAt")?,
            scheduled_for: optional_timestamp(request.scheduled_for.as_deref(), "scheduledFor")?,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DoseLogQuery {
    #[serde(default, deserialize_with = "lenient")]
    pub schedule_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordsQuery {
    #[serde(default, deserialize_with = "lenient")]
    pub patient_id: Option<i64>,
}

/// Medical record fields, from a JSON body or from multipart form fields
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordRequest {
    #[serde(default, deserialize_with = "lenient")]
    pub patient_id: Option<i64>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub date: Option<String>,
}

impl RecordRequest {
    pub fn into_record(self, file: Option<FileInput>) -> Result<NewRecord, ServiceError> {
        let title =
            required(&self.title).ok_or_else(|| ServiceError::invalid("Title is required"))?;

        Ok(NewRecord {
            patient: self.patient_id.map(UserID),
            title: short_text(title)?,
            description: optional_long_text(self.description.as_deref())?,
            date: optional_timestamp(self.date.as_deref(), "date")?,
            file,
        })
    }
}
