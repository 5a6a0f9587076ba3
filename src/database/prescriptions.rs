use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::{SqliteExecutor, SqlitePool};

use super::Scope;
use crate::models::{
    DoctorID, PatientID, PrescribedMedicine, Prescription, PrescriptionDetails, PrescriptionID,
};

const PRESCRIPTION_COLUMNS: &str = "id, doctor_id, patient_id, diagnosis, notes, created_at";
const MEDICINE_COLUMNS: &str = "id, prescription_id, medicine_name, dosage, frequency, duration_days";

#[derive(sqlx::FromRow)]
struct DetailsRow {
    #[sqlx(flatten)]
    prescription: Prescription,
    doctor_name: String,
    patient_name: String,
}

/// One line of a prescription, before it is stored
#[derive(Debug, Clone)]
pub struct NewMedicine {
    pub medicine_name: String,
    pub dosage: String,
    pub frequency: String,
    pub duration_days: Option<i64>,
}

pub async fn insert(
    executor: impl SqliteExecutor<'_>,
    doctor_id: DoctorID,
    patient_id: PatientID,
    diagnosis: Option<&str>,
    notes: Option<&str>,
    created_at: DateTime<Utc>,
) -> Result<Prescription, sqlx::Error> {
    sqlx::query_as::<_, Prescription>(&format!(
        "INSERT INTO prescriptions (doctor_id, patient_id, diagnosis, notes, created_at)
         VALUES (?, ?, ?, ?, ?)
         RETURNING {PRESCRIPTION_COLUMNS}"
    ))
    .bind(doctor_id)
    .bind(patient_id)
    .bind(diagnosis)
    .bind(notes)
    .bind(created_at)
    .fetch_one(executor)
    .await
}

pub async fn insert_medicine(
    executor: impl SqliteExecutor<'_>,
    prescription_id: PrescriptionID,
    medicine: &NewMedicine,
) -> Result<PrescribedMedicine, sqlx::Error> {
    sqlx::query_as::<_, PrescribedMedicine>(&format!(
        "INSERT INTO prescribed_medicines
             (prescription_id, medicine_name, dosage, frequency, duration_days)
         VALUES (?, ?, ?, ?, ?)
         RETURNING {MEDICINE_COLUMNS}"
    ))
    .bind(prescription_id)
    .bind(&medicine.medicine_name)
    .bind(&medicine.dosage)
    .bind(&medicine.frequency)
    .bind(medicine.duration_days)
    .fetch_one(executor)
    .await
}

/// Prescriptions in scope with their medicines and both names, newest first
pub async fn list(
    pool: &SqlitePool,
    scope: Scope,
) -> Result<Vec<PrescriptionDetails>, sqlx::Error> {
    let (filter, value) = scope.filter("p");
    fetch(pool, &filter, value).await
}

pub async fn find_details(
    pool: &SqlitePool,
    id: PrescriptionID,
) -> Result<Option<PrescriptionDetails>, sqlx::Error> {
    let mut found = fetch(pool, "WHERE p.id = ?", Some(id.0)).await?;
    Ok(found.pop())
}

async fn fetch(
    pool: &SqlitePool,
    filter: &str,
    value: Option<i64>,
) -> Result<Vec<PrescriptionDetails>, sqlx::Error> {
    let sql = format!(
        "SELECT p.id, p.doctor_id, p.patient_id, p.diagnosis, p.notes, p.created_at,
                du.name AS doctor_name, pu.name AS patient_name
         FROM prescriptions p
         JOIN doctor_profiles dp ON dp.id = p.doctor_id
         JOIN users du ON du.id = dp.user_id
         JOIN patient_profiles pp ON pp.id = p.patient_id
         JOIN users pu ON pu.id = pp.user_id
         {filter}
         ORDER BY p.created_at DESC, p.id DESC"
    );
    let mut query = sqlx::query_as::<_, DetailsRow>(&sql);
    if let Some(value) = value {
        query = query.bind(value);
    }
    let rows = query.fetch_all(pool).await?;

    let sql = format!(
        "SELECT m.id, m.prescription_id, m.medicine_name, m.dosage, m.frequency, m.duration_days
         FROM prescribed_medicines m
         JOIN prescriptions p ON p.id = m.prescription_id
         {filter}
         ORDER BY m.id"
    );
    let mut query = sqlx::query_as::<_, PrescribedMedicine>(&sql);
    if let Some(value) = value {
        query = query.bind(value);
    }

    let mut medicines: HashMap<PrescriptionID, Vec<PrescribedMedicine>> = HashMap::new();
    for medicine in query.fetch_all(pool).await? {
        medicines
            .entry(medicine.prescription_id)
            .or_default()
            .push(medicine);
    }

    Ok(rows
        .into_iter()
        .map(|row| PrescriptionDetails {
            medicines: medicines.remove(&row.prescription.id).unwrap_or_default(),
            prescription: row.prescription,
            doctor_name: row.doctor_name,
            patient_name: row.patient_name,
        })
        .collect())
}
