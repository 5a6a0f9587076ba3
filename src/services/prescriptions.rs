use chrono::Utc;
use log::info;

use super::{Service, ServiceError};
use crate::database;
use crate::models::{Caller, PrescriptionDetails, UserID};
use crate::utils::validation::TextInput;

pub use crate::database::prescriptions::NewMedicine;

pub struct NewPrescription {
    /// User id of the patient
    pub patient: UserID,
    pub diagnosis: Option<TextInput>,
    pub notes: Option<TextInput>,
    /// Never empty
    pub medicines: Vec<NewMedicine>,
}

impl Service {
    /// Writes the prescription and all of its medicines atomically
    pub async fn create_prescription(
        &self,
        caller: &Caller,
        request: NewPrescription,
    ) -> Result<PrescriptionDetails, ServiceError> {
        self.enforce(caller).create_prescription()?;

        if request.medicines.is_empty() {
            return Err(ServiceError::invalid("Patient ID and medicines are required"));
        }

        let doctor = self
            .doctor_profile(caller.id)
            .await?
            .ok_or(ServiceError::NotFound("Doctor profile not found"))?;
        let patient = self
            .patient_profile(request.patient)
            .await?
            .ok_or(ServiceError::NotFound("Patient profile not found"))?;

        let mut tx = self.pool.begin().await?;

        let prescription = database::prescriptions::insert(
            &mut *tx,
            doctor.id,
            patient.id,
            request.diagnosis.as_ref().map(TextInput::as_str),
            request.notes.as_ref().map(TextInput::as_str),
            Utc::now(),
        )
        .await?;

        for medicine in &request.medicines {
            database::prescriptions::insert_medicine(&mut *tx, prescription.id, medicine).await?;
        }

        tx.commit().await?;
        info!(
            "Prescription {} with {} medicine(s) written by user {}",
            prescription.id,
            request.medicines.len(),
            caller.id
        );

        let details = database::prescriptions::find_details(&self.pool, prescription.id)
            .await?
            .ok_or(ServiceError::NotFound("Prescription not found"))?;

        self.notify(
            request.patient,
            "New prescription",
            &format!("{} wrote you a new prescription", details.doctor_name),
        )
        .await;

        Ok(details)
    }

    /// Newest first. Administrators see every prescription.
    pub async fn prescriptions(
        &self,
        caller: &Caller,
    ) -> Result<Vec<PrescriptionDetails>, ServiceError> {
        match self.scope(caller).await? {
            Some(scope) => Ok(database::prescriptions::list(&self.pool, scope).await?),
            None => Ok(Vec::new()),
        }
    }
}
