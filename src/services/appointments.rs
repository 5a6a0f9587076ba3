use chrono::{DateTime, Utc};
use log::info;

use super::{Service, ServiceError};
use crate::database;
use crate::models::{
    Appointment, AppointmentDetails, AppointmentID, AppointmentStatus, Caller, UserID,
};
use crate::utils::validation::TextInput;

pub struct NewAppointment {
    /// User id of the doctor, as listed by the doctors directory
    pub doctor: UserID,
    pub date_time: DateTime<Utc>,
    pub notes: Option<TextInput>,
}

impl Service {
    pub async fn book_appointment(
        &self,
        caller: &Caller,
        request: NewAppointment,
    ) -> Result<Appointment, ServiceError> {
        self.enforce(caller).book_appointment()?;

        let doctor = self
            .doctor_profile(request.doctor)
            .await?
            .ok_or(ServiceError::NotFound("Doctor not found"))?;

        let patient = self.patient_profile(caller.id).await?.ok_or(ServiceError::NotFound(
            "Patient profile not found. Please update your profile first.",
        ))?;

        let appointment = database::appointments::insert(
            &self.pool,
            doctor.id,
            patient.id,
            request.date_time,
            request.notes.as_ref().map(TextInput::as_str),
            Utc::now(),
        )
        .await?;
        info!(
            "Appointment {} booked by user {} with doctor {}",
            appointment.id, caller.id, request.doctor
        );

        self.notify(
            request.doctor,
            "New appointment request",
            &format!(
                "A patient requested an appointment on {}",
                appointment.date_time.format("%Y-%m-%d %H:%M UTC")
            ),
        )
        .await;

        Ok(appointment)
    }

    /// Appointments of the caller with both parties, soonest first.
    /// Administrators see every appointment.
    pub async fn appointments(
        &self,
        caller: &Caller,
    ) -> Result<Vec<AppointmentDetails>, ServiceError> {
        match self.scope(caller).await? {
            Some(scope) => Ok(database::appointments::list(&self.pool, scope).await?),
            None => Ok(Vec::new()),
        }
    }

    pub async fn update_appointment_status(
        &self,
        caller: &Caller,
        id: AppointmentID,
        status: AppointmentStatus,
    ) -> Result<Appointment, ServiceError> {
        let current = database::appointments::find_details(&self.pool, id)
            .await?
            .ok_or(ServiceError::NotFound("Appointment not found"))?;

        let doctor = current.doctor.user_id;
        let patient = current.patient.user_id;
        self.enforce(caller)
            .update_appointment(doctor, patient, status)?;

        let appointment = database::appointments::update_status(&self.pool, id, status)
            .await?
            .ok_or(ServiceError::NotFound("Appointment not found"))?;
        info!("Appointment {id} set to {status} by user {}", caller.id);

        let counterpart = if caller.id == doctor { patient } else { doctor };
        self.notify(
            counterpart,
            "Appointment updated",
            &format!(
                "Your appointment on {} is now {status}",
                appointment.date_time.format("%Y-%m-%d %H:%M UTC")
            ),
        )
        .await;

        Ok(appointment)
    }
}
