use chrono::{DateTime, Utc};
use log::info;

use super::{Service, ServiceError};
use crate::database;
use crate::models::{Caller, DoseStatus, MedicineLog, MedicineSchedule, ScheduleID, UserID};

pub use crate::database::medicine::NewSchedule;

pub struct NewDoseLog {
    pub schedule: ScheduleID,
    pub status: DoseStatus,
    /// Defaults to now for a taken dose, stays empty otherwise
    pub taken_at: Option<DateTime<Utc>>,
    /// Defaults to now
    pub scheduled_for: Option<DateTime<Utc>>,
}

impl Service {
    pub async fn create_schedule(
        &self,
        caller: &Caller,
        schedule: NewSchedule,
    ) -> Result<MedicineSchedule, ServiceError> {
        self.enforce(caller).manage_schedule()?;

        let patient = self
            .patient_profile(caller.id)
            .await?
            .ok_or(ServiceError::NotFound("Patient profile not found"))?;

        let schedule =
            database::medicine::insert_schedule(&self.pool, patient.id, &schedule, Utc::now())
                .await?;
        info!("Schedule {} created by user {}", schedule.id, caller.id);
        Ok(schedule)
    }

    /// Active schedules of the calling patient
    pub async fn schedules(&self, caller: &Caller) -> Result<Vec<MedicineSchedule>, ServiceError> {
        self.enforce(caller).manage_schedule()?;

        match self.patient_profile(caller.id).await? {
            Some(patient) => Ok(database::medicine::active_schedules(&self.pool, patient.id).await?),
            None => Ok(Vec::new()),
        }
    }

    /// Soft delete: the schedule disappears from listings, its logs stay
    pub async fn deactivate_schedule(
        &self,
        caller: &Caller,
        id: ScheduleID,
    ) -> Result<MedicineSchedule, ServiceError> {
        let owner = self.schedule_owner(id).await?;
        self.enforce(caller).edit_schedule(owner)?;

        let schedule = database::medicine::deactivate_schedule(&self.pool, id)
            .await?
            .ok_or(ServiceError::NotFound("Schedule not found"))?;
        info!("Schedule {id} deactivated by user {}", caller.id);
        Ok(schedule)
    }

    pub async fn log_dose(
        &self,
        caller: &Caller,
        request: NewDoseLog,
    ) -> Result<MedicineLog, ServiceError> {
        let owner = self.schedule_owner(request.schedule).await?;
        self.enforce(caller).log_medicine(owner)?;

        let now = Utc::now();
        let taken_at = match request.status {
            DoseStatus::Taken => Some(request.taken_at.unwrap_or(now)),
            DoseStatus::Missed | DoseStatus::Skipped => request.taken_at,
        };

        Ok(database::medicine::insert_log(
            &self.pool,
            request.schedule,
            request.status,
            taken_at,
            request.scheduled_for.unwrap_or(now),
            now,
        )
        .await?)
    }

    /// Doses recorded against a schedule, newest first
    pub async fn dose_logs(
        &self,
        caller: &Caller,
        schedule: ScheduleID,
    ) -> Result<Vec<MedicineLog>, ServiceError> {
        let owner = self.schedule_owner(schedule).await?;
        self.enforce(caller).log_medicine(owner)?;

        Ok(database::medicine::logs_for_schedule(&self.pool, schedule).await?)
    }

    async fn schedule_owner(&self, id: ScheduleID) -> Result<UserID, ServiceError> {
        database::medicine::find_schedule_owner(&self.pool, id)
            .await?
            .ok_or(ServiceError::NotFound("Schedule not found"))
    }
}
