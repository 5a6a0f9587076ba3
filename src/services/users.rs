use super::{Service, ServiceError};
use crate::database;
use crate::models::{
    Caller, DoctorListing, DoctorProfileChanges, PatientProfileChanges, Profile, Role,
    UserWithProfile,
};
use crate::utils::validation::TextInput;

/// Changes requested on the caller's own profile. Only the part matching
/// the caller's role is applied.
#[derive(Debug, Default)]
pub struct ProfileUpdate {
    pub name: Option<TextInput>,
    pub doctor: DoctorProfileChanges,
    pub patient: PatientProfileChanges,
}

impl Service {
    pub async fn profile(&self, caller: &Caller) -> Result<UserWithProfile, ServiceError> {
        let user = database::users::find(&self.pool, caller.id)
            .await?
            .ok_or(ServiceError::NotFound("User not found"))?;

        let (doctor_profile, patient_profile) = match user.role {
            Role::Doctor => (self.doctor_profile(user.id).await?, None),
            Role::Patient => (None, self.patient_profile(user.id).await?),
            Role::Admin => (None, None),
        };

        Ok(UserWithProfile {
            user,
            doctor_profile,
            patient_profile,
        })
    }

    /// Returns the updated role profile, `None` for administrators
    pub async fn update_profile(
        &self,
        caller: &Caller,
        update: ProfileUpdate,
    ) -> Result<Option<Profile>, ServiceError> {
        let mut tx = self.pool.begin().await?;

        if database::users::find(&mut *tx, caller.id).await?.is_none() {
            return Err(ServiceError::NotFound("User not found"));
        }

        if let Some(name) = &update.name {
            database::users::update_name(&mut *tx, caller.id, name.as_str()).await?;
        }

        let profile = match caller.role {
            Role::Doctor => {
                let updated =
                    database::profiles::update_doctor(&mut *tx, caller.id, &update.doctor).await?;
                let updated = match updated {
                    Some(profile) => profile,
                    None => {
                        database::profiles::insert_doctor(&mut *tx, caller.id).await?;
                        database::profiles::update_doctor(&mut *tx, caller.id, &update.doctor)
                            .await?
                            .ok_or(ServiceError::NotFound("Doctor profile not found"))?
                    }
                };
                Some(Profile::Doctor(updated))
            }
            Role::Patient => {
                let updated =
                    database::profiles::update_patient(&mut *tx, caller.id, &update.patient)
                        .await?;
                let updated = match updated {
                    Some(profile) => profile,
                    None => {
                        database::profiles::insert_patient(&mut *tx, caller.id).await?;
                        database::profiles::update_patient(&mut *tx, caller.id, &update.patient)
                            .await?
                            .ok_or(ServiceError::NotFound("Patient profile not found"))?
                    }
                };
                Some(Profile::Patient(updated))
            }
            Role::Admin => None,
        };

        tx.commit().await?;
        Ok(profile)
    }

    /// Public directory of doctors, no authentication required
    pub async fn doctors(&self) -> Result<Vec<DoctorListing>, ServiceError> {
        Ok(database::users::list_doctors(&self.pool).await?)
    }
}
