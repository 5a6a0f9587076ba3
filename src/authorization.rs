//! Casbin wrapper checking which caller may perform which action on
//! which object. Every role or ownership decision of the services goes
//! through here.

use casbin::CoreApi;
use log::{debug, error};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

use crate::consts::{ACCESS_CONTROL_MODEL, ACCESS_CONTROL_POLICY};
use crate::models::{AppointmentStatus, Caller, UserID};

/// A Casbin enforcer
pub struct Enforcer(casbin::Enforcer);

type CasbinResult = Result<(), AccessDenied>;

/// Denial, deliberately without details
#[derive(Debug, Error)]
#[error("Access denied")]
pub struct AccessDenied;

/// Parties of an appointment and the status a caller wants to set
#[derive(Debug, Serialize, Hash)]
struct AppointmentChange {
    doctor: UserID,
    patient: UserID,
    status: AppointmentStatus,
}

/// Anything owned by a single user: schedules, notifications
#[derive(Debug, Serialize, Hash)]
struct Owned {
    owner: UserID,
}

/// A patient's medical folder
#[derive(Debug, Serialize, Hash)]
struct Folder {
    patient: UserID,
}

/// An enforcer bound to the caller of the current request
pub struct Context<'ctx> {
    enforcer: &'ctx Enforcer,
    subject: &'ctx Caller,
}

impl Enforcer {
    pub async fn load() -> Result<Self, casbin::Error> {
        let mut enforcer =
            casbin::Enforcer::new(ACCESS_CONTROL_MODEL, ACCESS_CONTROL_POLICY).await?;
        enforcer.load_policy().await?;
        Ok(Enforcer(enforcer))
    }

    pub fn with_subject<'ctx>(&'ctx self, subject: &'ctx Caller) -> Context<'ctx> {
        Context {
            enforcer: self,
            subject,
        }
    }
}

impl Context<'_> {
    fn enforce<O>(&self, object: O, action: &str) -> CasbinResult
    where
        O: Serialize + std::fmt::Debug + std::hash::Hash,
    {
        let subject = self.subject;

        debug!(
            "Enforcing {}",
            json!({ "sub": subject, "obj": &object, "act": action })
        );

        match self.enforcer.0.enforce((subject, &object, action)) {
            Err(e) => {
                error!("Casbin error: {e:?}");
                Err(AccessDenied)
            }
            Ok(granted) => {
                debug!("Granted: {granted}");
                if granted {
                    Ok(())
                } else {
                    Err(AccessDenied)
                }
            }
        }
    }

    pub fn book_appointment(&self) -> CasbinResult {
        self.enforce((), "book-appointment")
    }

    pub fn update_appointment(
        &self,
        doctor: UserID,
        patient: UserID,
        status: AppointmentStatus,
    ) -> CasbinResult {
        self.enforce(
            AppointmentChange {
                doctor,
                patient,
                status,
            },
            "update-appointment",
        )
    }

    pub fn create_prescription(&self) -> CasbinResult {
        self.enforce((), "create-prescription")
    }

    pub fn manage_schedule(&self) -> CasbinResult {
        self.enforce((), "manage-schedule")
    }

    pub fn edit_schedule(&self, owner: UserID) -> CasbinResult {
        self.enforce(Owned { owner }, "edit-schedule")
    }

    pub fn log_medicine(&self, owner: UserID) -> CasbinResult {
        self.enforce(Owned { owner }, "log-medicine")
    }

    pub fn add_record(&self, patient: UserID) -> CasbinResult {
        self.enforce(Folder { patient }, "add-record")
    }

    pub fn read_records(&self, patient: UserID) -> CasbinResult {
        self.enforce(Folder { patient }, "read-records")
    }

    pub fn read_notification(&self, owner: UserID) -> CasbinResult {
        self.enforce(Owned { owner }, "read-notification")
    }
}
