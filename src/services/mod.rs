//! Business operations, and the single entry point for access control.
//!
//! Handlers hand over validated inputs and the authenticated caller; the
//! services resolve profiles, ask the enforcer, and talk to the database.

mod appointments;
mod auth;
mod medicine;
mod notifications;
mod prescriptions;
mod records;
mod users;

pub use appointments::NewAppointment;
pub use medicine::{NewDoseLog, NewSchedule};
pub use prescriptions::{NewMedicine, NewPrescription};
pub use records::{NewRecord, StoredFile};
pub use users::ProfileUpdate;

use std::{path::PathBuf, sync::Arc};

use chrono::Utc;
use log::{info, warn};
use sqlx::SqlitePool;
use thiserror::Error;

use crate::authorization::{AccessDenied, Context, Enforcer};
use crate::config::Config;
use crate::database::{self, Scope};
use crate::models::{Caller, DoctorProfile, PatientProfile, Role, UserID};
use crate::utils::jwt::TokenKeys;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("Email already exists")]
    EmailAlreadyExists,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("{0}")]
    Unauthenticated(&'static str),

    #[error(transparent)]
    AccessDenied(#[from] AccessDenied),

    #[error("{0}")]
    NotFound(&'static str),

    #[error(transparent)]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ServiceError {
    pub fn invalid(message: impl ToString) -> Self {
        ServiceError::InvalidInput(message.to_string())
    }
}

/// Shared by every request. Cloning is cheap: the pool and the enforcer
/// are reference counted.
#[derive(Clone)]
pub struct Service {
    pool: SqlitePool,
    enforcer: Arc<Enforcer>,
    keys: TokenKeys,
    uploads_dir: PathBuf,
    secure_cookies: bool,
}

impl Service {
    pub fn new(pool: SqlitePool, enforcer: Enforcer, config: &Config) -> Self {
        Self {
            pool,
            enforcer: Arc::new(enforcer),
            keys: TokenKeys::new(&config.jwt_secret, config.token_ttl_days),
            uploads_dir: config.uploads_dir.clone(),
            secure_cookies: config.secure_cookies,
        }
    }

    pub fn secure_cookies(&self) -> bool {
        self.secure_cookies
    }

    pub fn token_ttl(&self) -> chrono::Duration {
        self.keys.ttl()
    }

    /// Authorization context with the caller as subject
    fn enforce<'a>(&'a self, caller: &'a Caller) -> Context<'a> {
        self.enforcer.with_subject(caller)
    }

    /// Which rows a listing covers for this caller. `None` when the caller
    /// should own a profile but has none, in which case nothing is listed.
    async fn scope(&self, caller: &Caller) -> Result<Option<Scope>, ServiceError> {
        Ok(match caller.role {
            Role::Patient => self.patient_profile(caller.id).await?.map(|p| Scope::Patient(p.id)),
            Role::Doctor => self.doctor_profile(caller.id).await?.map(|p| Scope::Doctor(p.id)),
            Role::Admin => Some(Scope::Everything),
        })
    }

    async fn patient_profile(&self, user: UserID) -> Result<Option<PatientProfile>, ServiceError> {
        Ok(database::profiles::find_patient_by_user(&self.pool, user).await?)
    }

    async fn doctor_profile(&self, user: UserID) -> Result<Option<DoctorProfile>, ServiceError> {
        Ok(database::profiles::find_doctor_by_user(&self.pool, user).await?)
    }

    /// Notifications accompany the main write but never undo it
    async fn notify(&self, user: UserID, title: &str, message: &str) {
        match database::notifications::insert(&self.pool, user, title, message, Utc::now()).await {
            Ok(notification) => info!("Notification {} sent to user {user}", notification.id),
            Err(e) => warn!("Failed to notify user {user}: {e}"),
        }
    }
}

#[cfg(test)]
impl Service {
    /// A service over a fresh in-memory database
    pub async fn for_tests(uploads_dir: &std::path::Path) -> Self {
        let pool = database::connect_in_memory().await;
        let enforcer = Enforcer::load().await.expect("enforcer");
        let config = Config::from_lookup(|key| match key {
            "JWT_SECRET" => Some("test-secret".to_string()),
            "COOKIE_SECURE" => Some("false".to_string()),
            "UPLOADS_DIR" => Some(uploads_dir.display().to_string()),
            _ => None,
        })
        .expect("config");

        Service::new(pool, enforcer, &config)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}
