//! Medical records and their attached files.
//!
//! Files live under the uploads directory with a random name; the record
//! only keeps the URL of the authenticated download route.

use std::path::Path;

use anyhow::Context as _;
use chrono::{DateTime, Utc};
use log::{info, warn};
use uuid::Uuid;

use super::{Service, ServiceError};
use crate::consts::FILES_ROUTE;
use crate::database;
use crate::models::{Caller, MedicalRecord, Role, UserID};
use crate::utils::validation::{FileInput, FileKind, TextInput};

pub struct NewRecord {
    /// User id of the patient; required from doctors, ignored for patients
    pub patient: Option<UserID>,
    pub title: TextInput,
    pub description: Option<TextInput>,
    /// Defaults to now
    pub date: Option<DateTime<Utc>>,
    pub file: Option<FileInput>,
}

/// A stored attachment ready to be sent back
pub struct StoredFile {
    pub content: Vec<u8>,
    pub kind: FileKind,
}

impl Service {
    pub async fn add_record(
        &self,
        caller: &Caller,
        request: NewRecord,
    ) -> Result<MedicalRecord, ServiceError> {
        let target = match caller.role {
            Role::Patient => caller.id,
            Role::Doctor => request
                .patient
                .ok_or_else(|| ServiceError::invalid("Patient ID is required for doctors"))?,
            Role::Admin => request.patient.unwrap_or(caller.id),
        };
        self.enforce(caller).add_record(target)?;

        let patient = self
            .patient_profile(target)
            .await?
            .ok_or(ServiceError::NotFound("Patient profile not found"))?;

        let stored = match &request.file {
            Some(file) => Some(self.store_file(file).await?),
            None => None,
        };
        let file_url = stored.as_ref().map(|(_, key)| format!("{FILES_ROUTE}/{key}"));

        let inserted = database::records::insert(
            &self.pool,
            patient.id,
            request.title.as_str(),
            request.description.as_ref().map(TextInput::as_str),
            request.date.unwrap_or_else(Utc::now),
            file_url.as_deref(),
            Utc::now(),
        )
        .await;

        let record = match inserted {
            Ok(record) => record,
            Err(e) => {
                if let Some((path, _)) = &stored {
                    if let Err(e) = tokio::fs::remove_file(path).await {
                        warn!("Failed to remove orphan upload {}: {e}", path.display());
                    }
                }
                return Err(e.into());
            }
        };

        info!(
            "Medical record {} added for user {target} by user {}",
            record.id, caller.id
        );
        Ok(record)
    }

    /// Records of a patient folder, most recent first. A doctor who does
    /// not name a patient gets an empty list.
    pub async fn records(
        &self,
        caller: &Caller,
        patient: Option<UserID>,
    ) -> Result<Vec<MedicalRecord>, ServiceError> {
        let target = match caller.role {
            Role::Patient => caller.id,
            Role::Doctor => match patient {
                Some(patient) => patient,
                None => return Ok(Vec::new()),
            },
            Role::Admin => patient.unwrap_or(caller.id),
        };
        self.enforce(caller).read_records(target)?;

        match self.patient_profile(target).await? {
            Some(profile) => Ok(database::records::list_for_patient(&self.pool, profile.id).await?),
            None if caller.role == Role::Patient => Ok(Vec::new()),
            None => Err(ServiceError::NotFound("Patient not found")),
        }
    }

    /// Reads an attachment for a caller allowed to read the owning folder
    pub async fn record_file(&self, caller: &Caller, key: &str) -> Result<StoredFile, ServiceError> {
        let kind = Self::file_kind(key).ok_or(ServiceError::NotFound("File not found"))?;

        let owner = database::records::find_file_owner(&self.pool, &format!("{FILES_ROUTE}/{key}"))
            .await?
            .ok_or(ServiceError::NotFound("File not found"))?;
        self.enforce(caller).read_records(owner)?;

        let content = match tokio::fs::read(self.uploads_dir.join(key)).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!("Record file {key} is referenced but missing");
                return Err(ServiceError::NotFound("File not found"));
            }
            Err(e) => return Err(anyhow::Error::new(e).context("Failed to read upload").into()),
        };

        Ok(StoredFile { content, kind })
    }

    /// Writes the file under a fresh random key, returning its path and key
    async fn store_file(&self, file: &FileInput) -> Result<(std::path::PathBuf, String), ServiceError> {
        tokio::fs::create_dir_all(&self.uploads_dir)
            .await
            .with_context(|| format!("Failed to create {}", self.uploads_dir.display()))?;

        let key = format!("{}.{}", Uuid::new_v4(), file.kind().extension());
        let path = self.uploads_dir.join(&key);

        tokio::fs::write(&path, file.content())
            .await
            .with_context(|| format!("Failed to store {}", file.filename()))?;

        Ok((path, key))
    }

    /// Keys are generated by [`Service::store_file`]: a UUID and a known
    /// extension, nothing that could walk out of the uploads directory
    fn file_kind(key: &str) -> Option<FileKind> {
        let path = Path::new(key);
        if path.file_name()?.to_str()? != key {
            return None;
        }
        let stem = path.file_stem()?.to_str()?;
        Uuid::parse_str(stem).ok()?;
        FileKind::from_extension(path.extension()?.to_str()?)
    }
}
