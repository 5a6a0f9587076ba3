//! Registration, login and token checks

use anyhow::anyhow;
use chrono::Utc;
use log::{info, warn};

use super::{Service, ServiceError};
use crate::database;
use crate::models::{Caller, Role, User};
use crate::utils::error_messages::TOKEN_INVALID;
use crate::utils::password_utils::{hash, verify, PWHash};
use crate::utils::validation::{EmailInput, PasswordInput, TextInput};

impl Service {
    /// Creates the user and the profile matching its role, in one
    /// transaction. Returns the user and a fresh token.
    pub async fn register(
        &self,
        email: EmailInput,
        password: PasswordInput,
        name: TextInput,
        role: Role,
    ) -> Result<(User, String), ServiceError> {
        if role == Role::Admin {
            return Err(ServiceError::invalid("Role must be PATIENT or DOCTOR"));
        }

        let user = self.create_user(&email, &password, &name, role).await?;
        info!("Account created for {} as {role}", user.email);

        let token = self.issue_token(&user)?;
        Ok((user, token))
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<(User, String), ServiceError> {
        let found = database::users::find_credentials(&self.pool, email).await?;

        let (user, stored) = match found {
            Some((user, stored)) => match stored.parse::<PWHash>() {
                Ok(stored) => (Some(user), Some(stored)),
                Err(e) => {
                    warn!("Unreadable password hash for user {}: {e}", user.id);
                    (None, None)
                }
            },
            None => (None, None),
        };

        if !verify(password, stored.as_ref()) {
            return Err(ServiceError::InvalidCredentials);
        }
        let user = user.ok_or(ServiceError::InvalidCredentials)?;

        let token = self.issue_token(&user)?;
        Ok((user, token))
    }

    /// Identity carried by a cookie token
    pub fn authenticate(&self, token: &str) -> Result<Caller, ServiceError> {
        self.keys
            .verify(token)
            .map(Caller::from)
            .ok_or(ServiceError::Unauthenticated(TOKEN_INVALID))
    }

    /// Creates the configured administrator unless the email is taken
    pub async fn bootstrap_admin(&self, email: &str, password: &str) -> Result<(), ServiceError> {
        let email = EmailInput::new(email).map_err(ServiceError::invalid)?;
        if database::users::email_exists(&self.pool, email.as_str()).await? {
            info!("Administrator {email} already exists");
            return Ok(());
        }

        let password =
            PasswordInput::new(password, &[email.as_str(), email.local_part()])
                .map_err(ServiceError::invalid)?;
        let name = TextInput::new_short_form("Administrator").map_err(ServiceError::invalid)?;

        self.create_user(&email, &password, &name, Role::Admin).await?;
        info!("Administrator {email} created");
        Ok(())
    }

    async fn create_user(
        &self,
        email: &EmailInput,
        password: &PasswordInput,
        name: &TextInput,
        role: Role,
    ) -> Result<User, ServiceError> {
        let password_hash = hash(password.as_str())
            .map_err(|e| anyhow!("Failed to hash password: {e}"))?;

        let mut tx = self.pool.begin().await?;

        if database::users::email_exists(&mut *tx, email.as_str()).await? {
            return Err(ServiceError::EmailAlreadyExists);
        }

        let user = database::users::insert(
            &mut *tx,
            email.as_str(),
            password_hash.as_str(),
            name.as_str(),
            role,
            Utc::now(),
        )
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                ServiceError::EmailAlreadyExists
            }
            e => ServiceError::Database(e),
        })?;

        match role {
            Role::Doctor => {
                database::profiles::insert_doctor(&mut *tx, user.id).await?;
            }
            Role::Patient => {
                database::profiles::insert_patient(&mut *tx, user.id).await?;
            }
            Role::Admin => {}
        }

        tx.commit().await?;
        Ok(user)
    }

    fn issue_token(&self, user: &User) -> Result<String, ServiceError> {
        let caller = Caller {
            id: user.id,
            role: user.role,
        };
        self.keys
            .generate(caller)
            .map_err(|e| ServiceError::Internal(anyhow!("Failed to sign token: {e}")))
    }
}
