use super::{Service, ServiceError};
use crate::database;
use crate::models::{Caller, Notification, NotificationID};

impl Service {
    /// The caller's notifications, newest first
    pub async fn notifications(&self, caller: &Caller) -> Result<Vec<Notification>, ServiceError> {
        Ok(database::notifications::list_for_user(&self.pool, caller.id).await?)
    }

    /// Idempotent: marking a read notification again returns it unchanged
    pub async fn mark_notification_read(
        &self,
        caller: &Caller,
        id: NotificationID,
    ) -> Result<Notification, ServiceError> {
        let notification = database::notifications::find(&self.pool, id)
            .await?
            .ok_or(ServiceError::NotFound("Notification not found"))?;
        self.enforce(caller).read_notification(notification.user_id)?;

        if notification.is_read {
            return Ok(notification);
        }

        database::notifications::mark_read(&self.pool, id)
            .await?
            .ok_or(ServiceError::NotFound("Notification not found"))
    }
}
