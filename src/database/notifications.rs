use chrono::{DateTime, Utc};
use sqlx::SqliteExecutor;

use crate::models::{Notification, NotificationID, UserID};

const NOTIFICATION_COLUMNS: &str = "id, user_id, title, message, is_read, created_at";

pub async fn insert(
    executor: impl SqliteExecutor<'_>,
    user_id: UserID,
    title: &str,
    message: &str,
    created_at: DateTime<Utc>,
) -> Result<Notification, sqlx::Error> {
    sqlx::query_as::<_, Notification>(&format!(
        "INSERT INTO notifications (user_id, title, message, is_read, created_at)
         VALUES (?, ?, ?, 0, ?)
         RETURNING {NOTIFICATION_COLUMNS}"
    ))
    .bind(user_id)
    .bind(title)
    .bind(message)
    .bind(created_at)
    .fetch_one(executor)
    .await
}

pub async fn list_for_user(
    executor: impl SqliteExecutor<'_>,
    user_id: UserID,
) -> Result<Vec<Notification>, sqlx::Error> {
    sqlx::query_as::<_, Notification>(&format!(
        "SELECT {NOTIFICATION_COLUMNS} FROM notifications
         WHERE user_id = ?
         ORDER BY created_at DESC, id DESC"
    ))
    .bind(user_id)
    .fetch_all(executor)
    .await
}

pub async fn find(
    executor: impl SqliteExecutor<'_>,
    id: NotificationID,
) -> Result<Option<Notification>, sqlx::Error> {
    sqlx::query_as::<_, Notification>(&format!(
        "SELECT {NOTIFICATION_COLUMNS} FROM notifications WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(executor)
    .await
}

/// Setting an already read notification again is a no-op
pub async fn mark_read(
    executor: impl SqliteExecutor<'_>,
    id: NotificationID,
) -> Result<Option<Notification>, sqlx::Error> {
    sqlx::query_as::<_, Notification>(&format!(
        "UPDATE notifications SET is_read = 1 WHERE id = ? RETURNING {NOTIFICATION_COLUMNS}"
    ))
    .bind(id)
    .fetch_optional(executor)
    .await
}
