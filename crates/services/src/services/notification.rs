use db::models::notification::{CreateNotification, Notification, NotificationFeed};
use sqlx::SqlitePool;
use tracing::{debug, warn};
use uuid::Uuid;

use super::events::{EventService, TeamEventPayload};

/// Notifications shown in the feed
pub const FEED_LIMIT: i64 = 50;

/// Persists per-user notifications and announces them on the team channel
#[derive(Clone)]
pub struct NotificationService {
    pool: SqlitePool,
    events: EventService,
}

impl NotificationService {
    pub fn new(pool: SqlitePool, events: EventService) -> Self {
        Self { pool, events }
    }

    /// Write a notification and broadcast it. A failed write is logged and swallowed so
    /// the mutation that triggered it still succeeds.
    pub async fn notify_user(
        &self,
        team_id: Uuid,
        data: CreateNotification,
    ) -> Option<Notification> {
        match Notification::create(&self.pool, &data).await {
            Ok(notification) => {
                debug!(
                    user_id = %notification.user_id,
                    notification_id = %notification.id,
                    "Created notification"
                );
                self.events.emit(
                    team_id,
                    TeamEventPayload::NotificationNew(notification.clone()),
                );
                Some(notification)
            }
            Err(e) => {
                warn!(user_id = %data.user_id, "Failed to create notification: {}", e);
                None
            }
        }
    }

    pub async fn feed(&self, user_id: Uuid) -> Result<NotificationFeed, sqlx::Error> {
        let notifications = Notification::find_by_user_id(&self.pool, user_id, FEED_LIMIT).await?;
        let unread_count = Notification::count_unread(&self.pool, user_id).await?;
        Ok(NotificationFeed {
            notifications,
            unread_count,
        })
    }

    /// Returns false when the notification doesn't exist or belongs to someone else.
    pub async fn mark_read(&self, id: Uuid, user_id: Uuid) -> Result<bool, sqlx::Error> {
        Ok(Notification::mark_read(&self.pool, id, user_id).await? > 0)
    }

    pub async fn mark_all_read(&self, user_id: Uuid) -> Result<u64, sqlx::Error> {
        Notification::mark_all_read(&self.pool, user_id).await
    }
}
