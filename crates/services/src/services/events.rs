//! In-process team event hub.
//!
//! Every mutation is published on a single broadcast channel, tagged with the team it
//! belongs to. Subscribers filter by team. Delivery is best effort: a send with no
//! receivers, or a lagging receiver, simply drops events.

use db::models::{
    message::MessageWithSender, notification::Notification, task::TaskWithAssignee, user::User,
};
use serde::Serialize;
use tokio::sync::broadcast;
use tracing::debug;
use uuid::Uuid;

pub const DEFAULT_CHANNEL_CAPACITY: usize = 256;

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", content = "payload")]
pub enum TeamEventPayload {
    #[serde(rename = "task:created")]
    TaskCreated(TaskWithAssignee),
    #[serde(rename = "task:updated")]
    TaskUpdated(TaskWithAssignee),
    #[serde(rename = "task:deleted")]
    TaskDeleted { task_id: Uuid },
    #[serde(rename = "notification:new")]
    NotificationNew(Notification),
    #[serde(rename = "team:member-added")]
    MemberAdded(User),
    #[serde(rename = "team:member-updated")]
    MemberUpdated(User),
    #[serde(rename = "team:member-removed")]
    MemberRemoved { member_id: Uuid },
    #[serde(rename = "message:new")]
    MessageNew(MessageWithSender),
}

impl TeamEventPayload {
    pub fn name(&self) -> &'static str {
        match self {
            TeamEventPayload::TaskCreated(_) => "task:created",
            TeamEventPayload::TaskUpdated(_) => "task:updated",
            TeamEventPayload::TaskDeleted { .. } => "task:deleted",
            TeamEventPayload::NotificationNew(_) => "notification:new",
            TeamEventPayload::MemberAdded(_) => "team:member-added",
            TeamEventPayload::MemberUpdated(_) => "team:member-updated",
            TeamEventPayload::MemberRemoved { .. } => "team:member-removed",
            TeamEventPayload::MessageNew(_) => "message:new",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TeamEvent {
    pub team_id: Uuid,
    #[serde(flatten)]
    pub payload: TeamEventPayload,
}

#[derive(Debug, Clone)]
pub struct EventService {
    sender: broadcast::Sender<TeamEvent>,
}

impl Default for EventService {
    fn default() -> Self {
        Self::new(DEFAULT_CHANNEL_CAPACITY)
    }
}

impl EventService {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Fire and forget. Returns the number of receivers that saw the event.
    pub fn emit(&self, team_id: Uuid, payload: TeamEventPayload) -> usize {
        let event = payload.name();
        match self.sender.send(TeamEvent { team_id, payload }) {
            Ok(receivers) => {
                debug!(%team_id, event, receivers, "Broadcast team event");
                receivers
            }
            Err(_) => {
                debug!(%team_id, event, "No subscribers for team event");
                0
            }
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<TeamEvent> {
        self.sender.subscribe()
    }
}
