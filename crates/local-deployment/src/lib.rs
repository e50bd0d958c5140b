use std::sync::Arc;

use async_trait::async_trait;
use db::DBService;
use deployment::{Deployment, DeploymentError};
use services::services::{
    assistant::AssistantService,
    config::Config,
    events::{DEFAULT_CHANNEL_CAPACITY, EventService},
    notification::NotificationService,
};
use tracing::info;

/// Single-process deployment: one SQLite pool and one in-memory event hub.
#[derive(Clone)]
pub struct LocalDeployment {
    config: Arc<Config>,
    db: DBService,
    events: EventService,
    notifications: NotificationService,
    assistant: AssistantService,
}

impl LocalDeployment {
    /// Wire services around an already opened database.
    pub fn from_db(config: Config, db: DBService) -> Self {
        let events = EventService::new(DEFAULT_CHANNEL_CAPACITY);
        let notifications = NotificationService::new(db.pool.clone(), events.clone());
        let assistant = AssistantService::new(
            db.pool.clone(),
            events.clone(),
            notifications.clone(),
            config.assistant,
        );
        Self {
            config: Arc::new(config),
            db,
            events,
            notifications,
            assistant,
        }
    }
}

#[async_trait]
impl Deployment for LocalDeployment {
    async fn new(config: Config) -> Result<Self, DeploymentError> {
        let db = DBService::new(&config.database_url).await?;
        info!(
            page_size = config.assistant.page_size,
            my_tasks_page_size = config.assistant.my_tasks_page_size,
            "Local deployment ready"
        );
        Ok(Self::from_db(config, db))
    }

    fn config(&self) -> &Config {
        &self.config
    }

    fn db(&self) -> &DBService {
        &self.db
    }

    fn events(&self) -> &EventService {
        &self.events
    }

    fn notifications(&self) -> &NotificationService {
        &self.notifications
    }

    fn assistant(&self) -> &AssistantService {
        &self.assistant
    }
}
