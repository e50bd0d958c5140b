use async_trait::async_trait;
use db::DBService;
use services::services::{
    assistant::AssistantService, config::Config, events::EventService,
    notification::NotificationService,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DeploymentError {
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Everything a request handler needs, wired once at startup.
#[async_trait]
pub trait Deployment: Clone + Send + Sync + 'static {
    async fn new(config: Config) -> Result<Self, DeploymentError>;

    fn config(&self) -> &Config;

    fn db(&self) -> &DBService;

    fn events(&self) -> &EventService;

    fn notifications(&self) -> &NotificationService;

    fn assistant(&self) -> &AssistantService;
}
