pub mod assistant;
pub mod config;
pub mod events;
pub mod notification;
