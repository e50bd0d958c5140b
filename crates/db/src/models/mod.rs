pub mod message;
pub mod notification;
pub mod project;
pub mod task;
pub mod team;
pub mod user;
