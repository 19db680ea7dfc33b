pub mod auth;
pub mod health;
pub mod home;
pub mod notifications;
pub mod posts;
pub mod users;
