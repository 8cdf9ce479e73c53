pub mod auth;
pub mod health;
pub mod notifications;
pub mod pins;
pub mod proposals;
