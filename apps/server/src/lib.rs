//! WildChurch Server Library
//!
//! Gathering proposals with quorum confirmation, rate-limited map pins and
//! the notification queue behind the WildChurch community map.

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod events;
pub mod middleware;
pub mod models;
pub mod notify;
pub mod pagination;
pub mod routes;
pub mod services;
