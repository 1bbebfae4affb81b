// StudyTrack API library entry
// Exposes the modules so integration tests and the bin target share one crate.

pub mod auth;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod models;
pub mod repos;
pub mod server;
pub mod services;
