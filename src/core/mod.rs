// src/core/mod.rs
//! Core services shared by the web server and the admin CLI

pub mod config_manager;
pub mod database;

pub use config_manager::ConfigManager;
pub use database::Database;
