pub mod commands;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod server;
pub mod services;
