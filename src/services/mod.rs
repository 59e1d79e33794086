pub mod notifier;
pub mod redis_service;
pub mod state_store;
