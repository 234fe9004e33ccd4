//! Scheduler settings persistence.

mod service;

pub use service::SettingsService;
