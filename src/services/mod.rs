// Service module exports

pub mod appointment;
pub mod database;
pub mod reschedule;
pub mod settings;
pub mod store;
