// Visit Scheduler Library
// Appointment rescheduling engine for field-service calendars

pub mod models;
pub mod services;
pub mod utils;
