//! Appointment store seam.
//!
//! The rescheduling engine only ever reads a visible window of appointments
//! and moves single appointments in time. Both calls may suspend; nothing
//! else in the engine does.

use anyhow::{Context, Result};
use chrono::{DateTime, Local};

use crate::models::appointment::Appointment;
use crate::services::appointment::AppointmentService;
use crate::services::database::Database;
use crate::utils::date::DateRange;

/// Durable source of truth for appointments.
#[allow(async_fn_in_trait)]
pub trait AppointmentStore {
    /// Appointments starting inside `range`, optionally for one technician.
    async fn fetch_appointments(
        &self,
        range: &DateRange,
        technician_id: Option<&str>,
    ) -> Result<Vec<Appointment>>;

    /// Persist a new start time and return the stored appointment with its
    /// recomputed end time. Must be safe to repeat with the same arguments.
    async fn update_appointment_start_time(
        &self,
        appointment_id: &str,
        new_start: DateTime<Local>,
    ) -> Result<Appointment>;
}

/// Store backed by the local SQLite database.
pub struct SqliteAppointmentStore {
    db: Database,
}

impl SqliteAppointmentStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Open the database at `path` and make sure the schema exists.
    pub fn open(path: &str) -> Result<Self> {
        let db = Database::new(path)?;
        db.initialize_schema()
            .context("Failed to initialize appointment schema")?;
        Ok(Self::new(db))
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    fn service(&self) -> AppointmentService<'_> {
        AppointmentService::new(self.db.connection())
    }
}

impl AppointmentStore for SqliteAppointmentStore {
    async fn fetch_appointments(
        &self,
        range: &DateRange,
        technician_id: Option<&str>,
    ) -> Result<Vec<Appointment>> {
        self.service()
            .find_in_range(range, technician_id)
            .context("Failed to fetch appointments")
    }

    async fn update_appointment_start_time(
        &self,
        appointment_id: &str,
        new_start: DateTime<Local>,
    ) -> Result<Appointment> {
        self.service().update_start_time(appointment_id, new_start)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::date::{slot_key_of, week_containing, TimeGrid};
    use chrono::NaiveDate;

    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 3).unwrap()
    }

    fn at(hour: u32) -> DateTime<Local> {
        TimeGrid::default()
            .start_of_slot(slot_key_of(monday(), hour))
            .unwrap()
    }

    #[tokio::test]
    async fn test_fetch_and_update_through_store() {
        let store = SqliteAppointmentStore::open(":memory:").unwrap();
        AppointmentService::new(store.database().connection())
            .create(Appointment::new("apt-1", at(9)).unwrap())
            .unwrap();

        let week = week_containing(monday()).unwrap();
        let fetched = store.fetch_appointments(&week, None).await.unwrap();
        assert_eq!(fetched.len(), 1);

        let moved = store
            .update_appointment_start_time("apt-1", at(14))
            .await
            .unwrap();
        assert_eq!(moved.start, at(14));
        assert_eq!(moved.end, at(15));
    }

    #[tokio::test]
    async fn test_update_unknown_appointment_fails() {
        let store = SqliteAppointmentStore::open(":memory:").unwrap();
        let result = store.update_appointment_start_time("ghost", at(14)).await;
        assert!(result.is_err());
    }
}
