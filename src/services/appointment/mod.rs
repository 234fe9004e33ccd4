//! Appointment persistence.
//! SQLite-backed create/read/move operations, split across focused submodules.

use rusqlite::Connection;

pub mod crud;
pub mod queries;
mod shared;

/// Service for appointments stored in SQLite.
pub struct AppointmentService<'a> {
    pub(crate) conn: &'a Connection,
}

impl<'a> AppointmentService<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::appointment::Appointment;
    use crate::models::status::AppointmentStatus;
    use crate::services::database::Database;
    use crate::utils::date::{day_range, slot_key_of, TimeGrid};
    use chrono::{DateTime, Duration, Local, NaiveDate};

    fn setup_test_db() -> Database {
        let db = Database::new(":memory:").unwrap();
        db.initialize_schema().unwrap();
        db
    }

    fn june_3() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 3).unwrap()
    }

    fn at(date: NaiveDate, hour: u32) -> DateTime<Local> {
        TimeGrid::default()
            .start_of_slot(slot_key_of(date, hour))
            .unwrap()
    }

    fn sample(id: &str, hour: u32, technician: &str) -> Appointment {
        Appointment::builder()
            .id(id)
            .start(at(june_3(), hour))
            .technician(technician)
            .client_name("Northside Bakery")
            .equipment("Walk-in freezer")
            .address("12 Mill Lane")
            .cost(250.0)
            .build()
            .unwrap()
    }

    #[test]
    fn test_create_and_get() {
        let db = setup_test_db();
        let service = AppointmentService::new(db.connection());

        let created = service.create(sample("apt-1", 9, "tech-1")).unwrap();
        let found = service.get("apt-1").unwrap().unwrap();

        assert_eq!(found, created);
        assert_eq!(found.details.client_name.as_deref(), Some("Northside Bakery"));
    }

    #[test]
    fn test_create_duplicate_id_fails() {
        let db = setup_test_db();
        let service = AppointmentService::new(db.connection());

        service.create(sample("apt-1", 9, "tech-1")).unwrap();
        assert!(service.create(sample("apt-1", 10, "tech-1")).is_err());
    }

    #[test]
    fn test_get_nonexistent() {
        let db = setup_test_db();
        let service = AppointmentService::new(db.connection());

        assert!(service.get("missing").unwrap().is_none());
    }

    #[test]
    fn test_update_start_time_recomputes_end() {
        let db = setup_test_db();
        let service = AppointmentService::new(db.connection());
        service.create(sample("apt-1", 9, "tech-1")).unwrap();

        let moved = service.update_start_time("apt-1", at(june_3(), 14)).unwrap();

        assert_eq!(moved.start, at(june_3(), 14));
        assert_eq!(moved.end, at(june_3(), 14) + Duration::minutes(60));
        assert_eq!(service.get("apt-1").unwrap().unwrap(), moved);
    }

    #[test]
    fn test_update_start_time_is_idempotent() {
        let db = setup_test_db();
        let service = AppointmentService::new(db.connection());
        service.create(sample("apt-1", 9, "tech-1")).unwrap();

        let first = service.update_start_time("apt-1", at(june_3(), 14)).unwrap();
        let second = service.update_start_time("apt-1", at(june_3(), 14)).unwrap();

        assert_eq!(first, second);
        assert_eq!(service.list_all().unwrap().len(), 1);
    }

    #[test]
    fn test_update_start_time_nonexistent() {
        let db = setup_test_db();
        let service = AppointmentService::new(db.connection());

        assert!(service.update_start_time("missing", at(june_3(), 14)).is_err());
    }

    #[test]
    fn test_find_in_range_filters_by_day_and_technician() {
        let db = setup_test_db();
        let service = AppointmentService::new(db.connection());

        service.create(sample("apt-1", 9, "tech-1")).unwrap();
        service.create(sample("apt-2", 10, "tech-2")).unwrap();
        let next_day = sample("apt-3", 9, "tech-1").rescheduled_to(at(june_3().succ_opt().unwrap(), 9));
        service.create(next_day).unwrap();

        let range = day_range(june_3()).unwrap();

        let all = service.find_in_range(&range, None).unwrap();
        assert_eq!(
            all.iter().map(|a| a.id.as_str()).collect::<Vec<_>>(),
            vec!["apt-1", "apt-2"]
        );

        let tech_1 = service.find_in_range(&range, Some("tech-1")).unwrap();
        assert_eq!(tech_1.len(), 1);
        assert_eq!(tech_1[0].id, "apt-1");
    }

    #[test]
    fn test_status_round_trips() {
        let db = setup_test_db();
        let service = AppointmentService::new(db.connection());

        let mut appointment = sample("apt-1", 9, "tech-1");
        appointment.status = AppointmentStatus::AwaitingParts;
        service.create(appointment).unwrap();

        let found = service.get("apt-1").unwrap().unwrap();
        assert_eq!(found.status, AppointmentStatus::AwaitingParts);
    }

    #[test]
    fn test_legacy_status_text_is_migrated_on_read() {
        let db = setup_test_db();
        let service = AppointmentService::new(db.connection());
        service.create(sample("apt-1", 9, "tech-1")).unwrap();

        db.connection()
            .execute("UPDATE appointments SET status = 'on_the_way' WHERE id = 'apt-1'", [])
            .unwrap();

        let found = service.get("apt-1").unwrap().unwrap();
        assert_eq!(found.status, AppointmentStatus::EnRoute);
    }
}
