// Test fixtures - reusable schedule data and store doubles
#![allow(dead_code)]

use anyhow::anyhow;
use chrono::{DateTime, Local, NaiveDate};
use std::cell::{Cell, RefCell};
use std::collections::HashSet;

use visit_scheduler::models::appointment::Appointment;
use visit_scheduler::services::appointment::AppointmentService;
use visit_scheduler::services::store::{AppointmentStore, SqliteAppointmentStore};
use visit_scheduler::utils::date::{slot_key_of, DateRange, TimeGrid};

/// Monday 3 June 2024
pub fn monday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 3).unwrap()
}

pub fn at(date: NaiveDate, hour: u32) -> DateTime<Local> {
    TimeGrid::default()
        .start_of_slot(slot_key_of(date, hour))
        .unwrap()
}

pub fn visit(id: &str, date: NaiveDate, hour: u32) -> Appointment {
    Appointment::builder()
        .id(id)
        .start(at(date, hour))
        .technician("tech-1")
        .build()
        .unwrap()
}

/// In-memory SQLite store holding `appointments`.
pub fn seeded_store(appointments: Vec<Appointment>) -> SqliteAppointmentStore {
    let store = SqliteAppointmentStore::open(":memory:").unwrap();
    let service = AppointmentService::new(store.database().connection());
    for appointment in appointments {
        service.create(appointment).unwrap();
    }
    store
}

/// Wraps a real store and fails updates for chosen appointments.
pub struct FlakyStore {
    pub inner: SqliteAppointmentStore,
    pub failing_ids: RefCell<HashSet<String>>,
    pub update_calls: RefCell<Vec<String>>,
    pub fetch_calls: Cell<usize>,
}

impl FlakyStore {
    pub fn new(inner: SqliteAppointmentStore) -> Self {
        Self {
            inner,
            failing_ids: RefCell::new(HashSet::new()),
            update_calls: RefCell::new(Vec::new()),
            fetch_calls: Cell::new(0),
        }
    }

    pub fn fail_on(&self, appointment_id: &str) {
        self.failing_ids
            .borrow_mut()
            .insert(appointment_id.to_string());
    }

    pub fn heal(&self) {
        self.failing_ids.borrow_mut().clear();
    }
}

impl AppointmentStore for FlakyStore {
    async fn fetch_appointments(
        &self,
        range: &DateRange,
        technician_id: Option<&str>,
    ) -> anyhow::Result<Vec<Appointment>> {
        self.fetch_calls.set(self.fetch_calls.get() + 1);
        self.inner.fetch_appointments(range, technician_id).await
    }

    async fn update_appointment_start_time(
        &self,
        appointment_id: &str,
        new_start: DateTime<Local>,
    ) -> anyhow::Result<Appointment> {
        self.update_calls
            .borrow_mut()
            .push(appointment_id.to_string());
        if self.failing_ids.borrow().contains(appointment_id) {
            return Err(anyhow!("gateway timeout"));
        }
        self.inner
            .update_appointment_start_time(appointment_id, new_start)
            .await
    }
}
