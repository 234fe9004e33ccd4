//! Slot index: which persisted appointments sit in which (day, hour) slot.
//!
//! Rebuilt from scratch whenever the appointment list changes. The list only
//! ever covers the visible day or week, so a full rebuild stays cheap.

use chrono::NaiveDate;
use std::collections::HashMap;

use crate::models::appointment::Appointment;
use crate::utils::date::{slot_key_of, SlotKey};

#[derive(Debug, Clone, Default)]
pub struct SlotIndex {
    appointments: Vec<Appointment>,
    by_id: HashMap<String, usize>,
    slots: HashMap<SlotKey, Vec<usize>>,
}

impl SlotIndex {
    /// Index `appointments` by the slot of their start time.
    ///
    /// Occupants of a slot keep the order they had in the input. A repeated
    /// identifier is dropped after its first occurrence.
    pub fn build(appointments: Vec<Appointment>) -> Self {
        let mut index = SlotIndex::default();

        for appointment in appointments {
            if index.by_id.contains_key(&appointment.id) {
                log::warn!("Ignoring duplicate appointment {} in slot index", appointment.id);
                continue;
            }

            let position = index.appointments.len();
            index
                .slots
                .entry(SlotKey::of_datetime(&appointment.start))
                .or_default()
                .push(position);
            index.by_id.insert(appointment.id.clone(), position);
            index.appointments.push(appointment);
        }

        index
    }

    /// Appointments persisted in the slot at (`date`, `hour`).
    pub fn lookup(&self, date: NaiveDate, hour: u32) -> Vec<&Appointment> {
        self.at(slot_key_of(date, hour)).collect()
    }

    /// Appointments persisted in `key`, in insertion order.
    pub fn at(&self, key: SlotKey) -> impl Iterator<Item = &Appointment> + '_ {
        self.slots
            .get(&key)
            .into_iter()
            .flatten()
            .map(move |position| &self.appointments[*position])
    }

    pub fn get(&self, appointment_id: &str) -> Option<&Appointment> {
        self.by_id
            .get(appointment_id)
            .map(|position| &self.appointments[*position])
    }

    pub fn contains(&self, appointment_id: &str) -> bool {
        self.by_id.contains_key(appointment_id)
    }

    /// Persisted slot of an appointment.
    pub fn slot_of(&self, appointment_id: &str) -> Option<SlotKey> {
        self.get(appointment_id)
            .map(|appointment| SlotKey::of_datetime(&appointment.start))
    }

    pub fn appointments(&self) -> &[Appointment] {
        &self.appointments
    }

    pub fn len(&self) -> usize {
        self.appointments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.appointments.is_empty()
    }

    /// Consume the index, giving back the appointment list.
    pub fn into_appointments(self) -> Vec<Appointment> {
        self.appointments
    }
}
