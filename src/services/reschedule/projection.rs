//! View projection.
//!
//! Works out what a calendar cell should show: the persisted occupants of the
//! slot minus anything with a pending move, plus anything pending into the
//! slot. Pure; recomputed on every render.

use chrono::{DateTime, Local, NaiveDate};

use super::ledger::PendingMoveLedger;
use super::slot_index::SlotIndex;
use crate::models::appointment::Appointment;
use crate::utils::date::{slot_key_of, DateRange, SlotKey, TimeGrid};

/// An appointment as it should be displayed right now.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectedAppointment {
    /// Appointment with start and end overridden when a move is pending.
    pub appointment: Appointment,
    pub pending: bool,
    /// Persisted start, set only for pending appointments.
    pub persisted_start: Option<DateTime<Local>>,
}

impl ProjectedAppointment {
    fn persisted(appointment: &Appointment) -> Self {
        Self {
            appointment: appointment.clone(),
            pending: false,
            persisted_start: None,
        }
    }

    fn moved(appointment: &Appointment, proposed_start: DateTime<Local>) -> Self {
        Self {
            appointment: appointment.rescheduled_to(proposed_start),
            pending: true,
            persisted_start: Some(appointment.start),
        }
    }

    pub fn id(&self) -> &str {
        &self.appointment.id
    }
}

/// Appointments to display in the slot at (`date`, `hour`).
pub fn project(
    index: &SlotIndex,
    ledger: &PendingMoveLedger,
    date: NaiveDate,
    hour: u32,
) -> Vec<ProjectedAppointment> {
    project_slot(index, ledger, slot_key_of(date, hour))
}

/// Appointments to display in `slot`.
pub fn project_slot(
    index: &SlotIndex,
    ledger: &PendingMoveLedger,
    slot: SlotKey,
) -> Vec<ProjectedAppointment> {
    // Anything with a pending move has left its persisted slot, even when the
    // move lands in the same hour; it comes back below flagged as pending.
    let mut projected: Vec<ProjectedAppointment> = index
        .at(slot)
        .filter(|appointment| !ledger.contains(&appointment.id))
        .map(ProjectedAppointment::persisted)
        .collect();

    projected.extend(
        ledger
            .entries()
            .iter()
            .filter(|pending| pending.target_slot() == slot)
            .filter_map(|pending| {
                index
                    .get(&pending.appointment_id)
                    .map(|appointment| ProjectedAppointment::moved(appointment, pending.proposed_start))
            }),
    );

    projected
}

/// One cell of a projected calendar grid.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectedCell {
    pub slot: SlotKey,
    pub bookable: bool,
    pub appointments: Vec<ProjectedAppointment>,
}

impl ProjectedCell {
    pub fn is_empty(&self) -> bool {
        self.appointments.is_empty()
    }

    pub fn has_pending(&self) -> bool {
        self.appointments.iter().any(|item| item.pending)
    }
}

/// Projected cells for every work hour of every day in `range`, day by day.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectedGrid {
    pub days: Vec<NaiveDate>,
    pub hours: Vec<u32>,
    cells: Vec<ProjectedCell>,
}

impl ProjectedGrid {
    pub fn build(
        index: &SlotIndex,
        ledger: &PendingMoveLedger,
        grid: &TimeGrid,
        range: &DateRange,
    ) -> Self {
        let days = range.days();
        let hours = grid.work_hours();

        let cells = days
            .iter()
            .flat_map(|date| hours.iter().map(move |hour| slot_key_of(*date, *hour)))
            .map(|slot| ProjectedCell {
                slot,
                bookable: grid.is_bookable(slot.hour),
                appointments: project_slot(index, ledger, slot),
            })
            .collect();

        Self { days, hours, cells }
    }

    pub fn cell(&self, date: NaiveDate, hour: u32) -> Option<&ProjectedCell> {
        let day = self.days.iter().position(|d| *d == date)?;
        let row = self.hours.iter().position(|h| *h == hour)?;
        self.cells.get(day * self.hours.len() + row)
    }

    /// Cells of one day, in hour order.
    pub fn day(&self, date: NaiveDate) -> &[ProjectedCell] {
        match self.days.iter().position(|d| *d == date) {
            Some(day) => {
                let width = self.hours.len();
                &self.cells[day * width..(day + 1) * width]
            }
            None => &[],
        }
    }

    pub fn cells(&self) -> &[ProjectedCell] {
        &self.cells
    }

    pub fn appointment_count(&self) -> usize {
        self.cells.iter().map(|cell| cell.appointments.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::date::{day_range, TimeGrid};
    use chrono::TimeZone;

    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 3).unwrap()
    }

    fn at(hour: u32) -> DateTime<Local> {
        TimeGrid::default()
            .start_of_slot(slot_key_of(monday(), hour))
            .unwrap()
    }

    fn now() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap()
    }

    fn index() -> SlotIndex {
        SlotIndex::build(vec![
            Appointment::new("x", at(9)).unwrap(),
            Appointment::new("y", at(10)).unwrap(),
        ])
    }

    fn ids(items: &[ProjectedAppointment]) -> Vec<&str> {
        items.iter().map(|item| item.id()).collect()
    }

    #[test]
    fn test_no_pending_moves_mirrors_index() {
        let index = index();
        let ledger = PendingMoveLedger::new();

        let nine = project(&index, &ledger, monday(), 9);
        assert_eq!(ids(&nine), vec!["x"]);
        assert!(!nine[0].pending);
        assert_eq!(nine[0].persisted_start, None);
    }

    #[test]
    fn test_pending_move_relocates_appointment() {
        let index = index();
        let mut ledger = PendingMoveLedger::new();
        ledger
            .propose(&index, &TimeGrid::default(), "x", monday(), 14, now())
            .unwrap();

        assert!(project(&index, &ledger, monday(), 9).is_empty());

        let two_pm = project(&index, &ledger, monday(), 14);
        assert_eq!(ids(&two_pm), vec!["x"]);
        assert!(two_pm[0].pending);
        assert_eq!(two_pm[0].appointment.start, at(14));
        assert_eq!(two_pm[0].appointment.end, at(15));
        assert_eq!(two_pm[0].persisted_start, Some(at(9)));
    }

    #[test]
    fn test_pending_arrivals_follow_persisted_occupants() {
        let index = SlotIndex::build(vec![
            Appointment::new("x", at(9)).unwrap(),
            Appointment::builder()
                .id("c")
                .start(at(14))
                .status(crate::models::status::AppointmentStatus::Cancelled)
                .build()
                .unwrap(),
        ]);
        let mut ledger = PendingMoveLedger::new();
        ledger
            .propose(&index, &TimeGrid::default(), "x", monday(), 14, now())
            .unwrap();

        assert_eq!(ids(&project(&index, &ledger, monday(), 14)), vec!["c", "x"]);
    }

    #[test]
    fn test_projection_does_not_touch_inputs() {
        let index = index();
        let mut ledger = PendingMoveLedger::new();
        ledger
            .propose(&index, &TimeGrid::default(), "x", monday(), 14, now())
            .unwrap();
        let ledger_before = ledger.clone();

        let _ = project(&index, &ledger, monday(), 14);
        let _ = project(&index, &ledger, monday(), 9);

        assert_eq!(ledger, ledger_before);
        assert_eq!(index.slot_of("x"), Some(slot_key_of(monday(), 9)));
    }

    #[test]
    fn test_grid_covers_every_work_hour() {
        let index = index();
        let mut ledger = PendingMoveLedger::new();
        ledger
            .propose(&index, &TimeGrid::default(), "y", monday(), 16, now())
            .unwrap();

        let grid = ProjectedGrid::build(
            &index,
            &ledger,
            &TimeGrid::default(),
            &day_range(monday()).unwrap(),
        );

        assert_eq!(grid.cells().len(), 12);
        assert_eq!(grid.appointment_count(), 2);
        assert!(!grid.cell(monday(), 12).unwrap().bookable);
        assert!(grid.cell(monday(), 10).unwrap().is_empty());
        assert!(grid.cell(monday(), 16).unwrap().has_pending());
        assert_eq!(grid.day(monday()).len(), 12);
        assert!(grid.cell(monday(), 3).is_none());
    }
}
