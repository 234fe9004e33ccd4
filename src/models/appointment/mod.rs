// Appointment module
// Scheduled technician visit, the unit the rescheduling engine moves around

use chrono::{DateTime, Duration, Local};
use serde::{Deserialize, Serialize};

use crate::models::status::AppointmentStatus;

/// Every appointment lasts exactly this long.
pub const APPOINTMENT_DURATION_MINUTES: i64 = 60;

/// Fixed appointment length as a `chrono::Duration`.
pub fn appointment_duration() -> Duration {
    Duration::minutes(APPOINTMENT_DURATION_MINUTES)
}

/// Display payload carried along with an appointment.
///
/// The scheduling core never reads these fields; they only travel from the
/// store to whatever renders the calendar.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppointmentDetails {
    pub client_name: Option<String>,
    pub equipment: Option<String>,
    pub address: Option<String>,
    pub cost: Option<f64>,
}

/// A scheduled visit occupying one (day, hour) slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: String,
    pub start: DateTime<Local>,
    pub end: DateTime<Local>,
    pub status: AppointmentStatus,
    /// Assigned technician; unassigned visits exist.
    pub technician_id: Option<String>,
    pub work_order_id: Option<String>,
    pub details: AppointmentDetails,
}

impl Appointment {
    /// Create a scheduled appointment starting at `start`.
    ///
    /// The end time is derived from the fixed appointment duration.
    ///
    /// # Examples
    /// ```
    /// use visit_scheduler::models::appointment::Appointment;
    /// use chrono::{Duration, Local};
    ///
    /// let start = Local::now();
    /// let appointment = Appointment::new("apt-1", start).unwrap();
    /// assert_eq!(appointment.end - appointment.start, Duration::minutes(60));
    /// ```
    pub fn new(id: impl Into<String>, start: DateTime<Local>) -> Result<Self, String> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err("Appointment id cannot be empty".to_string());
        }

        Ok(Self {
            id,
            start,
            end: start + appointment_duration(),
            status: AppointmentStatus::Scheduled,
            technician_id: None,
            work_order_id: None,
            details: AppointmentDetails::default(),
        })
    }

    pub fn builder() -> AppointmentBuilder {
        AppointmentBuilder::new()
    }

    /// Validate the appointment invariants.
    pub fn validate(&self) -> Result<(), String> {
        if self.id.trim().is_empty() {
            return Err("Appointment id cannot be empty".to_string());
        }

        if self.end - self.start != appointment_duration() {
            return Err(format!(
                "Appointment must last exactly {} minutes",
                APPOINTMENT_DURATION_MINUTES
            ));
        }

        Ok(())
    }

    /// Copy of this appointment moved to `start`, end time recomputed.
    pub fn rescheduled_to(&self, start: DateTime<Local>) -> Self {
        Self {
            start,
            end: start + appointment_duration(),
            ..self.clone()
        }
    }

    /// Whether this appointment takes up its slot for conflict purposes.
    pub fn blocks_slot(&self) -> bool {
        self.status.blocks_slot()
    }
}

/// Builder for appointments with optional fields.
#[derive(Default)]
pub struct AppointmentBuilder {
    id: Option<String>,
    start: Option<DateTime<Local>>,
    status: AppointmentStatus,
    technician_id: Option<String>,
    work_order_id: Option<String>,
    details: AppointmentDetails,
}

impl AppointmentBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn start(mut self, start: DateTime<Local>) -> Self {
        self.start = Some(start);
        self
    }

    pub fn status(mut self, status: AppointmentStatus) -> Self {
        self.status = status;
        self
    }

    pub fn technician(mut self, technician_id: impl Into<String>) -> Self {
        self.technician_id = Some(technician_id.into());
        self
    }

    pub fn work_order(mut self, work_order_id: impl Into<String>) -> Self {
        self.work_order_id = Some(work_order_id.into());
        self
    }

    pub fn client_name(mut self, client_name: impl Into<String>) -> Self {
        self.details.client_name = Some(client_name.into());
        self
    }

    pub fn equipment(mut self, equipment: impl Into<String>) -> Self {
        self.details.equipment = Some(equipment.into());
        self
    }

    pub fn address(mut self, address: impl Into<String>) -> Self {
        self.details.address = Some(address.into());
        self
    }

    pub fn cost(mut self, cost: f64) -> Self {
        self.details.cost = Some(cost);
        self
    }

    pub fn build(self) -> Result<Appointment, String> {
        let id = self.id.ok_or("Appointment id is required")?;
        let start = self.start.ok_or("Appointment start time is required")?;

        let mut appointment = Appointment::new(id, start)?;
        appointment.status = self.status;
        appointment.technician_id = self.technician_id;
        appointment.work_order_id = self.work_order_id;
        appointment.details = self.details;

        appointment.validate()?;
        Ok(appointment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};

    fn nine_am() -> DateTime<Local> {
        Local
            .from_local_datetime(
                &NaiveDate::from_ymd_opt(2024, 6, 3)
                    .unwrap()
                    .and_hms_opt(9, 0, 0)
                    .unwrap(),
            )
            .single()
            .unwrap()
    }

    #[test]
    fn test_new_appointment_has_fixed_duration() {
        let appointment = Appointment::new("apt-1", nine_am()).unwrap();
        assert_eq!(appointment.end - appointment.start, Duration::minutes(60));
        assert_eq!(appointment.status, AppointmentStatus::Scheduled);
        assert!(appointment.technician_id.is_none());
    }

    #[test]
    fn test_new_appointment_empty_id() {
        let result = Appointment::new("   ", nine_am());
        assert!(result.is_err());
        assert_eq!(result.unwrap_err(), "Appointment id cannot be empty");
    }

    #[test]
    fn test_validate_rejects_wrong_duration() {
        let mut appointment = Appointment::new("apt-1", nine_am()).unwrap();
        appointment.end = appointment.start + Duration::minutes(90);
        assert!(appointment.validate().is_err());
    }

    #[test]
    fn test_rescheduled_to_keeps_payload() {
        let appointment = Appointment::builder()
            .id("apt-7")
            .start(nine_am())
            .technician("tech-1")
            .client_name("Acme Dairy")
            .equipment("Chiller")
            .cost(120.0)
            .build()
            .unwrap();

        let moved = appointment.rescheduled_to(nine_am() + Duration::hours(5));
        assert_eq!(moved.start, nine_am() + Duration::hours(5));
        assert_eq!(moved.end, nine_am() + Duration::hours(6));
        assert_eq!(moved.details, appointment.details);
        assert_eq!(moved.technician_id.as_deref(), Some("tech-1"));
    }

    #[test]
    fn test_builder_requires_start() {
        let result = Appointment::builder().id("apt-1").build();
        assert_eq!(result.unwrap_err(), "Appointment start time is required");
    }

    #[test]
    fn test_cancelled_does_not_block_slot() {
        let appointment = Appointment::builder()
            .id("apt-1")
            .start(nine_am())
            .status(AppointmentStatus::Cancelled)
            .build()
            .unwrap();
        assert!(!appointment.blocks_slot());
    }
}
