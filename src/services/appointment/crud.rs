use super::shared::{map_appointment_row, APPOINTMENT_COLUMNS};
use super::AppointmentService;
use crate::models::appointment::{appointment_duration, Appointment};
use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Local};
use rusqlite::{self, params};

impl<'a> AppointmentService<'a> {
    /// Insert a new appointment.
    pub fn create(&self, appointment: Appointment) -> Result<Appointment> {
        appointment.validate().map_err(|e| anyhow!(e))?;

        let now = Local::now().to_rfc3339();
        self.conn
            .execute(
                "INSERT INTO appointments (
                    id, start_datetime, end_datetime, status, technician_id,
                    work_order_id, client_name, equipment, address, cost,
                    created_at, updated_at
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
                params![
                    appointment.id,
                    appointment.start.to_rfc3339(),
                    appointment.end.to_rfc3339(),
                    appointment.status.as_str(),
                    appointment.technician_id,
                    appointment.work_order_id,
                    appointment.details.client_name,
                    appointment.details.equipment,
                    appointment.details.address,
                    appointment.details.cost,
                    &now,
                    &now,
                ],
            )
            .with_context(|| format!("Failed to insert appointment {}", appointment.id))?;

        Ok(appointment)
    }

    /// Retrieve an appointment by id.
    pub fn get(&self, id: &str) -> Result<Option<Appointment>> {
        let result = self.conn.query_row(
            &format!("SELECT {} FROM appointments WHERE id = ?", APPOINTMENT_COLUMNS),
            [id],
            map_appointment_row,
        );

        match result {
            Ok(appointment) => Ok(Some(appointment)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Move an appointment to `new_start`, recomputing its end time.
    ///
    /// Repeating the call with the same start is harmless and returns the
    /// same row.
    pub fn update_start_time(&self, id: &str, new_start: DateTime<Local>) -> Result<Appointment> {
        let new_end = new_start + appointment_duration();

        let rows_affected = self
            .conn
            .execute(
                "UPDATE appointments SET start_datetime = ?, end_datetime = ?, updated_at = ?
                 WHERE id = ?",
                params![
                    new_start.to_rfc3339(),
                    new_end.to_rfc3339(),
                    Local::now().to_rfc3339(),
                    id,
                ],
            )
            .with_context(|| format!("Failed to update start time of appointment {}", id))?;

        if rows_affected == 0 {
            return Err(anyhow!("Appointment with id {} not found", id));
        }

        self.get(id)?
            .ok_or_else(|| anyhow!("Appointment with id {} vanished after update", id))
    }
}
