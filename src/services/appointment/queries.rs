use super::shared::{map_appointment_row, APPOINTMENT_COLUMNS};
use super::AppointmentService;
use crate::models::appointment::Appointment;
use crate::utils::date::DateRange;
use anyhow::Result;

impl<'a> AppointmentService<'a> {
    /// List every appointment ordered by start time.
    pub fn list_all(&self) -> Result<Vec<Appointment>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM appointments ORDER BY start_datetime ASC, id ASC",
            APPOINTMENT_COLUMNS
        ))?;

        let appointments = stmt
            .query_map([], map_appointment_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(appointments)
    }

    /// Appointments starting inside `range`, optionally for one technician.
    pub fn find_in_range(
        &self,
        range: &DateRange,
        technician_id: Option<&str>,
    ) -> Result<Vec<Appointment>> {
        // Stored values keep their original UTC offset, so compare on the
        // filtered rows rather than on the raw text.
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM appointments
             WHERE (?1 IS NULL OR technician_id = ?1)
             ORDER BY start_datetime ASC, id ASC",
            APPOINTMENT_COLUMNS
        ))?;

        let appointments = stmt
            .query_map([technician_id], map_appointment_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut in_range: Vec<Appointment> = appointments
            .into_iter()
            .filter(|appointment| range.contains(&appointment.start))
            .collect();
        in_range.sort_by(|a, b| a.start.cmp(&b.start).then_with(|| a.id.cmp(&b.id)));

        Ok(in_range)
    }
}
