use chrono::{DateTime, Local};
use rusqlite::{self, Result, Row};

use crate::models::appointment::{Appointment, AppointmentDetails};
use crate::models::status::AppointmentStatus;

pub(crate) const APPOINTMENT_COLUMNS: &str = "id, start_datetime, end_datetime, status, technician_id,
        work_order_id, client_name, equipment, address, cost";

pub(crate) fn to_local_datetime(value: String) -> Result<DateTime<Local>> {
    DateTime::parse_from_rfc3339(&value)
        .map(|dt| dt.with_timezone(&Local))
        .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))
}

fn to_status(value: String) -> Result<AppointmentStatus> {
    value.parse::<AppointmentStatus>().map_err(|e| {
        rusqlite::Error::ToSqlConversionFailure(Box::new(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            e,
        )))
    })
}

pub(crate) fn map_appointment_row(row: &Row<'_>) -> Result<Appointment> {
    Ok(Appointment {
        id: row.get(0)?,
        start: to_local_datetime(row.get::<_, String>(1)?)?,
        end: to_local_datetime(row.get::<_, String>(2)?)?,
        status: to_status(row.get::<_, String>(3)?)?,
        technician_id: row.get(4)?,
        work_order_id: row.get(5)?,
        details: AppointmentDetails {
            client_name: row.get(6)?,
            equipment: row.get(7)?,
            address: row.get(8)?,
            cost: row.get(9)?,
        },
    })
}
