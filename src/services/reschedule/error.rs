use thiserror::Error;

use crate::models::status::AppointmentStatus;
use crate::utils::date::SlotKey;

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Everything that can go wrong while moving appointments around.
///
/// All of these stop at the controller; the rendering layer only ever sees
/// feedback messages and unchanged or reversible state.
#[derive(Debug, Error)]
pub enum RescheduleError {
    #[error("{slot} is the reserved lunch slot")]
    LunchSlot { slot: SlotKey },

    #[error("{slot} is outside working hours")]
    OutsideWorkHours { slot: SlotKey },

    #[error("Appointment {appointment_id} already starts at {slot}")]
    NoOp { appointment_id: String, slot: SlotKey },

    #[error("{slot} is already taken by appointment {occupant_id}")]
    Conflict { slot: SlotKey, occupant_id: String },

    #[error("Appointment {0} is not on the visible calendar")]
    UnknownAppointment(String),

    #[error("Appointment {appointment_id} is {status} and cannot be moved")]
    NotMovable {
        appointment_id: String,
        status: AppointmentStatus,
    },

    #[error("Appointment {0} is already being dragged")]
    DragInProgress(String),

    #[error("No appointment is being dragged")]
    NoActiveDrag,

    #[error("A batch of moves is already being saved")]
    CommitInProgress,

    #[error("{0} move(s) are not saved yet; save or discard them first")]
    UnsavedMoves(usize),

    #[error("Failed to save new time for appointment {appointment_id}: {source}")]
    Persistence {
        appointment_id: String,
        #[source]
        source: BoxError,
    },

    #[error("Failed to refresh appointments: {source}")]
    Fetch {
        #[source]
        source: BoxError,
    },
}

impl RescheduleError {
    pub(crate) fn persistence(appointment_id: impl Into<String>, err: anyhow::Error) -> Self {
        RescheduleError::Persistence {
            appointment_id: appointment_id.into(),
            source: err.into(),
        }
    }

    pub(crate) fn fetch(err: anyhow::Error) -> Self {
        RescheduleError::Fetch { source: err.into() }
    }

    /// Rejections caused by where the user dropped, as opposed to failures of
    /// the store or of the interaction itself.
    pub fn is_slot_rejection(&self) -> bool {
        matches!(
            self,
            RescheduleError::LunchSlot { .. }
                | RescheduleError::OutsideWorkHours { .. }
                | RescheduleError::Conflict { .. }
        )
    }
}
