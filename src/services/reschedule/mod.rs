//! Appointment rescheduling engine.
//!
//! Dragging an appointment to another slot records a pending move instead of
//! saving straight away. Pending moves are shown in their new slot at once,
//! can be discarded, and are saved together by a batch commit that keeps
//! whatever could not be saved for another try.

pub mod controller;
pub mod error;
pub mod feedback;
pub mod ledger;
pub mod projection;
pub mod slot_index;

pub use controller::{
    CommitBatch, CommitOutcome, CommitReport, DragContext, DragState, DropOutcome, HoverPreview,
    RescheduleController,
};
pub use error::RescheduleError;
pub use feedback::{Feedback, FeedbackLevel, FeedbackLog, FeedbackSink, LogFeedback};
pub use ledger::{PendingMove, PendingMoveLedger};
pub use projection::{project, ProjectedAppointment, ProjectedCell, ProjectedGrid};
pub use slot_index::SlotIndex;
