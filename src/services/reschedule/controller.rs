//! Rescheduling controller.
//!
//! Owns the slot index and the pending move ledger of one calendar view and
//! drives both the drag interaction (pick up, hover, drop) and the batch
//! commit that saves pending moves to the store.
//!
//! A batch commit runs in three steps so the view stays interactive while the
//! store is busy:
//!
//! 1. [`RescheduleController::begin_commit`] takes every pending move out of
//!    the ledger synchronously and keeps them visible as an in-flight overlay.
//! 2. [`CommitBatch::run`] saves them one at a time, in proposal order, and
//!    stops at the first failure.
//! 3. [`RescheduleController::finish_commit`] applies what was saved, puts the
//!    failed and unattempted moves back into the ledger and reports.
//!
//! [`RescheduleController::commit_all`] runs all three and then re-fetches the
//! visible range to pick up anything the store computed on its side.

use chrono::{DateTime, Local, NaiveDate};
use std::borrow::Cow;

use super::error::RescheduleError;
use super::feedback::{Feedback, FeedbackSink, LogFeedback};
use super::ledger::{PendingMove, PendingMoveLedger};
use super::projection::{self, ProjectedAppointment, ProjectedGrid};
use super::slot_index::SlotIndex;
use crate::models::appointment::Appointment;
use crate::services::store::AppointmentStore;
use crate::utils::date::{slot_key_of, DateRange, SlotKey, TimeGrid};

/// Snapshot of the appointment being dragged, taken at pick-up.
#[derive(Debug, Clone, PartialEq)]
pub struct DragContext {
    pub appointment_id: String,
    pub persisted_start: DateTime<Local>,
    /// Start of the move already pending for this appointment, if any.
    pub pending_start: Option<DateTime<Local>>,
    pub hovered: Option<SlotKey>,
}

impl DragContext {
    /// Where the appointment was shown when it was picked up.
    pub fn original_start(&self) -> DateTime<Local> {
        self.pending_start.unwrap_or(self.persisted_start)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum DragState {
    #[default]
    Idle,
    Picked(DragContext),
}

/// Whether the slot under the pointer would accept the dragged appointment.
#[derive(Debug)]
pub struct HoverPreview {
    pub slot: SlotKey,
    pub rejection: Option<RescheduleError>,
}

impl HoverPreview {
    pub fn accepted(&self) -> bool {
        self.rejection.is_none()
    }
}

/// What a drop did.
#[derive(Debug)]
pub enum DropOutcome {
    /// A pending move was recorded.
    Proposed(PendingMove),
    /// Dropped back on its persisted slot; the earlier pending move is gone.
    Reverted(PendingMove),
    /// Dropped where it already is. Nothing changed.
    Unchanged,
    /// Released outside the grid. Nothing changed.
    Cancelled,
    Rejected(RescheduleError),
}

/// Moves taken out of the ledger for saving.
#[derive(Debug, Clone, PartialEq)]
pub struct CommitBatch {
    moves: Vec<PendingMove>,
}

impl CommitBatch {
    pub fn moves(&self) -> &[PendingMove] {
        &self.moves
    }

    pub fn len(&self) -> usize {
        self.moves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    /// Save each move in order, stopping at the first failure.
    pub async fn run<S: AppointmentStore>(self, store: &S) -> CommitOutcome {
        let mut persisted = Vec::with_capacity(self.moves.len());
        let mut remaining = self.moves.into_iter();

        while let Some(pending) = remaining.next() {
            match store
                .update_appointment_start_time(&pending.appointment_id, pending.proposed_start)
                .await
            {
                Ok(appointment) => {
                    log::debug!(
                        "Saved appointment {} at {}",
                        appointment.id,
                        appointment.start.to_rfc3339()
                    );
                    persisted.push(appointment);
                }
                Err(error) => {
                    log::error!(
                        "Saving appointment {} failed: {:#}",
                        pending.appointment_id,
                        error
                    );
                    return CommitOutcome {
                        persisted,
                        failure: Some(CommitFailure { pending, error }),
                        unattempted: remaining.collect(),
                    };
                }
            }
        }

        CommitOutcome {
            persisted,
            failure: None,
            unattempted: Vec::new(),
        }
    }
}

#[derive(Debug)]
pub struct CommitFailure {
    pub pending: PendingMove,
    pub error: anyhow::Error,
}

/// Raw result of running a batch against the store.
#[derive(Debug)]
pub struct CommitOutcome {
    pub persisted: Vec<Appointment>,
    pub failure: Option<CommitFailure>,
    pub unattempted: Vec<PendingMove>,
}

/// What a batch commit achieved, as reported to the host.
#[derive(Debug, Default)]
pub struct CommitReport {
    /// Appointments as the store saved them, in commit order.
    pub committed: Vec<Appointment>,
    /// Moves put back into the ledger for retry or discard.
    pub restored: Vec<PendingMove>,
    pub error: Option<RescheduleError>,
    /// Whether the follow-up re-fetch succeeded.
    pub reconciled: bool,
}

impl CommitReport {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Drag-and-drop rescheduling state for one calendar view.
pub struct RescheduleController<F: FeedbackSink = LogFeedback> {
    grid: TimeGrid,
    range: DateRange,
    technician_id: Option<String>,
    index: SlotIndex,
    ledger: PendingMoveLedger,
    in_flight: Option<Vec<PendingMove>>,
    drag: DragState,
    needs_reconcile: bool,
    feedback: F,
}

impl<F: FeedbackSink> RescheduleController<F> {
    pub fn new(grid: TimeGrid, range: DateRange, feedback: F) -> Self {
        Self {
            grid,
            range,
            technician_id: None,
            index: SlotIndex::default(),
            ledger: PendingMoveLedger::new(),
            in_flight: None,
            drag: DragState::Idle,
            needs_reconcile: true,
            feedback,
        }
    }

    /// Restrict the view to one technician.
    pub fn with_technician(mut self, technician_id: Option<String>) -> Self {
        self.technician_id = technician_id;
        self
    }

    pub fn grid(&self) -> &TimeGrid {
        &self.grid
    }

    pub fn range(&self) -> &DateRange {
        &self.range
    }

    pub fn technician(&self) -> Option<&str> {
        self.technician_id.as_deref()
    }

    pub fn index(&self) -> &SlotIndex {
        &self.index
    }

    pub fn ledger(&self) -> &PendingMoveLedger {
        &self.ledger
    }

    pub fn drag_state(&self) -> &DragState {
        &self.drag
    }

    pub fn feedback(&self) -> &F {
        &self.feedback
    }

    pub fn feedback_mut(&mut self) -> &mut F {
        &mut self.feedback
    }

    pub fn is_commit_in_flight(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Moves currently being saved.
    pub fn in_flight(&self) -> &[PendingMove] {
        self.in_flight.as_deref().unwrap_or(&[])
    }

    /// Whether the appointment list may be stale and should be re-fetched.
    pub fn needs_reconcile(&self) -> bool {
        self.needs_reconcile
    }

    pub fn has_pending_changes(&self) -> bool {
        !self.ledger.is_empty()
    }

    /// Moves not yet confirmed by the store, pending or being saved.
    pub fn unsaved_count(&self) -> usize {
        self.ledger.len() + self.in_flight.as_ref().map_or(0, Vec::len)
    }

    /// Show a different window of time. Takes effect on the next reconcile.
    ///
    /// Refused while moves are unsaved; commit or discard them first.
    pub fn set_range(&mut self, range: DateRange) -> Result<(), RescheduleError> {
        if range == self.range {
            return Ok(());
        }
        self.ensure_saved()?;
        self.range = range;
        self.needs_reconcile = true;
        Ok(())
    }

    /// Show a different technician's calendar. Takes effect on the next
    /// reconcile.
    ///
    /// Refused while moves are unsaved; commit or discard them first.
    pub fn set_technician(&mut self, technician_id: Option<String>) -> Result<(), RescheduleError> {
        if technician_id == self.technician_id {
            return Ok(());
        }
        self.ensure_saved()?;
        self.technician_id = technician_id;
        self.needs_reconcile = true;
        Ok(())
    }

    fn ensure_saved(&mut self) -> Result<(), RescheduleError> {
        match self.unsaved_count() {
            0 => Ok(()),
            count => {
                let err = RescheduleError::UnsavedMoves(count);
                log::warn!("Navigation refused: {}", err);
                self.feedback.notify(Feedback::warning(err.to_string()));
                Err(err)
            }
        }
    }

    /// Replace the persisted appointment list and rebuild the slot index.
    ///
    /// Pending moves whose persisted start already matches the proposal are
    /// dropped. Moves whose appointment is no longer in the list are kept
    /// for saving or discarding, with a warning the first time they go out
    /// of view. A drag on a vanished appointment is abandoned.
    pub fn replace_appointments(&mut self, appointments: Vec<Appointment>) {
        let hidden_before = self.hidden_moves();
        self.index = SlotIndex::build(appointments);

        let before = self.ledger.len();
        let index = &self.index;
        self.ledger.retain(|pending| {
            index
                .get(&pending.appointment_id)
                .map_or(true, |appointment| appointment.start != pending.proposed_start)
        });
        let settled = before - self.ledger.len();
        if settled > 0 {
            log::info!("Dropped {} pending move(s) already settled by the store", settled);
        }

        let hidden = self.hidden_moves();
        if hidden > hidden_before {
            log::warn!("{} pending move(s) refer to appointments no longer shown", hidden);
            self.feedback.notify(Feedback::warning(format!(
                "{} pending move(s) are no longer on this calendar; save or discard them",
                hidden
            )));
        }

        if let DragState::Picked(context) = &self.drag {
            if !self.index.contains(&context.appointment_id) {
                log::warn!(
                    "Appointment {} disappeared while being dragged",
                    context.appointment_id
                );
                self.drag = DragState::Idle;
            }
        }
    }

    /// Re-fetch the visible range from the store.
    ///
    /// On failure the previous appointment list stays in place.
    pub async fn reconcile<S: AppointmentStore>(
        &mut self,
        store: &S,
    ) -> Result<usize, RescheduleError> {
        match store
            .fetch_appointments(&self.range, self.technician_id.as_deref())
            .await
        {
            Ok(appointments) => {
                let count = appointments.len();
                log::debug!("Fetched {} appointment(s)", count);
                self.replace_appointments(appointments);
                self.needs_reconcile = false;
                Ok(count)
            }
            Err(error) => {
                log::error!("Refreshing appointments failed: {:#}", error);
                self.feedback
                    .notify(Feedback::error("Could not refresh the schedule"));
                Err(RescheduleError::fetch(error))
            }
        }
    }

    /// Start dragging `appointment_id`. Only one drag may be active.
    pub fn pick_up(&mut self, appointment_id: &str) -> Result<DragContext, RescheduleError> {
        if let DragState::Picked(active) = &self.drag {
            return Err(RescheduleError::DragInProgress(active.appointment_id.clone()));
        }

        let appointment = self
            .index
            .get(appointment_id)
            .ok_or_else(|| RescheduleError::UnknownAppointment(appointment_id.to_string()))?;
        if !appointment.status.is_movable() {
            return Err(RescheduleError::NotMovable {
                appointment_id: appointment_id.to_string(),
                status: appointment.status,
            });
        }
        let persisted_start = appointment.start;
        let pending_start = self
            .overlay()
            .get(appointment_id)
            .map(|pending| pending.proposed_start);

        let context = DragContext {
            appointment_id: appointment_id.to_string(),
            persisted_start,
            pending_start,
            hovered: None,
        };
        log::debug!("Picked up appointment {}", appointment_id);

        self.drag = DragState::Picked(context.clone());
        Ok(context)
    }

    /// Track the slot under the pointer and say whether dropping there would
    /// be accepted. Never touches the ledger.
    pub fn hover(
        &mut self,
        date: NaiveDate,
        hour: u32,
        now: DateTime<Local>,
    ) -> Result<HoverPreview, RescheduleError> {
        let slot = slot_key_of(date, hour);
        let appointment_id = match &mut self.drag {
            DragState::Picked(context) => {
                context.hovered = Some(slot);
                context.appointment_id.clone()
            }
            DragState::Idle => return Err(RescheduleError::NoActiveDrag),
        };

        let rejection = match self.overlay().validate(
            &self.index,
            &self.grid,
            &appointment_id,
            date,
            hour,
            now,
        ) {
            Ok(_) | Err(RescheduleError::NoOp { .. }) => None,
            Err(err) => Some(err),
        };

        Ok(HoverPreview { slot, rejection })
    }

    /// Release the dragged appointment over (`date`, `hour`).
    pub fn drop_on(&mut self, date: NaiveDate, hour: u32, now: DateTime<Local>) -> DropOutcome {
        let context = match std::mem::take(&mut self.drag) {
            DragState::Picked(context) => context,
            DragState::Idle => return DropOutcome::Rejected(RescheduleError::NoActiveDrag),
        };
        let appointment_id = context.appointment_id.as_str();

        let validated = self.overlay().validate(
            &self.index,
            &self.grid,
            appointment_id,
            date,
            hour,
            now,
        );

        match validated {
            Ok(pending) => {
                self.ledger.upsert(pending.clone());
                log::info!(
                    "Proposed move of {} to {}",
                    appointment_id,
                    pending.target_slot()
                );
                let message = format!(
                    "{} moved to {} (not saved yet)",
                    self.describe(appointment_id),
                    pending.proposed_start.format("%a %d %b %H:%M")
                );
                self.feedback.notify(Feedback::info(message));
                DropOutcome::Proposed(pending)
            }
            Err(RescheduleError::NoOp { .. }) => match self.ledger.remove(appointment_id) {
                Some(reverted) => {
                    log::info!("Reverted pending move of {}", appointment_id);
                    DropOutcome::Reverted(reverted)
                }
                None => {
                    log::debug!("Dropped {} where it already is", appointment_id);
                    DropOutcome::Unchanged
                }
            },
            Err(err) => {
                log::warn!("Rejected move of {}: {}", appointment_id, err);
                self.feedback.notify(Feedback::warning(err.to_string()));
                DropOutcome::Rejected(err)
            }
        }
    }

    /// Release the dragged appointment outside any slot.
    pub fn drop_outside(&mut self) -> DropOutcome {
        if let DragState::Picked(context) = std::mem::take(&mut self.drag) {
            log::debug!("Drag of {} cancelled", context.appointment_id);
        }
        DropOutcome::Cancelled
    }

    /// Drop one pending move.
    pub fn discard(&mut self, appointment_id: &str) -> Option<PendingMove> {
        self.ledger.remove(appointment_id)
    }

    /// Drop every pending move. Moves already being saved are unaffected.
    pub fn discard_all(&mut self) -> usize {
        let discarded = self.ledger.discard_all();
        if discarded > 0 {
            log::info!("Discarded {} pending move(s)", discarded);
        }
        discarded
    }

    /// Take every pending move out of the ledger for saving.
    ///
    /// The moves stay visible as an in-flight overlay until
    /// [`finish_commit`](Self::finish_commit).
    pub fn begin_commit(&mut self) -> Result<CommitBatch, RescheduleError> {
        if self.in_flight.is_some() {
            return Err(RescheduleError::CommitInProgress);
        }

        let moves = self.ledger.take_all();
        log::info!("Saving {} pending move(s)", moves.len());
        self.in_flight = Some(moves.clone());
        Ok(CommitBatch { moves })
    }

    /// Fold a finished batch back into the view state.
    pub fn finish_commit(&mut self, outcome: CommitOutcome) -> CommitReport {
        self.in_flight = None;

        let CommitOutcome {
            persisted,
            failure,
            unattempted,
        } = outcome;

        if !persisted.is_empty() {
            self.apply_persisted(&persisted);
        }

        let mut report = CommitReport {
            committed: persisted,
            ..CommitReport::default()
        };

        match failure {
            Some(CommitFailure { pending, error }) => {
                let mut restored = Vec::with_capacity(unattempted.len() + 1);
                restored.push(pending);
                restored.extend(unattempted);

                let failed_id = restored[0].appointment_id.clone();
                let message = format!(
                    "Could not save {}; {} move(s) kept for retry",
                    self.describe(&failed_id),
                    restored.len()
                );
                self.ledger.restore(restored.clone());
                self.feedback.notify(Feedback::error(message));

                report.restored = restored;
                report.error = Some(RescheduleError::persistence(failed_id, error));
            }
            None if !report.committed.is_empty() => {
                let count = report.committed.len();
                self.feedback.notify(Feedback::success(format!(
                    "Saved {} appointment move{}",
                    count,
                    if count == 1 { "" } else { "s" }
                )));
            }
            None => {}
        }

        self.needs_reconcile = true;
        report
    }

    /// Save every pending move, then re-fetch the visible range.
    pub async fn commit_all<S: AppointmentStore>(
        &mut self,
        store: &S,
    ) -> Result<CommitReport, RescheduleError> {
        let batch = self.begin_commit()?;
        if batch.is_empty() {
            self.in_flight = None;
            return Ok(CommitReport {
                reconciled: !self.needs_reconcile,
                ..CommitReport::default()
            });
        }

        let outcome = batch.run(store).await;
        let mut report = self.finish_commit(outcome);
        report.reconciled = self.reconcile(store).await.is_ok();
        Ok(report)
    }

    /// What to display in the slot at (`date`, `hour`).
    pub fn project(&self, date: NaiveDate, hour: u32) -> Vec<ProjectedAppointment> {
        projection::project(&self.index, &self.overlay(), date, hour)
    }

    /// What to display across the whole visible range.
    pub fn projected_grid(&self) -> ProjectedGrid {
        ProjectedGrid::build(&self.index, &self.overlay(), &self.grid, &self.range)
    }

    /// Pending moves layered over moves still being saved.
    fn overlay(&self) -> Cow<'_, PendingMoveLedger> {
        match &self.in_flight {
            Some(in_flight) if !in_flight.is_empty() => {
                Cow::Owned(self.ledger.layered_over(in_flight))
            }
            _ => Cow::Borrowed(&self.ledger),
        }
    }

    fn apply_persisted(&mut self, persisted: &[Appointment]) {
        let mut appointments = std::mem::take(&mut self.index).into_appointments();
        for saved in persisted {
            match appointments.iter_mut().find(|a| a.id == saved.id) {
                Some(existing) => *existing = saved.clone(),
                None => appointments.push(saved.clone()),
            }
        }
        self.index = SlotIndex::build(appointments);
    }

    /// Pending moves whose appointment is not in the slot index.
    fn hidden_moves(&self) -> usize {
        self.ledger
            .entries()
            .iter()
            .filter(|pending| !self.index.contains(&pending.appointment_id))
            .count()
    }

    fn describe(&self, appointment_id: &str) -> String {
        self.index
            .get(appointment_id)
            .and_then(|appointment| appointment.details.client_name.clone())
            .unwrap_or_else(|| format!("Appointment {}", appointment_id))
    }
}
