//! Pending move ledger.
//!
//! Holds tentative relocations that have been dropped on the calendar but not
//! yet saved. At most one move per appointment; entries keep the order in
//! which their appointments were first proposed, which is also the order a
//! batch commit saves them in.

use chrono::{DateTime, Local, NaiveDate};

use super::error::RescheduleError;
use super::slot_index::SlotIndex;
use crate::models::appointment::{appointment_duration, Appointment};
use crate::utils::date::{slot_key_of, SlotKey, TimeGrid};

/// A proposed, not yet persisted, new start time for one appointment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingMove {
    pub appointment_id: String,
    pub proposed_start: DateTime<Local>,
    /// When the move was dropped.
    pub proposed_at: DateTime<Local>,
}

impl PendingMove {
    pub fn target_slot(&self) -> SlotKey {
        SlotKey::of_datetime(&self.proposed_start)
    }

    pub fn proposed_end(&self) -> DateTime<Local> {
        self.proposed_start + appointment_duration()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PendingMoveLedger {
    moves: Vec<PendingMove>,
}

impl PendingMoveLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check whether `appointment_id` may move to (`date`, `hour`) given the
    /// persisted slots and the moves already in this ledger. Nothing is
    /// recorded.
    pub fn validate(
        &self,
        index: &SlotIndex,
        grid: &TimeGrid,
        appointment_id: &str,
        date: NaiveDate,
        hour: u32,
        now: DateTime<Local>,
    ) -> Result<PendingMove, RescheduleError> {
        let slot = slot_key_of(date, hour);

        if !grid.is_work_hour(hour) {
            return Err(RescheduleError::OutsideWorkHours { slot });
        }
        if !grid.is_bookable(hour) {
            return Err(RescheduleError::LunchSlot { slot });
        }

        let appointment = index
            .get(appointment_id)
            .ok_or_else(|| RescheduleError::UnknownAppointment(appointment_id.to_string()))?;
        if !appointment.status.is_movable() {
            return Err(RescheduleError::NotMovable {
                appointment_id: appointment_id.to_string(),
                status: appointment.status,
            });
        }

        // A wall-clock hour skipped by a DST change has no start instant.
        let proposed_start = grid
            .start_of_slot(slot)
            .ok_or(RescheduleError::OutsideWorkHours { slot })?;

        if proposed_start == appointment.start {
            // Going home is only free while no other move has claimed the slot.
            if self.contains(appointment_id) {
                if let Some(arrival) = self.arriving(index, slot, appointment_id) {
                    return Err(RescheduleError::Conflict {
                        slot,
                        occupant_id: arrival.id.clone(),
                    });
                }
            }
            return Err(RescheduleError::NoOp {
                appointment_id: appointment_id.to_string(),
                slot,
            });
        }

        if let Some(occupant) = self.occupant(index, slot, appointment_id) {
            return Err(RescheduleError::Conflict {
                slot,
                occupant_id: occupant.id.clone(),
            });
        }

        Ok(PendingMove {
            appointment_id: appointment_id.to_string(),
            proposed_start,
            proposed_at: now,
        })
    }

    /// Validate and record a move, replacing any earlier move of the same
    /// appointment. On error the ledger is left untouched.
    pub fn propose(
        &mut self,
        index: &SlotIndex,
        grid: &TimeGrid,
        appointment_id: &str,
        date: NaiveDate,
        hour: u32,
        now: DateTime<Local>,
    ) -> Result<PendingMove, RescheduleError> {
        let pending = self.validate(index, grid, appointment_id, date, hour, now)?;
        self.upsert(pending.clone());
        Ok(pending)
    }

    /// Record `pending`, returning the move it superseded.
    pub fn upsert(&mut self, pending: PendingMove) -> Option<PendingMove> {
        match self
            .moves
            .iter_mut()
            .find(|existing| existing.appointment_id == pending.appointment_id)
        {
            Some(existing) => Some(std::mem::replace(existing, pending)),
            None => {
                self.moves.push(pending);
                None
            }
        }
    }

    /// First appointment, other than `moving_id`, that would occupy `slot`
    /// once every move in this ledger is applied.
    pub fn occupant<'i>(
        &self,
        index: &'i SlotIndex,
        slot: SlotKey,
        moving_id: &str,
    ) -> Option<&'i Appointment> {
        self.staying(index, slot, moving_id)
            .or_else(|| self.arriving(index, slot, moving_id))
    }

    /// Persisted occupant of `slot` that has no move taking it elsewhere.
    fn staying<'i>(
        &self,
        index: &'i SlotIndex,
        slot: SlotKey,
        moving_id: &str,
    ) -> Option<&'i Appointment> {
        index.at(slot).find(|appointment| {
            appointment.id != moving_id
                && appointment.blocks_slot()
                && self
                    .get(&appointment.id)
                    .map_or(true, |pending| pending.target_slot() == slot)
        })
    }

    /// Appointment with a pending move into `slot`.
    fn arriving<'i>(
        &self,
        index: &'i SlotIndex,
        slot: SlotKey,
        moving_id: &str,
    ) -> Option<&'i Appointment> {
        self.moves
            .iter()
            .filter(|pending| pending.appointment_id != moving_id)
            .filter(|pending| pending.target_slot() == slot)
            .filter_map(|pending| index.get(&pending.appointment_id))
            .find(|appointment| appointment.blocks_slot())
    }

    pub fn get(&self, appointment_id: &str) -> Option<&PendingMove> {
        self.moves
            .iter()
            .find(|pending| pending.appointment_id == appointment_id)
    }

    pub fn contains(&self, appointment_id: &str) -> bool {
        self.get(appointment_id).is_some()
    }

    /// Moves in proposal order.
    pub fn entries(&self) -> &[PendingMove] {
        &self.moves
    }

    pub fn remove(&mut self, appointment_id: &str) -> Option<PendingMove> {
        let position = self
            .moves
            .iter()
            .position(|pending| pending.appointment_id == appointment_id)?;
        Some(self.moves.remove(position))
    }

    /// Drop every pending move, returning how many there were.
    pub fn discard_all(&mut self) -> usize {
        let count = self.moves.len();
        self.moves.clear();
        count
    }

    /// Empty the ledger, handing back its moves in order.
    pub fn take_all(&mut self) -> Vec<PendingMove> {
        std::mem::take(&mut self.moves)
    }

    /// Put moves back ahead of anything proposed since they were taken.
    /// A move is skipped when its appointment already has a newer entry.
    pub fn restore(&mut self, moves: Vec<PendingMove>) {
        let mut restored: Vec<PendingMove> = moves
            .into_iter()
            .filter(|pending| !self.contains(&pending.appointment_id))
            .collect();
        restored.append(&mut self.moves);
        self.moves = restored;
    }

    pub fn retain<F>(&mut self, keep: F)
    where
        F: FnMut(&PendingMove) -> bool,
    {
        self.moves.retain(keep);
    }

    /// Ledger holding `underneath` with this ledger's moves layered on top.
    pub fn layered_over(&self, underneath: &[PendingMove]) -> PendingMoveLedger {
        let mut combined = PendingMoveLedger {
            moves: underneath.to_vec(),
        };
        for pending in &self.moves {
            combined.upsert(pending.clone());
        }
        combined
    }

    pub fn len(&self) -> usize {
        self.moves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }
}
