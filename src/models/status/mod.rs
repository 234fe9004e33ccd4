// Status module
// Canonical appointment status vocabulary and its metadata table

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle stage of an appointment.
///
/// This is the one status vocabulary every view consumes. Older views speak a
/// second vocabulary ("suggested", "on_the_way", ...); `FromStr` accepts both
/// and maps the older names onto these variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Scheduled,
    Confirmed,
    EnRoute,
    InProgress,
    Completed,
    Cancelled,
    AtWorkshop,
    Diagnosing,
    AwaitingParts,
    Repairing,
    ReadyForDelivery,
    Delivered,
}

/// Static metadata shared by every consumer of a status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusInfo {
    /// Canonical snake_case name, as stored.
    pub key: &'static str,
    /// Human-readable label.
    pub label: &'static str,
    /// Whether an appointment in this status occupies its slot.
    pub blocks_slot: bool,
    /// Whether an appointment in this status may be dragged to another slot.
    pub movable: bool,
}

const STATUS_TABLE: [(AppointmentStatus, StatusInfo); 12] = [
    (AppointmentStatus::Scheduled, info("scheduled", "Scheduled", true, true)),
    (AppointmentStatus::Confirmed, info("confirmed", "Confirmed", true, true)),
    (AppointmentStatus::EnRoute, info("en_route", "En route", true, true)),
    (AppointmentStatus::InProgress, info("in_progress", "In progress", true, true)),
    (AppointmentStatus::Completed, info("completed", "Completed", true, false)),
    (AppointmentStatus::Cancelled, info("cancelled", "Cancelled", false, false)),
    (AppointmentStatus::AtWorkshop, info("at_workshop", "At workshop", true, true)),
    (AppointmentStatus::Diagnosing, info("diagnosing", "Diagnosing", true, true)),
    (AppointmentStatus::AwaitingParts, info("awaiting_parts", "Awaiting parts", true, true)),
    (AppointmentStatus::Repairing, info("repairing", "Repairing", true, true)),
    (AppointmentStatus::ReadyForDelivery, info("ready_for_delivery", "Ready for delivery", true, true)),
    (AppointmentStatus::Delivered, info("delivered", "Delivered", true, false)),
];

const fn info(key: &'static str, label: &'static str, blocks_slot: bool, movable: bool) -> StatusInfo {
    StatusInfo {
        key,
        label,
        blocks_slot,
        movable,
    }
}

/// Names from the secondary vocabulary and the canonical status they map to.
const LEGACY_ALIASES: [(&str, AppointmentStatus); 8] = [
    ("suggested", AppointmentStatus::Scheduled),
    ("on_the_way", AppointmentStatus::EnRoute),
    ("enroute", AppointmentStatus::EnRoute),
    ("canceled", AppointmentStatus::Cancelled),
    ("in_diagnosis", AppointmentStatus::Diagnosing),
    ("in_repair", AppointmentStatus::Repairing),
    ("ready", AppointmentStatus::ReadyForDelivery),
    ("done", AppointmentStatus::Completed),
];

impl AppointmentStatus {
    /// Every status, in table order.
    pub fn all() -> impl Iterator<Item = AppointmentStatus> {
        STATUS_TABLE.iter().map(|(status, _)| *status)
    }

    /// Look up the metadata row for this status.
    pub fn info(self) -> &'static StatusInfo {
        // Table is exhaustive over the enum; the index mirrors declaration order.
        &STATUS_TABLE[self as usize].1
    }

    pub fn as_str(self) -> &'static str {
        self.info().key
    }

    pub fn label(self) -> &'static str {
        self.info().label
    }

    pub fn blocks_slot(self) -> bool {
        self.info().blocks_slot
    }

    pub fn is_movable(self) -> bool {
        self.info().movable
    }
}

impl Default for AppointmentStatus {
    fn default() -> Self {
        AppointmentStatus::Scheduled
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AppointmentStatus {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase().replace(['-', ' '], "_");

        if let Some((status, _)) = STATUS_TABLE.iter().find(|(_, row)| row.key == normalized) {
            return Ok(*status);
        }

        LEGACY_ALIASES
            .iter()
            .find(|(alias, _)| *alias == normalized)
            .map(|(_, status)| *status)
            .ok_or_else(|| format!("Unknown appointment status: {}", value))
    }
}
