use std::collections::HashMap;

use serde::Serialize;

use crate::models::student::Student;

pub type StudentId = i64;
pub type Slot = usize;

/// Attendance status of one student in one slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AbsenceStatus {
    #[default]
    Present,
    /// ABI
    Unexcused,
    /// ABJ
    Excused,
}

impl AbsenceStatus {
    /// Next status in the primary cycle: present → ABI → ABJ → present.
    pub fn next(self) -> Self {
        match self {
            AbsenceStatus::Present => AbsenceStatus::Unexcused,
            AbsenceStatus::Unexcused => AbsenceStatus::Excused,
            AbsenceStatus::Excused => AbsenceStatus::Present,
        }
    }

    pub fn category(self) -> Option<&'static str> {
        match self {
            AbsenceStatus::Present => None,
            AbsenceStatus::Unexcused => Some("ABI"),
            AbsenceStatus::Excused => Some("ABJ"),
        }
    }
}

/// Status as it leaves the board: cancellation is folded into the status value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectiveStatus {
    Present,
    Abi,
    Abj,
    Cancelled,
}

impl EffectiveStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            EffectiveStatus::Present => "present",
            EffectiveStatus::Abi => "abi",
            EffectiveStatus::Abj => "abj",
            EffectiveStatus::Cancelled => "cancelled",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AbsenceRecord {
    pub status: AbsenceStatus,
    pub cancelled: bool,
}

impl AbsenceRecord {
    pub fn effective_status(&self) -> EffectiveStatus {
        if self.cancelled {
            return EffectiveStatus::Cancelled;
        }
        match self.status {
            AbsenceStatus::Present => EffectiveStatus::Present,
            AbsenceStatus::Unexcused => EffectiveStatus::Abi,
            AbsenceStatus::Excused => EffectiveStatus::Abj,
        }
    }
}

/// One flattened line of a save: a student and its effective status for a slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AbsenceEntry {
    pub id: StudentId,
    pub status: String,
}

/// Sparse (student, slot) → record mapping. Missing pairs read as the default
/// record; entries are created on first mutation and never removed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttendanceState {
    records: HashMap<(StudentId, Slot), AbsenceRecord>,
    /// Bumped on every change of a record.
    revision: u64,
}

impl AttendanceState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, student: StudentId, slot: Slot) -> AbsenceRecord {
        self.records
            .get(&(student, slot))
            .copied()
            .unwrap_or_default()
    }

    /// Advance the status cycle. Does nothing on a cancelled record.
    pub fn cycle_primary(&mut self, student: StudentId, slot: Slot) {
        let record = self.records.entry((student, slot)).or_default();
        if record.cancelled {
            return;
        }
        record.status = record.status.next();
        self.revision += 1;
    }

    /// Flip cancellation. Both directions reset the status to present; the
    /// status held before cancelling is not restored.
    pub fn toggle_cancelled(&mut self, student: StudentId, slot: Slot) {
        self.revision += 1;
        let record = self.records.entry((student, slot)).or_default();
        record.cancelled = !record.cancelled;
        record.status = AbsenceStatus::Present;
    }

    /// Whether any record was created for this slot.
    pub fn is_touched(&self, slot: Slot) -> bool {
        self.records.keys().any(|&(_, s)| s == slot)
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// One entry per roster student, in roster order, for a single slot.
    pub fn flatten(&self, roster: &[Student], slot: Slot) -> Vec<AbsenceEntry> {
        roster
            .iter()
            .map(|s| AbsenceEntry {
                id: s.id,
                status: self.get(s.id, slot).effective_status().as_str().to_string(),
            })
            .collect()
    }
}
