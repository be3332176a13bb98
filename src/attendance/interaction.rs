use std::fmt;

use super::render::{Grid, render_grid};
use super::schedule::Schedule;
use super::state::{AbsenceEntry, AttendanceState, Slot, StudentId};
use crate::models::session::SessionKey;
use crate::models::student::Student;

/// The two cell gestures: primary (click) cycles the status, secondary
/// (double click) toggles cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gesture {
    Primary,
    Secondary,
}

impl Gesture {
    /// Map the action segment of a cell URL to a gesture.
    pub fn from_action(action: &str) -> Option<Self> {
        match action {
            "cycle" => Some(Gesture::Primary),
            "cancel" => Some(Gesture::Secondary),
            _ => None,
        }
    }
}

/// Identity bound to a rendered cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRef {
    pub student_id: StudentId,
    pub slot: Slot,
}

/// A gesture named a cell that the board never rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidGesture {
    pub student_id: StudentId,
    pub slot: Slot,
}

impl fmt::Display for InvalidGesture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "no cell for student {} in slot {}", self.student_id, self.slot)
    }
}

/// Everything one page session edits: the session's module and date, the
/// roster fetched when it was opened, the slot schedule and the state.
#[derive(Debug, Clone)]
pub struct Board {
    pub module: String,
    pub date: String,
    roster: Vec<Student>,
    schedule: Schedule,
    state: AttendanceState,
}

impl Board {
    pub fn new(module: String, date: String, roster: Vec<Student>, schedule: Schedule) -> Self {
        Self { module, date, roster, schedule, state: AttendanceState::new() }
    }

    pub fn state(&self) -> &AttendanceState {
        &self.state
    }

    pub fn render(&self) -> Grid {
        render_grid(&self.roster, &self.schedule, &self.state)
    }

    fn check(&self, cell: CellRef) -> Result<(), InvalidGesture> {
        let known_student = self.roster.iter().any(|s| s.id == cell.student_id);
        if known_student && self.schedule.contains(cell.slot) {
            Ok(())
        } else {
            Err(InvalidGesture { student_id: cell.student_id, slot: cell.slot })
        }
    }

    /// Apply a gesture and return the re-rendered grid. An unknown cell
    /// leaves the state untouched.
    pub fn apply(&mut self, gesture: Gesture, cell: CellRef) -> Result<Grid, InvalidGesture> {
        self.check(cell)?;
        match gesture {
            Gesture::Primary => self.state.cycle_primary(cell.student_id, cell.slot),
            Gesture::Secondary => self.state.toggle_cancelled(cell.student_id, cell.slot),
        }
        log::debug!(
            "{:?} on student {} slot {}: {:?}",
            gesture,
            cell.student_id,
            cell.slot,
            self.state.get(cell.student_id, cell.slot)
        );
        Ok(self.render())
    }

    /// Natural key of the session saved for `slot`.
    pub fn session_key(&self, slot: Slot) -> Option<SessionKey> {
        self.schedule.label(slot).map(|label| SessionKey {
            module: self.module.clone(),
            date: self.date.clone(),
            heure: label.to_string(),
        })
    }

    pub fn flatten(&self, slot: Slot) -> Vec<AbsenceEntry> {
        self.state.flatten(&self.roster, slot)
    }
}
