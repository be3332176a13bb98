//! Projection of a board into a display grid.
//!
//! Rendering is a pure function of the roster, the schedule and the state: it
//! reads records, never writes them, and two renders of the same state are
//! equal. Every mutation is followed by a full re-render.

use super::schedule::Schedule;
use super::state::{AbsenceRecord, AbsenceStatus, AttendanceState, Slot, StudentId};
use crate::models::student::Student;

const BASE_CLASS: &str = "absence-cell";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    /// Revision of the state this grid was rendered from. The page drops a
    /// grid older than the one it shows.
    pub revision: u64,
    pub columns: Vec<GridColumn>,
    pub rows: Vec<GridRow>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridColumn {
    pub slot: Slot,
    pub label: String,
    /// At least one cell of the column was edited.
    pub touched: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridRow {
    pub student_id: StudentId,
    pub display_name: String,
    pub cells: Vec<GridCell>,
}

/// One interactive cell. `student_id` and `slot` are the identity bound to
/// the rendered element; gestures resolve through them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridCell {
    pub student_id: StudentId,
    pub slot: Slot,
    pub class: String,
    pub text: &'static str,
}

/// CSS class modifier and text for a record.
pub fn cell_appearance(record: &AbsenceRecord) -> (Option<&'static str>, &'static str) {
    if record.cancelled {
        return (Some("cancelled"), "Annulé");
    }
    let modifier = match record.status {
        AbsenceStatus::Present => None,
        AbsenceStatus::Unexcused => Some("absent-abi"),
        AbsenceStatus::Excused => Some("absent-abj"),
    };
    (modifier, record.status.category().unwrap_or(""))
}

pub fn render_grid(roster: &[Student], schedule: &Schedule, state: &AttendanceState) -> Grid {
    let columns = schedule
        .labels()
        .iter()
        .enumerate()
        .map(|(slot, label)| GridColumn {
            slot,
            label: label.clone(),
            touched: state.is_touched(slot),
        })
        .collect();

    let rows = roster
        .iter()
        .map(|student| GridRow {
            student_id: student.id,
            display_name: student.display_name(),
            cells: (0..schedule.len())
                .map(|slot| {
                    let (modifier, text) = cell_appearance(&state.get(student.id, slot));
                    let class = match modifier {
                        Some(m) => format!("{BASE_CLASS} {m}"),
                        None => BASE_CLASS.to_string(),
                    };
                    GridCell { student_id: student.id, slot, class, text }
                })
                .collect(),
        })
        .collect();

    Grid { revision: state.revision(), columns, rows }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roster() -> Vec<Student> {
        vec![
            Student { id: 1, nom: "Dupont".into(), prenom: "Jean".into() },
            Student { id: 2, nom: "Martin".into(), prenom: "Sophie".into() },
        ]
    }

    #[test]
    fn grid_shape_follows_roster_and_schedule() {
        let schedule = Schedule::default();
        let grid = render_grid(&roster(), &schedule, &AttendanceState::new());

        assert_eq!(grid.columns.len(), 6);
        assert_eq!(grid.rows.len(), 2);
        assert_eq!(grid.rows[0].display_name, "Dupont Jean");
        assert_eq!(grid.rows[1].student_id, 2);
        for row in &grid.rows {
            let slots: Vec<usize> = row.cells.iter().map(|c| c.slot).collect();
            assert_eq!(slots, vec![0, 1, 2, 3, 4, 5]);
            assert!(row.cells.iter().all(|c| c.student_id == row.student_id));
        }
    }

    #[test]
    fn cell_class_and_text_table() {
        let cases = [
            (AbsenceRecord { status: AbsenceStatus::Present, cancelled: false }, "absence-cell", ""),
            (AbsenceRecord { status: AbsenceStatus::Unexcused, cancelled: false }, "absence-cell absent-abi", "ABI"),
            (AbsenceRecord { status: AbsenceStatus::Excused, cancelled: false }, "absence-cell absent-abj", "ABJ"),
            (AbsenceRecord { status: AbsenceStatus::Present, cancelled: true }, "absence-cell cancelled", "Annulé"),
            // unreachable through the transitions but still renders as cancelled
            (AbsenceRecord { status: AbsenceStatus::Excused, cancelled: true }, "absence-cell cancelled", "Annulé"),
        ];
        for (record, class, text) in cases {
            let (modifier, got_text) = cell_appearance(&record);
            let got_class = modifier.map_or(BASE_CLASS.to_string(), |m| format!("{BASE_CLASS} {m}"));
            assert_eq!(got_class, class);
            assert_eq!(got_text, text);
        }
    }

    #[test]
    fn render_is_idempotent_and_read_only() {
        let schedule = Schedule::default();
        let mut state = AttendanceState::new();
        state.cycle_primary(1, 2);
        state.toggle_cancelled(2, 4);
        let before = state.clone();

        let a = render_grid(&roster(), &schedule, &state);
        let b = render_grid(&roster(), &schedule, &state);
        assert_eq!(a, b);
        assert_eq!(state, before);

        assert_eq!(a.rows[0].cells[2].text, "ABI");
        assert_eq!(a.rows[1].cells[4].class, "absence-cell cancelled");
        assert!(a.columns[2].touched);
        assert!(!a.columns[0].touched);
        assert_eq!(a.revision, 2);
    }
}
