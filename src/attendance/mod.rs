//! Attendance board: state machine, grid projection, gesture handling and
//! the boundary to the persistence service.

pub mod client;
pub mod interaction;
pub mod render;
pub mod schedule;
pub mod state;
pub mod store;

pub use client::{ClientError, PgSessionClient, SaveConfirmation, SessionClient};
pub use interaction::{Board, CellRef, Gesture, InvalidGesture};
pub use render::{Grid, GridCell, GridColumn, GridRow, render_grid};
pub use schedule::Schedule;
pub use state::{AbsenceEntry, AbsenceRecord, AbsenceStatus, AttendanceState, EffectiveStatus, Slot, StudentId};
pub use store::BoardStore;
