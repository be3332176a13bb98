pub mod api_handlers;
pub mod attendance_handlers;
