pub mod attendance;
pub mod paid_leave;
pub mod summary;
pub mod time_correction;
