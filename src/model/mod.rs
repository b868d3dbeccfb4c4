pub mod attendance;
pub mod summary;
pub mod time_correction;
pub mod user;
pub mod work_location;
